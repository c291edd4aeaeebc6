//! Colour measurement module
//!
//! Averages the located strip region and measures its shift from the
//! calibration baseline.

pub mod analysis;

pub use analysis::{ColorAnalyzer, ColorMeasurement};
