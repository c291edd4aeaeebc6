//! Strip calibration module
//!
//! Each strip type has one calibration profile: the colour of an unexposed
//! strip and a piecewise-linear curve from colour distance to UV dose.

pub mod profile;
pub mod registry;

pub use profile::{CalibrationProfile, DoseSegment};
pub use registry::CalibrationRegistry;
