//! # UV Strip Dosimetry
//!
//! A Rust crate for reading UV dosimeter strips from ordinary photographs.
//!
//! This library infers an accumulated UV dose by:
//! - Normalising the photo (RGB, bounded size, mild sharpening)
//! - Locating the strip with edge/contour candidates and weighted scoring
//! - Falling back to a central crop when no strip can be found
//! - Measuring the mean colour shift from the unexposed baseline
//! - Mapping that shift to a dose, exposure level and confidence
//!
//! ## Example
//!
//! ```rust,no_run
//! use uvstrip_dosimetry::analyze_strip;
//! use std::path::Path;
//!
//! let result = analyze_strip(Path::new("strip.jpg"))?;
//! println!(
//!     "{} exposure, {:.1} J/cm² ({}% confidence)",
//!     result.exposure_level, result.estimated_dose_rounded(), result.confidence
//! );
//! # Ok::<(), uvstrip_dosimetry::AnalysisError>(())
//! ```

use std::path::Path;

pub mod calibration;
pub mod color;
pub mod config;
pub mod constants;
pub mod detection;
pub mod dose;
pub mod error;
pub mod image_loader;
pub mod pipeline;
pub mod preprocess;

pub use calibration::{CalibrationProfile, CalibrationRegistry, DoseSegment};
pub use color::{ColorAnalyzer, ColorMeasurement};
pub use config::PipelineConfig;
pub use detection::{DetectionOutcome, DetectionReport, PixelBounds, StripLocation, StripLocator};
pub use dose::{DoseEstimate, DoseEstimator, ExposureLevel};
pub use error::{AnalysisError, Result};
pub use pipeline::{StripAnalysisResult, StripAnalyzer};

/// Analyze a strip photo from disk with the default configuration and profile
///
/// # Errors
///
/// Returns `AnalysisError` if:
/// - The file cannot be read or decoded
/// - The image has no pixels to measure
pub fn analyze_strip(image_path: &Path) -> Result<StripAnalysisResult> {
    StripAnalyzer::default().analyze_path(image_path, None)
}

/// Analyze an encoded image (JPEG, PNG, ...) held in memory
pub fn analyze_strip_bytes(bytes: &[u8]) -> Result<StripAnalysisResult> {
    StripAnalyzer::default().analyze_bytes(bytes, None)
}
