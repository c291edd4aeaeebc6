//! Default parameters and calibration reference values
//!
//! Compile-time defaults for every tunable stage of the pipeline. The
//! runtime values live in [`crate::config::PipelineConfig`], which is
//! initialised from these constants.

/// Image normalisation before detection
pub mod preprocessing {
    /// Longest allowed image edge; larger images are downscaled to this size
    pub const MAX_EDGE: u32 = 1024;

    /// Sharpness enhancement factor (1.0 = unchanged)
    pub const SHARPEN_FACTOR: f32 = 1.2;

    /// Smoothing kernel the sharpening blends against (3x3, centre-weighted)
    pub const SMOOTH_KERNEL: [f32; 9] = [1.0, 1.0, 1.0, 1.0, 5.0, 1.0, 1.0, 1.0, 1.0];
}

/// Edge and contour based candidate extraction
pub mod detection {
    /// Gaussian blur kernel size (odd)
    pub const BLUR_KERNEL_SIZE: u32 = 5;

    /// Morphological closing kernel size (square)
    pub const MORPH_KERNEL_SIZE: u32 = 3;

    /// Dual-threshold edge detection
    pub const CANNY_LOW_THRESHOLD: f32 = 50.0;
    pub const CANNY_HIGH_THRESHOLD: f32 = 150.0;

    /// Minimum bounding-box area in pixels
    pub const MIN_CONTOUR_AREA: u32 = 500;

    /// Bounding-box area bounds as percent of image area
    pub const MIN_AREA_PERCENT: f64 = 2.0;
    pub const MAX_AREA_PERCENT: f64 = 40.0;

    /// Aspect ratio bounds, `max(w,h) / min(w,h)`
    pub const MIN_ASPECT_RATIO: f64 = 1.5;
    pub const MAX_ASPECT_RATIO: f64 = 8.0;
}

/// Candidate scoring weights
pub mod scoring {
    /// Rectangularity: contour fill ratio vs. corner-count score
    pub const CONTOUR_FILL_WEIGHT: f64 = 0.7;
    pub const CORNER_WEIGHT: f64 = 0.3;

    /// Corner score lost per vertex away from the target count
    pub const CORNER_PENALTY: f64 = 0.1;
    pub const TARGET_CORNERS: usize = 4;

    /// Polygon simplification tolerance as fraction of perimeter
    pub const POLY_EPSILON_FACTOR: f64 = 0.02;

    /// Selection score weights
    pub const RECT_WEIGHT: f64 = 0.4;
    pub const AREA_WEIGHT: f64 = 0.3;
    pub const ASPECT_WEIGHT: f64 = 0.2;
    pub const POSITION_WEIGHT: f64 = 0.1;

    /// Area percent at which the area sub-score saturates
    pub const AREA_NORM_PERCENT: f64 = 20.0;

    /// Aspect ratio at which the aspect sub-score saturates
    pub const ASPECT_NORM: f64 = 4.0;

    /// Number of candidates kept in a detection report
    pub const REPORT_TOP_CANDIDATES: usize = 5;
}

/// Region extraction around the winning candidate
pub mod locator {
    /// Padding as fraction of the candidate's own width/height
    pub const PADDING_FRACTION: f64 = 0.05;

    /// Minimum padding in pixels
    pub const MIN_PADDING: u32 = 5;
}

/// Dose confidence heuristic
pub mod confidence {
    /// Shifts below this distance are barely distinguishable from noise
    pub const LOW_SHIFT_BELOW: f64 = 15.0;
    pub const LOW_SHIFT_CONFIDENCE: f64 = 60.0;

    pub const MID_SHIFT_CONFIDENCE: f64 = 85.0;

    /// Shifts from this distance on are near strip saturation
    pub const HIGH_SHIFT_FROM: f64 = 100.0;
    pub const HIGH_SHIFT_CONFIDENCE: f64 = 75.0;

    pub const MAX_CONFIDENCE: f64 = 100.0;
}

/// Calibration reference values
pub mod calibration {
    /// Identifier of the built-in profile
    pub const STANDARD_PROFILE: &str = "standard";

    /// Colour of an unexposed standard strip
    pub const STANDARD_BASELINE_RGB: [u8; 3] = [245, 240, 235];

    /// Largest possible RGB distance, ‖(255,255,255)‖₂
    pub const MAX_RGB_DISTANCE: f64 = 441.672_955_930_063_7;
}
