//! Configuration structures for the strip analysis pipeline.
//!
//! This module defines all tunable parameters for dose estimation,
//! organized into logical groups for preprocessing, detection, scoring,
//! region extraction and confidence.
//!
//! # Configuration Loading
//!
//! Configuration can be loaded from JSON files or constructed programmatically:
//!
//! ```no_run
//! use uvstrip_dosimetry::PipelineConfig;
//! use std::path::Path;
//!
//! // Load from file
//! let config = PipelineConfig::from_json_file(Path::new("config.json"))?;
//!
//! // Or use defaults
//! let config = PipelineConfig::default();
//! # Ok::<(), uvstrip_dosimetry::AnalysisError>(())
//! ```
//!
//! Every section is optional in JSON; missing sections and fields fall back
//! to the defaults in [`crate::constants`].

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants;
use crate::error::{AnalysisError, Result};

/// Complete pipeline configuration.
///
/// Built once per process and shared read-only by every analysis.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Image normalisation
    pub preprocessing: PreprocessingConfig,

    /// Candidate extraction
    pub detection: DetectionConfig,

    /// Candidate scoring weights
    pub scoring: ScoringConfig,

    /// Region extraction around the winner
    pub locator: LocatorConfig,

    /// Dose confidence heuristic
    pub confidence: ConfidenceConfig,
}

/// Preprocessing parameters applied before detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessingConfig {
    /// Longest allowed edge in pixels
    pub max_edge: u32,

    /// Sharpness enhancement factor (1.0 = unchanged)
    pub sharpen_factor: f32,
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self {
            max_edge: constants::preprocessing::MAX_EDGE,
            sharpen_factor: constants::preprocessing::SHARPEN_FACTOR,
        }
    }
}

/// Candidate extraction parameters.
///
/// Controls the edge detection and the geometric filters a contour's
/// bounding box must pass to be considered a strip candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Gaussian blur kernel size (must be odd)
    pub blur_kernel_size: u32,

    /// Closing kernel size (square)
    pub morph_kernel_size: u32,

    /// Edge detection low threshold
    pub canny_low: f32,

    /// Edge detection high threshold
    pub canny_high: f32,

    /// Minimum bounding-box area in pixels
    pub min_contour_area: u32,

    /// Minimum bounding-box area as percent of the image
    pub min_area_percent: f64,

    /// Maximum bounding-box area as percent of the image
    pub max_area_percent: f64,

    /// Minimum `max(w,h)/min(w,h)`
    pub min_aspect_ratio: f64,

    /// Maximum `max(w,h)/min(w,h)`
    pub max_aspect_ratio: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        use constants::detection::*;
        Self {
            blur_kernel_size: BLUR_KERNEL_SIZE,
            morph_kernel_size: MORPH_KERNEL_SIZE,
            canny_low: CANNY_LOW_THRESHOLD,
            canny_high: CANNY_HIGH_THRESHOLD,
            min_contour_area: MIN_CONTOUR_AREA,
            min_area_percent: MIN_AREA_PERCENT,
            max_area_percent: MAX_AREA_PERCENT,
            min_aspect_ratio: MIN_ASPECT_RATIO,
            max_aspect_ratio: MAX_ASPECT_RATIO,
        }
    }
}

/// Candidate scoring weights.
///
/// `contour_fill_weight`/`corner_weight` combine into the rectangularity
/// score; the four selection weights combine rectangularity, area, aspect
/// and centring into the total score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub contour_fill_weight: f64,
    pub corner_weight: f64,
    pub corner_penalty: f64,
    pub target_corners: usize,

    /// Polygon simplification tolerance as fraction of perimeter
    pub poly_epsilon_factor: f64,

    pub rect_weight: f64,
    pub area_weight: f64,
    pub aspect_weight: f64,
    pub position_weight: f64,

    /// Area percent at which the area sub-score reaches 1.0
    pub area_norm_percent: f64,

    /// Aspect ratio at which the aspect sub-score reaches 1.0
    pub aspect_norm: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        use constants::scoring::*;
        Self {
            contour_fill_weight: CONTOUR_FILL_WEIGHT,
            corner_weight: CORNER_WEIGHT,
            corner_penalty: CORNER_PENALTY,
            target_corners: TARGET_CORNERS,
            poly_epsilon_factor: POLY_EPSILON_FACTOR,
            rect_weight: RECT_WEIGHT,
            area_weight: AREA_WEIGHT,
            aspect_weight: ASPECT_WEIGHT,
            position_weight: POSITION_WEIGHT,
            area_norm_percent: AREA_NORM_PERCENT,
            aspect_norm: ASPECT_NORM,
        }
    }
}

/// Region extraction parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    /// Padding as fraction of the candidate's width/height
    pub padding_fraction: f64,

    /// Minimum padding in pixels
    pub min_padding: u32,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            padding_fraction: constants::locator::PADDING_FRACTION,
            min_padding: constants::locator::MIN_PADDING,
        }
    }
}

/// Confidence heuristic over colour distance.
///
/// Small shifts are close to noise and very large shifts are near strip
/// saturation, so both get less confidence than mid-range shifts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceConfig {
    pub low_shift_below: f64,
    pub low_shift_confidence: f64,
    pub mid_shift_confidence: f64,
    pub high_shift_from: f64,
    pub high_shift_confidence: f64,
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        use constants::confidence::*;
        Self {
            low_shift_below: LOW_SHIFT_BELOW,
            low_shift_confidence: LOW_SHIFT_CONFIDENCE,
            mid_shift_confidence: MID_SHIFT_CONFIDENCE,
            high_shift_from: HIGH_SHIFT_FROM,
            high_shift_confidence: HIGH_SHIFT_CONFIDENCE,
        }
    }
}

impl DetectionConfig {
    /// Reject edge thresholds, kernel sizes and filter ranges the finder cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.blur_kernel_size == 0 || self.blur_kernel_size % 2 == 0 {
            return Err(AnalysisError::invalid_parameter(
                "detection.blur_kernel_size",
                self.blur_kernel_size,
            ));
        }
        if self.morph_kernel_size == 0
            || self.morph_kernel_size % 2 == 0
            || self.morph_kernel_size > 511
        {
            return Err(AnalysisError::invalid_parameter(
                "detection.morph_kernel_size",
                self.morph_kernel_size,
            ));
        }
        if !(self.canny_low >= 0.0 && self.canny_low <= self.canny_high) {
            return Err(AnalysisError::invalid_parameter(
                "detection.canny_low",
                format!("{} (high = {})", self.canny_low, self.canny_high),
            ));
        }
        if !(self.min_area_percent >= 0.0 && self.min_area_percent <= self.max_area_percent) {
            return Err(AnalysisError::invalid_parameter(
                "detection.min_area_percent",
                format!("{} (max = {})", self.min_area_percent, self.max_area_percent),
            ));
        }
        if !(self.min_aspect_ratio >= 1.0 && self.min_aspect_ratio <= self.max_aspect_ratio) {
            return Err(AnalysisError::invalid_parameter(
                "detection.min_aspect_ratio",
                format!("{} (max = {})", self.min_aspect_ratio, self.max_aspect_ratio),
            ));
        }
        Ok(())
    }
}

impl PipelineConfig {
    /// Load configuration from JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AnalysisError::config(format!("Failed to read {}", path.display()), e)
        })?;
        Self::from_json_str(&content)
    }

    /// Parse configuration from a JSON string
    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)
            .map_err(|e| AnalysisError::config("Invalid pipeline configuration JSON", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to JSON file
    pub fn to_json_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| AnalysisError::config("Failed to serialize configuration", e))?;
        std::fs::write(path, json).map_err(|e| {
            AnalysisError::config(format!("Failed to write {}", path.display()), e)
        })?;
        Ok(())
    }

    /// Reject parameter combinations the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        let p = &self.preprocessing;
        if p.max_edge == 0 {
            return Err(AnalysisError::invalid_parameter("preprocessing.max_edge", p.max_edge));
        }
        if !(p.sharpen_factor.is_finite() && p.sharpen_factor >= 0.0) {
            return Err(AnalysisError::invalid_parameter(
                "preprocessing.sharpen_factor",
                p.sharpen_factor,
            ));
        }

        self.detection.validate()?;

        let s = &self.scoring;
        let weights = [
            ("scoring.contour_fill_weight", s.contour_fill_weight),
            ("scoring.corner_weight", s.corner_weight),
            ("scoring.corner_penalty", s.corner_penalty),
            ("scoring.rect_weight", s.rect_weight),
            ("scoring.area_weight", s.area_weight),
            ("scoring.aspect_weight", s.aspect_weight),
            ("scoring.position_weight", s.position_weight),
        ];
        for (name, value) in weights {
            if !(value.is_finite() && value >= 0.0) {
                return Err(AnalysisError::invalid_parameter(name, value));
            }
        }
        if !(s.poly_epsilon_factor > 0.0 && s.poly_epsilon_factor.is_finite()) {
            return Err(AnalysisError::invalid_parameter(
                "scoring.poly_epsilon_factor",
                s.poly_epsilon_factor,
            ));
        }
        if !(s.area_norm_percent > 0.0) {
            return Err(AnalysisError::invalid_parameter(
                "scoring.area_norm_percent",
                s.area_norm_percent,
            ));
        }
        if !(s.aspect_norm > 0.0) {
            return Err(AnalysisError::invalid_parameter("scoring.aspect_norm", s.aspect_norm));
        }

        if !(self.locator.padding_fraction >= 0.0 && self.locator.padding_fraction.is_finite()) {
            return Err(AnalysisError::invalid_parameter(
                "locator.padding_fraction",
                self.locator.padding_fraction,
            ));
        }

        let c = &self.confidence;
        if !(c.low_shift_below <= c.high_shift_from) {
            return Err(AnalysisError::invalid_parameter(
                "confidence.low_shift_below",
                format!("{} (high_shift_from = {})", c.low_shift_below, c.high_shift_from),
            ));
        }

        Ok(())
    }
}
