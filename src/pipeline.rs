//! End-to-end strip analysis
//!
//! raw image → preprocessing → strip localisation → colour measurement →
//! dose estimation. Every analysis is independent; the analyzer itself only
//! holds read-only configuration and profiles and can be shared across
//! threads.

use image::DynamicImage;
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::calibration::CalibrationRegistry;
use crate::color::{ColorAnalyzer, ColorMeasurement};
use crate::config::PipelineConfig;
use crate::detection::{DetectionOutcome, DetectionReport, PixelBounds, StripLocator};
use crate::dose::{DoseEstimate, DoseEstimator, ExposureLevel};
use crate::error::Result;
use crate::image_loader;
use crate::preprocess::ImagePreprocessor;

/// Complete analysis of one strip photo
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StripAnalysisResult {
    /// Calibration profile used
    pub profile: String,
    /// Mean colour of the analysed region
    pub avg_rgb: [f64; 3],
    /// `#rrggbb` of the mean colour
    pub avg_hex: String,
    pub color_distance: f64,
    pub color_change_percent: f64,
    /// J/cm²
    pub estimated_dose: f64,
    pub exposure_level: ExposureLevel,
    /// Percent, [0, 100]
    pub confidence: f64,
    /// Analysed region in preprocessed-image pixels
    pub region: PixelBounds,
    /// Whether the region came from detection or the fallback crop
    pub detection: DetectionOutcome,
    /// Size of the preprocessed image `region` refers to
    pub image_width: u32,
    pub image_height: u32,
}

impl StripAnalysisResult {
    pub fn dose_estimate(&self) -> DoseEstimate {
        DoseEstimate {
            estimated_dose: self.estimated_dose,
            exposure_level: self.exposure_level,
            confidence: self.confidence,
        }
    }

    /// Dose rounded to one decimal
    pub fn estimated_dose_rounded(&self) -> f64 {
        self.dose_estimate().rounded_dose()
    }

    pub fn recommendation(&self) -> String {
        self.exposure_level.recommendation(self.estimated_dose_rounded())
    }

    pub fn used_fallback(&self) -> bool {
        matches!(self.detection, DetectionOutcome::Fallback { .. })
    }
}

/// Strip analysis pipeline
///
/// # Example
///
/// ```rust,no_run
/// use uvstrip_dosimetry::StripAnalyzer;
/// use std::path::Path;
///
/// let analyzer = StripAnalyzer::default();
/// let result = analyzer.analyze_path(Path::new("strip.jpg"), None)?;
/// println!("{} ({:.1} J/cm²)", result.exposure_level, result.estimated_dose);
/// # Ok::<(), uvstrip_dosimetry::AnalysisError>(())
/// ```
#[derive(Debug, Clone)]
pub struct StripAnalyzer {
    config: Arc<PipelineConfig>,
    profiles: Arc<CalibrationRegistry>,
    preprocessor: ImagePreprocessor,
    locator: StripLocator,
    color: ColorAnalyzer,
    dose: DoseEstimator,
}

impl Default for StripAnalyzer {
    fn default() -> Self {
        Self::build(PipelineConfig::default(), CalibrationRegistry::builtin())
    }
}

impl StripAnalyzer {
    /// Create an analyzer from a configuration and profile set
    ///
    /// # Errors
    ///
    /// `AnalysisError::InvalidParameter` if the configuration is invalid.
    pub fn new(config: PipelineConfig, profiles: CalibrationRegistry) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, profiles))
    }

    fn build(config: PipelineConfig, profiles: CalibrationRegistry) -> Self {
        Self {
            preprocessor: ImagePreprocessor::new(&config.preprocessing),
            locator: StripLocator::from_validated(&config),
            color: ColorAnalyzer::new(),
            dose: DoseEstimator::new(config.confidence.clone()),
            config: Arc::new(config),
            profiles: Arc::new(profiles),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn profiles(&self) -> &CalibrationRegistry {
        &self.profiles
    }

    /// Analyse a decoded image
    ///
    /// `profile` selects the strip type; `None` uses the default profile.
    ///
    /// # Errors
    ///
    /// - `AnalysisError::UnknownProfile` for an unregistered strip type
    /// - `AnalysisError::DegenerateRegion` if no pixels could be measured
    ///
    /// Detection misses are not errors; see [`StripAnalysisResult::detection`].
    pub fn analyze(
        &self,
        image: &DynamicImage,
        profile: Option<&str>,
    ) -> Result<StripAnalysisResult> {
        let profile = match profile {
            Some(name) => self.profiles.get(name)?,
            None => self.profiles.default_profile()?,
        };

        let prepared = self.preprocessor.preprocess(image);
        let location = self.locator.locate(&prepared)?;
        let region = location.crop(&prepared)?;

        let color = self.color.measure(&region, &profile)?;
        let dose = self.dose.estimate(color.color_distance, &profile);

        tracing::info!(
            profile = profile.name(),
            color_distance = color.color_distance,
            dose = dose.estimated_dose,
            level = %dose.exposure_level,
            confidence = dose.confidence,
            "strip analysed"
        );

        Ok(assemble(
            profile.name(),
            &color,
            &dose,
            location.bounds,
            location.outcome,
            prepared.dimensions(),
        ))
    }

    /// Decode and analyse an uploaded image
    pub fn analyze_bytes(&self, bytes: &[u8], profile: Option<&str>) -> Result<StripAnalysisResult> {
        let image = image_loader::decode_image(bytes)?;
        self.analyze(&image, profile)
    }

    /// Load and analyse an image file
    pub fn analyze_path(&self, path: &Path, profile: Option<&str>) -> Result<StripAnalysisResult> {
        let image = image_loader::load_image(path)?;
        self.analyze(&image, profile)
    }

    /// Analyse several files in parallel; results keep the input order
    pub fn analyze_batch(
        &self,
        paths: &[PathBuf],
        profile: Option<&str>,
    ) -> Vec<(PathBuf, Result<StripAnalysisResult>)> {
        paths
            .par_iter()
            .map(|path| (path.clone(), self.analyze_path(path, profile)))
            .collect()
    }

    /// Candidate report for a decoded image, after preprocessing
    pub fn inspect(&self, image: &DynamicImage) -> Result<DetectionReport> {
        let prepared = self.preprocessor.preprocess(image);
        self.locator.inspect(&prepared)
    }
}

fn assemble(
    profile: &str,
    color: &ColorMeasurement,
    dose: &DoseEstimate,
    region: PixelBounds,
    detection: DetectionOutcome,
    (image_width, image_height): (u32, u32),
) -> StripAnalysisResult {
    StripAnalysisResult {
        profile: profile.to_string(),
        avg_rgb: color.avg_rgb,
        avg_hex: color.avg_hex(),
        color_distance: color.color_distance,
        color_change_percent: color.color_change_percent,
        estimated_dose: dose.estimated_dose,
        exposure_level: dose.exposure_level,
        confidence: dose.confidence,
        region,
        detection,
        image_width,
        image_height,
    }
}
