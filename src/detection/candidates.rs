//! Strip candidate extraction from edge contours
//!
//! Finds outermost contours in the edge map of a preprocessed image and
//! keeps those whose bounding box has a plausible strip size and shape.
//! An empty candidate list is a normal outcome (e.g. a flat image).

use image::{imageops, GrayImage, RgbImage};
use imageproc::contours::{find_contours, BorderType};
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::morphology::{grayscale_close, Mask};
use imageproc::point::Point;
use serde::Serialize;

use super::geometry::{bounding_box, PixelBounds};
use crate::config::DetectionConfig;
use crate::error::{AnalysisError, Result};

/// A bounding region considered as "the strip" before final selection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionCandidate {
    /// Bounding box of the contour
    pub bbox: PixelBounds,
    /// Bounding-box area in pixels
    pub area: u64,
    /// Bounding-box area as percent of the image area
    pub area_percent: f64,
    /// `max(w,h) / min(w,h)`
    pub aspect_ratio: f64,
    /// Rectangularity in [0, 1]; filled in by the scorer
    pub rect_score: f64,
    /// Selection score in [0, 1]; filled in by the scorer
    pub total_score: f64,
    /// Source contour in image coordinates
    #[serde(skip)]
    pub contour: Vec<Point<i32>>,
}

/// Edge/contour based candidate finder
#[derive(Debug, Clone)]
pub struct RegionCandidateFinder {
    config: DetectionConfig,
}

impl Default for RegionCandidateFinder {
    fn default() -> Self {
        Self::from_validated(DetectionConfig::default())
    }
}

impl RegionCandidateFinder {
    /// # Errors
    ///
    /// `AnalysisError::InvalidParameter` if `config` fails
    /// [`DetectionConfig::validate`].
    pub fn new(config: DetectionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_validated(config))
    }

    pub(crate) fn from_validated(config: DetectionConfig) -> Self {
        Self { config }
    }

    /// Find strip candidates in a preprocessed image
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::ProcessingError` for an image without pixels
    /// or a malformed contour. The locator treats both as a detection miss.
    pub fn find(&self, image: &RgbImage) -> Result<Vec<RegionCandidate>> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(AnalysisError::processing(format!(
                "cannot search a {}x{} image",
                width, height
            )));
        }

        let smoothed = self.smooth(image);
        let edges = canny(&smoothed, self.config.canny_low, self.config.canny_high);

        let image_area = width as f64 * height as f64;
        let mut candidates = Vec::new();
        let mut outer = 0usize;

        for contour in find_contours::<i32>(&edges) {
            // Outermost borders only; holes and nested shapes are ignored.
            if contour.border_type != BorderType::Outer || contour.parent.is_some() {
                continue;
            }
            outer += 1;

            let bbox = bounding_box(&contour.points)?;
            if let Some(candidate) = self.evaluate(bbox, image_area, contour.points) {
                candidates.push(candidate);
            }
        }

        tracing::debug!(
            contours = outer,
            candidates = candidates.len(),
            "candidate extraction finished"
        );
        Ok(candidates)
    }

    /// Apply the size and shape filters to one contour's bounding box
    fn evaluate(
        &self,
        bbox: PixelBounds,
        image_area: f64,
        contour: Vec<Point<i32>>,
    ) -> Option<RegionCandidate> {
        let area = bbox.area();
        if area < self.config.min_contour_area as u64 {
            return None;
        }

        let area_percent = area as f64 / image_area * 100.0;
        if area_percent < self.config.min_area_percent || area_percent > self.config.max_area_percent
        {
            return None;
        }

        let aspect_ratio = bbox.aspect_ratio();
        if aspect_ratio < self.config.min_aspect_ratio || aspect_ratio > self.config.max_aspect_ratio
        {
            return None;
        }

        Some(RegionCandidate {
            bbox,
            area,
            area_percent,
            aspect_ratio,
            rect_score: 0.0,
            total_score: 0.0,
            contour,
        })
    }

    /// Grayscale, blur and close small gaps before edge detection
    fn smooth(&self, image: &RgbImage) -> GrayImage {
        let gray: GrayImage = imageops::grayscale(image);
        let blurred = gaussian_blur_f32(&gray, kernel_sigma(self.config.blur_kernel_size));
        let radius = (self.config.morph_kernel_size / 2).min(u8::MAX as u32) as u8;
        if radius == 0 {
            return blurred;
        }
        grayscale_close(&blurred, &Mask::square(radius))
    }
}

/// Gaussian sigma matching a square kernel of the given (odd) size
fn kernel_sigma(kernel_size: u32) -> f32 {
    let k = kernel_size.max(1) as f32;
    0.3 * ((k - 1.0) * 0.5 - 1.0) + 0.8
}
