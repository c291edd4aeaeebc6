//! Mean colour of the located strip and its shift from baseline
//!
//! Colour distance is the Euclidean norm in 8-bit RGB space between the
//! region's mean colour and the profile's unexposed baseline.

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::calibration::CalibrationProfile;
use crate::constants::calibration::MAX_RGB_DISTANCE;
use crate::error::{AnalysisError, Result};

/// Colour measurement of a strip region
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorMeasurement {
    /// Per-channel arithmetic mean, 0-255
    pub avg_rgb: [f64; 3],
    /// ‖avg_rgb − baseline_rgb‖₂
    pub color_distance: f64,
    /// Distance relative to the largest possible RGB distance, [0, 100]
    pub color_change_percent: f64,
}

impl ColorMeasurement {
    /// `#rrggbb` of the rounded mean colour
    pub fn avg_hex(&self) -> String {
        let [r, g, b] = self.avg_rgb.map(|c| c.round().clamp(0.0, 255.0) as u8);
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }
}

/// Computes colour shift against a calibration baseline
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorAnalyzer;

impl ColorAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Measure the mean colour of `region` against `profile`'s baseline
    ///
    /// # Errors
    ///
    /// `AnalysisError::DegenerateRegion` if the region has no pixels.
    pub fn measure(&self, region: &RgbImage, profile: &CalibrationProfile) -> Result<ColorMeasurement> {
        let avg_rgb = mean_rgb(region).ok_or(AnalysisError::DegenerateRegion {
            width: region.width(),
            height: region.height(),
        })?;
        Ok(self.compare(avg_rgb, profile.baseline_rgb()))
    }

    /// Distance and change percentage of a mean colour from a baseline
    pub fn compare(&self, avg_rgb: [f64; 3], baseline_rgb: [u8; 3]) -> ColorMeasurement {
        let color_distance = rgb_distance(avg_rgb, baseline_rgb.map(f64::from));
        let color_change_percent = (color_distance / MAX_RGB_DISTANCE * 100.0).clamp(0.0, 100.0);

        ColorMeasurement {
            avg_rgb,
            color_distance,
            color_change_percent,
        }
    }
}

/// Per-channel mean over all pixels; `None` for an empty image
pub fn mean_rgb(image: &RgbImage) -> Option<[f64; 3]> {
    let count = image.width() as u64 * image.height() as u64;
    if count == 0 {
        return None;
    }
    let mut sums = [0u64; 3];
    for pixel in image.pixels() {
        for (sum, &value) in sums.iter_mut().zip(pixel.0.iter()) {
            *sum += value as u64;
        }
    }
    Some(sums.map(|s| s as f64 / count as f64))
}

/// Euclidean distance between two RGB triples
pub fn rgb_distance(a: [f64; 3], b: [f64; 3]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use image::Rgb;

    #[test]
    fn test_baseline_color_has_zero_distance() {
        let region = RgbImage::from_pixel(30, 10, Rgb([245, 240, 235]));
        let m = ColorAnalyzer::new()
            .measure(&region, &CalibrationProfile::standard())
            .unwrap();

        assert_eq!(m.avg_rgb, [245.0, 240.0, 235.0]);
        assert_eq!(m.color_distance, 0.0);
        assert_eq!(m.color_change_percent, 0.0);
    }

    #[test]
    fn test_exposed_strip_distance() {
        let region = RgbImage::from_pixel(300, 80, Rgb([140, 100, 80]));
        let m = ColorAnalyzer::new()
            .measure(&region, &CalibrationProfile::standard())
            .unwrap();

        let expected = (105.0f64 * 105.0 + 140.0 * 140.0 + 155.0 * 155.0).sqrt();
        assert_relative_eq!(m.color_distance, expected, epsilon = 1e-9);
        assert_relative_eq!(m.color_change_percent, expected / MAX_RGB_DISTANCE * 100.0);
        assert_eq!(m.avg_hex(), "#8c6450");
    }

    #[test]
    fn test_mean_of_mixed_pixels() {
        let mut region = RgbImage::from_pixel(2, 1, Rgb([0, 0, 0]));
        region.put_pixel(1, 0, Rgb([255, 100, 51]));
        assert_eq!(mean_rgb(&region), Some([127.5, 50.0, 25.5]));
    }

    #[test]
    fn test_change_percent_capped() {
        let m = ColorAnalyzer::new().compare([0.0, 0.0, 0.0], [255, 255, 255]);
        assert_relative_eq!(m.color_change_percent, 100.0, epsilon = 1e-9);
        assert!(m.color_change_percent <= 100.0);
    }

    #[test]
    fn test_empty_region_is_degenerate() {
        let region = RgbImage::new(0, 5);
        let err = ColorAnalyzer::new()
            .measure(&region, &CalibrationProfile::standard())
            .unwrap_err();
        assert!(matches!(err, AnalysisError::DegenerateRegion { width: 0, height: 5 }));
    }
}
