//! Image normalisation ahead of strip detection
//!
//! Converts any decoded image to 8-bit RGB, bounds its size and applies a
//! mild sharpening pass to recover edge contrast lost to downscaling.

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage};

use crate::config::PreprocessingConfig;
use crate::constants::preprocessing::SMOOTH_KERNEL;

/// Normalises colour representation and size of input photos
#[derive(Debug, Clone)]
pub struct ImagePreprocessor {
    max_edge: u32,
    sharpen_factor: f32,
}

impl Default for ImagePreprocessor {
    fn default() -> Self {
        Self::new(&PreprocessingConfig::default())
    }
}

impl ImagePreprocessor {
    pub fn new(config: &PreprocessingConfig) -> Self {
        Self {
            max_edge: config.max_edge.max(1),
            sharpen_factor: config.sharpen_factor,
        }
    }

    /// Convert to RGB, downscale to `max_edge` and sharpen.
    ///
    /// The input is never modified; each step produces a new buffer.
    pub fn preprocess(&self, image: &DynamicImage) -> RgbImage {
        let rgb = image.to_rgb8();
        let resized = self.downscale(rgb);
        self.sharpen(&resized)
    }

    fn downscale(&self, rgb: RgbImage) -> RgbImage {
        let (width, height) = rgb.dimensions();
        if width <= self.max_edge && height <= self.max_edge {
            return rgb;
        }

        let (new_width, new_height) = fit_within(width, height, self.max_edge);
        tracing::debug!(
            width,
            height,
            new_width,
            new_height,
            "downscaling input image"
        );
        imageops::resize(&rgb, new_width, new_height, FilterType::Lanczos3)
    }

    /// Blend the image away from its smoothed copy by `sharpen_factor`.
    ///
    /// Border pixels have no full 3x3 neighbourhood and are kept as-is.
    fn sharpen(&self, rgb: &RgbImage) -> RgbImage {
        if (self.sharpen_factor - 1.0).abs() < f32::EPSILON {
            return rgb.clone();
        }

        let (width, height) = rgb.dimensions();
        let smooth: RgbImage = imageops::filter3x3(rgb, &SMOOTH_KERNEL);
        let factor = self.sharpen_factor;

        RgbImage::from_fn(width, height, |x, y| {
            let original = rgb.get_pixel(x, y);
            if x == 0 || y == 0 || x + 1 >= width || y + 1 >= height {
                return *original;
            }
            let smoothed = smooth.get_pixel(x, y);
            let mut out = [0u8; 3];
            for c in 0..3 {
                let s = smoothed[c] as f32;
                let o = original[c] as f32;
                out[c] = (s + factor * (o - s)).round().clamp(0.0, 255.0) as u8;
            }
            Rgb(out)
        })
    }
}

/// Scale `(width, height)` so the longer edge equals `max_edge`, keeping aspect ratio.
pub fn fit_within(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    if width >= height {
        let scaled = (height as f64 * max_edge as f64 / width as f64).round() as u32;
        (max_edge, scaled.max(1))
    } else {
        let scaled = (width as f64 * max_edge as f64 / height as f64).round() as u32;
        (scaled.max(1), max_edge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, RgbaImage};

    #[test]
    fn test_fit_within_landscape_and_portrait() {
        assert_eq!(fit_within(4000, 3000, 1024), (1024, 768));
        assert_eq!(fit_within(3000, 4000, 1024), (768, 1024));
        assert_eq!(fit_within(5000, 2, 1024), (1024, 1));
    }

    #[test]
    fn test_small_image_keeps_size() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(640, 480, Rgb([10, 20, 30])));
        let out = ImagePreprocessor::default().preprocess(&img);
        assert_eq!(out.dimensions(), (640, 480));
    }

    #[test]
    fn test_large_image_is_downscaled() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(2048, 1024, Rgb([10, 20, 30])));
        let out = ImagePreprocessor::default().preprocess(&img);
        assert_eq!(out.dimensions(), (1024, 512));
    }

    #[test]
    fn test_grayscale_and_rgba_become_rgb() {
        let gray = DynamicImage::ImageLuma8(GrayImage::from_pixel(8, 8, Luma([200])));
        let out = ImagePreprocessor::default().preprocess(&gray);
        assert_eq!(out.get_pixel(4, 4), &Rgb([200, 200, 200]));

        let rgba = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, image::Rgba([1, 2, 3, 255])));
        let out = ImagePreprocessor::default().preprocess(&rgba);
        assert_eq!(out.get_pixel(4, 4), &Rgb([1, 2, 3]));
    }

    #[test]
    fn test_sharpen_keeps_flat_regions() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(16, 16, Rgb([245, 240, 235])));
        let out = ImagePreprocessor::default().preprocess(&img);
        assert!(out.pixels().all(|p| *p == Rgb([245, 240, 235])));
    }

    #[test]
    fn test_sharpen_increases_edge_contrast() {
        let mut img = RgbImage::from_pixel(10, 10, Rgb([200, 200, 200]));
        for y in 0..10 {
            for x in 5..10 {
                img.put_pixel(x, y, Rgb([100, 100, 100]));
            }
        }
        let out = ImagePreprocessor::default().preprocess(&DynamicImage::ImageRgb8(img));

        // Bright side of the edge gets brighter, dark side darker.
        assert!(out.get_pixel(4, 5)[0] > 200);
        assert!(out.get_pixel(5, 5)[0] < 100);
    }

    #[test]
    fn test_one_pixel_image() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(1, 1, Rgb([9, 8, 7])));
        let out = ImagePreprocessor::default().preprocess(&img);
        assert_eq!(out.dimensions(), (1, 1));
        assert_eq!(out.get_pixel(0, 0), &Rgb([9, 8, 7]));
    }
}
