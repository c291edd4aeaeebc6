//! Image decoding for uploaded bytes and files on disk
//!
//! All decoding goes through the `image` crate. Any pixel format is
//! accepted here; conversion to 3-channel RGB happens in
//! [`crate::preprocess`]. A decode failure is the only error this stage
//! produces and it is never retried.

use image::{DynamicImage, ImageFormat as CodecFormat, ImageReader};
use std::io::Cursor;
use std::path::{Path, PathBuf};

use crate::error::{AnalysisError, Result};

/// Supported image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// JPEG image
    Jpeg,
    /// PNG image
    Png,
    /// GIF image (first frame only)
    Gif,
    /// WebP image
    WebP,
    /// TIFF image
    Tiff,
    /// BMP image
    Bmp,
    /// PNM image (PBM, PGM, PPM)
    Pnm,
}

impl ImageFormat {
    /// Detect format from file extension
    pub fn from_extension(path: &Path) -> Option<ImageFormat> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "png" => Some(ImageFormat::Png),
            "gif" => Some(ImageFormat::Gif),
            "webp" => Some(ImageFormat::WebP),
            "tiff" | "tif" => Some(ImageFormat::Tiff),
            "bmp" => Some(ImageFormat::Bmp),
            "pbm" | "pgm" | "ppm" | "pnm" => Some(ImageFormat::Pnm),
            _ => None,
        }
    }

    fn codec(self) -> CodecFormat {
        match self {
            ImageFormat::Jpeg => CodecFormat::Jpeg,
            ImageFormat::Png => CodecFormat::Png,
            ImageFormat::Gif => CodecFormat::Gif,
            ImageFormat::WebP => CodecFormat::WebP,
            ImageFormat::Tiff => CodecFormat::Tiff,
            ImageFormat::Bmp => CodecFormat::Bmp,
            ImageFormat::Pnm => CodecFormat::Pnm,
        }
    }
}

/// Decode an in-memory image (e.g. an uploaded file body)
///
/// The format is sniffed from the content, not from any file name.
///
/// # Errors
///
/// Returns `AnalysisError::ImageLoadError` if the bytes are not a
/// decodable image or the image has no pixels.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| AnalysisError::image_load("Failed to read image bytes", e))?;

    let img = reader
        .decode()
        .map_err(|e| AnalysisError::image_load("Failed to decode image bytes", e))?;

    ensure_non_empty(img)
}

/// Load an image from disk
///
/// # Errors
///
/// Returns `AnalysisError::ImageLoadError` if:
/// - Format is not supported
/// - File cannot be opened
/// - Decoding fails
///
/// # Example
///
/// ```rust,no_run
/// use uvstrip_dosimetry::image_loader::load_image;
/// use std::path::Path;
///
/// let img = load_image(Path::new("strip.jpg"))?;
/// println!("Loaded image: {}x{}", img.width(), img.height());
/// # Ok::<(), uvstrip_dosimetry::AnalysisError>(())
/// ```
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    let format = ImageFormat::from_extension(path).ok_or_else(|| AnalysisError::ImageLoadError {
        message: format!("Unknown image format for file: {}", path.display()),
        source: None,
    })?;

    let mut reader = ImageReader::open(path).map_err(|e| {
        AnalysisError::image_load(format!("Failed to open image file: {}", path.display()), e)
    })?;
    reader.set_format(format.codec());

    let img = reader.decode().map_err(|e| {
        AnalysisError::image_load(format!("Failed to decode image: {}", path.display()), e)
    })?;

    ensure_non_empty(img)
}

fn ensure_non_empty(img: DynamicImage) -> Result<DynamicImage> {
    if img.width() == 0 || img.height() == 0 {
        return Err(AnalysisError::ImageLoadError {
            message: format!("Image has no pixels ({}x{})", img.width(), img.height()),
            source: None,
        });
    }
    Ok(img)
}

/// Get list of all supported file extensions
pub fn supported_extensions() -> &'static [&'static str] {
    &[
        "jpg", "jpeg", "png", "gif", "webp", "tiff", "tif", "bmp", "pbm", "pgm", "ppm", "pnm",
    ]
}

/// Check if a file extension is supported
pub fn is_supported_extension(ext: &str) -> bool {
    let ext_lower = ext.to_lowercase();
    supported_extensions().contains(&ext_lower.as_str())
}

/// Image files directly inside `dir`, sorted by path
///
/// Only files with a supported extension are listed; subdirectories are
/// not searched.
///
/// # Errors
///
/// Returns `AnalysisError::ImageLoadError` if the directory cannot be read.
pub fn image_files_in(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| {
        AnalysisError::image_load(format!("Failed to read directory: {}", dir.display()), e)
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| {
                AnalysisError::image_load(format!("Failed to read directory: {}", dir.display()), e)
            })?
            .path();
        let supported = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(is_supported_extension);
        if supported && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
