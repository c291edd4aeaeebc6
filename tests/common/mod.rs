//! Synthetic strip photos shared by the integration tests

#![allow(dead_code)]

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::path::PathBuf;

pub const BACKGROUND: [u8; 3] = [250, 245, 240];
pub const EXPOSED: [u8; 3] = [140, 100, 80];
pub const BASELINE: [u8; 3] = [245, 240, 235];

/// Filled rectangle `(x, y, width, height)` of `fill` on a flat `background`
pub fn scene(
    width: u32,
    height: u32,
    rect: (u32, u32, u32, u32),
    fill: [u8; 3],
    background: [u8; 3],
) -> RgbImage {
    let (rx, ry, rw, rh) = rect;
    RgbImage::from_fn(width, height, |x, y| {
        if x >= rx && x < rx + rw && y >= ry && y < ry + rh {
            Rgb(fill)
        } else {
            Rgb(background)
        }
    })
}

/// Rectangle of `rect_width` x `rect_height` centred in the image
pub fn centered_rect(width: u32, height: u32, rect_width: u32, rect_height: u32) -> (u32, u32, u32, u32) {
    ((width - rect_width) / 2, (height - rect_height) / 2, rect_width, rect_height)
}

/// 1024x768 photo of an exposed 300x80 strip
pub fn exposed_strip_scene() -> RgbImage {
    scene(1024, 768, centered_rect(1024, 768, 300, 80), EXPOSED, BACKGROUND)
}

pub fn flat(width: u32, height: u32, color: [u8; 3]) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb(color))
}

pub fn encode_png(image: &RgbImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(image.clone())
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("PNG encoding");
    bytes
}

/// Fresh scratch directory under the system temp dir
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("uvstrip-{}-{}", name, std::process::id()));
    std::fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}
