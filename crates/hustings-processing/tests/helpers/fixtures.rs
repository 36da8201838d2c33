//! Test fixtures: encoded images and stub transcoder scripts.

use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Gradient JPEG of the given size.
pub fn create_test_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Jpeg)
        .expect("Failed to encode JPEG");
    out.into_inner()
}

/// Semi-transparent PNG of the given size.
pub fn create_test_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([0, 120, 255, 200]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png)
        .expect("Failed to encode PNG");
    out.into_inner()
}

pub fn create_test_gif(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([255, 0, 0, 255]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Gif)
        .expect("Failed to encode GIF");
    out.into_inner()
}

/// Lossless WebP of the given size.
pub fn create_test_webp(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([20, 200, 60, 255]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::WebP)
        .expect("Failed to encode WebP");
    out.into_inner()
}

/// Transcoder stand-in that writes its own argument list to the output path (last argument).
pub const STUB_TRANSCODER: &str = r#"#!/bin/sh
for last; do :; done
printf '%s\n' "$*" > "$last"
"#;

/// Transcoder stand-in that always fails.
pub const FAILING_TRANSCODER: &str = r#"#!/bin/sh
echo "Invalid data found when processing input" >&2
exit 1
"#;

/// Write an executable script into `dir`.
#[cfg(unix)]
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, body).expect("Failed to write script");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("Failed to chmod script");
    path
}
