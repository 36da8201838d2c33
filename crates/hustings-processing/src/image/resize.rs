use image::{imageops::FilterType, DynamicImage, GenericImageView};

/// Target size for an image wider than `max_width`, keeping the aspect ratio.
///
/// Returns `None` when no resize is needed.
pub fn fit_width(width: u32, height: u32, max_width: u32) -> Option<(u32, u32)> {
    if width <= max_width || width == 0 {
        return None;
    }

    let height = (height as f64 * max_width as f64 / width as f64).round() as u32;
    Some((max_width, height.max(1)))
}

/// Downscale `img` to at most `max_width` pixels wide (Lanczos3). Never upscales.
pub fn downscale_to_width(img: DynamicImage, max_width: u32) -> DynamicImage {
    let (width, height) = img.dimensions();
    match fit_width(width, height, max_width) {
        Some((w, h)) => img.resize_exact(w, h, FilterType::Lanczos3),
        None => img,
    }
}
