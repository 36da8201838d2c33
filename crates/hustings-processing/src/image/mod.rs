mod resize;
mod transcoder;

pub use resize::{downscale_to_width, fit_width};
pub use transcoder::{EncodedImage, ImageTranscoder, WEBP_MAX_DIMENSION};
