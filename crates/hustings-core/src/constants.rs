//! Constants shared by the storage and processing crates.

/// Content types accepted as images.
pub const IMAGE_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Content types accepted as video.
pub const VIDEO_CONTENT_TYPES: &[&str] = &["video/mp4", "video/avi", "video/mov", "video/mkv"];

/// Content types accepted as audio.
pub const AUDIO_CONTENT_TYPES: &[&str] = &[
    "audio/mpeg",
    "audio/wav",
    "audio/ogg",
    "audio/aac",
    "audio/webm",
];

/// Trailing directory segment appended to nested entity namespaces.
pub const IMAGES_SEGMENT: &str = "images";

/// Namespace prefix that receives the `images` suffix unless configured otherwise.
pub const DEFAULT_NESTED_PREFIX: &str = "voters";

pub const DEFAULT_SERVER_URL: &str = "http://localhost:5000";
pub const DEFAULT_UPLOAD_ROOT: &str = "./Uploads";
pub const DEFAULT_UPLOAD_URL_PREFIX: &str = "Uploads";
pub const DEFAULT_FFMPEG_PATH: &str = "ffmpeg";

pub const IMAGE_MAX_WIDTH: u32 = 2000;
pub const IMAGE_QUALITY: u8 = 90;
pub const VIDEO_CODEC: &str = "libx264";
pub const VIDEO_PRESET: &str = "fast";
pub const VIDEO_CRF: u8 = 28;
pub const AUDIO_CODEC: &str = "libmp3lame";
pub const AUDIO_BITRATE_KBPS: u32 = 192;

/// Prefix of scratch files written for the external transcoder.
pub const SCRATCH_PREFIX: &str = "scratch_";
