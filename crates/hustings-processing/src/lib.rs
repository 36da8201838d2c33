//! Hustings media processing
//!
//! Classifies uploads, transcodes them into one canonical format per family
//! (WebP, H.264 MP4, MP3) and drives the ingest/evict lifecycle on top of
//! `hustings-storage`.

pub mod audio;
pub mod classifier;
pub mod engine;
pub mod ffmpeg;
pub mod image;
pub mod pipeline;
pub mod scratch;
pub mod traits;
pub mod video;

pub use audio::AudioTranscoder;
pub use classifier::FormatClassifier;
pub use engine::TranscodingEngine;
pub use ffmpeg::{FfmpegCommand, FfmpegRunner};
pub use image::{EncodedImage, ImageTranscoder};
pub use pipeline::MediaPipeline;
pub use scratch::{PartialOutput, ScratchFile};
pub use traits::Transcoder;
pub use video::VideoTranscoder;
