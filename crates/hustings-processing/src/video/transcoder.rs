use async_trait::async_trait;
use bytes::Bytes;
use hustings_core::constants::VIDEO_CODEC;
use hustings_core::{Config, MediaError, MediaFamily};
use std::path::{Path, PathBuf};

use crate::classifier::FormatClassifier;
use crate::ffmpeg::{FfmpegCommand, FfmpegRunner};
use crate::scratch::ScratchFile;
use crate::traits::Transcoder;

/// Re-encodes video to H.264 MP4 through FFmpeg.
#[derive(Debug, Clone)]
pub struct VideoTranscoder {
    runner: FfmpegRunner,
    scratch_dir: PathBuf,
    preset: String,
    crf: u8,
}

impl VideoTranscoder {
    pub fn new(
        runner: FfmpegRunner,
        scratch_dir: impl Into<PathBuf>,
        preset: impl Into<String>,
        crf: u8,
    ) -> Self {
        Self {
            runner,
            scratch_dir: scratch_dir.into(),
            preset: preset.into(),
            crf,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            FfmpegRunner::new(config.ffmpeg_path()),
            config.scratch_dir(),
            config.video_preset(),
            config.video_crf(),
        )
    }

    pub fn command(&self, input: &Path, output: &Path) -> FfmpegCommand {
        FfmpegCommand::new(input, output)
            .video_codec(VIDEO_CODEC)
            .preset(self.preset.as_str())
            .crf(self.crf)
            .output_format("mp4")
    }
}

#[async_trait]
impl Transcoder for VideoTranscoder {
    fn family(&self) -> MediaFamily {
        MediaFamily::Video
    }

    async fn transcode(
        &self,
        data: Bytes,
        content_type: &str,
        output: &Path,
    ) -> Result<(), MediaError> {
        let extension = FormatClassifier::new().video_input_extension(content_type)?;
        let scratch = ScratchFile::write(&self.scratch_dir, &data, extension).await?;

        let result = self.runner.run(&self.command(scratch.path(), output)).await;
        scratch.close();
        result
    }
}
