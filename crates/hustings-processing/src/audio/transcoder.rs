use async_trait::async_trait;
use bytes::Bytes;
use hustings_core::constants::AUDIO_CODEC;
use hustings_core::{Config, MediaError, MediaFamily};
use std::path::{Path, PathBuf};

use crate::classifier::FormatClassifier;
use crate::ffmpeg::{FfmpegCommand, FfmpegRunner};
use crate::scratch::ScratchFile;
use crate::traits::Transcoder;

/// Re-encodes audio to MP3 through FFmpeg.
///
/// The input container is passed with `-f`, taken from the declared content type.
#[derive(Debug, Clone)]
pub struct AudioTranscoder {
    runner: FfmpegRunner,
    scratch_dir: PathBuf,
    bitrate_kbps: u32,
}

impl AudioTranscoder {
    pub fn new(runner: FfmpegRunner, scratch_dir: impl Into<PathBuf>, bitrate_kbps: u32) -> Self {
        Self {
            runner,
            scratch_dir: scratch_dir.into(),
            bitrate_kbps,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            FfmpegRunner::new(config.ffmpeg_path()),
            config.scratch_dir(),
            config.audio_bitrate_kbps(),
        )
    }

    pub fn command(&self, input_format: &str, input: &Path, output: &Path) -> FfmpegCommand {
        FfmpegCommand::new(input, output)
            .input_format(input_format)
            .no_video()
            .audio_codec(AUDIO_CODEC)
            .audio_bitrate_kbps(self.bitrate_kbps)
            .output_format("mp3")
    }
}

#[async_trait]
impl Transcoder for AudioTranscoder {
    fn family(&self) -> MediaFamily {
        MediaFamily::Audio
    }

    async fn transcode(
        &self,
        data: Bytes,
        content_type: &str,
        output: &Path,
    ) -> Result<(), MediaError> {
        let input_format = FormatClassifier::new().audio_input_format(content_type)?;
        let scratch = ScratchFile::write(&self.scratch_dir, &data, input_format).await?;

        let command = self.command(input_format, scratch.path(), output);
        let result = self.runner.run(&command).await;
        scratch.close();
        result
    }
}
