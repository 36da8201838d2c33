//! Transcoding engine
//!
//! Dispatches an upload to the transcoder for its family and moves the
//! result into the namespace directory under its canonical name.

use bytes::Bytes;
use hustings_core::{canonical_filename, Config, MediaError, MediaFamily};
use std::path::Path;
use std::sync::Arc;

use crate::audio::AudioTranscoder;
use crate::classifier::FormatClassifier;
use crate::image::ImageTranscoder;
use crate::scratch::PartialOutput;
use crate::traits::Transcoder;
use crate::video::VideoTranscoder;

/// One transcoder per media family.
#[derive(Clone)]
pub struct TranscodingEngine {
    classifier: FormatClassifier,
    image: Arc<dyn Transcoder>,
    video: Arc<dyn Transcoder>,
    audio: Arc<dyn Transcoder>,
}

impl TranscodingEngine {
    pub fn new(
        image: Arc<dyn Transcoder>,
        video: Arc<dyn Transcoder>,
        audio: Arc<dyn Transcoder>,
    ) -> Self {
        Self {
            classifier: FormatClassifier::new(),
            image,
            video,
            audio,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(ImageTranscoder::from_config(config)),
            Arc::new(VideoTranscoder::from_config(config)),
            Arc::new(AudioTranscoder::from_config(config)),
        )
    }

    /// Backend registered for `family`.
    pub fn transcoder_for(&self, family: MediaFamily) -> &Arc<dyn Transcoder> {
        match family {
            MediaFamily::Image => &self.image,
            MediaFamily::Video => &self.video,
            MediaFamily::Audio => &self.audio,
        }
    }

    /// Transcode `data` into `<directory>/<stem>.<canonical extension>`.
    ///
    /// Returns the stored filename. The file only appears once the transcoder
    /// has succeeded; an existing file with the same name is replaced.
    pub async fn transcode(
        &self,
        data: Bytes,
        content_type: &str,
        directory: &Path,
        stem: &str,
    ) -> Result<String, MediaError> {
        let family = self.classifier.classify(content_type)?;
        let transcoder = self.transcoder_for(family);
        if transcoder.family() != family {
            return Err(MediaError::UnsupportedType(format!(
                "{} (no {} transcoder configured)",
                content_type, family
            )));
        }

        let filename = canonical_filename(stem, family)?;
        let start = std::time::Instant::now();
        let input_size = data.len();

        let partial = PartialOutput::create(directory, &filename)?;
        transcoder.transcode(data, content_type, partial.path()).await?;
        let path = partial.commit()?;

        tracing::info!(
            family = %family,
            path = %path.display(),
            input_size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Transcoding completed"
        );

        Ok(filename)
    }
}
