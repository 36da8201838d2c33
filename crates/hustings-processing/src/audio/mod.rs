mod transcoder;

pub use transcoder::AudioTranscoder;
