mod transcoder;

pub use transcoder::VideoTranscoder;
