use thiserror::Error;

/// Result type alias for preprocessing operations.
pub type Result<T> = std::result::Result<T, TimbreError>;

/// Errors produced while decoding and preprocessing audio.
#[derive(Error, Debug)]
pub enum TimbreError {
    /// Only mono and stereo targets are supported by `rechannel`.
    #[error("unsupported channel target: {requested} (supported: 1 or 2)")]
    UnsupportedChannelTarget { requested: usize },

    /// The requested clip duration resolves to zero samples.
    #[error("target duration {seconds}s at {sample_rate} Hz resolves to zero samples")]
    ZeroLengthTarget { seconds: f64, sample_rate: u32 },

    /// A waveform was paired with a transform built for a different rate.
    #[error("sample rate mismatch: expected {expected} Hz, got {actual} Hz")]
    SampleRateMismatch { expected: u32, actual: u32 },

    #[error("decoded audio was empty")]
    EmptyAudio,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("resample error: {0}")]
    Resample(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
