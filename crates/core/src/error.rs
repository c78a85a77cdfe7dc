/// Result alias that carries the custom [`VisualiserError`] type.
pub type Result<T> = std::result::Result<T, VisualiserError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum VisualiserError {
    /// Free-form message for failures that have no dedicated variant.
    #[error("{0}")]
    Message(String),
    /// Input rejected by the analysis pipeline.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// Frame properties that break the effect contract.
    #[error("invalid visualizer props: {0}")]
    InvalidProps(String),
    /// Effect name that does not match any known effect.
    #[error("unknown effect `{0}`")]
    UnknownEffect(String),
    /// A mesh references a geometry buffer that has already been released.
    #[error("mesh references released geometry #{0}")]
    DanglingGeometry(u64),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Configuration or snapshot (de)serialisation failure.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    /// FFT planning or processing failure.
    #[error("{0}")]
    Fft(#[from] realfft::FftError),
}

impl VisualiserError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}
