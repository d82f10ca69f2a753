use thiserror::Error;

#[derive(Debug, Error)]
pub enum AutocorrError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unsupported window size: {0}")]
    UnsupportedWindowSize(usize),

    #[error("FFT error: {0}")]
    FftError(String),
}

pub type Result<T> = std::result::Result<T, AutocorrError>;
