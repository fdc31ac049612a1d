use thiserror::Error;

#[derive(Error, Debug)]
pub enum DubflowError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Media processing error: {0}")]
    Media(String),

    #[error("Transcription error: {0}")]
    Transcribe(String),

    #[error("Word alignment error: {0}")]
    Align(String),

    #[error("Translation error: {0}")]
    Translate(String),

    #[error("Prosody synthesis error: {0}")]
    Prosody(String),

    #[error("Audio decoding error: {0}")]
    Audio(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Segment count mismatch: {aligned} aligned segments vs {translated} translated segments")]
    SegmentMismatch { aligned: usize, translated: usize },
}

pub type Result<T> = std::result::Result<T, DubflowError>;
