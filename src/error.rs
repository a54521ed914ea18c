use thiserror::Error;

#[derive(Error, Debug)]
pub enum BurnError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("Failed to launch encoder: {0}")]
    EncoderLaunch(String),

    #[error("Encoder failed: {0}")]
    EncoderFailed(String),

    #[error("Media processing error: {0}")]
    Media(String),
}

pub type Result<T> = std::result::Result<T, BurnError>;
