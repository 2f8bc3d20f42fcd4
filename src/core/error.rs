use thiserror::Error;

#[derive(Error, Debug)]
pub enum KoroError {
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("Reasoning service error: {0}")]
    Reasoning(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Unknown brain mode: {0}")]
    UnknownMode(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, KoroError>;
