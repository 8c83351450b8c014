use thiserror::Error;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Frame extraction error: {0}")]
    Extraction(String),

    #[error("Overlay error: {0}")]
    Overlay(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Coarse error class reported alongside failure messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    Extraction,
    Overlay,
    Persistence,
}

impl SnapshotError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SnapshotError::InvalidArgument(_) | SnapshotError::Config(_) => ErrorKind::InvalidArgument,
            SnapshotError::Extraction(_) => ErrorKind::Extraction,
            SnapshotError::Overlay(_) => ErrorKind::Overlay,
            SnapshotError::Persistence(_)
            | SnapshotError::Io(_)
            | SnapshotError::Json(_)
            | SnapshotError::Toml(_)
            | SnapshotError::Image(_) => ErrorKind::Persistence,
        }
    }
}

pub type Result<T> = std::result::Result<T, SnapshotError>;
