use thiserror::Error;
use std::io;

#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("Collection failed: {0}")]
    Collection(#[from] CollectionError),

    #[error("Configuration failed: {0}")]
    Config(#[from] ConfigError),

    #[error("Row {row} does not exist ({rows} rows)")]
    RowOutOfRange { row: usize, rows: usize },
}

#[derive(Error, Debug)]
pub enum CollectionError {
    #[error("{0} not found")]
    PathNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to parse data: {0}")]
    Parse(String),

    #[error("Decryption failed: {0}")]
    Decryption(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("System API error: {0}")]
    SystemApi(String),

    #[error("{0} is only available on Windows")]
    UnsupportedPlatform(&'static str),
}

impl From<serde_json::Error> for CollectionError {
    fn from(err: serde_json::Error) -> Self {
        CollectionError::Parse(err.to_string())
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Unknown service: {0}")]
    UnknownService(String),

    #[error("Invalid profile: {0}")]
    Invalid(String),
}
