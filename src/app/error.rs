use thiserror::Error;

use crate::config::ConfigError;
use crate::domain::VerseReference;

#[derive(Error, Debug)]
pub enum NectarError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid verse reference: {0}")]
    InvalidReference(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Could not fetch verse {0} from any provider")]
    FetchExhausted(VerseReference),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Publish error: {0}")]
    Publish(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl From<ConfigError> for NectarError {
    fn from(e: ConfigError) -> Self {
        NectarError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, NectarError>;
