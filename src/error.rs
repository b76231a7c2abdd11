use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expert catalog entry {index} is missing its id")]
    MissingExpertId { index: usize },

    #[error("expert catalog contains duplicate id: {0}")]
    DuplicateExpertId(String),

    #[error("unknown expert: {0}")]
    UnknownExpert(String),

    #[error("{0}")]
    Stage(String),
}

pub type Result<T> = std::result::Result<T, Error>;
