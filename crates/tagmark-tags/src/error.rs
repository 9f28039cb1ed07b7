//! Error types for the stock tag set.

use std::io;
use std::path::PathBuf;

use tagmark::TagmarkError;

/// Errors that can occur while configuring or registering the stock tags.
#[derive(Debug, thiserror::Error)]
pub enum TagsError {
    /// The configuration file could not be read.
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The configuration is not valid YAML for [`TagsConfig`](crate::TagsConfig).
    #[error("Invalid tags config: {0}")]
    Config(#[from] serde_yaml::Error),

    /// A stock definition failed to build or register.
    #[error(transparent)]
    Registry(#[from] TagmarkError),
}

pub type Result<T> = std::result::Result<T, TagsError>;
