use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that prevent a context from being produced at all. Everything
/// else in the pipeline degrades to a fallback value or a per-file status.
#[derive(Debug, Error)]
pub enum RenderError {
    /// An explicitly requested configuration file could not be read.
    #[error("cannot read config {path}: {source}")]
    ConfigLoad {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Malformed configuration content; aborts before any rendering.
    #[error("cannot parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

pub type Result<T> = std::result::Result<T, RenderError>;
