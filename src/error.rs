use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoriesError {
    #[error("invalid argument {0:?}")]
    InvalidArgument(String),

    #[error("invalid value {value:?} for --{parameter}")]
    InvalidValue {
        parameter: &'static str,
        value: String,
    },

    #[error("failed to access snapshot file {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed snapshot file")]
    Json(#[from] serde_json::Error),

    #[error("duplicate story id {0:?} in snapshot")]
    DuplicateId(String),
}
