use std::path::PathBuf;
use thiserror::Error;

/// Failure while building the registry. The build is abandoned.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("duplicate editable id '{id}' (structural names must be unique per kind)")]
    DuplicateId { id: String },
    #[error("group '{name}' has an invalid pattern")]
    InvalidGroupPattern {
        name: String,
        #[source]
        source: regex::Error,
    },
}

#[derive(Debug, Error)]
pub enum PresetError {
    #[error("reading preset {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing preset {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("writing preset {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("encoding preset document")]
    Encode(#[source] serde_json::Error),
}
