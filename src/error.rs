use std::path::PathBuf;

use thiserror::Error;

pub type CaskResult<T> = Result<T, CaskError>;

#[derive(Error, Debug)]
pub enum CaskError {
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Could not determine the {0} directory; pass it explicitly")]
    MissingDir(&'static str),
}

impl CaskError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}
