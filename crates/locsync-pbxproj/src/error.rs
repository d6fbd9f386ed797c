use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PbxError {
    #[error("failed to read project file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write project file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("project file parse error at line {line}, column {column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("project graph integrity: {message}")]
    GraphIntegrity { message: String },
}

impl PbxError {
    pub(crate) fn integrity(message: impl Into<String>) -> Self {
        Self::GraphIntegrity {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PbxError>;
