use std::path::PathBuf;
use thiserror::Error;

pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum EtlError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Could not connect to the database: {0}")]
    Connection(#[source] BoxedError),

    #[error("Path not found: {}", .0.display())]
    PathNotFound(PathBuf),

    #[error("Failed to parse {}:{line}: {reason}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Failed to insert into {table}: {source}")]
    Insert {
        table: &'static str,
        #[source]
        source: BoxedError,
    },

    #[error("{context}: {source}")]
    Query {
        context: String,
        #[source]
        source: BoxedError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EtlError {
    pub fn parse<P: Into<PathBuf>, S: Into<String>>(path: P, line: usize, reason: S) -> Self {
        EtlError::Parse {
            path: path.into(),
            line,
            reason: reason.into(),
        }
    }

    pub fn insert<E: Into<BoxedError>>(table: &'static str, source: E) -> Self {
        EtlError::Insert {
            table,
            source: source.into(),
        }
    }

    pub fn query<S: Into<String>, E: Into<BoxedError>>(context: S, source: E) -> Self {
        EtlError::Query {
            context: context.into(),
            source: source.into(),
        }
    }
}
