use std::{io, path::PathBuf};

use polars::error::PolarsError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can abort a data load.
///
/// Recoverable conditions (empty groups, unknown sex codes, ages outside the
/// band scheme, missing payload fields) never surface here; they become nulls
/// at the point of derivation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required identifying column is absent from a geometry source.
    #[error("no column for {target:?} found, tried {candidates:?}")]
    Schema { target: String, candidates: Vec<String> },

    /// A whitelisted census column is absent from the header row.
    #[error("census file {path:?} is missing column {column:?}")]
    MissingColumn { path: PathBuf, column: String },

    /// A census row could not be parsed into its narrow numeric type.
    #[error("line {line}: column {column}: {message}")]
    Parse { line: u64, column: String, message: String },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Polars(#[from] PolarsError),

    #[error("shapefile {path:?}: {source}")]
    Shapefile {
        path: PathBuf,
        #[source]
        source: shapefile::Error,
    },

    #[error("unsupported shape in {path:?}: {shape}")]
    UnsupportedShape { path: PathBuf, shape: String },

    #[error("projection: {0}")]
    Projection(String),

    #[error("geometry count ({shapes}) does not match attribute rows ({rows})")]
    LengthMismatch { shapes: usize, rows: usize },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io { context: context.into(), source }
    }
}
