use std::path::PathBuf;
use thiserror::Error;

/// Failures while loading a displacement field or pairing it with a grid.
#[derive(Debug, Error)]
pub enum FieldError {
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}:{line}: column {column} is not a number: '{token}'")]
    Parse {
        path: PathBuf,
        line: usize,
        column: usize,
        token: String,
    },

    #[error("{path}:{line}: expected {expected} columns, found {found}")]
    Ragged {
        path: PathBuf,
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("Failed to read CSV '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("'{path}' does not form a rectangular matrix: {source}")]
    Layout {
        path: PathBuf,
        #[source]
        source: ndarray::ShapeError,
    },

    #[error("'{path}' contains no numeric rows")]
    Empty { path: PathBuf },

    #[error("dx has shape {dx:?} but dy has shape {dy:?}")]
    ShapeMismatch {
        dx: (usize, usize),
        dy: (usize, usize),
    },

    #[error("Coordinate grid has shape {grid:?} but the field has shape {field:?}")]
    GridMismatch {
        grid: (usize, usize),
        field: (usize, usize),
    },
}

pub type FieldResult<T> = Result<T, FieldError>;
