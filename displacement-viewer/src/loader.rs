use crate::error::{FieldError, FieldResult};
use ndarray::Array2;
use std::fs;
use std::path::Path;

/// Read a comma separated numeric matrix (no header) into an `Array2`.
pub fn load_csv(path: impl AsRef<Path>) -> FieldResult<Array2<f64>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| FieldError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let data = parse_csv(&content, path)?;
    tracing::debug!(
        "Loaded {} ({} x {})",
        path.display(),
        data.nrows(),
        data.ncols()
    );
    Ok(data)
}

/// Parse CSV text. `origin` is only used to label errors.
///
/// Blank lines and `#` comments are skipped. Every row must have as many
/// columns as the first one.
pub fn parse_csv(content: &str, origin: &Path) -> FieldResult<Array2<f64>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .flexible(false)
        .from_reader(content.as_bytes());

    let mut values = Vec::new();
    let mut ncols = 0;
    let mut nrows = 0;

    for result in reader.records() {
        let record = result.map_err(|e| csv_error(e, origin))?;
        let line = record.position().map_or(nrows + 1, |p| p.line() as usize);

        for (col, token) in record.iter().enumerate() {
            let value: f64 = token.parse().map_err(|_| FieldError::Parse {
                path: origin.to_path_buf(),
                line,
                column: col + 1,
                token: token.to_string(),
            })?;
            values.push(value);
        }
        ncols = record.len();
        nrows += 1;
    }

    if nrows == 0 {
        return Err(FieldError::Empty {
            path: origin.to_path_buf(),
        });
    }

    Array2::from_shape_vec((nrows, ncols), values).map_err(|source| FieldError::Layout {
        path: origin.to_path_buf(),
        source,
    })
}

fn csv_error(err: csv::Error, origin: &Path) -> FieldError {
    if let csv::ErrorKind::UnequalLengths {
        pos,
        expected_len,
        len,
    } = err.kind()
    {
        return FieldError::Ragged {
            path: origin.to_path_buf(),
            line: pos.as_ref().map_or(0, |p| p.line() as usize),
            expected: *expected_len as usize,
            found: *len as usize,
        };
    }
    FieldError::Csv {
        path: origin.to_path_buf(),
        source: err,
    }
}
