use crate::error::{FieldError, FieldResult};

/// Plot coordinates of each field cell. `xs` indexes columns, `ys` rows.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateGrid {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
}

impl CoordinateGrid {
    pub fn cell_indices(rows: usize, cols: usize) -> Self {
        // x = column index, y = row index
        CoordinateGrid {
            xs: (0..cols).map(|i| i as f64).collect(),
            ys: (0..rows).map(|k| k as f64).collect(),
        }
    }

    pub fn pixel_linspace(width: u32, height: u32, n: usize) -> Self {
        // n samples per axis across [0, width] x [0, height], truncated to whole pixels
        CoordinateGrid {
            xs: linspace_pixels(width, n),
            ys: linspace_pixels(height, n),
        }
    }

    /// `(rows, cols)`, the same convention as `Array2::dim`.
    pub fn shape(&self) -> (usize, usize) {
        (self.ys.len(), self.xs.len())
    }

    pub fn ensure_matches(&self, field_shape: (usize, usize)) -> FieldResult<()> {
        if self.shape() != field_shape {
            return Err(FieldError::GridMismatch {
                grid: self.shape(),
                field: field_shape,
            });
        }
        Ok(())
    }

    pub fn x(&self, col: usize) -> f64 {
        self.xs[col]
    }

    pub fn y(&self, row: usize) -> f64 {
        self.ys[row]
    }

    pub fn x_bounds(&self) -> (f64, f64) {
        bounds(&self.xs)
    }

    pub fn y_bounds(&self) -> (f64, f64) {
        bounds(&self.ys)
    }

    /// Smallest positive distance between neighbouring samples on either axis.
    /// Falls back to 1.0 for a single-sample grid.
    pub fn min_spacing(&self) -> f64 {
        let spacing = min_step(&self.xs).min(min_step(&self.ys));
        if spacing.is_finite() {
            spacing
        } else {
            1.0
        }
    }
}

fn linspace_pixels(extent: u32, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => {
            let step = extent as f64 / (n - 1) as f64;
            (0..n)
                .map(|i| {
                    if i == n - 1 {
                        extent as f64
                    } else {
                        (i as f64 * step).trunc()
                    }
                })
                .collect()
        }
    }
}

fn bounds(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}

fn min_step(values: &[f64]) -> f64 {
    values
        .windows(2)
        .map(|w| (w[1] - w[0]).abs())
        .filter(|d| *d > 0.0)
        .fold(f64::INFINITY, f64::min)
}
