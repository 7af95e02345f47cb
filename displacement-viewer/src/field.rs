use crate::error::{FieldError, FieldResult};
use crate::loader::load_csv;
use ndarray::Array2;
use std::path::Path;

/// Horizontal and vertical displacement sampled on a `(rows, cols)` grid.
#[derive(Debug, Clone)]
pub struct DisplacementField {
    dx: Array2<f64>,
    dy: Array2<f64>,
}

impl DisplacementField {
    pub fn new(dx: Array2<f64>, dy: Array2<f64>) -> FieldResult<Self> {
        if dx.dim() != dy.dim() {
            return Err(FieldError::ShapeMismatch {
                dx: dx.dim(),
                dy: dy.dim(),
            });
        }
        Ok(Self { dx, dy })
    }

    /// Load both components and check that their shapes agree.
    pub fn load(dx_path: impl AsRef<Path>, dy_path: impl AsRef<Path>) -> FieldResult<Self> {
        let dx = load_csv(dx_path)?;
        let dy = load_csv(dy_path)?;
        Self::new(dx, dy)
    }

    pub fn dx(&self) -> &Array2<f64> {
        &self.dx
    }

    pub fn dy(&self) -> &Array2<f64> {
        &self.dy
    }

    /// `(rows, cols)`
    pub fn shape(&self) -> (usize, usize) {
        self.dx.dim()
    }

    pub fn len(&self) -> usize {
        self.dx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dx.is_empty()
    }

    /// Number of cells where both components are finite.
    pub fn valid_cells(&self) -> usize {
        self.dx
            .iter()
            .zip(self.dy.iter())
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn matching_shapes_are_accepted() {
        let field = DisplacementField::new(
            array![[1.0, 2.0], [3.0, 4.0]],
            array![[0.5, 0.5], [0.5, 0.5]],
        )
        .unwrap();
        assert_eq!(field.shape(), (2, 2));
        assert_eq!(field.len(), 4);
    }

    #[test]
    fn mismatched_shapes_are_rejected() {
        let err = DisplacementField::new(Array2::zeros((2, 3)), Array2::zeros((3, 2))).unwrap_err();
        match err {
            FieldError::ShapeMismatch { dx, dy } => {
                assert_eq!(dx, (2, 3));
                assert_eq!(dy, (3, 2));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn valid_cells_skip_nan_in_either_component() {
        let field = DisplacementField::new(
            array![[3.0, f64::NAN], [0.0, 1.0]],
            array![[4.0, 1.0], [f64::INFINITY, 1.0]],
        )
        .unwrap();
        assert_eq!(field.valid_cells(), 2);
    }

    #[test]
    fn all_nan_field_has_no_valid_cells() {
        let field = DisplacementField::new(
            Array2::from_elem((2, 2), f64::NAN),
            Array2::from_elem((2, 2), f64::NAN),
        )
        .unwrap();
        assert_eq!(field.valid_cells(), 0);
        assert_eq!(field.len(), 4);
    }
}
