use crate::error::FieldResult;
use crate::field::DisplacementField;
use crate::grid::CoordinateGrid;
use serde::{Deserialize, Serialize};

/// Fraction of the grid spacing covered by the longest arrow when autoscaling.
const AUTOSCALE_FILL: f64 = 0.9;

/// Vertical axis convention of the plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// y grows upwards, `dy` is drawn as is.
    #[default]
    Cartesian,
    /// Origin top-left, y axis inverted, `dy` negated.
    Image,
}

impl Orientation {
    pub fn vertical_component(self, dy: f64) -> f64 {
        match self {
            Orientation::Cartesian => dy,
            Orientation::Image => -dy,
        }
    }

    pub fn inverts_y_axis(self) -> bool {
        matches!(self, Orientation::Image)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arrow {
    pub x: f64,
    pub y: f64,
    pub u: f64,
    pub v: f64,
}

impl Arrow {
    pub fn magnitude(&self) -> f64 {
        self.u.hypot(self.v)
    }

    pub fn is_drawable(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.u.is_finite() && self.v.is_finite()
    }
}

/// One arrow per field cell, in row-major order.
#[derive(Debug, Clone)]
pub struct Quiver {
    arrows: Vec<Arrow>,
    orientation: Orientation,
    spacing: f64,
    x_bounds: (f64, f64),
    y_bounds: (f64, f64),
}

impl Quiver {
    /// Pair a field with its grid. Without a grid the cell index grid is used.
    pub fn build(
        field: &DisplacementField,
        grid: Option<&CoordinateGrid>,
        orientation: Orientation,
    ) -> FieldResult<Self> {
        let (rows, cols) = field.shape();
        let default_grid;
        let grid = match grid {
            Some(grid) => grid,
            None => {
                default_grid = CoordinateGrid::cell_indices(rows, cols);
                &default_grid
            }
        };
        grid.ensure_matches(field.shape())?;

        let mut arrows = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                arrows.push(Arrow {
                    x: grid.x(col),
                    y: grid.y(row),
                    u: field.dx()[[row, col]],
                    v: orientation.vertical_component(field.dy()[[row, col]]),
                });
            }
        }

        Ok(Self {
            arrows,
            orientation,
            spacing: grid.min_spacing(),
            x_bounds: grid.x_bounds(),
            y_bounds: grid.y_bounds(),
        })
    }

    pub fn arrows(&self) -> &[Arrow] {
        &self.arrows
    }

    pub fn len(&self) -> usize {
        self.arrows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrows.is_empty()
    }

    pub fn drawable(&self) -> impl Iterator<Item = &Arrow> {
        self.arrows.iter().filter(|a| a.is_drawable())
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    pub fn x_bounds(&self) -> (f64, f64) {
        self.x_bounds
    }

    pub fn y_bounds(&self) -> (f64, f64) {
        self.y_bounds
    }

    /// Largest finite arrow length, or 0.0 if nothing is drawable.
    pub fn max_magnitude(&self) -> f64 {
        self.drawable()
            .map(Arrow::magnitude)
            .filter(|m| m.is_finite())
            .fold(0.0_f64, f64::max)
    }

    /// Data units per unit of displacement such that the longest arrow
    /// spans most of one grid cell.
    pub fn auto_scale(&self) -> f64 {
        let max = self.max_magnitude();
        if max > 0.0 {
            AUTOSCALE_FILL * self.spacing / max
        } else {
            1.0
        }
    }
}
