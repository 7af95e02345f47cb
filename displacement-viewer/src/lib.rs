//! Quiver plots of displacement fields stored as pairs of CSV matrices.
//!
//! `dx` and `dy` are loaded into [`ndarray::Array2`] values of identical shape,
//! paired with a coordinate grid and drawn as one arrow per cell.

pub mod config;
pub mod display;
pub mod error;
pub mod field;
pub mod grid;
pub mod loader;
pub mod quiver;
pub mod sequence;
pub mod visualisation;

pub use config::Config;
pub use error::{FieldError, FieldResult};
pub use field::DisplacementField;
pub use grid::CoordinateGrid;
pub use quiver::{Arrow, Orientation, Quiver};
pub use visualisation::{QuiverVisualiser, RenderOptions};
