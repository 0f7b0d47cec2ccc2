// Re-export glam for convenience
pub use glam::*;

// Unicornify math types
mod bounds;
mod camera;
mod interval;
mod solver;
mod vector;

pub use bounds::{Bounds, PixelRect};
pub use camera::{SphereProjection, WorldView};
pub use interval::Interval;
pub use solver::intersection_of_plane_and_line;
pub use vector::{cross_axes, Axis, Vector, VectorExt, DEGREE};
