pub mod error;
pub mod config;
#[allow(clippy::needless_range_loop)]
pub mod matrix;
pub mod point;
#[allow(clippy::needless_range_loop)]
pub mod shape;
pub mod hull;
pub mod affine;
#[allow(clippy::needless_range_loop)]
pub mod homography;
pub mod batch;

pub use config::SolverConfig;
pub use error::{QuadRole, SolveError};
pub use homography::{perspective_transform, Homography, PerspectiveSolution, Solver};
pub use point::Point2;
pub use shape::{Quadrilateral, Triangle};
