use std::fmt;

use thiserror::Error;

/// Failures of the 3x3 matrix primitives.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum MatrixError {
    #[error("matrix is singular (determinant {determinant:e})")]
    Singular { determinant: f64 },

    #[error("division by near-zero scalar {0:e}")]
    DivideByZero(f64),
}

/// Failures of the counter-clockwise corner ordering.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum OrderError {
    #[error("point {index} has a non-finite coordinate")]
    NonFinite { index: usize },

    #[error("only {0} distinct non-collinear points")]
    Degenerate(usize),

    #[error("convex hull has {0} vertices, expected 4")]
    NotStrictlyConvex(usize),
}

/// Which of the two quadrilaterals a solve failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum QuadRole {
    /// The source quadrilateral `p`.
    From,
    /// The destination quadrilateral `q`.
    To,
}

impl fmt::Display for QuadRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuadRole::From => f.write_str("source"),
            QuadRole::To => f.write_str("destination"),
        }
    }
}

/// The solver stage at which a matrix turned out to be singular.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolveStep {
    /// Fitting the affine map from the canonical triangle.
    CanonicalAffine,
    /// Inverting that affine map.
    InvertAffine,
    /// Composing the final homography.
    Compose,
}

impl fmt::Display for SolveStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveStep::CanonicalAffine => f.write_str("canonical affine fit"),
            SolveStep::InvertAffine => f.write_str("affine inversion"),
            SolveStep::Compose => f.write_str("homography composition"),
        }
    }
}

/// Why a quadrilateral was judged non-convex.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConvexityViolation {
    #[error("convex hull has only {0} vertices")]
    HullVertices(usize),

    #[error("convexity scalar {0} is not positive")]
    Scalar(f64),

    #[error("fourth vertex ({a}, {b}) lies outside the positive canonical quadrant")]
    CanonicalCoordinate { a: f64, b: f64 },
}

/// Errors returned by the homography solver.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolveError {
    #[error("{role} quadrilateral: singular matrix during {step} (determinant {determinant:e})")]
    SingularMatrix {
        role: QuadRole,
        step: SolveStep,
        determinant: f64,
    },

    #[error("{role} quadrilateral is not convex: {violation}")]
    NonConvexInput {
        role: QuadRole,
        violation: ConvexityViolation,
    },

    #[error("{role} quadrilateral is degenerate: {reason}")]
    DegenerateInput { role: QuadRole, reason: String },
}

impl SolveError {
    /// The quadrilateral the failure was detected on.
    pub fn role(&self) -> QuadRole {
        match self {
            SolveError::SingularMatrix { role, .. }
            | SolveError::NonConvexInput { role, .. }
            | SolveError::DegenerateInput { role, .. } => *role,
        }
    }

    /// Short machine-readable name of the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            SolveError::SingularMatrix { .. } => "singular_matrix",
            SolveError::NonConvexInput { .. } => "non_convex_input",
            SolveError::DegenerateInput { .. } => "degenerate_input",
        }
    }

    pub(crate) fn from_order(role: QuadRole, err: OrderError) -> Self {
        match err {
            OrderError::NotStrictlyConvex(n) => SolveError::NonConvexInput {
                role,
                violation: ConvexityViolation::HullVertices(n),
            },
            other => SolveError::DegenerateInput {
                role,
                reason: other.to_string(),
            },
        }
    }

    pub(crate) fn singular(role: QuadRole, step: SolveStep, err: MatrixError) -> Self {
        let determinant = match err {
            MatrixError::Singular { determinant } => determinant,
            MatrixError::DivideByZero(v) => v,
        };
        SolveError::SingularMatrix {
            role,
            step,
            determinant,
        }
    }
}

/// Errors loading or validating a [`SolverConfig`](crate::config::SolverConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(String),

    #[error("invalid config value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}
