use crate::error::ConfigError;
use crate::homography::DEFAULT_CONVEXITY_TOLERANCE;
use crate::matrix::DEFAULT_SINGULAR_EPS;
use crate::point::Point2;
use crate::shape::DEFAULT_COLLINEAR_TOLERANCE;

/// Tunables for [`Solver`](crate::homography::Solver).
///
/// With the `serde` feature every field is optional in TOML:
///
/// ```toml
/// singular_eps = 1e-9
/// collinear_tolerance = 0.001
/// convexity_tolerance = 1e-9
/// anchor = { x = 0.0, y = 0.0 }
/// canonicalize = true
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct SolverConfig {
    /// Determinant magnitude below which a matrix counts as singular.
    pub singular_eps: f64,
    /// Minimum `|det|` of the `(v00, v10, v01)` point matrix, in squared
    /// coordinate units.
    pub collinear_tolerance: f64,
    /// Margin the canonical fourth vertex must keep from the diagonal and
    /// the axes. Dimensionless.
    pub convexity_tolerance: f64,
    /// Corner ordering starts at the vertex nearest this point.
    pub anchor: Point2,
    /// Hull-order the input corners. When false the points are taken as
    /// `v00, v10, v11, v01` verbatim.
    pub canonicalize: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            singular_eps: DEFAULT_SINGULAR_EPS,
            collinear_tolerance: DEFAULT_COLLINEAR_TOLERANCE,
            convexity_tolerance: DEFAULT_CONVEXITY_TOLERANCE,
            anchor: Point2::ORIGIN,
            canonicalize: true,
        }
    }
}

impl SolverConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.singular_eps.is_finite() && self.singular_eps > 0.0) {
            return Err(ConfigError::Invalid {
                field: "singular_eps",
                reason: format!("must be positive and finite, got {}", self.singular_eps),
            });
        }
        if !(self.collinear_tolerance.is_finite() && self.collinear_tolerance >= 0.0) {
            return Err(ConfigError::Invalid {
                field: "collinear_tolerance",
                reason: format!(
                    "must be non-negative and finite, got {}",
                    self.collinear_tolerance
                ),
            });
        }
        if !(self.convexity_tolerance.is_finite() && self.convexity_tolerance >= 0.0) {
            return Err(ConfigError::Invalid {
                field: "convexity_tolerance",
                reason: format!(
                    "must be non-negative and finite, got {}",
                    self.convexity_tolerance
                ),
            });
        }
        if !self.anchor.is_finite() {
            return Err(ConfigError::Invalid {
                field: "anchor",
                reason: "coordinates must be finite".to_string(),
            });
        }
        Ok(())
    }

    /// Parse and validate a TOML config.
    #[cfg(feature = "serde")]
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: SolverConfig =
            toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}
