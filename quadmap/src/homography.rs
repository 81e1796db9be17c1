use log::{debug, trace};

use crate::affine::{affine_between, project};
use crate::config::SolverConfig;
use crate::error::{ConvexityViolation, MatrixError, QuadRole, SolveError, SolveStep};
use crate::hull::canonical_quadrilateral;
use crate::matrix::{Matrix3, Vec3};
use crate::point::Point2;
use crate::shape::{Quadrilateral, Triangle};

/// Default [`SolverConfig::convexity_tolerance`].
pub const DEFAULT_CONVEXITY_TOLERANCE: f64 = 1e-9;

/// A 3x3 projective transform acting on column vectors: `(x', y', w') = H * (x, y, 1)`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Homography {
    pub matrix: Matrix3,
}

impl Homography {
    pub fn new(matrix: Matrix3) -> Self {
        Self { matrix }
    }

    /// Map a point, or `None` if it lands on the line at infinity.
    pub fn apply(&self, p: Point2) -> Option<Point2> {
        self.matrix.mul_vec(&Vec3::from_point(p)).to_point()
    }

    /// Map a point without guarding the division by `w`.
    pub fn apply_unchecked(&self, p: Point2) -> Point2 {
        self.matrix.mul_vec(&Vec3::from_point(p)).to_point_unchecked()
    }

    pub fn inverse(&self, eps: f64) -> Result<Self, MatrixError> {
        self.matrix.try_inverse(eps).map(Self::new)
    }

    /// The same transform scaled so that `h22 = 1`.
    pub fn normalized(&self) -> Option<Self> {
        self.matrix.normalized().map(Self::new)
    }
}

/// A solved perspective transform together with the corner labeling it
/// was solved under: `homography` maps `from.vXY` onto `to.vXY`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PerspectiveSolution {
    pub homography: Homography,
    /// Source corners after ordering.
    pub from: Quadrilateral,
    /// Destination corners after ordering.
    pub to: Quadrilateral,
    /// Convexity scalar of the source, `a + b - 1`.
    pub s: f64,
    /// Convexity scalar of the destination, `c + d - 1`.
    pub t: f64,
}

impl PerspectiveSolution {
    /// Distance between `H * from.vXY` and `to.vXY` for each label, in
    /// `v00, v10, v11, v01` order. A vertex sent to infinity scores `inf`.
    pub fn residuals(&self) -> [f64; 4] {
        let src = self.from.points();
        let dst = self.to.points();
        let mut out = [0.0; 4];
        for i in 0..4 {
            out[i] = match self.homography.apply(src[i]) {
                Some(p) => p.distance(&dst[i]),
                None => f64::INFINITY,
            };
        }
        out
    }

    pub fn max_residual(&self) -> f64 {
        self.residuals().iter().fold(0.0f64, |a, &b| a.max(b))
    }
}

/// Perspective-transform solver following Eberly's affine decomposition.
///
/// Both quadrilaterals are reduced to the canonical triangle
/// `(0,0), (1,0), (0,1)` by affine maps built from `v00, v10, v01`. The
/// leftover fourth corners `(a, b)` and `(c, d)` fix a fractional linear map
/// `F` between the two canonical quadrilaterals, and
/// `H = A_q * F * inv(A_p)`.
#[derive(Debug, Clone, Default)]
pub struct Solver {
    pub config: SolverConfig,
}

/// Per-quadrilateral data from the affine reduction.
struct CanonicalFrame {
    affine: Matrix3,
    inverse: Matrix3,
    /// Fourth vertex `v11` in canonical coordinates.
    corner: Point2,
}

impl Solver {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Solve for the transform taking the corners `from` onto `to`.
    ///
    /// The corners may be given in any order; with `config.canonicalize`
    /// they are hull-ordered counter-clockwise starting nearest to
    /// `config.anchor`, and the returned solution records that labeling.
    pub fn solve(
        &self,
        from: &[Point2; 4],
        to: &[Point2; 4],
    ) -> Result<PerspectiveSolution, SolveError> {
        let p = self.order(from, QuadRole::From)?;
        let q = self.order(to, QuadRole::To)?;
        self.solve_ordered(&p, &q)
    }

    /// Solve for quadrilaterals whose labels are already correct.
    pub fn solve_ordered(
        &self,
        p: &Quadrilateral,
        q: &Quadrilateral,
    ) -> Result<PerspectiveSolution, SolveError> {
        check_finite(p, QuadRole::From)?;
        check_finite(q, QuadRole::To)?;

        let fp = self.canonical_frame(p, QuadRole::From)?;
        let fq = self.canonical_frame(q, QuadRole::To)?;

        let (a, b) = (fp.corner.x, fp.corner.y);
        let (c, d) = (fq.corner.x, fq.corner.y);
        let s = a + b - 1.0;
        let t = c + d - 1.0;
        trace!("canonical corners p=({a}, {b}) q=({c}, {d}), s={s}, t={t}");

        let tol = self.config.convexity_tolerance;
        check_convexity(QuadRole::From, a, b, s, tol)?;
        check_convexity(QuadRole::To, c, d, t, tol)?;

        let f = fractional_linear(a, b, c, d, s, t);
        let h = fq.affine * f * fp.inverse;

        // v00, v10, v11, v01 land at w = abt, bcs, abs, ads whatever the
        // coordinate scale, so an absolute test on w is enough.
        let at_infinity = p
            .points()
            .iter()
            .position(|v| h.mul_vec(&Vec3::from_point(*v)).to_point().is_none());
        if !h.is_finite() || at_infinity.is_some() {
            let determinant = h.determinant();
            debug!("degenerate homography (det {determinant:e}), corner {at_infinity:?}");
            let role = if at_infinity.is_some() {
                QuadRole::From
            } else {
                QuadRole::To
            };
            return Err(SolveError::SingularMatrix {
                role,
                step: SolveStep::Compose,
                determinant,
            });
        }

        Ok(PerspectiveSolution {
            homography: Homography::new(h),
            from: *p,
            to: *q,
            s,
            t,
        })
    }

    fn order(&self, corners: &[Point2; 4], role: QuadRole) -> Result<Quadrilateral, SolveError> {
        if !self.config.canonicalize {
            return Ok(Quadrilateral::from_points(*corners));
        }
        canonical_quadrilateral(corners, self.config.anchor).map_err(|e| {
            debug!("cannot order {role} corners: {e}");
            SolveError::from_order(role, e)
        })
    }

    fn canonical_frame(
        &self,
        quad: &Quadrilateral,
        role: QuadRole,
    ) -> Result<CanonicalFrame, SolveError> {
        // A collinear (v00, v10, v01) leaves the canonical affine map
        // without an inverse.
        let tri = quad.affine_triangle();
        if tri.is_collinear(self.config.collinear_tolerance) {
            let determinant = tri.to_matrix().determinant();
            debug!("{role} triangle (v00, v10, v01) is collinear (det {determinant:e}): {tri:?}");
            return Err(SolveError::SingularMatrix {
                role,
                step: SolveStep::CanonicalAffine,
                determinant,
            });
        }

        let eps = self.config.singular_eps;
        let affine = affine_between(&Triangle::CANONICAL, &tri, eps)
            .map_err(|e| SolveError::singular(role, SolveStep::CanonicalAffine, e))?;
        let inverse = affine.try_inverse(eps).map_err(|e| {
            debug!("{role} affine map is not invertible: {e}");
            SolveError::singular(role, SolveStep::InvertAffine, e)
        })?;

        // An affine inverse keeps w = 1, so the projection cannot fail for
        // finite input.
        let corner = project(&inverse, quad.v11).ok_or_else(|| SolveError::DegenerateInput {
            role,
            reason: "v11 maps to infinity in the canonical frame".to_string(),
        })?;

        Ok(CanonicalFrame {
            affine,
            inverse,
            corner,
        })
    }
}

fn check_finite(quad: &Quadrilateral, role: QuadRole) -> Result<(), SolveError> {
    match quad.points().iter().position(|p| !p.is_finite()) {
        Some(index) => Err(SolveError::DegenerateInput {
            role,
            reason: format!("point {index} has a non-finite coordinate"),
        }),
        None => Ok(()),
    }
}

/// `s = a + b - 1 > 0` is Eberly's convexity test. `a, b > 0` is also
/// required, otherwise `F` below is singular. All three must clear `tol`,
/// which is dimensionless since `(a, b)` are canonical coordinates.
pub fn check_convexity(
    role: QuadRole,
    a: f64,
    b: f64,
    s: f64,
    tol: f64,
) -> Result<(), SolveError> {
    let violation = if !(s > tol) {
        ConvexityViolation::Scalar(s)
    } else if !(a > tol && b > tol) {
        ConvexityViolation::CanonicalCoordinate { a, b }
    } else {
        return Ok(());
    };
    debug!("{role} quadrilateral rejected: {violation}");
    Err(SolveError::NonConvexInput { role, violation })
}

/// The fractional linear map taking the canonical quadrilateral
/// `(0,0), (1,0), (a,b), (0,1)` onto `(0,0), (1,0), (c,d), (0,1)`:
///
/// ```text
///     | b c s          0            0   |
/// F = |   0          a d s          0   |
///     | b(cs - at)   a(ds - bt)   a b t |
/// ```
pub fn fractional_linear(a: f64, b: f64, c: f64, d: f64, s: f64, t: f64) -> Matrix3 {
    Matrix3::from_rows([
        [b * c * s, 0.0, 0.0],
        [0.0, a * d * s, 0.0],
        [b * (c * s - a * t), a * (d * s - b * t), a * b * t],
    ])
}

/// Solve with the default [`SolverConfig`].
pub fn perspective_transform(
    from: &[Point2; 4],
    to: &[Point2; 4],
) -> Result<PerspectiveSolution, SolveError> {
    Solver::default().solve(from, to)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad(raw: [(f64, f64); 4]) -> [Point2; 4] {
        raw.map(Point2::from)
    }

    fn example_p() -> [Point2; 4] {
        quad([(2.0, 1.0), (6.0, 2.0), (4.0, 5.0), (1.0, 4.0)])
    }

    fn example_q() -> [Point2; 4] {
        quad([(1.0, 2.0), (6.0, 1.0), (5.0, 4.0), (2.0, 5.0)])
    }

    #[test]
    fn concrete_scenario_reproduces_target() {
        let sol = perspective_transform(&example_p(), &example_q()).unwrap();
        assert_eq!(sol.from.v00, Point2::new(2.0, 1.0));
        assert_eq!(sol.to.v00, Point2::new(1.0, 2.0));
        assert_eq!(sol.to.v10, Point2::new(6.0, 1.0));

        let src = sol.from.points();
        let dst = sol.to.points();
        for i in 0..4 {
            let got = sol.homography.apply(src[i]).unwrap();
            assert!(
                got.distance(&dst[i]) < 1e-3,
                "corner {i}: expected ({}, {}), got ({}, {})",
                dst[i].x,
                dst[i].y,
                got.x,
                got.y
            );
        }
        assert!(sol.s > 0.0 && sol.t > 0.0);
    }

    #[test]
    fn fractional_linear_maps_canonical_corners() {
        let (a, b, c, d) = (0.8, 0.9, 1.3, 0.6);
        let (s, t) = (a + b - 1.0, c + d - 1.0);
        let h = Homography::new(fractional_linear(a, b, c, d, s, t));
        let map = |x, y| h.apply(Point2::new(x, y)).unwrap();

        assert!(map(0.0, 0.0).distance(&Point2::new(0.0, 0.0)) < 1e-12);
        assert!(map(1.0, 0.0).distance(&Point2::new(1.0, 0.0)) < 1e-12);
        assert!(map(0.0, 1.0).distance(&Point2::new(0.0, 1.0)) < 1e-12);
        assert!(map(a, b).distance(&Point2::new(c, d)) < 1e-12);
    }

    #[test]
    fn identity_when_solving_onto_itself() {
        let sol = perspective_transform(&example_p(), &example_p()).unwrap();
        assert!(sol
            .homography
            .matrix
            .is_scalar_multiple_of(&Matrix3::IDENTITY, 1e-9));
    }

    #[test]
    fn swapped_direction_is_inverse() {
        let pq = perspective_transform(&example_p(), &example_q()).unwrap();
        let qp = perspective_transform(&example_q(), &example_p()).unwrap();
        let inv = pq.homography.matrix.inverse().unwrap();
        assert!(qp.homography.matrix.is_scalar_multiple_of(&inv, 1e-9));
    }

    #[test]
    fn non_convex_source_is_rejected() {
        // (2, 2) sits inside the triangle of the other three.
        let dart = quad([(0.0, 0.0), (6.0, 0.0), (2.0, 2.0), (0.0, 6.0)]);
        let err = perspective_transform(&dart, &example_q()).unwrap_err();
        assert_eq!(
            err,
            SolveError::NonConvexInput {
                role: QuadRole::From,
                violation: ConvexityViolation::HullVertices(3),
            }
        );
    }

    #[test]
    fn non_convex_target_in_given_order_fails_scalar_test() {
        // Without canonical ordering the reflex vertex stays as v11.
        let solver = Solver::new(SolverConfig {
            canonicalize: false,
            ..Default::default()
        });
        let p = quad([(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        let q = quad([(0.0, 0.0), (4.0, 0.0), (1.0, 1.0), (0.0, 4.0)]);
        match solver.solve(&p, &q) {
            Err(SolveError::NonConvexInput {
                role: QuadRole::To,
                violation: ConvexityViolation::Scalar(t),
            }) => assert!(t <= 0.0),
            other => panic!("expected non-convex target, got {other:?}"),
        }
    }

    #[test]
    fn degenerate_inputs() {
        let line = quad([(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0)]);
        let err = perspective_transform(&example_p(), &line).unwrap_err();
        assert_eq!(err.kind(), "degenerate_input");
        assert_eq!(err.role(), QuadRole::To);

        let nan = quad([(0.0, 0.0), (1.0, 0.0), (f64::NAN, 1.0), (0.0, 1.0)]);
        let err = perspective_transform(&nan, &example_q()).unwrap_err();
        assert!(matches!(
            err,
            SolveError::DegenerateInput {
                role: QuadRole::From,
                ..
            }
        ));
    }

    #[test]
    fn tiny_quadrilateral_trips_collinear_tolerance() {
        let tiny = quad([(0.0, 0.0), (0.05, 0.0), (0.05, 0.05), (0.0, 0.05)]);
        let err = perspective_transform(&tiny, &example_q()).unwrap_err();
        match err {
            SolveError::SingularMatrix {
                role: QuadRole::From,
                step: SolveStep::CanonicalAffine,
                determinant,
            } => assert!((determinant - 0.0025).abs() < 1e-12),
            other => panic!("expected singular affine fit, got {other:?}"),
        }

        let solver = Solver::new(SolverConfig {
            collinear_tolerance: 1e-6,
            ..Default::default()
        });
        let sol = solver.solve(&tiny, &example_q()).unwrap();
        assert!(sol.max_residual() < 1e-6);
    }

    #[test]
    fn fourth_vertex_on_the_diagonal_is_rejected() {
        // v11 sits 1e-12 outside the v10-v01 diagonal: the hull keeps all
        // four corners but s is about 2e-13.
        let sliver = quad([(0.0, 0.0), (10.0, 0.0), (5.0 + 1e-12, 5.0 + 1e-12), (0.0, 10.0)]);
        match perspective_transform(&sliver, &example_q()) {
            Err(SolveError::NonConvexInput {
                role: QuadRole::From,
                violation: ConvexityViolation::Scalar(s),
            }) => assert!(s.abs() < 1e-9, "s = {s}"),
            other => panic!("expected a rejected scalar, got {other:?}"),
        }
        assert!(perspective_transform(&example_q(), &sliver).is_err());

        // With no margin the corners go to infinity and the composition
        // step catches it.
        let solver = Solver::new(SolverConfig {
            convexity_tolerance: 0.0,
            ..Default::default()
        });
        match solver.solve(&sliver, &example_q()) {
            Err(SolveError::SingularMatrix {
                step: SolveStep::Compose,
                ..
            }) => {}
            other => panic!("expected a degenerate composition, got {other:?}"),
        }
    }

    #[test]
    fn solve_ordered_rejects_non_finite_corner() {
        let p = Quadrilateral::from_points(quad([
            (0.0, 0.0),
            (1.0, 0.0),
            (f64::NAN, 1.0),
            (0.0, 1.0),
        ]));
        let q = Quadrilateral::from_points(example_q());
        let err = Solver::default().solve_ordered(&p, &q).unwrap_err();
        assert_eq!(err.kind(), "degenerate_input");
        assert_eq!(err.role(), QuadRole::From);

        let err = Solver::default().solve_ordered(&q, &p).unwrap_err();
        assert_eq!(err.kind(), "degenerate_input");
        assert_eq!(err.role(), QuadRole::To);
    }

    #[test]
    fn residuals_are_small_for_valid_solution() {
        let sol = perspective_transform(&example_p(), &example_q()).unwrap();
        for r in sol.residuals() {
            assert!(r < 1e-9, "residual {r}");
        }
    }

    #[test]
    fn normalized_homography_has_unit_corner() {
        let sol = perspective_transform(&example_p(), &example_q()).unwrap();
        let n = sol.homography.normalized().unwrap();
        assert!((n.matrix.data[2][2] - 1.0).abs() < 1e-12);
        let p = Point2::new(3.0, 3.0);
        let a = sol.homography.apply(p).unwrap();
        let b = n.apply(p).unwrap();
        assert!(a.distance(&b) < 1e-9);
    }
}
