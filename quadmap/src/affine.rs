use crate::error::MatrixError;
use crate::matrix::{Matrix3, Vec3};
use crate::point::Point2;
use crate::shape::Triangle;

/// The affine map taking the vertices of `from` onto those of `to`, vertex
/// for vertex.
///
/// With `A` and `B` the point matrices of `from` and `to`, `M * A = B`, so
/// `M = B * inv(A)`. Fails when `from` is collinear (its point matrix is
/// singular under `eps`). A collinear `to` is fine and gives a rank-deficient
/// map.
pub fn affine_between(from: &Triangle, to: &Triangle, eps: f64) -> Result<Matrix3, MatrixError> {
    let inv_from = from.to_matrix().try_inverse(eps)?;
    Ok(to.to_matrix() * inv_from)
}

/// A 2D affine transform in 2x3 form:
///
/// ```text
/// x' = a * x + c * y + tx
/// y' = b * x + d * y + ty
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AffineTransform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub tx: f64,
    pub ty: f64,
}

impl AffineTransform {
    pub const IDENTITY: AffineTransform = AffineTransform {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    /// Affine map between two triangles; see [`affine_between`].
    pub fn between(from: &Triangle, to: &Triangle, eps: f64) -> Result<Self, MatrixError> {
        let m = affine_between(from, to, eps)?;
        // Bottom row of B * inv(A) is (1,1,1) * inv(A) = (0,0,1) exactly in
        // theory; take the top two rows directly.
        Ok(Self::from_rows(&m))
    }

    /// The 2x3 part of a matrix whose bottom row is `(0, 0, 1)`, else `None`.
    pub fn from_matrix(m: &Matrix3, tol: f64) -> Option<Self> {
        let r = &m.data[2];
        if r[0].abs() > tol || r[1].abs() > tol || (r[2] - 1.0).abs() > tol {
            return None;
        }
        Some(Self::from_rows(m))
    }

    fn from_rows(m: &Matrix3) -> Self {
        let d = &m.data;
        Self {
            a: d[0][0],
            c: d[0][1],
            tx: d[0][2],
            b: d[1][0],
            d: d[1][1],
            ty: d[1][2],
        }
    }

    pub fn to_matrix(&self) -> Matrix3 {
        Matrix3::from_rows([
            [self.a, self.c, self.tx],
            [self.b, self.d, self.ty],
            [0.0, 0.0, 1.0],
        ])
    }

    pub fn apply(&self, p: Point2) -> Point2 {
        Point2::new(
            self.a * p.x + self.c * p.y + self.tx,
            self.b * p.x + self.d * p.y + self.ty,
        )
    }

    pub fn apply_triangle(&self, t: &Triangle) -> Triangle {
        Triangle::new(self.apply(t.a), self.apply(t.b), self.apply(t.c))
    }

    pub fn inverse(&self, eps: f64) -> Result<Self, MatrixError> {
        let inv = self.to_matrix().try_inverse(eps)?;
        Ok(Self::from_rows(&inv))
    }
}

impl From<AffineTransform> for Matrix3 {
    fn from(t: AffineTransform) -> Self {
        t.to_matrix()
    }
}

/// Apply an affine (or any) matrix to a point; `None` for points sent to
/// infinity.
pub(crate) fn project(m: &Matrix3, p: Point2) -> Option<Point2> {
    m.mul_vec(&Vec3::from_point(p)).to_point()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::DEFAULT_SINGULAR_EPS;

    fn assert_close(a: Point2, b: Point2, tol: f64) {
        assert!(
            a.distance(&b) < tol,
            "expected ({}, {}), got ({}, {})",
            b.x,
            b.y,
            a.x,
            a.y
        );
    }

    #[test]
    fn maps_vertices_exactly() {
        let from = Triangle::CANONICAL;
        let to = Triangle::new(
            Point2::new(2.0, 1.0),
            Point2::new(6.0, 2.0),
            Point2::new(1.0, 4.0),
        );
        let m = affine_between(&from, &to, DEFAULT_SINGULAR_EPS).unwrap();
        for (src, dst) in from.points().iter().zip(to.points()) {
            assert_close(project(&m, *src).unwrap(), dst, 1e-12);
        }
        // Canonical -> triangle puts the vertices in the columns.
        assert_eq!(m.data[0], [4.0, -1.0, 2.0]);
        assert_eq!(m.data[1], [1.0, 3.0, 1.0]);
        assert_eq!(m.data[2], [0.0, 0.0, 1.0]);
    }

    #[test]
    fn general_triangles_roundtrip() {
        let from = Triangle::new(
            Point2::new(-3.0, 1.5),
            Point2::new(7.0, -2.0),
            Point2::new(0.5, 9.0),
        );
        let to = Triangle::new(
            Point2::new(10.0, 10.0),
            Point2::new(12.0, 30.0),
            Point2::new(-5.0, 4.0),
        );
        let t = AffineTransform::between(&from, &to, DEFAULT_SINGULAR_EPS).unwrap();
        let mapped = t.apply_triangle(&from);
        for (got, want) in mapped.points().iter().zip(to.points()) {
            assert_close(*got, want, 1e-9);
        }
        let back = t.inverse(DEFAULT_SINGULAR_EPS).unwrap();
        assert_close(back.apply(to.b), from.b, 1e-9);
    }

    #[test]
    fn collinear_source_fails() {
        let line = Triangle::new(
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(2.0, 2.0),
        );
        let err = affine_between(&line, &Triangle::CANONICAL, DEFAULT_SINGULAR_EPS).unwrap_err();
        assert!(matches!(err, MatrixError::Singular { .. }));
    }

    #[test]
    fn collinear_target_is_allowed() {
        let line = Triangle::new(
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(2.0, 2.0),
        );
        let m = affine_between(&Triangle::CANONICAL, &line, DEFAULT_SINGULAR_EPS).unwrap();
        assert!(m.determinant().abs() < 1e-12);
    }

    #[test]
    fn matrix_conversion() {
        let t = AffineTransform {
            a: 2.0,
            b: 0.5,
            c: -1.0,
            d: 3.0,
            tx: 4.0,
            ty: -6.0,
        };
        let m: Matrix3 = t.into();
        assert_eq!(AffineTransform::from_matrix(&m, 1e-12), Some(t));
        assert_eq!(AffineTransform::from_matrix(&Matrix3::ZERO, 1e-12), None);
        assert_eq!(
            t.apply(Point2::new(1.0, 1.0)),
            project(&m, Point2::new(1.0, 1.0)).unwrap()
        );
        assert_eq!(AffineTransform::IDENTITY.to_matrix(), Matrix3::IDENTITY);
    }
}
