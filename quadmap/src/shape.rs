use crate::matrix::{Matrix3, Matrix3x4, Vec3};
use crate::point::{angle_between, cross, radians_to_degrees, Point2};

/// Default tolerance on `|det|` of a triangle's point matrix (twice its area).
pub const DEFAULT_COLLINEAR_TOLERANCE: f64 = 0.01;

/// Default angular tolerance for [`Triangle::is_collinear_by_angle`].
pub const DEFAULT_COLLINEAR_DEGREES: f64 = 0.5;

/// Three ordered points, possibly collinear.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Triangle {
    pub a: Point2,
    pub b: Point2,
    pub c: Point2,
}

impl Triangle {
    /// The reference right triangle `(0,0), (1,0), (0,1)`.
    pub const CANONICAL: Triangle = Triangle {
        a: Point2::new(0.0, 0.0),
        b: Point2::new(1.0, 0.0),
        c: Point2::new(0.0, 1.0),
    };

    pub const fn new(a: Point2, b: Point2, c: Point2) -> Self {
        Self { a, b, c }
    }

    pub fn points(&self) -> [Point2; 3] {
        [self.a, self.b, self.c]
    }

    /// Point matrix with the homogeneous vertices as columns:
    ///
    /// ```text
    /// | a.x  b.x  c.x |
    /// | a.y  b.y  c.y |
    /// |  1    1    1  |
    /// ```
    pub fn to_matrix(&self) -> Matrix3 {
        Matrix3::from_columns(
            Vec3::from_point(self.a),
            Vec3::from_point(self.b),
            Vec3::from_point(self.c),
        )
    }

    /// Signed area, positive for counter-clockwise vertices.
    pub fn signed_area(&self) -> f64 {
        0.5 * cross(&self.a, &self.b, &self.c)
    }

    /// Collinear if the point-matrix determinant is within `tolerance` of zero.
    pub fn is_collinear(&self, tolerance: f64) -> bool {
        self.to_matrix().determinant().abs() < tolerance
    }

    /// Collinear if the edges `b - a` and `c - b` are within `degrees` of
    /// being parallel (in either direction). Coincident vertices count as
    /// collinear.
    pub fn is_collinear_by_angle(&self, degrees: f64) -> bool {
        let Some(radians) = angle_between(&(self.b - self.a), &(self.c - self.b)) else {
            return true;
        };
        let mut deg = radians_to_degrees(radians);
        if deg > 90.0 {
            deg = 180.0 - deg;
        }
        deg < degrees
    }
}

/// A quadrilateral labeled after Eberly: `v00, v10, v11` counter-clockwise,
/// `v01` closing the loop.
///
/// ```text
///              v11
///    v01
///                  v10
///       v00
/// ```
///
/// Construction does not reorder anything; use
/// [`canonical_quadrilateral`](crate::hull::canonical_quadrilateral) for
/// points in arbitrary order.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Quadrilateral {
    pub v00: Point2,
    pub v10: Point2,
    pub v11: Point2,
    pub v01: Point2,
}

impl Quadrilateral {
    pub const fn new(v00: Point2, v10: Point2, v11: Point2, v01: Point2) -> Self {
        Self { v00, v10, v11, v01 }
    }

    /// Label the points `v00, v10, v11, v01` in the given order.
    pub fn from_points(points: [Point2; 4]) -> Self {
        Self::new(points[0], points[1], points[2], points[3])
    }

    /// Vertices in label order `v00, v10, v11, v01`.
    pub fn points(&self) -> [Point2; 4] {
        [self.v00, self.v10, self.v11, self.v01]
    }

    /// The triangle `(v00, v10, v01)` that anchors the affine frame.
    pub fn affine_triangle(&self) -> Triangle {
        Triangle::new(self.v00, self.v10, self.v01)
    }

    /// 3x4 matrix of homogeneous vertices as columns, in label order.
    pub fn to_matrix(&self) -> Matrix3x4 {
        Matrix3x4::from_columns(self.points().map(Vec3::from_point))
    }

    /// Shoelace signed area, positive for counter-clockwise winding.
    pub fn signed_area(&self) -> f64 {
        let p = self.points();
        let mut sum = 0.0;
        for i in 0..4 {
            let j = (i + 1) % 4;
            sum += p[i].x * p[j].y - p[j].x * p[i].y;
        }
        0.5 * sum
    }

    /// True if every corner turns left, i.e. the polygon is strictly convex
    /// and wound counter-clockwise.
    pub fn is_counter_clockwise(&self) -> bool {
        let p = self.points();
        (0..4).all(|i| cross(&p[i], &p[(i + 1) % 4], &p[(i + 2) % 4]) > 0.0)
    }

    /// Apply a projective map to every vertex, keeping the labels.
    ///
    /// Returns `None` if any vertex is sent to infinity.
    pub fn map(&self, m: &Matrix3) -> Option<Quadrilateral> {
        m.mul_quad(&self.to_matrix())
            .to_points()
            .map(Quadrilateral::from_points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Quadrilateral {
        Quadrilateral::from_points([
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ])
    }

    #[test]
    fn canonical_triangle_matrix() {
        let m = Triangle::CANONICAL.to_matrix();
        assert_eq!(m.data, [[0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 1.0, 1.0]]);
        assert!((m.determinant() - 1.0).abs() < 1e-15);
        assert!((Triangle::CANONICAL.signed_area() - 0.5).abs() < 1e-15);
    }

    #[test]
    fn collinear_by_determinant() {
        let line = Triangle::new(
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(2.0, 2.001),
        );
        assert!(line.is_collinear(DEFAULT_COLLINEAR_TOLERANCE));
        assert!(!Triangle::CANONICAL.is_collinear(DEFAULT_COLLINEAR_TOLERANCE));
    }

    #[test]
    fn collinear_by_angle() {
        let nearly = Triangle::new(
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(20.0, 0.05),
        );
        assert!(nearly.is_collinear_by_angle(DEFAULT_COLLINEAR_DEGREES));

        // Doubling back along the same line is still collinear.
        let back = Triangle::new(
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(5.0, 0.0),
        );
        assert!(back.is_collinear_by_angle(DEFAULT_COLLINEAR_DEGREES));

        assert!(!Triangle::CANONICAL.is_collinear_by_angle(DEFAULT_COLLINEAR_DEGREES));

        let coincident = Triangle::new(Point2::ORIGIN, Point2::ORIGIN, Point2::new(1.0, 0.0));
        assert!(coincident.is_collinear_by_angle(DEFAULT_COLLINEAR_DEGREES));
    }

    #[test]
    fn quad_labels_and_matrix() {
        let q = unit_square();
        assert_eq!(q.affine_triangle(), Triangle::CANONICAL);
        let m = q.to_matrix();
        assert_eq!(m.data[0], [0.0, 1.0, 1.0, 0.0]);
        assert_eq!(m.data[2], [1.0; 4]);
    }

    #[test]
    fn winding_checks() {
        let q = unit_square();
        assert!(q.is_counter_clockwise());
        assert!((q.signed_area() - 1.0).abs() < 1e-15);

        let cw = Quadrilateral::new(q.v00, q.v01, q.v11, q.v10);
        assert!(!cw.is_counter_clockwise());
        assert!(cw.signed_area() < 0.0);
    }

    #[test]
    fn map_applies_to_every_vertex() {
        let shift = Matrix3::from_rows([[1.0, 0.0, 2.0], [0.0, 1.0, 3.0], [0.0, 0.0, 1.0]]);
        let moved = unit_square().map(&shift).unwrap();
        assert_eq!(moved.v11, Point2::new(3.0, 4.0));

        // Bottom row sends x = 1 to infinity.
        let vanish = Matrix3::from_rows([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [-1.0, 0.0, 1.0]]);
        assert!(unit_square().map(&vanish).is_none());
    }
}
