use std::ops::Mul;

use crate::error::MatrixError;
use crate::point::Point2;

/// Determinant magnitude below which a 3x3 matrix is treated as singular.
pub const DEFAULT_SINGULAR_EPS: f64 = 1e-7;

/// `|w|` below which a homogeneous vector is a point at infinity.
pub const POINT_AT_INFINITY_EPS: f64 = 1e-12;

/// A homogeneous 1x3 vector `(x, y, w)`.
///
/// Matrices act on it as a column vector: `v' = M * v`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub w: f64,
}

impl Vec3 {
    pub const fn new(x: f64, y: f64, w: f64) -> Self {
        Self { x, y, w }
    }

    /// The homogeneous representation `(x, y, 1)` of a point.
    pub fn from_point(p: Point2) -> Self {
        Self::new(p.x, p.y, 1.0)
    }

    /// Project back to the plane, or `None` for a point at infinity.
    pub fn to_point(&self) -> Option<Point2> {
        if self.w.abs() < POINT_AT_INFINITY_EPS || !self.w.is_finite() {
            return None;
        }
        Some(self.to_point_unchecked())
    }

    /// Divide by `w` without checking. A zero `w` yields infinite coordinates.
    pub fn to_point_unchecked(&self) -> Point2 {
        Point2::new(self.x / self.w, self.y / self.w)
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.x, self.y, self.w]
    }
}

/// A 3x3 matrix, row-major: `data[row][col]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Matrix3 {
    pub data: [[f64; 3]; 3],
}

impl Matrix3 {
    pub const IDENTITY: Matrix3 = Matrix3 {
        data: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
    };

    pub const ZERO: Matrix3 = Matrix3 {
        data: [[0.0; 3]; 3],
    };

    pub const fn from_rows(data: [[f64; 3]; 3]) -> Self {
        Self { data }
    }

    /// Build a matrix whose columns are the given vectors.
    pub fn from_columns(c0: Vec3, c1: Vec3, c2: Vec3) -> Self {
        Self {
            data: [
                [c0.x, c1.x, c2.x],
                [c0.y, c1.y, c2.y],
                [c0.w, c1.w, c2.w],
            ],
        }
    }

    pub fn column(&self, j: usize) -> Vec3 {
        Vec3::new(self.data[0][j], self.data[1][j], self.data[2][j])
    }

    pub fn mul_mat(&self, b: &Matrix3) -> Matrix3 {
        let a = &self.data;
        let b = &b.data;
        let mut c = [[0.0; 3]; 3];
        for i in 0..3 {
            for j in 0..3 {
                c[i][j] = a[i][0] * b[0][j] + a[i][1] * b[1][j] + a[i][2] * b[2][j];
            }
        }
        Matrix3 { data: c }
    }

    pub fn mul_vec(&self, v: &Vec3) -> Vec3 {
        let m = &self.data;
        Vec3::new(
            m[0][0] * v.x + m[0][1] * v.y + m[0][2] * v.w,
            m[1][0] * v.x + m[1][1] * v.y + m[1][2] * v.w,
            m[2][0] * v.x + m[2][1] * v.y + m[2][2] * v.w,
        )
    }

    pub fn mul_quad(&self, q: &Matrix3x4) -> Matrix3x4 {
        let mut out = [[0.0; 4]; 3];
        for j in 0..4 {
            let v = self.mul_vec(&q.column(j));
            out[0][j] = v.x;
            out[1][j] = v.y;
            out[2][j] = v.w;
        }
        Matrix3x4 { data: out }
    }

    pub fn transpose(&self) -> Matrix3 {
        let m = &self.data;
        Matrix3 {
            data: [
                [m[0][0], m[1][0], m[2][0]],
                [m[0][1], m[1][1], m[2][1]],
                [m[0][2], m[1][2], m[2][2]],
            ],
        }
    }

    pub fn determinant(&self) -> f64 {
        let m = &self.data;
        m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    }

    /// Transposed cofactor matrix; `self * adjugate = det * I`.
    pub fn adjugate(&self) -> Matrix3 {
        let m = &self.data;
        Matrix3 {
            data: [
                [
                    m[1][1] * m[2][2] - m[1][2] * m[2][1],
                    m[0][2] * m[2][1] - m[0][1] * m[2][2],
                    m[0][1] * m[1][2] - m[0][2] * m[1][1],
                ],
                [
                    m[1][2] * m[2][0] - m[1][0] * m[2][2],
                    m[0][0] * m[2][2] - m[0][2] * m[2][0],
                    m[0][2] * m[1][0] - m[0][0] * m[1][2],
                ],
                [
                    m[1][0] * m[2][1] - m[1][1] * m[2][0],
                    m[0][1] * m[2][0] - m[0][0] * m[2][1],
                    m[0][0] * m[1][1] - m[0][1] * m[1][0],
                ],
            ],
        }
    }

    pub fn scale(&self, s: f64) -> Matrix3 {
        let mut out = self.data;
        for row in out.iter_mut() {
            for v in row.iter_mut() {
                *v *= s;
            }
        }
        Matrix3 { data: out }
    }

    pub fn div_scalar(&self, s: f64, eps: f64) -> Result<Matrix3, MatrixError> {
        if s.abs() < eps || !s.is_finite() {
            return Err(MatrixError::DivideByZero(s));
        }
        Ok(self.scale(1.0 / s))
    }

    /// Adjugate-based inverse; fails when `|det| < eps`.
    pub fn try_inverse(&self, eps: f64) -> Result<Matrix3, MatrixError> {
        let det = self.determinant();
        if det.abs() < eps || !det.is_finite() {
            return Err(MatrixError::Singular { determinant: det });
        }
        Ok(self.adjugate().scale(1.0 / det))
    }

    /// [`try_inverse`](Self::try_inverse) with [`DEFAULT_SINGULAR_EPS`].
    pub fn inverse(&self) -> Result<Matrix3, MatrixError> {
        self.try_inverse(DEFAULT_SINGULAR_EPS)
    }

    /// Scale so that the bottom-right entry is 1.
    pub fn normalized(&self) -> Option<Matrix3> {
        let h22 = self.data[2][2];
        if h22.abs() < POINT_AT_INFINITY_EPS {
            return None;
        }
        Some(self.scale(1.0 / h22))
    }

    pub fn max_abs(&self) -> f64 {
        self.data
            .iter()
            .flatten()
            .fold(0.0f64, |acc, v| acc.max(v.abs()))
    }

    pub fn is_finite(&self) -> bool {
        self.data.iter().flatten().all(|v| v.is_finite())
    }

    pub fn approx_eq(&self, other: &Matrix3, tol: f64) -> bool {
        self.data
            .iter()
            .flatten()
            .zip(other.data.iter().flatten())
            .all(|(a, b)| (a - b).abs() <= tol)
    }

    /// True if `self = k * other` for some non-zero `k`, within `tol` after
    /// both matrices are scaled to unit max-magnitude.
    pub fn is_scalar_multiple_of(&self, other: &Matrix3, tol: f64) -> bool {
        let (sa, sb) = (self.max_abs(), other.max_abs());
        if sa == 0.0 || sb == 0.0 {
            return false;
        }
        // Pick the sign from the entry with the largest magnitude in `self`.
        let (mut bi, mut bj) = (0, 0);
        for i in 0..3 {
            for j in 0..3 {
                if self.data[i][j].abs() > self.data[bi][bj].abs() {
                    bi = i;
                    bj = j;
                }
            }
        }
        let sign = if (self.data[bi][bj] >= 0.0) == (other.data[bi][bj] >= 0.0) {
            1.0
        } else {
            -1.0
        };
        self.scale(1.0 / sa)
            .approx_eq(&other.scale(sign / sb), tol)
    }

    pub fn as_row_major(&self) -> [f64; 9] {
        let m = &self.data;
        [
            m[0][0], m[0][1], m[0][2], m[1][0], m[1][1], m[1][2], m[2][0], m[2][1], m[2][2],
        ]
    }
}

impl Default for Matrix3 {
    fn default() -> Self {
        Matrix3::IDENTITY
    }
}

impl Mul for Matrix3 {
    type Output = Matrix3;

    fn mul(self, rhs: Matrix3) -> Matrix3 {
        self.mul_mat(&rhs)
    }
}

impl Mul<Vec3> for Matrix3 {
    type Output = Vec3;

    fn mul(self, rhs: Vec3) -> Vec3 {
        self.mul_vec(&rhs)
    }
}

/// A 3x4 matrix whose columns are the homogeneous corners of a quadrilateral.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix3x4 {
    pub data: [[f64; 4]; 3],
}

impl Matrix3x4 {
    pub fn from_columns(cols: [Vec3; 4]) -> Self {
        let mut data = [[0.0; 4]; 3];
        for (j, c) in cols.iter().enumerate() {
            data[0][j] = c.x;
            data[1][j] = c.y;
            data[2][j] = c.w;
        }
        Self { data }
    }

    pub fn column(&self, j: usize) -> Vec3 {
        Vec3::new(self.data[0][j], self.data[1][j], self.data[2][j])
    }

    /// Project every column back to the plane.
    pub fn to_points(&self) -> Option<[Point2; 4]> {
        let mut out = [Point2::ORIGIN; 4];
        for (j, p) in out.iter_mut().enumerate() {
            *p = self.column(j).to_point()?;
        }
        Some(out)
    }
}
