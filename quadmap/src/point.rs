/// Planar points and orientation predicates.
///
/// All geometry in this crate uses a right-handed frame: +x right, +y up.
/// "Counter-clockwise" means a positive signed area in that frame. Callers
/// working in image coordinates (+y down) should convert with [`Point2::flip_y`]
/// before solving.
use std::ops::{Add, Sub};

/// A point (or 2D vector) in the plane.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub const ORIGIN: Point2 = Point2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_squared(&self, other: &Point2) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn distance(&self, other: &Point2) -> f64 {
        self.distance_squared(other).sqrt()
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn dot(&self, other: &Point2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Mirror the point vertically inside a frame of the given height.
    ///
    /// Converts between y-down (image rows) and y-up coordinates; applying it
    /// twice is the identity.
    pub fn flip_y(&self, height: f64) -> Point2 {
        Point2::new(self.x, height - self.y)
    }
}

impl From<[f64; 2]> for Point2 {
    fn from(p: [f64; 2]) -> Self {
        Point2::new(p[0], p[1])
    }
}

impl From<(f64, f64)> for Point2 {
    fn from((x, y): (f64, f64)) -> Self {
        Point2::new(x, y)
    }
}

impl From<Point2> for [f64; 2] {
    fn from(p: Point2) -> Self {
        [p.x, p.y]
    }
}

impl Add for Point2 {
    type Output = Point2;

    fn add(self, rhs: Point2) -> Point2 {
        Point2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point2 {
    type Output = Point2;

    fn sub(self, rhs: Point2) -> Point2 {
        Point2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Turn direction of an ordered point triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Collinear,
    Clockwise,
    CounterClockwise,
}

/// Doubled signed area of the triangle `(o, a, b)`.
///
/// Positive when `b` lies to the left of the ray `o -> a`.
pub fn cross(o: &Point2, a: &Point2, b: &Point2) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// Classify the turn `p -> q -> r`. Only an exactly zero cross product is
/// collinear; use [`Triangle::is_collinear`](crate::shape::Triangle::is_collinear)
/// for a tolerance-based test.
pub fn orientation(p: &Point2, q: &Point2, r: &Point2) -> Orientation {
    let val = cross(p, q, r);
    if val > 0.0 {
        Orientation::CounterClockwise
    } else if val < 0.0 {
        Orientation::Clockwise
    } else {
        Orientation::Collinear
    }
}

/// Unsigned angle between two vectors in radians, in `[0, pi]`.
///
/// Returns `None` if either vector has zero length.
pub fn angle_between(u: &Point2, v: &Point2) -> Option<f64> {
    let norms = u.length() * v.length();
    if norms == 0.0 || !norms.is_finite() {
        return None;
    }
    // Rounding can push the cosine a hair outside [-1, 1].
    let cos = (u.dot(v) / norms).clamp(-1.0, 1.0);
    Some(cos.acos())
}

pub fn degrees_to_radians(degrees: f64) -> f64 {
    degrees.to_radians()
}

pub fn radians_to_degrees(radians: f64) -> f64 {
    radians.to_degrees()
}
