/// Deterministic quadrilateral generators for scenarios.
///
/// Everything is seeded so that a scenario name always reproduces the same
/// corners.
use quadmap::homography::Homography;
use quadmap::matrix::Matrix3;
use quadmap::Point2;

/// Simple LCG pseudo-random number generator (deterministic across platforms).
#[derive(Debug, Clone)]
pub struct Rng {
    state: u64,
}

impl Rng {
    pub fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(1),
        }
    }

    pub fn next_u64(&mut self) -> u64 {
        // LCG with Knuth's constants
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.state
    }

    /// Uniform f64 in [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform f64 in [lo, hi).
    pub fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    /// Uniform integer in [0, n).
    pub fn below(&mut self, n: usize) -> usize {
        ((self.next_u64() >> 33) % n as u64) as usize
    }
}

/// Four independent points in `[-magnitude, magnitude]²`. Not necessarily
/// convex, nor in any particular order.
pub fn random_quadrilateral(rng: &mut Rng, magnitude: f64) -> [Point2; 4] {
    std::array::from_fn(|_| {
        Point2::new(
            rng.range(-magnitude, magnitude),
            rng.range(-magnitude, magnitude),
        )
    })
}

/// A strictly convex quadrilateral inscribed in an ellipse around `center`.
///
/// One corner per quarter turn, jittered by at most ±0.5 rad, so adjacent
/// corners are always at least ~0.57 rad apart and no three are close to
/// collinear.
pub fn random_convex_quadrilateral(rng: &mut Rng, center: Point2, radius: f64) -> [Point2; 4] {
    let spin = rng.range(0.0, std::f64::consts::TAU);
    let sx = rng.range(0.6, 1.4);
    let sy = rng.range(0.6, 1.4);
    std::array::from_fn(|i| {
        let angle = spin + i as f64 * std::f64::consts::FRAC_PI_2 + rng.range(-0.5, 0.5);
        Point2::new(
            center.x + radius * sx * angle.cos(),
            center.y + radius * sy * angle.sin(),
        )
    })
}

/// A "dart": a random triangle plus one point strictly inside it.
pub fn random_dart(rng: &mut Rng, center: Point2, radius: f64) -> [Point2; 4] {
    let spin = rng.range(0.0, std::f64::consts::TAU);
    let tri: [Point2; 3] = std::array::from_fn(|i| {
        let angle = spin + i as f64 * std::f64::consts::TAU / 3.0;
        Point2::new(
            center.x + radius * angle.cos(),
            center.y + radius * angle.sin(),
        )
    });
    // Barycentric weights bounded away from the edges.
    let w0 = rng.range(0.2, 0.4);
    let w1 = rng.range(0.2, 0.4);
    let w2 = 1.0 - w0 - w1;
    let inner = Point2::new(
        w0 * tri[0].x + w1 * tri[1].x + w2 * tri[2].x,
        w0 * tri[0].y + w1 * tri[1].y + w2 * tri[2].y,
    );
    [tri[0], tri[1], inner, tri[2]]
}

/// A random orientation-preserving projective map that keeps `[0, size]²`
/// in front of the camera (positive `w` everywhere on the square).
pub fn random_homography(rng: &mut Rng, size: f64) -> Homography {
    let g = 0.2 / size;
    let t = 0.2 * size;
    Homography::new(Matrix3::from_rows([
        [rng.range(0.6, 1.4), rng.range(-0.3, 0.3), rng.range(-t, t)],
        [rng.range(-0.3, 0.3), rng.range(0.6, 1.4), rng.range(-t, t)],
        [rng.range(-g, g), rng.range(-g, g), 1.0],
    ]))
}

/// The axis-aligned square `[0, size]²` in counter-clockwise order.
pub fn square(size: f64) -> [Point2; 4] {
    [
        Point2::new(0.0, 0.0),
        Point2::new(size, 0.0),
        Point2::new(size, size),
        Point2::new(0.0, size),
    ]
}

/// Shuffle the corners (Fisher-Yates).
pub fn jumble(points: &[Point2; 4], rng: &mut Rng) -> [Point2; 4] {
    let mut out = *points;
    for i in (1..out.len()).rev() {
        let j = rng.below(i + 1);
        out.swap(i, j);
    }
    out
}
