use smallvec::SmallVec;

use crate::error::OrderError;
use crate::point::{cross, Point2};
use crate::shape::Quadrilateral;

/// Convex hull of a point set by gift wrapping (Jarvis march).
///
/// The hull starts at the lowest point (smallest `y`, then smallest `x`) and
/// runs counter-clockwise. Among candidates that are exactly collinear with
/// the current edge the farther one wins, so collinear middle points and
/// duplicates never appear in the output and the walk always terminates.
///
/// Inputs with fewer than 3 points are returned unchanged.
///
/// Runs in O(n * h) for `h` hull vertices. That is fine for quadrilateral
/// corners but not meant for large point clouds.
pub fn convex_hull(points: &[Point2]) -> SmallVec<[Point2; 4]> {
    if points.len() < 3 {
        return points.iter().copied().collect();
    }

    let mut start = 0;
    for (i, p) in points.iter().enumerate().skip(1) {
        let s = &points[start];
        if p.y < s.y || (p.y == s.y && p.x < s.x) {
            start = i;
        }
    }

    let mut hull: SmallVec<[Point2; 4]> = SmallVec::new();
    let mut current = start;

    // A hull can't have more vertices than input points; the bound only
    // matters for NaN input, which breaks the orientation ordering.
    for _ in 0..points.len() {
        hull.push(points[current]);
        let p = points[current];

        let mut next: Option<usize> = None;
        for (i, cand) in points.iter().enumerate() {
            if *cand == p {
                continue;
            }
            let Some(best) = next else {
                next = Some(i);
                continue;
            };
            let turn = cross(&p, &points[best], cand);
            if turn < 0.0
                || (turn == 0.0 && p.distance_squared(cand) > p.distance_squared(&points[best]))
            {
                next = Some(i);
            }
        }

        match next {
            Some(n) if points[n] != points[start] => current = n,
            _ => break,
        }
    }

    hull
}

/// Hull-order the points counter-clockwise, then rotate so that index 0 is
/// the vertex nearest `anchor`. Equal distances keep the earlier hull vertex.
pub fn order_counter_clockwise(points: &[Point2], anchor: Point2) -> SmallVec<[Point2; 4]> {
    let mut ccw = convex_hull(points);
    if ccw.is_empty() {
        return ccw;
    }

    let mut index = 0;
    let mut best = ccw[0].distance_squared(&anchor);
    for (i, p) in ccw.iter().enumerate().skip(1) {
        let d = p.distance_squared(&anchor);
        if d < best {
            best = d;
            index = i;
        }
    }

    ccw.rotate_left(index);
    ccw
}

/// Order four corners given in any order into an Eberly-labeled
/// quadrilateral: counter-clockwise, `v00` nearest to `anchor`.
///
/// Fails unless all four points are vertices of a strictly convex hull.
pub fn canonical_quadrilateral(
    points: &[Point2; 4],
    anchor: Point2,
) -> Result<Quadrilateral, OrderError> {
    if let Some(index) = points.iter().position(|p| !p.is_finite()) {
        return Err(OrderError::NonFinite { index });
    }

    let ordered = order_counter_clockwise(points, anchor);
    match ordered.len() {
        4 => Ok(Quadrilateral::new(ordered[0], ordered[1], ordered[2], ordered[3])),
        3 => Err(OrderError::NotStrictlyConvex(3)),
        n => Err(OrderError::Degenerate(n)),
    }
}
