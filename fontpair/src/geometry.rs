//! Planar helpers shared by the stroke analyzer and the scorer.

use core::f64::consts::PI;

use kurbo::{CubicBez, ParamCurve, Point, QuadBez};

/// Returns the Euclidean distance between two points.
pub fn distance(p1: Point, p2: Point) -> f64 {
    p1.distance(p2)
}

/// Returns the direction of the vector from `p1` to `p2` in radians.
///
/// The result lies in `(-π, π]`.
pub fn angle(p1: Point, p2: Point) -> f64 {
    (p2 - p1).atan2()
}

/// Maps an angle into `[0, π)`.
///
/// A direction and its reverse normalize to the same value, so segments
/// can be classified without regard to contour winding.
pub fn normalize_angle(angle: f64) -> f64 {
    let angle = if angle < 0.0 { angle + 2.0 * PI } else { angle };
    let normalized = angle.rem_euclid(PI);
    // rem_euclid may round up to the divisor for tiny negative inputs
    if normalized >= PI {
        0.0
    } else {
        normalized
    }
}

/// Samples a cubic bezier at `t = i / n` for `i` in `1..=n`.
///
/// The start point is not included; the final sample is `p1`.
pub fn sample_cubic_bezier(p0: Point, c1: Point, c2: Point, p1: Point, n: usize) -> Vec<Point> {
    let curve = CubicBez::new(p0, c1, c2, p1);
    (1..=n).map(|i| curve.eval(i as f64 / n as f64)).collect()
}

/// Samples a quadratic bezier at `t = i / n` for `i` in `1..=n`.
pub fn sample_quadratic_bezier(p0: Point, c: Point, p1: Point, n: usize) -> Vec<Point> {
    let curve = QuadBez::new(p0, c, p1);
    (1..=n).map(|i| curve.eval(i as f64 / n as f64)).collect()
}

/// Returns the distance between two feature vectors.
///
/// Vectors of different lengths are infinitely far apart.
pub fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() {
        return f64::INFINITY;
    }
    a.iter()
        .zip(b)
        .map(|(a, b)| (a - b).powi(2))
        .sum::<f64>()
        .sqrt()
}
