//! Compatibility scoring.

use serde::Serialize;

use crate::{geometry::euclidean_distance, metrics::FontMetrics, params::ScoringParams};

/// The four terms of a pairwise score, before weighting.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScoreTerms {
    /// `1 - |a/b - 1|` over x-heights. Not clamped, so large mismatches go
    /// negative.
    pub x_height_ratio: f64,
    /// Ratio of the smaller to the larger stroke contrast, or the neutral
    /// score when either is unknown.
    pub stroke_contrast_score: f64,
    /// Ratio of the narrower to the wider average character width.
    pub width_ratio: f64,
    /// Feature vector distance mapped onto `[0, 1]`.
    pub feature_distance_score: f64,
}

impl ScoreTerms {
    pub fn new(a: &FontMetrics, b: &FontMetrics, params: &ScoringParams) -> Self {
        let stroke_contrast_score = match (a.stroke_contrast(), b.stroke_contrast()) {
            (Some(a), Some(b)) => smaller_over_larger(a, b),
            _ => params.neutral_contrast_score,
        };
        let distance = euclidean_distance(a.feature_vector(), b.feature_vector());
        Self {
            x_height_ratio: x_height_ratio(a.x_height(), b.x_height()),
            stroke_contrast_score,
            width_ratio: smaller_over_larger(a.avg_char_width(), b.avg_char_width()),
            feature_distance_score: (1.0 - distance / params.feature_distance_scale).max(0.0),
        }
    }

    /// Combines the terms with the configured weights.
    pub fn weighted(&self, params: &ScoringParams) -> f64 {
        params.x_height_weight * self.x_height_ratio
            + params.contrast_weight * self.stroke_contrast_score
            + params.width_weight * self.width_ratio
            + params.feature_weight * self.feature_distance_score
    }
}

// Degenerate (zero) measurements compare as identical when both are zero
// and as maximally different otherwise.
fn x_height_ratio(a: f64, b: f64) -> f64 {
    if b == 0.0 {
        return if a == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - (a / b - 1.0).abs()
}

fn smaller_over_larger(a: f64, b: f64) -> f64 {
    let (min, max) = (a.min(b), a.max(b));
    if max == 0.0 {
        1.0
    } else {
        min / max
    }
}

/// Returns the compatibility score of two fonts.
///
/// Identical metrics score exactly `1.0`.
pub fn compatibility_score(a: &FontMetrics, b: &FontMetrics, params: &ScoringParams) -> f64 {
    ScoreTerms::new(a, b, params).weighted(params)
}

/// Pairwise and overall scores of three fonts.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct TrioScores {
    #[serde(rename = "AB")]
    pub ab: f64,
    #[serde(rename = "AC")]
    pub ac: f64,
    #[serde(rename = "BC")]
    pub bc: f64,
    /// Mean of the three pairwise scores.
    pub overall: f64,
}

impl TrioScores {
    pub fn new(a: &FontMetrics, b: &FontMetrics, c: &FontMetrics, params: &ScoringParams) -> Self {
        let ab = compatibility_score(a, b, params);
        let ac = compatibility_score(a, c, params);
        let bc = compatibility_score(b, c, params);
        Self {
            ab,
            ac,
            bc,
            overall: (ab + ac + bc) / 3.0,
        }
    }
}

/// A point in `(contrast, width, x-height)` space.
pub type Point3 = [f64; 3];

/// Projects a font into the space used by the triangle view.
pub fn triangle_point(metrics: &FontMetrics, params: &ScoringParams) -> Point3 {
    let contrast = metrics
        .stroke_contrast()
        .map(|contrast| contrast / params.triangle_contrast_scale)
        .unwrap_or(params.triangle_missing_contrast);
    [contrast, metrics.avg_char_width(), metrics.x_height()]
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct TrianglePoints {
    #[serde(rename = "A")]
    pub a: Point3,
    #[serde(rename = "B")]
    pub b: Point3,
    #[serde(rename = "C")]
    pub c: Point3,
}

/// The triangle spanned by three fonts in feature space.
///
/// Larger triangles indicate more diverse selections. The triangle is for
/// presentation only and does not feed into any score.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct Triangle {
    pub points: TrianglePoints,
    pub area: f64,
    pub perimeter: f64,
}

impl Triangle {
    pub fn new(a: Point3, b: Point3, c: Point3) -> Self {
        let ab = sub(b, a);
        let ac = sub(c, a);
        let area = 0.5 * length(cross(ab, ac));
        let perimeter = length(ab) + length(sub(c, b)) + length(sub(a, c));
        Self {
            points: TrianglePoints { a, b, c },
            area,
            perimeter,
        }
    }

    pub fn from_metrics(
        a: &FontMetrics,
        b: &FontMetrics,
        c: &FontMetrics,
        params: &ScoringParams,
    ) -> Self {
        Self::new(
            triangle_point(a, params),
            triangle_point(b, params),
            triangle_point(c, params),
        )
    }
}

fn sub(p: Point3, q: Point3) -> Point3 {
    [p[0] - q[0], p[1] - q[1], p[2] - q[2]]
}

fn cross(u: Point3, v: Point3) -> Point3 {
    [
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ]
}

fn length(v: Point3) -> f64 {
    euclidean_distance(&v, &[0.0; 3])
}

/// Qualitative reading of a score.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum MatchGrade {
    Excellent,
    Good,
    Poor,
}

impl MatchGrade {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            MatchGrade::Excellent
        } else if score >= 0.6 {
            MatchGrade::Good
        } else {
            MatchGrade::Poor
        }
    }
}

impl std::fmt::Display for MatchGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            MatchGrade::Excellent => "Excellent Match",
            MatchGrade::Good => "Good Match",
            MatchGrade::Poor => "Poor Match",
        };
        f.write_str(text)
    }
}
