//! Tunable constants for extraction and scoring.
//!
//! The defaults are the reference values; every field may be overridden
//! from a partial TOML or JSON document since all structs deserialize
//! with `#[serde(default)]`.

use core::f64::consts::PI;

use serde::Deserialize;

use crate::error::ParamsError;

/// All parameters consumed by an analysis.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Params {
    pub contrast: ContrastParams,
    pub extraction: ExtractionParams,
    pub scoring: ScoringParams,
}

impl Params {
    /// Checks that every value lies in the range the formulas accept.
    ///
    /// Values outside these ranges produce non-finite or negative results.
    pub fn validate(&self) -> Result<(), ParamsError> {
        let contrast = &self.contrast;
        let extraction = &self.extraction;
        let scoring = &self.scoring;
        check("contrast.min_segment", contrast.min_segment, "a value >= 0", |v| v >= 0.0)?;
        check(
            "contrast.max_segment",
            contrast.max_segment,
            "a value > min_segment",
            |v| v > contrast.min_segment,
        )?;
        check_count("contrast.cubic_samples", contrast.cubic_samples)?;
        check_count("contrast.quadratic_samples", contrast.quadratic_samples)?;
        check(
            "contrast.angle_tolerance",
            contrast.angle_tolerance,
            "a value in (0, π/4]",
            |v| v > 0.0 && v <= PI / 4.0,
        )?;
        check_count("contrast.min_segments", contrast.min_segments)?;
        check(
            "contrast.trim_fraction",
            contrast.trim_fraction,
            "a value in [0, 0.5)",
            |v| (0.0..0.5).contains(&v),
        )?;
        check("contrast.max_contrast", contrast.max_contrast, "a value >= 1", |v| v >= 1.0)?;
        check("extraction.font_size", extraction.font_size, "a value > 0", positive)?;
        check(
            "extraction.outlier_factor",
            extraction.outlier_factor,
            "a value >= 1",
            |v| v >= 1.0,
        )?;
        for (name, weight) in [
            ("scoring.x_height_weight", scoring.x_height_weight),
            ("scoring.contrast_weight", scoring.contrast_weight),
            ("scoring.width_weight", scoring.width_weight),
            ("scoring.feature_weight", scoring.feature_weight),
        ] {
            check(name, weight, "a value >= 0", |v| v >= 0.0)?;
        }
        check(
            "scoring.neutral_contrast_score",
            scoring.neutral_contrast_score,
            "a value in [0, 1]",
            |v| (0.0..=1.0).contains(&v),
        )?;
        check(
            "scoring.feature_distance_scale",
            scoring.feature_distance_scale,
            "a value > 0",
            positive,
        )?;
        check(
            "scoring.triangle_contrast_scale",
            scoring.triangle_contrast_scale,
            "a value > 0",
            positive,
        )?;
        check(
            "scoring.triangle_missing_contrast",
            scoring.triangle_missing_contrast,
            "a value >= 0",
            |v| v >= 0.0,
        )
    }
}

fn positive(value: f64) -> bool {
    value > 0.0
}

fn check(
    name: &'static str,
    value: f64,
    expected: &'static str,
    accept: impl FnOnce(f64) -> bool,
) -> Result<(), ParamsError> {
    if value.is_finite() && accept(value) {
        Ok(())
    } else {
        Err(ParamsError {
            name,
            value,
            expected,
        })
    }
}

fn check_count(name: &'static str, value: usize) -> Result<(), ParamsError> {
    check(name, value as f64, "a value >= 1", |v| v >= 1.0)
}

/// Parameters for measuring the stroke contrast of a single glyph.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContrastParams {
    /// Shortest accepted segment, as a fraction of the font size.
    pub min_segment: f64,
    /// Longest accepted segment, as a fraction of the font size.
    pub max_segment: f64,
    /// Number of samples taken along a cubic curve.
    pub cubic_samples: usize,
    /// Number of samples taken along a quadratic curve.
    pub quadratic_samples: usize,
    /// Maximum deviation from the horizontal or vertical axis, in radians.
    pub angle_tolerance: f64,
    /// Minimum number of segments required in each orientation.
    pub min_segments: usize,
    /// Fraction trimmed from each end before averaging widths.
    pub trim_fraction: f64,
    /// Upper bound for a contrast ratio.
    pub max_contrast: f64,
}

impl Default for ContrastParams {
    fn default() -> Self {
        Self {
            min_segment: 0.03,
            max_segment: 0.5,
            cubic_samples: 10,
            quadratic_samples: 8,
            angle_tolerance: PI / 9.0,
            min_segments: 2,
            trim_fraction: 0.2,
            max_contrast: 10.0,
        }
    }
}

/// Parameters for building a metrics record from a whole font.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractionParams {
    /// Nominal size, in pixels per em, at which outlines are measured.
    pub font_size: f64,
    /// Character measured for the x-height.
    pub x_height_char: char,
    /// Character measured for the cap-height.
    pub cap_height_char: char,
    /// Text whose advance is averaged into the character width.
    pub sample_text: String,
    /// Characters probed for stroke contrast.
    pub contrast_probes: Vec<char>,
    /// Per-glyph contrasts above `outlier_factor * median` are discarded.
    pub outlier_factor: f64,
}

impl Default for ExtractionParams {
    fn default() -> Self {
        Self {
            font_size: 300.0,
            x_height_char: 'x',
            cap_height_char: 'H',
            sample_text: "abcdefghijklmnopqrstuvwxyz".into(),
            contrast_probes: vec!['O', 'H', 'B', 'o', 'e', 'g', 'D', 'G', 'Q', 'p', 'q'],
            outlier_factor: 3.0,
        }
    }
}

/// Weights and constants of the compatibility formula.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringParams {
    pub x_height_weight: f64,
    pub contrast_weight: f64,
    pub width_weight: f64,
    pub feature_weight: f64,
    /// Contrast score used when either font has no measurable contrast.
    pub neutral_contrast_score: f64,
    /// Feature distance at which the distance score reaches zero.
    pub feature_distance_scale: f64,
    /// Divisor applied to contrast for the triangle projection.
    pub triangle_contrast_scale: f64,
    /// Triangle coordinate used for fonts without a contrast value.
    pub triangle_missing_contrast: f64,
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            x_height_weight: 0.35,
            contrast_weight: 0.25,
            width_weight: 0.20,
            feature_weight: 0.20,
            neutral_contrast_score: 0.5,
            feature_distance_scale: 10.0,
            triangle_contrast_scale: 10.0,
            triangle_missing_contrast: 0.1,
        }
    }
}
