//! Stroke contrast of a single glyph.
//!
//! The outline is flattened into short straight segments. Segments close to
//! horizontal and close to vertical are collected separately and the ratio of
//! their robust mean lengths approximates the ratio between thick and thin
//! strokes.

use core::f64::consts::{FRAC_PI_2, PI};

use kurbo::Point;
use skrifa::outline::{pen::PathElement, OutlinePen};

use crate::{
    geometry::{angle, distance, normalize_angle, sample_cubic_bezier, sample_quadratic_bezier},
    params::ContrastParams,
};

/// A straight piece of a flattened outline.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StrokeSegment {
    /// Length of the segment.
    pub width: f64,
    /// Direction of the segment in radians.
    pub angle: f64,
}

/// Pen that flattens an outline into [`StrokeSegment`]s.
///
/// Lines produce one segment; curves are sampled and each pair of
/// consecutive samples produces one. Closing a contour draws the implied
/// line back to its start. Segments outside the accepted length window
/// are dropped.
pub struct SegmentPen<'a> {
    params: &'a ContrastParams,
    min_width: f64,
    max_width: f64,
    current: Option<Point>,
    start: Option<Point>,
    segments: Vec<StrokeSegment>,
}

impl<'a> SegmentPen<'a> {
    pub fn new(params: &'a ContrastParams, font_size: f64) -> Self {
        Self {
            params,
            min_width: params.min_segment * font_size,
            max_width: params.max_segment * font_size,
            current: None,
            start: None,
            segments: vec![],
        }
    }

    pub fn into_segments(self) -> Vec<StrokeSegment> {
        self.segments
    }

    fn push(&mut self, from: Point, to: Point) {
        let width = distance(from, to);
        if (self.min_width..=self.max_width).contains(&width) {
            self.segments.push(StrokeSegment {
                width,
                angle: angle(from, to),
            });
        }
    }

    fn push_polyline(&mut self, from: Point, samples: Vec<Point>) {
        let mut prev = from;
        for sample in samples {
            self.push(prev, sample);
            prev = sample;
        }
    }
}

fn pt(x: f32, y: f32) -> Point {
    Point::new(x as f64, y as f64)
}

impl OutlinePen for SegmentPen<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        self.current = Some(pt(x, y));
        self.start = self.current;
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let to = pt(x, y);
        if let Some(from) = self.current {
            self.push(from, to);
        }
        self.current = Some(to);
    }

    fn quad_to(&mut self, cx0: f32, cy0: f32, x: f32, y: f32) {
        let to = pt(x, y);
        if let Some(from) = self.current {
            let samples =
                sample_quadratic_bezier(from, pt(cx0, cy0), to, self.params.quadratic_samples);
            self.push_polyline(from, samples);
        }
        self.current = Some(to);
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        let to = pt(x, y);
        if let Some(from) = self.current {
            let samples = sample_cubic_bezier(
                from,
                pt(cx0, cy0),
                pt(cx1, cy1),
                to,
                self.params.cubic_samples,
            );
            self.push_polyline(from, samples);
        }
        self.current = Some(to);
    }

    fn close(&mut self) {
        if let (Some(from), Some(start)) = (self.current, self.start) {
            if from != start {
                self.push(from, start);
            }
        }
        self.current = self.start;
    }
}

/// Replays recorded path elements into a pen.
pub fn replay(elements: &[PathElement], pen: &mut impl OutlinePen) {
    for element in elements {
        match *element {
            PathElement::MoveTo { x, y } => pen.move_to(x, y),
            PathElement::LineTo { x, y } => pen.line_to(x, y),
            PathElement::QuadTo { cx0, cy0, x, y } => pen.quad_to(cx0, cy0, x, y),
            PathElement::CurveTo {
                cx0,
                cy0,
                cx1,
                cy1,
                x,
                y,
            } => pen.curve_to(cx0, cy0, cx1, cy1, x, y),
            PathElement::Close => pen.close(),
        }
    }
}

/// Flattens an outline drawn at `font_size` into filtered segments.
pub fn stroke_segments(
    elements: &[PathElement],
    font_size: f64,
    params: &ContrastParams,
) -> Vec<StrokeSegment> {
    let mut pen = SegmentPen::new(params, font_size);
    replay(elements, &mut pen);
    pen.into_segments()
}

/// Orientation of a segment, ignoring direction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
    Diagonal,
}

impl Orientation {
    pub fn classify(angle: f64, tolerance: f64) -> Self {
        let angle = normalize_angle(angle);
        if angle < tolerance || angle > PI - tolerance {
            Orientation::Horizontal
        } else if (angle - FRAC_PI_2).abs() < tolerance {
            Orientation::Vertical
        } else {
            Orientation::Diagonal
        }
    }
}

/// Computes the thick to thin stroke ratio of an outline drawn at
/// `font_size`.
///
/// Returns `None` when the outline lacks enough horizontal or vertical
/// segments to measure. Otherwise the result lies in
/// `[1.0, params.max_contrast]`.
pub fn stroke_contrast(
    elements: &[PathElement],
    font_size: f64,
    params: &ContrastParams,
) -> Option<f64> {
    let mut horizontal = vec![];
    let mut vertical = vec![];
    for segment in stroke_segments(elements, font_size, params) {
        match Orientation::classify(segment.angle, params.angle_tolerance) {
            Orientation::Horizontal => horizontal.push(segment.width),
            Orientation::Vertical => vertical.push(segment.width),
            Orientation::Diagonal => (),
        }
    }
    if horizontal.len() < params.min_segments || vertical.len() < params.min_segments {
        return None;
    }
    let horizontal = trimmed_mean(&mut horizontal, params.trim_fraction);
    let vertical = trimmed_mean(&mut vertical, params.trim_fraction);
    if horizontal <= 0.0 || vertical <= 0.0 {
        return None;
    }
    let ratio = horizontal.max(vertical) / horizontal.min(vertical);
    Some(ratio.min(params.max_contrast))
}

/// Sorts `values` and returns their mean after dropping `trim_fraction`
/// of the values from each end.
///
/// Two or fewer values yield the median.
pub fn trimmed_mean(values: &mut [f64], trim_fraction: f64) -> f64 {
    values.sort_by(f64::total_cmp);
    if values.len() <= 2 {
        return median(values);
    }
    let trim = (values.len() as f64 * trim_fraction).floor() as usize;
    match values.get(trim..values.len().saturating_sub(trim)) {
        Some(kept) if !kept.is_empty() => kept.iter().sum::<f64>() / kept.len() as f64,
        _ => median(values),
    }
}

/// Median of sorted values; zero for an empty slice.
pub fn median(sorted: &[f64]) -> f64 {
    let len = sorted.len();
    if len == 0 {
        return 0.0;
    }
    let mid = len / 2;
    if len % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
