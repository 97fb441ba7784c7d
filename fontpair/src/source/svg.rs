//! Glyph source built from SVG path data.
//!
//! A glyph set is a JSON document listing glyphs in font units, y up:
//!
//! ```json
//! {
//!     "unitsPerEm": 1000,
//!     "defaultAdvance": 500,
//!     "xHeight": 500,
//!     "glyphs": {
//!         "l": { "advance": 300, "path": "M100 0 L200 0 L200 700 L100 700 Z" }
//!     }
//! }
//! ```

use std::collections::{BTreeMap, HashMap};

use kurbo::{Affine, BezPath, PathEl};
use serde::Deserialize;
use skrifa::outline::pen::PathElement;

use super::{DeclaredMetrics, GlyphSource};
use crate::error::{FontLoadError, GlyphError};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct GlyphSetFile {
    units_per_em: f64,
    #[serde(default)]
    default_advance: f64,
    #[serde(default)]
    x_height: Option<f64>,
    #[serde(default)]
    cap_height: Option<f64>,
    glyphs: BTreeMap<String, GlyphFile>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct GlyphFile {
    advance: f64,
    #[serde(default)]
    path: String,
}

struct SvgGlyph {
    advance: f64,
    path: BezPath,
}

/// A set of glyphs keyed by character.
pub struct SvgGlyphSet {
    units_per_em: f64,
    default_advance: f64,
    declared_x_height: Option<f64>,
    declared_cap_height: Option<f64>,
    glyphs: HashMap<char, SvgGlyph>,
}

impl SvgGlyphSet {
    pub fn new(units_per_em: f64) -> Result<Self, FontLoadError> {
        if !(units_per_em.is_finite() && units_per_em > 0.0) {
            return Err(FontLoadError::InvalidUnitsPerEm(units_per_em));
        }
        Ok(Self {
            units_per_em,
            default_advance: 0.0,
            declared_x_height: None,
            declared_cap_height: None,
            glyphs: HashMap::new(),
        })
    }

    /// Parses a JSON glyph set.
    pub fn from_json(data: &[u8]) -> Result<Self, FontLoadError> {
        let file: GlyphSetFile = serde_json::from_slice(data)?;
        let mut set = Self::new(file.units_per_em)?;
        if !is_valid_advance(file.default_advance) {
            return Err(FontLoadError::InvalidDefaultAdvance(file.default_advance));
        }
        set.default_advance = file.default_advance;
        set.declared_x_height = file.x_height;
        set.declared_cap_height = file.cap_height;
        for (key, glyph) in file.glyphs {
            let mut chars = key.chars();
            let ch = match (chars.next(), chars.next()) {
                (Some(ch), None) => ch,
                _ => return Err(FontLoadError::InvalidGlyphKey(key)),
            };
            set.insert(ch, glyph.advance, &glyph.path)?;
        }
        Ok(set)
    }

    /// Adds or replaces the glyph for `ch`.
    ///
    /// `path_data` uses SVG syntax in font units. The advance must be finite
    /// and non-negative.
    pub fn insert(&mut self, ch: char, advance: f64, path_data: &str) -> Result<(), FontLoadError> {
        if !is_valid_advance(advance) {
            return Err(FontLoadError::InvalidAdvance { ch, advance });
        }
        let path = BezPath::from_svg(path_data).map_err(|e| FontLoadError::GlyphPath {
            ch,
            message: e.to_string(),
        })?;
        self.glyphs.insert(ch, SvgGlyph { advance, path });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    fn scale(&self, size: f64) -> f64 {
        size / self.units_per_em
    }
}

fn is_valid_advance(advance: f64) -> bool {
    advance.is_finite() && advance >= 0.0
}

impl GlyphSource for SvgGlyphSet {
    fn outline(&self, ch: char, size: f64) -> Result<Vec<PathElement>, GlyphError> {
        let glyph = self.glyphs.get(&ch).ok_or(GlyphError::NotFound(ch))?;
        let mut path = glyph.path.clone();
        path.apply_affine(Affine::scale(self.scale(size)));
        let p = |pt: kurbo::Point| (pt.x as f32, pt.y as f32);
        Ok(path
            .elements()
            .iter()
            .map(|el| match *el {
                PathEl::MoveTo(pt) => {
                    let (x, y) = p(pt);
                    PathElement::MoveTo { x, y }
                }
                PathEl::LineTo(pt) => {
                    let (x, y) = p(pt);
                    PathElement::LineTo { x, y }
                }
                PathEl::QuadTo(c, pt) => {
                    let ((cx0, cy0), (x, y)) = (p(c), p(pt));
                    PathElement::QuadTo { cx0, cy0, x, y }
                }
                PathEl::CurveTo(c0, c1, pt) => {
                    let ((cx0, cy0), (cx1, cy1), (x, y)) = (p(c0), p(c1), p(pt));
                    PathElement::CurveTo {
                        cx0,
                        cy0,
                        cx1,
                        cy1,
                        x,
                        y,
                    }
                }
                PathEl::ClosePath => PathElement::Close,
            })
            .collect())
    }

    fn advance(&self, ch: char, size: f64) -> Result<f64, GlyphError> {
        let advance = self
            .glyphs
            .get(&ch)
            .map(|glyph| glyph.advance)
            .unwrap_or(self.default_advance);
        Ok(advance * self.scale(size))
    }

    fn declared_metrics(&self, _size: f64) -> DeclaredMetrics {
        let relative = |value: Option<f64>| value.map(|value| value / self.units_per_em);
        DeclaredMetrics {
            x_height: relative(self.declared_x_height),
            cap_height: relative(self.declared_cap_height),
        }
    }
}
