//! Access to glyph outlines and advances.
//!
//! Analysis code is written against the [`GlyphSource`] trait. Two backends
//! implement it: [`SkrifaFont`] reads TrueType and OpenType binaries and
//! [`SvgGlyphSet`] reads glyphs described as SVG path data.

mod skrifa;
mod svg;
mod woff;

use std::{path::Path, sync::OnceLock};

use ::skrifa::outline::pen::PathElement;
use kurbo::{BezPath, Rect, Shape};
use serde::Serialize;

use crate::error::{FontLoadError, GlyphError};

pub use self::skrifa::SkrifaFont;
pub use self::svg::SvgGlyphSet;

/// Horizontal extent and ink height of a run of text.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct TextMetrics {
    /// Sum of the advance widths of all characters.
    pub width: f64,
    /// Distance between the lowest and highest inked points.
    pub height: f64,
}

/// Vertical metrics a font declares about itself, relative to the font
/// size.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclaredMetrics {
    pub x_height: Option<f64>,
    pub cap_height: Option<f64>,
}

/// Interface to a loaded font.
///
/// Coordinates are in pixels at the requested size (pixels per em) with
/// the y axis pointing up.
pub trait GlyphSource {
    /// Returns the outline of the glyph mapped to `ch`.
    fn outline(&self, ch: char, size: f64) -> Result<Vec<PathElement>, GlyphError>;

    /// Returns the advance width used when rendering `ch`.
    ///
    /// Characters without a glyph use the font's fallback advance.
    fn advance(&self, ch: char, size: f64) -> Result<f64, GlyphError>;

    /// Returns the vertical metrics declared by the font, if any.
    fn declared_metrics(&self, _size: f64) -> DeclaredMetrics {
        DeclaredMetrics::default()
    }

    /// Returns the sum of the advances of `text`.
    ///
    /// No outlines are drawn.
    fn text_width(&self, text: &str, size: f64) -> Result<f64, GlyphError> {
        text.chars().map(|ch| self.advance(ch, size)).sum()
    }

    /// Returns the combined advance and ink height of `text`.
    ///
    /// Characters that are missing or fail to draw add their advance but no
    /// ink.
    fn text_metrics(&self, text: &str, size: f64) -> Result<TextMetrics, GlyphError> {
        let mut ink: Option<(f64, f64)> = None;
        for ch in text.chars() {
            let elements = match self.outline(ch, size) {
                Ok(elements) => elements,
                Err(GlyphError::NotFound(_)) => {
                    log::debug!("no glyph for '{ch}', measuring advance only");
                    continue;
                }
                Err(e) => {
                    log::warn!("{e}, measuring advance only");
                    continue;
                }
            };
            if let Some(bounds) = ink_bounds(&elements) {
                ink = Some(match ink {
                    Some((low, high)) => (low.min(bounds.y0), high.max(bounds.y1)),
                    None => (bounds.y0, bounds.y1),
                });
            }
        }
        Ok(TextMetrics {
            width: self.text_width(text, size)?,
            height: ink.map(|(low, high)| high - low).unwrap_or_default(),
        })
    }
}

/// Owner of the bytes backing a font.
///
/// Data is either held in memory or mapped from a file. WOFF and WOFF2
/// containers are decoded on first load into a buffer owned by this value.
/// Dropping the value releases the buffers or unmaps the file.
pub struct FontData {
    data: Data,
    sfnt: OnceLock<Vec<u8>>,
}

enum Data {
    Owned(Vec<u8>),
    Mapped(memmap2::Mmap),
}

impl FontData {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self::from_data(Data::Owned(bytes.into()))
    }

    fn from_data(data: Data) -> Self {
        Self {
            data,
            sfnt: OnceLock::new(),
        }
    }

    /// Maps the file at `path` into memory.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, FontLoadError> {
        let path = path.as_ref();
        let io_error = |source| FontLoadError::Io {
            path: path.to_owned(),
            source,
        };
        let file = std::fs::File::open(path).map_err(io_error)?;
        // Empty files cannot be mapped on every platform
        if file.metadata().map_err(io_error)?.len() == 0 {
            return Ok(Self::new(Vec::new()));
        }
        // Safety: the map is read-only and lives no longer than this value
        let map = unsafe { memmap2::Mmap::map(&file) }.map_err(io_error)?;
        Ok(Self::from_data(Data::Mapped(map)))
    }

    pub fn as_bytes(&self) -> &[u8] {
        match &self.data {
            Data::Owned(bytes) => bytes,
            Data::Mapped(map) => map.as_ref(),
        }
    }

    /// Parses the data with the backend matching its signature.
    pub fn load(&self) -> Result<Font<'_>, FontLoadError> {
        let bytes = self.as_bytes();
        match Format::detect(bytes) {
            Format::Sfnt => SkrifaFont::new(bytes).map(Font::Skrifa),
            Format::GlyphSet => SvgGlyphSet::from_json(bytes).map(Font::Svg),
            Format::Woff => SkrifaFont::new(self.decoded(woff::decode_woff)?).map(Font::Skrifa),
            Format::Woff2 => SkrifaFont::new(self.decoded(woff::decode_woff2)?).map(Font::Skrifa),
        }
    }

    /// Returns the sfnt data unwrapped from a container, decoding it once.
    fn decoded(
        &self,
        decode: fn(&[u8]) -> Result<Vec<u8>, FontLoadError>,
    ) -> Result<&[u8], FontLoadError> {
        if let Some(sfnt) = self.sfnt.get() {
            return Ok(sfnt);
        }
        let sfnt = decode(self.as_bytes())?;
        Ok(self.sfnt.get_or_init(|| sfnt))
    }
}

impl AsRef<[u8]> for FontData {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl std::fmt::Debug for FontData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match &self.data {
            Data::Owned(_) => "owned",
            Data::Mapped(_) => "mapped",
        };
        write!(f, "FontData({kind}, {} bytes)", self.as_bytes().len())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Format {
    Sfnt,
    GlyphSet,
    Woff,
    Woff2,
}

impl Format {
    fn detect(bytes: &[u8]) -> Self {
        match bytes.get(..4) {
            Some(b"wOFF") => Format::Woff,
            Some(b"wOF2") => Format::Woff2,
            _ if bytes.trim_ascii_start().starts_with(b"{") => Format::GlyphSet,
            _ => Format::Sfnt,
        }
    }
}

/// A parsed font from either backend.
pub enum Font<'a> {
    Skrifa(SkrifaFont<'a>),
    Svg(SvgGlyphSet),
}

impl GlyphSource for Font<'_> {
    fn outline(&self, ch: char, size: f64) -> Result<Vec<PathElement>, GlyphError> {
        match self {
            Font::Skrifa(font) => font.outline(ch, size),
            Font::Svg(glyphs) => glyphs.outline(ch, size),
        }
    }

    fn advance(&self, ch: char, size: f64) -> Result<f64, GlyphError> {
        match self {
            Font::Skrifa(font) => font.advance(ch, size),
            Font::Svg(glyphs) => glyphs.advance(ch, size),
        }
    }

    fn declared_metrics(&self, size: f64) -> DeclaredMetrics {
        match self {
            Font::Skrifa(font) => font.declared_metrics(size),
            Font::Svg(glyphs) => glyphs.declared_metrics(size),
        }
    }
}

/// Converts path elements to a kurbo path.
pub(crate) fn to_bez_path(elements: &[PathElement]) -> BezPath {
    let mut path = BezPath::new();
    let p = |x: f32, y: f32| (x as f64, y as f64);
    for element in elements {
        match *element {
            PathElement::MoveTo { x, y } => path.move_to(p(x, y)),
            PathElement::LineTo { x, y } => path.line_to(p(x, y)),
            PathElement::QuadTo { cx0, cy0, x, y } => path.quad_to(p(cx0, cy0), p(x, y)),
            PathElement::CurveTo {
                cx0,
                cy0,
                cx1,
                cy1,
                x,
                y,
            } => path.curve_to(p(cx0, cy0), p(cx1, cy1), p(x, y)),
            PathElement::Close => path.close_path(),
        }
    }
    path
}

/// Returns the tight bounds of the drawn parts of an outline.
///
/// Outlines without any segments have no bounds.
pub(crate) fn ink_bounds(elements: &[PathElement]) -> Option<Rect> {
    let path = to_bez_path(elements);
    path.segments().next()?;
    Some(path.bounding_box())
}
