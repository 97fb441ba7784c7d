//! Glyph source backed by skrifa.

use skrifa::{
    charmap::Charmap,
    instance::{LocationRef, Size},
    outline::{pen::PathElement, DrawSettings},
    raw::FontRef,
    GlyphId, MetadataProvider, OutlineGlyphCollection,
};

use super::{DeclaredMetrics, GlyphSource};
use crate::error::{FontLoadError, GlyphError};

/// A TrueType or OpenType font, or the first font of a collection.
///
/// Outlines are drawn unhinted at the default location in variation space.
pub struct SkrifaFont<'a> {
    font: FontRef<'a>,
    charmap: Charmap<'a>,
    outlines: OutlineGlyphCollection<'a>,
}

impl<'a> SkrifaFont<'a> {
    pub fn new(data: &'a [u8]) -> Result<Self, FontLoadError> {
        let font = FontRef::from_index(data, 0).map_err(FontLoadError::Read)?;
        let outlines = font.outline_glyphs();
        if outlines.format().is_none() {
            return Err(FontLoadError::NoOutlines);
        }
        Ok(Self {
            charmap: font.charmap(),
            font,
            outlines,
        })
    }
}

impl GlyphSource for SkrifaFont<'_> {
    fn outline(&self, ch: char, size: f64) -> Result<Vec<PathElement>, GlyphError> {
        let glyph = self
            .charmap
            .map(ch)
            .and_then(|gid| self.outlines.get(gid))
            .ok_or(GlyphError::NotFound(ch))?;
        let mut elements = vec![];
        glyph
            .draw(
                DrawSettings::unhinted(Size::new(size as f32), LocationRef::default()),
                &mut elements,
            )
            .map_err(|error| GlyphError::Draw { ch, error })?;
        Ok(elements)
    }

    fn advance(&self, ch: char, size: f64) -> Result<f64, GlyphError> {
        let gid = self.charmap.map(ch).unwrap_or(GlyphId::NOTDEF);
        Ok(self
            .font
            .glyph_metrics(Size::new(size as f32), LocationRef::default())
            .advance_width(gid)
            .unwrap_or_default() as f64)
    }

    fn declared_metrics(&self, size: f64) -> DeclaredMetrics {
        let metrics = self
            .font
            .metrics(Size::new(size as f32), LocationRef::default());
        // a zero value means the table predates these fields
        let relative = |value: Option<f32>| {
            value
                .filter(|value| *value > 0.0)
                .map(|value| value as f64 / size)
        };
        DeclaredMetrics {
            x_height: relative(metrics.x_height),
            cap_height: relative(metrics.cap_height),
        }
    }
}

#[cfg(test)]
mod tests {
    use skrifa::outline::pen::PathElement;

    use super::*;
    use crate::{contrast::stroke_contrast, params::ContrastParams, test_data};

    fn has_cubics(elements: &[PathElement]) -> bool {
        elements
            .iter()
            .any(|el| matches!(el, PathElement::CurveTo { .. }))
    }

    #[test]
    fn truetype_outlines_and_advances() {
        let font = SkrifaFont::new(test_data::DEJAVU_SERIF).unwrap();
        let size = 300.0;
        for ch in ['x', 'H', 'O', 'e'] {
            let outline = font.outline(ch, size).unwrap();
            assert!(!outline.is_empty(), "'{ch}'");
            assert!(!has_cubics(&outline), "'{ch}' should be quadratic");
            assert!(font.advance(ch, size).unwrap() > 0.0, "'{ch}'");
        }
        let x = font.text_metrics("x", size).unwrap();
        let cap = font.text_metrics("H", size).unwrap();
        assert!((0.50..0.54).contains(&(x.height / size)), "{x:?}");
        assert!((0.71..0.75).contains(&(cap.height / size)), "{cap:?}");
        let contrast = stroke_contrast(
            &font.outline('H', size).unwrap(),
            size,
            &ContrastParams::default(),
        )
        .unwrap();
        assert!((1.0..=10.0).contains(&contrast), "{contrast}");
    }

    #[test]
    fn unmapped_character() {
        let font = SkrifaFont::new(test_data::DEJAVU_SERIF).unwrap();
        assert!(matches!(
            font.outline('\u{10FFFD}', 100.0),
            Err(GlyphError::NotFound('\u{10FFFD}'))
        ));
        // falls back to the advance of .notdef
        let notdef = font
            .font
            .glyph_metrics(Size::new(100.0), LocationRef::default())
            .advance_width(GlyphId::NOTDEF)
            .unwrap() as f64;
        assert_eq!(font.advance('\u{10FFFD}', 100.0).unwrap(), notdef);
    }

    #[test]
    fn old_os2_declares_nothing() {
        // DejaVu Serif has a version 1 OS/2 table without heights
        let font = SkrifaFont::new(test_data::DEJAVU_SERIF).unwrap();
        assert_eq!(font.declared_metrics(300.0), DeclaredMetrics::default());
    }

    #[test]
    fn cff_outlines() {
        let font = SkrifaFont::new(font_test_data::NOTO_SERIF_DISPLAY_TRIMMED).unwrap();
        let size = 300.0;
        let chars: Vec<char> = font
            .font
            .charmap()
            .mappings()
            .filter_map(|(codepoint, _)| char::from_u32(codepoint))
            .filter(|ch| !ch.is_whitespace())
            .collect();
        assert!(!chars.is_empty());
        for ch in chars {
            let outline = font.outline(ch, size).unwrap();
            assert!(has_cubics(&outline), "'{ch}' should be cubic");
            assert!(font.advance(ch, size).unwrap() > 0.0, "'{ch}'");
            let metrics = font.text_metrics(&ch.to_string(), size).unwrap();
            assert!(metrics.height > 0.0 && metrics.height < 2.0 * size, "{metrics:?}");
        }
    }

    #[test]
    fn fonts_without_outlines() {
        assert!(matches!(
            SkrifaFont::new(font_test_data::NAMES_ONLY),
            Err(FontLoadError::NoOutlines)
        ));
    }
}
