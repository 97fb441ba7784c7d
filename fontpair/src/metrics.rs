//! Per-font typographic measurements.

use serde::Serialize;

use crate::{
    contrast::stroke_contrast,
    error::{Error, GlyphError},
    params::{ExtractionParams, Params},
    source::{FontData, GlyphSource},
};

/// Measurements of one font, relative to the font size.
///
/// The feature vector is derived from the other fields on construction and
/// the record is never modified afterwards.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FontMetrics {
    x_height: f64,
    cap_height: f64,
    stroke_contrast: Option<f64>,
    avg_char_width: f64,
    feature_vector: [f64; 4],
}

impl FontMetrics {
    pub fn new(
        x_height: f64,
        cap_height: f64,
        stroke_contrast: Option<f64>,
        avg_char_width: f64,
    ) -> Self {
        Self {
            x_height,
            cap_height,
            stroke_contrast,
            avg_char_width,
            feature_vector: [
                x_height,
                cap_height,
                stroke_contrast.unwrap_or(0.0),
                avg_char_width,
            ],
        }
    }

    /// Loads `data` and measures it.
    pub fn from_data(data: &FontData, params: &Params) -> Result<Self, Error> {
        let font = data.load()?;
        Self::extract(&font, params)
    }

    /// Measures a loaded font.
    ///
    /// Characters that are missing or fail to draw have no ink. They measure
    /// as zero height and only reduce the number of contrast samples.
    pub fn extract(source: &impl GlyphSource, params: &Params) -> Result<Self, Error> {
        let extraction = &params.extraction;
        let size = extraction.font_size;
        let height = |ch: char| -> Result<f64, GlyphError> {
            let mut buf = [0; 4];
            Ok(source.text_metrics(ch.encode_utf8(&mut buf), size)?.height / size)
        };
        let x_height = height(extraction.x_height_char)?;
        let cap_height = height(extraction.cap_height_char)?;
        let sample_len = extraction.sample_text.chars().count();
        let avg_char_width = if sample_len == 0 {
            0.0
        } else {
            source.text_width(&extraction.sample_text, size)? / size / sample_len as f64
        };
        let contrasts = probe_contrasts(source, params);
        let stroke_contrast = combine_contrasts(contrasts, extraction);
        log::info!(
            "measured x-height {x_height:.4}, cap-height {cap_height:.4}, \
             width {avg_char_width:.4}, contrast {stroke_contrast:?}"
        );
        Ok(Self::new(
            x_height,
            cap_height,
            stroke_contrast,
            avg_char_width,
        ))
    }

    pub fn x_height(&self) -> f64 {
        self.x_height
    }

    pub fn cap_height(&self) -> f64 {
        self.cap_height
    }

    /// Thick to thin stroke ratio, or `None` if it could not be measured.
    pub fn stroke_contrast(&self) -> Option<f64> {
        self.stroke_contrast
    }

    pub fn avg_char_width(&self) -> f64 {
        self.avg_char_width
    }

    /// `[x_height, cap_height, stroke_contrast or 0, avg_char_width]`
    pub fn feature_vector(&self) -> &[f64; 4] {
        &self.feature_vector
    }
}

/// Measures the contrast of every probe character that yields a value.
fn probe_contrasts(source: &impl GlyphSource, params: &Params) -> Vec<f64> {
    let size = params.extraction.font_size;
    params
        .extraction
        .contrast_probes
        .iter()
        .filter_map(|&ch| {
            let outline = match source.outline(ch, size) {
                Ok(outline) => outline,
                Err(e @ GlyphError::NotFound(_)) => {
                    log::debug!("skipping contrast probe: {e}");
                    return None;
                }
                Err(e) => {
                    log::warn!("skipping contrast probe: {e}");
                    return None;
                }
            };
            let contrast = stroke_contrast(&outline, size, &params.contrast);
            log::debug!("stroke contrast for '{ch}': {contrast:?}");
            contrast
        })
        .collect()
}

/// Averages per-glyph contrasts after discarding values far above the
/// median.
fn combine_contrasts(mut values: Vec<f64>, params: &ExtractionParams) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let median = values[values.len() / 2];
    let cutoff = median * params.outlier_factor;
    let kept: Vec<_> = values.iter().copied().filter(|v| *v <= cutoff).collect();
    if kept.len() < values.len() {
        log::debug!(
            "discarded {} contrast outliers above {cutoff:.3}",
            values.len() - kept.len()
        );
    }
    if kept.is_empty() {
        return Some(median);
    }
    Some(kept.iter().sum::<f64>() / kept.len() as f64)
}

#[cfg(test)]
mod tests {
    use skrifa::{
        outline::{pen::PathElement, DrawError},
        GlyphId,
    };

    use super::*;
    use crate::{source::SvgGlyphSet, test_data};
    use pretty_assertions::assert_eq;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-6, "{a} != {b}");
    }

    /// Monoline glyphs with a stroke of 100 units and a contrast of 1.
    fn monoline() -> SvgGlyphSet {
        let mut glyphs = SvgGlyphSet::new(1000.0).unwrap();
        // x: a 500 unit tall box, H: 700 units tall
        glyphs
            .insert('x', 500.0, "M0 0 L500 0 L500 500 L0 500 Z")
            .unwrap();
        glyphs
            .insert('H', 700.0, "M0 0 L100 0 L100 700 L0 700 Z M400 0 L500 0 L500 700 L400 700 Z")
            .unwrap();
        // O: a square ring whose edges are drawn as 100 unit pieces
        glyphs
            .insert(
                'O',
                600.0,
                "M0 0 L100 0 L200 0 L300 0 L400 0 L400 100 L400 200 L400 300 L400 400 \
                 L300 400 L200 400 L100 400 L0 400 L0 300 L0 200 L0 100 Z",
            )
            .unwrap();
        glyphs
    }

    #[test]
    fn feature_vector_follows_fields() {
        let metrics = FontMetrics::new(0.5, 0.7, None, 0.45);
        assert_eq!(metrics.feature_vector(), &[0.5, 0.7, 0.0, 0.45]);
        let metrics = FontMetrics::new(0.5, 0.7, Some(2.5), 0.45);
        assert_eq!(metrics.feature_vector(), &[0.5, 0.7, 2.5, 0.45]);
    }

    #[test]
    fn serialize_shape() {
        let metrics = FontMetrics::new(0.5, 0.75, None, 0.25);
        assert_eq!(
            serde_json::to_value(&metrics).unwrap(),
            serde_json::json!({
                "xHeight": 0.5,
                "capHeight": 0.75,
                "strokeContrast": null,
                "avgCharWidth": 0.25,
                "featureVector": [0.5, 0.75, 0.0, 0.25],
            })
        );
    }

    #[test]
    fn extract_monoline() {
        let glyphs = monoline();
        let params = Params {
            extraction: ExtractionParams {
                sample_text: "xH".into(),
                ..Default::default()
            },
            ..Default::default()
        };
        let metrics = FontMetrics::extract(&glyphs, &params).unwrap();
        assert_close(metrics.x_height(), 0.5);
        assert_close(metrics.cap_height(), 0.7);
        assert_close(metrics.avg_char_width(), 0.6);
        // the stems of H exceed the segment window, the edges of O are even
        assert_eq!(metrics.stroke_contrast(), Some(1.0));
        assert_eq!(
            metrics.feature_vector(),
            &[
                metrics.x_height(),
                metrics.cap_height(),
                1.0,
                metrics.avg_char_width()
            ]
        );
    }

    #[test]
    fn missing_probes_give_no_contrast() {
        let mut glyphs = SvgGlyphSet::new(1000.0).unwrap();
        glyphs.insert('x', 500.0, "M0 0 L500 0 L500 500 L0 500 Z").unwrap();
        let metrics = FontMetrics::extract(&glyphs, &Params::default()).unwrap();
        assert_eq!(metrics.stroke_contrast(), None);
        assert_eq!(metrics.cap_height(), 0.0);
        assert_eq!(metrics.feature_vector()[2], 0.0);
    }

    #[test]
    fn combine_discards_outliers() {
        let params = ExtractionParams::default();
        assert_eq!(combine_contrasts(vec![], &params), None);
        assert_eq!(combine_contrasts(vec![2.0], &params), Some(2.0));
        // median is the upper middle value, 3.0; 10.0 is above 3x median
        assert_eq!(
            combine_contrasts(vec![10.0, 1.0, 2.0, 3.0], &params),
            Some(2.0)
        );
        assert_eq!(
            combine_contrasts(vec![9.0, 1.0, 2.0, 3.0], &params),
            Some(3.75)
        );
        assert_eq!(combine_contrasts(vec![1.0, 2.0, 3.0], &params), Some(2.0));
    }

    /// Monoline glyphs that fail to draw the listed characters.
    struct FailingDraws(SvgGlyphSet, &'static [char]);

    impl GlyphSource for FailingDraws {
        fn outline(&self, ch: char, size: f64) -> Result<Vec<PathElement>, GlyphError> {
            if self.1.contains(&ch) {
                return Err(GlyphError::Draw {
                    ch,
                    error: DrawError::GlyphNotFound(GlyphId::new(7)),
                });
            }
            self.0.outline(ch, size)
        }

        fn advance(&self, ch: char, size: f64) -> Result<f64, GlyphError> {
            self.0.advance(ch, size)
        }
    }

    #[test]
    fn draw_failures_do_not_abort_extraction() {
        let mut glyphs = monoline();
        glyphs
            .insert('g', 550.0, "M0 -200 L100 -200 L100 500 L0 500 Z")
            .unwrap();
        let params = Params {
            extraction: ExtractionParams {
                sample_text: "xHg".into(),
                ..Default::default()
            },
            ..Default::default()
        };
        let expected = FontMetrics::extract(&glyphs, &params).unwrap();

        let failing = FailingDraws(glyphs, &['g']);
        let metrics = FontMetrics::extract(&failing, &params).unwrap();
        assert_eq!(metrics, expected);
        assert_close(metrics.avg_char_width(), (500.0 + 700.0 + 550.0) / 3000.0);

        let failing = FailingDraws(failing.0, &['x', 'O']);
        let metrics = FontMetrics::extract(&failing, &params).unwrap();
        assert_eq!(metrics.x_height(), 0.0);
        assert_close(metrics.cap_height(), 0.7);
        assert_eq!(metrics.stroke_contrast(), None);
        assert_close(metrics.avg_char_width(), expected.avg_char_width());
    }

    #[test]
    fn measure_truetype() {
        let data = FontData::new(test_data::DEJAVU_SERIF);
        let metrics = FontMetrics::from_data(&data, &Params::default()).unwrap();
        assert!((0.50..0.54).contains(&metrics.x_height()), "{metrics:?}");
        assert!((0.71..0.75).contains(&metrics.cap_height()), "{metrics:?}");
        assert!((0.5..0.65).contains(&metrics.avg_char_width()), "{metrics:?}");
        let contrast = metrics.stroke_contrast().unwrap();
        assert!((1.0..=10.0).contains(&contrast), "{contrast}");
    }

    #[test]
    fn containers_measure_like_sfnt() {
        let params = Params::default();
        let ttf = FontMetrics::from_data(&FontData::new(test_data::DEJAVU_SERIF), &params);
        let woff = FontMetrics::from_data(&FontData::new(test_data::DEJAVU_SERIF_WOFF), &params);
        assert_eq!(woff.unwrap(), ttf.unwrap());

        let data = FontData::new(test_data::SOURCE_SERIF_WOFF2);
        let metrics = FontMetrics::from_data(&data, &params).unwrap();
        let declared = data.load().unwrap().declared_metrics(params.extraction.font_size);
        let declared_x = declared.x_height.unwrap();
        let declared_cap = declared.cap_height.unwrap();
        assert!((0.4..0.6).contains(&metrics.x_height()), "{metrics:?}");
        assert!((0.6..0.8).contains(&metrics.cap_height()), "{metrics:?}");
        assert!((metrics.x_height() - declared_x).abs() < 0.03, "{declared:?}");
        assert!((metrics.cap_height() - declared_cap).abs() < 0.03, "{declared:?}");
        assert!(metrics.avg_char_width() > 0.0);
        let contrast = metrics.stroke_contrast().unwrap();
        assert!((1.0..=10.0).contains(&contrast), "{contrast}");
    }

    #[test]
    fn unloadable_data_is_a_load_error() {
        let data = FontData::new(b"\0\x01\0\0 garbage".to_vec());
        assert!(matches!(
            FontMetrics::from_data(&data, &Params::default()),
            Err(Error::FontLoad(_))
        ));
    }
}
