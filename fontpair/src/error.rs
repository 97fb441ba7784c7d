//! Error types.

use skrifa::{
    outline::DrawError,
    raw::{types::Tag, ReadError},
};
use thiserror::Error;

/// A font could not be turned into a glyph source.
#[derive(Debug, Error)]
pub enum FontLoadError {
    #[error("Error reading font data: {0}")]
    Read(ReadError),

    #[error("Font contains no scalable outlines")]
    NoOutlines,

    #[error("WOFF table '{0}' does not decompress to its declared length")]
    InvalidWoff(Tag),

    #[error("Failed to decompress WOFF table '{tag}': {source}")]
    WoffTable { tag: Tag, source: std::io::Error },

    #[error("Error decoding WOFF2 data: {0}")]
    Woff2(String),

    #[error("Invalid glyph set: {0}")]
    GlyphSet(#[from] serde_json::Error),

    #[error("Invalid path data for '{ch}': {message}")]
    GlyphPath { ch: char, message: String },

    #[error("Glyph set key '{0}' is not a single character")]
    InvalidGlyphKey(String),

    #[error("Glyph set has invalid units per em {0}")]
    InvalidUnitsPerEm(f64),

    #[error("Invalid advance {advance} for '{ch}', expected a finite non-negative value")]
    InvalidAdvance { ch: char, advance: f64 },

    #[error("Invalid default advance {0}, expected a finite non-negative value")]
    InvalidDefaultAdvance(f64),

    #[error("Unable to read '{path}': {source}")]
    Io {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
}

/// A single glyph could not be measured.
#[derive(Debug, Error)]
pub enum GlyphError {
    #[error("No glyph for character '{0}'")]
    NotFound(char),

    #[error("Failed to draw outline for '{ch}': {error}")]
    Draw { ch: char, error: DrawError },
}

/// Errors produced while extracting metrics from a font.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    FontLoad(#[from] FontLoadError),

    #[error(transparent)]
    Glyph(#[from] GlyphError),
}

/// An analysis parameter is outside the range the formulas accept.
#[derive(Debug, Error)]
#[error("Invalid parameter {name} = {value}, expected {expected}")]
pub struct ParamsError {
    pub name: &'static str,
    pub value: f64,
    pub expected: &'static str,
}
