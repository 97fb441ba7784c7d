//! Typographic measurements and compatibility scores for font pairings.
//!
//! Fonts are measured by flattening glyph outlines drawn at a nominal size:
//! x-height and cap-height come from the ink bounds of `x` and `H`, the
//! average character width from the advance of the lowercase alphabet, and
//! the stroke contrast from the ratio of horizontal to vertical segment
//! lengths across a set of probe glyphs. Two measured fonts are combined into
//! a single weighted score; three fonts additionally span a triangle in
//! feature space.
//!
//! TrueType and OpenType fonts are read with skrifa, including collections
//! and fonts wrapped in WOFF or WOFF2 containers.
//!
//! ```no_run
//! use fontpair::{AnalysisRequest, FontData, Params};
//!
//! let request = AnalysisRequest::from_fonts([
//!     FontData::open("Heading.ttf").unwrap(),
//!     FontData::open("Body.otf").unwrap(),
//! ]);
//! let report = request.analyze(&Params::default()).unwrap();
//! println!("{:.2} ({})", report.score(), report.grade());
//! ```

pub mod contrast;
mod error;
pub mod geometry;
mod metrics;
pub mod params;
mod report;
pub mod score;
pub mod source;

#[cfg(test)]
mod test_data;

pub use error::{Error, FontLoadError, GlyphError, ParamsError};
pub use metrics::FontMetrics;
pub use params::Params;
pub use report::{
    AnalysisRequest, CompatibilityReport, ErrorBody, PairReport, RequestError, TrioReport,
};
pub use score::{compatibility_score, MatchGrade, Triangle, TrioScores};
pub use source::{DeclaredMetrics, FontData, GlyphSource, TextMetrics};
