//! Analysis requests and their results.

use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;

use crate::{
    error::{Error, ParamsError},
    metrics::FontMetrics,
    params::Params,
    score::{compatibility_score, MatchGrade, Triangle, TrioScores},
    source::FontData,
};

/// Fonts submitted for a single analysis.
///
/// Fonts A and B are required, font C is optional.
#[derive(Debug, Default)]
pub struct AnalysisRequest {
    pub font_a: Option<FontData>,
    pub font_b: Option<FontData>,
    pub font_c: Option<FontData>,
}

impl AnalysisRequest {
    /// Builds a request from fonts in submission order.
    ///
    /// Fonts beyond the third are ignored.
    pub fn from_fonts(fonts: impl IntoIterator<Item = FontData>) -> Self {
        let mut fonts = fonts.into_iter();
        Self {
            font_a: fonts.next(),
            font_b: fonts.next(),
            font_c: fonts.next(),
        }
    }

    /// Extracts metrics for every font and scores them.
    ///
    /// Fonts are measured in parallel. Any font that fails to load fails the
    /// whole request.
    pub fn analyze(&self, params: &Params) -> Result<CompatibilityReport, RequestError> {
        let (Some(font_a), Some(font_b)) = (&self.font_a, &self.font_b) else {
            return Err(RequestError::MissingFont);
        };
        params.validate()?;
        let fonts: Vec<&FontData> = [Some(font_a), Some(font_b), self.font_c.as_ref()]
            .into_iter()
            .flatten()
            .collect();
        let mut metrics = fonts
            .par_iter()
            .map(|data| FontMetrics::from_data(data, params))
            .collect::<Result<Vec<_>, _>>()?
            .into_iter();
        match (metrics.next(), metrics.next(), metrics.next()) {
            (Some(a), Some(b), None) => Ok(CompatibilityReport::pair(a, b, params)),
            (Some(a), Some(b), Some(c)) => Ok(CompatibilityReport::trio(a, b, c, params)),
            _ => Err(RequestError::MissingFont),
        }
    }
}

/// Result of an analysis.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CompatibilityReport {
    Pair(PairReport),
    Trio(TrioReport),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairReport {
    pub font_a: FontMetrics,
    pub font_b: FontMetrics,
    pub compatibility_score: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrioReport {
    pub font_a: FontMetrics,
    pub font_b: FontMetrics,
    pub font_c: FontMetrics,
    pub compatibility_scores: TrioScores,
    pub triangle_method: Triangle,
}

impl CompatibilityReport {
    pub fn pair(font_a: FontMetrics, font_b: FontMetrics, params: &Params) -> Self {
        let compatibility_score = compatibility_score(&font_a, &font_b, &params.scoring);
        CompatibilityReport::Pair(PairReport {
            font_a,
            font_b,
            compatibility_score,
        })
    }

    pub fn trio(
        font_a: FontMetrics,
        font_b: FontMetrics,
        font_c: FontMetrics,
        params: &Params,
    ) -> Self {
        let compatibility_scores = TrioScores::new(&font_a, &font_b, &font_c, &params.scoring);
        let triangle_method = Triangle::from_metrics(&font_a, &font_b, &font_c, &params.scoring);
        CompatibilityReport::Trio(TrioReport {
            font_a,
            font_b,
            font_c,
            compatibility_scores,
            triangle_method,
        })
    }

    /// The pair score, or the overall score of three fonts.
    pub fn score(&self) -> f64 {
        match self {
            CompatibilityReport::Pair(report) => report.compatibility_score,
            CompatibilityReport::Trio(report) => report.compatibility_scores.overall,
        }
    }

    /// Grade of [`Self::score`]; the overall score of three fonts is
    /// rounded to two decimals first.
    pub fn grade(&self) -> MatchGrade {
        match self {
            CompatibilityReport::Pair(report) => MatchGrade::from_score(report.compatibility_score),
            CompatibilityReport::Trio(report) => {
                let overall = report.compatibility_scores.overall;
                MatchGrade::from_score((overall * 100.0).round() / 100.0)
            }
        }
    }

    pub fn fonts(&self) -> Vec<&FontMetrics> {
        match self {
            CompatibilityReport::Pair(report) => vec![&report.font_a, &report.font_b],
            CompatibilityReport::Trio(report) => {
                vec![&report.font_a, &report.font_b, &report.font_c]
            }
        }
    }
}

/// Failure of an analysis request.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The caller did not supply the required fonts.
    #[error("Font A and Font B are required")]
    MissingFont,

    /// The analysis parameters are out of range.
    #[error(transparent)]
    InvalidParams(#[from] ParamsError),

    /// A font could not be analyzed.
    #[error(transparent)]
    Analysis(#[from] Error),
}

impl RequestError {
    /// Returns true if the request itself was invalid.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            RequestError::MissingFont | RequestError::InvalidParams(_)
        )
    }

    /// HTTP status code that reports this error.
    pub fn status(&self) -> u16 {
        if self.is_client_error() {
            400
        } else {
            500
        }
    }

    /// Body of the error response.
    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.to_string(),
        }
    }
}

/// Error payload returned in place of a report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: String,
}
