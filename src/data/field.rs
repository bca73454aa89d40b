//! Field expressions and extraction modes.
//!
//! Each dataset row targets either a raw record path or a derived quantity
//! (correlation, convolution, Wigner map) of one. The derived kinds are
//! modeled as explicit [`FieldExpr`] variants; the legacy wrapped display
//! strings (`Correlation1(run/intensity)` and friends) are kept as the
//! user-visible representation and can be parsed back losslessly.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reduction/extraction strategy applied to a raw record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlotMode {
    Profile,
    ProfileNorm,
    Mean,
    Max,
    Min,
    Weighted,
    TwoD,
    TwoDNorm,
    Line,
}

impl PlotMode {
    pub const ALL: [PlotMode; 9] = [
        PlotMode::Profile,
        PlotMode::ProfileNorm,
        PlotMode::Mean,
        PlotMode::Max,
        PlotMode::Min,
        PlotMode::Weighted,
        PlotMode::TwoD,
        PlotMode::TwoDNorm,
        PlotMode::Line,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PlotMode::Profile => "Profile",
            PlotMode::ProfileNorm => "Profile (norm)",
            PlotMode::Mean => "Mean",
            PlotMode::Max => "Max",
            PlotMode::Min => "Min",
            PlotMode::Weighted => "Weighted",
            PlotMode::TwoD => "2D",
            PlotMode::TwoDNorm => "2D (norm)",
            PlotMode::Line => "Line",
        }
    }
}

/// The set of modes a row's mode selector offers.
///
/// Rows created for map-valued transforms only offer `2D`; everything else
/// gets the full list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ModeSet {
    #[default]
    Full,
    ImageOnly,
}

impl ModeSet {
    pub fn options(self) -> &'static [PlotMode] {
        match self {
            ModeSet::Full => &PlotMode::ALL,
            ModeSet::ImageOnly => &[PlotMode::TwoD],
        }
    }

    pub fn default_mode(self) -> PlotMode {
        self.options()[0]
    }
}

/// A wrapped field expression that does not have the expected
/// `Wrapper(inner)` structure. This indicates a construction bug rather
/// than a user-data problem, so it is reported loudly instead of skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldParseError {
    #[error("malformed correlation expression {0:?}: expected Correlation<digit>(field)")]
    Correlation(String),
    #[error("malformed convolution expression {0:?}: expected Convolution(field)")]
    Convolution(String),
    #[error("malformed Wigner expression {0:?}: expected Wigner(field)")]
    Wigner(String),
}

/// What a row plots: a raw record path or a derived quantity of one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldExpr {
    /// Plain record path, e.g. `run1.out.h5/Field/power`.
    Raw(String),
    /// Field cross-correlation of first or second order.
    Correlation { inner: String, order: u8 },
    /// Autocorrelation-style convolution.
    Convolution { inner: String },
    /// Joint time-frequency map.
    Wigner { inner: String },
}

impl FieldExpr {
    /// The user-visible field text. Wrapped kinds keep the legacy
    /// `Wrapper(inner)` shape so saved sessions stay readable.
    pub fn display(&self) -> String {
        match self {
            FieldExpr::Raw(path) => path.clone(),
            FieldExpr::Correlation { inner, order } => format!("Correlation{order}({inner})"),
            FieldExpr::Convolution { inner } => format!("Convolution({inner})"),
            FieldExpr::Wigner { inner } => format!("Wigner({inner})"),
        }
    }

    /// Parse a display string back into its variant.
    ///
    /// Any text mentioning a wrapper keyword must have the full wrapped
    /// shape; everything else is a raw record path.
    pub fn parse(text: &str) -> Result<FieldExpr, FieldParseError> {
        if text.contains("Correlation") {
            let rest = text
                .strip_prefix("Correlation")
                .ok_or_else(|| FieldParseError::Correlation(text.to_string()))?;
            let mut chars = rest.chars();
            let order = chars
                .next()
                .and_then(|c| c.to_digit(10))
                .ok_or_else(|| FieldParseError::Correlation(text.to_string()))? as u8;
            let inner = chars
                .as_str()
                .strip_prefix('(')
                .and_then(|s| s.strip_suffix(')'))
                .filter(|s| !s.is_empty())
                .ok_or_else(|| FieldParseError::Correlation(text.to_string()))?;
            return Ok(FieldExpr::Correlation {
                inner: inner.to_string(),
                order,
            });
        }
        if text.contains("Convolution") {
            let inner = text
                .strip_prefix("Convolution(")
                .and_then(|s| s.strip_suffix(')'))
                .filter(|s| !s.is_empty())
                .ok_or_else(|| FieldParseError::Convolution(text.to_string()))?;
            return Ok(FieldExpr::Convolution {
                inner: inner.to_string(),
            });
        }
        if text.contains("Wigner") {
            let inner = text
                .strip_prefix("Wigner(")
                .and_then(|s| s.strip_suffix(')'))
                .filter(|s| !s.is_empty())
                .ok_or_else(|| FieldParseError::Wigner(text.to_string()))?;
            return Ok(FieldExpr::Wigner {
                inner: inner.to_string(),
            });
        }
        Ok(FieldExpr::Raw(text.to_string()))
    }

    /// Mode options a row with this expression should offer.
    pub fn mode_set(&self) -> ModeSet {
        match self {
            FieldExpr::Wigner { .. } => ModeSet::ImageOnly,
            _ => ModeSet::Full,
        }
    }
}
