//! Resolved values - amounts that may be missing because of configuration gaps
//!
//! A fee that cannot be looked up is not zero. `Resolved::Unresolved` carries
//! the reason and renders as "N/A"; anything computed from it stays unresolved.

use serde::{Deserialize, Serialize};

use crate::core::tier::SizeTier;
use crate::rates::PriceBand;

/// Why a value could not be resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Unresolved {
    /// No rate table registered for the key
    MissingTable { key: String },
    /// Weight beyond the last breakpoint and the tier has no extrapolation rule
    WeightBeyondTable { tier: SizeTier, weight_oz: f64 },
    /// Tabulated fee missing for a breakpoint
    MissingFee {
        tier: SizeTier,
        band: PriceBand,
        breakpoint_oz: f64,
    },
    /// Referral category not present in the catalogue
    UnknownCategory { category: String },
    /// An upstream value was unresolved
    Upstream { field: String },
}

impl std::fmt::Display for Unresolved {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Unresolved::MissingTable { key } => write!(f, "no rate table for {}", key),
            Unresolved::WeightBeyondTable { tier, weight_oz } => write!(
                f,
                "{:.2} oz is beyond the {} table and no extrapolation applies",
                weight_oz,
                tier.label()
            ),
            Unresolved::MissingFee {
                tier,
                band,
                breakpoint_oz,
            } => write!(
                f,
                "no {} fee at the {} oz {} breakpoint",
                band,
                breakpoint_oz,
                tier.label()
            ),
            Unresolved::UnknownCategory { category } => {
                write!(f, "unknown referral category '{}'", category)
            }
            Unresolved::Upstream { field } => write!(f, "{} is unresolved", field),
        }
    }
}

/// A value or the reason it is missing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolved<T> {
    Value(T),
    Unresolved(Unresolved),
}

impl<T> Resolved<T> {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolved::Value(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Resolved::Value(v) => Some(v),
            Resolved::Unresolved(_) => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Resolved::Value(v) => Some(v),
            Resolved::Unresolved(_) => None,
        }
    }

    pub fn reason(&self) -> Option<&Unresolved> {
        match self {
            Resolved::Value(_) => None,
            Resolved::Unresolved(r) => Some(r),
        }
    }

    pub fn as_ref(&self) -> Resolved<&T> {
        match self {
            Resolved::Value(v) => Resolved::Value(v),
            Resolved::Unresolved(r) => Resolved::Unresolved(r.clone()),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Resolved<U> {
        match self {
            Resolved::Value(v) => Resolved::Value(f(v)),
            Resolved::Unresolved(r) => Resolved::Unresolved(r),
        }
    }

    pub fn and_then<U>(self, f: impl FnOnce(T) -> Resolved<U>) -> Resolved<U> {
        match self {
            Resolved::Value(v) => f(v),
            Resolved::Unresolved(r) => Resolved::Unresolved(r),
        }
    }
}

impl<T> From<Result<T, Unresolved>> for Resolved<T> {
    fn from(result: Result<T, Unresolved>) -> Self {
        match result {
            Ok(v) => Resolved::Value(v),
            Err(r) => Resolved::Unresolved(r),
        }
    }
}

/// Format a USD amount, or "N/A" when unresolved
pub fn format_usd(value: Option<f64>) -> String {
    match value {
        Some(v) if v < 0.0 => format!("-${:.2}", -v),
        Some(v) => format!("${:.2}", v),
        None => "N/A".to_string(),
    }
}

/// Format a ratio as a percentage, or "N/A" when unresolved
pub fn format_pct(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}%", v * 100.0),
        None => "N/A".to_string(),
    }
}
