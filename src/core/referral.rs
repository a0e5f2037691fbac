//! Referral fee resolution
//!
//! Five rule shapes cover the category schedule. `ThresholdMulti` charges the
//! matched bracket's rate on the whole price; `Tiered` and `TieredMulti` are
//! progressive and charge each bracket only on its slice of the price.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::units::sanitize;

/// Flat-rate bracket: the rate applies to the full price when `price <= max`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateCeiling {
    /// Upper bound, `None` for the open-ended last bracket
    #[serde(default)]
    pub max: Option<f64>,
    pub rate: f64,
}

/// Progressive bracket: the rate applies to the portion of price up to `limit`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateBracket {
    /// Upper bound, `None` for the open-ended last bracket
    #[serde(default)]
    pub limit: Option<f64>,
    pub rate: f64,
}

/// Referral fee rule for a product category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReferralRule {
    Flat {
        rate: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
    },
    Threshold {
        threshold: f64,
        low_rate: f64,
        high_rate: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
    },
    ThresholdMulti {
        ranges: Vec<RateCeiling>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
    },
    Tiered {
        threshold: f64,
        rate1: f64,
        rate2: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
    },
    TieredMulti {
        ranges: Vec<RateBracket>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
    },
}

impl ReferralRule {
    /// Per-item minimum fee, if any
    pub fn min(&self) -> Option<f64> {
        match self {
            ReferralRule::Flat { min, .. }
            | ReferralRule::Threshold { min, .. }
            | ReferralRule::ThresholdMulti { min, .. }
            | ReferralRule::Tiered { min, .. }
            | ReferralRule::TieredMulti { min, .. } => *min,
        }
    }

    /// Short name of the rule shape
    pub fn kind(&self) -> &'static str {
        match self {
            ReferralRule::Flat { .. } => "flat",
            ReferralRule::Threshold { .. } => "threshold",
            ReferralRule::ThresholdMulti { .. } => "threshold_multi",
            ReferralRule::Tiered { .. } => "tiered",
            ReferralRule::TieredMulti { .. } => "tiered_multi",
        }
    }

    /// One-line description of the schedule
    pub fn describe(&self) -> String {
        let pct = |r: &f64| format!("{:.0}%", r * 100.0);
        let bound = |b: &Option<f64>| match b {
            Some(v) => format!("${:.2}", v),
            None => "above".to_string(),
        };
        let body = match self {
            ReferralRule::Flat { rate, .. } => pct(rate),
            ReferralRule::Threshold {
                threshold,
                low_rate,
                high_rate,
                ..
            } => format!(
                "{} up to ${:.2}, {} above",
                pct(low_rate),
                threshold,
                pct(high_rate)
            ),
            ReferralRule::ThresholdMulti { ranges, .. } => ranges
                .iter()
                .map(|r| format!("{} to {}", pct(&r.rate), bound(&r.max)))
                .collect::<Vec<_>>()
                .join(", "),
            ReferralRule::Tiered {
                threshold,
                rate1,
                rate2,
                ..
            } => format!(
                "{} of first ${:.2}, {} of remainder",
                pct(rate1),
                threshold,
                pct(rate2)
            ),
            ReferralRule::TieredMulti { ranges, .. } => ranges
                .iter()
                .map(|r| format!("{} of portion to {}", pct(&r.rate), bound(&r.limit)))
                .collect::<Vec<_>>()
                .join(", "),
        };
        match self.min() {
            Some(min) => format!("{} (min ${:.2})", body, min),
            None => body,
        }
    }

    /// Check the rule's data invariants
    pub fn validate(&self) -> Result<(), RuleError> {
        if let Some(min) = self.min() {
            check_amount("min", min)?;
        }
        match self {
            ReferralRule::Flat { rate, .. } => check_amount("rate", *rate),
            ReferralRule::Threshold {
                threshold,
                low_rate,
                high_rate,
                ..
            } => {
                check_amount("threshold", *threshold)?;
                check_amount("low_rate", *low_rate)?;
                check_amount("high_rate", *high_rate)
            }
            ReferralRule::Tiered {
                threshold,
                rate1,
                rate2,
                ..
            } => {
                check_amount("threshold", *threshold)?;
                check_amount("rate1", *rate1)?;
                check_amount("rate2", *rate2)
            }
            ReferralRule::ThresholdMulti { ranges, .. } => {
                for r in ranges {
                    check_amount("rate", r.rate)?;
                }
                check_bounds(ranges.iter().map(|r| r.max).collect())
            }
            ReferralRule::TieredMulti { ranges, .. } => {
                for r in ranges {
                    check_amount("rate", r.rate)?;
                }
                check_bounds(ranges.iter().map(|r| r.limit).collect())
            }
        }
    }
}

/// Why a referral rule is malformed
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuleError {
    #[error("{field} must be a non-negative number, got {value}")]
    InvalidAmount { field: &'static str, value: f64 },

    #[error("ranges must not be empty")]
    EmptyRanges,

    #[error("the last range must be unbounded (null)")]
    BoundedLastRange,

    #[error("only the last range may be unbounded")]
    UnboundedInnerRange,

    #[error("range bounds must be strictly ascending ({bound} after {prev})")]
    UnsortedRanges { bound: f64, prev: f64 },
}

fn check_amount(field: &'static str, value: f64) -> Result<(), RuleError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(RuleError::InvalidAmount { field, value })
    }
}

/// Bounds must be finite and strictly ascending with only the last one open-ended
fn check_bounds(bounds: Vec<Option<f64>>) -> Result<(), RuleError> {
    let Some((last, init)) = bounds.split_last() else {
        return Err(RuleError::EmptyRanges);
    };
    if last.is_some() {
        return Err(RuleError::BoundedLastRange);
    }
    let mut prev = 0.0;
    for bound in init {
        let Some(b) = *bound else {
            return Err(RuleError::UnboundedInnerRange);
        };
        check_amount("range bound", b)?;
        if b <= prev {
            return Err(RuleError::UnsortedRanges { bound: b, prev });
        }
        prev = b;
    }
    Ok(())
}

fn flat(price: f64, rate: f64) -> f64 {
    price * rate
}

fn threshold(price: f64, threshold: f64, low_rate: f64, high_rate: f64) -> f64 {
    let rate = if price <= threshold { low_rate } else { high_rate };
    price * rate
}

fn threshold_multi(price: f64, ranges: &[RateCeiling]) -> f64 {
    ranges
        .iter()
        .find(|r| r.max.map_or(true, |max| price <= max))
        .map(|r| price * r.rate)
        .unwrap_or(0.0)
}

fn tiered(price: f64, threshold: f64, rate1: f64, rate2: f64) -> f64 {
    if price <= threshold {
        price * rate1
    } else {
        threshold * rate1 + (price - threshold) * rate2
    }
}

fn tiered_multi(price: f64, ranges: &[RateBracket]) -> f64 {
    let mut fee = 0.0;
    let mut floor = 0.0;
    for bracket in ranges {
        let ceiling = bracket.limit.unwrap_or(f64::INFINITY);
        if price > floor {
            fee += (price.min(ceiling) - floor) * bracket.rate;
        }
        if price <= ceiling {
            break;
        }
        floor = ceiling;
    }
    fee
}

/// Referral fee for a sale price under a rule, floored at the rule's minimum
pub fn resolve_referral(price: f64, rule: &ReferralRule) -> f64 {
    let price = sanitize(price);
    let fee = match rule {
        ReferralRule::Flat { rate, .. } => flat(price, *rate),
        ReferralRule::Threshold {
            threshold: t,
            low_rate,
            high_rate,
            ..
        } => threshold(price, *t, *low_rate, *high_rate),
        ReferralRule::ThresholdMulti { ranges, .. } => threshold_multi(price, ranges),
        ReferralRule::Tiered {
            threshold: t,
            rate1,
            rate2,
            ..
        } => tiered(price, *t, *rate1, *rate2),
        ReferralRule::TieredMulti { ranges, .. } => tiered_multi(price, ranges),
    };
    match rule.min() {
        Some(min) => fee.max(min),
        None => fee,
    }
}
