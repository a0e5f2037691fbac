//! Dimensional tier classification
//!
//! Classification runs in two passes. The provisional tier (actual weight only)
//! decides whether volumetric weight applies; the final tier is computed again
//! with the resulting shipping weight, since a light but bulky package can
//! cross a tier boundary once its dimensional weight is counted.

use serde::{Deserialize, Serialize};

use crate::core::units::{NormalizedPackage, OUNCES_PER_POUND};

/// Divisor converting cubic inches to volumetric pounds
pub const DIM_DIVISOR: f64 = 139.0;

/// Minimum width/height used for volumetric weight
pub const MIN_VOLUMETRIC_SIDE_IN: f64 = 2.0;

/// Super oversize packages at or above this actual weight never use volumetric weight
pub const SUPER_OVERSIZE_ACTUAL_WEIGHT_OZ: f64 = 150.0 * OUNCES_PER_POUND;

/// Carrier size tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeTier {
    SmallStandard,
    LargeStandard,
    SmallOversize,
    LargeOversize,
    SuperOversize,
}

impl SizeTier {
    pub fn all() -> &'static [SizeTier] {
        &[
            SizeTier::SmallStandard,
            SizeTier::LargeStandard,
            SizeTier::SmallOversize,
            SizeTier::LargeOversize,
            SizeTier::SuperOversize,
        ]
    }

    /// Standard tiers are priced from tabulated weight breakpoints
    pub fn is_standard(&self) -> bool {
        matches!(self, SizeTier::SmallStandard | SizeTier::LargeStandard)
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            SizeTier::SmallStandard => "Small Standard",
            SizeTier::LargeStandard => "Large Standard",
            SizeTier::SmallOversize => "Small Oversize",
            SizeTier::LargeOversize => "Large Oversize",
            SizeTier::SuperOversize => "Super Oversize",
        }
    }
}

impl std::fmt::Display for SizeTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SizeTier::SmallStandard => write!(f, "small_standard"),
            SizeTier::LargeStandard => write!(f, "large_standard"),
            SizeTier::SmallOversize => write!(f, "small_oversize"),
            SizeTier::LargeOversize => write!(f, "large_oversize"),
            SizeTier::SuperOversize => write!(f, "super_oversize"),
        }
    }
}

/// Result of classifying a package
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Final tier, computed with the shipping weight
    pub tier: SizeTier,

    /// Tier from actual weight alone
    pub provisional_tier: SizeTier,

    /// Weight used for fee lookup
    pub shipping_weight_oz: f64,

    /// Dimensional weight in pounds (sides clamped to the 2 in minimum)
    pub volumetric_weight_lb: f64,
}

impl Classification {
    pub fn shipping_weight_lb(&self) -> f64 {
        self.shipping_weight_oz / OUNCES_PER_POUND
    }

    /// True when volumetric weight replaced the actual weight
    pub fn used_volumetric(&self, actual_weight_oz: f64) -> bool {
        self.shipping_weight_oz > actual_weight_oz
    }
}

/// Longest side plus twice the other two sides
pub fn girth_sum(dims: &NormalizedPackage) -> f64 {
    let [l, w, h] = dims.sorted_dims();
    l + 2.0 * w + 2.0 * h
}

/// Dimensional weight in pounds
pub fn volumetric_weight_lb(dims: &NormalizedPackage) -> f64 {
    let [l, w, h] = dims.sorted_dims();
    let w = w.max(MIN_VOLUMETRIC_SIDE_IN);
    let h = h.max(MIN_VOLUMETRIC_SIDE_IN);
    l * w * h / DIM_DIVISOR
}

/// Tier predicate for a package at a given weight. First match wins.
pub fn tier_for(dims: &NormalizedPackage, weight_oz: f64) -> SizeTier {
    let [longest, middle, shortest] = dims.sorted_dims();
    let girth = longest + 2.0 * middle + 2.0 * shortest;
    let weight_lb = weight_oz / OUNCES_PER_POUND;

    if weight_oz <= 16.0 && longest <= 15.0 && middle <= 12.0 && shortest <= 0.75 {
        SizeTier::SmallStandard
    } else if weight_oz <= 320.0 && longest <= 18.0 && middle <= 14.0 && shortest <= 8.0 {
        SizeTier::LargeStandard
    } else if weight_lb > 150.0 || longest > 108.0 || girth > 165.0 {
        SizeTier::SuperOversize
    } else if weight_lb <= 70.0 && longest <= 60.0 && middle <= 30.0 && girth <= 130.0 {
        SizeTier::SmallOversize
    } else if weight_lb <= 50.0 && longest <= 108.0 && girth <= 165.0 {
        SizeTier::LargeOversize
    } else {
        SizeTier::SuperOversize
    }
}

/// Classify a normalized package into its final tier and shipping weight
pub fn classify(dims: &NormalizedPackage) -> Classification {
    let actual = dims.weight_oz;
    let provisional_tier = tier_for(dims, actual);
    let volumetric_weight_lb = volumetric_weight_lb(dims);

    let actual_only = provisional_tier == SizeTier::SmallStandard
        || (provisional_tier == SizeTier::SuperOversize
            && actual >= SUPER_OVERSIZE_ACTUAL_WEIGHT_OZ);

    let shipping_weight_oz = if actual_only {
        actual
    } else {
        actual.max(volumetric_weight_lb * OUNCES_PER_POUND)
    };

    let tier = tier_for(dims, shipping_weight_oz);

    tracing::debug!(
        %provisional_tier,
        %tier,
        actual_oz = actual,
        volumetric_lb = volumetric_weight_lb,
        shipping_oz = shipping_weight_oz,
        "classified package"
    );

    Classification {
        tier,
        provisional_tier,
        shipping_weight_oz,
        volumetric_weight_lb,
    }
}
