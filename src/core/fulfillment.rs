//! Fulfillment fee resolution
//!
//! Standard tiers read tabulated breakpoints and fall back to a per-step
//! formula past the last one. Oversize tiers charge a base plus a per-pound
//! rate. Super oversize first picks a weight band, then does the same.

use serde::{Deserialize, Serialize};

use crate::core::resolved::{Resolved, Unresolved};
use crate::core::tier::{Classification, SizeTier};
use crate::core::units::{sanitize, OUNCES_PER_POUND};
use crate::rates::{PriceBand, RateRegistry, RateTable, RateTableKey, StandardTierRates};

/// Longest side above which super oversize packages draw an extra carrier surcharge
pub const ADVISORY_LONGEST_SIDE_IN: f64 = 96.0;

/// Girth-sum above which super oversize packages draw an extra carrier surcharge
pub const ADVISORY_GIRTH_SUM_IN: f64 = 130.0;

/// Caller-supplied surcharge inputs
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Surcharges {
    /// Product contains lithium batteries
    #[serde(default)]
    pub lithium_battery: bool,

    /// Ad-hoc oversize surcharge added verbatim
    #[serde(default)]
    pub oversize: f64,
}

/// How the base fee was derived
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeeBasis {
    /// Read from a tabulated breakpoint
    Tabulated { breakpoint_oz: f64 },
    /// Extrapolated past the last breakpoint
    Extrapolated { last_breakpoint_oz: f64, steps: f64 },
    /// Base plus a per-pound rate
    PerPound { billable_lb: f64, per_lb: f64 },
}

/// Resolved fulfillment fee with its components
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FulfillmentFee {
    pub band: PriceBand,
    pub basis: FeeBasis,
    pub base: f64,
    pub lithium_surcharge: f64,
    pub oversize_surcharge: f64,
    pub total: f64,
}

/// Non-fee warnings raised while resolving
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advisory {
    /// Carrier likely adds an oversize surcharge this engine does not price
    AdditionalOversizeSurcharge { longest_in: f64, girth_sum_in: f64 },
    /// Lithium flag ignored because dangerous-goods tables already include it
    LithiumIncludedInDangerous,
}

impl std::fmt::Display for Advisory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Advisory::AdditionalOversizeSurcharge {
                longest_in,
                girth_sum_in,
            } => write!(
                f,
                "super oversize package (longest {:.1} in, girth-sum {:.1} in) may incur an additional carrier oversize surcharge not included in the fee",
                longest_in, girth_sum_in
            ),
            Advisory::LithiumIncludedInDangerous => write!(
                f,
                "lithium battery surcharge not applied: dangerous goods rates already cover it"
            ),
        }
    }
}

/// Base fee for a standard tier from its breakpoint table
fn standard_fee(
    rates: &StandardTierRates,
    tier: SizeTier,
    band: PriceBand,
    weight_oz: f64,
    step_oz: f64,
) -> Result<(f64, FeeBasis), Unresolved> {
    let fees = rates.fees.get(band);
    if let Some((i, bp)) = rates
        .breakpoints_oz
        .iter()
        .enumerate()
        .find(|(_, bp)| **bp >= weight_oz)
    {
        let fee = fees.get(i).copied().ok_or(Unresolved::MissingFee {
            tier,
            band,
            breakpoint_oz: *bp,
        })?;
        return Ok((fee, FeeBasis::Tabulated { breakpoint_oz: *bp }));
    }

    let beyond = Unresolved::WeightBeyondTable { tier, weight_oz };
    let post = rates.post_breakpoint.as_ref().ok_or_else(|| beyond.clone())?;
    let last = rates.breakpoints_oz.last().copied().ok_or(beyond)?;
    let steps = ((weight_oz - last) / step_oz).ceil();
    Ok((
        post.base.get(band) + steps * post.increment,
        FeeBasis::Extrapolated {
            last_breakpoint_oz: last,
            steps,
        },
    ))
}

/// Base fee for a tier and shipping weight under one table
pub fn base_fee(
    table: &RateTable,
    key: &RateTableKey,
    tier: SizeTier,
    shipping_weight_oz: f64,
    band: PriceBand,
) -> Result<(f64, FeeBasis), Unresolved> {
    let weight_lb = shipping_weight_oz / OUNCES_PER_POUND;
    let per_pound = |rate: &crate::rates::PerPoundRate| {
        (
            rate.fee(band, weight_lb),
            FeeBasis::PerPound {
                billable_lb: rate.billable_lb(weight_lb),
                per_lb: rate.per_lb,
            },
        )
    };

    match tier {
        SizeTier::SmallStandard => standard_fee(
            &table.small_standard,
            tier,
            band,
            shipping_weight_oz,
            key.product_type.step_oz(),
        ),
        SizeTier::LargeStandard => standard_fee(
            &table.large_standard,
            tier,
            band,
            shipping_weight_oz,
            key.product_type.step_oz(),
        ),
        SizeTier::SmallOversize => Ok(per_pound(&table.small_oversize)),
        SizeTier::LargeOversize => Ok(per_pound(&table.large_oversize)),
        SizeTier::SuperOversize => table
            .super_oversize_band(weight_lb)
            .map(|b| per_pound(&b.rate))
            .ok_or(Unresolved::WeightBeyondTable {
                tier,
                weight_oz: shipping_weight_oz,
            }),
    }
}

/// Resolve the fulfillment fee including surcharges
pub fn resolve_fee(
    registry: &RateRegistry,
    tier: SizeTier,
    shipping_weight_oz: f64,
    price: f64,
    key: &RateTableKey,
    surcharges: &Surcharges,
) -> Resolved<FulfillmentFee> {
    let band = PriceBand::for_price(sanitize(price));
    let Some(table) = registry.get(key) else {
        tracing::debug!(%key, "no rate table registered");
        return Resolved::Unresolved(Unresolved::MissingTable {
            key: key.to_string(),
        });
    };

    let (base, basis) = match base_fee(table, key, tier, shipping_weight_oz, band) {
        Ok(found) => found,
        Err(reason) => {
            tracing::debug!(%key, %tier, %reason, "fulfillment fee unresolved");
            return Resolved::Unresolved(reason);
        }
    };

    let lithium_surcharge = if surcharges.lithium_battery
        && key.product_type != crate::rates::ProductType::Dangerous
    {
        table.lithium_battery_surcharge
    } else {
        0.0
    };
    let oversize_surcharge = sanitize(surcharges.oversize);

    tracing::debug!(%key, %tier, %band, base, ?basis, "resolved fulfillment fee");

    Resolved::Value(FulfillmentFee {
        band,
        basis,
        base,
        lithium_surcharge,
        oversize_surcharge,
        total: base + lithium_surcharge + oversize_surcharge,
    })
}

/// Warnings that accompany a fee but never change it
pub fn advisories(
    classification: &Classification,
    longest_in: f64,
    girth_sum_in: f64,
    key: &RateTableKey,
    surcharges: &Surcharges,
) -> Vec<Advisory> {
    let mut out = Vec::new();
    if classification.tier == SizeTier::SuperOversize
        && (longest_in > ADVISORY_LONGEST_SIDE_IN || girth_sum_in > ADVISORY_GIRTH_SUM_IN)
    {
        out.push(Advisory::AdditionalOversizeSurcharge {
            longest_in,
            girth_sum_in,
        });
    }
    if surcharges.lithium_battery && key.product_type == crate::rates::ProductType::Dangerous {
        out.push(Advisory::LithiumIncludedInDangerous);
    }
    out
}
