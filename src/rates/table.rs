//! Rate table types - versioned, season-dependent, price-banded fee schedules

use serde::{Deserialize, Serialize};

use crate::core::tier::SizeTier;
use crate::rates::error::RateError;

/// Product handling class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum ProductType {
    #[default]
    Normal,
    Apparel,
    Dangerous,
}

impl ProductType {
    pub fn all() -> &'static [ProductType] {
        &[ProductType::Normal, ProductType::Apparel, ProductType::Dangerous]
    }

    /// Weight step (oz) used when extrapolating past the last breakpoint
    pub fn step_oz(&self) -> f64 {
        match self {
            ProductType::Normal | ProductType::Dangerous => 4.0,
            ProductType::Apparel => 8.0,
        }
    }
}

impl std::fmt::Display for ProductType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProductType::Normal => write!(f, "normal"),
            ProductType::Apparel => write!(f, "apparel"),
            ProductType::Dangerous => write!(f, "dangerous"),
        }
    }
}

impl std::str::FromStr for ProductType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "normal" | "standard" => Ok(ProductType::Normal),
            "apparel" => Ok(ProductType::Apparel),
            "dangerous" | "hazmat" => Ok(ProductType::Dangerous),
            _ => Err(format!(
                "Invalid product type: {}. Use normal, apparel, or dangerous",
                s
            )),
        }
    }
}

/// Fee season
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum Season {
    #[default]
    NonPeak,
    Peak,
}

impl Season {
    /// Peak runs from October 15 through January 14
    pub fn for_date(date: chrono::NaiveDate) -> Self {
        use chrono::Datelike;
        match (date.month(), date.day()) {
            (10, d) if d >= 15 => Season::Peak,
            (11, _) | (12, _) => Season::Peak,
            (1, d) if d <= 14 => Season::Peak,
            _ => Season::NonPeak,
        }
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Season::NonPeak => write!(f, "non_peak"),
            Season::Peak => write!(f, "peak"),
        }
    }
}

impl std::str::FromStr for Season {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "non_peak" | "nonpeak" | "off_peak" => Ok(Season::NonPeak),
            "peak" => Ok(Season::Peak),
            _ => Err(format!("Invalid season: {}. Use peak or non-peak", s)),
        }
    }
}

/// Key selecting exactly one rate table
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RateTableKey {
    pub version: String,
    pub product_type: ProductType,
    pub season: Season,
}

impl RateTableKey {
    pub fn new(version: impl Into<String>, product_type: ProductType, season: Season) -> Self {
        Self {
            version: version.into(),
            product_type,
            season,
        }
    }
}

impl std::fmt::Display for RateTableKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.version, self.product_type, self.season)
    }
}

/// Sale-price bracket selecting a fee column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PriceBand {
    #[serde(rename = "under_10")]
    Under10,
    #[serde(rename = "from_10_to_50")]
    From10To50,
    #[serde(rename = "over_50")]
    Over50,
}

impl PriceBand {
    pub fn all() -> &'static [PriceBand] {
        &[PriceBand::Under10, PriceBand::From10To50, PriceBand::Over50]
    }

    pub fn for_price(price: f64) -> Self {
        if price < 10.0 {
            PriceBand::Under10
        } else if price <= 50.0 {
            PriceBand::From10To50
        } else {
            PriceBand::Over50
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PriceBand::Under10 => "<$10",
            PriceBand::From10To50 => "$10-$50",
            PriceBand::Over50 => ">$50",
        }
    }
}

impl std::fmt::Display for PriceBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PriceBand::Under10 => write!(f, "under_10"),
            PriceBand::From10To50 => write!(f, "from_10_to_50"),
            PriceBand::Over50 => write!(f, "over_50"),
        }
    }
}

/// One value per price band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandValues<T> {
    pub under_10: T,
    pub from_10_to_50: T,
    pub over_50: T,
}

impl<T> BandValues<T> {
    pub fn get(&self, band: PriceBand) -> &T {
        match band {
            PriceBand::Under10 => &self.under_10,
            PriceBand::From10To50 => &self.from_10_to_50,
            PriceBand::Over50 => &self.over_50,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (PriceBand, &T)> {
        PriceBand::all().iter().map(move |b| (*b, self.get(*b)))
    }
}

/// Fee formula beyond the last tabulated breakpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostBreakpoint {
    pub base: BandValues<f64>,
    /// Added per weight step above the last breakpoint
    pub increment: f64,
}

/// Breakpoint table for a standard tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardTierRates {
    /// Strictly increasing weight breakpoints in ounces
    pub breakpoints_oz: Vec<f64>,

    /// Fee per breakpoint, one series per price band
    pub fees: BandValues<Vec<f64>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_breakpoint: Option<PostBreakpoint>,
}

/// Base fee plus a per-pound rate above a starting weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerPoundRate {
    pub base: BandValues<f64>,
    pub start_lb: f64,
    pub per_lb: f64,
}

impl PerPoundRate {
    /// Billable pounds above the start weight, rounded up
    pub fn billable_lb(&self, weight_lb: f64) -> f64 {
        (weight_lb - self.start_lb).max(0.0).ceil()
    }

    pub fn fee(&self, band: PriceBand, weight_lb: f64) -> f64 {
        self.base.get(band) + self.billable_lb(weight_lb) * self.per_lb
    }
}

/// Weight band within the super oversize tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuperOversizeBand {
    /// Inclusive upper weight, `None` for the open-ended last band
    #[serde(default)]
    pub max_lb: Option<f64>,

    #[serde(flatten)]
    pub rate: PerPoundRate,
}

/// Complete fee schedule for one (version, product type, season)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    /// Flat surcharge for lithium batteries in non-dangerous products
    #[serde(default)]
    pub lithium_battery_surcharge: f64,

    pub small_standard: StandardTierRates,
    pub large_standard: StandardTierRates,
    pub small_oversize: PerPoundRate,
    pub large_oversize: PerPoundRate,
    pub super_oversize: Vec<SuperOversizeBand>,
}

impl RateTable {
    /// Breakpoint table for a standard tier
    pub fn standard(&self, tier: SizeTier) -> Option<&StandardTierRates> {
        match tier {
            SizeTier::SmallStandard => Some(&self.small_standard),
            SizeTier::LargeStandard => Some(&self.large_standard),
            _ => None,
        }
    }

    /// Super oversize band covering a weight
    pub fn super_oversize_band(&self, weight_lb: f64) -> Option<&SuperOversizeBand> {
        self.super_oversize
            .iter()
            .find(|b| b.max_lb.map_or(true, |max| weight_lb <= max))
    }

    /// Check every data invariant of the table
    pub fn validate(&self, key: &RateTableKey) -> Result<(), RateError> {
        let key_str = key.to_string();
        if !is_amount(self.lithium_battery_surcharge) {
            return Err(RateError::InvalidAmount {
                key: key_str,
                field: "lithium_battery_surcharge".to_string(),
                value: self.lithium_battery_surcharge,
            });
        }
        validate_standard(&key_str, SizeTier::SmallStandard, &self.small_standard)?;
        validate_standard(&key_str, SizeTier::LargeStandard, &self.large_standard)?;
        validate_per_pound(&key_str, "small_oversize", &self.small_oversize)?;
        validate_per_pound(&key_str, "large_oversize", &self.large_oversize)?;
        validate_super_oversize(&key_str, &self.super_oversize)
    }
}

/// Slack for float noise when comparing fees computed from cent amounts
const FEE_TOLERANCE: f64 = 1e-9;

fn is_amount(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

fn validate_standard(key: &str, tier: SizeTier, rates: &StandardTierRates) -> Result<(), RateError> {
    if rates.breakpoints_oz.is_empty() {
        return Err(RateError::EmptyBreakpoints {
            key: key.to_string(),
            tier,
        });
    }
    if let Some(bad) = rates.breakpoints_oz.iter().find(|bp| !is_amount(**bp)) {
        return Err(RateError::InvalidAmount {
            key: key.to_string(),
            field: format!("{}.breakpoints_oz", tier),
            value: *bad,
        });
    }
    for pair in rates.breakpoints_oz.windows(2) {
        if !(pair[1] > pair[0]) {
            return Err(RateError::NonMonotonicBreakpoints {
                key: key.to_string(),
                tier,
                prev: pair[0],
                next: pair[1],
            });
        }
    }

    for (band, fees) in rates.fees.iter() {
        if fees.len() != rates.breakpoints_oz.len() {
            return Err(RateError::IncompleteBand {
                key: key.to_string(),
                tier,
                band,
                found: fees.len(),
                expected: rates.breakpoints_oz.len(),
            });
        }
        if let Some(bad) = fees.iter().find(|f| !is_amount(**f)) {
            return Err(RateError::InvalidAmount {
                key: key.to_string(),
                field: format!("{}.fees.{}", tier, band),
                value: *bad,
            });
        }
        for (i, pair) in fees.windows(2).enumerate() {
            if pair[1] < pair[0] {
                return Err(RateError::DecreasingFee {
                    key: key.to_string(),
                    tier,
                    band,
                    breakpoint_oz: rates.breakpoints_oz[i + 1],
                });
            }
        }
    }

    if let Some(post) = &rates.post_breakpoint {
        if !is_amount(post.increment) {
            return Err(RateError::InvalidAmount {
                key: key.to_string(),
                field: format!("{}.post_breakpoint.increment", tier),
                value: post.increment,
            });
        }
        for (band, fees) in rates.fees.iter() {
            let last = fees.last().copied().unwrap_or(0.0);
            let base = *post.base.get(band);
            if !(base >= last) {
                return Err(RateError::PostBreakpointBelowTable {
                    key: key.to_string(),
                    tier,
                    band,
                    base,
                    last,
                });
            }
        }
    }
    Ok(())
}

fn validate_per_pound(key: &str, field: &str, rate: &PerPoundRate) -> Result<(), RateError> {
    let checks = [
        ("start_lb", rate.start_lb),
        ("per_lb", rate.per_lb),
        ("base.under_10", rate.base.under_10),
        ("base.from_10_to_50", rate.base.from_10_to_50),
        ("base.over_50", rate.base.over_50),
    ];
    for (name, value) in checks {
        if !is_amount(value) {
            return Err(RateError::InvalidAmount {
                key: key.to_string(),
                field: format!("{}.{}", field, name),
                value,
            });
        }
    }
    Ok(())
}

fn validate_super_oversize(key: &str, bands: &[SuperOversizeBand]) -> Result<(), RateError> {
    let invalid = |detail: String| RateError::SuperOversizeBands {
        key: key.to_string(),
        detail,
    };
    let Some((last, init)) = bands.split_last() else {
        return Err(invalid("at least one weight band is required".to_string()));
    };
    if last.max_lb.is_some() {
        return Err(invalid("the last weight band must be unbounded".to_string()));
    }
    let mut prev = 0.0;
    for band in init {
        match band.max_lb {
            None => return Err(invalid("only the last weight band may be unbounded".to_string())),
            Some(max) if !max.is_finite() => {
                return Err(invalid(format!("weight band limit {} is not a number", max)))
            }
            Some(max) if max <= prev => {
                return Err(invalid(format!(
                    "weight bands must ascend ({} lb after {} lb)",
                    max, prev
                )))
            }
            Some(max) => prev = max,
        }
    }
    for (i, band) in bands.iter().enumerate() {
        validate_per_pound(key, &format!("super_oversize[{}]", i), &band.rate)?;
    }
    for pair in bands.windows(2) {
        let (lower, upper) = (&pair[0], &pair[1]);
        let Some(max_lb) = lower.max_lb else {
            continue;
        };
        for &price_band in PriceBand::all() {
            let fee_at_max = lower.rate.fee(price_band, max_lb);
            let next_base = *upper.rate.base.get(price_band);
            if next_base + FEE_TOLERANCE < fee_at_max {
                return Err(RateError::SuperOversizeFeeDrop {
                    key: key.to_string(),
                    band: price_band,
                    max_lb,
                    fee_at_max,
                    next_base,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn band(v: f64) -> BandValues<f64> {
        BandValues {
            under_10: v - 0.5,
            from_10_to_50: v,
            over_50: v + 0.2,
        }
    }

    fn series(v: &[f64]) -> BandValues<Vec<f64>> {
        BandValues {
            under_10: v.to_vec(),
            from_10_to_50: v.to_vec(),
            over_50: v.to_vec(),
        }
    }

    fn sample_table() -> RateTable {
        let per_lb = PerPoundRate {
            base: band(9.61),
            start_lb: 1.0,
            per_lb: 0.38,
        };
        RateTable {
            lithium_battery_surcharge: 0.11,
            small_standard: StandardTierRates {
                breakpoints_oz: vec![4.0, 8.0, 12.0, 16.0],
                fees: series(&[3.0, 3.1, 3.2, 3.3]),
                post_breakpoint: None,
            },
            large_standard: StandardTierRates {
                breakpoints_oz: vec![4.0, 8.0],
                fees: series(&[4.0, 4.5]),
                post_breakpoint: Some(PostBreakpoint {
                    base: band(5.0),
                    increment: 0.08,
                }),
            },
            small_oversize: per_lb.clone(),
            large_oversize: per_lb.clone(),
            super_oversize: vec![
                SuperOversizeBand {
                    max_lb: Some(50.0),
                    rate: per_lb.clone(),
                },
                SuperOversizeBand {
                    max_lb: None,
                    rate: PerPoundRate {
                        base: band(30.0),
                        start_lb: 51.0,
                        per_lb: 0.75,
                    },
                },
            ],
        }
    }

    fn key() -> RateTableKey {
        RateTableKey::new("test", ProductType::Normal, Season::NonPeak)
    }

    #[test]
    fn test_price_band_edges() {
        assert_eq!(PriceBand::for_price(9.99), PriceBand::Under10);
        assert_eq!(PriceBand::for_price(10.0), PriceBand::From10To50);
        assert_eq!(PriceBand::for_price(50.0), PriceBand::From10To50);
        assert_eq!(PriceBand::for_price(50.01), PriceBand::Over50);
    }

    #[test]
    fn test_season_for_date() {
        let d = |m, day| NaiveDate::from_ymd_opt(2025, m, day).unwrap();
        assert_eq!(Season::for_date(d(10, 14)), Season::NonPeak);
        assert_eq!(Season::for_date(d(10, 15)), Season::Peak);
        assert_eq!(Season::for_date(d(12, 31)), Season::Peak);
        assert_eq!(Season::for_date(d(1, 14)), Season::Peak);
        assert_eq!(Season::for_date(d(1, 15)), Season::NonPeak);
        assert_eq!(Season::for_date(d(7, 4)), Season::NonPeak);
    }

    #[test]
    fn test_key_display() {
        insta::assert_snapshot!(key().to_string(), @"test/normal/non_peak");
    }

    #[test]
    fn test_valid_table_passes() {
        assert!(sample_table().validate(&key()).is_ok());
    }

    #[test]
    fn test_non_monotonic_breakpoints_rejected() {
        let mut table = sample_table();
        table.small_standard.breakpoints_oz = vec![4.0, 8.0, 8.0, 16.0];
        assert!(matches!(
            table.validate(&key()),
            Err(RateError::NonMonotonicBreakpoints { .. })
        ));
    }

    #[test]
    fn test_incomplete_band_rejected() {
        let mut table = sample_table();
        table.large_standard.fees.over_50.pop();
        assert!(matches!(
            table.validate(&key()),
            Err(RateError::IncompleteBand {
                band: PriceBand::Over50,
                ..
            })
        ));
    }

    #[test]
    fn test_post_breakpoint_must_dominate() {
        let mut table = sample_table();
        if let Some(post) = table.large_standard.post_breakpoint.as_mut() {
            post.base.from_10_to_50 = 4.4;
        }
        assert!(matches!(
            table.validate(&key()),
            Err(RateError::PostBreakpointBelowTable { .. })
        ));
    }

    #[test]
    fn test_super_oversize_last_band_unbounded() {
        let mut table = sample_table();
        table.super_oversize[1].max_lb = Some(150.0);
        assert!(matches!(
            table.validate(&key()),
            Err(RateError::SuperOversizeBands { .. })
        ));
    }

    #[test]
    fn test_super_oversize_fee_must_not_drop_between_bands() {
        let mut table = sample_table();
        // 9.61 + 49 * 0.38 = 28.23 at 50 lb
        table.super_oversize[1].rate.base.from_10_to_50 = 28.0;
        assert!(matches!(
            table.validate(&key()),
            Err(RateError::SuperOversizeFeeDrop {
                band: PriceBand::From10To50,
                ..
            })
        ));

        table.super_oversize[1].rate.base.from_10_to_50 = 28.23;
        assert!(table.validate(&key()).is_ok());
    }

    #[test]
    fn test_nan_weight_band_limit_rejected() {
        let mut table = sample_table();
        table.super_oversize[0].max_lb = Some(f64::NAN);
        assert!(matches!(
            table.validate(&key()),
            Err(RateError::SuperOversizeBands { .. })
        ));
    }

    #[test]
    fn test_nan_breakpoint_rejected() {
        let mut table = sample_table();
        table.small_standard.breakpoints_oz[2] = f64::NAN;
        assert!(matches!(
            table.validate(&key()),
            Err(RateError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn test_single_negative_breakpoint_rejected() {
        let mut table = sample_table();
        table.large_standard.breakpoints_oz = vec![-4.0];
        table.large_standard.fees = series(&[4.0]);
        assert!(matches!(
            table.validate(&key()),
            Err(RateError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn test_per_pound_billable_weight() {
        let rate = PerPoundRate {
            base: band(9.61),
            start_lb: 1.0,
            per_lb: 0.38,
        };
        assert_eq!(rate.billable_lb(0.5), 0.0);
        assert_eq!(rate.billable_lb(1.0), 0.0);
        assert_eq!(rate.billable_lb(1.2), 1.0);
        assert_eq!(rate.billable_lb(40.0), 39.0);
    }

    #[test]
    fn test_super_oversize_band_lookup() {
        let table = sample_table();
        assert_eq!(table.super_oversize_band(50.0).and_then(|b| b.max_lb), Some(50.0));
        assert_eq!(table.super_oversize_band(51.0).and_then(|b| b.max_lb), None);
    }
}
