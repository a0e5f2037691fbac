//! Calculation pipeline
//!
//! `Engine::calculate` runs every stage from unit normalization to profit
//! aggregation. It is pure: the same input always yields the same result and
//! nothing is cached between runs.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::fulfillment::{advisories, resolve_fee, Advisory, FulfillmentFee, Surcharges};
use crate::core::profit::{aggregate, CostInputs, ProfitBreakdown};
use crate::core::referral::resolve_referral;
use crate::core::resolved::{Resolved, Unresolved};
use crate::core::tier::{classify, girth_sum, Classification};
use crate::core::units::{normalize, sanitize, NormalizedPackage, PackageSpec};
use crate::rates::{
    PriceBand, ProductType, RateError, RateRegistry, RateTableKey, ReferralCatalogue, Season,
    DEFAULT_CATEGORY,
};

/// Default rate schedule version
pub const DEFAULT_RATE_VERSION: &str = "2025";

fn default_version() -> String {
    DEFAULT_RATE_VERSION.to_string()
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

/// Everything a calculation needs, owned by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationInput {
    pub package: PackageSpec,

    /// Selling price in USD
    pub price: f64,

    #[serde(default = "default_version")]
    pub rate_version: String,

    #[serde(default)]
    pub product_type: ProductType,

    #[serde(default)]
    pub season: Season,

    /// Referral category key
    #[serde(default = "default_category")]
    pub category: String,

    #[serde(default)]
    pub surcharges: Surcharges,

    #[serde(default)]
    pub costs: CostInputs,
}

impl CalculationInput {
    /// Input with default key, category and costs
    pub fn new(package: PackageSpec, price: f64) -> Self {
        Self {
            package,
            price,
            rate_version: default_version(),
            product_type: ProductType::default(),
            season: Season::default(),
            category: default_category(),
            surcharges: Surcharges::default(),
            costs: CostInputs::default(),
        }
    }

    /// Rate table key this input selects
    pub fn rate_key(&self) -> RateTableKey {
        RateTableKey::new(self.rate_version.clone(), self.product_type, self.season)
    }
}

/// Output of one full pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub normalized: NormalizedPackage,
    pub classification: Classification,
    pub girth_sum_in: f64,
    pub rate_key: RateTableKey,
    pub price_band: PriceBand,
    pub fulfillment: Resolved<FulfillmentFee>,
    pub referral: Resolved<f64>,
    pub profit: Resolved<ProfitBreakdown>,
    pub advisories: Vec<Advisory>,
}

impl CalculationResult {
    pub fn fulfillment_total(&self) -> Option<f64> {
        self.fulfillment.value().map(|f| f.total)
    }

    pub fn referral_fee(&self) -> Option<f64> {
        self.referral.value().copied()
    }

    /// First unresolved reason, if any stage failed to resolve
    pub fn unresolved_reason(&self) -> Option<&Unresolved> {
        self.fulfillment
            .reason()
            .or_else(|| self.referral.reason())
    }
}

/// Rate registry and referral catalogue, immutable after construction
#[derive(Debug, Clone)]
pub struct Engine {
    rates: RateRegistry,
    referral: ReferralCatalogue,
}

impl Engine {
    pub fn new(rates: RateRegistry, referral: ReferralCatalogue) -> Self {
        Self { rates, referral }
    }

    /// Engine over the data bundled with the binary
    pub fn builtin() -> Result<Self, RateError> {
        Ok(Self::new(RateRegistry::builtin()?, ReferralCatalogue::builtin()?))
    }

    /// Built-in data plus any rate files from a local directory
    pub fn with_rates_dir(rates_dir: Option<&Path>) -> Result<Self, RateError> {
        let mut engine = Self::builtin()?;
        if let Some(dir) = rates_dir {
            if dir.is_dir() {
                engine.rates.load_dir(dir)?;
            } else {
                tracing::warn!(dir = %dir.display(), "rates directory not found, using built-in tables");
            }
        }
        Ok(engine)
    }

    pub fn rates(&self) -> &RateRegistry {
        &self.rates
    }

    pub fn referral_catalogue(&self) -> &ReferralCatalogue {
        &self.referral
    }

    /// Referral fee for a category key
    pub fn referral_fee(&self, price: f64, category: &str) -> Resolved<f64> {
        match self.referral.get(category) {
            Some(found) => Resolved::Value(resolve_referral(price, &found.rule)),
            None => {
                tracing::debug!(category, "unknown referral category");
                Resolved::Unresolved(Unresolved::UnknownCategory {
                    category: category.to_string(),
                })
            }
        }
    }

    /// Run the full pipeline
    pub fn calculate(&self, input: &CalculationInput) -> CalculationResult {
        let normalized = normalize(&input.package);
        let classification = classify(&normalized);
        let girth = girth_sum(&normalized);
        let longest = normalized.sorted_dims()[0];
        let rate_key = input.rate_key();
        let price = sanitize(input.price);

        let fulfillment = resolve_fee(
            &self.rates,
            classification.tier,
            classification.shipping_weight_oz,
            price,
            &rate_key,
            &input.surcharges,
        );
        let referral = self.referral_fee(price, &input.category);
        let profit = aggregate(
            price,
            fulfillment.as_ref().map(|f| f.total),
            referral.clone(),
            &input.costs,
        );
        let advisories = advisories(
            &classification,
            longest,
            girth,
            &rate_key,
            &input.surcharges,
        );

        CalculationResult {
            normalized,
            classification,
            girth_sum_in: girth,
            rate_key,
            price_band: PriceBand::for_price(price),
            fulfillment,
            referral,
            profit,
            advisories,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tier::SizeTier;
    use crate::core::units::{LengthUnit, WeightUnit};

    fn engine() -> Engine {
        Engine::builtin().unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_small_standard_example() {
        let input = CalculationInput::new(PackageSpec::inches_ounces(10.0, 8.0, 0.5, 14.0), 9.50);
        let result = engine().calculate(&input);
        assert_eq!(result.classification.tier, SizeTier::SmallStandard);
        assert_eq!(result.classification.shipping_weight_oz, 14.0);
        assert_eq!(result.price_band, PriceBand::Under10);
        assert!(approx(result.fulfillment_total().unwrap(), 2.66));
    }

    #[test]
    fn test_oversize_example() {
        let package = PackageSpec::new(20.0, 15.0, 10.0, LengthUnit::In, 40.0, WeightUnit::Lb);
        let result = engine().calculate(&CalculationInput::new(package, 30.0));
        assert_eq!(result.classification.tier, SizeTier::SmallOversize);
        assert!((result.classification.volumetric_weight_lb - 21.58).abs() < 0.01);
        assert!(approx(result.fulfillment_total().unwrap(), 24.43));
    }

    #[test]
    fn test_profit_flows_from_fees() {
        let mut input =
            CalculationInput::new(PackageSpec::inches_ounces(10.0, 8.0, 0.5, 14.0), 20.0);
        input.costs.product_cost_local = 4.0;
        let result = engine().calculate(&input);
        let fulfillment = result.fulfillment_total().unwrap();
        let referral = result.referral_fee().unwrap();
        let profit = result.profit.into_value().unwrap();
        assert!(approx(profit.net_profit, 20.0 - fulfillment - referral - 4.0));
    }

    #[test]
    fn test_missing_version_renders_unresolved() {
        let mut input =
            CalculationInput::new(PackageSpec::inches_ounces(10.0, 8.0, 0.5, 14.0), 20.0);
        input.rate_version = "2019".to_string();
        let result = engine().calculate(&input);
        assert!(!result.fulfillment.is_resolved());
        assert!(result.referral.is_resolved());
        assert!(!result.profit.is_resolved());
        assert!(matches!(
            result.unresolved_reason(),
            Some(Unresolved::MissingTable { .. })
        ));
    }

    #[test]
    fn test_unknown_category_unresolved() {
        let mut input =
            CalculationInput::new(PackageSpec::inches_ounces(10.0, 8.0, 0.5, 14.0), 20.0);
        input.category = "widgets".to_string();
        let result = engine().calculate(&input);
        assert!(result.fulfillment.is_resolved());
        assert!(!result.referral.is_resolved());
        assert!(!result.profit.is_resolved());
    }

    #[test]
    fn test_calculate_is_pure() {
        let engine = engine();
        let input = CalculationInput::new(PackageSpec::inches_ounces(12.0, 9.0, 4.0, 30.0), 25.0);
        assert_eq!(engine.calculate(&input), engine.calculate(&input));
    }

    #[test]
    fn test_input_deserializes_with_defaults() {
        let input: CalculationInput = serde_json::from_str(
            r#"{"package":{"length":10,"width":8,"height":0.5,"actual_weight":14},"price":9.5}"#,
        )
        .unwrap();
        assert_eq!(input.rate_version, DEFAULT_RATE_VERSION);
        assert_eq!(input.category, DEFAULT_CATEGORY);
        assert_eq!(input.costs.exchange_rate, 1.0);
    }
}
