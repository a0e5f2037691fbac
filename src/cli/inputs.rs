//! Argument groups shared by the calculation commands

use chrono::NaiveDate;

use crate::cli::helpers::lenient_f64;
use crate::core::fulfillment::Surcharges;
use crate::core::pipeline::CalculationInput;
use crate::core::profit::CostInputs;
use crate::core::units::{LengthUnit, PackageSpec, WeightUnit};
use crate::core::Config;
use crate::rates::{ProductType, RateTableKey, Season};

/// Package dimensions and weight
#[derive(clap::Args, Debug, Clone)]
pub struct PackageArgs {
    /// Package length
    #[arg(long, short = 'L', value_parser = lenient_f64)]
    pub length: f64,

    /// Package width
    #[arg(long, short = 'W', value_parser = lenient_f64)]
    pub width: f64,

    /// Package height
    #[arg(long, short = 'H', value_parser = lenient_f64)]
    pub height: f64,

    /// Unit for all dimensions (in, cm, mm)
    #[arg(long, short = 'u', default_value = "in")]
    pub unit: LengthUnit,

    /// Override the unit of the length only
    #[arg(long)]
    pub length_unit: Option<LengthUnit>,

    /// Override the unit of the width only
    #[arg(long)]
    pub width_unit: Option<LengthUnit>,

    /// Override the unit of the height only
    #[arg(long)]
    pub height_unit: Option<LengthUnit>,

    /// Actual package weight
    #[arg(long, value_parser = lenient_f64)]
    pub weight: f64,

    /// Weight unit (oz, lb, g, kg)
    #[arg(long, default_value = "oz")]
    pub weight_unit: WeightUnit,
}

impl PackageArgs {
    pub fn to_spec(&self) -> PackageSpec {
        PackageSpec {
            length: self.length,
            width: self.width,
            height: self.height,
            length_unit: self.length_unit.unwrap_or(self.unit),
            width_unit: self.width_unit.unwrap_or(self.unit),
            height_unit: self.height_unit.unwrap_or(self.unit),
            actual_weight: self.weight,
            weight_unit: self.weight_unit,
        }
    }
}

/// Rate table selection
#[derive(clap::Args, Debug, Clone)]
pub struct RateKeyArgs {
    /// Rate schedule version [default: from config, else 2025]
    #[arg(long = "rate-version")]
    pub rate_version: Option<String>,

    /// Product type (normal, apparel, dangerous)
    #[arg(long, short = 't')]
    pub product_type: Option<ProductType>,

    /// Fee season (peak, non-peak)
    #[arg(long, short = 's', conflicts_with = "date")]
    pub season: Option<Season>,

    /// Derive the season from a date (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

impl RateKeyArgs {
    /// Season from flags, then config, then today's date
    pub fn season(&self, config: &Config) -> Season {
        self.season
            .or_else(|| self.date.map(Season::for_date))
            .or(config.season)
            .unwrap_or_else(|| Season::for_date(chrono::Local::now().date_naive()))
    }

    pub fn to_key(&self, config: &Config) -> RateTableKey {
        RateTableKey::new(
            self.rate_version
                .clone()
                .unwrap_or_else(|| config.rate_version.clone()),
            self.product_type.unwrap_or(config.product_type),
            self.season(config),
        )
    }
}

/// Fee surcharges
#[derive(clap::Args, Debug, Clone)]
pub struct SurchargeArgs {
    /// Product contains lithium batteries
    #[arg(long)]
    pub lithium: bool,

    /// Extra oversize surcharge added to the fulfillment fee (USD)
    #[arg(long, default_value = "0", value_parser = lenient_f64)]
    pub oversize_surcharge: f64,
}

impl SurchargeArgs {
    pub fn to_surcharges(&self) -> Surcharges {
        Surcharges {
            lithium_battery: self.lithium,
            oversize: self.oversize_surcharge,
        }
    }
}

/// Seller costs
#[derive(clap::Args, Debug, Clone)]
pub struct CostArgs {
    /// Unit product cost in local currency
    #[arg(long, default_value = "0", value_parser = lenient_f64)]
    pub product_cost: f64,

    /// Unit inbound shipping cost in local currency
    #[arg(long, default_value = "0", value_parser = lenient_f64)]
    pub shipping_cost: f64,

    /// Local currency units per USD [default: from config, else 1]
    #[arg(long, value_parser = lenient_f64)]
    pub exchange_rate: Option<f64>,

    /// Storage fee per unit (USD)
    #[arg(long, default_value = "0", value_parser = lenient_f64)]
    pub storage_fee: f64,

    /// Other per-unit costs (USD)
    #[arg(long, default_value = "0", value_parser = lenient_f64)]
    pub other_fee: f64,

    /// Return rate (%)
    #[arg(long, default_value = "0", value_parser = lenient_f64)]
    pub return_rate: f64,

    /// Share of returns that cannot be resold (%)
    #[arg(long, default_value = "0", value_parser = lenient_f64)]
    pub unsellable_rate: f64,

    /// Advertising cost of sale (%)
    #[arg(long, default_value = "0", value_parser = lenient_f64)]
    pub acos: f64,

    /// Units per shipment
    #[arg(long, default_value = "1", value_parser = lenient_f64)]
    pub qty: f64,
}

impl CostArgs {
    pub fn to_costs(&self, config: &Config) -> CostInputs {
        CostInputs {
            product_cost_local: self.product_cost,
            shipping_cost_local: self.shipping_cost,
            exchange_rate: self.exchange_rate.unwrap_or(config.exchange_rate),
            storage_fee: self.storage_fee,
            other_fee: self.other_fee,
            return_rate_pct: self.return_rate,
            unsellable_rate_pct: self.unsellable_rate,
            acos_pct: self.acos,
            shipment_qty: self.qty,
        }
    }
}

/// Everything `calc` and `sensitivity` need to build a calculation
#[derive(clap::Args, Debug, Clone)]
pub struct CalcInputArgs {
    #[command(flatten)]
    pub package: PackageArgs,

    /// Selling price (USD)
    #[arg(long, short = 'p', value_parser = lenient_f64)]
    pub price: f64,

    /// Referral category [default: from config, else everything_else]
    #[arg(long, short = 'c')]
    pub category: Option<String>,

    #[command(flatten)]
    pub key: RateKeyArgs,

    #[command(flatten)]
    pub surcharges: SurchargeArgs,

    #[command(flatten)]
    pub costs: CostArgs,
}

impl CalcInputArgs {
    pub fn to_input(&self, config: &Config) -> CalculationInput {
        let key = self.key.to_key(config);
        CalculationInput {
            package: self.package.to_spec(),
            price: self.price,
            rate_version: key.version,
            product_type: key.product_type,
            season: key.season,
            category: self
                .category
                .clone()
                .unwrap_or_else(|| config.category.clone()),
            surcharges: self.surcharges.to_surcharges(),
            costs: self.costs.to_costs(config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        input: CalcInputArgs,
    }

    fn parse(args: &[&str]) -> CalcInputArgs {
        let mut argv = vec!["test"];
        argv.extend_from_slice(args);
        Harness::try_parse_from(argv).unwrap().input
    }

    #[test]
    fn test_per_dimension_unit_override() {
        let input = parse(&[
            "-L", "30", "-W", "20", "-H", "5", "--unit", "cm", "--height-unit", "in",
            "--weight", "1", "--weight-unit", "kg", "--price", "20",
        ]);
        let spec = input.package.to_spec();
        assert_eq!(spec.length_unit, LengthUnit::Cm);
        assert_eq!(spec.height_unit, LengthUnit::In);
        assert_eq!(spec.weight_unit, WeightUnit::Kg);
    }

    #[test]
    fn test_lenient_numbers_become_zero() {
        let input = parse(&[
            "-L", "abc", "-W", "8", "-H", "0.5", "--weight", "14", "--price", "9.5",
            "--acos", "lots",
        ]);
        assert_eq!(input.package.length, 0.0);
        assert_eq!(input.costs.acos, 0.0);
    }

    #[test]
    fn test_config_fills_missing_flags() {
        let config = Config {
            rate_version: "2024".to_string(),
            product_type: ProductType::Apparel,
            season: Some(Season::Peak),
            category: "toys_games".to_string(),
            exchange_rate: 7.0,
            ..Config::default()
        };
        let input = parse(&[
            "-L", "10", "-W", "8", "-H", "0.5", "--weight", "14", "--price", "9.5",
        ])
        .to_input(&config);
        assert_eq!(input.rate_version, "2024");
        assert_eq!(input.product_type, ProductType::Apparel);
        assert_eq!(input.season, Season::Peak);
        assert_eq!(input.category, "toys_games");
        assert_eq!(input.costs.exchange_rate, 7.0);
    }

    #[test]
    fn test_date_selects_season() {
        let config = Config::default();
        let input = parse(&[
            "-L", "10", "-W", "8", "-H", "0.5", "--weight", "14", "--price", "9.5",
            "--date", "2025-11-20",
        ]);
        assert_eq!(input.key.season(&config), Season::Peak);
    }
}
