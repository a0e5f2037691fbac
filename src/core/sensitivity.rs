//! Sensitivity sweeps - rerun the pipeline while one input varies

use serde::{Deserialize, Serialize};

use crate::core::pipeline::{CalculationInput, CalculationResult, Engine};
use crate::core::resolved::Resolved;

/// Input that a sweep varies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepVariable {
    /// Selling price (USD)
    Price,
    /// Advertising cost of sale (%)
    Acos,
    /// Return rate (%)
    ReturnRate,
    /// Local currency per USD
    ExchangeRate,
    /// Unit product cost (local currency)
    ProductCost,
}

impl SweepVariable {
    /// Copy of the input with this variable set to `value`
    pub fn apply(&self, input: &CalculationInput, value: f64) -> CalculationInput {
        let mut out = input.clone();
        match self {
            SweepVariable::Price => out.price = value,
            SweepVariable::Acos => out.costs.acos_pct = value,
            SweepVariable::ReturnRate => out.costs.return_rate_pct = value,
            SweepVariable::ExchangeRate => out.costs.exchange_rate = value,
            SweepVariable::ProductCost => out.costs.product_cost_local = value,
        }
        out
    }

    /// Current value of this variable in an input
    pub fn read(&self, input: &CalculationInput) -> f64 {
        match self {
            SweepVariable::Price => input.price,
            SweepVariable::Acos => input.costs.acos_pct,
            SweepVariable::ReturnRate => input.costs.return_rate_pct,
            SweepVariable::ExchangeRate => input.costs.exchange_rate,
            SweepVariable::ProductCost => input.costs.product_cost_local,
        }
    }
}

impl std::fmt::Display for SweepVariable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SweepVariable::Price => write!(f, "price"),
            SweepVariable::Acos => write!(f, "acos"),
            SweepVariable::ReturnRate => write!(f, "return_rate"),
            SweepVariable::ExchangeRate => write!(f, "exchange_rate"),
            SweepVariable::ProductCost => write!(f, "product_cost"),
        }
    }
}

impl std::str::FromStr for SweepVariable {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "price" => Ok(SweepVariable::Price),
            "acos" => Ok(SweepVariable::Acos),
            "return_rate" | "returns" => Ok(SweepVariable::ReturnRate),
            "exchange_rate" | "fx" => Ok(SweepVariable::ExchangeRate),
            "product_cost" | "cost" => Ok(SweepVariable::ProductCost),
            _ => Err(format!(
                "Invalid sweep variable: {}. Use price, acos, return-rate, exchange-rate, or product-cost",
                s
            )),
        }
    }
}

/// One sample of a sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityPoint {
    pub value: f64,
    pub fulfillment_fee: Option<f64>,
    pub referral_fee: Option<f64>,
    pub net_profit: Option<f64>,
    pub margin: Option<f64>,
    pub roi: Option<f64>,
}

impl SensitivityPoint {
    fn from_result(value: f64, result: &CalculationResult) -> Self {
        let profit = match &result.profit {
            Resolved::Value(p) => Some(p),
            Resolved::Unresolved(_) => None,
        };
        Self {
            value,
            fulfillment_fee: result.fulfillment_total(),
            referral_fee: result.referral_fee(),
            net_profit: profit.map(|p| p.net_profit),
            margin: profit.map(|p| p.margin),
            roi: profit.map(|p| p.batch.roi),
        }
    }
}

/// Evenly spaced values from `from` to `to`, both ends included
pub fn sweep_values(from: f64, to: f64, steps: usize) -> Vec<f64> {
    let steps = steps.max(1);
    let width = (to - from) / steps as f64;
    (0..=steps)
        .map(|i| if i == steps { to } else { from + width * i as f64 })
        .collect()
}

/// Rerun the full pipeline for each value of `variable`
pub fn sweep(
    engine: &Engine,
    base: &CalculationInput,
    variable: SweepVariable,
    from: f64,
    to: f64,
    steps: usize,
) -> Vec<SensitivityPoint> {
    let values = sweep_values(from, to, steps);
    tracing::debug!(%variable, from, to, points = values.len(), "running sensitivity sweep");
    values
        .into_iter()
        .map(|value| {
            let input = variable.apply(base, value);
            SensitivityPoint::from_result(value, &engine.calculate(&input))
        })
        .collect()
}
