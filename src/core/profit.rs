//! Profit and loss aggregation
//!
//! Combines the two marketplace fees with caller-supplied costs into a
//! per-unit breakdown and a batch projection. Rates arrive as percentages
//! (`10.0` means 10%).

use serde::{Deserialize, Serialize};

use crate::core::resolved::{Resolved, Unresolved};
use crate::core::units::sanitize;

/// ROI reported when there is profit but no investment
pub const ROI_SENTINEL: f64 = 9999.0;

/// Refund administration fee cap in USD
pub const REFUND_ADMIN_FEE_CAP: f64 = 5.00;

/// Share of the referral fee charged as refund administration fee
pub const REFUND_ADMIN_FEE_RATE: f64 = 0.20;

/// Costs the seller carries besides marketplace fees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostInputs {
    /// Unit product cost in local currency
    pub product_cost_local: f64,

    /// Unit inbound shipping cost in local currency
    pub shipping_cost_local: f64,

    /// Local currency units per USD
    pub exchange_rate: f64,

    /// Monthly storage fee per unit, USD
    pub storage_fee: f64,

    /// Any other per-unit cost, USD
    pub other_fee: f64,

    pub return_rate_pct: f64,
    pub unsellable_rate_pct: f64,
    pub acos_pct: f64,

    /// Units in one shipment
    pub shipment_qty: f64,
}

impl Default for CostInputs {
    fn default() -> Self {
        Self {
            product_cost_local: 0.0,
            shipping_cost_local: 0.0,
            exchange_rate: 1.0,
            storage_fee: 0.0,
            other_fee: 0.0,
            return_rate_pct: 0.0,
            unsellable_rate_pct: 0.0,
            acos_pct: 0.0,
            shipment_qty: 1.0,
        }
    }
}

impl CostInputs {
    /// Exchange rate with non-positive values coerced to 1
    pub fn effective_exchange_rate(&self) -> f64 {
        let rate = sanitize(self.exchange_rate);
        if rate > 0.0 {
            rate
        } else {
            1.0
        }
    }

    /// Landed unit cost converted to USD
    pub fn product_cost_usd(&self) -> f64 {
        (sanitize(self.product_cost_local) + sanitize(self.shipping_cost_local))
            / self.effective_exchange_rate()
    }
}

/// Batch totals for one shipment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchProjection {
    pub quantity: f64,
    pub total_investment: f64,
    pub total_payout: f64,
    pub total_net_profit: f64,
    pub roi: f64,
}

/// Per-unit profit and loss
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitBreakdown {
    pub price: f64,
    pub fulfillment_fee: f64,
    pub referral_fee: f64,
    pub product_cost_usd: f64,
    pub refund_admin_fee: f64,
    pub return_loss: f64,
    pub ads_cost: f64,
    pub storage_fee: f64,
    pub other_fee: f64,

    /// Price minus marketplace fees
    pub payout: f64,
    pub net_profit: f64,
    pub margin: f64,
    pub unit_roi: f64,

    /// ACOS at which net profit reaches zero, as a fraction
    pub break_even_acos: f64,

    pub batch: BatchProjection,
}

/// `profit / investment`, with the sentinel when nothing was invested
pub fn roi(net_profit: f64, investment: f64) -> f64 {
    if investment > 0.0 {
        net_profit / investment
    } else if net_profit > 0.0 {
        ROI_SENTINEL
    } else {
        0.0
    }
}

fn ratio(numerator: f64, price: f64) -> f64 {
    if price > 0.0 {
        numerator / price
    } else {
        0.0
    }
}

/// Profit breakdown from resolved fees and cost inputs
pub fn profit(
    price: f64,
    fulfillment_fee: f64,
    referral_fee: f64,
    costs: &CostInputs,
) -> ProfitBreakdown {
    let price = sanitize(price);
    let return_rate = sanitize(costs.return_rate_pct) / 100.0;
    let unsellable_rate = sanitize(costs.unsellable_rate_pct) / 100.0;
    let acos = sanitize(costs.acos_pct) / 100.0;
    let storage_fee = sanitize(costs.storage_fee);
    let other_fee = sanitize(costs.other_fee);
    let quantity = sanitize(costs.shipment_qty);

    let product_cost_usd = costs.product_cost_usd();
    let refund_admin_fee = (referral_fee * REFUND_ADMIN_FEE_RATE).min(REFUND_ADMIN_FEE_CAP);
    let return_loss = (price + fulfillment_fee) * return_rate * unsellable_rate
        + refund_admin_fee * return_rate;
    let ads_cost = price * acos;
    let payout = price - referral_fee - fulfillment_fee;
    let net_profit =
        payout - product_cost_usd - ads_cost - storage_fee - return_loss - other_fee;

    let total_investment = product_cost_usd * quantity;
    let total_net_profit = net_profit * quantity;

    ProfitBreakdown {
        price,
        fulfillment_fee,
        referral_fee,
        product_cost_usd,
        refund_admin_fee,
        return_loss,
        ads_cost,
        storage_fee,
        other_fee,
        payout,
        net_profit,
        margin: ratio(net_profit, price),
        unit_roi: roi(net_profit, product_cost_usd),
        break_even_acos: ratio(payout - product_cost_usd, price),
        batch: BatchProjection {
            quantity,
            total_investment,
            total_payout: payout * quantity,
            total_net_profit,
            roi: roi(total_net_profit, total_investment),
        },
    }
}

/// Aggregate only when both fees resolved; the first unresolved fee wins
pub fn aggregate(
    price: f64,
    fulfillment_fee: Resolved<f64>,
    referral_fee: Resolved<f64>,
    costs: &CostInputs,
) -> Resolved<ProfitBreakdown> {
    match (fulfillment_fee, referral_fee) {
        (Resolved::Value(fulfillment), Resolved::Value(referral)) => {
            Resolved::Value(profit(price, fulfillment, referral, costs))
        }
        (Resolved::Unresolved(reason), _) | (_, Resolved::Unresolved(reason)) => {
            tracing::debug!(%reason, "profit left unresolved");
            Resolved::Unresolved(Unresolved::Upstream {
                field: upstream_field(&reason).to_string(),
            })
        }
    }
}

fn upstream_field(reason: &Unresolved) -> &'static str {
    match reason {
        Unresolved::UnknownCategory { .. } => "referral_fee",
        Unresolved::Upstream { .. } => "upstream",
        _ => "fulfillment_fee",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_basic_profit() {
        let costs = CostInputs {
            product_cost_local: 4.0,
            acos_pct: 10.0,
            ..Default::default()
        };
        let p = profit(20.0, 5.0, 3.0, &costs);
        assert!(approx(p.payout, 12.0));
        assert!(approx(p.ads_cost, 2.0));
        assert!(approx(p.net_profit, 6.0));
        assert!(approx(p.margin, 0.30));
        assert!(approx(p.break_even_acos, 0.40));
        assert!(approx(p.unit_roi, 1.5));
    }

    #[test]
    fn test_exchange_rate_converts_costs() {
        let costs = CostInputs {
            product_cost_local: 28.0,
            shipping_cost_local: 7.0,
            exchange_rate: 7.0,
            ..Default::default()
        };
        assert!(approx(costs.product_cost_usd(), 5.0));
    }

    #[test]
    fn test_non_positive_exchange_rate_coerced() {
        for rate in [0.0, -3.0, f64::NAN] {
            let costs = CostInputs {
                product_cost_local: 4.0,
                exchange_rate: rate,
                ..Default::default()
            };
            assert!(approx(costs.product_cost_usd(), 4.0));
        }
    }

    #[test]
    fn test_return_loss_and_refund_admin_fee() {
        let costs = CostInputs {
            return_rate_pct: 10.0,
            unsellable_rate_pct: 50.0,
            ..Default::default()
        };
        let p = profit(100.0, 10.0, 15.0, &costs);
        assert!(approx(p.refund_admin_fee, 3.0));
        // (100 + 10) * 0.1 * 0.5 + 3 * 0.1
        assert!(approx(p.return_loss, 5.8));
    }

    #[test]
    fn test_refund_admin_fee_capped() {
        let p = profit(1000.0, 10.0, 150.0, &CostInputs::default());
        assert!(approx(p.refund_admin_fee, REFUND_ADMIN_FEE_CAP));
    }

    #[test]
    fn test_zero_price_ratios() {
        let p = profit(0.0, 3.0, 0.3, &CostInputs::default());
        assert_eq!(p.margin, 0.0);
        assert_eq!(p.break_even_acos, 0.0);
    }

    #[test]
    fn test_batch_projection() {
        let costs = CostInputs {
            product_cost_local: 4.0,
            acos_pct: 10.0,
            shipment_qty: 100.0,
            ..Default::default()
        };
        let p = profit(20.0, 5.0, 3.0, &costs);
        assert!(approx(p.batch.total_investment, 400.0));
        assert!(approx(p.batch.total_payout, 1200.0));
        assert!(approx(p.batch.total_net_profit, 600.0));
        assert!(approx(p.batch.roi, 1.5));
    }

    #[test]
    fn test_roi_sentinel() {
        assert_eq!(roi(10.0, 0.0), ROI_SENTINEL);
        assert_eq!(roi(-10.0, 0.0), 0.0);
        assert_eq!(roi(0.0, 0.0), 0.0);
        assert!(approx(roi(5.0, 10.0), 0.5));
    }

    #[test]
    fn test_unresolved_fee_propagates() {
        let missing = Resolved::Unresolved(Unresolved::MissingTable {
            key: "2019/normal/peak".to_string(),
        });
        let result = aggregate(20.0, missing, Resolved::Value(3.0), &CostInputs::default());
        assert!(matches!(
            result,
            Resolved::Unresolved(Unresolved::Upstream { ref field }) if field == "fulfillment_fee"
        ));

        let unknown = Resolved::Unresolved(Unresolved::UnknownCategory {
            category: "widgets".to_string(),
        });
        let result = aggregate(20.0, Resolved::Value(5.0), unknown, &CostInputs::default());
        assert!(matches!(
            result,
            Resolved::Unresolved(Unresolved::Upstream { ref field }) if field == "referral_fee"
        ));
    }
}
