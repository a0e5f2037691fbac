//! Core module - the calculation pipeline and its supporting state

pub mod config;
pub mod fulfillment;
pub mod history;
pub mod pipeline;
pub mod profit;
pub mod referral;
pub mod resolved;
pub mod sensitivity;
pub mod tier;
pub mod units;

pub use config::Config;
pub use fulfillment::{resolve_fee, Advisory, FeeBasis, FulfillmentFee, Surcharges};
pub use history::{History, HistoryEntry, HistoryError, HistoryStore, HistorySummary};
pub use pipeline::{CalculationInput, CalculationResult, Engine};
pub use profit::{aggregate, profit, BatchProjection, CostInputs, ProfitBreakdown, ROI_SENTINEL};
pub use referral::{resolve_referral, RateBracket, RateCeiling, ReferralRule, RuleError};
pub use resolved::{format_pct, format_usd, Resolved, Unresolved};
pub use sensitivity::{sweep, SensitivityPoint, SweepVariable};
pub use tier::{classify, Classification, SizeTier};
pub use units::{normalize, LengthUnit, NormalizedPackage, PackageSpec, WeightUnit};
