//! Rate data - fulfillment fee tables and the referral catalogue

mod embedded;

pub mod catalogue;
pub mod error;
pub mod registry;
pub mod table;

pub use catalogue::{ReferralCatalogue, ReferralCategory, DEFAULT_CATEGORY};
pub use error::RateError;
pub use registry::{RateFile, RateRegistry, RateTableEntry};
pub use table::{
    BandValues, PerPoundRate, PostBreakpoint, PriceBand, ProductType, RateTable, RateTableKey,
    Season, StandardTierRates, SuperOversizeBand,
};
