//! CLI command implementations

pub mod calc;
pub mod fee;
pub mod history;
pub mod rates;
pub mod referral;
pub mod sensitivity;
pub mod tier;
