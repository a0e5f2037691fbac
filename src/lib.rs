//! fbacalc: FBA fee and profitability engine
//!
//! Classifies a package into a carrier size tier, resolves the fulfillment
//! fee from versioned rate tables, evaluates the referral fee for its
//! category and aggregates everything into a profit and ROI model.
//!
//! ```no_run
//! use fbacalc::core::{CalculationInput, Engine, PackageSpec};
//!
//! let engine = Engine::builtin()?;
//! let input = CalculationInput::new(PackageSpec::inches_ounces(10.0, 8.0, 0.5, 14.0), 9.50);
//! let result = engine.calculate(&input);
//! println!("{:?}", result.fulfillment_total());
//! # Ok::<(), fbacalc::rates::RateError>(())
//! ```

pub mod cli;
pub mod core;
pub mod logging;
pub mod rates;
pub mod yaml;
