//! Rate data errors - authoring bugs caught when tables are loaded

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

use crate::core::referral::RuleError;
use crate::core::tier::SizeTier;
use crate::rates::table::PriceBand;
use crate::yaml::YamlError;

#[derive(Debug, Error, Diagnostic)]
pub enum RateError {
    #[error("{key}: {tier} has no weight breakpoints")]
    #[diagnostic(code(fbacalc::rates::empty_breakpoints))]
    EmptyBreakpoints { key: String, tier: SizeTier },

    #[error("{key}: {tier} breakpoints must be strictly increasing ({prev} oz then {next} oz)")]
    #[diagnostic(
        code(fbacalc::rates::breakpoints),
        help("List breakpoints_oz in ascending order without duplicates")
    )]
    NonMonotonicBreakpoints {
        key: String,
        tier: SizeTier,
        prev: f64,
        next: f64,
    },

    #[error("{key}: {tier} {band} has {found} fees for {expected} breakpoints")]
    #[diagnostic(
        code(fbacalc::rates::incomplete_band),
        help("Every price band needs exactly one fee per breakpoint")
    )]
    IncompleteBand {
        key: String,
        tier: SizeTier,
        band: PriceBand,
        found: usize,
        expected: usize,
    },

    #[error("{key}: {tier} {band} fee decreases at the {breakpoint_oz} oz breakpoint")]
    #[diagnostic(code(fbacalc::rates::decreasing_fee))]
    DecreasingFee {
        key: String,
        tier: SizeTier,
        band: PriceBand,
        breakpoint_oz: f64,
    },

    #[error("{key}: {tier} {band} post-breakpoint base {base} is below the last tabulated fee {last}")]
    #[diagnostic(
        code(fbacalc::rates::post_breakpoint),
        help("The extrapolated fee must not drop below the last table entry")
    )]
    PostBreakpointBelowTable {
        key: String,
        tier: SizeTier,
        band: PriceBand,
        base: f64,
        last: f64,
    },

    #[error("{key}: invalid super oversize bands: {detail}")]
    #[diagnostic(code(fbacalc::rates::super_oversize))]
    SuperOversizeBands { key: String, detail: String },

    #[error("{key}: super oversize {band} fee drops from {fee_at_max:.2} at {max_lb} lb to {next_base:.2} in the next band")]
    #[diagnostic(
        code(fbacalc::rates::super_oversize_drop),
        help("Each band's base must be at least the previous band's fee at its max_lb")
    )]
    SuperOversizeFeeDrop {
        key: String,
        band: PriceBand,
        max_lb: f64,
        fee_at_max: f64,
        next_base: f64,
    },

    #[error("{key}: {field} must be a non-negative amount, got {value}")]
    #[diagnostic(code(fbacalc::rates::amount))]
    InvalidAmount {
        key: String,
        field: String,
        value: f64,
    },

    #[error("rate table {key} is defined more than once in {source_name}")]
    #[diagnostic(code(fbacalc::rates::duplicate))]
    DuplicateTable { key: String, source_name: String },

    #[error("referral category '{category}': {source}")]
    #[diagnostic(code(fbacalc::referral::rule))]
    InvalidReferralRule {
        category: String,
        #[source]
        source: RuleError,
    },

    #[error("referral category '{category}' is defined more than once")]
    #[diagnostic(code(fbacalc::referral::duplicate))]
    DuplicateCategory { category: String },

    #[error("embedded data file '{name}' is missing or not UTF-8")]
    #[diagnostic(code(fbacalc::rates::embedded))]
    Embedded { name: String },

    #[error("cannot read {}", path.display())]
    #[diagnostic(code(fbacalc::rates::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Yaml(#[from] YamlError),
}
