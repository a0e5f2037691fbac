//! Command-line argument definitions

use clap::{Parser, Subcommand, ValueEnum};

use crate::cli::commands::{
    calc::CalcArgs, fee::FeeArgs, history::HistoryCommands, rates::RatesCommands,
    referral::ReferralArgs, sensitivity::SensitivityArgs, tier::TierArgs,
};

#[derive(Parser, Debug)]
#[command(name = "fbacalc")]
#[command(author, version, about = "FBA fulfillment fee, referral fee and profit calculator")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text on a terminal
    #[default]
    Auto,
    /// Human-readable text
    Text,
    /// JSON
    Json,
    /// YAML
    Yaml,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full pipeline: tier, fees and profit
    Calc(CalcArgs),

    /// Classify a package into its size tier
    Tier(TierArgs),

    /// Resolve the fulfillment fee for a package
    Fee(FeeArgs),

    /// Referral fee for a price and category
    Referral(ReferralArgs),

    /// Sweep one input and show how fees and profit respond
    Sensitivity(SensitivityArgs),

    /// Inspect and validate rate tables
    #[command(subcommand)]
    Rates(RatesCommands),

    /// Saved calculations
    #[command(subcommand)]
    History(HistoryCommands),
}
