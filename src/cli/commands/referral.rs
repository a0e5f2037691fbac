//! `fbacalc referral` command - referral fee lookup and catalogue listing

use console::style;
use miette::Result;
use serde::Serialize;

use crate::cli::helpers::{lenient_f64, load_engine, print_structured, truncate_str};
use crate::cli::output::{effective_format, field, heading, table, usd};
use crate::cli::GlobalOpts;
use crate::core::referral::ReferralRule;
use crate::core::resolved::Resolved;
use crate::core::Config;

#[derive(clap::Args, Debug)]
pub struct ReferralArgs {
    /// Selling price (USD)
    #[arg(long, short = 'p', value_parser = lenient_f64, required_unless_present = "list")]
    pub price: Option<f64>,

    /// Referral category [default: from config, else everything_else]
    #[arg(long, short = 'c')]
    pub category: Option<String>,

    /// List all categories and their rules
    #[arg(long, conflicts_with = "price")]
    pub list: bool,
}

#[derive(Serialize)]
struct ReferralReport<'a> {
    category: &'a str,
    price: f64,
    rule: Option<&'a ReferralRule>,
    fee: Resolved<f64>,
}

#[derive(Serialize)]
struct CategoryRow<'a> {
    key: &'a str,
    name: &'a str,
    rule: &'a ReferralRule,
}

/// Run the referral command
pub fn run(args: ReferralArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let engine = load_engine(&config)?;
    let catalogue = engine.referral_catalogue();
    let format = effective_format(global.format);

    if args.list {
        let rows: Vec<CategoryRow> = catalogue
            .iter()
            .map(|c| CategoryRow {
                key: &c.key,
                name: &c.name,
                rule: &c.rule,
            })
            .collect();
        if print_structured(&rows, format)? {
            return Ok(());
        }
        let rows = catalogue
            .iter()
            .map(|c| {
                vec![
                    c.key.clone(),
                    truncate_str(&c.name, 32),
                    c.rule.describe(),
                ]
            })
            .collect();
        println!("{}", table(&["Key", "Category", "Rule"], rows, 3));
        println!(
            "{} categories",
            style(catalogue.len()).cyan()
        );
        return Ok(());
    }

    let category = args.category.unwrap_or_else(|| config.category.clone());
    let price = args.price.unwrap_or(0.0);
    let report = ReferralReport {
        rule: catalogue.get(&category).map(|c| &c.rule),
        fee: engine.referral_fee(price, &category),
        category: &category,
        price,
    };

    if print_structured(&report, format)? {
        return Ok(());
    }

    heading("Referral fee");
    field("Category", style(&category).cyan());
    field("Price", usd(Some(price)));
    match (&report.rule, &report.fee) {
        (Some(rule), Resolved::Value(fee)) => {
            field("Rule", rule.describe());
            field("Fee", style(usd(Some(*fee))).green().bold());
        }
        (_, fee) => {
            field("Fee", style("N/A").yellow());
            if let Some(reason) = fee.reason() {
                field("Reason", style(reason).dim());
            }
            println!();
            println!(
                "Run {} to see known categories",
                style("fbacalc referral --list").yellow()
            );
        }
    }
    Ok(())
}
