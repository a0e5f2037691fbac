//! `fbacalc calc` command - full fee and profit calculation

use console::style;
use miette::Result;
use serde::Serialize;

use crate::cli::helpers::{load_engine, print_structured};
use crate::cli::inputs::CalcInputArgs;
use crate::cli::output::{effective_format, field, heading, pct, rule, usd, usd_resolved};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::history::{HistoryEntry, HistoryStore};
use crate::core::pipeline::{CalculationInput, CalculationResult};
use crate::core::profit::{ProfitBreakdown, ROI_SENTINEL};
use crate::core::resolved::Resolved;
use crate::core::Config;

#[derive(clap::Args, Debug)]
pub struct CalcArgs {
    #[command(flatten)]
    pub input: CalcInputArgs,

    /// Save the calculation to history
    #[arg(long)]
    pub save: bool,
}

#[derive(Serialize)]
struct CalcReport<'a> {
    input: &'a CalculationInput,
    result: &'a CalculationResult,
}

/// Run the calc command
pub fn run(args: CalcArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let engine = load_engine(&config)?;
    let input = args.input.to_input(&config);
    let result = engine.calculate(&input);

    let format = effective_format(global.format);
    if !print_structured(
        &CalcReport {
            input: &input,
            result: &result,
        },
        format,
    )? {
        print_result(&input, &result);
    }

    if args.save {
        let store = HistoryStore::new(&config.history_file);
        let history = store.append(HistoryEntry::new(&input, &result))?;
        tracing::info!(path = %store.path().display(), entries = history.len(), "saved calculation");
        if format == OutputFormat::Text {
            println!();
            println!(
                "{} Saved to history ({} of {})",
                style("✓").green(),
                history.len(),
                crate::core::history::HISTORY_LIMIT
            );
        }
    }

    Ok(())
}

/// Full text view of a calculation
pub(crate) fn print_result(input: &CalculationInput, result: &CalculationResult) {
    rule();
    println!(
        "{} at {} in {}",
        style("FBA calculation").bold(),
        style(usd(Some(input.price))).yellow(),
        style(&input.category).cyan()
    );
    rule();

    super::tier::print_package(
        &result.normalized,
        result.girth_sum_in,
        &result.classification,
    );
    super::fee::print_fulfillment(&result.rate_key, result.price_band, &result.fulfillment);

    heading("Referral fee");
    match &result.referral {
        Resolved::Value(_) => field("Fee", usd_resolved(&result.referral)),
        Resolved::Unresolved(reason) => {
            field("Fee", style("N/A").yellow());
            field("Reason", style(reason).dim());
        }
    }

    match &result.profit {
        Resolved::Value(profit) => print_profit(profit),
        Resolved::Unresolved(reason) => {
            heading("Profit");
            field("Net profit", style("N/A").yellow());
            field("Reason", style(reason).dim());
        }
    }

    super::fee::print_advisories(&result.advisories);
}

fn roi_text(roi: f64) -> String {
    if roi >= ROI_SENTINEL {
        "∞".to_string()
    } else {
        pct(Some(roi))
    }
}

fn print_profit(profit: &ProfitBreakdown) {
    heading("Costs per unit");
    field("Product cost", usd(Some(profit.product_cost_usd)));
    field("Advertising", usd(Some(profit.ads_cost)));
    field("Return loss", usd(Some(profit.return_loss)));
    if profit.storage_fee > 0.0 {
        field("Storage", usd(Some(profit.storage_fee)));
    }
    if profit.other_fee > 0.0 {
        field("Other", usd(Some(profit.other_fee)));
    }

    heading("Profit");
    field("Payout", usd(Some(profit.payout)));
    let net = if profit.net_profit >= 0.0 {
        style(usd(Some(profit.net_profit))).green().bold()
    } else {
        style(usd(Some(profit.net_profit))).red().bold()
    };
    field("Net profit", net);
    field("Margin", pct(Some(profit.margin)));
    field("ROI", roi_text(profit.unit_roi));
    field("Break-even ACOS", pct(Some(profit.break_even_acos)));

    if profit.batch.quantity > 1.0 {
        heading(&format!("Shipment of {}", profit.batch.quantity));
        field("Investment", usd(Some(profit.batch.total_investment)));
        field("Payout", usd(Some(profit.batch.total_payout)));
        field("Net profit", usd(Some(profit.batch.total_net_profit)));
        field("ROI", roi_text(profit.batch.roi));
    }
}
