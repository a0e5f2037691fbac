//! `fbacalc sensitivity` command - sweep one input across a range

use console::style;
use miette::Result;
use serde::Serialize;

use crate::cli::helpers::{lenient_f64, load_engine, print_structured};
use crate::cli::inputs::CalcInputArgs;
use crate::cli::output::{effective_format, pct, table, usd};
use crate::cli::GlobalOpts;
use crate::core::sensitivity::{sweep, SensitivityPoint, SweepVariable};
use crate::core::Config;

#[derive(clap::Args, Debug)]
pub struct SensitivityArgs {
    #[command(flatten)]
    pub input: CalcInputArgs,

    /// Input to vary (price, acos, return-rate, exchange-rate, product-cost)
    #[arg(long)]
    pub vary: SweepVariable,

    /// First value of the sweep
    #[arg(long, value_parser = lenient_f64)]
    pub from: f64,

    /// Last value of the sweep
    #[arg(long, value_parser = lenient_f64)]
    pub to: f64,

    /// Number of intervals between `from` and `to`
    #[arg(long, default_value = "10", value_parser = clap::value_parser!(u16).range(1..))]
    pub steps: u16,
}

#[derive(Serialize)]
struct SweepReport {
    variable: SweepVariable,
    points: Vec<SensitivityPoint>,
}

/// Run the sensitivity command
pub fn run(args: SensitivityArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let engine = load_engine(&config)?;
    let base = args.input.to_input(&config);

    let points = sweep(
        &engine,
        &base,
        args.vary,
        args.from,
        args.to,
        usize::from(args.steps),
    );
    let report = SweepReport {
        variable: args.vary,
        points,
    };

    if print_structured(&report, effective_format(global.format))? {
        return Ok(());
    }

    println!(
        "Sweeping {} from {} to {} (base {})",
        style(args.vary).cyan(),
        args.from,
        args.to,
        args.vary.read(&base)
    );

    let rows = report
        .points
        .iter()
        .map(|p| {
            vec![
                format!("{:.2}", p.value),
                usd(p.fulfillment_fee),
                usd(p.referral_fee),
                usd(p.net_profit),
                pct(p.margin),
                pct(p.roi),
            ]
        })
        .collect();
    println!(
        "{}",
        table(
            &[
                args.vary.to_string().as_str(),
                "Fulfillment",
                "Referral",
                "Net profit",
                "Margin",
                "ROI",
            ],
            rows,
            0,
        )
    );
    Ok(())
}
