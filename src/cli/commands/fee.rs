//! `fbacalc fee` command - fulfillment fee for a package

use console::style;
use miette::Result;
use serde::Serialize;

use crate::cli::helpers::{lenient_f64, load_engine, print_structured};
use crate::cli::inputs::{PackageArgs, RateKeyArgs, SurchargeArgs};
use crate::cli::output::{effective_format, field, heading, usd};
use crate::cli::GlobalOpts;
use crate::core::fulfillment::{advisories, resolve_fee, Advisory, FeeBasis, FulfillmentFee};
use crate::core::resolved::Resolved;
use crate::core::tier::{classify, girth_sum, Classification};
use crate::core::units::{normalize, NormalizedPackage};
use crate::core::Config;
use crate::rates::{PriceBand, RateTableKey};

#[derive(clap::Args, Debug)]
pub struct FeeArgs {
    #[command(flatten)]
    pub package: PackageArgs,

    /// Selling price (USD), selects the price band
    #[arg(long, short = 'p', value_parser = lenient_f64)]
    pub price: f64,

    #[command(flatten)]
    pub key: RateKeyArgs,

    #[command(flatten)]
    pub surcharges: SurchargeArgs,
}

#[derive(Serialize)]
struct FeeReport {
    normalized: NormalizedPackage,
    girth_sum_in: f64,
    classification: Classification,
    rate_key: RateTableKey,
    price_band: PriceBand,
    fulfillment: Resolved<FulfillmentFee>,
    advisories: Vec<Advisory>,
}

/// Run the fee command
pub fn run(args: FeeArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let engine = load_engine(&config)?;

    let normalized = normalize(&args.package.to_spec());
    let classification = classify(&normalized);
    let girth = girth_sum(&normalized);
    let key = args.key.to_key(&config);
    let surcharges = args.surcharges.to_surcharges();

    let fulfillment = resolve_fee(
        engine.rates(),
        classification.tier,
        classification.shipping_weight_oz,
        args.price,
        &key,
        &surcharges,
    );
    let report = FeeReport {
        normalized,
        girth_sum_in: girth,
        advisories: advisories(
            &classification,
            normalized.sorted_dims()[0],
            girth,
            &key,
            &surcharges,
        ),
        classification,
        price_band: PriceBand::for_price(args.price),
        rate_key: key,
        fulfillment,
    };

    if print_structured(&report, effective_format(global.format))? {
        return Ok(());
    }

    super::tier::print_package(&report.normalized, report.girth_sum_in, &report.classification);
    print_fulfillment(&report.rate_key, report.price_band, &report.fulfillment);
    print_advisories(&report.advisories);
    Ok(())
}

/// Fulfillment section shared by the text views
pub(crate) fn print_fulfillment(
    key: &RateTableKey,
    band: PriceBand,
    fulfillment: &Resolved<FulfillmentFee>,
) {
    heading("Fulfillment fee");
    field("Rate table", style(key).cyan());
    field("Price band", band.label());

    match fulfillment {
        Resolved::Value(fee) => {
            field("Base fee", usd(Some(fee.base)));
            field("Derived from", describe_basis(&fee.basis));
            if fee.lithium_surcharge > 0.0 {
                field("Lithium surcharge", usd(Some(fee.lithium_surcharge)));
            }
            if fee.oversize_surcharge > 0.0 {
                field("Oversize surcharge", usd(Some(fee.oversize_surcharge)));
            }
            field("Total", style(usd(Some(fee.total))).green().bold());
        }
        Resolved::Unresolved(reason) => {
            field("Total", style("N/A").yellow());
            field("Reason", style(reason).dim());
        }
    }
}

fn describe_basis(basis: &FeeBasis) -> String {
    match basis {
        FeeBasis::Tabulated { breakpoint_oz } => format!("{} oz breakpoint", breakpoint_oz),
        FeeBasis::Extrapolated {
            last_breakpoint_oz,
            steps,
        } => format!("{} step(s) past {} oz", steps, last_breakpoint_oz),
        FeeBasis::PerPound {
            billable_lb,
            per_lb,
        } => format!("{} billable lb × ${:.2}", billable_lb, per_lb),
    }
}

pub(crate) fn print_advisories(advisories: &[Advisory]) {
    if advisories.is_empty() {
        return;
    }
    println!();
    for advisory in advisories {
        println!("{} {}", style("!").yellow().bold(), advisory);
    }
}
