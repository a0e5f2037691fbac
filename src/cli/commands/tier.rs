//! `fbacalc tier` command - size tier classification only

use console::style;
use miette::Result;
use serde::Serialize;

use crate::cli::inputs::PackageArgs;
use crate::cli::output::{effective_format, field, heading};
use crate::cli::helpers::print_structured;
use crate::cli::GlobalOpts;
use crate::core::tier::{classify, girth_sum, Classification};
use crate::core::units::{normalize, NormalizedPackage};

#[derive(clap::Args, Debug)]
pub struct TierArgs {
    #[command(flatten)]
    pub package: PackageArgs,
}

#[derive(Serialize)]
struct TierReport {
    normalized: NormalizedPackage,
    girth_sum_in: f64,
    classification: Classification,
}

/// Run the tier command
pub fn run(args: TierArgs, global: &GlobalOpts) -> Result<()> {
    let normalized = normalize(&args.package.to_spec());
    let classification = classify(&normalized);
    let report = TierReport {
        normalized,
        girth_sum_in: girth_sum(&normalized),
        classification,
    };

    if print_structured(&report, effective_format(global.format))? {
        return Ok(());
    }

    print_package(&report.normalized, report.girth_sum_in, &report.classification);
    Ok(())
}

/// Package and tier section shared by the text views
pub(crate) fn print_package(
    normalized: &NormalizedPackage,
    girth_sum_in: f64,
    classification: &Classification,
) {
    let [l, w, h] = normalized.sorted_dims();
    heading("Package");
    field("Dimensions", format!("{:.2} × {:.2} × {:.2} in", l, w, h));
    field("Girth-sum", format!("{:.2} in", girth_sum_in));
    field("Actual weight", format!("{:.2} oz", normalized.weight_oz));
    field(
        "Volumetric weight",
        format!("{:.2} lb", classification.volumetric_weight_lb),
    );

    heading("Size tier");
    field("Tier", style(classification.tier.label()).cyan());
    if classification.provisional_tier != classification.tier {
        field(
            "Provisional tier",
            style(classification.provisional_tier.label()).dim(),
        );
    }
    let basis = if classification.used_volumetric(normalized.weight_oz) {
        "volumetric"
    } else {
        "actual"
    };
    field(
        "Shipping weight",
        format!(
            "{:.2} oz ({:.2} lb, {})",
            classification.shipping_weight_oz,
            classification.shipping_weight_lb(),
            basis
        ),
    );
}
