//! `fbacalc rates` command - inspect and validate rate tables

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::cli::helpers::{load_engine, print_structured};
use crate::cli::output::{effective_format, field, heading, rule, table};
use crate::cli::GlobalOpts;
use crate::core::tier::SizeTier;
use crate::core::Config;
use crate::rates::{
    PerPoundRate, PriceBand, ProductType, RateError, RateFile, RateTable, RateTableKey,
    ReferralCatalogue, Season, StandardTierRates,
};
use crate::yaml::is_yaml_path;

#[derive(Subcommand, Debug)]
pub enum RatesCommands {
    /// List registered rate tables
    List,

    /// Show the tables of one schedule version
    Show(ShowArgs),

    /// Validate rate table or referral catalogue files
    Validate(ValidateArgs),
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Schedule version, e.g. 2025
    #[arg(id = "schedule", value_name = "VERSION")]
    pub schedule: String,

    /// Only this product type
    #[arg(long, short = 't')]
    pub product_type: Option<ProductType>,

    /// Only this season
    #[arg(long, short = 's')]
    pub season: Option<Season>,
}

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    /// Files or directories to validate
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

/// Run a rates subcommand
pub fn run(cmd: RatesCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        RatesCommands::List => run_list(global),
        RatesCommands::Show(args) => run_show(args, global),
        RatesCommands::Validate(args) => run_validate(args),
    }
}

#[derive(Serialize)]
struct TableSummary<'a> {
    key: &'a RateTableKey,
    lithium_battery_surcharge: f64,
    small_standard_breakpoints: usize,
    large_standard_breakpoints: usize,
    super_oversize_bands: usize,
}

fn run_list(global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let engine = load_engine(&config)?;
    let registry = engine.rates();

    let summaries: Vec<TableSummary> = registry
        .keys()
        .filter_map(|key| {
            registry.get(key).map(|t| TableSummary {
                key,
                lithium_battery_surcharge: t.lithium_battery_surcharge,
                small_standard_breakpoints: t.small_standard.breakpoints_oz.len(),
                large_standard_breakpoints: t.large_standard.breakpoints_oz.len(),
                super_oversize_bands: t.super_oversize.len(),
            })
        })
        .collect();

    if print_structured(&summaries, effective_format(global.format))? {
        return Ok(());
    }

    let rows = summaries
        .iter()
        .map(|s| {
            vec![
                s.key.version.clone(),
                s.key.product_type.to_string(),
                s.key.season.to_string(),
                format!("${:.2}", s.lithium_battery_surcharge),
                s.small_standard_breakpoints.to_string(),
                s.large_standard_breakpoints.to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        table(
            &[
                "Version",
                "Product type",
                "Season",
                "Lithium",
                "Small std pts",
                "Large std pts",
            ],
            rows,
            3,
        )
    );
    println!(
        "{} table(s), versions: {}",
        style(summaries.len()).cyan(),
        registry.versions().into_iter().collect::<Vec<_>>().join(", ")
    );
    Ok(())
}

#[derive(Serialize)]
struct ShownTable<'a> {
    key: &'a RateTableKey,
    table: &'a RateTable,
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let engine = load_engine(&config)?;
    let registry = engine.rates();

    let shown: Vec<ShownTable> = registry
        .keys()
        .filter(|k| k.version == args.schedule)
        .filter(|k| args.product_type.map_or(true, |p| k.product_type == p))
        .filter(|k| args.season.map_or(true, |s| k.season == s))
        .filter_map(|key| registry.get(key).map(|table| ShownTable { key, table }))
        .collect();

    if shown.is_empty() {
        let versions = registry.versions().into_iter().collect::<Vec<_>>().join(", ");
        return Err(miette::miette!(
            help = format!("Known versions: {}", versions),
            "No rate tables match version '{}'",
            args.schedule
        ));
    }

    if print_structured(&shown, effective_format(global.format))? {
        return Ok(());
    }

    for ShownTable { key, table: t } in &shown {
        println!();
        rule();
        println!("{} {}", style("Rate table").bold(), style(key).cyan());
        rule();
        field("Lithium surcharge", format!("${:.2}", t.lithium_battery_surcharge));
        print_standard(SizeTier::SmallStandard, &t.small_standard);
        print_standard(SizeTier::LargeStandard, &t.large_standard);

        heading("Oversize");
        let mut rows = vec![
            per_pound_row(SizeTier::SmallOversize.label().to_string(), &t.small_oversize),
            per_pound_row(SizeTier::LargeOversize.label().to_string(), &t.large_oversize),
        ];
        for band in &t.super_oversize {
            let label = match band.max_lb {
                Some(max) => format!("{} ≤{} lb", SizeTier::SuperOversize.label(), max),
                None => format!("{} above", SizeTier::SuperOversize.label()),
            };
            rows.push(per_pound_row(label, &band.rate));
        }
        println!("{}", table(&band_header("Tier", &["Start lb", "Per lb"]), rows, 1));
    }
    Ok(())
}

fn band_header<'a>(first: &'a str, extra: &[&'a str]) -> Vec<&'a str> {
    let mut header = vec![first];
    header.extend(PriceBand::all().iter().map(|b| b.label()));
    header.extend_from_slice(extra);
    header
}

fn per_pound_row(label: String, rate: &PerPoundRate) -> Vec<String> {
    let mut row = vec![label];
    row.extend(rate.base.iter().map(|(_, v)| format!("${:.2}", v)));
    row.push(format!("{}", rate.start_lb));
    row.push(format!("${:.2}", rate.per_lb));
    row
}

fn print_standard(tier: SizeTier, rates: &StandardTierRates) {
    heading(tier.label());
    let mut rows: Vec<Vec<String>> = rates
        .breakpoints_oz
        .iter()
        .enumerate()
        .map(|(i, bp)| {
            let mut row = vec![format!("≤ {} oz", bp)];
            row.extend(
                rates
                    .fees
                    .iter()
                    .map(|(_, fees)| fees.get(i).map_or("-".to_string(), |f| format!("${:.2}", f))),
            );
            row
        })
        .collect();
    if let Some(post) = &rates.post_breakpoint {
        let mut row = vec![format!("+ per step ${:.2}", post.increment)];
        row.extend(post.base.iter().map(|(_, v)| format!("${:.2}", v)));
        rows.push(row);
    }
    println!("{}", table(&band_header("Weight", &[]), rows, 1));
}

/// Validation outcome for one file
enum FileKind {
    Rates(usize),
    Catalogue(usize),
}

fn validate_file(path: &Path) -> std::result::Result<FileKind, RateError> {
    let content = std::fs::read_to_string(path).map_err(|source| RateError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let name = path.display().to_string();
    let is_catalogue = serde_yml::from_str::<serde_yml::Value>(&content)
        .ok()
        .and_then(|v| v.get("categories").map(|_| ()))
        .is_some();

    if is_catalogue {
        ReferralCatalogue::parse(&content, &name).map(|c| FileKind::Catalogue(c.len()))
    } else {
        RateFile::parse(&content, &name).map(|f| FileKind::Rates(f.tables.len()))
    }
}

fn expand_paths(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut found: Vec<PathBuf> = std::fs::read_dir(path)
                .into_diagnostic()?
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| is_yaml_path(p))
                .collect();
            found.sort();
            files.extend(found);
        } else {
            files.push(path.clone());
        }
    }
    Ok(files)
}

fn run_validate(args: ValidateArgs) -> Result<()> {
    let files = expand_paths(&args.paths)?;
    println!(
        "{} Validating {} file(s)...\n",
        style("→").blue(),
        files.len()
    );

    let mut failed = 0;
    for path in &files {
        match validate_file(path) {
            Ok(FileKind::Rates(n)) => {
                println!("{} {} ({} tables)", style("✓").green(), path.display(), n)
            }
            Ok(FileKind::Catalogue(n)) => {
                println!("{} {} ({} categories)", style("✓").green(), path.display(), n)
            }
            Err(e) => {
                failed += 1;
                println!("{} {}", style("✗").red(), path.display());
                let report = miette::Report::new(e);
                println!("{:?}", report);
            }
        }
    }

    println!();
    match failed {
        0 => {
            println!("{} All files passed validation!", style("✓").green().bold());
            Ok(())
        }
        1 => Err(miette::miette!("Validation failed: 1 file has errors")),
        n => Err(miette::miette!("Validation failed: {} files have errors", n)),
    }
}
