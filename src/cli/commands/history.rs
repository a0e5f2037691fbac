//! `fbacalc history` command - saved calculations

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{load_engine, print_structured};
use crate::cli::output::{effective_format, pct, table, usd};
use crate::cli::GlobalOpts;
use crate::core::history::HistoryStore;
use crate::core::Config;

#[derive(Subcommand, Debug)]
pub enum HistoryCommands {
    /// List saved calculations, newest first
    List,

    /// Show a saved calculation, recomputed with current rate tables
    Show(ShowArgs),

    /// Delete all saved calculations
    Clear,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Position in the list (1 is the newest)
    pub position: usize,
}

/// Run a history subcommand
pub fn run(cmd: HistoryCommands, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let store = HistoryStore::new(&config.history_file);

    match cmd {
        HistoryCommands::List => run_list(&store, global),
        HistoryCommands::Show(args) => run_show(args, &store, &config, global),
        HistoryCommands::Clear => run_clear(&store),
    }
}

fn run_list(store: &HistoryStore, global: &GlobalOpts) -> Result<()> {
    let history = store.load()?;

    if print_structured(&history, effective_format(global.format))? {
        return Ok(());
    }

    if history.is_empty() {
        println!("No saved calculations.");
        return Ok(());
    }

    let rows = history
        .entries()
        .iter()
        .enumerate()
        .map(|(i, e)| {
            vec![
                (i + 1).to_string(),
                e.timestamp.format("%Y-%m-%d %H:%M").to_string(),
                e.summary.tier.label().to_string(),
                usd(Some(e.input.price)),
                usd(e.summary.fulfillment_fee),
                usd(e.summary.referral_fee),
                usd(e.summary.net_profit),
                pct(e.summary.margin),
            ]
        })
        .collect();
    println!(
        "{}",
        table(
            &[
                "#",
                "Saved",
                "Tier",
                "Price",
                "Fulfillment",
                "Referral",
                "Net profit",
                "Margin",
            ],
            rows,
            3,
        )
    );
    Ok(())
}

fn run_show(
    args: ShowArgs,
    store: &HistoryStore,
    config: &Config,
    global: &GlobalOpts,
) -> Result<()> {
    let history = store.load()?;
    let entry = history.get(args.position).ok_or_else(|| {
        miette::miette!(
            "No saved calculation at position {} ({} saved)",
            args.position,
            history.len()
        )
    })?;

    if print_structured(entry, effective_format(global.format))? {
        return Ok(());
    }

    println!(
        "{} {}",
        style("Saved").dim(),
        style(entry.timestamp.format("%Y-%m-%d %H:%M:%S UTC")).dim()
    );
    let engine = load_engine(config)?;
    let result = engine.calculate(&entry.input);
    super::calc::print_result(&entry.input, &result);
    Ok(())
}

fn run_clear(store: &HistoryStore) -> Result<()> {
    let removed = store.clear()?;
    println!(
        "{} Cleared {} saved calculation(s)",
        style("✓").green(),
        removed
    );
    Ok(())
}
