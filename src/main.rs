use clap::Parser;
use miette::Result;
use fbacalc::cli::{Cli, Commands};
use fbacalc::cli::commands::{calc, fee, history, rates, referral, sensitivity, tier};

fn main() -> Result<()> {
    // Install miette's fancy error handler for beautiful diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    fbacalc::logging::init(cli.global.verbose);

    let global = &cli.global;
    match cli.command {
        Commands::Calc(args) => calc::run(args, global),
        Commands::Tier(args) => tier::run(args, global),
        Commands::Fee(args) => fee::run(args, global),
        Commands::Referral(args) => referral::run(args, global),
        Commands::Sensitivity(args) => sensitivity::run(args, global),
        Commands::Rates(cmd) => rates::run(cmd, global),
        Commands::History(cmd) => history::run(cmd, global),
    }
}
