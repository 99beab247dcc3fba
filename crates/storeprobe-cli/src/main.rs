//! Storeprobe CLI: end-to-end checks for the game storefront
//!
//! ## Usage
//!
//! ```bash
//! storeprobe list --suite cart             # Scenario names
//! storeprobe run --offline                 # Whole catalog, simulated store
//! storeprobe run --suite payment --headed  # Live, with a browser window
//! storeprobe config                        # Effective configuration
//! ```

use clap::Parser;
use std::process::ExitCode;
use storeprobe::{ScenarioId, Suite};
use storeprobe_cli::{
    init_tracing, resolve_config, Cli, CliResult, ColorChoice, Commands, ConfigArgs, ListArgs,
    ProgressReporter, RunArgs, RunOptions, TestRunner, Verbosity,
};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let verbosity = Verbosity::from_flags(cli.quiet, cli.verbose);
    init_tracing(verbosity);

    let use_color = ColorChoice::from(cli.color).should_color();
    console::set_colors_enabled(use_color);

    match cli.command {
        Commands::List(args) => {
            run_list(&args);
            Ok(())
        }
        Commands::Run(args) => run_scenarios(args, use_color, verbosity),
        Commands::Config(args) => run_config(&args),
    }
}

fn run_list(args: &ListArgs) {
    for id in ScenarioId::select(args.suite.map(Suite::from), None) {
        println!("{id}");
    }
}

fn run_config(args: &ConfigArgs) -> CliResult<()> {
    let config = resolve_config(&args.source, |key| std::env::var(key).ok())?;
    print!("{}", config.to_yaml()?);
    Ok(())
}

fn run_scenarios(args: RunArgs, use_color: bool, verbosity: Verbosity) -> CliResult<()> {
    let config = resolve_config(&args.source, |key| std::env::var(key).ok())?;
    let options = RunOptions {
        suite: args.suite.map(Suite::from),
        filter: args.filter,
        offline: args.offline,
        fail_fast: args.fail_fast,
        format: args.format,
    };
    let reporter = ProgressReporter::new(use_color, verbosity.is_quiet());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let mut runner = TestRunner::new(config, options, reporter);
    runtime.block_on(runner.run())?;
    Ok(())
}
