//! CLI command definitions using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use storeprobe::Suite;

use crate::output::OutputFormat;

/// Storeprobe: run the storefront scenario catalog against a live store or offline
#[derive(Parser, Debug)]
#[command(name = "storeprobe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List scenario names
    List(ListArgs),

    /// Run scenarios
    Run(RunArgs),

    /// Show the effective configuration as YAML
    Config(ConfigArgs),
}

/// Storefront screen a scenario belongs to
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SuiteArg {
    Home,
    Cart,
    Payment,
    Orders,
    Login,
}

impl From<SuiteArg> for Suite {
    fn from(arg: SuiteArg) -> Self {
        match arg {
            SuiteArg::Home => Self::Home,
            SuiteArg::Cart => Self::Cart,
            SuiteArg::Payment => Self::Payment,
            SuiteArg::Orders => Self::Orders,
            SuiteArg::Login => Self::Login,
        }
    }
}

/// Color choice argument
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum ColorArg {
    /// Detect from the terminal
    #[default]
    Auto,
    /// Always color
    Always,
    /// Never color
    Never,
}

/// Where the configuration comes from, lowest to highest: defaults, the
/// YAML file, the environment, these flags
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// YAML configuration file
    #[arg(short, long, env = "STOREPROBE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Storefront base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Prefix of the storefront's local storage keys
    #[arg(long)]
    pub storage_prefix: Option<String>,

    /// Attempts per interaction
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Chromium executable
    #[arg(long)]
    pub chromium: Option<PathBuf>,
}

/// Arguments for the list command
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only list this suite
    #[arg(short, long)]
    pub suite: Option<SuiteArg>,
}

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Only run this suite
    #[arg(short, long)]
    pub suite: Option<SuiteArg>,

    /// Only run scenarios whose name contains this text
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Run against the built-in simulated storefront
    #[arg(long)]
    pub offline: bool,

    /// Stop at the first failing scenario
    #[arg(long)]
    pub fail_fast: bool,

    /// Report format
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,

    #[command(flatten)]
    pub source: SourceArgs,
}

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}
