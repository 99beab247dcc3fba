//! Storeprobe CLI library
//!
//! Command-line runner for the Storeprobe scenario catalog: against a live
//! storefront through Chromium, or offline against the simulated storefront.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod commands;
mod config;
mod error;
mod logging;
mod output;
mod runner;

pub use commands::{Cli, ColorArg, Commands, ConfigArgs, ListArgs, RunArgs, SourceArgs, SuiteArg};
pub use config::{resolve_config, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use logging::init_tracing;
pub use output::{render_json, OutputFormat, ProgressReporter};
pub use runner::{select, RunOptions, TestRunner};
