//! CLI configuration

use std::io::IsTerminal;
use storeprobe::ProbeConfig;

use crate::commands::{ColorArg, SourceArgs};
use crate::error::CliResult;

/// CLI verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Failures and the summary only
    Quiet,
    #[default]
    Normal,
    /// Library debug logging
    Verbose,
    /// Everything
    Trace,
}

impl Verbosity {
    /// From the `-q` flag and the number of `-v` flags
    #[must_use]
    pub const fn from_flags(quiet: bool, verbose: u8) -> Self {
        if quiet {
            return Self::Quiet;
        }
        match verbose {
            0 => Self::Normal,
            1 => Self::Verbose,
            _ => Self::Trace,
        }
    }

    #[must_use]
    pub const fn is_quiet(self) -> bool {
        matches!(self, Self::Quiet)
    }

    /// Default log filter when `RUST_LOG` is unset
    #[must_use]
    pub const fn log_filter(self) -> &'static str {
        match self {
            Self::Quiet => "storeprobe=warn",
            Self::Normal => "storeprobe=info",
            Self::Verbose => "storeprobe=debug",
            Self::Trace => "storeprobe=trace",
        }
    }
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Always use colors
    Always,
    /// Use colors when output is a terminal
    #[default]
    Auto,
    /// Never use colors
    Never,
}

impl ColorChoice {
    /// Should use colors based on output detection
    #[must_use]
    pub fn should_color(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => std::io::stdout().is_terminal(),
        }
    }
}

impl From<ColorArg> for ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

/// Effective harness configuration for `source`, reading the environment
/// through `lookup`
pub fn resolve_config<F>(source: &SourceArgs, lookup: F) -> CliResult<ProbeConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match source.config {
        Some(ref path) => ProbeConfig::from_yaml_file(path)?,
        None => ProbeConfig::default(),
    }
    .with_env(lookup);

    if let Some(ref url) = source.base_url {
        config = config.with_base_url(url.clone());
    }
    if let Some(ref prefix) = source.storage_prefix {
        config = config.with_storage_prefix(prefix.clone());
    }
    if let Some(attempts) = source.max_attempts {
        config = config.with_max_attempts(attempts);
    }
    if source.headed {
        config.browser.headless = false;
    }
    if let Some(ref path) = source.chromium {
        config.browser.chromium_path = Some(path.display().to_string());
    }
    config.validate()?;
    Ok(config)
}
