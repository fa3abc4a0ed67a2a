//! NocoDB table clone CLI.

use std::io::{self, IsTerminal};

use anyhow::Result;
use clap::{ColorChoice, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use noco_cli::cli::{Cli, CloneArgs, LogFormatArg, LogLevelArg};
use noco_cli::logging::{LogConfig, LogFormat, init_logging};
use noco_cli::{CloneError, CloneReport, MigrationConfig};
use noco_client::NocoClient;
use tracing::level_filters::LevelFilter;
use tracing::{debug, error};

mod summary;

use crate::summary::print_summary;

fn main() {
    // Values already in the environment take precedence over the file.
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match run(&cli.args) {
        Ok(report) => {
            print_summary(&report);
            0
        }
        Err(error) => {
            if let Some(clone_error) = error.downcast_ref::<CloneError>() {
                error!(stage = %clone_error.stage(), status = clone_error.status(), "clone failed");
            }
            eprintln!("error: {error}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn run(args: &CloneArgs) -> Result<CloneReport> {
    let config = MigrationConfig::from_args(args).map_err(CloneError::from)?;
    debug!(?config, "resolved configuration");
    let client = NocoClient::new(&config.client_config())?;
    let progress = progress_bar();
    let report = noco_cli::run(&client, &config, &progress)?;
    Ok(report)
}

/// Row progress on stderr; hidden when stderr is not a terminal.
fn progress_bar() -> ProgressBar {
    if !io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let style = ProgressStyle::with_template(
        "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} rows ({eta})",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("#>-");
    ProgressBar::new(0).with_style(style)
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
