//! CLI argument definitions for the table cloner.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colorchoice_clap::Color;

#[derive(Debug, Parser)]
#[command(
    name = "nocodb-clone",
    version,
    about = "Clone a NocoDB table's schema and rows into another table",
    long_about = "Clone a NocoDB table's schema and rows into another table.\n\n\
                  The target table is cleared (rows, then non-system columns), the\n\
                  source columns are recreated on it (select options and colors\n\
                  included), and every source row is copied. The source table is\n\
                  only ever read.\n\n\
                  Every setting can also be given through the environment variable\n\
                  shown in its help (a .env file in the working directory is honoured)."
)]
pub struct Cli {
    #[command(flatten)]
    pub args: CloneArgs,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for warnings only).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(long = "log-format", value_enum, default_value = "pretty")]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// Settings of one clone run. Each value can also come from the environment
/// variable named in its help; empty variables count as unset.
#[derive(Debug, Default, Args)]
pub struct CloneArgs {
    /// NocoDB server URL.
    #[arg(long = "base-url", env = "NOCODB_URL", value_name = "URL")]
    pub base_url: Option<String>,

    /// API token sent as `xc-token`.
    #[arg(long = "token", env = "NOCODB_TOKEN", value_name = "TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Base holding the source table.
    #[arg(long = "source-base-id", env = "SOURCE_BASE_ID", value_name = "ID")]
    pub source_base_id: Option<String>,

    /// Table to copy from; never modified.
    #[arg(long = "source-table-id", env = "SOURCE_TABLE_ID", value_name = "ID")]
    pub source_table_id: Option<String>,

    /// Base holding the target table.
    #[arg(long = "target-base-id", env = "TARGET_BASE_ID", value_name = "ID")]
    pub target_base_id: Option<String>,

    /// Table to overwrite.
    #[arg(long = "target-table-id", env = "TARGET_TABLE_ID", value_name = "ID")]
    pub target_table_id: Option<String>,

    /// Keep the rows already present in the target table.
    #[arg(long = "no-delete-rows")]
    pub no_delete_rows: bool,

    /// Keep the columns already present in the target table.
    ///
    /// Source columns whose title already exists on the target will then
    /// fail to be created.
    #[arg(long = "no-delete-columns")]
    pub no_delete_columns: bool,

    /// Copy each source row's CreatedAt/UpdatedAt into dedicated target columns.
    ///
    /// NocoDB generates its own CreatedAt/UpdatedAt on insert, so the
    /// original values are kept in two extra DateTime columns instead.
    #[arg(long = "preserve-source-timestamps")]
    pub preserve_source_timestamps: bool,

    /// Title of the column receiving source CreatedAt [default: Created At1].
    #[arg(
        long = "created-at-title",
        env = "TARGET_SOURCE_CREATED_AT_TITLE",
        value_name = "TITLE"
    )]
    pub created_at_title: Option<String>,

    /// Title of the column receiving source UpdatedAt [default: Source UpdatedAt].
    #[arg(
        long = "updated-at-title",
        env = "TARGET_SOURCE_UPDATED_AT_TITLE",
        value_name = "TITLE"
    )]
    pub updated_at_title: Option<String>,

    /// Rows per bulk insert call [default: 50].
    #[arg(
        long = "batch-size",
        env = "BATCH_SIZE",
        value_name = "N",
        value_parser = parse_row_count
    )]
    pub batch_size: Option<usize>,

    /// Rows per list call when paging [default: 200].
    #[arg(
        long = "page-size",
        env = "PAGE_SIZE",
        value_name = "N",
        value_parser = parse_row_count
    )]
    pub page_size: Option<usize>,

    /// HTTP request timeout in seconds [default: 60].
    #[arg(
        long = "timeout",
        env = "REQUEST_TIMEOUT_SEC",
        value_name = "SECS",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout: Option<u64>,

    /// Pause before every request, in seconds; fractions allowed [default: 0].
    #[arg(
        long = "sleep",
        env = "SLEEP_BETWEEN_REQUESTS_SEC",
        value_name = "SECS",
        value_parser = parse_seconds
    )]
    pub sleep: Option<Duration>,
}

/// A page or batch size: a whole number of at least 1.
pub fn parse_row_count(raw: &str) -> Result<usize, String> {
    let value = raw
        .trim()
        .parse::<usize>()
        .map_err(|err| format!("invalid row count '{raw}': {err}"))?;
    if value == 0 {
        return Err("row count must be at least 1".into());
    }
    Ok(value)
}

/// A non-negative number of seconds, fractions allowed.
pub fn parse_seconds(raw: &str) -> Result<Duration, String> {
    let secs = raw
        .trim()
        .parse::<f64>()
        .map_err(|err| format!("invalid number of seconds '{raw}': {err}"))?;
    Duration::try_from_secs_f64(secs)
        .map_err(|_| format!("seconds must be a non-negative number, got {raw}"))
}

/// CLI log level choices.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
