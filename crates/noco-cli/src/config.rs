//! Run configuration built from parsed arguments.
//!
//! clap has already merged flags over environment variables and checked the
//! numeric ranges; this layer fills defaults, names missing required keys and
//! refuses to clone a table onto itself.

use std::fmt;
use std::time::Duration;

use noco_client::{ClientConfig, SourceTable, TableRef, TargetTable};
use noco_model::TimestampTitles;
use thiserror::Error;

use crate::cli::CloneArgs;

pub const DEFAULT_BATCH_SIZE: usize = 50;
pub const DEFAULT_PAGE_SIZE: usize = 200;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_CREATED_AT_TITLE: &str = "Created At1";
pub const DEFAULT_UPDATED_AT_TITLE: &str = "Source UpdatedAt";

/// A required setting reachable through a CLI flag and an environment variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Setting {
    pub flag: &'static str,
    pub env: &'static str,
}

impl Setting {
    const fn new(flag: &'static str, env: &'static str) -> Self {
        Self { flag, env }
    }
}

pub const BASE_URL: Setting = Setting::new("base-url", "NOCODB_URL");
pub const TOKEN: Setting = Setting::new("token", "NOCODB_TOKEN");
pub const SOURCE_BASE_ID: Setting = Setting::new("source-base-id", "SOURCE_BASE_ID");
pub const SOURCE_TABLE_ID: Setting = Setting::new("source-table-id", "SOURCE_TABLE_ID");
pub const TARGET_BASE_ID: Setting = Setting::new("target-base-id", "TARGET_BASE_ID");
pub const TARGET_TABLE_ID: Setting = Setting::new("target-table-id", "TARGET_TABLE_ID");

/// Settings a run cannot start without.
pub const REQUIRED: [Setting; 6] = [
    BASE_URL,
    TOKEN,
    SOURCE_BASE_ID,
    SOURCE_TABLE_ID,
    TARGET_BASE_ID,
    TARGET_TABLE_ID,
];

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("missing required setting {key}: pass --{flag} or set {key}")]
    Missing {
        flag: &'static str,
        key: &'static str,
    },
    #[error("source and target are the same table ({table}); refusing to overwrite the source")]
    SameTable { table: TableRef },
}

/// Everything one clone run needs.
#[derive(Clone)]
pub struct MigrationConfig {
    pub base_url: String,
    pub token: String,
    pub source: SourceTable,
    pub target: TargetTable,
    pub delete_rows: bool,
    pub delete_columns: bool,
    pub preserve_timestamps: bool,
    pub timestamp_titles: TimestampTitles,
    pub batch_size: usize,
    pub page_size: usize,
    pub request_timeout: Duration,
    pub request_delay: Duration,
}

impl MigrationConfig {
    /// Build the run configuration from parsed arguments. Blank values count
    /// as unset.
    pub fn from_args(args: &CloneArgs) -> Result<Self, ConfigError> {
        let required = |setting: Setting, value: Option<&String>| {
            present(value).ok_or(ConfigError::Missing {
                flag: setting.flag,
                key: setting.env,
            })
        };

        let base_url = required(BASE_URL, args.base_url.as_ref())?;
        let token = required(TOKEN, args.token.as_ref())?;
        let source = TableRef::new(
            required(SOURCE_BASE_ID, args.source_base_id.as_ref())?,
            required(SOURCE_TABLE_ID, args.source_table_id.as_ref())?,
        );
        let target = TableRef::new(
            required(TARGET_BASE_ID, args.target_base_id.as_ref())?,
            required(TARGET_TABLE_ID, args.target_table_id.as_ref())?,
        );
        // The meta endpoints address tables by id alone.
        if source.table_id == target.table_id {
            return Err(ConfigError::SameTable { table: target });
        }

        let timestamp_titles = TimestampTitles::new(
            present(args.created_at_title.as_ref())
                .unwrap_or_else(|| DEFAULT_CREATED_AT_TITLE.to_string()),
            present(args.updated_at_title.as_ref())
                .unwrap_or_else(|| DEFAULT_UPDATED_AT_TITLE.to_string()),
        );

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            source: SourceTable::new(source),
            target: TargetTable::new(target),
            delete_rows: !args.no_delete_rows,
            delete_columns: !args.no_delete_columns,
            preserve_timestamps: args.preserve_source_timestamps,
            timestamp_titles,
            batch_size: args.batch_size.unwrap_or(DEFAULT_BATCH_SIZE),
            page_size: args.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            request_timeout: Duration::from_secs(args.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS)),
            request_delay: args.sleep.unwrap_or(Duration::ZERO),
        })
    }

    /// Titles to copy source timestamps into, when preservation is enabled.
    pub fn preserved_timestamps(&self) -> Option<&TimestampTitles> {
        self.preserve_timestamps.then_some(&self.timestamp_titles)
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.base_url.clone(), self.token.clone())
            .with_timeout(self.request_timeout)
            .with_request_delay(self.request_delay)
    }
}

impl fmt::Debug for MigrationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrationConfig")
            .field("base_url", &self.base_url)
            .field("token", &"[REDACTED]")
            .field("source", &self.source)
            .field("target", &self.target)
            .field("delete_rows", &self.delete_rows)
            .field("delete_columns", &self.delete_columns)
            .field("preserve_timestamps", &self.preserve_timestamps)
            .field("timestamp_titles", &self.timestamp_titles)
            .field("batch_size", &self.batch_size)
            .field("page_size", &self.page_size)
            .field("request_timeout", &self.request_timeout)
            .field("request_delay", &self.request_delay)
            .finish()
    }
}

fn present(value: Option<&String>) -> Option<String> {
    value
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
