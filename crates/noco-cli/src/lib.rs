//! Library side of the `nocodb-clone` command.
//!
//! [`pipeline::run`] drives a clone against any [`noco_client::NocoApi`];
//! the binary only resolves configuration, sets up logging and prints the
//! summary.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod migrate;
pub mod pipeline;
pub mod reconcile;
pub mod replicate;
pub mod types;

pub use config::{ConfigError, MigrationConfig};
pub use error::{CloneError, Stage};
pub use pipeline::run;
pub use types::{
    CloneReport, DeletionFailure, DeletionKind, DeletionReport, InsertMode, RowCounts, WriteReport,
};
