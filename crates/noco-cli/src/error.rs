//! Fatal errors of a clone run, tagged with the stage that produced them.

use std::fmt;

use noco_client::{ApiError, TargetTable};
use noco_model::ModelError;
use thiserror::Error;

use crate::config::ConfigError;

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Configuring,
    FetchingSchema,
    ReconcilingTarget,
    ReplicatingSchema,
    FetchingData,
    WritingData,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Configuring => "configuring",
            Self::FetchingSchema => "fetching schema",
            Self::ReconcilingTarget => "reconciling target",
            Self::ReplicatingSchema => "replicating schema",
            Self::FetchingData => "fetching data",
            Self::WritingData => "writing data",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure that ends the run.
#[derive(Debug, Error)]
pub enum CloneError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{stage}: {source}")]
    Api {
        stage: Stage,
        #[source]
        source: ApiError,
    },

    /// A source column cannot be recreated; raised before the target is touched.
    #[error("schema translation failed: {0}")]
    Translation(#[from] ModelError),

    #[error("failed to create column '{title}' on {table}: {source}")]
    CreateColumn {
        title: String,
        table: TargetTable,
        #[source]
        source: ApiError,
    },

    #[error("Bulk insert failed at offset {offset}: {source}")]
    BulkInsert {
        offset: usize,
        #[source]
        source: ApiError,
    },

    #[error("Row insert failed at row {row}: {source}")]
    RowInsert {
        /// 1-based position in the source row list.
        row: usize,
        #[source]
        source: ApiError,
    },
}

impl CloneError {
    pub fn api(stage: Stage, source: ApiError) -> Self {
        Self::Api { stage, source }
    }

    /// Stage the run was in when it failed.
    pub fn stage(&self) -> Stage {
        match self {
            Self::Config(_) => Stage::Configuring,
            Self::Api { stage, .. } => *stage,
            Self::Translation(_) => Stage::FetchingSchema,
            Self::CreateColumn { .. } => Stage::ReplicatingSchema,
            Self::BulkInsert { .. } | Self::RowInsert { .. } => Stage::WritingData,
        }
    }

    /// HTTP status of the underlying API failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { source, .. }
            | Self::CreateColumn { source, .. }
            | Self::BulkInsert { source, .. }
            | Self::RowInsert { source, .. } => source.status(),
            Self::Config(_) | Self::Translation(_) => None,
        }
    }
}
