use noco_client::{SourceTable, TargetTable};

/// Outcome of a completed clone run.
#[derive(Debug)]
pub struct CloneReport {
    pub source: SourceTable,
    pub target: TargetTable,
    /// Source columns skipped as system or primary key.
    pub skipped_columns: Vec<String>,
    pub created_columns: Vec<String>,
    /// Preserved-timestamp columns created on the target.
    pub timestamp_columns: Vec<String>,
    pub deletions: DeletionReport,
    pub rows_fetched: usize,
    pub write: WriteReport,
    pub counts: RowCounts,
}

impl CloneReport {
    /// Target row count expected after writing: rows that were already
    /// there plus the inserted ones.
    pub fn expected_target_rows(&self) -> Option<u64> {
        self.counts
            .target_before
            .map(|before| before + self.write.inserted as u64)
    }

    pub fn target_count_mismatch(&self) -> bool {
        match (self.expected_target_rows(), self.counts.target_after) {
            (Some(expected), Some(after)) => expected != after,
            _ => false,
        }
    }

    /// The source reported a different total than the rows paged through.
    pub fn source_count_mismatch(&self) -> bool {
        self.counts
            .source_reported
            .is_some_and(|total| total != self.rows_fetched as u64)
    }

    pub fn has_warnings(&self) -> bool {
        !self.deletions.failures.is_empty()
            || self.target_count_mismatch()
            || self.source_count_mismatch()
    }
}

/// `pageInfo.totalRows` readings taken during a run; `None` when the read
/// failed or the server did not report a total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowCounts {
    /// Source total seen while paging.
    pub source_reported: Option<u64>,
    /// Target total right before the insert.
    pub target_before: Option<u64>,
    /// Target total after the insert.
    pub target_after: Option<u64>,
}

/// What kind of target object a deletion touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionKind {
    Row,
    Column,
}

impl DeletionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Row => "row",
            Self::Column => "column",
        }
    }
}

/// A delete call that failed; the run continued without it.
#[derive(Debug, Clone)]
pub struct DeletionFailure {
    pub kind: DeletionKind,
    /// Row id, or column title and id.
    pub item: String,
    pub error: String,
}

#[derive(Debug, Default)]
pub struct DeletionReport {
    pub rows_deleted: usize,
    pub columns_deleted: usize,
    pub failures: Vec<DeletionFailure>,
}

impl DeletionReport {
    pub fn merge(&mut self, other: Self) {
        self.rows_deleted += other.rows_deleted;
        self.columns_deleted += other.columns_deleted;
        self.failures.extend(other.failures);
    }
}

/// Which endpoint carried the rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertMode {
    Bulk,
    PerRow,
    /// The source had no rows.
    Skipped,
}

impl InsertMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bulk => "bulk",
            Self::PerRow => "per-row",
            Self::Skipped => "skipped",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteReport {
    pub inserted: usize,
    pub mode: InsertMode,
}
