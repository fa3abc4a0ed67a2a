//! Clearing the target table before the schema is recreated.
//!
//! Every delete is attempted independently. A failed delete is logged and
//! recorded in the [`DeletionReport`]; only a failure to list the target
//! stops the stage.

use std::collections::HashSet;

use noco_client::{ApiError, NocoApi, TargetTable};
use noco_model::{RowId, TableMeta};
use tracing::{debug, info, warn};

use crate::types::{DeletionFailure, DeletionKind, DeletionReport};

/// Deleted-row count between two progress log lines.
const ROW_PROGRESS_INTERVAL: usize = 50;

/// Delete every row of the target table.
///
/// Deleting shifts the remaining rows forward, so the table is re-read from
/// the current offset after each page. The offset only advances past pages
/// on which nothing could be deleted.
pub fn delete_rows<A>(
    api: &A,
    target: &TargetTable,
    page_size: usize,
) -> Result<DeletionReport, ApiError>
where
    A: NocoApi + ?Sized,
{
    let mut report = DeletionReport::default();
    let mut failed: HashSet<RowId> = HashSet::new();
    let mut offset = 0;

    loop {
        let page = api.list_rows(target.table(), offset, page_size)?;
        if page.list.is_empty() {
            break;
        }
        let fetched = page.list.len();
        let mut progressed = false;

        for row in &page.list {
            let Some(row_id) = row.id() else {
                debug!("target row without id, skipping");
                continue;
            };
            if failed.contains(&row_id) {
                continue;
            }
            match api.delete_row(target, &row_id) {
                Ok(()) => {
                    progressed = true;
                    report.rows_deleted += 1;
                    if report.rows_deleted % ROW_PROGRESS_INTERVAL == 0 {
                        info!(deleted = report.rows_deleted, "deleting target rows");
                    }
                }
                Err(error) => {
                    warn!(row_id = %row_id, %error, "failed to delete target row");
                    report.failures.push(DeletionFailure {
                        kind: DeletionKind::Row,
                        item: row_id.to_string(),
                        error: error.to_string(),
                    });
                    failed.insert(row_id);
                }
            }
        }

        if !progressed {
            if page.is_last(offset, page_size) {
                break;
            }
            offset += fetched;
        }
    }

    info!(
        deleted = report.rows_deleted,
        failed = report.failures.len(),
        "target rows cleared"
    );
    Ok(report)
}

/// Delete every non-system, non-primary-key column of the target table.
pub fn delete_columns<A>(api: &A, target: &TargetTable, meta: &TableMeta) -> DeletionReport
where
    A: NocoApi + ?Sized,
{
    let mut report = DeletionReport::default();

    for column in meta.replicable_columns() {
        let Some(column_id) = column.id.as_deref() else {
            debug!(title = %column.title, "target column without id, skipping");
            continue;
        };
        match api.delete_column(target, column_id) {
            Ok(()) => {
                debug!(title = %column.title, "deleted target column");
                report.columns_deleted += 1;
            }
            Err(error) => {
                warn!(title = %column.title, column_id, %error, "failed to delete target column");
                report.failures.push(DeletionFailure {
                    kind: DeletionKind::Column,
                    item: format!("{} ({column_id})", column.title),
                    error: error.to_string(),
                });
            }
        }
    }

    info!(
        deleted = report.columns_deleted,
        failed = report.failures.len(),
        "target columns cleared"
    );
    report
}
