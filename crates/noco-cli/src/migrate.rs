//! Copying rows from the source table into the target table.

use indicatif::ProgressBar;
use noco_client::{ApiError, NocoApi, SourceTable, TargetTable};
use noco_model::{RowRecord, TimestampTitles};
use tracing::{debug, info, warn};

use crate::error::CloneError;
use crate::types::{InsertMode, WriteReport};

/// Source rows plus the total the source reported while paging.
#[derive(Debug, Clone, Default)]
pub struct SourceRows {
    pub rows: Vec<RowRecord>,
    pub reported_total: Option<u64>,
}

/// Read every source row, page by page, in API order.
///
/// Paging stops on an empty page or when the page info says no rows
/// follow. A page shorter than `page_size` only ends paging when the source
/// reports neither `isLastPage` nor `totalRows`, since servers cap `limit`.
pub fn fetch_rows<A>(
    api: &A,
    source: &SourceTable,
    page_size: usize,
) -> Result<SourceRows, ApiError>
where
    A: NocoApi + ?Sized,
{
    let mut fetched_rows = SourceRows::default();
    let mut offset = 0;
    loop {
        let page = api.list_rows(source.table(), offset, page_size)?;
        let fetched = page.list.len();
        let last = page.is_last(offset, page_size);
        debug!(offset, fetched, last, "fetched source page");
        if let Some(total) = page.total_rows() {
            fetched_rows.reported_total = Some(total);
        }
        fetched_rows.rows.extend(page.list);
        if last {
            break;
        }
        offset += fetched;
    }
    info!(
        rows = fetched_rows.rows.len(),
        reported = ?fetched_rows.reported_total,
        "fetched source rows"
    );
    Ok(fetched_rows)
}

/// Insert payloads for `rows`: system fields removed, source timestamps
/// copied under `timestamps` when given.
pub fn clean_rows(rows: &[RowRecord], timestamps: Option<&TimestampTitles>) -> Vec<RowRecord> {
    rows.iter()
        .map(|row| row.to_insert_payload(timestamps))
        .collect()
}

/// Insert `rows` into the target in order.
///
/// The first row probes the bulk endpoint. If the probe succeeds the rest
/// goes in batches of `batch_size`; otherwise every row is posted on its own.
/// Any failure after the probe is fatal.
pub fn write_rows<A>(
    api: &A,
    target: &TargetTable,
    rows: &[RowRecord],
    batch_size: usize,
    progress: &ProgressBar,
) -> Result<WriteReport, CloneError>
where
    A: NocoApi + ?Sized,
{
    let Some(first) = rows.first() else {
        info!("source table is empty, nothing to insert");
        return Ok(WriteReport {
            inserted: 0,
            mode: InsertMode::Skipped,
        });
    };
    progress.set_length(rows.len() as u64);
    progress.set_position(0);

    match api.insert_rows(target, std::slice::from_ref(first)) {
        Ok(()) => {
            progress.inc(1);
            let mut offset = 1;
            for batch in rows[1..].chunks(batch_size.max(1)) {
                api.insert_rows(target, batch)
                    .map_err(|source| CloneError::BulkInsert { offset, source })?;
                offset += batch.len();
                progress.inc(batch.len() as u64);
                debug!(inserted = offset, "bulk batch inserted");
            }
            info!(inserted = rows.len(), "rows inserted in bulk");
            Ok(WriteReport {
                inserted: rows.len(),
                mode: InsertMode::Bulk,
            })
        }
        Err(error) => {
            warn!(%error, "bulk insert unavailable, inserting row by row");
            for (index, row) in rows.iter().enumerate() {
                api.insert_row(target, row)
                    .map_err(|source| CloneError::RowInsert {
                        row: index + 1,
                        source,
                    })?;
                progress.inc(1);
            }
            info!(inserted = rows.len(), "rows inserted one by one");
            Ok(WriteReport {
                inserted: rows.len(),
                mode: InsertMode::PerRow,
            })
        }
    }
}

/// Row count the target reports in `pageInfo.totalRows`.
pub fn count_target_rows<A>(api: &A, target: &TargetTable) -> Result<Option<u64>, ApiError>
where
    A: NocoApi + ?Sized,
{
    Ok(api.list_rows(target.table(), 0, 1)?.total_rows())
}
