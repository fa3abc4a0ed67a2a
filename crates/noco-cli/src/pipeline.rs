//! Table clone pipeline with explicit stages.
//!
//! The pipeline follows these stages in order:
//! 1. **Fetch schema**: read the source columns and translate them into
//!    creation payloads; nothing on the target has been touched yet
//! 2. **Reconcile target**: delete target rows, then target columns
//! 3. **Replicate schema**: create the source columns on the target
//! 4. **Fetch data**: page through the source rows
//! 5. **Write data**: clear rows again, count the target, insert the
//!    cleaned rows and check the count against what was expected
//!
//! Every stage runs inside an `info_span!` named after it; a fatal error
//! carries its [`Stage`].

use std::time::Instant;

use indicatif::ProgressBar;
use noco_client::{NocoApi, TargetTable};
use noco_model::RowRecord;
use tracing::{info, info_span, warn};

use crate::config::MigrationConfig;
use crate::error::{CloneError, Stage};
use crate::migrate::{SourceRows, clean_rows, count_target_rows, fetch_rows, write_rows};
use crate::reconcile::{delete_columns, delete_rows};
use crate::replicate::{SchemaPlan, create_columns, ensure_timestamp_columns, plan_schema};
use crate::types::{CloneReport, DeletionReport, RowCounts, WriteReport};

/// Run one clone from `config.source` into `config.target`.
pub fn run<A>(
    api: &A,
    config: &MigrationConfig,
    progress: &ProgressBar,
) -> Result<CloneReport, CloneError>
where
    A: NocoApi + ?Sized,
{
    let started = Instant::now();
    info!(source = %config.source, target = %config.target, "starting table clone");

    let plan = fetch_schema(api, config)?;
    let mut deletions = reconcile_target(api, config)?;
    let (created_columns, timestamp_columns) = replicate_schema(api, config, &plan)?;

    let source_rows = fetch_data(api, config)?;
    let mut counts = RowCounts {
        source_reported: source_rows.reported_total,
        ..RowCounts::default()
    };
    let write = write_data(
        api,
        config,
        &source_rows.rows,
        &mut deletions,
        &mut counts,
        progress,
    )?;

    info!(
        rows = write.inserted,
        mode = write.mode.as_str(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "table clone complete"
    );

    Ok(CloneReport {
        source: config.source.clone(),
        target: config.target.clone(),
        skipped_columns: plan.skipped,
        created_columns,
        timestamp_columns,
        deletions,
        rows_fetched: source_rows.rows.len(),
        write,
        counts,
    })
}

// ============================================================================
// Stage 1: Fetch schema
// ============================================================================

fn fetch_schema<A>(api: &A, config: &MigrationConfig) -> Result<SchemaPlan, CloneError>
where
    A: NocoApi + ?Sized,
{
    let _span = info_span!("fetch_schema", table = %config.source).entered();
    let meta = api
        .table_meta(config.source.table())
        .map_err(|source| CloneError::api(Stage::FetchingSchema, source))?;
    let plan = plan_schema(&meta)?;
    info!(
        columns = meta.columns.len(),
        replicable = plan.columns.len(),
        "source schema loaded"
    );
    Ok(plan)
}

// ============================================================================
// Stage 2: Reconcile target
// ============================================================================

fn reconcile_target<A>(api: &A, config: &MigrationConfig) -> Result<DeletionReport, CloneError>
where
    A: NocoApi + ?Sized,
{
    let _span = info_span!("reconcile_target", table = %config.target).entered();
    let mut report = DeletionReport::default();

    if config.delete_rows {
        let rows = delete_rows(api, &config.target, config.page_size)
            .map_err(|source| CloneError::api(Stage::ReconcilingTarget, source))?;
        report.merge(rows);
    } else {
        info!("keeping existing target rows");
    }

    if config.delete_columns {
        let meta = api
            .table_meta(config.target.table())
            .map_err(|source| CloneError::api(Stage::ReconcilingTarget, source))?;
        report.merge(delete_columns(api, &config.target, &meta));
    } else {
        info!("keeping existing target columns");
    }

    Ok(report)
}

// ============================================================================
// Stage 3: Replicate schema
// ============================================================================

fn replicate_schema<A>(
    api: &A,
    config: &MigrationConfig,
    plan: &SchemaPlan,
) -> Result<(Vec<String>, Vec<String>), CloneError>
where
    A: NocoApi + ?Sized,
{
    let _span = info_span!("replicate_schema", table = %config.target).entered();
    let created = create_columns(api, &config.target, plan)?;
    let timestamps = match config.preserved_timestamps() {
        Some(titles) => ensure_timestamp_columns(api, &config.target, titles)?,
        None => Vec::new(),
    };
    Ok((created, timestamps))
}

// ============================================================================
// Stage 4: Fetch data
// ============================================================================

fn fetch_data<A>(api: &A, config: &MigrationConfig) -> Result<SourceRows, CloneError>
where
    A: NocoApi + ?Sized,
{
    let _span = info_span!("fetch_data", table = %config.source).entered();
    let fetched = fetch_rows(api, &config.source, config.page_size)
        .map_err(|source| CloneError::api(Stage::FetchingData, source))?;
    if let Some(total) = fetched.reported_total
        && total != fetched.rows.len() as u64
    {
        warn!(
            fetched = fetched.rows.len(),
            reported = total,
            "source row count differs from fetched rows"
        );
    }
    Ok(fetched)
}

// ============================================================================
// Stage 5: Write data
// ============================================================================

fn write_data<A>(
    api: &A,
    config: &MigrationConfig,
    rows: &[RowRecord],
    deletions: &mut DeletionReport,
    counts: &mut RowCounts,
    progress: &ProgressBar,
) -> Result<WriteReport, CloneError>
where
    A: NocoApi + ?Sized,
{
    let _span = info_span!("write_data", table = %config.target).entered();

    // Schema changes can leave placeholder rows behind on some servers.
    if config.delete_rows {
        info!("clearing target rows again before insert");
        let again = delete_rows(api, &config.target, config.page_size)
            .map_err(|source| CloneError::api(Stage::WritingData, source))?;
        deletions.merge(again);
    }
    counts.target_before = read_target_count(api, &config.target);

    let payloads = clean_rows(rows, config.preserved_timestamps());
    let write = write_rows(api, &config.target, &payloads, config.batch_size, progress)?;
    progress.finish_and_clear();

    counts.target_after = read_target_count(api, &config.target);
    if let (Some(before), Some(after)) = (counts.target_before, counts.target_after) {
        let expected = before + write.inserted as u64;
        if after != expected {
            warn!(
                before,
                inserted = write.inserted,
                expected,
                reported = after,
                "target row count differs from expected rows"
            );
        }
    }
    Ok(write)
}

fn read_target_count<A>(api: &A, target: &TargetTable) -> Option<u64>
where
    A: NocoApi + ?Sized,
{
    match count_target_rows(api, target) {
        Ok(total) => total,
        Err(error) => {
            warn!(%error, "could not read target row count");
            None
        }
    }
}
