//! Recreating the source schema on the target table.

use noco_client::{NocoApi, TargetTable};
use noco_model::{ColumnPayload, ModelError, TableMeta, TimestampTitles};
use tracing::{debug, info};

use crate::error::{CloneError, Stage};

/// Physical names of the preserved-timestamp columns.
pub const SOURCE_CREATED_AT_COLUMN: &str = "source_created_at";
pub const SOURCE_UPDATED_AT_COLUMN: &str = "source_updated_at";

/// Creation payloads for the target, in source column order.
#[derive(Debug, Clone, Default)]
pub struct SchemaPlan {
    pub columns: Vec<ColumnPayload>,
    /// Titles of system and primary-key source columns left out.
    pub skipped: Vec<String>,
}

/// Translate every replicable source column.
///
/// Runs before anything on the target is touched, so an untranslatable
/// column leaves the target as it was.
pub fn plan_schema(source: &TableMeta) -> Result<SchemaPlan, ModelError> {
    let mut plan = SchemaPlan::default();
    for column in &source.columns {
        if !column.is_replicable() {
            debug!(title = %column.title, uidt = %column.column_type, "skipping system column");
            plan.skipped.push(column.title.clone());
            continue;
        }
        plan.columns.push(ColumnPayload::from_source(column)?);
    }
    Ok(plan)
}

/// Create the planned columns in order. The first failure ends the run.
pub fn create_columns<A>(
    api: &A,
    target: &TargetTable,
    plan: &SchemaPlan,
) -> Result<Vec<String>, CloneError>
where
    A: NocoApi + ?Sized,
{
    let mut created = Vec::with_capacity(plan.columns.len());
    for payload in &plan.columns {
        create_column(api, target, payload)?;
        info!(title = %payload.title, uidt = %payload.uidt, "created column");
        created.push(payload.title.clone());
    }
    Ok(created)
}

/// Add the DateTime columns receiving source CreatedAt/UpdatedAt, unless a
/// column with that title already exists on the target.
pub fn ensure_timestamp_columns<A>(
    api: &A,
    target: &TargetTable,
    titles: &TimestampTitles,
) -> Result<Vec<String>, CloneError>
where
    A: NocoApi + ?Sized,
{
    let existing = api
        .table_meta(target.table())
        .map_err(|source| CloneError::api(Stage::ReplicatingSchema, source))?;

    let mut created = Vec::new();
    for (column_name, title) in [
        (SOURCE_CREATED_AT_COLUMN, titles.created_at.as_str()),
        (SOURCE_UPDATED_AT_COLUMN, titles.updated_at.as_str()),
    ] {
        if existing.column(title).is_some() {
            info!(title, "timestamp column already present");
            continue;
        }
        create_column(api, target, &ColumnPayload::timestamp_column(column_name, title))?;
        info!(title, column_name, "created timestamp column");
        created.push(title.to_string());
    }
    Ok(created)
}

fn create_column<A>(api: &A, target: &TargetTable, payload: &ColumnPayload) -> Result<(), CloneError>
where
    A: NocoApi + ?Sized,
{
    api.create_column(target, payload)
        .map_err(|source| CloneError::CreateColumn {
            title: payload.title.clone(),
            table: target.clone(),
            source,
        })
}
