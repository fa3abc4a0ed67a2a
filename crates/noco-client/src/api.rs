use noco_model::{ColumnPayload, RowId, RowPage, RowRecord, TableMeta};

use crate::error::Result;
use crate::table::{TableRef, TargetTable};

/// The NocoDB operations a clone run needs.
///
/// Reads take any [`TableRef`]; every mutating call takes a [`TargetTable`],
/// so the source table cannot be handed to a write.
pub trait NocoApi {
    /// `GET /api/v1/db/meta/tables/{tableId}`
    fn table_meta(&self, table: &TableRef) -> Result<TableMeta>;

    /// `GET /api/v1/db/data/v1/{baseId}/{tableId}?offset=..&limit=..`
    fn list_rows(&self, table: &TableRef, offset: usize, limit: usize) -> Result<RowPage>;

    /// `POST /api/v1/db/meta/tables/{tableId}/columns`
    fn create_column(&self, table: &TargetTable, payload: &ColumnPayload) -> Result<()>;

    /// `DELETE /api/v1/db/meta/columns/{columnId}`
    fn delete_column(&self, table: &TargetTable, column_id: &str) -> Result<()>;

    /// `DELETE /api/v1/db/data/v1/{baseId}/{tableId}/{rowId}`
    fn delete_row(&self, table: &TargetTable, row_id: &RowId) -> Result<()>;

    /// `POST /api/v1/db/data/bulk/v1/{baseId}/{tableId}`
    fn insert_rows(&self, table: &TargetTable, rows: &[RowRecord]) -> Result<()>;

    /// `POST /api/v1/db/data/v1/{baseId}/{tableId}`
    fn insert_row(&self, table: &TargetTable, row: &RowRecord) -> Result<()>;
}
