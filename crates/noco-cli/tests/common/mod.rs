//! In-memory NocoDB used by the pipeline tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashSet};

use noco_cli::MigrationConfig;
use noco_cli::cli::CloneArgs;
use noco_client::{ApiError, NocoApi, Result, TableRef, TargetTable};
use noco_model::{ColumnPayload, PageInfo, RowId, RowPage, RowRecord, TableMeta};
use serde_json::{Value, json};

pub const SOURCE_BASE: &str = "p_source";
pub const SOURCE_TABLE: &str = "m_source";
pub const TARGET_BASE: &str = "p_target";
pub const TARGET_TABLE: &str = "m_target";

/// Timestamp the fake stamps on rows it creates.
pub const FAKE_NOW: &str = "2026-10-16 12:00:00+00:00";

/// One recorded API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    TableMeta { table: String },
    ListRows { table: String, offset: usize, limit: usize },
    CreateColumn { table: String, title: String },
    DeleteColumn { table: String, column_id: String },
    DeleteRow { table: String, row_id: String },
    InsertRows { table: String, count: usize },
    InsertRow { table: String },
}

impl Call {
    pub fn table(&self) -> &str {
        match self {
            Self::TableMeta { table }
            | Self::ListRows { table, .. }
            | Self::CreateColumn { table, .. }
            | Self::DeleteColumn { table, .. }
            | Self::DeleteRow { table, .. }
            | Self::InsertRows { table, .. }
            | Self::InsertRow { table } => table,
        }
    }

    pub fn is_write(&self) -> bool {
        !matches!(self, Self::TableMeta { .. } | Self::ListRows { .. })
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, Self::DeleteColumn { .. } | Self::DeleteRow { .. })
    }
}

#[derive(Debug, Default)]
pub struct FakeTable {
    /// Raw column objects, as the meta endpoint would return them.
    pub columns: Vec<Value>,
    pub rows: Vec<RowRecord>,
}

#[derive(Debug, Default)]
pub struct MemoryNoco {
    tables: RefCell<BTreeMap<String, FakeTable>>,
    calls: RefCell<Vec<Call>>,
    next_id: Cell<u64>,
    bulk_calls: Cell<usize>,
    /// Reject every bulk insert.
    pub bulk_disabled: bool,
    /// Reject the bulk call with this 1-based number.
    pub fail_bulk_call: Option<usize>,
    pub failing_row_deletes: HashSet<String>,
    pub failing_column_deletes: HashSet<String>,
    pub failing_creates: HashSet<String>,
    /// Server-side maximum for `limit`; larger requests get a capped page.
    pub page_cap: Option<usize>,
}

impl MemoryNoco {
    pub fn new() -> Self {
        let fake = Self::default();
        fake.next_id.set(1000);
        fake
    }

    pub fn add_table(&self, table_id: &str, columns: Vec<Value>, rows: Vec<Value>) {
        let rows = rows
            .into_iter()
            .map(|row| serde_json::from_value(row).expect("row fixture must be an object"))
            .collect();
        self.tables
            .borrow_mut()
            .insert(table_id.to_string(), FakeTable { columns, rows });
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn writes_to(&self, table_id: &str) -> Vec<Call> {
        self.calls
            .borrow()
            .iter()
            .filter(|call| call.is_write() && call.table() == table_id)
            .cloned()
            .collect()
    }

    pub fn rows(&self, table_id: &str) -> Vec<RowRecord> {
        self.tables
            .borrow()
            .get(table_id)
            .map(|table| table.rows.clone())
            .unwrap_or_default()
    }

    pub fn columns(&self, table_id: &str) -> Vec<Value> {
        self.tables
            .borrow()
            .get(table_id)
            .map(|table| table.columns.clone())
            .unwrap_or_default()
    }

    pub fn column(&self, table_id: &str, title: &str) -> Option<Value> {
        self.columns(table_id)
            .into_iter()
            .find(|column| column["title"] == title)
    }

    /// Titles of the columns a clone would treat as user columns.
    pub fn user_column_titles(&self, table_id: &str) -> Vec<String> {
        self.meta(table_id)
            .map(|meta| {
                meta.replicable_columns()
                    .map(|column| column.title.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    fn meta(&self, table_id: &str) -> Result<TableMeta> {
        let columns = self.columns(table_id);
        TableMeta::from_wire(&json!({ "id": table_id, "columns": columns })).map_err(|err| {
            ApiError::Decode {
                endpoint: format!("/api/v1/db/meta/tables/{table_id}"),
                message: err.to_string(),
            }
        })
    }

    fn stamp(&self, row: &RowRecord) -> RowRecord {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let mut stored = row.clone();
        stored.insert("Id", json!(id));
        stored.insert("CreatedAt", json!(FAKE_NOW));
        stored.insert("UpdatedAt", json!(FAKE_NOW));
        stored
    }
}

fn rejected(method: &str, endpoint: String, status: u16) -> ApiError {
    ApiError::Status {
        method: method.to_string(),
        endpoint,
        status,
        body: "{\"msg\":\"rejected by fake\"}".to_string(),
    }
}

impl NocoApi for MemoryNoco {
    fn table_meta(&self, table: &TableRef) -> Result<TableMeta> {
        self.record(Call::TableMeta {
            table: table.table_id.clone(),
        });
        if !self.tables.borrow().contains_key(&table.table_id) {
            return Err(rejected(
                "GET",
                format!("/api/v1/db/meta/tables/{}", table.table_id),
                404,
            ));
        }
        self.meta(&table.table_id)
    }

    fn list_rows(&self, table: &TableRef, offset: usize, limit: usize) -> Result<RowPage> {
        self.record(Call::ListRows {
            table: table.table_id.clone(),
            offset,
            limit,
        });
        let rows = self.rows(&table.table_id);
        let limit = self.page_cap.map_or(limit, |cap| limit.min(cap));
        let list: Vec<RowRecord> = rows.iter().skip(offset).take(limit).cloned().collect();
        let is_last_page = offset + list.len() >= rows.len();
        Ok(RowPage {
            list,
            page_info: Some(PageInfo {
                total_rows: Some(rows.len() as u64),
                is_last_page: Some(is_last_page),
                ..PageInfo::default()
            }),
        })
    }

    fn create_column(&self, table: &TargetTable, payload: &ColumnPayload) -> Result<()> {
        let table_id = table.table().table_id.clone();
        self.record(Call::CreateColumn {
            table: table_id.clone(),
            title: payload.title.clone(),
        });
        let endpoint = format!("/api/v1/db/meta/tables/{table_id}/columns");
        if self.failing_creates.contains(&payload.title)
            || self.column(&table_id, &payload.title).is_some()
        {
            return Err(rejected("POST", endpoint, 400));
        }
        let mut column = serde_json::to_value(payload).map_err(|err| ApiError::Decode {
            endpoint: endpoint.clone(),
            message: err.to_string(),
        })?;
        let column_id = format!("c_{}", self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        column["id"] = json!(column_id);
        self.tables
            .borrow_mut()
            .entry(table_id)
            .or_default()
            .columns
            .push(column);
        Ok(())
    }

    fn delete_column(&self, table: &TargetTable, column_id: &str) -> Result<()> {
        let table_id = table.table().table_id.clone();
        self.record(Call::DeleteColumn {
            table: table_id.clone(),
            column_id: column_id.to_string(),
        });
        let endpoint = format!("/api/v1/db/meta/columns/{column_id}");
        if self.failing_column_deletes.contains(column_id) {
            return Err(rejected("DELETE", endpoint, 500));
        }
        let mut tables = self.tables.borrow_mut();
        let columns = &mut tables.entry(table_id).or_default().columns;
        let before = columns.len();
        columns.retain(|column| column["id"] != column_id);
        if columns.len() == before {
            return Err(rejected("DELETE", endpoint, 404));
        }
        Ok(())
    }

    fn delete_row(&self, table: &TargetTable, row_id: &RowId) -> Result<()> {
        let table_ref = table.table();
        self.record(Call::DeleteRow {
            table: table_ref.table_id.clone(),
            row_id: row_id.to_string(),
        });
        let endpoint = format!(
            "/api/v1/db/data/v1/{}/{}/{row_id}",
            table_ref.base_id, table_ref.table_id
        );
        if self.failing_row_deletes.contains(row_id.as_str()) {
            return Err(rejected("DELETE", endpoint, 500));
        }
        let mut tables = self.tables.borrow_mut();
        let rows = &mut tables.entry(table_ref.table_id.clone()).or_default().rows;
        let before = rows.len();
        rows.retain(|row| row.id().as_ref() != Some(row_id));
        if rows.len() == before {
            return Err(rejected("DELETE", endpoint, 404));
        }
        Ok(())
    }

    fn insert_rows(&self, table: &TargetTable, rows: &[RowRecord]) -> Result<()> {
        let table_ref = table.table();
        self.record(Call::InsertRows {
            table: table_ref.table_id.clone(),
            count: rows.len(),
        });
        let call_number = self.bulk_calls.get() + 1;
        self.bulk_calls.set(call_number);
        if self.bulk_disabled || self.fail_bulk_call == Some(call_number) {
            return Err(rejected(
                "POST",
                format!(
                    "/api/v1/db/data/bulk/v1/{}/{}",
                    table_ref.base_id, table_ref.table_id
                ),
                404,
            ));
        }
        let stamped: Vec<RowRecord> = rows.iter().map(|row| self.stamp(row)).collect();
        self.tables
            .borrow_mut()
            .entry(table_ref.table_id.clone())
            .or_default()
            .rows
            .extend(stamped);
        Ok(())
    }

    fn insert_row(&self, table: &TargetTable, row: &RowRecord) -> Result<()> {
        let table_ref = table.table();
        self.record(Call::InsertRow {
            table: table_ref.table_id.clone(),
        });
        let stamped = self.stamp(row);
        self.tables
            .borrow_mut()
            .entry(table_ref.table_id.clone())
            .or_default()
            .rows
            .push(stamped);
        Ok(())
    }
}

/// Source fixture: `Name` text, `Status` single select {Open: red, Closed: green}
/// and `Tags` multi select {urgent: orange, hardware: blue, network: purple}.
pub fn ticket_columns() -> Vec<Value> {
    vec![
        json!({"id": "s_id", "title": "Id", "column_name": "id", "uidt": "ID", "pk": true}),
        json!({"id": "s_name", "title": "Name", "column_name": "name", "uidt": "SingleLineText", "dt": "text", "order": 2}),
        json!({
            "id": "s_status",
            "title": "Status",
            "column_name": "status",
            "uidt": "SingleSelect",
            "order": 3,
            "colOptions": {"options": [
                {"id": "o1", "title": "Open", "color": "red", "order": 1, "fk_column_id": "s_status"},
                {"id": "o2", "title": "Closed", "color": "green", "order": 2, "fk_column_id": "s_status"}
            ]}
        }),
        json!({
            "id": "s_tags",
            "title": "Tags",
            "column_name": "tags",
            "uidt": "MultiSelect",
            "order": 4,
            "colOptions": {"options": [
                {"id": "o3", "title": "urgent", "color": "orange", "order": 1, "fk_column_id": "s_tags"},
                {"id": "o4", "title": "hardware", "color": "blue", "order": 2, "fk_column_id": "s_tags"},
                {"id": "o5", "title": "network", "color": "purple", "order": 3, "fk_column_id": "s_tags"}
            ]}
        }),
        json!({"id": "s_created", "title": "CreatedAt", "column_name": "created_at", "uidt": "CreatedTime", "system": true}),
        json!({"id": "s_updated", "title": "UpdatedAt", "column_name": "updated_at", "uidt": "LastModifiedTime", "system": true}),
    ]
}

pub fn ticket_rows() -> Vec<Value> {
    vec![
        json!({"Id": 1, "Name": "Printer jam", "Status": "Open", "Tags": "hardware,urgent",
               "CreatedAt": "2024-01-02 09:00:00+00:00", "UpdatedAt": "2024-01-03 10:00:00+00:00"}),
        json!({"Id": 2, "Name": "VPN down", "Status": "Closed", "Tags": "network",
               "CreatedAt": "2024-02-10 14:30:00+00:00", "UpdatedAt": "2024-02-11 08:15:00+00:00"}),
        json!({"Id": 3, "Name": "New laptop", "Status": "Open", "Tags": null,
               "CreatedAt": "2024-03-05 11:45:00+00:00", "UpdatedAt": "2024-03-05 11:45:00+00:00"}),
    ]
}

/// Target fixture with one stale user column and one stale row.
pub fn stale_target_columns() -> Vec<Value> {
    vec![
        json!({"id": "t_id", "title": "Id", "column_name": "id", "uidt": "ID", "pk": true}),
        json!({"id": "t_title", "title": "Title", "column_name": "title", "uidt": "SingleLineText"}),
        json!({"id": "t_created", "title": "CreatedAt", "column_name": "created_at", "uidt": "CreatedTime", "system": true}),
    ]
}

pub fn stale_target_rows() -> Vec<Value> {
    vec![json!({"Id": 7, "Title": "left over"})]
}

/// A fake holding the ticket source table and a stale target table.
pub fn ticket_fake() -> MemoryNoco {
    let fake = MemoryNoco::new();
    fake.add_table(SOURCE_TABLE, ticket_columns(), ticket_rows());
    fake.add_table(TARGET_TABLE, stale_target_columns(), stale_target_rows());
    fake
}

/// Build a configuration for the fixture tables, after `adjust` edits the flags.
pub fn config(adjust: impl FnOnce(&mut CloneArgs)) -> MigrationConfig {
    let mut args = CloneArgs {
        base_url: Some("http://noco.test/".to_string()),
        token: Some("test-token".to_string()),
        source_base_id: Some(SOURCE_BASE.to_string()),
        source_table_id: Some(SOURCE_TABLE.to_string()),
        target_base_id: Some(TARGET_BASE.to_string()),
        target_table_id: Some(TARGET_TABLE.to_string()),
        ..CloneArgs::default()
    };
    adjust(&mut args);
    MigrationConfig::from_args(&args).expect("fixture configuration is complete")
}

pub fn field<'a>(row: &'a RowRecord, key: &str) -> Option<&'a str> {
    row.get(key).and_then(Value::as_str)
}
