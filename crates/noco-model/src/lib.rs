//! Typed NocoDB table, column and row model.
//!
//! Raw API JSON is translated here, once, into [`TableMeta`],
//! [`ColumnDescriptor`] and [`RowRecord`]. Creation payloads for the target
//! table are built from those types by [`ColumnPayload::from_source`].

pub mod column;
pub mod error;
pub mod payload;
pub mod row;

pub use column::{COLUMN_HINT_KEYS, ColumnDescriptor, ColumnType, SelectOption, TableMeta};
pub use error::{ModelError, Result};
pub use payload::{ColumnPayload, META_KEYS_STRIP, sanitize_meta};
pub use row::{
    INTERNAL_FIELD_PREFIX, PageInfo, RowId, RowPage, RowRecord, SYSTEM_ROW_FIELDS,
    TimestampTitles, is_system_field,
};
