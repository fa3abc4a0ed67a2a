//! Table handles.
//!
//! A clone run touches two tables. Only [`TargetTable`] is accepted by the
//! write methods of [`crate::NocoApi`]; a [`SourceTable`] can only be read.

use std::fmt;

/// Base and table identifiers of one NocoDB table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableRef {
    pub base_id: String,
    pub table_id: String,
}

impl TableRef {
    pub fn new(base_id: impl Into<String>, table_id: impl Into<String>) -> Self {
        Self {
            base_id: base_id.into(),
            table_id: table_id.into(),
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base_id, self.table_id)
    }
}

/// The table being copied from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceTable(TableRef);

impl SourceTable {
    pub fn new(table: TableRef) -> Self {
        Self(table)
    }

    pub fn table(&self) -> &TableRef {
        &self.0
    }
}

impl fmt::Display for SourceTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The table being overwritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetTable(TableRef);

impl TargetTable {
    pub fn new(table: TableRef) -> Self {
        Self(table)
    }

    pub fn table(&self) -> &TableRef {
        &self.0
    }
}

impl fmt::Display for TargetTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
