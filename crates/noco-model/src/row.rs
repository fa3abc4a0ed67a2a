//! Row records and paging envelopes of the NocoDB data API.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Keys NocoDB fills in itself; they are never sent back on insert.
pub const SYSTEM_ROW_FIELDS: [&str; 6] = [
    "Id",
    "id",
    "CreatedAt",
    "UpdatedAt",
    "created_at",
    "updated_at",
];

/// Prefix of NocoDB-internal row keys (`nc_order`, `nc_created_by`, ...).
pub const INTERNAL_FIELD_PREFIX: &str = "nc_";

pub fn is_system_field(key: &str) -> bool {
    SYSTEM_ROW_FIELDS.contains(&key) || key.starts_with(INTERNAL_FIELD_PREFIX)
}

/// Titles of the target columns that receive copied source timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampTitles {
    pub created_at: String,
    pub updated_at: String,
}

impl TimestampTitles {
    pub fn new(created_at: impl Into<String>, updated_at: impl Into<String>) -> Self {
        Self {
            created_at: created_at.into(),
            updated_at: updated_at.into(),
        }
    }
}

/// Primary key value of a row, rendered for use in a URL path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RowId(String);

impl RowId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(number) => Some(Self(number.to_string())),
            Value::String(text) if !text.is_empty() => Some(Self(text.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One row keyed by column title.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowRecord(Map<String, Value>);

impl RowRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.0
    }

    /// `Id`, falling back to `id`.
    pub fn id(&self) -> Option<RowId> {
        self.first_present(&["Id", "id"]).and_then(RowId::from_value)
    }

    pub fn created_at(&self) -> Option<&Value> {
        self.first_present(&["CreatedAt", "created_at"])
    }

    pub fn updated_at(&self) -> Option<&Value> {
        self.first_present(&["UpdatedAt", "updated_at"])
    }

    /// Build the payload for inserting this row into another table.
    ///
    /// System and internal fields are dropped. With `timestamps`, the row's
    /// own CreatedAt/UpdatedAt values are written under the given titles.
    pub fn to_insert_payload(&self, timestamps: Option<&TimestampTitles>) -> RowRecord {
        let mut payload: Map<String, Value> = self
            .0
            .iter()
            .filter(|(key, _)| !is_system_field(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        if let Some(titles) = timestamps {
            if let Some(created) = self.created_at() {
                payload.insert(titles.created_at.clone(), created.clone());
            }
            if let Some(updated) = self.updated_at() {
                payload.insert(titles.updated_at.clone(), updated.clone());
            }
        }
        RowRecord(payload)
    }

    fn first_present(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter()
            .filter_map(|key| self.0.get(*key))
            .find(|value| !value.is_null())
    }
}

impl From<Map<String, Value>> for RowRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

impl FromIterator<(String, Value)> for RowRecord {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Paging metadata returned next to a row list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    pub total_rows: Option<u64>,
    #[serde(default)]
    pub page: Option<u64>,
    #[serde(default)]
    pub page_size: Option<u64>,
    #[serde(default)]
    pub is_first_page: Option<bool>,
    #[serde(default)]
    pub is_last_page: Option<bool>,
}

/// Response body of `GET /api/v1/db/data/v1/{baseId}/{tableId}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowPage {
    #[serde(default)]
    pub list: Vec<RowRecord>,
    #[serde(default, rename = "pageInfo")]
    pub page_info: Option<PageInfo>,
}

impl RowPage {
    pub fn total_rows(&self) -> Option<u64> {
        self.page_info.as_ref().and_then(|info| info.total_rows)
    }

    /// Whether no rows follow this page.
    ///
    /// The server may return fewer rows than `requested` when the limit
    /// exceeds its own maximum, so `isLastPage` and `totalRows` are trusted
    /// first. A short page only ends paging when neither is reported.
    pub fn is_last(&self, offset: usize, requested: usize) -> bool {
        if self.list.is_empty() {
            return true;
        }
        let info = self.page_info.as_ref();
        if let Some(last) = info.and_then(|info| info.is_last_page) {
            return last;
        }
        match self.total_rows() {
            Some(total) => (offset + self.list.len()) as u64 >= total,
            None => self.list.len() < requested,
        }
    }
}
