//! Column creation payloads for `POST /api/v1/db/meta/tables/{tableId}/columns`.

use serde::Serialize;
use serde_json::{Map, Number, Value};

use crate::column::{ColumnDescriptor, ColumnType, SelectOption};
use crate::error::{ModelError, Result};

/// Server-generated keys removed from `meta` and `colOptions` before they are
/// sent back, at any depth.
pub const META_KEYS_STRIP: [&str; 7] = [
    "id",
    "fk_column_id",
    "base_id",
    "created_at",
    "updated_at",
    "createdAt",
    "updatedAt",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_name: Option<String>,
    pub title: String,
    pub uidt: String,
    #[serde(flatten)]
    pub hints: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
    #[serde(rename = "colOptions", skip_serializing_if = "Option::is_none")]
    pub col_options: Option<Value>,
}

impl ColumnPayload {
    /// Translate a source column into a creation payload for the target.
    ///
    /// Select options are re-emitted from the typed option list, keeping
    /// label, color and order in source order.
    pub fn from_source(column: &ColumnDescriptor) -> Result<Self> {
        if column.column_type.is_relational() || matches!(column.column_type, ColumnType::Other(_))
        {
            return Err(ModelError::UnsupportedType {
                column: column.title.clone(),
                uidt: match column.column_type.as_uidt() {
                    "" => "<missing>".to_string(),
                    uidt => uidt.to_string(),
                },
            });
        }

        let col_options = column.col_options.as_ref().map(|options| {
            let mut sanitized = sanitize_meta_map(options);
            if column.column_type.is_select()
                && matches!(options.get("options"), Some(Value::Array(_)))
            {
                sanitized.insert("options".to_string(), select_options_value(&column.options));
            }
            Value::Object(sanitized)
        });

        Ok(Self {
            column_name: column.column_name.clone(),
            title: column.title.clone(),
            uidt: column.column_type.as_uidt().to_string(),
            hints: column.hints.clone(),
            order: column.order.clone(),
            meta: column
                .meta
                .as_ref()
                .map(|meta| Value::Object(sanitize_meta_map(meta))),
            col_options,
        })
    }

    /// A plain DateTime column used to hold a copied source timestamp.
    pub fn timestamp_column(column_name: &str, title: &str) -> Self {
        Self {
            column_name: Some(column_name.to_string()),
            title: title.to_string(),
            uidt: ColumnType::DateTime.as_uidt().to_string(),
            hints: Map::new(),
            order: None,
            meta: None,
            col_options: None,
        }
    }
}

/// Recursively remove [`META_KEYS_STRIP`] keys.
pub fn sanitize_meta(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(sanitize_meta).collect()),
        Value::Object(object) => Value::Object(sanitize_meta_map(object)),
        other => other.clone(),
    }
}

fn sanitize_meta_map(object: &Map<String, Value>) -> Map<String, Value> {
    object
        .iter()
        .filter(|(key, _)| !META_KEYS_STRIP.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), sanitize_meta(value)))
        .collect()
}

fn select_options_value(options: &[SelectOption]) -> Value {
    Value::Array(
        options
            .iter()
            .map(|option| {
                let mut entry = Map::new();
                entry.insert("title".to_string(), Value::String(option.label.clone()));
                if let Some(color) = &option.color {
                    entry.insert("color".to_string(), Value::String(color.clone()));
                }
                if let Some(order) = &option.order {
                    entry.insert("order".to_string(), Value::Number(order.clone()));
                }
                Value::Object(entry)
            })
            .collect(),
    )
}
