//! Column metadata as returned by the NocoDB meta API.
//!
//! The meta endpoints return loosely-shaped JSON (flags may come back as
//! booleans, integers or `null` depending on the meta database). Everything in
//! this module is built through [`ColumnDescriptor::from_wire`] and
//! [`TableMeta::from_wire`], so the rest of the workspace only sees typed
//! values.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::{ModelError, Result};

/// Database-level hints copied verbatim from a source column into its
/// creation payload.
pub const COLUMN_HINT_KEYS: [&str; 13] = [
    "dt", "np", "ns", "clen", "dtx", "dtxp", "dtxs", "un", "ai", "unique", "rqd", "cdf", "cc",
];

/// NocoDB UI data type (`uidt`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnType {
    SingleLineText,
    LongText,
    Number,
    Decimal,
    Currency,
    Percent,
    Duration,
    Rating,
    Checkbox,
    Email,
    PhoneNumber,
    Url,
    Date,
    DateTime,
    Time,
    Year,
    SingleSelect,
    MultiSelect,
    Attachment,
    Json,
    GeoData,
    Geometry,
    User,
    Barcode,
    QrCode,
    Formula,
    Button,
    AutoNumber,
    Id,
    ForeignKey,
    CreatedTime,
    LastModifiedTime,
    CreatedBy,
    LastModifiedBy,
    SpecificDbType,
    Links,
    LinkToAnotherRecord,
    Lookup,
    Rollup,
    Count,
    /// A `uidt` this tool does not know about.
    Other(String),
}

impl ColumnType {
    pub fn from_uidt(uidt: &str) -> Self {
        match uidt {
            "SingleLineText" => Self::SingleLineText,
            "LongText" => Self::LongText,
            "Number" => Self::Number,
            "Decimal" => Self::Decimal,
            "Currency" => Self::Currency,
            "Percent" => Self::Percent,
            "Duration" => Self::Duration,
            "Rating" => Self::Rating,
            "Checkbox" => Self::Checkbox,
            "Email" => Self::Email,
            "PhoneNumber" => Self::PhoneNumber,
            "URL" => Self::Url,
            "Date" => Self::Date,
            "DateTime" => Self::DateTime,
            "Time" => Self::Time,
            "Year" => Self::Year,
            "SingleSelect" => Self::SingleSelect,
            "MultiSelect" => Self::MultiSelect,
            "Attachment" => Self::Attachment,
            "JSON" => Self::Json,
            "GeoData" => Self::GeoData,
            "Geometry" => Self::Geometry,
            "User" => Self::User,
            "Barcode" => Self::Barcode,
            "QrCode" => Self::QrCode,
            "Formula" => Self::Formula,
            "Button" => Self::Button,
            "AutoNumber" => Self::AutoNumber,
            "ID" => Self::Id,
            "ForeignKey" => Self::ForeignKey,
            "CreatedTime" => Self::CreatedTime,
            "LastModifiedTime" => Self::LastModifiedTime,
            "CreatedBy" => Self::CreatedBy,
            "LastModifiedBy" => Self::LastModifiedBy,
            "SpecificDBType" => Self::SpecificDbType,
            "Links" => Self::Links,
            "LinkToAnotherRecord" => Self::LinkToAnotherRecord,
            "Lookup" => Self::Lookup,
            "Rollup" => Self::Rollup,
            "Count" => Self::Count,
            other => Self::Other(other.to_string()),
        }
    }

    /// The `uidt` string the API expects for this type.
    pub fn as_uidt(&self) -> &str {
        match self {
            Self::SingleLineText => "SingleLineText",
            Self::LongText => "LongText",
            Self::Number => "Number",
            Self::Decimal => "Decimal",
            Self::Currency => "Currency",
            Self::Percent => "Percent",
            Self::Duration => "Duration",
            Self::Rating => "Rating",
            Self::Checkbox => "Checkbox",
            Self::Email => "Email",
            Self::PhoneNumber => "PhoneNumber",
            Self::Url => "URL",
            Self::Date => "Date",
            Self::DateTime => "DateTime",
            Self::Time => "Time",
            Self::Year => "Year",
            Self::SingleSelect => "SingleSelect",
            Self::MultiSelect => "MultiSelect",
            Self::Attachment => "Attachment",
            Self::Json => "JSON",
            Self::GeoData => "GeoData",
            Self::Geometry => "Geometry",
            Self::User => "User",
            Self::Barcode => "Barcode",
            Self::QrCode => "QrCode",
            Self::Formula => "Formula",
            Self::Button => "Button",
            Self::AutoNumber => "AutoNumber",
            Self::Id => "ID",
            Self::ForeignKey => "ForeignKey",
            Self::CreatedTime => "CreatedTime",
            Self::LastModifiedTime => "LastModifiedTime",
            Self::CreatedBy => "CreatedBy",
            Self::LastModifiedBy => "LastModifiedBy",
            Self::SpecificDbType => "SpecificDBType",
            Self::Links => "Links",
            Self::LinkToAnotherRecord => "LinkToAnotherRecord",
            Self::Lookup => "Lookup",
            Self::Rollup => "Rollup",
            Self::Count => "Count",
            Self::Other(uidt) => uidt,
        }
    }

    /// SingleSelect and MultiSelect carry an option list.
    pub fn is_select(&self) -> bool {
        matches!(self, Self::SingleSelect | Self::MultiSelect)
    }

    /// Virtual types that point at other tables by id. They cannot be
    /// recreated in another base without the linked tables.
    pub fn is_relational(&self) -> bool {
        matches!(
            self,
            Self::Links | Self::LinkToAnotherRecord | Self::Lookup | Self::Rollup | Self::Count
        )
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_uidt())
    }
}

/// One entry of a SingleSelect/MultiSelect option list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    #[serde(rename = "title")]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<Number>,
}

impl SelectOption {
    pub fn new(label: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            color: Some(color.into()),
            order: None,
        }
    }
}

/// A typed view of one column from `GET /api/v1/db/meta/tables/{tableId}`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDescriptor {
    pub id: Option<String>,
    pub title: String,
    pub column_name: Option<String>,
    pub column_type: ColumnType,
    /// Select options in source order; empty for non-select types.
    pub options: Vec<SelectOption>,
    pub system: bool,
    pub primary_key: bool,
    pub order: Option<Number>,
    /// Non-null values of [`COLUMN_HINT_KEYS`].
    pub hints: Map<String, Value>,
    pub meta: Option<Map<String, Value>>,
    pub col_options: Option<Map<String, Value>>,
}

impl ColumnDescriptor {
    /// Translate one raw column object. `index` is only used for error context.
    pub fn from_wire(index: usize, value: &Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or(ModelError::NotAnObject { what: "column" })?;

        let column_name = non_empty_str(object.get("column_name"));
        let title = non_empty_str(object.get("title"))
            .or_else(|| column_name.clone())
            .ok_or(ModelError::UntitledColumn { index })?;
        let column_type = object
            .get("uidt")
            .and_then(Value::as_str)
            .map_or_else(|| ColumnType::Other(String::new()), ColumnType::from_uidt);

        let mut hints = Map::new();
        for key in COLUMN_HINT_KEYS {
            match object.get(key) {
                Some(Value::Null) | None => {}
                Some(hint) => {
                    hints.insert(key.to_string(), hint.clone());
                }
            }
        }

        let col_options = object.get("colOptions").and_then(Value::as_object).cloned();
        let options = if column_type.is_select() {
            col_options
                .as_ref()
                .map(select_options_from_wire)
                .unwrap_or_default()
        } else {
            Vec::new()
        };

        Ok(Self {
            id: id_string(object.get("id")),
            title,
            column_name,
            column_type,
            options,
            system: truthy(object.get("system")),
            primary_key: truthy(object.get("pk")),
            order: object.get("order").and_then(Value::as_number).cloned(),
            hints,
            meta: object.get("meta").and_then(Value::as_object).cloned(),
            col_options,
        })
    }

    /// System-managed as flagged by the API. A user-added CreatedTime or
    /// LastModifiedBy field is not a system column.
    pub fn is_system(&self) -> bool {
        self.system
    }

    /// Whether this column should be recreated on (or removed from) a target.
    pub fn is_replicable(&self) -> bool {
        !self.is_system() && !self.primary_key
    }
}

/// Table metadata with its columns in API order.
#[derive(Debug, Clone, PartialEq)]
pub struct TableMeta {
    pub id: Option<String>,
    pub title: Option<String>,
    pub columns: Vec<ColumnDescriptor>,
}

impl TableMeta {
    pub fn from_wire(value: &Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or(ModelError::NotAnObject { what: "table metadata" })?;
        let columns = match object.get("columns") {
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(index, item)| ColumnDescriptor::from_wire(index, item))
                .collect::<Result<Vec<_>>>()?,
            _ => Vec::new(),
        };
        Ok(Self {
            id: id_string(object.get("id")),
            title: non_empty_str(object.get("title")),
            columns,
        })
    }

    pub fn column(&self, title: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|column| column.title == title)
    }

    pub fn replicable_columns(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.iter().filter(|column| column.is_replicable())
    }
}

fn select_options_from_wire(col_options: &Map<String, Value>) -> Vec<SelectOption> {
    let Some(Value::Array(items)) = col_options.get("options") else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|option| {
            let label = option.get("title").and_then(Value::as_str)?;
            Some(SelectOption {
                label: label.to_string(),
                color: option
                    .get("color")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                order: option.get("order").and_then(Value::as_number).cloned(),
            })
        })
        .collect()
}

/// Meta databases disagree on flag encoding (`true`, `1`, `"1"`, `null`).
fn truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(number)) => number.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(text)) => !text.is_empty() && text != "0" && text != "false",
        _ => false,
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

fn id_string(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(text)) if !text.is_empty() => Some(text.clone()),
        Some(Value::Number(number)) => Some(number.to_string()),
        _ => None,
    }
}
