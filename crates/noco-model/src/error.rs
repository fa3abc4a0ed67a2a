use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("expected a JSON object for {what}")]
    NotAnObject { what: &'static str },
    #[error("column #{index} has neither a title nor a column_name")]
    UntitledColumn { index: usize },
    #[error("column '{column}' has type {uidt}, which has no equivalent on the target table")]
    UnsupportedType { column: String, uidt: String },
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ModelError>;
