//! Blocking HTTP client for the NocoDB v1 API.
//!
//! One client (and one token) is reused for every call of a run. Calls are
//! strictly sequential; no retries are attempted.

use std::fmt;
use std::thread;
use std::time::Duration;

use noco_model::{ColumnPayload, RowId, RowPage, RowRecord, TableMeta};
use reqwest::Method;
use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, trace};

use crate::api::NocoApi;
use crate::error::{ApiError, Result};
use crate::table::{TableRef, TargetTable};

/// Header carrying the API token.
pub const TOKEN_HEADER: &str = "xc-token";

/// Default HTTP request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// User agent string for API requests.
const USER_AGENT_VALUE: &str = concat!("nocodb-clone/", env!("CARGO_PKG_VERSION"));

/// Statuses accepted for reads, creates and inserts.
const OK_STATUSES: &[u16] = &[200, 201];

/// Statuses accepted for deletes.
const DELETE_STATUSES: &[u16] = &[200, 204];

/// Connection settings for [`NocoClient`].
#[derive(Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub token: String,
    pub timeout: Duration,
    /// Pause before every request; zero disables it.
    pub request_delay: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            timeout: DEFAULT_TIMEOUT,
            request_delay: Duration::ZERO,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("token", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .field("request_delay", &self.request_delay)
            .finish()
    }
}

/// NocoDB REST client.
#[derive(Debug)]
pub struct NocoClient {
    /// HTTP client with the token installed as a default header.
    client: Client,
    /// Server root without a trailing slash.
    base_url: String,
    request_delay: Duration,
}

impl NocoClient {
    /// Create a new client.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut token = HeaderValue::from_str(&config.token)
            .map_err(|e| ApiError::Client(format!("token is not a valid header value: {e}")))?;
        token.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(TOKEN_HEADER, token);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::Client(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            request_delay: config.request_delay,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send one request and reject statuses outside `accepted`.
    fn send<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        accepted: &[u16],
    ) -> Result<Response>
    where
        B: Serialize + ?Sized,
    {
        if !self.request_delay.is_zero() {
            thread::sleep(self.request_delay);
        }
        debug!(%method, path, "NocoDB request");

        let mut request = self.client.request(method.clone(), self.url(path));
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().map_err(|err| ApiError::Transport {
            method: method.to_string(),
            endpoint: path.to_string(),
            message: err.to_string(),
        })?;

        let status = response.status().as_u16();
        trace!(%method, path, status, "NocoDB response");
        if !accepted.contains(&status) {
            let body = response
                .text()
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ApiError::Status {
                method: method.to_string(),
                endpoint: path.to_string(),
                status,
                body,
            });
        }
        Ok(response)
    }

    fn get_json<T>(&self, path: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = self.send(Method::GET, path, None::<&()>, OK_STATUSES)?;
        response.json::<T>().map_err(|err| ApiError::Decode {
            endpoint: path.to_string(),
            message: err.to_string(),
        })
    }
}

impl NocoApi for NocoClient {
    fn table_meta(&self, table: &TableRef) -> Result<TableMeta> {
        let path = table_meta_path(&table.table_id);
        let value: Value = self.get_json(&path)?;
        TableMeta::from_wire(&value).map_err(|err| ApiError::Decode {
            endpoint: path,
            message: err.to_string(),
        })
    }

    fn list_rows(&self, table: &TableRef, offset: usize, limit: usize) -> Result<RowPage> {
        self.get_json(&rows_page_path(table, offset, limit))
    }

    fn create_column(&self, table: &TargetTable, payload: &ColumnPayload) -> Result<()> {
        let path = table_columns_path(&table.table().table_id);
        self.send(Method::POST, &path, Some(payload), OK_STATUSES)?;
        Ok(())
    }

    fn delete_column(&self, _table: &TargetTable, column_id: &str) -> Result<()> {
        let path = column_path(column_id);
        self.send(Method::DELETE, &path, None::<&()>, DELETE_STATUSES)?;
        Ok(())
    }

    fn delete_row(&self, table: &TargetTable, row_id: &RowId) -> Result<()> {
        let path = row_path(table.table(), row_id);
        self.send(Method::DELETE, &path, None::<&()>, DELETE_STATUSES)?;
        Ok(())
    }

    fn insert_rows(&self, table: &TargetTable, rows: &[RowRecord]) -> Result<()> {
        let path = bulk_rows_path(table.table());
        self.send(Method::POST, &path, Some(rows), OK_STATUSES)?;
        Ok(())
    }

    fn insert_row(&self, table: &TargetTable, row: &RowRecord) -> Result<()> {
        let path = rows_path(table.table());
        self.send(Method::POST, &path, Some(row), OK_STATUSES)?;
        Ok(())
    }
}

fn table_meta_path(table_id: &str) -> String {
    format!("/api/v1/db/meta/tables/{table_id}")
}

fn table_columns_path(table_id: &str) -> String {
    format!("/api/v1/db/meta/tables/{table_id}/columns")
}

fn column_path(column_id: &str) -> String {
    format!("/api/v1/db/meta/columns/{column_id}")
}

fn rows_path(table: &TableRef) -> String {
    format!("/api/v1/db/data/v1/{}/{}", table.base_id, table.table_id)
}

fn rows_page_path(table: &TableRef, offset: usize, limit: usize) -> String {
    format!("{}?offset={offset}&limit={limit}", rows_path(table))
}

fn row_path(table: &TableRef, row_id: &RowId) -> String {
    format!("{}/{}", rows_path(table), row_id)
}

fn bulk_rows_path(table: &TableRef) -> String {
    format!("/api/v1/db/data/bulk/v1/{}/{}", table.base_id, table.table_id)
}
