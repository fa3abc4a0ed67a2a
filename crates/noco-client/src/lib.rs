//! NocoDB REST API access for table cloning.
//!
//! [`NocoApi`] is the seam the clone pipeline is written against;
//! [`NocoClient`] implements it over blocking `reqwest` calls to the v1
//! meta and data endpoints.

pub mod api;
pub mod client;
pub mod error;
pub mod table;

pub use api::NocoApi;
pub use client::{ClientConfig, DEFAULT_TIMEOUT, NocoClient, TOKEN_HEADER};
pub use error::{ApiError, Result};
pub use table::{SourceTable, TableRef, TargetTable};
