//! Client layer for the panel backend
//!
//! The core consumes two boundary contracts and defines them here as async
//! traits so list views can be driven by the REST backend or by a test double:
//!
//! ```text
//! ListView ──fetch_page──▶ PageFetcher        GET  {base}/{resource}?…
//!          ──submit_bulk─▶ BulkActionBackend  POST {base}/{resource}/bulk
//! ```
//!
//! # Failure policy
//!
//! - Non-2xx responses → `ClientError::Status` with the body as message
//! - Timeouts → `ClientError::Timeout` (no retry: the request may have landed)
//! - Undecodable bodies → `ClientError::Decode`

mod page;
mod rest;

pub use page::{JsonRecord, ListRecord, Page, RowEffect};
pub use rest::{RestClient, RestResource};

use std::fmt;

use async_trait::async_trait;
use uuid::Uuid;

use crate::bulk::{BulkActionEnvelope, BulkActionResponse};
use crate::filter::FilterState;
use crate::selection::RecordId;

// ============ ClientError ============

/// Errors from the transport layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Connection, DNS or I/O failure
    Transport(String),
    /// The transport gave up waiting
    Timeout,
    /// Backend answered with a non-success status
    Status { status: u16, message: String },
    /// Response body did not match the contract
    Decode(String),
    /// Blocking worker failed
    Internal(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Transport(msg) => write!(f, "Transport error: {}", msg),
            ClientError::Timeout => write!(f, "Request timed out"),
            ClientError::Status { status, message } if message.is_empty() => {
                write!(f, "HTTP {}", status)
            }
            ClientError::Status { status, message } => write!(f, "HTTP {}: {}", status, message),
            ClientError::Decode(msg) => write!(f, "Invalid response: {}", msg),
            ClientError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<ureq::Error> for ClientError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Timeout(_) => ClientError::Timeout,
            ureq::Error::StatusCode(status) => ClientError::Status {
                status,
                message: String::new(),
            },
            other => ClientError::Transport(other.to_string()),
        }
    }
}

// ============ Contracts ============

/// Paged fetch: the records of one page plus the total under the filter
#[async_trait]
pub trait PageFetcher<R: ListRecord>: Send + Sync {
    async fn fetch_page(&self, filter: &FilterState) -> Result<Page<R>, ClientError>;
}

/// Bulk-action submission. `request_id` doubles as the idempotency key.
#[async_trait]
pub trait BulkActionBackend<Id: RecordId>: Send + Sync {
    async fn submit_bulk(
        &self,
        envelope: &BulkActionEnvelope<Id>,
        request_id: Uuid,
    ) -> Result<BulkActionResponse<Id>, ClientError>;
}
