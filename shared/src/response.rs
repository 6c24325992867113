//! API Response types
//!
//! Every console endpoint answers with the same envelope:
//! ```json
//! {
//!     "success": true,
//!     "message": "optional text",
//!     "result": { ... }
//! }
//! ```
//! The envelope is converted into a `Result` before anything reads the
//! payload, so a `success: false` body can never be mistaken for data.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why an envelope did not yield a payload
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvelopeError {
    /// Backend answered `success: false`
    #[error("request rejected: {0}")]
    Rejected(String),

    /// Backend answered `success: true` without the expected payload
    #[error("missing result in {0} response")]
    MissingResult(&'static str),
}

fn rejected(message: Option<String>) -> EnvelopeError {
    EnvelopeError::Rejected(message.unwrap_or_else(|| "Unknown error".to_string()))
}

/// Unified API response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    // `default` on a generic field would bound `T: Default`; a missing
    // `Option` field reads as `None` without it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
}

impl<T> ApiEnvelope<T> {
    /// Create a successful envelope
    pub fn ok(result: T) -> Self {
        Self {
            success: true,
            message: None,
            result: Some(result),
        }
    }

    /// Create a failed envelope
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            result: None,
        }
    }

    /// Turn the envelope into the payload it promises
    ///
    /// `what` names the endpoint in the error when the payload is absent.
    pub fn into_result(self, what: &'static str) -> Result<T, EnvelopeError> {
        if !self.success {
            return Err(rejected(self.message));
        }
        self.result.ok_or(EnvelopeError::MissingResult(what))
    }

    /// Like [`into_result`](Self::into_result) for endpoints whose payload is optional
    pub fn into_ack(self) -> Result<Option<T>, EnvelopeError> {
        if !self.success {
            return Err(rejected(self.message));
        }
        Ok(self.result)
    }
}

/// Envelope for paginated listings: `result` is a list, `count` the total
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListEnvelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Vec<T>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
}

impl<T> ListEnvelope<T> {
    pub fn ok(items: Vec<T>, count: u64) -> Self {
        Self {
            success: true,
            message: None,
            result: Some(items),
            count: Some(count),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            result: None,
            count: None,
        }
    }

    /// Missing `result` on success reads as an empty page
    pub fn into_page(self) -> Result<ListPage<T>, EnvelopeError> {
        if !self.success {
            return Err(rejected(self.message));
        }
        Ok(ListPage {
            items: self.result.unwrap_or_default(),
            count: self.count,
        })
    }
}

/// One page of a listing plus the backend's total, when it reports one
#[derive(Debug, Clone, PartialEq)]
pub struct ListPage<T> {
    pub items: Vec<T>,
    pub count: Option<u64>,
}

/// Page selector (1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
}

impl Pagination {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(1, 50)
    }
}
