//! Shared types for the Lycoris console
//!
//! Wire DTOs for the RBAC, taxonomy and user endpoints, plus the response
//! envelope every endpoint answers with.

pub mod models;
pub mod response;

// Re-exports
pub use response::{ApiEnvelope, EnvelopeError, ListEnvelope, ListPage, Pagination};
pub use serde::{Deserialize, Serialize};
