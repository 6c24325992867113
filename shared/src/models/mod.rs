//! Data models
//!
//! Shared between the console client and anything speaking the same API.
//! Field names follow the backend's camelCase wire format.

pub mod rbac;
pub mod taxonomy;
pub mod user;

// Re-exports
pub use rbac::*;
pub use taxonomy::*;
pub use user::*;
