//! Lycoris Client - console core for the Lycoris backend
//!
//! RBAC administration, role-based route access, and cached tag/genre
//! catalogs, all over the backend's HTTP API.

pub mod access;
pub mod backend;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod console;
pub mod error;
pub mod http;
pub mod rbac;

pub use access::{AccessChecker, RouteDecision, RouteGuard, RouteRule, has_any_role};
pub use backend::{RbacBackend, TaxonomyBackend, UserInfoSource};
pub use catalog::{
    CacheSnapshot, CatalogCache, FileSnapshotStore, LookupIndex, MemorySnapshotStore,
    SnapshotStore,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{CatalogSettings, ConsoleConfig};
pub use console::ConsoleClient;
pub use error::{ClientError, ClientResult};
pub use http::NetworkHttpClient;
pub use rbac::{PermissionRegistry, UserIdentity};

// Re-export shared types for convenience
pub use shared::models::{CatalogEntry, CatalogKind, CatalogOption, SelfUserInfo};
