//! RBAC: API paths, roles and user role assignments

mod identity;
mod registry;

pub use identity::UserIdentity;
pub use registry::PermissionRegistry;
