//! Console facade
//!
//! Wires one [`NetworkHttpClient`] into every component that needs the
//! backend.

use std::sync::Arc;

use crate::access::{AccessChecker, RouteGuard};
use crate::catalog::{CatalogCache, FileSnapshotStore};
use crate::clock::SystemClock;
use crate::rbac::PermissionRegistry;
use crate::{ClientResult, ConsoleConfig, NetworkHttpClient};

/// Everything the console pages use, sharing one HTTP client
#[derive(Clone)]
pub struct ConsoleClient {
    pub http: Arc<NetworkHttpClient>,
    pub registry: Arc<PermissionRegistry>,
    pub access: AccessChecker,
    pub routes: RouteGuard,
    pub catalog: CatalogCache,
}

impl ConsoleClient {
    /// Build all components from `config`
    ///
    /// Fails with [`ClientError::NoBackend`](crate::ClientError::NoBackend)
    /// when no backend is configured.
    pub fn from_config(config: &ConsoleConfig) -> ClientResult<Self> {
        config.validate()?;
        let http = Arc::new(NetworkHttpClient::new(config)?);

        let registry = Arc::new(PermissionRegistry::new(http.clone()));
        let access = AccessChecker::new(http.clone());
        let routes = RouteGuard::new(
            access.clone(),
            RouteGuard::console_rules(),
            config.default_route_decision,
        );
        let catalog = CatalogCache::new(
            http.clone(),
            Arc::new(FileSnapshotStore::new(&config.cache_dir)),
            Arc::new(SystemClock),
            config.catalog.clone(),
        );

        tracing::info!(
            backend = %http.base_url(),
            cache_dir = %config.cache_dir.display(),
            default_route = %config.default_route_decision,
            "console client ready"
        );

        Ok(Self {
            http,
            registry,
            access,
            routes,
            catalog,
        })
    }
}
