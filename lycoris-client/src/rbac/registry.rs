//! Permission Registry
//!
//! Local mirror of the backend's API paths and roles. The mirror only ever
//! reflects confirmed state: records change after the backend answers
//! `success`, never before. Invariants that the mirror can see (unique
//! names, paths still granted by a role, grants of unknown paths) are
//! checked before a request is sent.

use parking_lot::RwLock;
use shared::models::{
    ApiPathQuery, CreateApiPathRequest, CreateRoleRequest, RbacApiPath, RbacRole,
    RbacRoleWithPaths, RoleQuery, UpdateUserRolesRequest, UserRoles,
};
use shared::{EnvelopeError, ListPage, Pagination};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use super::UserIdentity;
use crate::backend::RbacBackend;
use crate::{ClientError, ClientResult};

const LISTING_PAGE_SIZE: u32 = 100;
const LISTING_MAX_PAGES: u32 = 50;

#[derive(Debug, Default)]
struct RegistryState {
    /// keyed by path
    api_paths: BTreeMap<String, RbacApiPath>,
    /// keyed by role name
    roles: BTreeMap<String, RbacRole>,
}

/// RBAC registry backed by an [`RbacBackend`]
pub struct PermissionRegistry {
    backend: Arc<dyn RbacBackend>,
    state: RwLock<RegistryState>,
}

impl PermissionRegistry {
    pub fn new(backend: Arc<dyn RbacBackend>) -> Self {
        Self {
            backend,
            state: RwLock::new(RegistryState::default()),
        }
    }

    // ========== Read views ==========

    pub fn api_paths(&self) -> Vec<RbacApiPath> {
        self.state.read().api_paths.values().cloned().collect()
    }

    pub fn api_path(&self, path: &str) -> Option<RbacApiPath> {
        self.state.read().api_paths.get(path).cloned()
    }

    pub fn roles(&self) -> Vec<RbacRole> {
        self.state.read().roles.values().cloned().collect()
    }

    pub fn role(&self, name: &str) -> Option<RbacRole> {
        self.state.read().roles.get(name).cloned()
    }

    /// Names of the mirrored roles that grant `path`
    pub fn roles_referencing(&self, path: &str) -> Vec<String> {
        self.state
            .read()
            .roles
            .values()
            .filter(|role| role.grants(path))
            .map(|role| role.role_name.clone())
            .collect()
    }

    // ========== Listing ==========

    /// Fetch one filtered page of API paths and merge it into the mirror
    pub async fn refresh_api_paths(&self, query: &ApiPathQuery) -> ClientResult<ListPage<RbacApiPath>> {
        let page = self.backend.list_api_paths(query).await?.into_page()?;
        let mut state = self.state.write();
        for path in &page.items {
            state.api_paths.insert(path.api_path.clone(), path.clone());
        }
        Ok(page)
    }

    /// Fetch one filtered page of roles and merge it into the mirror
    ///
    /// The expanded `apiPathList` of each role is merged as API paths too.
    pub async fn refresh_roles(&self, query: &RoleQuery) -> ClientResult<ListPage<RbacRoleWithPaths>> {
        let page = self.backend.list_roles(query).await?.into_page()?;
        let mut state = self.state.write();
        for entry in &page.items {
            merge_role(&mut state, entry);
        }
        Ok(page)
    }

    /// Replace the API path mirror with the backend's complete listing
    ///
    /// Nothing is replaced unless every page arrived.
    pub async fn load_all_api_paths(&self) -> ClientResult<usize> {
        let mut all = BTreeMap::new();
        for page in 1..=LISTING_MAX_PAGES {
            let query = ApiPathQuery::page(Pagination::new(page, LISTING_PAGE_SIZE));
            let listing = self.backend.list_api_paths(&query).await?.into_page()?;
            let fetched = listing.items.len();
            all.extend(listing.items.into_iter().map(|p| (p.api_path.clone(), p)));
            if listing_done(fetched, all.len(), listing.count) {
                break;
            }
        }
        let total = all.len();
        self.state.write().api_paths = all;
        tracing::debug!(total, "API path mirror reloaded");
        Ok(total)
    }

    /// Replace the role mirror with the backend's complete listing
    pub async fn load_all_roles(&self) -> ClientResult<usize> {
        let mut staged = RegistryState::default();
        for page in 1..=LISTING_MAX_PAGES {
            let query = RoleQuery::page(Pagination::new(page, LISTING_PAGE_SIZE));
            let listing = self.backend.list_roles(&query).await?.into_page()?;
            let fetched = listing.items.len();
            for entry in &listing.items {
                merge_role(&mut staged, entry);
            }
            if listing_done(fetched, staged.roles.len(), listing.count) {
                break;
            }
        }
        let total = staged.roles.len();
        let mut state = self.state.write();
        state.roles = staged.roles;
        state.api_paths.extend(staged.api_paths);
        tracing::debug!(total, "role mirror reloaded");
        Ok(total)
    }

    // ========== API path mutations ==========

    pub async fn create_api_path(&self, request: CreateApiPathRequest) -> ClientResult<RbacApiPath> {
        if self.state.read().api_paths.contains_key(&request.api_path) {
            return Err(ClientError::DuplicatePath {
                path: request.api_path,
                reason: None,
            });
        }

        let created = match self.backend.create_api_path(&request).await?.into_result("api path") {
            Ok(created) => created,
            Err(EnvelopeError::Rejected(message)) => {
                tracing::warn!(api_path = %request.api_path, %message, "create api path rejected by backend");
                return Err(ClientError::DuplicatePath {
                    path: request.api_path,
                    reason: Some(message),
                });
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(target: "audit", action = "create", resource = %created.api_path, "api path created");
        self.state
            .write()
            .api_paths
            .insert(created.api_path.clone(), created.clone());
        Ok(created)
    }

    /// Delete an API path that no role grants
    ///
    /// On `PathInUse` the mirrored record stays in place.
    pub async fn delete_api_path(&self, path: &str) -> ClientResult<()> {
        let holders = self.roles_referencing(path);
        if !holders.is_empty() {
            tracing::debug!(api_path = %path, roles = ?holders, "api path still granted");
            return Err(ClientError::PathInUse(path.to_string()));
        }

        let response = self.backend.delete_api_path(path).await?;
        if response.is_assigned {
            if let Some(record) = self.state.write().api_paths.get_mut(path) {
                record.is_assigned_once = true;
            }
            return Err(ClientError::PathInUse(path.to_string()));
        }
        if !response.success {
            return Err(ClientError::Rejected(
                response.message.unwrap_or_else(|| "Unknown error".into()),
            ));
        }

        tracing::info!(target: "audit", action = "delete", resource = %path, "api path deleted");
        self.state.write().api_paths.remove(path);
        Ok(())
    }

    // ========== Role mutations ==========

    pub async fn create_role(&self, request: CreateRoleRequest) -> ClientResult<RbacRole> {
        if self.state.read().roles.contains_key(&request.role_name) {
            return Err(ClientError::DuplicateRole {
                name: request.role_name,
                reason: None,
            });
        }

        let created = match self.backend.create_role(&request).await?.into_result("role") {
            Ok(created) => created,
            Err(EnvelopeError::Rejected(message)) => {
                tracing::warn!(role = %request.role_name, %message, "create role rejected by backend");
                return Err(ClientError::DuplicateRole {
                    name: request.role_name,
                    reason: Some(message),
                });
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(target: "audit", action = "create", resource = %created.role_name, "role created");
        self.state
            .write()
            .roles
            .insert(created.role_name.clone(), created.clone());
        Ok(created)
    }

    /// Delete a role. The API paths it granted are left alone.
    pub async fn delete_role(&self, name: &str) -> ClientResult<()> {
        match self.backend.delete_role(name).await?.into_ack() {
            Ok(_) => {}
            Err(EnvelopeError::Rejected(message)) => {
                tracing::warn!(role = %name, %message, "delete role rejected by backend");
                return Err(ClientError::RoleNotFound {
                    name: name.to_string(),
                    reason: Some(message),
                });
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!(target: "audit", action = "delete", resource = %name, "role deleted");
        self.state.write().roles.remove(name);
        Ok(())
    }

    /// Replace the complete permission set of a role
    ///
    /// Every path must be known to the mirror; load the API paths first.
    pub async fn set_role_permissions(
        &self,
        role_name: &str,
        api_paths: BTreeSet<String>,
    ) -> ClientResult<RbacRole> {
        {
            let state = self.state.read();
            if let Some(unknown) = api_paths.iter().find(|p| !state.api_paths.contains_key(*p)) {
                return Err(ClientError::UnknownApiPath(unknown.clone()));
            }
        }

        let updated = self
            .backend
            .update_role_permissions(role_name, &api_paths)
            .await?
            .into_result("role")?;

        tracing::info!(
            target: "audit",
            action = "set_permissions",
            resource = %role_name,
            granted = api_paths.len(),
            "role permissions replaced"
        );

        let mut state = self.state.write();
        for path in &updated.api_path_permissions {
            if let Some(record) = state.api_paths.get_mut(path) {
                record.is_assigned_once = true;
            }
        }
        state
            .roles
            .insert(updated.role_name.clone(), updated.clone());
        Ok(updated)
    }

    // ========== User roles ==========

    pub async fn get_user_roles(&self, identity: &UserIdentity) -> ClientResult<UserRoles> {
        Ok(self
            .backend
            .get_user_roles(identity)
            .await?
            .into_result("user roles")?)
    }

    /// Replace a user's roles; returns the roles the backend reports afterwards
    pub async fn set_user_roles<I, S>(&self, identity: &UserIdentity, new_roles: I) -> ClientResult<Vec<String>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let roles: BTreeSet<String> = new_roles.into_iter().map(Into::into).collect();
        let request = UpdateUserRolesRequest {
            uid: identity.uid(),
            uuid: identity.uuid().map(str::to_string),
            new_roles: roles.into_iter().collect(),
        };

        let response = self.backend.update_user_roles(&request).await?;
        if !response.success {
            return Err(ClientError::Rejected(
                response.message.unwrap_or_else(|| "Unknown error".into()),
            ));
        }

        tracing::info!(
            target: "audit",
            action = "set_user_roles",
            resource = %identity,
            roles = ?request.new_roles,
            "user roles replaced"
        );
        Ok(response.roles.unwrap_or(request.new_roles))
    }
}

fn merge_role(state: &mut RegistryState, entry: &RbacRoleWithPaths) {
    for path in &entry.api_path_list {
        state.api_paths.insert(path.api_path.clone(), path.clone());
    }
    state
        .roles
        .insert(entry.role.role_name.clone(), entry.role.clone());
}

/// A listing is complete on a short page or once `count` records were seen
fn listing_done(fetched: usize, seen: usize, count: Option<u64>) -> bool {
    fetched < LISTING_PAGE_SIZE as usize || count.is_some_and(|total| seen as u64 >= total)
}
