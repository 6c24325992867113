//! Backend seams
//!
//! The registry, the access checker and the catalog cache talk to the
//! backend only through these traits. Each method returns the endpoint's
//! typed response; deciding what a `success: false` means is left to the
//! caller. [`NetworkHttpClient`](crate::NetworkHttpClient) implements all
//! three over HTTP, tests implement them in memory.

use async_trait::async_trait;
use shared::models::{
    ApiPathQuery, CatalogEntry, CatalogEntryCreate, CatalogEntryUpdate, CatalogItems, CatalogKind,
    CreateApiPathRequest, CreateRoleRequest, DeleteApiPathResponse, RbacApiPath, RbacRole,
    RbacRoleWithPaths, RoleQuery, SelfUserInfo, UpdateUserRolesRequest, UpdateUserRolesResponse,
    UserRoles,
};
use shared::{ApiEnvelope, ListEnvelope};
use std::collections::BTreeSet;

use crate::ClientResult;
use crate::rbac::UserIdentity;

/// RBAC endpoints
#[async_trait]
pub trait RbacBackend: Send + Sync {
    async fn list_api_paths(&self, query: &ApiPathQuery) -> ClientResult<ListEnvelope<RbacApiPath>>;

    async fn create_api_path(
        &self,
        request: &CreateApiPathRequest,
    ) -> ClientResult<ApiEnvelope<RbacApiPath>>;

    async fn delete_api_path(&self, api_path: &str) -> ClientResult<DeleteApiPathResponse>;

    async fn list_roles(&self, query: &RoleQuery) -> ClientResult<ListEnvelope<RbacRoleWithPaths>>;

    async fn create_role(&self, request: &CreateRoleRequest) -> ClientResult<ApiEnvelope<RbacRole>>;

    async fn delete_role(&self, role_name: &str) -> ClientResult<ApiEnvelope<()>>;

    async fn update_role_permissions(
        &self,
        role_name: &str,
        api_paths: &BTreeSet<String>,
    ) -> ClientResult<ApiEnvelope<RbacRole>>;

    async fn get_user_roles(&self, identity: &UserIdentity) -> ClientResult<ApiEnvelope<UserRoles>>;

    async fn update_user_roles(
        &self,
        request: &UpdateUserRolesRequest,
    ) -> ClientResult<UpdateUserRolesResponse>;
}

/// Tag / genre endpoints
#[async_trait]
pub trait TaxonomyBackend: Send + Sync {
    /// One page of the catalog listing (1-based `page`)
    async fn list_page(
        &self,
        kind: CatalogKind,
        page: u32,
        page_size: u32,
    ) -> ClientResult<ApiEnvelope<CatalogItems>>;

    async fn create_entry(
        &self,
        kind: CatalogKind,
        request: &CatalogEntryCreate,
    ) -> ClientResult<ApiEnvelope<CatalogEntry>>;

    async fn update_entry(
        &self,
        kind: CatalogKind,
        request: &CatalogEntryUpdate,
    ) -> ClientResult<ApiEnvelope<CatalogEntry>>;

    async fn get_entry(&self, kind: CatalogKind, id: u64) -> ClientResult<ApiEnvelope<CatalogEntry>>;
}

/// Source of the logged-in user's information
#[async_trait]
pub trait UserInfoSource: Send + Sync {
    async fn self_user_info(&self) -> ClientResult<ApiEnvelope<SelfUserInfo>>;
}
