//! HTTP client for network-based API calls

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::models::{
    ApiPathQuery, CatalogEntry, CatalogEntryCreate, CatalogEntryUpdate, CatalogItems, CatalogKind,
    CreateApiPathRequest, CreateRoleRequest, DeleteApiPathRequest, DeleteApiPathResponse,
    DeleteRoleRequest, RbacApiPath, RbacRole, RbacRoleWithPaths, RoleQuery, SelfUserInfo,
    UpdateRolePermissionsRequest, UpdateUserRolesRequest, UpdateUserRolesResponse, UserRoles,
};
use shared::{ApiEnvelope, ListEnvelope, Pagination};
use std::collections::BTreeSet;
use std::time::Duration;

use crate::backend::{RbacBackend, TaxonomyBackend, UserInfoSource};
use crate::rbac::UserIdentity;
use crate::{ClientError, ClientResult, ConsoleConfig};

const RBAC_API: &str = "rbac";
const USER_API: &str = "user";
const NO_QUERY: &[(&str, &str)] = &[];

fn taxonomy_api(kind: CatalogKind) -> &'static str {
    match kind {
        CatalogKind::Tag => "novel/tag",
        CatalogKind::Genre => "novel/genre",
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UserRolesQuery<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    uid: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    uuid: Option<&'a str>,
}

/// HTTP client for the console backend
///
/// Cookies set by the backend are kept and sent back on every request,
/// which is how the session travels.
#[derive(Debug, Clone)]
pub struct NetworkHttpClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl NetworkHttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ConsoleConfig) -> ClientResult<Self> {
        let base_url = config.backend_uri.clone().ok_or(ClientError::NoBackend)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            base_url,
            token: config.token.clone(),
        })
    }

    /// Set the authentication token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Get the current token
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Base URL, ending with `/`
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Make a GET request; `query` fields that are `None` are left out
    pub async fn get<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> ClientResult<T> {
        let url = self.url(path);
        tracing::debug!(%url, "GET");
        let request = self.authorize(self.client.get(&url).query(query));
        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let url = self.url(path);
        tracing::debug!(%url, "POST");
        let request = self.authorize(self.client.post(&url).json(body));
        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Make a POST request without body
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let url = self.url(path);
        tracing::debug!(%url, "POST");
        let request = self.authorize(self.client.post(&url));
        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Make a DELETE request with JSON body
    pub async fn delete_with_body<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let url = self.url(path);
        tracing::debug!(%url, "DELETE");
        let request = self.authorize(self.client.delete(&url).json(body));
        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Handle the HTTP response
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await?;
            tracing::warn!(%status, body = %text, "backend returned error status");
            return Err(status_error(status, text));
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }
}

fn status_error(status: StatusCode, text: String) -> ClientError {
    match status {
        StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
        StatusCode::FORBIDDEN => ClientError::Forbidden(text),
        StatusCode::NOT_FOUND => ClientError::NotFound(text),
        StatusCode::BAD_REQUEST => ClientError::Validation(text),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => ClientError::Timeout,
        _ => ClientError::Internal(format!("{}: {}", status, text)),
    }
}

// ========== RBAC API ==========

#[async_trait]
impl RbacBackend for NetworkHttpClient {
    async fn list_api_paths(&self, query: &ApiPathQuery) -> ClientResult<ListEnvelope<RbacApiPath>> {
        self.get(&format!("{RBAC_API}/getRbacApiPath"), query).await
    }

    async fn create_api_path(
        &self,
        request: &CreateApiPathRequest,
    ) -> ClientResult<ApiEnvelope<RbacApiPath>> {
        self.post(&format!("{RBAC_API}/createRbacApiPath"), request)
            .await
    }

    async fn delete_api_path(&self, api_path: &str) -> ClientResult<DeleteApiPathResponse> {
        let request = DeleteApiPathRequest {
            api_path: api_path.to_string(),
        };
        self.delete_with_body(&format!("{RBAC_API}/deleteRbacApiPath"), &request)
            .await
    }

    async fn list_roles(&self, query: &RoleQuery) -> ClientResult<ListEnvelope<RbacRoleWithPaths>> {
        self.get(&format!("{RBAC_API}/getRbacRole"), query).await
    }

    async fn create_role(&self, request: &CreateRoleRequest) -> ClientResult<ApiEnvelope<RbacRole>> {
        self.post(&format!("{RBAC_API}/createRbacRole"), request)
            .await
    }

    async fn delete_role(&self, role_name: &str) -> ClientResult<ApiEnvelope<()>> {
        let request = DeleteRoleRequest {
            role_name: role_name.to_string(),
        };
        self.delete_with_body(&format!("{RBAC_API}/deleteRbacRole"), &request)
            .await
    }

    async fn update_role_permissions(
        &self,
        role_name: &str,
        api_paths: &BTreeSet<String>,
    ) -> ClientResult<ApiEnvelope<RbacRole>> {
        let request = UpdateRolePermissionsRequest {
            role_name: role_name.to_string(),
            api_path_permissions: api_paths.clone(),
        };
        self.post(&format!("{RBAC_API}/updateApiPathPermissionsForRole"), &request)
            .await
    }

    async fn get_user_roles(&self, identity: &UserIdentity) -> ClientResult<ApiEnvelope<UserRoles>> {
        let query = match identity {
            UserIdentity::Uid(uid) => UserRolesQuery {
                uid: Some(*uid),
                uuid: None,
            },
            UserIdentity::Uuid(uuid) => UserRolesQuery {
                uid: None,
                uuid: Some(uuid.as_str()),
            },
        };
        self.get(&format!("{RBAC_API}/adminGetUserRolesByUid"), &query)
            .await
    }

    async fn update_user_roles(
        &self,
        request: &UpdateUserRolesRequest,
    ) -> ClientResult<UpdateUserRolesResponse> {
        self.post(&format!("{RBAC_API}/adminUpdateUserRole"), request)
            .await
    }
}

// ========== Taxonomy API ==========

#[async_trait]
impl TaxonomyBackend for NetworkHttpClient {
    async fn list_page(
        &self,
        kind: CatalogKind,
        page: u32,
        page_size: u32,
    ) -> ClientResult<ApiEnvelope<CatalogItems>> {
        let query = Pagination::new(page, page_size);
        self.get(&format!("{}/list", taxonomy_api(kind)), &query)
            .await
    }

    async fn create_entry(
        &self,
        kind: CatalogKind,
        request: &CatalogEntryCreate,
    ) -> ClientResult<ApiEnvelope<CatalogEntry>> {
        self.post(&format!("{}/create", taxonomy_api(kind)), request)
            .await
    }

    async fn update_entry(
        &self,
        kind: CatalogKind,
        request: &CatalogEntryUpdate,
    ) -> ClientResult<ApiEnvelope<CatalogEntry>> {
        let body = update_body(kind, request)?;
        self.post(&format!("{}/update", taxonomy_api(kind)), &body)
            .await
    }

    async fn get_entry(&self, kind: CatalogKind, id: u64) -> ClientResult<ApiEnvelope<CatalogEntry>> {
        self.get(&format!("{}/{}", taxonomy_api(kind), id), NO_QUERY)
            .await
    }
}

/// Update payload with the id under the kind's own field name
fn update_body(kind: CatalogKind, request: &CatalogEntryUpdate) -> ClientResult<serde_json::Value> {
    let mut body = serde_json::to_value(request)?;
    match body.as_object_mut() {
        Some(fields) => {
            fields.insert(kind.id_field().to_string(), request.id.into());
            Ok(body)
        }
        None => Err(ClientError::Serialization(
            "update payload is not an object".into(),
        )),
    }
}

// ========== User API ==========

#[async_trait]
impl UserInfoSource for NetworkHttpClient {
    async fn self_user_info(&self) -> ClientResult<ApiEnvelope<SelfUserInfo>> {
        self.post_empty(&format!("{USER_API}/self")).await
    }
}
