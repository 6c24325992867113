// lycoris-client/tests/common/mod.rs
// 测试用内存后端

#![allow(dead_code)]

use async_trait::async_trait;
use lycoris_client::{
    CatalogSettings, ClientError, ClientResult, RbacBackend, TaxonomyBackend, UserIdentity,
    UserInfoSource,
};
use parking_lot::Mutex;
use shared::models::{
    ApiPathQuery, CatalogEntry, CatalogEntryCreate, CatalogEntryUpdate, CatalogItems, CatalogKind,
    CreateApiPathRequest, CreateRoleRequest, DeleteApiPathResponse, RbacApiPath, RbacRole,
    RbacRoleWithPaths, RoleQuery, SelfUserInfo, UpdateUserRolesRequest, UpdateUserRolesResponse,
    UserRoles,
};
use shared::{ApiEnvelope, ListEnvelope};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

pub const T0: i64 = 1_700_000_000_000;

pub fn settings() -> CatalogSettings {
    CatalogSettings::default()
}

// ========== Taxonomy ==========

/// Paged tag/genre listing with scripted page sizes
///
/// Page `n` of a listing holds ids `(n-1)*page_size + 1 ..`. Pages past the
/// script are empty unless `endless` is set.
#[derive(Default)]
pub struct FakeTaxonomy {
    sizes: Mutex<Vec<usize>>,
    endless: AtomicBool,
    fail_page: Mutex<Option<u32>>,
    malformed_page: Mutex<Option<u32>>,
    version: AtomicU32,
    delay: Mutex<Option<Duration>>,
    requests: Mutex<Vec<(CatalogKind, u32)>>,
}

impl FakeTaxonomy {
    pub fn with_pages(sizes: &[usize]) -> Self {
        let fake = Self::default();
        fake.set_pages(sizes);
        fake
    }

    /// Every page is full
    pub fn endless() -> Self {
        let fake = Self::default();
        fake.endless.store(true, Ordering::SeqCst);
        fake
    }

    pub fn set_pages(&self, sizes: &[usize]) {
        *self.sizes.lock() = sizes.to_vec();
    }

    pub fn fail_at(&self, page: Option<u32>) {
        *self.fail_page.lock() = page;
    }

    pub fn malformed_at(&self, page: Option<u32>) {
        *self.malformed_page.lock() = page;
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    /// Change every name served from now on
    pub fn bump_version(&self) {
        self.version.fetch_add(1, Ordering::SeqCst);
    }

    pub fn requests(&self, kind: CatalogKind) -> usize {
        self.requests.lock().iter().filter(|(k, _)| *k == kind).count()
    }

    pub fn total_requests(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn pages_requested(&self, kind: CatalogKind) -> Vec<u32> {
        self.requests
            .lock()
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, page)| *page)
            .collect()
    }

    fn entry(&self, id: u64) -> CatalogEntry {
        let version = self.version.load(Ordering::SeqCst);
        CatalogEntry::new(id, format!("slug-{}", id)).with_name("en", format!("v{} #{}", version, id))
    }

    fn page_len(&self, page: u32, page_size: u32) -> usize {
        if self.endless.load(Ordering::SeqCst) {
            return page_size as usize;
        }
        self.sizes
            .lock()
            .get(page as usize - 1)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl TaxonomyBackend for FakeTaxonomy {
    async fn list_page(
        &self,
        kind: CatalogKind,
        page: u32,
        page_size: u32,
    ) -> ClientResult<ApiEnvelope<CatalogItems>> {
        self.requests.lock().push((kind, page));
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if *self.fail_page.lock() == Some(page) {
            return Err(ClientError::Network("connection reset".into()));
        }
        if *self.malformed_page.lock() == Some(page) {
            return Ok(ApiEnvelope::ok(CatalogItems { items: None }));
        }

        let first = (page as u64 - 1) * page_size as u64 + 1;
        let items = (0..self.page_len(page, page_size) as u64)
            .map(|i| self.entry(first + i))
            .collect();
        Ok(ApiEnvelope::ok(CatalogItems::new(items)))
    }

    async fn create_entry(
        &self,
        _kind: CatalogKind,
        request: &CatalogEntryCreate,
    ) -> ClientResult<ApiEnvelope<CatalogEntry>> {
        Ok(ApiEnvelope::ok(
            CatalogEntry::new(90_001, "created").with_name("en", request.name.clone()),
        ))
    }

    async fn update_entry(
        &self,
        _kind: CatalogKind,
        request: &CatalogEntryUpdate,
    ) -> ClientResult<ApiEnvelope<CatalogEntry>> {
        let mut entry = self.entry(request.id);
        if let Some(name) = &request.name {
            entry.names.insert("en".into(), name.clone());
        }
        Ok(ApiEnvelope::ok(entry))
    }

    async fn get_entry(&self, _kind: CatalogKind, id: u64) -> ClientResult<ApiEnvelope<CatalogEntry>> {
        if id == 0 {
            return Ok(ApiEnvelope::fail("entry not found"));
        }
        Ok(ApiEnvelope::ok(self.entry(id)))
    }
}

// ========== RBAC ==========

#[derive(Default)]
struct RbacState {
    api_paths: BTreeMap<String, RbacApiPath>,
    roles: BTreeMap<String, RbacRole>,
    user_roles: HashMap<u64, Vec<String>>,
}

/// RBAC backend enforcing the same rules a real one does
#[derive(Default)]
pub struct FakeRbac {
    state: Mutex<RbacState>,
    calls: Mutex<Vec<&'static str>>,
    /// When set, creates and role deletes answer `success: false` with it
    refusal: Mutex<Option<String>>,
}

pub fn api_path(path: &str) -> RbacApiPath {
    RbacApiPath {
        api_path_uuid: format!("uuid-{}", path),
        api_path: path.to_string(),
        api_path_type: None,
        api_path_color: None,
        api_path_description: None,
        creator_uuid: "admin".into(),
        last_editor_uuid: "admin".into(),
        create_date_time: T0,
        edit_date_time: T0,
        is_assigned_once: false,
    }
}

pub fn role(name: &str, paths: &[&str]) -> RbacRole {
    RbacRole {
        role_uuid: format!("uuid-{}", name),
        role_name: name.to_string(),
        role_type: None,
        role_color: None,
        role_description: None,
        api_path_permissions: paths.iter().map(|p| p.to_string()).collect(),
        creator_uuid: "admin".into(),
        last_editor_uuid: "admin".into(),
        create_date_time: T0,
        edit_date_time: T0,
    }
}

impl FakeRbac {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed server-side API paths without going through the client
    pub fn seed_paths(&self, paths: &[&str]) {
        let mut state = self.state.lock();
        for path in paths {
            state.api_paths.insert(path.to_string(), api_path(path));
        }
    }

    pub fn seed_role(&self, name: &str, granted: &[&str]) {
        self.state
            .lock()
            .roles
            .insert(name.to_string(), role(name, granted));
    }

    pub fn seed_user(&self, uid: u64, roles: &[&str]) {
        self.state
            .lock()
            .user_roles
            .insert(uid, roles.iter().map(|r| r.to_string()).collect());
    }

    /// Refuse every create and role delete, as a backend does for a caller
    /// lacking the permission
    pub fn refuse_writes(&self, message: &str) {
        *self.refusal.lock() = Some(message.to_string());
    }

    fn refused<T>(&self) -> Option<ApiEnvelope<T>> {
        self.refusal.lock().clone().map(ApiEnvelope::fail)
    }

    pub fn has_path(&self, path: &str) -> bool {
        self.state.lock().api_paths.contains_key(path)
    }

    pub fn calls(&self, method: &str) -> usize {
        self.calls.lock().iter().filter(|c| **c == method).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().len()
    }

    fn record(&self, method: &'static str) {
        self.calls.lock().push(method);
    }
}

fn paginate<T: Clone>(items: Vec<T>, page: u32, page_size: u32) -> ListEnvelope<T> {
    let count = items.len() as u64;
    let start = (page.saturating_sub(1) * page_size) as usize;
    let page_items = items.into_iter().skip(start).take(page_size as usize).collect();
    ListEnvelope::ok(page_items, count)
}

#[async_trait]
impl RbacBackend for FakeRbac {
    async fn list_api_paths(&self, query: &ApiPathQuery) -> ClientResult<ListEnvelope<RbacApiPath>> {
        self.record("list_api_paths");
        let state = self.state.lock();
        let items: Vec<_> = state
            .api_paths
            .values()
            .filter(|p| query.api_path.as_ref().is_none_or(|q| p.api_path.contains(q.as_str())))
            .cloned()
            .collect();
        Ok(paginate(items, query.page, query.page_size))
    }

    async fn create_api_path(
        &self,
        request: &CreateApiPathRequest,
    ) -> ClientResult<ApiEnvelope<RbacApiPath>> {
        self.record("create_api_path");
        if let Some(refused) = self.refused() {
            return Ok(refused);
        }
        let mut state = self.state.lock();
        if state.api_paths.contains_key(&request.api_path) {
            return Ok(ApiEnvelope::fail("api path already exists"));
        }
        let mut created = api_path(&request.api_path);
        created.api_path_type = request.api_path_type.clone();
        created.api_path_color = request.api_path_color.clone();
        created.api_path_description = request.api_path_description.clone();
        state.api_paths.insert(created.api_path.clone(), created.clone());
        Ok(ApiEnvelope::ok(created))
    }

    async fn delete_api_path(&self, api_path: &str) -> ClientResult<DeleteApiPathResponse> {
        self.record("delete_api_path");
        let mut state = self.state.lock();
        if state.roles.values().any(|r| r.grants(api_path)) {
            return Ok(DeleteApiPathResponse {
                success: false,
                message: Some("api path is assigned".into()),
                is_assigned: true,
            });
        }
        let removed = state.api_paths.remove(api_path).is_some();
        Ok(DeleteApiPathResponse {
            success: removed,
            message: (!removed).then(|| "api path not found".to_string()),
            is_assigned: false,
        })
    }

    async fn list_roles(&self, query: &RoleQuery) -> ClientResult<ListEnvelope<RbacRoleWithPaths>> {
        self.record("list_roles");
        let state = self.state.lock();
        let items: Vec<_> = state
            .roles
            .values()
            .map(|role| RbacRoleWithPaths {
                role: role.clone(),
                api_path_list: role
                    .api_path_permissions
                    .iter()
                    .filter_map(|p| state.api_paths.get(p).cloned())
                    .collect(),
            })
            .collect();
        Ok(paginate(items, query.page, query.page_size))
    }

    async fn create_role(&self, request: &CreateRoleRequest) -> ClientResult<ApiEnvelope<RbacRole>> {
        self.record("create_role");
        if let Some(refused) = self.refused() {
            return Ok(refused);
        }
        let mut state = self.state.lock();
        if state.roles.contains_key(&request.role_name) {
            return Ok(ApiEnvelope::fail("role already exists"));
        }
        let created = role(&request.role_name, &[]);
        state.roles.insert(created.role_name.clone(), created.clone());
        Ok(ApiEnvelope::ok(created))
    }

    async fn delete_role(&self, role_name: &str) -> ClientResult<ApiEnvelope<()>> {
        self.record("delete_role");
        if let Some(refused) = self.refused() {
            return Ok(refused);
        }
        match self.state.lock().roles.remove(role_name) {
            Some(_) => Ok(ApiEnvelope {
                success: true,
                message: None,
                result: None,
            }),
            None => Ok(ApiEnvelope::fail("role not found")),
        }
    }

    async fn update_role_permissions(
        &self,
        role_name: &str,
        api_paths: &BTreeSet<String>,
    ) -> ClientResult<ApiEnvelope<RbacRole>> {
        self.record("update_role_permissions");
        let mut state = self.state.lock();
        if let Some(unknown) = api_paths.iter().find(|p| !state.api_paths.contains_key(*p)) {
            return Ok(ApiEnvelope::fail(format!("unknown api path {}", unknown)));
        }
        for path in api_paths {
            if let Some(record) = state.api_paths.get_mut(path) {
                record.is_assigned_once = true;
            }
        }
        match state.roles.get_mut(role_name) {
            Some(role) => {
                role.api_path_permissions = api_paths.clone();
                Ok(ApiEnvelope::ok(role.clone()))
            }
            None => Ok(ApiEnvelope::fail("role not found")),
        }
    }

    async fn get_user_roles(&self, identity: &UserIdentity) -> ClientResult<ApiEnvelope<UserRoles>> {
        self.record("get_user_roles");
        let state = self.state.lock();
        let Some(uid) = identity.uid() else {
            return Ok(ApiEnvelope::fail("unknown user"));
        };
        let Some(names) = state.user_roles.get(&uid) else {
            return Ok(ApiEnvelope::fail("unknown user"));
        };
        Ok(ApiEnvelope::ok(UserRoles {
            uid,
            uuid: format!("user-{}", uid),
            username: format!("user{}", uid),
            user_nickname: None,
            avatar: None,
            roles: names
                .iter()
                .map(|n| state.roles.get(n).cloned().unwrap_or_else(|| role(n, &[])))
                .collect(),
        }))
    }

    async fn update_user_roles(
        &self,
        request: &UpdateUserRolesRequest,
    ) -> ClientResult<UpdateUserRolesResponse> {
        self.record("update_user_roles");
        let Some(uid) = request.uid else {
            return Ok(UpdateUserRolesResponse {
                success: false,
                message: Some("uid required".into()),
                roles: None,
            });
        };
        self.state
            .lock()
            .user_roles
            .insert(uid, request.new_roles.clone());
        Ok(UpdateUserRolesResponse {
            success: true,
            message: None,
            roles: Some(request.new_roles.clone()),
        })
    }
}

// ========== User info ==========

pub enum UserInfoReply {
    Roles(Option<Vec<String>>),
    Rejected,
    Unreachable,
}

pub struct FakeUserInfo {
    reply: Mutex<UserInfoReply>,
    calls: AtomicU32,
}

impl FakeUserInfo {
    pub fn with_roles(roles: &[&str]) -> Self {
        Self::replying(UserInfoReply::Roles(Some(
            roles.iter().map(|r| r.to_string()).collect(),
        )))
    }

    pub fn replying(reply: UserInfoReply) -> Self {
        Self {
            reply: Mutex::new(reply),
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserInfoSource for FakeUserInfo {
    async fn self_user_info(&self) -> ClientResult<ApiEnvelope<SelfUserInfo>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &*self.reply.lock() {
            UserInfoReply::Roles(roles) => Ok(ApiEnvelope::ok(SelfUserInfo {
                uid: Some(1),
                roles: roles.clone(),
                ..Default::default()
            })),
            UserInfoReply::Rejected => Ok(ApiEnvelope::fail("not logged in")),
            UserInfoReply::Unreachable => Err(ClientError::Timeout),
        }
    }
}
