//! RBAC Model
//!
//! API paths, roles and the role → API path bindings, in the camelCase
//! shape the console backend speaks. Timestamps are Unix millis.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::response::Pagination;

/// API path entity (一个可被授权的后端操作)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RbacApiPath {
    pub api_path_uuid: String,
    /// Globally unique
    pub api_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_path_type: Option<String>,
    /// e.g. `#66CCFFFF`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_path_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_path_description: Option<String>,
    pub creator_uuid: String,
    pub last_editor_uuid: String,
    pub create_date_time: i64,
    pub edit_date_time: i64,
    /// Has ever been granted by a role
    #[serde(default)]
    pub is_assigned_once: bool,
}

/// Role entity (RBAC 角色)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RbacRole {
    pub role_uuid: String,
    /// Globally unique
    pub role_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_description: Option<String>,
    /// Granted API paths. A set: order and duplicates carry no meaning.
    #[serde(default)]
    pub api_path_permissions: BTreeSet<String>,
    pub creator_uuid: String,
    pub last_editor_uuid: String,
    pub create_date_time: i64,
    pub edit_date_time: i64,
}

impl RbacRole {
    pub fn grants(&self, api_path: &str) -> bool {
        self.api_path_permissions.contains(api_path)
    }
}

/// Role as returned by the role listing, with its API paths expanded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RbacRoleWithPaths {
    #[serde(flatten)]
    pub role: RbacRole,
    #[serde(default)]
    pub api_path_list: Vec<RbacApiPath>,
}

// =============================================================================
// API path payloads
// =============================================================================

/// Create API path payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateApiPathRequest {
    pub api_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_path_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_path_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_path_description: Option<String>,
}

impl CreateApiPathRequest {
    pub fn new(api_path: impl Into<String>) -> Self {
        Self {
            api_path: api_path.into(),
            ..Default::default()
        }
    }

    pub fn with_type(mut self, api_path_type: impl Into<String>) -> Self {
        self.api_path_type = Some(api_path_type.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.api_path_color = Some(color.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.api_path_description = Some(description.into());
        self
    }
}

/// Delete API path payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteApiPathRequest {
    pub api_path: String,
}

/// Delete API path response
///
/// `is_assigned` is set when the path is still granted by a role, in which
/// case the backend refuses the delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteApiPathResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub is_assigned: bool,
}

/// API path listing filter (search fields + pagination, flattened into the query string)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPathQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_path_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_path_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_path_description: Option<String>,
    pub page: u32,
    pub page_size: u32,
}

impl ApiPathQuery {
    pub fn page(pagination: Pagination) -> Self {
        Self {
            page: pagination.page,
            page_size: pagination.page_size,
            ..Default::default()
        }
    }
}

// =============================================================================
// Role payloads
// =============================================================================

/// Create role payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoleRequest {
    pub role_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_description: Option<String>,
}

impl CreateRoleRequest {
    pub fn new(role_name: impl Into<String>) -> Self {
        Self {
            role_name: role_name.into(),
            ..Default::default()
        }
    }

    pub fn with_type(mut self, role_type: impl Into<String>) -> Self {
        self.role_type = Some(role_type.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.role_color = Some(color.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.role_description = Some(description.into());
        self
    }
}

/// Delete role payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRoleRequest {
    pub role_name: String,
}

/// Role listing filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_description: Option<String>,
    pub page: u32,
    pub page_size: u32,
}

impl RoleQuery {
    pub fn page(pagination: Pagination) -> Self {
        Self {
            page: pagination.page,
            page_size: pagination.page_size,
            ..Default::default()
        }
    }
}

/// Replace a role's permission set (full replacement, never a patch)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRolePermissionsRequest {
    pub role_name: String,
    pub api_path_permissions: BTreeSet<String>,
}

// =============================================================================
// User role payloads
// =============================================================================

/// A user's roles as seen by an administrator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRoles {
    pub uid: u64,
    pub uuid: String,
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default)]
    pub roles: Vec<RbacRole>,
}

impl UserRoles {
    pub fn role_names(&self) -> Vec<String> {
        self.roles.iter().map(|r| r.role_name.clone()).collect()
    }
}

/// Replace a user's roles. Exactly one of `uid`/`uuid` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRolesRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    pub new_roles: Vec<String>,
}

/// Response to a user role update
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRolesResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Roles after the update
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_permissions_are_a_set() {
        let json = r#"{
            "roleUuid": "r-1",
            "roleName": "developer",
            "apiPathPermissions": ["/b", "/a", "/b"],
            "creatorUuid": "u-1",
            "lastEditorUuid": "u-1",
            "createDateTime": 1,
            "editDateTime": 2
        }"#;
        let role: RbacRole = serde_json::from_str(json).unwrap();
        assert_eq!(role.api_path_permissions.len(), 2);
        assert!(role.grants("/a"));
        assert!(!role.grants("/c"));
    }

    #[test]
    fn test_role_with_paths_flattens() {
        let json = r#"{
            "roleUuid": "r-1",
            "roleName": "root",
            "apiPathPermissions": [],
            "creatorUuid": "u-1",
            "lastEditorUuid": "u-1",
            "createDateTime": 1,
            "editDateTime": 2,
            "apiPathList": []
        }"#;
        let role: RbacRoleWithPaths = serde_json::from_str(json).unwrap();
        assert_eq!(role.role.role_name, "root");
        assert!(role.api_path_list.is_empty());
    }

    #[test]
    fn test_update_user_roles_skips_missing_identity_field() {
        let req = UpdateUserRolesRequest {
            uid: None,
            uuid: Some("abc".to_string()),
            new_roles: vec!["root".to_string()],
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json, serde_json::json!({"uuid": "abc", "newRoles": ["root"]}));
    }

    #[test]
    fn test_api_path_defaults_unassigned() {
        let json = r#"{
            "apiPathUuid": "p-1",
            "apiPath": "/video/upload",
            "creatorUuid": "u-1",
            "lastEditorUuid": "u-1",
            "createDateTime": 1,
            "editDateTime": 1
        }"#;
        let path: RbacApiPath = serde_json::from_str(json).unwrap();
        assert!(!path.is_assigned_once);
        assert_eq!(path.api_path_type, None);
    }
}
