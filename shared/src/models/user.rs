//! User Model

use serde::{Deserialize, Serialize};

/// Role every user holds when the backend names none
pub const DEFAULT_ROLE: &str = "user";

/// Information about the logged-in user (`user/self`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelfUserInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
}

impl SelfUserInfo {
    /// Role names, falling back to `["user"]` when the backend omits them
    pub fn roles(&self) -> Vec<String> {
        self.roles
            .clone()
            .unwrap_or_else(|| vec![DEFAULT_ROLE.to_string()])
    }
}
