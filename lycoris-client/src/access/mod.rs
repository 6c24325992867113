//! Access decisions
//!
//! [`has_any_role`] is the whole policy: a principal passes when it holds at
//! least one of the required roles. Everything else here is about where the
//! principal's roles come from. [`AccessChecker`] fetches them fresh;
//! [`check_user_role_in`] reuses a [`SelfUserInfo`] the caller already
//! holds. Retrieval failures deny, they never surface as errors.

mod route;

pub use route::{RouteDecision, RouteGuard, RouteRule};

use shared::models::SelfUserInfo;
use std::sync::Arc;

use crate::backend::UserInfoSource;

/// `true` iff `user_roles` and `required` share at least one role
pub fn has_any_role<Q, R>(required: &[Q], user_roles: &[R]) -> bool
where
    Q: AsRef<str>,
    R: AsRef<str>,
{
    required
        .iter()
        .any(|q| user_roles.iter().any(|r| r.as_ref() == q.as_ref()))
}

/// Check against an already fetched user info
pub fn check_user_role_in<Q: AsRef<str>>(required: &[Q], user_info: &SelfUserInfo) -> bool {
    has_any_role(required, user_info.roles().as_slice())
}

/// Fetch-then-check access evaluation
#[derive(Clone)]
pub struct AccessChecker {
    source: Arc<dyn UserInfoSource>,
}

impl AccessChecker {
    pub fn new(source: Arc<dyn UserInfoSource>) -> Self {
        Self { source }
    }

    /// Current user's info, or `None` when it cannot be retrieved
    pub async fn current_user(&self) -> Option<SelfUserInfo> {
        match self.source.self_user_info().await {
            Ok(envelope) => match envelope.into_result("user info") {
                Ok(info) => Some(info),
                Err(e) => {
                    tracing::warn!(target: "security", error = %e, "user info rejected, denying");
                    None
                }
            },
            Err(e) => {
                tracing::warn!(target: "security", error = %e, "user info unavailable, denying");
                None
            }
        }
    }

    /// Fetch the current user's roles, then check them against `required`
    pub async fn get_user_info_and_check_role<Q: AsRef<str>>(&self, required: &[Q]) -> bool {
        match self.current_user().await {
            Some(info) => check_user_role_in(required, &info),
            None => false,
        }
    }

    /// Single-role form of [`get_user_info_and_check_role`](Self::get_user_info_and_check_role)
    pub async fn check_user_role(&self, role: &str) -> bool {
        self.get_user_info_and_check_role(&[role]).await
    }
}
