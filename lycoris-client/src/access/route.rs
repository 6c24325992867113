// lycoris-client/src/access/route.rs
// 路由守卫 - 按路径检查所需角色

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{AccessChecker, check_user_role_in};
use crate::ClientError;

/// Outcome of a route check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteDecision {
    Allow,
    Deny,
}

impl RouteDecision {
    pub fn is_allowed(self) -> bool {
        matches!(self, RouteDecision::Allow)
    }

    fn from_bool(allowed: bool) -> Self {
        if allowed {
            RouteDecision::Allow
        } else {
            RouteDecision::Deny
        }
    }
}

impl fmt::Display for RouteDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteDecision::Allow => f.write_str("allow"),
            RouteDecision::Deny => f.write_str("deny"),
        }
    }
}

impl FromStr for RouteDecision {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "allow" => Ok(RouteDecision::Allow),
            "deny" => Ok(RouteDecision::Deny),
            other => Err(ClientError::Config(format!(
                "invalid route decision '{}', expected allow or deny",
                other
            ))),
        }
    }
}

/// Exact path → roles of which the user needs at least one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRule {
    pub path: String,
    pub required_roles: Vec<String>,
}

impl RouteRule {
    pub fn new<I, S>(path: impl Into<String>, required_roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: path.into(),
            required_roles: required_roles.into_iter().map(Into::into).collect(),
        }
    }
}

/// Route guard for console navigation
#[derive(Clone)]
pub struct RouteGuard {
    rules: Vec<RouteRule>,
    default_decision: RouteDecision,
    /// `None` when running without a backend
    checker: Option<AccessChecker>,
}

impl RouteGuard {
    pub fn new(checker: AccessChecker, rules: Vec<RouteRule>, default_decision: RouteDecision) -> Self {
        Self {
            rules,
            default_decision,
            checker: Some(checker),
        }
    }

    /// Guard that lets everything through; there is nobody to ask
    pub fn without_backend() -> Self {
        Self {
            rules: Vec::new(),
            default_decision: RouteDecision::Allow,
            checker: None,
        }
    }

    /// The console's protected pages
    pub fn console_rules() -> Vec<RouteRule> {
        vec![
            RouteRule::new("/user/manage", ["administrator"]),
            RouteRule::new("/stg-secret", ["developer"]),
            RouteRule::new("/rbac/api-path", ["root", "developer"]),
            RouteRule::new("/rbac/role", ["root"]),
            RouteRule::new("/rbac/user-roles", ["root"]),
        ]
    }

    pub fn default_decision(&self) -> RouteDecision {
        self.default_decision
    }

    /// First rule for `path`, if any
    pub fn rule_for(&self, path: &str) -> Option<&RouteRule> {
        self.rules.iter().find(|rule| rule.path == path)
    }

    /// Decide navigation to `path`, fetching the user's roles if a rule applies
    pub async fn authorize(&self, path: &str) -> RouteDecision {
        let Some(checker) = &self.checker else {
            return RouteDecision::Allow;
        };
        let Some(rule) = self.rule_for(path) else {
            tracing::debug!(%path, decision = %self.default_decision, "no route rule");
            return self.default_decision;
        };

        let allowed = checker
            .get_user_info_and_check_role(rule.required_roles.as_slice())
            .await;
        let decision = RouteDecision::from_bool(allowed);
        self.log_decision(path, rule, decision);
        decision
    }

    /// Decide navigation to `path` using user info the caller already holds
    pub fn authorize_with(&self, path: &str, user_info: &shared::models::SelfUserInfo) -> RouteDecision {
        if self.checker.is_none() {
            return RouteDecision::Allow;
        }
        let Some(rule) = self.rule_for(path) else {
            return self.default_decision;
        };

        let allowed = check_user_role_in(rule.required_roles.as_slice(), user_info);
        let decision = RouteDecision::from_bool(allowed);
        self.log_decision(path, rule, decision);
        decision
    }

    fn log_decision(&self, path: &str, rule: &RouteRule, decision: RouteDecision) {
        if decision.is_allowed() {
            tracing::debug!(%path, "route allowed");
        } else {
            tracing::warn!(
                target: "security",
                event = "route_denied",
                %path,
                required = ?rule.required_roles,
                "route denied"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_parse() {
        assert_eq!("allow".parse::<RouteDecision>().unwrap(), RouteDecision::Allow);
        assert_eq!(" DENY ".parse::<RouteDecision>().unwrap(), RouteDecision::Deny);
        assert!("maybe".parse::<RouteDecision>().is_err());
    }

    #[test]
    fn test_console_rules_cover_rbac_pages() {
        let rules = RouteGuard::console_rules();
        let role_page = rules.iter().find(|r| r.path == "/rbac/role").unwrap();
        assert_eq!(role_page.required_roles, vec!["root".to_string()]);
        assert_eq!(rules.len(), 5);
    }

    #[tokio::test]
    async fn test_without_backend_allows_everything() {
        let guard = RouteGuard::without_backend();
        assert_eq!(guard.authorize("/rbac/role").await, RouteDecision::Allow);
        assert_eq!(
            guard.authorize_with("/rbac/role", &Default::default()),
            RouteDecision::Allow
        );
    }
}
