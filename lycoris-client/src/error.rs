//! Client error types

use shared::EnvelopeError;
use shared::models::CatalogKind;
use thiserror::Error;

/// Client error type
///
/// `Clone` so that callers awaiting the same catalog reload all receive
/// its outcome; transport errors are flattened to strings at the reqwest
/// boundary for that reason.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// Request could not be completed
    #[error("Network error: {0}")]
    Network(String),

    /// Request exceeded its timeout
    #[error("Request timed out")]
    Timeout,

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Authentication required
    #[error("Authentication required")]
    Unauthorized,

    /// Permission denied
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Backend answered `success: false`
    #[error("Rejected by backend: {0}")]
    Rejected(String),

    /// Client runs without a backend
    #[error("No backend configured")]
    NoBackend,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    // ========== Registry ==========
    // `reason` is the backend's message when the backend refused the
    // request, `None` when the local mirror caught it first
    #[error("API path already exists: {path}{}", backend_note(.reason))]
    DuplicatePath { path: String, reason: Option<String> },

    #[error("API path is still assigned to a role: {0}")]
    PathInUse(String),

    #[error("Unknown API path: {0}")]
    UnknownApiPath(String),

    #[error("Role already exists: {name}{}", backend_note(.reason))]
    DuplicateRole { name: String, reason: Option<String> },

    #[error("Role not found: {name}{}", backend_note(.reason))]
    RoleNotFound { name: String, reason: Option<String> },

    #[error("User identity must be either uid or uuid, not both")]
    AmbiguousIdentity,

    #[error("User identity requires a uid or a uuid")]
    MissingIdentity,

    // ========== Catalog ==========
    /// Catalog reload stopped mid-pagination; the previous snapshot is kept
    #[error("{kind} reload aborted at page {page} after {loaded} entries: {source}")]
    PartialLoadAborted {
        kind: CatalogKind,
        page: u32,
        loaded: usize,
        #[source]
        source: Box<ClientError>,
    },

    /// Persisted snapshot store failure
    #[error("Storage error: {0}")]
    Storage(String),
}

impl ClientError {
    /// Whether the error came from the transport rather than the backend's answer
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Network(_) | ClientError::Timeout)
    }

    /// Backend message behind a registry error, if the backend produced it
    pub fn backend_reason(&self) -> Option<&str> {
        match self {
            ClientError::DuplicatePath { reason, .. }
            | ClientError::DuplicateRole { reason, .. }
            | ClientError::RoleNotFound { reason, .. } => reason.as_deref(),
            ClientError::Rejected(message) => Some(message),
            _ => None,
        }
    }
}

fn backend_note(reason: &Option<String>) -> String {
    match reason {
        Some(reason) => format!(" (backend: {})", reason),
        None => String::new(),
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ClientError::Timeout
        } else if e.is_decode() {
            ClientError::InvalidResponse(e.to_string())
        } else {
            ClientError::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Serialization(e.to_string())
    }
}

impl From<EnvelopeError> for ClientError {
    fn from(e: EnvelopeError) -> Self {
        match e {
            EnvelopeError::Rejected(message) => ClientError::Rejected(message),
            EnvelopeError::MissingResult(what) => {
                ClientError::InvalidResponse(format!("Missing {} data", what))
            }
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_errors_map_to_client_errors() {
        let err: ClientError = EnvelopeError::Rejected("nope".into()).into();
        assert!(matches!(err, ClientError::Rejected(ref m) if m == "nope"));

        let err: ClientError = EnvelopeError::MissingResult("role").into();
        assert!(matches!(err, ClientError::InvalidResponse(_)));
    }

    #[test]
    fn test_registry_errors_carry_backend_reason() {
        let local = ClientError::DuplicatePath {
            path: "/novel/list".into(),
            reason: None,
        };
        assert_eq!(local.to_string(), "API path already exists: /novel/list");
        assert_eq!(local.backend_reason(), None);

        let remote = ClientError::RoleNotFound {
            name: "editor".into(),
            reason: Some("permission denied".into()),
        };
        assert_eq!(
            remote.to_string(),
            "Role not found: editor (backend: permission denied)"
        );
        assert_eq!(remote.backend_reason(), Some("permission denied"));
    }

    #[test]
    fn test_partial_load_message_names_page() {
        let err = ClientError::PartialLoadAborted {
            kind: CatalogKind::Tag,
            page: 2,
            loaded: 100,
            source: Box::new(ClientError::Timeout),
        };
        assert_eq!(
            err.to_string(),
            "tag reload aborted at page 2 after 100 entries: Request timed out"
        );
        assert!(!err.is_transport());
    }
}
