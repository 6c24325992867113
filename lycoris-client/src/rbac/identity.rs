use std::fmt;

use crate::{ClientError, ClientResult};

/// How a user is addressed by the admin role endpoints: uid or UUID, never both
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UserIdentity {
    Uid(u64),
    Uuid(String),
}

impl UserIdentity {
    /// Build an identity from the two optional fields a form or request carries
    pub fn from_parts(uid: Option<u64>, uuid: Option<&str>) -> ClientResult<Self> {
        let uuid = uuid.map(str::trim).filter(|u| !u.is_empty());
        match (uid, uuid) {
            (Some(_), Some(_)) => Err(ClientError::AmbiguousIdentity),
            (Some(uid), None) => Ok(UserIdentity::Uid(uid)),
            (None, Some(uuid)) => Ok(UserIdentity::Uuid(uuid.to_string())),
            (None, None) => Err(ClientError::MissingIdentity),
        }
    }

    pub fn uid(&self) -> Option<u64> {
        match self {
            UserIdentity::Uid(uid) => Some(*uid),
            UserIdentity::Uuid(_) => None,
        }
    }

    pub fn uuid(&self) -> Option<&str> {
        match self {
            UserIdentity::Uid(_) => None,
            UserIdentity::Uuid(uuid) => Some(uuid),
        }
    }
}

impl fmt::Display for UserIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserIdentity::Uid(uid) => write!(f, "uid:{}", uid),
            UserIdentity::Uuid(uuid) => write!(f, "uuid:{}", uuid),
        }
    }
}
