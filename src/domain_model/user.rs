use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity issued by the external auth provider. Opaque to this crate.
#[derive(Debug, Clone, Default, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        UserId(s.to_owned())
    }
}

/// What a caller knows about the user joining or creating a group.
#[derive(Debug, Clone, Default)]
pub struct MemberProfile {
    pub uid: UserId,
    pub email: Option<String>,
    pub username: Option<String>,
    pub avatar: Option<String>,
}

impl MemberProfile {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: UserId(uid.into()),
            ..Default::default()
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }
}

/// Denormalised counters kept on the user document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserStats {
    pub followers_count: i64,
    pub following_count: i64,
    pub public_group_count: i64,
    pub private_group_count: i64,
}
