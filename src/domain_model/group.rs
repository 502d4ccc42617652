use crate::domain_model::{InviteCode, MemberProfile, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub String);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for GroupId {
    fn from(s: &str) -> Self {
        GroupId(s.to_owned())
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupType {
    Public,
    Private,
}

impl GroupType {
    pub fn is_private(self) -> bool {
        matches!(self, GroupType::Private)
    }
}

impl fmt::Display for GroupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupType::Public => write!(f, "public"),
            GroupType::Private => write!(f, "private"),
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupMemberRole {
    Owner,
    Member,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMember {
    pub uid: UserId,
    pub email: Option<String>,
    pub role: GroupMemberRole,
    pub joined_at: DateTime<Utc>,
    pub is_online: bool,
    pub last_seen: DateTime<Utc>,
    pub username: Option<String>,
    pub avatar: Option<String>,
}

impl GroupMember {
    /// A freshly joined member is considered online.
    pub fn joining(profile: &MemberProfile, role: GroupMemberRole, now: DateTime<Utc>) -> Self {
        Self {
            uid: profile.uid.clone(),
            email: profile.email.clone(),
            role,
            joined_at: now,
            is_online: true,
            last_seen: now,
            username: profile.username.clone(),
            avatar: profile.avatar.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastMessage {
    pub text: String,
    pub author_id: UserId,
    pub author_name: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub description: String,
    pub group_type: GroupType,
    pub owner_uid: UserId,
    pub password_hash: Option<String>,
    pub invite_code: InviteCode,
    pub members: Vec<GroupMember>,
    pub avatar_url: Option<String>,
    pub banner_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_message: Option<LastMessage>,
}

impl Group {
    pub fn is_private(&self) -> bool {
        self.group_type.is_private()
    }

    pub fn is_owner(&self, uid: &UserId) -> bool {
        &self.owner_uid == uid
    }

    pub fn is_member(&self, uid: &UserId) -> bool {
        self.member(uid).is_some()
    }

    pub fn member(&self, uid: &UserId) -> Option<&GroupMember> {
        self.members.iter().find(|m| &m.uid == uid)
    }

    /// The uid index mirrored next to `members` in storage.
    pub fn member_uids(&self) -> Vec<UserId> {
        self.members.iter().map(|m| m.uid.clone()).collect()
    }
}

/// Live per-type count of groups an owner currently has.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct OwnedGroupCounts {
    pub public: u32,
    pub private: u32,
}

impl OwnedGroupCounts {
    pub fn get(&self, group_type: GroupType) -> u32 {
        match group_type {
            GroupType::Public => self.public,
            GroupType::Private => self.private,
        }
    }
}
