use crate::application_port::*;
use crate::domain_model::*;
use chrono::{DateTime, Utc};

/// Result of a guarded write whose target state may already hold.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum WriteOutcome {
    Applied,
    Unchanged,
}

pub enum GroupInsert {
    Inserted,
    CodeTaken,
}

#[derive(Debug, Clone)]
pub enum GroupScope {
    Public,
    OwnedBy(UserId),
    MemberOf(UserId),
}

#[derive(Debug, Clone)]
pub enum GroupProfileUpdate {
    Banner(String),
    Avatar(String),
    Description(String),
}

#[async_trait::async_trait]
pub trait GroupRepo: Send + Sync {
    fn next_id(&self) -> GroupId;

    /// Stores the group and claims its invite code in one atomic unit.
    async fn insert(&self, group: &Group) -> Result<GroupInsert, CommunityError>;

    async fn get(&self, group_id: &GroupId) -> Result<Option<Group>, CommunityError>;

    async fn find_by_invite_code(
        &self,
        code: &InviteCode,
    ) -> Result<Option<GroupId>, CommunityError>;

    /// Removes the group, its messages and its invite code.
    async fn delete(&self, group: &Group) -> Result<(), CommunityError>;

    async fn update_profile(
        &self,
        group_id: &GroupId,
        update: GroupProfileUpdate,
    ) -> Result<(), CommunityError>;

    /// `Unchanged` when the uid is already a member.
    async fn add_member(
        &self,
        group_id: &GroupId,
        member: &GroupMember,
    ) -> Result<WriteOutcome, CommunityError>;

    /// `Unchanged` when the uid is not a member.
    async fn remove_member(
        &self,
        group_id: &GroupId,
        uid: &UserId,
    ) -> Result<WriteOutcome, CommunityError>;

    async fn set_presence(
        &self,
        group_id: &GroupId,
        uid: &UserId,
        online: bool,
        at: DateTime<Utc>,
    ) -> Result<WriteOutcome, CommunityError>;

    async fn count_owned(&self, owner: &UserId) -> Result<OwnedGroupCounts, CommunityError>;

    async fn watch(&self, scope: GroupScope) -> Result<LiveView<Group>, CommunityError>;
}
