use crate::application_port::CommunityError;
use crate::domain_model::*;

#[async_trait::async_trait]
pub trait MembershipManager: Send + Sync {
    /// Joining twice is a successful no-op.
    async fn join_by_id(
        &self,
        group_id: &GroupId,
        member: &MemberProfile,
        password: Option<&str>,
    ) -> Result<(), CommunityError>;
    async fn join_by_invite_code(
        &self,
        code: &str,
        member: &MemberProfile,
        password: Option<&str>,
    ) -> Result<GroupId, CommunityError>;
    async fn leave(&self, group_id: &GroupId, uid: &UserId) -> Result<(), CommunityError>;
    async fn set_presence(
        &self,
        group_id: &GroupId,
        uid: &UserId,
        online: bool,
    ) -> Result<(), CommunityError>;
}
