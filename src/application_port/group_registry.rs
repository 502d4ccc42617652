use crate::application_port::{CommunityError, LiveView};
use crate::domain_model::*;

#[derive(Debug, Clone)]
pub struct CreateGroupInput {
    pub owner: MemberProfile,
    pub name: String,
    pub description: String,
    pub group_type: GroupType,
    pub password: Option<String>,
}

#[async_trait::async_trait]
pub trait GroupRegistry: Send + Sync {
    async fn create(&self, input: CreateGroupInput) -> Result<GroupId, CommunityError>;
    async fn delete(&self, group_id: &GroupId, requesting_uid: &UserId)
    -> Result<(), CommunityError>;
    async fn update_banner(
        &self,
        group_id: &GroupId,
        requesting_uid: &UserId,
        url: &str,
    ) -> Result<(), CommunityError>;
    async fn update_avatar(
        &self,
        group_id: &GroupId,
        requesting_uid: &UserId,
        url: &str,
    ) -> Result<(), CommunityError>;
    async fn update_description(
        &self,
        group_id: &GroupId,
        requesting_uid: &UserId,
        description: &str,
    ) -> Result<(), CommunityError>;
    async fn get_by_id(&self, group_id: &GroupId) -> Result<Option<Group>, CommunityError>;
    async fn list_public(&self) -> Result<LiveView<Group>, CommunityError>;
    async fn list_owned_by(&self, uid: &UserId) -> Result<LiveView<Group>, CommunityError>;
    /// Includes groups the user owns.
    async fn list_member_of(&self, uid: &UserId) -> Result<LiveView<Group>, CommunityError>;
}
