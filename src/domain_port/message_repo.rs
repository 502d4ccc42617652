use crate::application_port::*;
use crate::domain_model::*;

#[async_trait::async_trait]
pub trait MessageRepo: Send + Sync {
    /// Appends the message and refreshes the group's `lastMessage` in one
    /// atomic unit, guarded on the author still being a member.
    async fn append(
        &self,
        group_id: &GroupId,
        message: &OutgoingMessage,
    ) -> Result<MessageId, CommunityError>;

    async fn get(
        &self,
        group_id: &GroupId,
        message_id: &MessageId,
    ) -> Result<Option<GroupMessage>, CommunityError>;

    async fn set_pinned(
        &self,
        group_id: &GroupId,
        message_id: &MessageId,
        pinned: bool,
    ) -> Result<(), CommunityError>;

    async fn delete(&self, group_id: &GroupId, message_id: &MessageId)
    -> Result<(), CommunityError>;

    /// Most recent `limit` messages in ascending timestamp order.
    async fn watch_recent(
        &self,
        group_id: &GroupId,
        limit: PageSize,
    ) -> Result<LiveView<GroupMessage>, CommunityError>;
}
