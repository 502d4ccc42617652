use crate::application_port::{CommunityError, LiveView};
use crate::domain_model::*;

#[async_trait::async_trait]
pub trait MessageStream: Send + Sync {
    async fn send(
        &self,
        group_id: &GroupId,
        message: OutgoingMessage,
    ) -> Result<MessageId, CommunityError>;
    async fn pin(
        &self,
        group_id: &GroupId,
        message_id: &MessageId,
        requesting_uid: &UserId,
        pinned: bool,
    ) -> Result<(), CommunityError>;
    async fn delete(
        &self,
        group_id: &GroupId,
        message_id: &MessageId,
        requesting_uid: &UserId,
    ) -> Result<(), CommunityError>;
    /// Snapshots arrive pinned-first, then by ascending timestamp.
    async fn list(
        &self,
        group_id: &GroupId,
        limit: PageSize,
    ) -> Result<LiveView<GroupMessage>, CommunityError>;
}
