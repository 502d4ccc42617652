use super::records::*;
use super::util::*;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use serde_json::json;
use std::sync::Arc;

pub struct GatewayMessageRepo {
    gateway: Arc<dyn PersistenceGateway>,
}

impl GatewayMessageRepo {
    pub fn new(gateway: Arc<dyn PersistenceGateway>) -> Self {
        GatewayMessageRepo { gateway }
    }
}

#[async_trait::async_trait]
impl MessageRepo for GatewayMessageRepo {
    async fn append(
        &self,
        group_id: &GroupId,
        message: &OutgoingMessage,
    ) -> Result<MessageId, CommunityError> {
        let collection = messages_of(group_id);
        let message_id = MessageId(self.gateway.allocate_id(&collection));

        let message_patch =
            patch_of(&MessageRecord::outgoing(message))?.server_timestamp("timestamp");
        let summary_patch = FieldPatch::new()
            .set("lastMessage.text", json!(message.content.preview()))
            .set("lastMessage.authorId", json!(message.author.id.0))
            .set("lastMessage.authorName", json!(message.author.name))
            .server_timestamp("lastMessage.timestamp");

        let ops = vec![
            AtomicOp::update(GROUPS, group_id.0.as_str(), summary_patch).when(
                Precondition::ArrayContains {
                    field: "membersUidList".into(),
                    value: json!(message.author.id.0),
                },
            ),
            AtomicOp::create(collection, message_id.0.as_str(), message_patch),
        ];

        match self.gateway.run_atomic(ops).await {
            Ok(()) => Ok(message_id),
            Err(e) if is_missing_in(&e, GROUPS) => Err(CommunityError::NotFound("group")),
            Err(e) if is_failed_on(&e, GROUPS) => Err(CommunityError::NotAMember),
            Err(e) => Err(CommunityError::store("append message", e)),
        }
    }

    async fn get(
        &self,
        group_id: &GroupId,
        message_id: &MessageId,
    ) -> Result<Option<GroupMessage>, CommunityError> {
        let doc = self
            .gateway
            .get_document(&messages_of(group_id), &message_id.0)
            .await
            .map_err(|e| CommunityError::store("get message", e))?;

        match doc {
            Some(doc) => decode_message(&doc)
                .map(Some)
                .map_err(|e| CommunityError::store("decode message", e)),
            None => Ok(None),
        }
    }

    async fn set_pinned(
        &self,
        group_id: &GroupId,
        message_id: &MessageId,
        pinned: bool,
    ) -> Result<(), CommunityError> {
        let collection = messages_of(group_id);
        let patch = FieldPatch::new().set("isPinned", json!(pinned));
        match self
            .gateway
            .update_fields(&collection, &message_id.0, patch)
            .await
        {
            Ok(()) => Ok(()),
            Err(e) if is_missing_in(&e, &collection) => Err(CommunityError::NotFound("message")),
            Err(e) => Err(CommunityError::store("pin message", e)),
        }
    }

    async fn delete(
        &self,
        group_id: &GroupId,
        message_id: &MessageId,
    ) -> Result<(), CommunityError> {
        let collection = messages_of(group_id);
        let op = AtomicOp::delete(collection.as_str(), message_id.0.as_str())
            .when(Precondition::Exists);
        match self.gateway.run_atomic(vec![op]).await {
            Ok(()) => Ok(()),
            Err(e) if is_failed_on(&e, &collection) => Err(CommunityError::NotFound("message")),
            Err(e) => Err(CommunityError::store("delete message", e)),
        }
    }

    async fn watch_recent(
        &self,
        group_id: &GroupId,
        limit: PageSize,
    ) -> Result<LiveView<GroupMessage>, CommunityError> {
        tracing::debug!(%group_id, limit = limit.0, "watch messages");
        let query = Query::new(messages_of(group_id))
            .order_by("timestamp", Direction::Descending)
            .limit(limit.as_usize());
        let subscription = self
            .gateway
            .subscribe(query)
            .await
            .map_err(|e| CommunityError::store("watch messages", e))?;

        Ok(LiveView::new(subscription, |documents| {
            let mut messages = decode_all(documents, decode_message);
            messages.reverse();
            messages
        }))
    }
}
