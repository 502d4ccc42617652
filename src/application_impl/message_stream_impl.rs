use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use std::sync::Arc;

pub struct RealMessageStream {
    group_repo: Arc<dyn GroupRepo>,
    message_repo: Arc<dyn MessageRepo>,
}

impl RealMessageStream {
    pub fn new(group_repo: Arc<dyn GroupRepo>, message_repo: Arc<dyn MessageRepo>) -> Self {
        Self {
            group_repo,
            message_repo,
        }
    }

    async fn group(&self, group_id: &GroupId) -> Result<Group, CommunityError> {
        self.group_repo
            .get(group_id)
            .await?
            .ok_or(CommunityError::NotFound("group"))
    }

    async fn owned_message(
        &self,
        group_id: &GroupId,
        message_id: &MessageId,
        requesting_uid: &UserId,
    ) -> Result<(), CommunityError> {
        let group = self.group(group_id).await?;
        if !group.is_owner(requesting_uid) {
            return Err(CommunityError::NotOwner);
        }
        self.message_repo
            .get(group_id, message_id)
            .await?
            .ok_or(CommunityError::NotFound("message"))?;
        Ok(())
    }
}

fn validate(content: &MessageContent) -> Result<(), CommunityError> {
    match content {
        MessageContent::Text { text } if text.trim().is_empty() => Err(
            CommunityError::InvalidMessage("text must not be empty".to_owned()),
        ),
        MessageContent::Image { url, .. } if url.trim().is_empty() => Err(
            CommunityError::InvalidMessage("image url must not be empty".to_owned()),
        ),
        _ => Ok(()),
    }
}

#[async_trait::async_trait]
impl MessageStream for RealMessageStream {
    async fn send(
        &self,
        group_id: &GroupId,
        message: OutgoingMessage,
    ) -> Result<MessageId, CommunityError> {
        validate(&message.content)?;
        let group = self.group(group_id).await?;
        if !group.is_member(&message.author.id) {
            return Err(CommunityError::NotAMember);
        }

        let message_id = self.message_repo.append(group_id, &message).await?;
        tracing::debug!(%group_id, %message_id, author = %message.author.id, "message sent");
        Ok(message_id)
    }

    async fn pin(
        &self,
        group_id: &GroupId,
        message_id: &MessageId,
        requesting_uid: &UserId,
        pinned: bool,
    ) -> Result<(), CommunityError> {
        self.owned_message(group_id, message_id, requesting_uid)
            .await?;
        self.message_repo
            .set_pinned(group_id, message_id, pinned)
            .await?;
        tracing::info!(%group_id, %message_id, pinned, "message pin changed");
        Ok(())
    }

    async fn delete(
        &self,
        group_id: &GroupId,
        message_id: &MessageId,
        requesting_uid: &UserId,
    ) -> Result<(), CommunityError> {
        self.owned_message(group_id, message_id, requesting_uid)
            .await?;
        self.message_repo.delete(group_id, message_id).await?;
        tracing::info!(%group_id, %message_id, "message deleted");
        Ok(())
    }

    async fn list(
        &self,
        group_id: &GroupId,
        limit: PageSize,
    ) -> Result<LiveView<GroupMessage>, CommunityError> {
        self.group(group_id).await?;
        let view = self.message_repo.watch_recent(group_id, limit).await?;
        Ok(view.map(pinned_first))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_impl::test_support::*;
    use futures_util::StreamExt;

    struct Room {
        fx: Fixture,
        group_id: GroupId,
        owner: MemberProfile,
        member: MemberProfile,
    }

    async fn room() -> Room {
        let fx = Fixture::new();
        let owner = owner("u1");
        let member = MemberProfile::new("u2");
        let group_id = fx
            .registry()
            .create(public_input(&owner, "a"))
            .await
            .unwrap();
        fx.membership()
            .join_by_id(&group_id, &member, None)
            .await
            .unwrap();
        Room {
            fx,
            group_id,
            owner,
            member,
        }
    }

    fn text(uid: &UserId, body: &str) -> OutgoingMessage {
        OutgoingMessage {
            author: MessageAuthor::new(uid.0.clone(), "someone"),
            content: MessageContent::text(body),
        }
    }

    fn previews(messages: &[GroupMessage]) -> Vec<String> {
        messages.iter().map(|m| m.content.preview()).collect()
    }

    #[tokio::test]
    async fn test_send_requires_membership() {
        let room = room().await;
        let stream = room.fx.messages();

        let err = stream
            .send(&room.group_id, text(&UserId::from("u9"), "hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, CommunityError::NotAMember));

        let err = stream
            .send(&GroupId::from("nope"), text(&room.member.uid, "hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, CommunityError::NotFound("group")));

        let err = stream
            .send(&room.group_id, text(&room.member.uid, "   "))
            .await
            .unwrap_err();
        assert!(matches!(err, CommunityError::InvalidMessage(_)));
    }

    #[tokio::test]
    async fn test_send_refreshes_last_message() {
        let room = room().await;
        let stream = room.fx.messages();
        stream
            .send(&room.group_id, text(&room.member.uid, "buy the dip"))
            .await
            .unwrap();

        let group = room.fx.group_repo.get(&room.group_id).await.unwrap().unwrap();
        let last = group.last_message.unwrap();
        assert_eq!(last.text, "buy the dip");
        assert_eq!(last.author_id, room.member.uid);
    }

    #[tokio::test]
    async fn test_pinned_message_is_listed_first() {
        let room = room().await;
        let stream = room.fx.messages();
        let mut ids = Vec::new();
        for body in ["t1", "t2", "t3"] {
            ids.push(
                stream
                    .send(&room.group_id, text(&room.member.uid, body))
                    .await
                    .unwrap(),
            );
        }

        stream
            .pin(&room.group_id, &ids[1], &room.owner.uid, true)
            .await
            .unwrap();

        let mut view = stream.list(&room.group_id, PageSize(50)).await.unwrap();
        let snapshot = view.next().await.unwrap();
        assert_eq!(previews(&snapshot), vec!["t2", "t1", "t3"]);
        assert!(snapshot[0].is_pinned);

        stream
            .pin(&room.group_id, &ids[1], &room.owner.uid, false)
            .await
            .unwrap();
        let snapshot = view.next().await.unwrap();
        assert_eq!(previews(&snapshot), vec!["t1", "t2", "t3"]);
    }

    #[tokio::test]
    async fn test_timestamps_strictly_increase() {
        let room = room().await;
        let stream = room.fx.messages();
        for n in 0..20 {
            stream
                .send(&room.group_id, text(&room.member.uid, &format!("m{n}")))
                .await
                .unwrap();
        }

        let mut view = stream.list(&room.group_id, PageSize(50)).await.unwrap();
        let snapshot = view.next().await.unwrap();
        assert_eq!(snapshot.len(), 20);
        for pair in snapshot.windows(2) {
            assert!(pair[0].timestamp < pair[1].timestamp);
        }
    }

    #[tokio::test]
    async fn test_only_owner_pins_and_deletes() {
        let room = room().await;
        let stream = room.fx.messages();
        let id = stream
            .send(&room.group_id, text(&room.member.uid, "hi"))
            .await
            .unwrap();

        let err = stream
            .pin(&room.group_id, &id, &room.member.uid, true)
            .await
            .unwrap_err();
        assert!(matches!(err, CommunityError::NotOwner));

        let err = stream
            .delete(&room.group_id, &id, &room.member.uid)
            .await
            .unwrap_err();
        assert!(matches!(err, CommunityError::NotOwner));

        let missing = MessageId("nope".into());
        let err = stream
            .pin(&room.group_id, &missing, &room.owner.uid, true)
            .await
            .unwrap_err();
        assert!(matches!(err, CommunityError::NotFound("message")));

        stream
            .delete(&room.group_id, &id, &room.owner.uid)
            .await
            .unwrap();
        let mut view = stream.list(&room.group_id, PageSize(50)).await.unwrap();
        assert!(view.next().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_keeps_only_the_most_recent() {
        let room = room().await;
        let stream = room.fx.messages();
        for body in ["a", "b", "c", "d"] {
            stream
                .send(&room.group_id, text(&room.member.uid, body))
                .await
                .unwrap();
        }

        let mut view = stream.list(&room.group_id, PageSize(3)).await.unwrap();
        assert_eq!(previews(&view.next().await.unwrap()), vec!["b", "c", "d"]);

        view.cancel();
        view.cancel();
        assert!(view.is_cancelled());
        assert_eq!(room.fx.gateway.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_messages_vanish_with_their_group() {
        let room = room().await;
        let stream = room.fx.messages();
        let id = stream
            .send(&room.group_id, text(&room.member.uid, "hi"))
            .await
            .unwrap();

        room.fx
            .registry()
            .delete(&room.group_id, &room.owner.uid)
            .await
            .unwrap();

        let stored = room.fx.message_repo.get(&room.group_id, &id).await.unwrap();
        assert!(stored.is_none());
    }
}
