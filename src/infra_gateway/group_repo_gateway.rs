use super::records::*;
use super::util::*;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::Arc;

pub struct GatewayGroupRepo {
    gateway: Arc<dyn PersistenceGateway>,
}

impl GatewayGroupRepo {
    pub fn new(gateway: Arc<dyn PersistenceGateway>) -> Self {
        GatewayGroupRepo { gateway }
    }

    async fn write_guarded(
        &self,
        context: &str,
        op: AtomicOp,
    ) -> Result<WriteOutcome, CommunityError> {
        match self.gateway.run_atomic(vec![op]).await {
            Ok(()) => Ok(WriteOutcome::Applied),
            Err(e) if is_failed_on(&e, GROUPS) => Ok(WriteOutcome::Unchanged),
            Err(e) if is_missing_in(&e, GROUPS) => Err(CommunityError::NotFound("group")),
            Err(e) => Err(CommunityError::store(context, e)),
        }
    }
}

fn uid_value(uid: &UserId) -> serde_json::Value {
    json!(uid.0)
}

#[async_trait::async_trait]
impl GroupRepo for GatewayGroupRepo {
    fn next_id(&self) -> GroupId {
        GroupId(self.gateway.allocate_id(GROUPS))
    }

    async fn insert(&self, group: &Group) -> Result<GroupInsert, CommunityError> {
        let group_patch = patch_of(&GroupRecord::from_group(group))?;
        let code_patch = FieldPatch::new()
            .set("groupId", json!(group.id.0))
            .server_timestamp("createdAt");

        let ops = vec![
            AtomicOp::create(INVITE_CODES, group.invite_code.as_str(), code_patch),
            AtomicOp::create(GROUPS, group.id.0.as_str(), group_patch),
        ];
        match self.gateway.run_atomic(ops).await {
            Ok(()) => Ok(GroupInsert::Inserted),
            Err(e) if is_failed_on(&e, INVITE_CODES) => Ok(GroupInsert::CodeTaken),
            Err(e) => Err(CommunityError::store("insert group", e)),
        }
    }

    async fn get(&self, group_id: &GroupId) -> Result<Option<Group>, CommunityError> {
        let doc = self
            .gateway
            .get_document(GROUPS, &group_id.0)
            .await
            .map_err(|e| CommunityError::store("get group", e))?;

        match doc {
            Some(doc) => decode_group(&doc)
                .map(Some)
                .map_err(|e| CommunityError::store("decode group", e)),
            None => Ok(None),
        }
    }

    async fn find_by_invite_code(
        &self,
        code: &InviteCode,
    ) -> Result<Option<GroupId>, CommunityError> {
        let indexed = self
            .gateway
            .get_document(INVITE_CODES, code.as_str())
            .await
            .map_err(|e| CommunityError::store("get invite code", e))?;

        if let Some(group_id) = indexed
            .as_ref()
            .and_then(|doc| doc.get("groupId"))
            .and_then(|v| v.as_str())
        {
            return Ok(Some(GroupId(group_id.to_owned())));
        }

        // groups stored before the code index existed
        let query = Query::new(GROUPS)
            .filter(Filter::eq("inviteCode", json!(code.as_str())))
            .limit(1);
        let found = self
            .gateway
            .query(&query)
            .await
            .map_err(|e| CommunityError::store("query invite code", e))?;

        Ok(found.into_iter().next().map(|doc| GroupId(doc.id)))
    }

    async fn delete(&self, group: &Group) -> Result<(), CommunityError> {
        let ops = vec![
            AtomicOp::delete(GROUPS, group.id.0.as_str()).when(Precondition::Exists),
            AtomicOp::delete(INVITE_CODES, group.invite_code.as_str()),
        ];
        match self.gateway.run_atomic(ops).await {
            Ok(()) => Ok(()),
            Err(e) if is_failed_on(&e, GROUPS) => Err(CommunityError::NotFound("group")),
            Err(e) => Err(CommunityError::store("delete group", e)),
        }
    }

    async fn update_profile(
        &self,
        group_id: &GroupId,
        update: GroupProfileUpdate,
    ) -> Result<(), CommunityError> {
        let patch = match update {
            GroupProfileUpdate::Banner(url) => FieldPatch::new().set("bannerUrl", json!(url)),
            GroupProfileUpdate::Avatar(url) => FieldPatch::new().set("avatarUrl", json!(url)),
            GroupProfileUpdate::Description(text) => {
                FieldPatch::new().set("description", json!(text))
            }
        };
        self.write_guarded(
            "update group profile",
            AtomicOp::update(GROUPS, group_id.0.as_str(), patch),
        )
        .await
        .map(|_| ())
    }

    async fn add_member(
        &self,
        group_id: &GroupId,
        member: &GroupMember,
    ) -> Result<WriteOutcome, CommunityError> {
        let entry =
            serde_json::to_value(member).map_err(|e| CommunityError::Internal(e.to_string()))?;
        let patch = FieldPatch::new()
            .transform("members", FieldValue::ArrayUnion(vec![entry]))
            .transform(
                "membersUidList",
                FieldValue::ArrayUnion(vec![uid_value(&member.uid)]),
            );
        let op = AtomicOp::update(GROUPS, group_id.0.as_str(), patch).when(
            Precondition::ArrayLacks {
                field: "membersUidList".into(),
                value: uid_value(&member.uid),
            },
        );
        self.write_guarded("add member", op).await
    }

    async fn remove_member(
        &self,
        group_id: &GroupId,
        uid: &UserId,
    ) -> Result<WriteOutcome, CommunityError> {
        let patch = FieldPatch::new()
            .transform(
                "members",
                FieldValue::ArrayRemoveWhere {
                    key: "uid".into(),
                    value: uid_value(uid),
                },
            )
            .transform(
                "membersUidList",
                FieldValue::ArrayRemove(vec![uid_value(uid)]),
            );
        let op = AtomicOp::update(GROUPS, group_id.0.as_str(), patch).when(
            Precondition::ArrayContains {
                field: "membersUidList".into(),
                value: uid_value(uid),
            },
        );
        self.write_guarded("remove member", op).await
    }

    async fn set_presence(
        &self,
        group_id: &GroupId,
        uid: &UserId,
        online: bool,
        at: DateTime<Utc>,
    ) -> Result<WriteOutcome, CommunityError> {
        let mut presence = Fields::new();
        presence.insert("isOnline".into(), json!(online));
        presence.insert("lastSeen".into(), json!(at));

        let patch = FieldPatch::new().transform(
            "members",
            FieldValue::ArrayPatchWhere {
                key: "uid".into(),
                value: uid_value(uid),
                patch: presence,
            },
        );
        let op = AtomicOp::update(GROUPS, group_id.0.as_str(), patch).when(
            Precondition::ArrayContains {
                field: "membersUidList".into(),
                value: uid_value(uid),
            },
        );
        self.write_guarded("set presence", op).await
    }

    async fn count_owned(&self, owner: &UserId) -> Result<OwnedGroupCounts, CommunityError> {
        let query = Query::new(GROUPS).filter(Filter::eq("ownerUid", json!(owner.0)));
        let documents = self
            .gateway
            .query(&query)
            .await
            .map_err(|e| CommunityError::store("count owned groups", e))?;

        let mut counts = OwnedGroupCounts::default();
        for group in decode_all(documents, decode_group) {
            match group.group_type {
                GroupType::Public => counts.public += 1,
                GroupType::Private => counts.private += 1,
            }
        }
        Ok(counts)
    }

    async fn watch(&self, scope: GroupScope) -> Result<LiveView<Group>, CommunityError> {
        tracing::debug!(?scope, "watch groups");
        let filter = match &scope {
            // legacy records carry only `isPrivate`, which every write mirrors
            GroupScope::Public => Filter::eq("isPrivate", json!(false)),
            GroupScope::OwnedBy(uid) => Filter::eq("ownerUid", json!(uid.0)),
            GroupScope::MemberOf(uid) => Filter::array_contains("membersUidList", json!(uid.0)),
        };
        let query = Query::new(GROUPS)
            .filter(filter)
            .order_by("createdAt", Direction::Descending);
        let subscription = self
            .gateway
            .subscribe(query)
            .await
            .map_err(|e| CommunityError::store("watch groups", e))?;

        let public_only = matches!(scope, GroupScope::Public);
        Ok(LiveView::new(subscription, move |documents| {
            let mut groups = decode_all(documents, decode_group);
            if public_only {
                groups.retain(|g| g.group_type == GroupType::Public);
            }
            groups
        }))
    }
}
