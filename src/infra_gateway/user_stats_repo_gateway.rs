use super::util::*;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use serde_json::json;
use std::sync::Arc;

pub struct GatewayUserStatsRepo {
    gateway: Arc<dyn PersistenceGateway>,
}

impl GatewayUserStatsRepo {
    pub fn new(gateway: Arc<dyn PersistenceGateway>) -> Self {
        GatewayUserStatsRepo { gateway }
    }
}

fn group_count_field(group_type: GroupType) -> &'static str {
    match group_type {
        GroupType::Public => "publicGroupCount",
        GroupType::Private => "privateGroupCount",
    }
}

#[async_trait::async_trait]
impl UserStatsRepo for GatewayUserStatsRepo {
    async fn get(&self, uid: &UserId) -> Result<UserStats, CommunityError> {
        let doc = self
            .gateway
            .get_document(USERS, &uid.0)
            .await
            .map_err(|e| CommunityError::store("get user stats", e))?;

        match doc {
            Some(doc) => doc
                .decode()
                .map_err(|e| CommunityError::store("decode user stats", e)),
            None => Ok(UserStats::default()),
        }
    }

    async fn adjust_group_count(
        &self,
        uid: &UserId,
        group_type: GroupType,
        delta: i64,
    ) -> Result<(), CommunityError> {
        let patch = FieldPatch::new().increment(group_count_field(group_type), delta);
        self.gateway
            .set_document(USERS, &uid.0, patch, true)
            .await
            .map_err(|e| CommunityError::store("adjust group count", e))
    }

    async fn store_group_counts(
        &self,
        uid: &UserId,
        counts: OwnedGroupCounts,
    ) -> Result<(), CommunityError> {
        let patch = FieldPatch::new()
            .set(group_count_field(GroupType::Public), json!(counts.public))
            .set(group_count_field(GroupType::Private), json!(counts.private));
        self.gateway
            .set_document(USERS, &uid.0, patch, true)
            .await
            .map_err(|e| CommunityError::store("store group counts", e))
    }
}
