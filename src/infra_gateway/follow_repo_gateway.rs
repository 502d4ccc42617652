use super::records::EdgeRecord;
use super::util::*;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use serde_json::json;
use std::sync::Arc;

pub struct GatewayFollowRepo {
    gateway: Arc<dyn PersistenceGateway>,
}

impl GatewayFollowRepo {
    pub fn new(gateway: Arc<dyn PersistenceGateway>) -> Self {
        GatewayFollowRepo { gateway }
    }

    async fn commit(&self, context: &str, ops: Vec<AtomicOp>) -> Result<WriteOutcome, CommunityError> {
        match self.gateway.run_atomic(ops).await {
            Ok(()) => Ok(WriteOutcome::Applied),
            Err(GatewayError::PreconditionFailed { .. }) => Ok(WriteOutcome::Unchanged),
            Err(e) => Err(CommunityError::store(context, e)),
        }
    }
}

fn edge_patch(other: &UserId) -> FieldPatch {
    FieldPatch::new()
        .set("uid", json!(other.0))
        .server_timestamp("since")
}

fn counter(uid: &UserId, field: &str, delta: i64) -> AtomicOp {
    AtomicOp::set(USERS, uid.0.as_str(), FieldPatch::new().increment(field, delta), true)
}

#[async_trait::async_trait]
impl FollowRepo for GatewayFollowRepo {
    async fn insert_edge(
        &self,
        follower: &UserId,
        followee: &UserId,
    ) -> Result<WriteOutcome, CommunityError> {
        let ops = vec![
            AtomicOp::create(following_of(follower), followee.0.as_str(), edge_patch(followee)),
            AtomicOp::create(followers_of(followee), follower.0.as_str(), edge_patch(follower)),
            counter(follower, "followingCount", 1),
            counter(followee, "followersCount", 1),
        ];
        self.commit("insert follow edge", ops).await
    }

    async fn remove_edge(
        &self,
        follower: &UserId,
        followee: &UserId,
    ) -> Result<WriteOutcome, CommunityError> {
        let ops = vec![
            AtomicOp::delete(following_of(follower), followee.0.as_str())
                .when(Precondition::Exists),
            AtomicOp::delete(followers_of(followee), follower.0.as_str())
                .when(Precondition::Exists),
            counter(follower, "followingCount", -1),
            counter(followee, "followersCount", -1),
        ];
        self.commit("remove follow edge", ops).await
    }

    async fn get_edge(
        &self,
        follower: &UserId,
        followee: &UserId,
    ) -> Result<Option<FollowEdge>, CommunityError> {
        let doc = self
            .gateway
            .get_document(&following_of(follower), &followee.0)
            .await
            .map_err(|e| CommunityError::store("get follow edge", e))?;

        let Some(doc) = doc else {
            return Ok(None);
        };
        let record: EdgeRecord = doc
            .decode()
            .map_err(|e| CommunityError::store("decode follow edge", e))?;
        Ok(Some(FollowEdge {
            follower: follower.clone(),
            followee: record.uid,
            since: record.since,
        }))
    }
}
