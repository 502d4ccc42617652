use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::WriteOutcome;

#[async_trait::async_trait]
pub trait FollowRepo: Send + Sync {
    /// Edge pair plus both counters, atomically. `Unchanged` if it exists.
    async fn insert_edge(
        &self,
        follower: &UserId,
        followee: &UserId,
    ) -> Result<WriteOutcome, CommunityError>;

    /// Edge pair plus both counters, atomically. `Unchanged` if absent.
    async fn remove_edge(
        &self,
        follower: &UserId,
        followee: &UserId,
    ) -> Result<WriteOutcome, CommunityError>;

    async fn get_edge(
        &self,
        follower: &UserId,
        followee: &UserId,
    ) -> Result<Option<FollowEdge>, CommunityError>;
}
