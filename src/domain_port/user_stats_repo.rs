use crate::application_port::*;
use crate::domain_model::*;

#[async_trait::async_trait]
pub trait UserStatsRepo: Send + Sync {
    /// Zeroed stats for a user that has no document yet.
    async fn get(&self, uid: &UserId) -> Result<UserStats, CommunityError>;

    async fn adjust_group_count(
        &self,
        uid: &UserId,
        group_type: GroupType,
        delta: i64,
    ) -> Result<(), CommunityError>;

    async fn store_group_counts(
        &self,
        uid: &UserId,
        counts: OwnedGroupCounts,
    ) -> Result<(), CommunityError>;
}
