use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use std::sync::Arc;

pub struct RealQuotaPolicy {
    group_repo: Arc<dyn GroupRepo>,
    user_stats_repo: Arc<dyn UserStatsRepo>,
    limits: QuotaLimits,
}

impl RealQuotaPolicy {
    pub fn new(
        group_repo: Arc<dyn GroupRepo>,
        user_stats_repo: Arc<dyn UserStatsRepo>,
        limits: QuotaLimits,
    ) -> Self {
        Self {
            group_repo,
            user_stats_repo,
            limits,
        }
    }
}

#[async_trait::async_trait]
impl MembershipQuotaPolicy for RealQuotaPolicy {
    async fn check_create_allowed(
        &self,
        owner: &UserId,
        requested: GroupType,
    ) -> Result<(), CommunityError> {
        // live count, not the cached counter on the user document
        let counts = self.group_repo.count_owned(owner).await?;
        let current_count = counts.get(requested);
        let limit = self.limits.limit(requested);

        if current_count >= limit {
            tracing::info!(%owner, group_type = %requested, current_count, limit, "group quota reached");
            return Err(CommunityError::QuotaExceeded {
                group_type: requested,
                current_count,
                limit,
            });
        }
        Ok(())
    }

    async fn recount(&self, owner: &UserId) -> Result<OwnedGroupCounts, CommunityError> {
        let counts = self.group_repo.count_owned(owner).await?;
        self.user_stats_repo
            .store_group_counts(owner, counts)
            .await?;
        tracing::info!(%owner, public = counts.public, private = counts.private, "group counters recounted");
        Ok(counts)
    }
}
