use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use std::sync::Arc;

pub struct RealSocialGraph {
    follow_repo: Arc<dyn FollowRepo>,
    user_stats_repo: Arc<dyn UserStatsRepo>,
}

impl RealSocialGraph {
    pub fn new(follow_repo: Arc<dyn FollowRepo>, user_stats_repo: Arc<dyn UserStatsRepo>) -> Self {
        Self {
            follow_repo,
            user_stats_repo,
        }
    }
}

#[async_trait::async_trait]
impl SocialGraph for RealSocialGraph {
    async fn follow(&self, follower: &UserId, followee: &UserId) -> Result<(), CommunityError> {
        if follower == followee {
            return Err(CommunityError::SelfFollow);
        }
        match self.follow_repo.insert_edge(follower, followee).await? {
            WriteOutcome::Applied => tracing::info!(%follower, %followee, "followed"),
            WriteOutcome::Unchanged => tracing::debug!(%follower, %followee, "already following"),
        }
        Ok(())
    }

    async fn unfollow(
        &self,
        follower: &UserId,
        followee: &UserId,
    ) -> Result<(), CommunityError> {
        match self.follow_repo.remove_edge(follower, followee).await? {
            WriteOutcome::Applied => tracing::info!(%follower, %followee, "unfollowed"),
            WriteOutcome::Unchanged => tracing::debug!(%follower, %followee, "was not following"),
        }
        Ok(())
    }

    async fn is_following(
        &self,
        follower: &UserId,
        followee: &UserId,
    ) -> Result<bool, CommunityError> {
        Ok(self.follow_repo.get_edge(follower, followee).await?.is_some())
    }

    async fn stats(&self, uid: &UserId) -> Result<UserStats, CommunityError> {
        self.user_stats_repo.get(uid).await
    }
}
