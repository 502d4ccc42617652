use crate::application_port::CommunityError;
use crate::domain_model::*;

#[async_trait::async_trait]
pub trait SocialGraph: Send + Sync {
    async fn follow(&self, follower: &UserId, followee: &UserId) -> Result<(), CommunityError>;
    async fn unfollow(&self, follower: &UserId, followee: &UserId)
    -> Result<(), CommunityError>;
    async fn is_following(
        &self,
        follower: &UserId,
        followee: &UserId,
    ) -> Result<bool, CommunityError>;
    async fn stats(&self, uid: &UserId) -> Result<UserStats, CommunityError>;
}
