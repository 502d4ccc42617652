use crate::application_port::CommunityError;
use crate::domain_model::*;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct QuotaLimits {
    pub public_limit: u32,
    pub private_limit: u32,
}

impl Default for QuotaLimits {
    fn default() -> Self {
        Self {
            public_limit: 2,
            private_limit: 3,
        }
    }
}

impl QuotaLimits {
    pub fn limit(&self, group_type: GroupType) -> u32 {
        match group_type {
            GroupType::Public => self.public_limit,
            GroupType::Private => self.private_limit,
        }
    }
}

/// Per-owner ceilings on live groups by type.
///
/// The check is not transactional with the creation that follows it: two
/// concurrent creations by one owner can both pass and briefly exceed the
/// ceiling. `recount` repairs the owner's cached counters afterwards.
#[async_trait::async_trait]
pub trait MembershipQuotaPolicy: Send + Sync {
    async fn check_create_allowed(
        &self,
        owner: &UserId,
        requested: GroupType,
    ) -> Result<(), CommunityError>;

    async fn recount(&self, owner: &UserId) -> Result<OwnedGroupCounts, CommunityError>;
}
