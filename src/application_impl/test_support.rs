use super::*;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::infra_gateway::*;
use crate::infra_memory::MemoryGateway;
use std::sync::Arc;

/// Every repository wired to one fresh in-memory store.
pub struct Fixture {
    pub gateway: Arc<MemoryGateway>,
    pub group_repo: Arc<dyn GroupRepo>,
    pub message_repo: Arc<dyn MessageRepo>,
    pub follow_repo: Arc<dyn FollowRepo>,
    pub user_stats_repo: Arc<dyn UserStatsRepo>,
    pub hasher: Arc<dyn CredentialHasher>,
}

impl Fixture {
    pub fn new() -> Self {
        let gateway = Arc::new(MemoryGateway::new());
        let shared: Arc<dyn PersistenceGateway> = gateway.clone();
        Self {
            gateway,
            group_repo: Arc::new(GatewayGroupRepo::new(shared.clone())),
            message_repo: Arc::new(GatewayMessageRepo::new(shared.clone())),
            follow_repo: Arc::new(GatewayFollowRepo::new(shared.clone())),
            user_stats_repo: Arc::new(GatewayUserStatsRepo::new(shared)),
            hasher: Arc::new(Argon2PasswordHasher::try_new(64, 1, 1).unwrap()),
        }
    }

    pub fn quota(&self) -> RealQuotaPolicy {
        RealQuotaPolicy::new(
            self.group_repo.clone(),
            self.user_stats_repo.clone(),
            QuotaLimits::default(),
        )
    }

    pub fn registry_with_codes(&self, codes: Arc<dyn InviteCodeGenerator>) -> RealGroupRegistry {
        RealGroupRegistry::new(
            self.group_repo.clone(),
            self.user_stats_repo.clone(),
            Arc::new(self.quota()),
            self.hasher.clone(),
            codes,
            DEFAULT_MAX_CODE_ATTEMPTS,
        )
    }

    pub fn registry(&self) -> RealGroupRegistry {
        self.registry_with_codes(Arc::new(NanoidInviteCodes::default()))
    }

    pub fn membership(&self) -> RealMembershipManager {
        RealMembershipManager::new(self.group_repo.clone(), self.hasher.clone())
    }

    pub fn messages(&self) -> RealMessageStream {
        RealMessageStream::new(self.group_repo.clone(), self.message_repo.clone())
    }

    pub fn social(&self) -> RealSocialGraph {
        RealSocialGraph::new(self.follow_repo.clone(), self.user_stats_repo.clone())
    }
}

pub fn owner(uid: &str) -> MemberProfile {
    MemberProfile::new(uid).with_email(format!("{uid}@example.com"))
}

pub fn public_input(owner: &MemberProfile, name: &str) -> CreateGroupInput {
    CreateGroupInput {
        owner: owner.clone(),
        name: name.to_owned(),
        description: String::new(),
        group_type: GroupType::Public,
        password: None,
    }
}

pub fn private_input(owner: &MemberProfile, name: &str, password: &str) -> CreateGroupInput {
    CreateGroupInput {
        owner: owner.clone(),
        name: name.to_owned(),
        description: String::new(),
        group_type: GroupType::Private,
        password: Some(password.to_owned()),
    }
}
