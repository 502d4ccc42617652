use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_model::PageSize;
use crate::domain_port::*;
use crate::infra_gateway::*;
use crate::infra_memory::MemoryGateway;
use crate::logger::*;
use crate::settings::Settings;
use nanoid::nanoid;
use std::sync::Arc;

/// Every community service, wired to one persistence backend.
pub struct Community {
    pub run_id: String,
    pub group_registry: Arc<dyn GroupRegistry>,
    pub membership_manager: Arc<dyn MembershipManager>,
    pub message_stream: Arc<dyn MessageStream>,
    pub social_graph: Arc<dyn SocialGraph>,
    pub quota_policy: Arc<dyn MembershipQuotaPolicy>,
    pub default_page_size: PageSize,
    gateway: Arc<dyn PersistenceGateway>,
}

impl Community {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let gateway: Arc<dyn PersistenceGateway> = match settings.persistence.backend.as_str() {
            "memory" => Arc::new(MemoryGateway::new()),
            other => return Err(anyhow::anyhow!("Unknown persistence backend: {}", other)),
        };
        Self::with_gateway(settings, gateway)
    }

    pub fn with_gateway(
        settings: &Settings,
        gateway: Arc<dyn PersistenceGateway>,
    ) -> anyhow::Result<Self> {
        let alphabet: [char; 16] = [
            '1', '2', '3', '4', '5', '6', '7', '8', '9', '0', 'a', 'b', 'c', 'd', 'e', 'f',
        ];
        let run_id = nanoid!(10, &alphabet);

        let group_repo: Arc<dyn GroupRepo> = Arc::new(GatewayGroupRepo::new(gateway.clone()));
        let message_repo: Arc<dyn MessageRepo> =
            Arc::new(GatewayMessageRepo::new(gateway.clone()));
        let follow_repo: Arc<dyn FollowRepo> = Arc::new(GatewayFollowRepo::new(gateway.clone()));
        let user_stats_repo: Arc<dyn UserStatsRepo> =
            Arc::new(GatewayUserStatsRepo::new(gateway.clone()));

        let credential_hasher: Arc<dyn CredentialHasher> =
            Arc::new(Argon2PasswordHasher::try_new(
                settings.hasher.memory_kib,
                settings.hasher.iterations,
                settings.hasher.parallelism,
            )?);
        let invite_codes: Arc<dyn InviteCodeGenerator> =
            Arc::new(NanoidInviteCodes::new(settings.invite.prefix.clone()));

        let quota_policy: Arc<dyn MembershipQuotaPolicy> = Arc::new(RealQuotaPolicy::new(
            group_repo.clone(),
            user_stats_repo.clone(),
            settings.quota,
        ));

        let group_registry: Arc<dyn GroupRegistry> = Arc::new(RealGroupRegistry::new(
            group_repo.clone(),
            user_stats_repo.clone(),
            quota_policy.clone(),
            credential_hasher.clone(),
            invite_codes,
            settings.invite.max_attempts,
        ));
        let membership_manager: Arc<dyn MembershipManager> = Arc::new(
            RealMembershipManager::new(group_repo.clone(), credential_hasher),
        );
        let message_stream: Arc<dyn MessageStream> =
            Arc::new(RealMessageStream::new(group_repo, message_repo));
        let social_graph: Arc<dyn SocialGraph> =
            Arc::new(RealSocialGraph::new(follow_repo, user_stats_repo));

        info!(%run_id, backend = %settings.persistence.backend, "community started");

        Ok(Self {
            run_id,
            group_registry,
            membership_manager,
            message_stream,
            social_graph,
            quota_policy,
            default_page_size: PageSize(settings.messages.default_page_size),
            gateway,
        })
    }

    pub async fn shutdown(&self) {
        info!(run_id = %self.run_id, "community shutting down...");
        self.gateway.close().await;
    }
}
