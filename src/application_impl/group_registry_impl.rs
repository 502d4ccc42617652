use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::Utc;
use std::sync::Arc;

pub const DEFAULT_MAX_CODE_ATTEMPTS: u32 = 5;

pub struct RealGroupRegistry {
    group_repo: Arc<dyn GroupRepo>,
    user_stats_repo: Arc<dyn UserStatsRepo>,
    quota_policy: Arc<dyn MembershipQuotaPolicy>,
    credential_hasher: Arc<dyn CredentialHasher>,
    invite_codes: Arc<dyn InviteCodeGenerator>,
    max_code_attempts: u32,
}

impl RealGroupRegistry {
    pub fn new(
        group_repo: Arc<dyn GroupRepo>,
        user_stats_repo: Arc<dyn UserStatsRepo>,
        quota_policy: Arc<dyn MembershipQuotaPolicy>,
        credential_hasher: Arc<dyn CredentialHasher>,
        invite_codes: Arc<dyn InviteCodeGenerator>,
        max_code_attempts: u32,
    ) -> Self {
        Self {
            group_repo,
            user_stats_repo,
            quota_policy,
            credential_hasher,
            invite_codes,
            max_code_attempts: max_code_attempts.max(1),
        }
    }

    async fn owned_group(
        &self,
        group_id: &GroupId,
        requesting_uid: &UserId,
    ) -> Result<Group, CommunityError> {
        let group = self
            .group_repo
            .get(group_id)
            .await?
            .ok_or(CommunityError::NotFound("group"))?;
        if !group.is_owner(requesting_uid) {
            return Err(CommunityError::NotOwner);
        }
        Ok(group)
    }

    async fn update_profile(
        &self,
        group_id: &GroupId,
        requesting_uid: &UserId,
        update: GroupProfileUpdate,
    ) -> Result<(), CommunityError> {
        self.owned_group(group_id, requesting_uid).await?;
        tracing::debug!(%group_id, ?update, "update group profile");
        self.group_repo.update_profile(group_id, update).await
    }
}

fn validate(input: &CreateGroupInput) -> Result<(), CommunityError> {
    if input.name.trim().is_empty() {
        return Err(CommunityError::InvalidGroupSpec(
            "name must not be empty".to_owned(),
        ));
    }
    let has_password = input.password.as_deref().is_some_and(|p| !p.is_empty());
    if input.group_type.is_private() && !has_password {
        return Err(CommunityError::InvalidGroupSpec(
            "private groups need a password".to_owned(),
        ));
    }
    Ok(())
}

#[async_trait::async_trait]
impl GroupRegistry for RealGroupRegistry {
    async fn create(&self, input: CreateGroupInput) -> Result<GroupId, CommunityError> {
        validate(&input)?;
        let owner_uid = input.owner.uid.clone();

        // check-then-act: concurrent creations may both pass, see MembershipQuotaPolicy
        self.quota_policy
            .check_create_allowed(&owner_uid, input.group_type)
            .await?;

        let password_hash = match (&input.password, input.group_type) {
            (Some(password), GroupType::Private) => {
                Some(self.credential_hasher.hash_password(password).await?)
            }
            _ => None,
        };

        let now = Utc::now();
        let mut group = Group {
            id: self.group_repo.next_id(),
            name: input.name.trim().to_owned(),
            description: input.description,
            group_type: input.group_type,
            owner_uid: owner_uid.clone(),
            password_hash,
            invite_code: self.invite_codes.generate(),
            members: vec![GroupMember::joining(
                &input.owner,
                GroupMemberRole::Owner,
                now,
            )],
            avatar_url: None,
            banner_url: None,
            created_at: now,
            last_message: None,
        };

        for attempt in 1..=self.max_code_attempts {
            match self.group_repo.insert(&group).await? {
                GroupInsert::Inserted => {
                    tracing::info!(
                        group_id = %group.id,
                        owner = %owner_uid,
                        group_type = %group.group_type,
                        "group created"
                    );
                    if let Err(e) = self
                        .user_stats_repo
                        .adjust_group_count(&owner_uid, group.group_type, 1)
                        .await
                    {
                        tracing::warn!(owner = %owner_uid, "group counter increment failed: {e}");
                    }
                    return Ok(group.id);
                }
                GroupInsert::CodeTaken => {
                    tracing::warn!(attempt, code = %group.invite_code, "invite code collision");
                    group.invite_code = self.invite_codes.generate();
                }
            }
        }

        Err(CommunityError::Persistence(format!(
            "no free invite code after {} attempts",
            self.max_code_attempts
        )))
    }

    async fn delete(
        &self,
        group_id: &GroupId,
        requesting_uid: &UserId,
    ) -> Result<(), CommunityError> {
        let group = self.owned_group(group_id, requesting_uid).await?;
        self.group_repo.delete(&group).await?;
        tracing::info!(%group_id, owner = %group.owner_uid, "group deleted");

        if let Err(e) = self
            .user_stats_repo
            .adjust_group_count(&group.owner_uid, group.group_type, -1)
            .await
        {
            tracing::warn!(owner = %group.owner_uid, "group counter decrement failed: {e}");
        }
        Ok(())
    }

    async fn update_banner(
        &self,
        group_id: &GroupId,
        requesting_uid: &UserId,
        url: &str,
    ) -> Result<(), CommunityError> {
        self.update_profile(
            group_id,
            requesting_uid,
            GroupProfileUpdate::Banner(url.to_owned()),
        )
        .await
    }

    async fn update_avatar(
        &self,
        group_id: &GroupId,
        requesting_uid: &UserId,
        url: &str,
    ) -> Result<(), CommunityError> {
        self.update_profile(
            group_id,
            requesting_uid,
            GroupProfileUpdate::Avatar(url.to_owned()),
        )
        .await
    }

    async fn update_description(
        &self,
        group_id: &GroupId,
        requesting_uid: &UserId,
        description: &str,
    ) -> Result<(), CommunityError> {
        self.update_profile(
            group_id,
            requesting_uid,
            GroupProfileUpdate::Description(description.to_owned()),
        )
        .await
    }

    async fn get_by_id(&self, group_id: &GroupId) -> Result<Option<Group>, CommunityError> {
        self.group_repo.get(group_id).await
    }

    async fn list_public(&self) -> Result<LiveView<Group>, CommunityError> {
        self.group_repo.watch(GroupScope::Public).await
    }

    async fn list_owned_by(&self, uid: &UserId) -> Result<LiveView<Group>, CommunityError> {
        self.group_repo.watch(GroupScope::OwnedBy(uid.clone())).await
    }

    async fn list_member_of(&self, uid: &UserId) -> Result<LiveView<Group>, CommunityError> {
        self.group_repo.watch(GroupScope::MemberOf(uid.clone())).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_impl::ScriptedInviteCodes;
    use crate::application_impl::test_support::*;
    use futures_util::StreamExt;

    #[tokio::test]
    async fn test_create_private_group() {
        let fx = Fixture::new();
        let owner = owner("u1");
        let id = fx
            .registry()
            .create(private_input(&owner, "Alpha", "secret123"))
            .await
            .unwrap();

        let group = fx.registry().get_by_id(&id).await.unwrap().unwrap();
        assert_eq!(group.name, "Alpha");
        assert!(group.is_private());
        assert!(group.invite_code.as_str().starts_with("GRP-"));
        assert_eq!(group.members.len(), 1);
        assert_eq!(group.members[0].role, GroupMemberRole::Owner);
        assert!(group.members[0].is_online);

        let hash = group.password_hash.unwrap();
        assert_ne!(hash, "secret123");
        assert!(fx.hasher.verify_password("secret123", &hash).await.unwrap());

        let stats = fx.user_stats_repo.get(&owner.uid).await.unwrap();
        assert_eq!(stats.private_group_count, 1);
    }

    #[tokio::test]
    async fn test_public_group_has_no_hash() {
        let fx = Fixture::new();
        let mut input = public_input(&owner("u1"), "Open");
        input.password = Some("ignored".into());
        let id = fx.registry().create(input).await.unwrap();

        let group = fx.registry().get_by_id(&id).await.unwrap().unwrap();
        assert!(group.password_hash.is_none());
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input() {
        let fx = Fixture::new();
        let registry = fx.registry();
        let owner = owner("u1");

        let err = registry.create(public_input(&owner, "   ")).await.unwrap_err();
        assert!(matches!(err, CommunityError::InvalidGroupSpec(_)));

        let mut input = private_input(&owner, "Alpha", "");
        let err = registry.create(input.clone()).await.unwrap_err();
        assert!(matches!(err, CommunityError::InvalidGroupSpec(_)));

        input.password = None;
        let err = registry.create(input).await.unwrap_err();
        assert!(matches!(err, CommunityError::InvalidGroupSpec(_)));
    }

    #[tokio::test]
    async fn test_third_public_group_exceeds_quota() {
        let fx = Fixture::new();
        let registry = fx.registry();
        let owner = owner("u1");
        registry.create(public_input(&owner, "a")).await.unwrap();
        registry.create(public_input(&owner, "b")).await.unwrap();

        let err = registry.create(public_input(&owner, "c")).await.unwrap_err();
        assert!(matches!(
            err,
            CommunityError::QuotaExceeded {
                group_type: GroupType::Public,
                current_count: 2,
                limit: 2
            }
        ));
    }

    #[tokio::test]
    async fn test_code_collision_is_retried() {
        let fx = Fixture::new();
        let codes = Arc::new(ScriptedInviteCodes::new(&[
            "GRP-AAAAAA",
            "GRP-AAAAAA",
            "GRP-BBBBBB",
        ]));
        let registry = fx.registry_with_codes(codes);

        let first = registry.create(public_input(&owner("u1"), "a")).await.unwrap();
        let second = registry.create(public_input(&owner("u2"), "b")).await.unwrap();

        let first = registry.get_by_id(&first).await.unwrap().unwrap();
        let second = registry.get_by_id(&second).await.unwrap().unwrap();
        assert_eq!(first.invite_code.as_str(), "GRP-AAAAAA");
        assert_eq!(second.invite_code.as_str(), "GRP-BBBBBB");
    }

    #[tokio::test]
    async fn test_gives_up_after_bounded_attempts() {
        let fx = Fixture::new();
        let codes = Arc::new(ScriptedInviteCodes::new(&["GRP-AAAAAA"]));
        let registry = fx.registry_with_codes(codes);

        registry.create(public_input(&owner("u1"), "a")).await.unwrap();
        let err = registry
            .create(public_input(&owner("u2"), "b"))
            .await
            .unwrap_err();
        assert!(matches!(err, CommunityError::Persistence(_)));
    }

    #[tokio::test]
    async fn test_delete_requires_owner_and_frees_code() {
        let fx = Fixture::new();
        let registry = fx.registry();
        let owner = owner("u1");
        let id = registry.create(public_input(&owner, "a")).await.unwrap();
        let code = registry.get_by_id(&id).await.unwrap().unwrap().invite_code;

        let err = registry.delete(&id, &UserId::from("u2")).await.unwrap_err();
        assert!(matches!(err, CommunityError::NotOwner));

        registry.delete(&id, &owner.uid).await.unwrap();
        assert!(registry.get_by_id(&id).await.unwrap().is_none());
        assert!(fx.group_repo.find_by_invite_code(&code).await.unwrap().is_none());

        let err = registry.delete(&id, &owner.uid).await.unwrap_err();
        assert!(matches!(err, CommunityError::NotFound("group")));

        let stats = fx.user_stats_repo.get(&owner.uid).await.unwrap();
        assert_eq!(stats.public_group_count, 0);
    }

    #[tokio::test]
    async fn test_profile_updates_are_owner_only() {
        let fx = Fixture::new();
        let registry = fx.registry();
        let owner = owner("u1");
        let id = registry.create(public_input(&owner, "a")).await.unwrap();

        registry
            .update_banner(&id, &owner.uid, "https://cdn/banner.png")
            .await
            .unwrap();
        registry
            .update_banner(&id, &owner.uid, "https://cdn/banner.png")
            .await
            .unwrap();
        registry
            .update_avatar(&id, &owner.uid, "https://cdn/avatar.png")
            .await
            .unwrap();
        registry
            .update_description(&id, &owner.uid, "momentum only")
            .await
            .unwrap();

        let err = registry
            .update_avatar(&id, &UserId::from("u2"), "https://cdn/x.png")
            .await
            .unwrap_err();
        assert!(matches!(err, CommunityError::NotOwner));

        let err = registry
            .update_banner(&GroupId::from("missing"), &owner.uid, "x")
            .await
            .unwrap_err();
        assert!(matches!(err, CommunityError::NotFound("group")));

        let group = registry.get_by_id(&id).await.unwrap().unwrap();
        assert_eq!(group.banner_url.as_deref(), Some("https://cdn/banner.png"));
        assert_eq!(group.avatar_url.as_deref(), Some("https://cdn/avatar.png"));
        assert_eq!(group.description, "momentum only");
    }

    #[tokio::test]
    async fn test_list_views_follow_changes() {
        let fx = Fixture::new();
        let registry = fx.registry();
        let owner = owner("u1");

        let mut public = registry.list_public().await.unwrap();
        assert!(public.next().await.unwrap().is_empty());

        let id = registry.create(public_input(&owner, "a")).await.unwrap();
        let snapshot = public.next().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, id);

        registry
            .create(private_input(&owner, "p", "pw"))
            .await
            .unwrap();
        let mut owned = registry.list_owned_by(&owner.uid).await.unwrap();
        assert_eq!(owned.next().await.unwrap().len(), 2);

        let mut joined = registry.list_member_of(&owner.uid).await.unwrap();
        assert_eq!(joined.next().await.unwrap().len(), 2);

        let mut stranger = registry.list_member_of(&UserId::from("u9")).await.unwrap();
        assert!(stranger.next().await.unwrap().is_empty());

        public.cancel();
        public.cancel();
        assert!(public.next().await.is_none());
    }
}
