use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::Utc;
use std::sync::Arc;

pub struct RealMembershipManager {
    group_repo: Arc<dyn GroupRepo>,
    credential_hasher: Arc<dyn CredentialHasher>,
}

impl RealMembershipManager {
    pub fn new(
        group_repo: Arc<dyn GroupRepo>,
        credential_hasher: Arc<dyn CredentialHasher>,
    ) -> Self {
        Self {
            group_repo,
            credential_hasher,
        }
    }

    async fn check_password(
        &self,
        group: &Group,
        password: Option<&str>,
    ) -> Result<(), CommunityError> {
        if !group.is_private() {
            return Ok(());
        }
        let Some(password_hash) = group.password_hash.as_deref() else {
            return Err(CommunityError::Internal(format!(
                "private group {} has no password hash",
                group.id
            )));
        };
        let Some(password) = password else {
            return Err(CommunityError::BadPassword);
        };
        if self
            .credential_hasher
            .verify_password(password, password_hash)
            .await?
        {
            Ok(())
        } else {
            Err(CommunityError::BadPassword)
        }
    }
}

#[async_trait::async_trait]
impl MembershipManager for RealMembershipManager {
    async fn join_by_id(
        &self,
        group_id: &GroupId,
        member: &MemberProfile,
        password: Option<&str>,
    ) -> Result<(), CommunityError> {
        let group = self
            .group_repo
            .get(group_id)
            .await?
            .ok_or(CommunityError::NotFound("group"))?;

        self.check_password(&group, password).await?;

        if group.is_member(&member.uid) {
            tracing::debug!(%group_id, uid = %member.uid, "already a member");
            return Ok(());
        }

        let entry = GroupMember::joining(member, GroupMemberRole::Member, Utc::now());
        match self.group_repo.add_member(group_id, &entry).await? {
            WriteOutcome::Applied => {
                tracing::info!(%group_id, uid = %member.uid, "member joined")
            }
            WriteOutcome::Unchanged => {
                tracing::debug!(%group_id, uid = %member.uid, "concurrent join already applied")
            }
        }
        Ok(())
    }

    async fn join_by_invite_code(
        &self,
        code: &str,
        member: &MemberProfile,
        password: Option<&str>,
    ) -> Result<GroupId, CommunityError> {
        let code = InviteCode::normalized(code);
        let group_id = self
            .group_repo
            .find_by_invite_code(&code)
            .await?
            .ok_or(CommunityError::InvalidCode)?;

        match self.join_by_id(&group_id, member, password).await {
            // index and group are removed together, so this is a racing delete
            Err(CommunityError::NotFound(_)) => Err(CommunityError::InvalidCode),
            other => other.map(|_| group_id),
        }
    }

    async fn leave(&self, group_id: &GroupId, uid: &UserId) -> Result<(), CommunityError> {
        let group = self
            .group_repo
            .get(group_id)
            .await?
            .ok_or(CommunityError::NotFound("group"))?;

        if group.is_owner(uid) {
            return Err(CommunityError::OwnerCannotLeave);
        }

        match self.group_repo.remove_member(group_id, uid).await? {
            WriteOutcome::Applied => tracing::info!(%group_id, %uid, "member left"),
            WriteOutcome::Unchanged => tracing::debug!(%group_id, %uid, "not a member, nothing to leave"),
        }
        Ok(())
    }

    async fn set_presence(
        &self,
        group_id: &GroupId,
        uid: &UserId,
        online: bool,
    ) -> Result<(), CommunityError> {
        match self
            .group_repo
            .set_presence(group_id, uid, online, Utc::now())
            .await?
        {
            WriteOutcome::Applied => {
                tracing::debug!(%group_id, %uid, online, "presence updated");
                Ok(())
            }
            WriteOutcome::Unchanged => Err(CommunityError::NotAMember),
        }
    }
}
