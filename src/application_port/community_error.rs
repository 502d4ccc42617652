use crate::domain_model::GroupType;
use crate::domain_port::GatewayError;

#[derive(Debug, thiserror::Error)]
pub enum CommunityError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("not an owner")]
    NotOwner,
    #[error("not a member")]
    NotAMember,
    #[error("incorrect group password")]
    BadPassword,
    #[error("invite code does not match any group")]
    InvalidCode,
    #[error("{group_type} group limit reached ({current_count}/{limit})")]
    QuotaExceeded {
        group_type: GroupType,
        current_count: u32,
        limit: u32,
    },
    #[error("invalid group: {0}")]
    InvalidGroupSpec(String),
    #[error("invalid message: {0}")]
    InvalidMessage(String),
    #[error("owner cannot leave the group")]
    OwnerCannotLeave,
    #[error("cannot follow yourself")]
    SelfFollow,
    #[error("store error: {0}")]
    Persistence(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl CommunityError {
    pub fn store(context: &str, err: GatewayError) -> Self {
        CommunityError::Persistence(format!("{context}: {err}"))
    }
}
