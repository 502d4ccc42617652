use crate::domain_model::UserId;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowEdge {
    pub follower: UserId,
    pub followee: UserId,
    pub since: DateTime<Utc>,
}
