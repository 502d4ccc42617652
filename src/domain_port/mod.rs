// gateway

mod document;
mod persistence_gateway;
mod subscription;

pub use document::*;
pub use persistence_gateway::*;
pub use subscription::*;

// repo

mod follow_repo;
mod group_repo;
mod message_repo;
mod user_stats_repo;

pub use follow_repo::*;
pub use group_repo::*;
pub use message_repo::*;
pub use user_stats_repo::*;
