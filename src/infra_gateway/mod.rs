mod follow_repo_gateway;
mod group_repo_gateway;
mod message_repo_gateway;
mod user_stats_repo_gateway;

pub use follow_repo_gateway::*;
pub use group_repo_gateway::*;
pub use message_repo_gateway::*;
pub use user_stats_repo_gateway::*;

mod records;
mod util;
