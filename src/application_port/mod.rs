mod community_error;
mod credential_hasher;
mod group_registry;
mod invite_code;
mod live_view;
mod membership_manager;
mod message_stream;
mod quota_policy;
mod social_graph;

pub use community_error::*;
pub use credential_hasher::*;
pub use group_registry::*;
pub use invite_code::*;
pub use live_view::*;
pub use membership_manager::*;
pub use message_stream::*;
pub use quota_policy::*;
pub use social_graph::*;
