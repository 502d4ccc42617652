mod credential_hasher_impl;
mod group_registry_impl;
#[cfg(test)]
mod invite_code_fake;
mod invite_code_impl;
mod membership_manager_impl;
mod message_stream_impl;
mod quota_policy_impl;
mod social_graph_impl;

pub use credential_hasher_impl::*;
pub use group_registry_impl::*;
#[cfg(test)]
pub use invite_code_fake::*;
pub use invite_code_impl::*;
pub use membership_manager_impl::*;
pub use message_stream_impl::*;
pub use quota_policy_impl::*;
pub use social_graph_impl::*;

#[cfg(test)]
pub(crate) mod test_support;
