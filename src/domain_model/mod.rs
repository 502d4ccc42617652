mod follow;
mod group;
mod invite;
mod message;
mod unit;
mod user;

pub use follow::*;
pub use group::*;
pub use invite::*;
pub use message::*;
pub use unit::*;
pub use user::*;
