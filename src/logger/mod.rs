//! Process-wide tracing setup. Boots at `info` and is reloaded once the
//! settings are known; see `bin/community_demo.rs` for it in use.

mod logger;
pub use logger::*;

pub use tracing::{debug, error, info, trace, warn};
