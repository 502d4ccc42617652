mod memory_gateway;
mod query_eval;

pub use memory_gateway::*;
