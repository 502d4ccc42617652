mod community;

pub use community::*;
