pub mod publisher;
pub mod storage;

pub use publisher::*;
pub use storage::*;
