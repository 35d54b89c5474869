//! Shared message model, collaborator capabilities, and blob-store backends.
//!
//! The offload engine and the publish interceptor in `queue` are written
//! against the traits in [`interface`]; [`storage`] holds the stores that ship
//! with the crate.

pub mod interface;
pub mod model;
pub mod storage;
