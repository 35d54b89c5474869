//! payload-offload: publish interceptor that moves oversized message bodies
//! into a blob store and publishes a pointer in their place.

pub mod prelude;

#[path = "common/lib.rs"]
pub mod common;
#[path = "errors/lib.rs"]
pub mod errors;
#[path = "queue/lib.rs"]
pub mod queue;
#[path = "utils/lib.rs"]
pub mod utils;
