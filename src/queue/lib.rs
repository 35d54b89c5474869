pub mod extended;
pub mod memory;
pub mod policy;

pub use extended::ExtendedPublisher;
pub use memory::MemoryPublisher;
pub use policy::{
    MAX_ALLOWED_ATTRIBUTES, OffloadPolicy, PayloadPlan, PendingUpload, S3_KEY_ATTRIBUTE_NAME,
    attributes_size, message_size,
};
