pub mod attribute;
pub mod config;
pub mod message;
pub mod offload_config;
pub mod pointer;

pub use attribute::{AttributeValue, MessageAttributes};
pub use config::{BlobStorageSettings, Config, LoggerSettings, OffloadSettings};
pub use message::{Destination, MessageStructure, PublishRequest, PublishResult};
pub use offload_config::{DEFAULT_MESSAGE_SIZE_THRESHOLD, OffloadConfig};
pub use pointer::{
    LEGACY_MESSAGE_POINTER_CLASS, LEGACY_RESERVED_ATTRIBUTE_NAME, MESSAGE_POINTER_CLASS,
    PayloadPointer, PointerFormat, RESERVED_ATTRIBUTE_NAME,
};
