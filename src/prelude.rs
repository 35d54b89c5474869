// Common Traits and Structs
pub use crate::common::interface::{BlobStorage, ObjectAcl, Publisher, PutObjectOptions};
pub use crate::common::model::{
    AttributeValue, Config, DEFAULT_MESSAGE_SIZE_THRESHOLD, Destination, MessageAttributes,
    MessageStructure, OffloadConfig, PayloadPointer, PointerFormat, PublishRequest, PublishResult,
};
pub use crate::common::storage::{FileBlobStorage, MemoryBlobStorage};

// Errors
pub use crate::errors::{
    BoxError, ConfigError, DataStoreError, Error, ErrorKind, OffloadError, PublishError, Result,
};

// Publishers
pub use crate::queue::{ExtendedPublisher, MemoryPublisher};

// Utils
pub use crate::utils::logger::{LoggerConfig, init_logger};
