pub mod error;

pub use error::{
    BoxError, ConfigError, DataStoreError, Error, ErrorKind, OffloadError, PublishError, Result,
};
