use crate::errors::Result;
use async_trait::async_trait;

/// Canned access control applied to a stored object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjectAcl {
    #[default]
    Private,
    PublicRead,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutObjectOptions {
    pub acl: ObjectAcl,
    pub content_length: usize,
}

impl PutObjectOptions {
    /// Private object whose declared length matches `data`.
    pub fn private_for(data: &[u8]) -> Self {
        Self {
            acl: ObjectAcl::Private,
            content_length: data.len(),
        }
    }
}

#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Store `data` under `bucket`/`key`, replacing any existing object.
    async fn put(&self, bucket: &str, key: &str, data: &[u8], options: &PutObjectOptions)
    -> Result<()>;
    /// Fetch the object stored under `bucket`/`key`.
    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;
}
