use crate::common::interface::storage::{BlobStorage, ObjectAcl, PutObjectOptions};
use crate::errors::Result;
use crate::errors::error::DataStoreError;
use async_trait::async_trait;
use dashmap::DashMap;
use log::debug;

#[derive(Debug, Clone)]
struct StoredObject {
    data: Vec<u8>,
    acl: ObjectAcl,
}

/// In-process blob store keyed by `(bucket, key)`.
#[derive(Debug, Default)]
pub struct MemoryBlobStorage {
    objects: DashMap<(String, String), StoredObject>,
}

impl MemoryBlobStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn contains(&self, bucket: &str, key: &str) -> bool {
        self.objects
            .contains_key(&(bucket.to_string(), key.to_string()))
    }

    pub fn acl(&self, bucket: &str, key: &str) -> Option<ObjectAcl> {
        self.objects
            .get(&(bucket.to_string(), key.to_string()))
            .map(|object| object.acl)
    }
}

#[async_trait]
impl BlobStorage for MemoryBlobStorage {
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        data: &[u8],
        options: &PutObjectOptions,
    ) -> Result<()> {
        if options.content_length != data.len() {
            return Err(DataStoreError::InvalidData(
                format!(
                    "content length {} does not match body length {}",
                    options.content_length,
                    data.len()
                )
                .into(),
            )
            .into());
        }
        self.objects.insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                data: data.to_vec(),
                acl: options.acl,
            },
        );
        debug!("Stored {} bytes at {}/{}", data.len(), bucket, key);
        Ok(())
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        self.objects
            .get(&(bucket.to_string(), key.to_string()))
            .map(|object| object.data.clone())
            .ok_or_else(|| DataStoreError::NotFound(format!("{bucket}/{key}")).into())
    }
}
