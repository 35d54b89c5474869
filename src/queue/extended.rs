use crate::common::interface::{BlobStorage, Publisher, PutObjectOptions};
use crate::common::model::{Config, Destination, OffloadConfig, PublishRequest, PublishResult};
use crate::common::storage::{FileBlobStorage, MemoryBlobStorage};
use crate::errors::{Error, Result};
use crate::queue::policy::OffloadPolicy;
use async_trait::async_trait;
use log::{debug, info, warn};
use std::sync::Arc;

/// Publisher that moves oversized payloads into a blob store before publishing.
///
/// Wraps any [`Publisher`]. Messages that stay under the configured threshold
/// pass straight through; larger ones (or all of them, with `always_offload`)
/// are written to the blob store first and published as a pointer record.
///
/// Configuration changes need `&mut self`, so they cannot race an in-flight
/// publish; share the publisher behind an `Arc` once it is configured.
pub struct ExtendedPublisher {
    publisher: Arc<dyn Publisher>,
    storage: Arc<dyn BlobStorage>,
    config: OffloadConfig,
    destination: Option<Destination>,
}

impl ExtendedPublisher {
    pub fn new(publisher: Arc<dyn Publisher>, storage: Arc<dyn BlobStorage>) -> Self {
        Self {
            publisher,
            storage,
            config: OffloadConfig::default(),
            destination: None,
        }
    }

    /// Builds a publisher from file configuration.
    ///
    /// Payloads go to a file-backed store when `[blob_storage].path` is set and
    /// to an in-memory store otherwise.
    pub fn from_config(cfg: &Config, publisher: Arc<dyn Publisher>) -> Result<Self> {
        if let Some(logger) = &cfg.logger
            && let Err(e) = logger.to_logger_config().init()
        {
            warn!("[{}] Failed to initialize logger: {}", cfg.name, e);
        }

        let offload_config = cfg.offload.to_offload_config()?;

        let storage: Arc<dyn BlobStorage> = match cfg
            .blob_storage
            .as_ref()
            .and_then(|blob| blob.path.as_deref())
        {
            Some(path) => {
                info!("[{}] BlobStorage initialized at: {}", cfg.name, path);
                Arc::new(FileBlobStorage::new(path))
            }
            None => {
                info!("[{}] In-memory BlobStorage initialized", cfg.name);
                Arc::new(MemoryBlobStorage::new())
            }
        };

        Ok(Self::new(publisher, storage).with_config(offload_config))
    }

    /// Binds every publish to `destination` unless the request names its own.
    pub fn bound_to(mut self, destination: Destination) -> Self {
        self.destination = Some(destination);
        self
    }

    pub fn with_config(mut self, config: OffloadConfig) -> Self {
        self.config = config;
        self
    }

    pub fn destination(&self) -> Option<&Destination> {
        self.destination.as_ref()
    }

    pub fn config(&self) -> &OffloadConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut OffloadConfig {
        &mut self.config
    }

    pub fn storage(&self) -> &Arc<dyn BlobStorage> {
        &self.storage
    }

    pub fn set_bucket(&mut self, bucket: impl Into<String>) -> Result<()> {
        self.config.set_bucket(bucket)
    }

    pub fn clear_bucket(&mut self) {
        self.config.clear_bucket();
    }

    pub fn set_size_threshold(&mut self, threshold: usize) -> Result<()> {
        self.config.set_size_threshold(threshold)
    }

    pub fn set_always_offload(&mut self, always_offload: bool) -> Result<()> {
        self.config.set_always_offload(always_offload)
    }

    pub fn set_use_legacy_pointer_format(&mut self, use_legacy: bool) {
        self.config.set_use_legacy_pointer_format(use_legacy);
    }

    /// Publishes `request`, offloading its body first when the policy says so.
    ///
    /// The blob-store write always happens before the publish; if it fails,
    /// nothing is published.
    pub async fn publish(&self, mut request: PublishRequest) -> Result<PublishResult> {
        let destination = request
            .destination
            .clone()
            .or_else(|| self.destination.clone())
            .ok_or_else(Error::missing_destination)?;

        let plan = OffloadPolicy::new(&self.config)
            .decide_and_transform(&request.attributes, &request.message, request.structure.as_ref())
            .inspect_err(|e| warn!("Rejected publish to {}: {}", destination, e))?;

        if let Some(upload) = &plan.upload {
            let options = PutObjectOptions::private_for(&upload.payload);
            self.storage
                .put(&upload.bucket, &upload.key, &upload.payload, &options)
                .await?;
            debug!(
                "Stored payload for {} at {}/{}",
                destination, upload.bucket, upload.key
            );
        }

        request.destination = Some(destination);
        request.attributes = plan.attributes;
        request.message = plan.message;
        self.publisher.publish(request).await
    }
}

#[async_trait]
impl Publisher for ExtendedPublisher {
    async fn publish(&self, request: PublishRequest) -> Result<PublishResult> {
        ExtendedPublisher::publish(self, request).await
    }
}
