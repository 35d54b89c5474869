use crate::common::model::{PublishRequest, PublishResult};
use crate::errors::Result;
use async_trait::async_trait;

/// The pub/sub transport's publish call.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, request: PublishRequest) -> Result<PublishResult>;
}
