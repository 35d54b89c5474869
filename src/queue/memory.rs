use crate::common::interface::Publisher;
use crate::common::model::{PublishRequest, PublishResult};
use crate::errors::Result;
use async_trait::async_trait;
use log::debug;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use uuid::Uuid;

/// Publisher that keeps every request in memory (single node mode and tests).
///
/// Requests carrying a `message_group_id` get a monotonically increasing
/// sequence number, as FIFO topics hand out.
#[derive(Debug, Default)]
pub struct MemoryPublisher {
    published: Mutex<Vec<PublishRequest>>,
    sequence: AtomicU64,
}

impl MemoryPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything published so far, in publish order.
    pub async fn published(&self) -> Vec<PublishRequest> {
        self.published.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.published.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.published.lock().await.is_empty()
    }
}

#[async_trait]
impl Publisher for MemoryPublisher {
    async fn publish(&self, request: PublishRequest) -> Result<PublishResult> {
        let sequence_number = request.message_group_id.as_ref().map(|_| {
            let next = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
            format!("{next:020}")
        });
        let message_id = Uuid::new_v4().to_string();
        debug!(
            "Published message {} ({} bytes, {} attributes)",
            message_id,
            request.message.len(),
            request.attributes.len()
        );
        self.published.lock().await.push(request);
        Ok(PublishResult {
            message_id,
            sequence_number,
        })
    }
}
