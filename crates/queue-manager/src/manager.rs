//! Queue creation, lookup and listing.

use crate::error::QueueError;
use crate::message::{queue_name_from_url, QueueUrl};
use crate::options::QueueOptions;
use crate::provider::ProviderType;
use crate::queue::Queue;
use crate::resolver::resolve_queue_options;
use crate::transport::QueueTransport;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument};

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;

/// Entry point for queue management.
///
/// The manager owns nothing but the transport; every [`Queue`] it hands out
/// shares that transport.
#[derive(Clone)]
pub struct QueueManager {
    transport: Arc<dyn QueueTransport>,
}

impl QueueManager {
    /// Create new queue manager over a transport
    pub fn new(transport: Arc<dyn QueueTransport>) -> Self {
        Self { transport }
    }

    pub fn provider_type(&self) -> ProviderType {
        self.transport.provider_type()
    }

    /// Create a queue, resolving its options first.
    ///
    /// When a dead-letter queue is requested it is looked up before anything
    /// is created; if that lookup fails no queue is created. The returned
    /// handle carries the resolved name, which may have gained a `.fifo`
    /// suffix.
    #[instrument(skip(self, options))]
    pub async fn create_queue(
        &self,
        queue_name: &str,
        options: &QueueOptions,
    ) -> Result<Queue, QueueError> {
        let resolved = resolve_queue_options(queue_name, options, &*self.transport).await?;
        let attributes = resolved.attributes.to_wire()?;

        let url = self
            .transport
            .create_queue(&resolved.name, attributes)
            .await?
            .ok_or_else(|| QueueError::QueueUrlMissing {
                queue_name: resolved.name.clone(),
            })?;

        info!(
            queue_name = %resolved.name,
            queue_url = %url,
            fifo = resolved.is_fifo(),
            "Queue created"
        );

        Ok(Queue::new(resolved.name, url, Arc::clone(&self.transport)))
    }

    /// Look up an existing queue by exact name
    #[instrument(skip(self))]
    pub async fn get_queue(&self, queue_name: &str) -> Result<Queue, QueueError> {
        let url = self.transport.get_queue_url(queue_name).await?;
        Ok(Queue::new(queue_name, url, Arc::clone(&self.transport)))
    }

    /// List every queue whose name starts with `prefix`.
    ///
    /// Follows continuation tokens until the provider reports no more pages,
    /// keeping provider order. Names are taken from the last URL segment.
    #[instrument(skip(self))]
    pub async fn list_queues(&self, prefix: Option<&str>) -> Result<Vec<Queue>, QueueError> {
        let mut queues = Vec::new();
        let mut next_token = None;
        let mut pages = 0usize;

        loop {
            let page = self.transport.list_queues(prefix, next_token).await?;
            pages += 1;

            for url in page.queue_urls {
                let name = queue_name_from_url(&url)?;
                queues.push(Queue::new(name, url, Arc::clone(&self.transport)));
            }

            match page.next_token {
                Some(token) => next_token = Some(token),
                None => break,
            }
        }

        debug!(count = queues.len(), pages, "Listed queues");
        Ok(queues)
    }

    /// Build a handle for a queue whose URL is already known
    pub fn queue_from_url(&self, url: QueueUrl) -> Result<Queue, QueueError> {
        let name = queue_name_from_url(&url)?;
        Ok(Queue::new(name, url, Arc::clone(&self.transport)))
    }
}

impl fmt::Debug for QueueManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueManager")
            .field("provider", &self.transport.provider_type())
            .finish()
    }
}
