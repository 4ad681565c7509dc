//! Queue option resolution.
//!
//! Turns a queue name plus [`QueueOptions`] into the final queue name and the
//! attribute set for the creation call. The only I/O is the dead-letter
//! lookup, done through the narrow [`DeadLetterLookup`] capability.
//!
//! Resolution order:
//! 1. `VisibilityTimeout`
//! 2. `FifoQueue`, appending the `.fifo` suffix when missing
//! 3. `DelaySeconds`
//! 4. `RedrivePolicy` (queue URL lookup, then `QueueArn` lookup)
//! 5. `SqsManagedSseEnabled`
//! 6. `MessageRetentionPeriod`
//! 7. `ReceiveMessageWaitTimeSeconds`

use crate::attributes::{QueueAttribute, QueueAttributeName, QueueAttributes, RedrivePolicy};
use crate::error::QueueError;
use crate::message::{QueueArn, QueueUrl};
use crate::options::QueueOptions;
use crate::transport::QueueTransport;
use async_trait::async_trait;
use tracing::{debug, warn};

/// Name suffix required for FIFO queues
pub const FIFO_SUFFIX: &str = ".fifo";

/// Lookups needed to turn a dead-letter queue name into its ARN
#[async_trait]
pub trait DeadLetterLookup: Send + Sync {
    /// Resolve a queue URL by exact name
    async fn queue_url(&self, queue_name: &str) -> Result<QueueUrl, QueueError>;

    /// Fetch the queue's ARN, `None` if the provider returned none
    async fn queue_arn(&self, url: &QueueUrl) -> Result<Option<QueueArn>, QueueError>;
}

#[async_trait]
impl<T> DeadLetterLookup for T
where
    T: QueueTransport + ?Sized,
{
    async fn queue_url(&self, queue_name: &str) -> Result<QueueUrl, QueueError> {
        self.get_queue_url(queue_name).await
    }

    async fn queue_arn(&self, url: &QueueUrl) -> Result<Option<QueueArn>, QueueError> {
        self.get_queue_arn(url).await
    }
}

/// Final queue name and attributes ready for the creation call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedQueue {
    pub name: String,
    pub attributes: QueueAttributes,
}

impl ResolvedQueue {
    pub fn is_fifo(&self) -> bool {
        self.attributes.contains(QueueAttributeName::FifoQueue)
    }
}

/// Resolve creation options for `queue_name`.
///
/// Fails with `DeadLetterQueueNotFound` when the dead-letter queue cannot be
/// looked up and with `DeadLetterArnMissing` when it has no ARN. Nothing is
/// created either way.
pub async fn resolve_queue_options<L>(
    queue_name: &str,
    options: &QueueOptions,
    lookup: &L,
) -> Result<ResolvedQueue, QueueError>
where
    L: DeadLetterLookup + ?Sized,
{
    let mut name = queue_name.to_string();
    let mut attributes = QueueAttributes::new();

    if let Some(seconds) = options.visibility_timeout_seconds {
        attributes.set(QueueAttribute::VisibilityTimeout(seconds));
    }

    if options.fifo == Some(true) || name.ends_with(FIFO_SUFFIX) {
        attributes.set(QueueAttribute::FifoQueue);
        if !name.ends_with(FIFO_SUFFIX) {
            name.push_str(FIFO_SUFFIX);
        }
    }

    if let Some(seconds) = options.delay_seconds {
        attributes.set(QueueAttribute::DelaySeconds(seconds));
    }

    if let Some(dead_letter_queue) = options.dead_letter_queue.as_deref() {
        let target = resolve_dead_letter_arn(dead_letter_queue, lookup).await?;
        let policy = RedrivePolicy::new(&target, options.effective_max_receive_count());
        attributes.set(QueueAttribute::RedrivePolicy(policy));
    }

    if options.encrypted == Some(true) {
        attributes.set(QueueAttribute::SqsManagedSseEnabled);
    }

    if let Some(seconds) = options.message_retention_seconds {
        attributes.set(QueueAttribute::MessageRetentionPeriod(seconds));
    }

    if let Some(seconds) = options.receive_message_wait_time_seconds {
        attributes.set(QueueAttribute::ReceiveMessageWaitTimeSeconds(seconds));
    }

    debug!(
        queue_name = %name,
        attributes = ?attributes.names().collect::<Vec<_>>(),
        "Resolved queue options"
    );

    Ok(ResolvedQueue { name, attributes })
}

async fn resolve_dead_letter_arn<L>(queue_name: &str, lookup: &L) -> Result<QueueArn, QueueError>
where
    L: DeadLetterLookup + ?Sized,
{
    let not_found = |err: QueueError| QueueError::DeadLetterQueueNotFound {
        queue_name: queue_name.to_string(),
        message: err.to_string(),
    };

    let url = lookup.queue_url(queue_name).await.map_err(not_found)?;
    let arn = lookup.queue_arn(&url).await.map_err(not_found)?;

    arn.ok_or_else(|| {
        warn!(dead_letter_queue = %queue_name, queue_url = %url, "Dead letter queue has no ARN");
        QueueError::DeadLetterArnMissing {
            queue_name: queue_name.to_string(),
        }
    })
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
