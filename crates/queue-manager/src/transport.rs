//! The transport contract the queue manager depends on.
//!
//! A transport performs one provider call per method and maps provider
//! failures into [`QueueError`]. It holds no per-queue state on behalf of the
//! manager, so a single transport can be shared by every handle.

use crate::error::QueueError;
use crate::message::{MessageId, QueueArn, QueueUrl, RawMessage, ReceiptHandle};
use crate::provider::ProviderType;
use async_trait::async_trait;
use std::collections::HashMap;

/// One page of a queue listing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueueListPage {
    pub queue_urls: Vec<QueueUrl>,
    /// Continuation token; `None` when the listing is exhausted
    pub next_token: Option<String>,
}

/// Interface implemented by queue service clients (AWS SQS, in-memory)
#[async_trait]
pub trait QueueTransport: Send + Sync {
    /// Create a queue with provider-encoded attributes.
    ///
    /// `Ok(None)` means the provider reported success without a URL.
    async fn create_queue(
        &self,
        name: &str,
        attributes: HashMap<String, String>,
    ) -> Result<Option<QueueUrl>, QueueError>;

    /// Resolve a queue URL by exact name
    async fn get_queue_url(&self, name: &str) -> Result<QueueUrl, QueueError>;

    /// Fetch one page of queue URLs, optionally filtered by name prefix
    async fn list_queues(
        &self,
        prefix: Option<&str>,
        next_token: Option<String>,
    ) -> Result<QueueListPage, QueueError>;

    /// Delete a queue
    async fn delete_queue(&self, url: &QueueUrl) -> Result<(), QueueError>;

    /// Send a single message body.
    ///
    /// FIFO queues require `message_group_id`; standard queues ignore it.
    async fn send_message(
        &self,
        url: &QueueUrl,
        body: &str,
        message_group_id: Option<&str>,
    ) -> Result<MessageId, QueueError>;

    /// Long-poll for up to `max_messages` messages
    async fn receive_messages(
        &self,
        url: &QueueUrl,
        max_messages: u32,
        wait_time_seconds: u32,
    ) -> Result<Vec<RawMessage>, QueueError>;

    /// Delete a received message by its receipt handle
    async fn delete_message(
        &self,
        url: &QueueUrl,
        receipt: &ReceiptHandle,
    ) -> Result<(), QueueError>;

    /// Fetch the queue's unique identifier (`QueueArn` attribute)
    async fn get_queue_arn(&self, url: &QueueUrl) -> Result<Option<QueueArn>, QueueError>;

    /// Get provider type
    fn provider_type(&self) -> ProviderType;
}
