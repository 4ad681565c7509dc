//! Handle to a single remote queue.

use crate::error::QueueError;
use crate::message::{MessageId, MessagePayload, QueueMessage, QueueUrl};
use crate::resolver::FIFO_SUFFIX;
use crate::transport::QueueTransport;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument};

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;

/// Messages requested by [`Queue::receive`]
pub const DEFAULT_MAX_MESSAGES: u32 = 1;

/// Long-poll wait used by [`Queue::receive`]
pub const DEFAULT_WAIT_SECONDS: u32 = 5;

/// Message group used by [`Queue::send_message`] on FIFO queues.
///
/// Every message sent without an explicit group lands in this one, so the
/// queue delivers them in strict send order.
pub const DEFAULT_MESSAGE_GROUP_ID: &str = "default";

/// A queue's identity plus the transport used to reach it.
///
/// Handles are cheap to clone and hold no local state besides the name and
/// URL; the queue itself lives with the provider.
#[derive(Clone)]
pub struct Queue {
    name: String,
    url: QueueUrl,
    transport: Arc<dyn QueueTransport>,
}

impl Queue {
    pub fn new(name: impl Into<String>, url: QueueUrl, transport: Arc<dyn QueueTransport>) -> Self {
        Self {
            name: name.into(),
            url,
            transport,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> &QueueUrl {
        &self.url
    }

    pub fn is_fifo(&self) -> bool {
        self.name.ends_with(FIFO_SUFFIX)
    }

    /// Send a message.
    ///
    /// Text payloads go out verbatim, structured payloads as JSON. FIFO
    /// queues receive it in [`DEFAULT_MESSAGE_GROUP_ID`].
    pub async fn send_message(
        &self,
        payload: impl Into<MessagePayload>,
    ) -> Result<MessageId, QueueError> {
        let group = self.is_fifo().then_some(DEFAULT_MESSAGE_GROUP_ID);
        self.send(payload.into(), group).await
    }

    /// Send a message into a specific FIFO message group.
    ///
    /// Standard queues have no groups and ignore `message_group_id`.
    pub async fn send_message_in_group(
        &self,
        payload: impl Into<MessagePayload>,
        message_group_id: &str,
    ) -> Result<MessageId, QueueError> {
        self.send(payload.into(), Some(message_group_id)).await
    }

    #[instrument(skip(self, payload), fields(queue = %self.name))]
    async fn send(
        &self,
        payload: MessagePayload,
        message_group_id: Option<&str>,
    ) -> Result<MessageId, QueueError> {
        let body = payload.into_body()?;
        let message_id = self
            .transport
            .send_message(&self.url, &body, message_group_id)
            .await?;
        debug!(message_id = %message_id, "Message sent");
        Ok(message_id)
    }

    /// Serialize `value` as JSON and send it
    pub async fn send_json<T>(&self, value: &T) -> Result<MessageId, QueueError>
    where
        T: Serialize + ?Sized,
    {
        self.send_message(MessagePayload::json(value)?).await
    }

    /// Receive up to `max_messages`, waiting at most `wait_time_seconds`.
    ///
    /// Returns an empty list when nothing arrives in time. Every body must be
    /// JSON; one malformed body fails the whole call with
    /// `DeserializationError`.
    #[instrument(skip(self), fields(queue = %self.name))]
    pub async fn receive_messages(
        &self,
        max_messages: u32,
        wait_time_seconds: u32,
    ) -> Result<Vec<QueueMessage>, QueueError> {
        let raw = self
            .transport
            .receive_messages(&self.url, max_messages, wait_time_seconds)
            .await?;

        let messages = raw
            .into_iter()
            .map(|raw| QueueMessage::decode(raw, self.url.clone(), Arc::clone(&self.transport)))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(count = messages.len(), "Messages received");
        Ok(messages)
    }

    /// Receive with the default batch size and wait
    pub async fn receive(&self) -> Result<Vec<QueueMessage>, QueueError> {
        self.receive_messages(DEFAULT_MAX_MESSAGES, DEFAULT_WAIT_SECONDS)
            .await
    }

    /// Delete the remote queue
    #[instrument(skip(self), fields(queue = %self.name))]
    pub async fn delete(&self) -> Result<(), QueueError> {
        self.transport.delete_queue(&self.url).await?;
        info!(queue_url = %self.url, "Queue deleted");
        Ok(())
    }
}

impl fmt::Debug for Queue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Queue")
            .field("name", &self.name)
            .field("url", &self.url)
            .field("provider", &self.transport.provider_type())
            .finish()
    }
}
