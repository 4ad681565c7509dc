//! Message types and the provider identifiers they carry.

use crate::error::{QueueError, SerializationError};
use crate::transport::QueueTransport;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument};

// ============================================================================
// Provider Identifiers
// ============================================================================

/// Provider-assigned address of a queue (an SQS queue URL)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueueUrl(String);

impl QueueUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Derive the queue's display name from the last path segment.
    ///
    /// SQS URLs have the form `https://sqs.<region>.amazonaws.com/<account>/<name>`.
    /// Returns `None` when the URL has no `/` or ends with one.
    pub fn queue_name(&self) -> Option<&str> {
        match self.0.rsplit_once('/') {
            Some((_, name)) if !name.is_empty() => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for QueueUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Derive a queue name from a queue URL, failing on malformed locators
pub fn queue_name_from_url(url: &QueueUrl) -> Result<String, QueueError> {
    url.queue_name()
        .map(str::to_string)
        .ok_or_else(|| QueueError::MalformedQueueLocator {
            locator: url.as_str().to_string(),
        })
}

/// Provider-assigned unique identifier of a queue (an SQS queue ARN)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueueArn(String);

impl QueueArn {
    pub fn new(arn: impl Into<String>) -> Self {
        Self(arn.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueueArn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier the provider assigns to an accepted message
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(String);

impl MessageId {
    /// Generate new random message ID
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<String> for MessageId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for MessageId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque, single-use token for deleting a received message
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ReceiptHandle(String);

impl ReceiptHandle {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Receipt handles are long; keep log lines readable.
impl fmt::Debug for ReceiptHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shown: String = self.0.chars().take(16).collect();
        if shown.len() < self.0.len() {
            write!(f, "ReceiptHandle({}…)", shown)
        } else {
            write!(f, "ReceiptHandle({})", shown)
        }
    }
}

// ============================================================================
// Outgoing Payloads
// ============================================================================

/// Body of an outgoing message.
///
/// Text is sent verbatim; structured values are JSON-encoded.
#[derive(Debug, Clone, PartialEq)]
pub enum MessagePayload {
    Text(String),
    Json(serde_json::Value),
}

impl MessagePayload {
    /// Encode a serializable value as a JSON payload
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, SerializationError> {
        Ok(Self::Json(serde_json::to_value(value)?))
    }

    /// Wire representation of the payload
    pub fn into_body(self) -> Result<String, SerializationError> {
        match self {
            Self::Text(text) => Ok(text),
            Self::Json(value) => Ok(serde_json::to_string(&value)?),
        }
    }
}

impl From<String> for MessagePayload {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for MessagePayload {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<serde_json::Value> for MessagePayload {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

// ============================================================================
// Received Messages
// ============================================================================

/// A message as returned by a transport, before body decoding
#[derive(Debug, Clone, PartialEq)]
pub struct RawMessage {
    pub message_id: MessageId,
    pub body: String,
    pub receipt_handle: ReceiptHandle,
}

/// A received message with its decoded body and the token to delete it
pub struct QueueMessage {
    pub body: serde_json::Value,
    message_id: MessageId,
    receipt_handle: ReceiptHandle,
    queue_url: QueueUrl,
    transport: Arc<dyn QueueTransport>,
}

impl QueueMessage {
    /// Decode a raw message body, failing on bodies that are not JSON
    pub(crate) fn decode(
        raw: RawMessage,
        queue_url: QueueUrl,
        transport: Arc<dyn QueueTransport>,
    ) -> Result<Self, QueueError> {
        let body = serde_json::from_str(&raw.body).map_err(QueueError::DeserializationError)?;
        Ok(Self {
            body,
            message_id: raw.message_id,
            receipt_handle: raw.receipt_handle,
            queue_url,
            transport,
        })
    }

    pub fn message_id(&self) -> &MessageId {
        &self.message_id
    }

    pub fn receipt_handle(&self) -> &ReceiptHandle {
        &self.receipt_handle
    }

    pub fn queue_url(&self) -> &QueueUrl {
        &self.queue_url
    }

    /// Deserialize the body into a concrete type
    pub fn body_as<T: DeserializeOwned>(&self) -> Result<T, QueueError> {
        T::deserialize(&self.body).map_err(QueueError::DeserializationError)
    }

    /// Delete the message from its queue, redeeming the receipt handle.
    #[instrument(skip(self), fields(queue_url = %self.queue_url, message_id = %self.message_id))]
    pub async fn delete(self) -> Result<(), QueueError> {
        self.transport
            .delete_message(&self.queue_url, &self.receipt_handle)
            .await?;
        debug!("Message deleted");
        Ok(())
    }
}

impl fmt::Debug for QueueMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueMessage")
            .field("body", &self.body)
            .field("message_id", &self.message_id)
            .field("receipt_handle", &self.receipt_handle)
            .field("queue_url", &self.queue_url)
            .finish()
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
