//! # Queue Manager
//!
//! Client library for SQS-style message queues.
//!
//! This library provides:
//! - Queue creation with option resolution (FIFO naming, dead letter redrive)
//! - Queue lookup and prefix-filtered listing across paginated results
//! - Sending, long-poll receiving and deleting messages
//! - An AWS SQS transport and an in-memory transport for tests
//!
//! ## Module Organization
//!
//! - [`error`] - Error types for all queue operations
//! - [`options`] - Caller-facing queue creation options
//! - [`attributes`] - Typed provider queue attributes
//! - [`resolver`] - Turns a name plus options into a creation request
//! - [`manager`] - Create, get and list queues
//! - [`queue`] - Send, receive and delete through a queue handle
//! - [`message`] - Identifiers, payloads and received messages
//! - [`transport`] - The provider contract
//! - [`provider`] - Provider types and configuration
//! - [`providers`] - AWS SQS and in-memory transports
//!
//! ## Example
//!
//! ```
//! use queue_manager::providers::InMemoryTransport;
//! use queue_manager::{QueueManager, QueueOptions};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), queue_manager::QueueError> {
//! let manager = QueueManager::new(Arc::new(InMemoryTransport::default()));
//! let queue = manager.create_queue("orders", &QueueOptions::new()).await?;
//!
//! queue.send_message(serde_json::json!({"id": 1})).await?;
//! for message in queue.receive_messages(1, 5).await? {
//!     println!("{}", message.body);
//!     message.delete().await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod attributes;
pub mod error;
pub mod manager;
pub mod message;
pub mod options;
pub mod provider;
pub mod providers;
pub mod queue;
pub mod resolver;
pub mod transport;

// Re-export commonly used types at crate root for convenience
pub use attributes::{QueueAttribute, QueueAttributeName, QueueAttributes, RedrivePolicy};
pub use error::{ConfigurationError, QueueError, SerializationError};
pub use manager::QueueManager;
pub use message::{
    queue_name_from_url, MessageId, MessagePayload, QueueArn, QueueMessage, QueueUrl, RawMessage,
    ReceiptHandle,
};
pub use options::QueueOptions;
pub use provider::{AwsSqsConfig, InMemoryConfig, ProviderType};
pub use queue::{Queue, DEFAULT_MESSAGE_GROUP_ID};
pub use resolver::{resolve_queue_options, DeadLetterLookup, ResolvedQueue, FIFO_SUFFIX};
pub use transport::{QueueListPage, QueueTransport};

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
