//! AWS SQS transport implementation.
//!
//! This module provides a [`QueueTransport`] backed by the official
//! `aws-sdk-sqs` client.
//!
//! ## Authentication
//!
//! Credentials come from the standard AWS provider chain (environment
//! variables, shared profile files, web identity, ECS/IMDS). Only the region
//! and an optional endpoint override are taken from [`AwsSqsConfig`], which
//! makes LocalStack or ElasticMQ usable by setting `SQS_ENDPOINT`.
//!
//! ## Error Mapping
//!
//! Service error codes are mapped onto [`QueueError`]:
//! - Missing queues map to `QueueNotFound`
//! - Name conflicts map to `QueueAlreadyExists`
//! - Stale or unknown receipt handles map to `MessageNotFound`
//! - Credential and signature failures map to `AuthenticationFailed`
//! - Dispatch failures and timeouts map to `ConnectionFailed`
//!
//! Everything else surfaces as `ProviderError` with the service error code.
//!
//! ## FIFO Queues
//!
//! Sends to a `.fifo` queue URL carry the caller's message group id and a
//! random `MessageDeduplicationId`, so queues without content-based
//! deduplication accept them too.
//!
//! ## Example
//!
//! ```no_run
//! use queue_manager::providers::SqsTransport;
//! use queue_manager::{AwsSqsConfig, QueueManager, QueueOptions};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = SqsTransport::connect(AwsSqsConfig::from_env()?).await;
//! let manager = QueueManager::new(Arc::new(transport));
//!
//! let queue = manager
//!     .create_queue("orders", &QueueOptions::new().with_fifo(true))
//!     .await?;
//! assert_eq!(queue.name(), "orders.fifo");
//! # Ok(())
//! # }
//! ```

use crate::error::{is_retryable_code, QueueError};
use crate::message::{MessageId, QueueArn, QueueUrl, RawMessage, ReceiptHandle};
use crate::provider::{AwsSqsConfig, ProviderType};
use crate::resolver::FIFO_SUFFIX;
use crate::transport::{QueueListPage, QueueTransport};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_sqs::config::Region;
use aws_sdk_sqs::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_sqs::types::QueueAttributeName;
use aws_sdk_sqs::Client;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, instrument, warn};

#[cfg(test)]
#[path = "sqs_tests.rs"]
mod tests;

/// Prefix the query protocol puts in front of SQS specific error codes
const LEGACY_CODE_PREFIX: &str = "AWS.SimpleQueueService.";

/// Queue URLs requested per `ListQueues` call. SQS only returns a
/// continuation token when a page size is given.
pub const LIST_QUEUES_PAGE_SIZE: i32 = 1000;

// ============================================================================
// Error Types
// ============================================================================

/// AWS SQS specific errors
#[derive(Debug, thiserror::Error)]
pub enum SqsError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Queue not found: {0}")]
    QueueNotFound(String),

    #[error("Queue already exists: {0}")]
    QueueAlreadyExists(String),

    #[error("Invalid receipt handle: {0}")]
    InvalidReceipt(String),

    #[error("SQS service error {code}: {message}")]
    ServiceError { code: String, message: String },
}

impl SqsError {
    /// Classify a service error code.
    ///
    /// `subject` names the queue or receipt the failed call was about and
    /// ends up in the mapped error.
    pub fn from_code(code: &str, message: impl Into<String>, subject: &str) -> Self {
        let message = message.into();
        match code.strip_prefix(LEGACY_CODE_PREFIX).unwrap_or(code) {
            "NonExistentQueue" | "QueueDoesNotExist" => Self::QueueNotFound(subject.to_string()),
            "QueueAlreadyExists" | "QueueNameExists" => {
                Self::QueueAlreadyExists(subject.to_string())
            }
            "ReceiptHandleIsInvalid" | "InvalidReceiptHandle" => {
                Self::InvalidReceipt(subject.to_string())
            }
            "InvalidClientTokenId"
            | "UnrecognizedClientException"
            | "SignatureDoesNotMatch"
            | "MissingAuthenticationToken"
            | "IncompleteSignature"
            | "ExpiredToken"
            | "InvalidSecurity"
            | "AccessDenied"
            | "AccessDeniedException" => Self::Authentication(message),
            other => Self::ServiceError {
                code: other.to_string(),
                message,
            },
        }
    }

    /// Convert an SDK failure, using the service error code when one exists
    pub fn from_sdk<E, R>(err: SdkError<E, R>, subject: &str) -> Self
    where
        E: ProvideErrorMetadata + std::error::Error + 'static,
        R: fmt::Debug,
    {
        let detail = DisplayErrorContext(&err).to_string();
        match &err {
            SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => Self::NetworkError(detail),
            _ => match err.code() {
                Some(code) => {
                    let message = err.message().map(str::to_string).unwrap_or(detail);
                    Self::from_code(code, message, subject)
                }
                None => Self::ServiceError {
                    code: "Unknown".to_string(),
                    message: detail,
                },
            },
        }
    }

    /// Check if error is transient and should be retried
    pub fn is_transient(&self) -> bool {
        match self {
            Self::NetworkError(_) => true,
            Self::ServiceError { code, .. } => is_retryable_code(code),
            _ => false,
        }
    }

    /// Map SQS error to QueueError
    pub fn to_queue_error(self) -> QueueError {
        match self {
            Self::Authentication(message) => QueueError::AuthenticationFailed { message },
            Self::NetworkError(message) => QueueError::ConnectionFailed { message },
            Self::QueueNotFound(queue_name) => QueueError::QueueNotFound { queue_name },
            Self::QueueAlreadyExists(queue_name) => QueueError::QueueAlreadyExists { queue_name },
            Self::InvalidReceipt(receipt) => QueueError::MessageNotFound { receipt },
            Self::ServiceError { code, message } => QueueError::ProviderError {
                provider: ProviderType::AwsSqs.to_string(),
                code,
                message,
            },
        }
    }
}

fn map_sdk_error<E, R>(subject: &str) -> impl FnOnce(SdkError<E, R>) -> QueueError + '_
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: fmt::Debug,
{
    move |err| SqsError::from_sdk(err, subject).to_queue_error()
}

/// Name used in errors about a queue addressed by URL
fn subject_for(url: &QueueUrl) -> &str {
    url.queue_name().unwrap_or(url.as_str())
}

// ============================================================================
// SQS Transport
// ============================================================================

/// Queue transport backed by `aws-sdk-sqs`
#[derive(Clone)]
pub struct SqsTransport {
    client: Client,
}

impl SqsTransport {
    /// Build a client from the default AWS configuration chain.
    ///
    /// The region and endpoint in `config` override what the chain resolves.
    pub async fn connect(config: AwsSqsConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = config.region.clone() {
            loader = loader.region(Region::new(region));
        }
        if let Some(endpoint) = config.endpoint_url.as_deref() {
            loader = loader.endpoint_url(endpoint);
        }
        let shared = loader.load().await;

        debug!(
            region = ?shared.region().map(|r| r.as_ref().to_string()),
            endpoint = ?config.endpoint_url,
            "Created SQS client"
        );

        Self::from_client(Client::new(&shared))
    }

    /// Wrap an already configured SDK client
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    /// Underlying SDK client
    pub fn client(&self) -> &Client {
        &self.client
    }
}

impl fmt::Debug for SqsTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqsTransport")
            .field("region", &self.client.config().region())
            .finish()
    }
}

#[async_trait]
impl QueueTransport for SqsTransport {
    #[instrument(skip(self, attributes), fields(attribute_count = attributes.len()))]
    async fn create_queue(
        &self,
        name: &str,
        attributes: HashMap<String, String>,
    ) -> Result<Option<QueueUrl>, QueueError> {
        let attributes: HashMap<QueueAttributeName, String> = attributes
            .into_iter()
            .map(|(key, value)| (QueueAttributeName::from(key.as_str()), value))
            .collect();

        let output = self
            .client
            .create_queue()
            .queue_name(name)
            .set_attributes((!attributes.is_empty()).then_some(attributes))
            .send()
            .await
            .map_err(map_sdk_error(name))?;

        Ok(output.queue_url().map(QueueUrl::new))
    }

    #[instrument(skip(self))]
    async fn get_queue_url(&self, name: &str) -> Result<QueueUrl, QueueError> {
        let output = self
            .client
            .get_queue_url()
            .queue_name(name)
            .send()
            .await
            .map_err(map_sdk_error(name))?;

        output
            .queue_url()
            .map(QueueUrl::new)
            .ok_or_else(|| QueueError::QueueUrlMissing {
                queue_name: name.to_string(),
            })
    }

    #[instrument(skip(self))]
    async fn list_queues(
        &self,
        prefix: Option<&str>,
        next_token: Option<String>,
    ) -> Result<QueueListPage, QueueError> {
        let output = self
            .client
            .list_queues()
            .max_results(LIST_QUEUES_PAGE_SIZE)
            .set_queue_name_prefix(prefix.map(str::to_string))
            .set_next_token(next_token)
            .send()
            .await
            .map_err(map_sdk_error(prefix.unwrap_or_default()))?;

        Ok(QueueListPage {
            queue_urls: output.queue_urls().iter().map(QueueUrl::new).collect(),
            next_token: output.next_token().map(str::to_string),
        })
    }

    #[instrument(skip(self), fields(queue_url = %url))]
    async fn delete_queue(&self, url: &QueueUrl) -> Result<(), QueueError> {
        self.client
            .delete_queue()
            .queue_url(url.as_str())
            .send()
            .await
            .map_err(map_sdk_error(subject_for(url)))?;
        Ok(())
    }

    #[instrument(skip(self, body), fields(queue_url = %url, body_len = body.len()))]
    async fn send_message(
        &self,
        url: &QueueUrl,
        body: &str,
        message_group_id: Option<&str>,
    ) -> Result<MessageId, QueueError> {
        let mut request = self
            .client
            .send_message()
            .queue_url(url.as_str())
            .message_body(body);

        // FIFO sends carry the group and a fresh deduplication id per call
        if url.as_str().ends_with(FIFO_SUFFIX) {
            request = request
                .set_message_group_id(message_group_id.map(str::to_string))
                .message_deduplication_id(uuid::Uuid::new_v4().to_string());
        }

        let output = request
            .send()
            .await
            .map_err(map_sdk_error(subject_for(url)))?;

        output
            .message_id()
            .map(MessageId::from)
            .ok_or_else(|| QueueError::ProviderError {
                provider: ProviderType::AwsSqs.to_string(),
                code: "MissingMessageId".to_string(),
                message: "SendMessage response did not include a message id".to_string(),
            })
    }

    #[instrument(skip(self), fields(queue_url = %url))]
    async fn receive_messages(
        &self,
        url: &QueueUrl,
        max_messages: u32,
        wait_time_seconds: u32,
    ) -> Result<Vec<RawMessage>, QueueError> {
        let output = self
            .client
            .receive_message()
            .queue_url(url.as_str())
            .max_number_of_messages(i32::try_from(max_messages).unwrap_or(i32::MAX))
            .wait_time_seconds(i32::try_from(wait_time_seconds).unwrap_or(i32::MAX))
            .send()
            .await
            .map_err(map_sdk_error(subject_for(url)))?;

        let messages = output
            .messages()
            .iter()
            .filter_map(|message| {
                match (message.message_id(), message.receipt_handle()) {
                    (Some(id), Some(receipt)) => Some(RawMessage {
                        message_id: MessageId::from(id),
                        body: message.body().unwrap_or_default().to_string(),
                        receipt_handle: ReceiptHandle::new(receipt),
                    }),
                    _ => {
                        warn!(
                            message_id = ?message.message_id(),
                            "Skipping received message without id or receipt handle"
                        );
                        None
                    }
                }
            })
            .collect::<Vec<_>>();

        debug!(count = messages.len(), "Received messages");
        Ok(messages)
    }

    #[instrument(skip(self, receipt), fields(queue_url = %url))]
    async fn delete_message(
        &self,
        url: &QueueUrl,
        receipt: &ReceiptHandle,
    ) -> Result<(), QueueError> {
        self.client
            .delete_message()
            .queue_url(url.as_str())
            .receipt_handle(receipt.as_str())
            .send()
            .await
            .map_err(map_sdk_error(receipt.as_str()))?;
        Ok(())
    }

    #[instrument(skip(self), fields(queue_url = %url))]
    async fn get_queue_arn(&self, url: &QueueUrl) -> Result<Option<QueueArn>, QueueError> {
        let output = self
            .client
            .get_queue_attributes()
            .queue_url(url.as_str())
            .attribute_names(QueueAttributeName::QueueArn)
            .send()
            .await
            .map_err(map_sdk_error(subject_for(url)))?;

        Ok(output
            .attributes()
            .and_then(|attributes| attributes.get(&QueueAttributeName::QueueArn))
            .map(QueueArn::new))
    }

    fn provider_type(&self) -> ProviderType {
        ProviderType::AwsSqs
    }
}
