//! In-memory queue transport for testing and development.
//!
//! This module provides a fully functional in-process stand-in for SQS that:
//! - Builds SQS-shaped queue URLs and ARNs
//! - Enforces the FIFO naming rule and basic attribute limits at creation
//! - Requires a message group id for sends to FIFO queues
//! - Pages queue listings with continuation tokens
//! - Implements delivery delay, visibility timeouts and long polling
//! - Moves messages to the dead letter queue named in `RedrivePolicy`
//!
//! Time is measured with `tokio::time`, so tests can pause and advance it.

use crate::attributes::{QueueAttributeName, RedrivePolicy};
use crate::error::QueueError;
use crate::message::{MessageId, QueueArn, QueueUrl, RawMessage, ReceiptHandle};
use crate::provider::{InMemoryConfig, ProviderType};
use crate::resolver::FIFO_SUFFIX;
use crate::transport::{QueueListPage, QueueTransport};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;
use tokio::time::{Duration, Instant};

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;

const MAX_QUEUE_NAME_LENGTH: usize = 80;
const MAX_RECEIVE_BATCH: u32 = 10;
const MAX_WAIT_TIME_SECONDS: u32 = 20;

// ============================================================================
// Internal Storage Structures
// ============================================================================

/// All queues, in creation order
#[derive(Default)]
struct ServiceState {
    queues: Vec<StoredQueue>,
}

impl ServiceState {
    fn queue(&self, url: &QueueUrl) -> Option<&StoredQueue> {
        self.queues.iter().find(|q| &q.url == url)
    }

    fn queue_mut(&mut self, url: &QueueUrl) -> Option<&mut StoredQueue> {
        self.queues.iter_mut().find(|q| &q.url == url)
    }

    fn position_by_arn(&self, arn: &str) -> Option<usize> {
        self.queues.iter().position(|q| q.arn.as_str() == arn)
    }
}

struct StoredQueue {
    name: String,
    url: QueueUrl,
    arn: QueueArn,
    attributes: HashMap<String, String>,
    visibility_timeout: Duration,
    delay: Duration,
    redrive: Option<RedrivePolicy>,
    messages: Vec<StoredMessage>,
}

struct StoredMessage {
    message_id: MessageId,
    body: String,
    available_at: Instant,
    receive_count: u32,
    receipt: Option<String>,
}

impl StoredMessage {
    fn new(body: String, available_at: Instant) -> Self {
        Self {
            message_id: MessageId::new(),
            body,
            available_at,
            receive_count: 0,
            receipt: None,
        }
    }
}

// ============================================================================
// InMemoryTransport
// ============================================================================

/// In-memory queue transport
pub struct InMemoryTransport {
    state: Arc<Mutex<ServiceState>>,
    arrivals: Arc<Notify>,
    config: InMemoryConfig,
}

impl InMemoryTransport {
    /// Create new in-memory transport with configuration
    pub fn new(config: InMemoryConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(ServiceState::default())),
            arrivals: Arc::new(Notify::new()),
            config,
        }
    }

    /// Attributes a queue was created with, keyed by provider name
    pub fn queue_attributes(&self, url: &QueueUrl) -> Option<HashMap<String, String>> {
        self.lock().queue(url).map(|q| q.attributes.clone())
    }

    /// Number of messages held by a queue, visible or not
    pub fn message_count(&self, url: &QueueUrl) -> Option<usize> {
        self.lock().queue(url).map(|q| q.messages.len())
    }

    fn lock(&self) -> MutexGuard<'_, ServiceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn queue_url_for(&self, name: &str) -> QueueUrl {
        QueueUrl::new(format!(
            "{}/{}/{}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.account_id,
            name
        ))
    }

    fn queue_arn_for(&self, name: &str) -> QueueArn {
        QueueArn::new(format!(
            "arn:aws:sqs:{}:{}:{}",
            self.config.region, self.config.account_id, name
        ))
    }

    /// Take up to `max` visible messages, redriving those over their receive
    /// limit. Also returns when the next hidden message becomes visible.
    fn take_visible(
        &self,
        url: &QueueUrl,
        max: usize,
    ) -> Result<(Vec<RawMessage>, Option<Instant>), QueueError> {
        let mut state = self.lock();
        let now = Instant::now();

        let source = state
            .queues
            .iter()
            .position(|q| &q.url == url)
            .ok_or_else(|| queue_not_found(url))?;
        let redrive_target = state.queues[source]
            .redrive
            .as_ref()
            .and_then(|policy| {
                state
                    .position_by_arn(&policy.dead_letter_target_arn)
                    .map(|target| (target, policy.max_receive_count))
            });

        let mut delivered = Vec::new();
        let mut redriven = Vec::new();
        let mut index = 0;
        let queue = &mut state.queues[source];

        while index < queue.messages.len() && delivered.len() < max {
            let message = &mut queue.messages[index];
            if message.available_at > now {
                index += 1;
                continue;
            }

            if let Some((_, max_receive_count)) = redrive_target {
                if message.receive_count >= max_receive_count {
                    redriven.push(queue.messages.remove(index));
                    continue;
                }
            }

            let receipt = uuid::Uuid::new_v4().to_string();
            message.receive_count += 1;
            message.receipt = Some(receipt.clone());
            message.available_at = now + queue.visibility_timeout;
            delivered.push(RawMessage {
                message_id: message.message_id.clone(),
                body: message.body.clone(),
                receipt_handle: ReceiptHandle::new(receipt),
            });
            index += 1;
        }

        let next_visible = queue
            .messages
            .iter()
            .map(|m| m.available_at)
            .filter(|at| *at > now)
            .min();

        if let Some((target, _)) = redrive_target {
            for message in redriven {
                let mut moved = StoredMessage::new(message.body, now);
                moved.message_id = message.message_id;
                state.queues[target].messages.push(moved);
            }
        }

        Ok((delivered, next_visible))
    }
}

impl Default for InMemoryTransport {
    fn default() -> Self {
        Self::new(InMemoryConfig::default())
    }
}

fn queue_not_found(url: &QueueUrl) -> QueueError {
    QueueError::QueueNotFound {
        queue_name: url
            .queue_name()
            .map(str::to_string)
            .unwrap_or_else(|| url.to_string()),
    }
}

fn invalid_parameter(message: String) -> QueueError {
    QueueError::ProviderError {
        provider: ProviderType::InMemory.to_string(),
        code: "InvalidParameterValue".to_string(),
        message,
    }
}

fn validate_queue_name(name: &str, fifo: bool) -> Result<(), QueueError> {
    let base = name.strip_suffix(FIFO_SUFFIX).unwrap_or(name);

    if name.is_empty() || name.len() > MAX_QUEUE_NAME_LENGTH {
        return Err(invalid_parameter(format!(
            "Queue name must be 1-{} characters: '{}'",
            MAX_QUEUE_NAME_LENGTH, name
        )));
    }
    if base.is_empty()
        || !base
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(invalid_parameter(format!(
            "Queue name may only contain alphanumerics, hyphens and underscores: '{}'",
            name
        )));
    }
    if fifo != name.ends_with(FIFO_SUFFIX) {
        return Err(invalid_parameter(format!(
            "FIFO queue names must end with '{}' and only FIFO queues may: '{}'",
            FIFO_SUFFIX, name
        )));
    }
    Ok(())
}

fn parse_seconds(
    attributes: &HashMap<String, String>,
    name: QueueAttributeName,
    range: std::ops::RangeInclusive<u32>,
) -> Result<Option<u32>, QueueError> {
    let Some(raw) = attributes.get(name.as_str()) else {
        return Ok(None);
    };
    match raw.parse::<u32>() {
        Ok(value) if range.contains(&value) => Ok(Some(value)),
        _ => Err(invalid_parameter(format!(
            "Invalid value for {}: '{}' (expected {}-{})",
            name,
            raw,
            range.start(),
            range.end()
        ))),
    }
}

#[async_trait]
impl QueueTransport for InMemoryTransport {
    async fn create_queue(
        &self,
        name: &str,
        attributes: HashMap<String, String>,
    ) -> Result<Option<QueueUrl>, QueueError> {
        let fifo = attributes
            .get(QueueAttributeName::FifoQueue.as_str())
            .is_some_and(|v| v == "true");
        validate_queue_name(name, fifo)?;

        let visibility_timeout = parse_seconds(
            &attributes,
            QueueAttributeName::VisibilityTimeout,
            0..=43_200,
        )?
        .unwrap_or(self.config.default_visibility_timeout_seconds);
        let delay =
            parse_seconds(&attributes, QueueAttributeName::DelaySeconds, 0..=900)?.unwrap_or(0);
        parse_seconds(
            &attributes,
            QueueAttributeName::MessageRetentionPeriod,
            60..=1_209_600,
        )?;
        parse_seconds(
            &attributes,
            QueueAttributeName::ReceiveMessageWaitTimeSeconds,
            0..=20,
        )?;
        let redrive = match attributes.get(QueueAttributeName::RedrivePolicy.as_str()) {
            Some(raw) => Some(serde_json::from_str::<RedrivePolicy>(raw).map_err(|e| {
                invalid_parameter(format!("Invalid value for RedrivePolicy: {}", e))
            })?),
            None => None,
        };

        let mut state = self.lock();

        if let Some(existing) = state.queues.iter().find(|q| q.name == name) {
            return if existing.attributes == attributes {
                Ok(Some(existing.url.clone()))
            } else {
                Err(QueueError::QueueAlreadyExists {
                    queue_name: name.to_string(),
                })
            };
        }

        if let Some(policy) = &redrive {
            if state
                .position_by_arn(&policy.dead_letter_target_arn)
                .is_none()
            {
                return Err(invalid_parameter(format!(
                    "Dead letter target does not exist: {}",
                    policy.dead_letter_target_arn
                )));
            }
        }

        let url = self.queue_url_for(name);
        state.queues.push(StoredQueue {
            name: name.to_string(),
            url: url.clone(),
            arn: self.queue_arn_for(name),
            attributes,
            visibility_timeout: Duration::from_secs(u64::from(visibility_timeout)),
            delay: Duration::from_secs(u64::from(delay)),
            redrive,
            messages: Vec::new(),
        });

        Ok(Some(url))
    }

    async fn get_queue_url(&self, name: &str) -> Result<QueueUrl, QueueError> {
        self.lock()
            .queues
            .iter()
            .find(|q| q.name == name)
            .map(|q| q.url.clone())
            .ok_or_else(|| QueueError::QueueNotFound {
                queue_name: name.to_string(),
            })
    }

    async fn list_queues(
        &self,
        prefix: Option<&str>,
        next_token: Option<String>,
    ) -> Result<QueueListPage, QueueError> {
        let offset = match next_token {
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| invalid_parameter(format!("Invalid NextToken: '{}'", token)))?,
            None => 0,
        };
        let page_size = self.config.page_size.max(1);

        let state = self.lock();
        let matching: Vec<&StoredQueue> = state
            .queues
            .iter()
            .filter(|q| prefix.map_or(true, |p| q.name.starts_with(p)))
            .collect();

        let end = (offset + page_size).min(matching.len());
        let queue_urls = matching
            .get(offset..end)
            .unwrap_or_default()
            .iter()
            .map(|q| q.url.clone())
            .collect();
        let next_token = (end < matching.len()).then(|| end.to_string());

        Ok(QueueListPage {
            queue_urls,
            next_token,
        })
    }

    async fn delete_queue(&self, url: &QueueUrl) -> Result<(), QueueError> {
        let mut state = self.lock();
        let index = state
            .queues
            .iter()
            .position(|q| &q.url == url)
            .ok_or_else(|| queue_not_found(url))?;
        state.queues.remove(index);
        Ok(())
    }

    async fn send_message(
        &self,
        url: &QueueUrl,
        body: &str,
        message_group_id: Option<&str>,
    ) -> Result<MessageId, QueueError> {
        let message_id = {
            let mut state = self.lock();
            let queue = state.queue_mut(url).ok_or_else(|| queue_not_found(url))?;
            if queue.name.ends_with(FIFO_SUFFIX) && message_group_id.is_none() {
                return Err(invalid_parameter(format!(
                    "MessageGroupId is required for FIFO queue '{}'",
                    queue.name
                )));
            }
            let message = StoredMessage::new(body.to_string(), Instant::now() + queue.delay);
            let message_id = message.message_id.clone();
            queue.messages.push(message);
            message_id
        };

        self.arrivals.notify_waiters();
        Ok(message_id)
    }

    async fn receive_messages(
        &self,
        url: &QueueUrl,
        max_messages: u32,
        wait_time_seconds: u32,
    ) -> Result<Vec<RawMessage>, QueueError> {
        if !(1..=MAX_RECEIVE_BATCH).contains(&max_messages) {
            return Err(invalid_parameter(format!(
                "MaxNumberOfMessages must be 1-{}: {}",
                MAX_RECEIVE_BATCH, max_messages
            )));
        }
        if wait_time_seconds > MAX_WAIT_TIME_SECONDS {
            return Err(invalid_parameter(format!(
                "WaitTimeSeconds must be 0-{}: {}",
                MAX_WAIT_TIME_SECONDS, wait_time_seconds
            )));
        }

        let deadline = Instant::now() + Duration::from_secs(u64::from(wait_time_seconds));

        loop {
            // Register interest before checking so a send between the check
            // and the wait is not missed.
            let arrival = self.arrivals.notified();
            tokio::pin!(arrival);
            arrival.as_mut().enable();

            let (messages, next_visible) = self.take_visible(url, max_messages as usize)?;
            if !messages.is_empty() {
                return Ok(messages);
            }

            if Instant::now() >= deadline {
                return Ok(Vec::new());
            }

            let wake_at = next_visible.map_or(deadline, |at| at.min(deadline));
            let _ = tokio::time::timeout_at(wake_at, arrival).await;
        }
    }

    async fn delete_message(
        &self,
        url: &QueueUrl,
        receipt: &ReceiptHandle,
    ) -> Result<(), QueueError> {
        let mut state = self.lock();
        let queue = state.queue_mut(url).ok_or_else(|| queue_not_found(url))?;
        let index = queue
            .messages
            .iter()
            .position(|m| m.receipt.as_deref() == Some(receipt.as_str()))
            .ok_or_else(|| QueueError::MessageNotFound {
                receipt: receipt.as_str().to_string(),
            })?;
        queue.messages.remove(index);
        Ok(())
    }

    async fn get_queue_arn(&self, url: &QueueUrl) -> Result<Option<QueueArn>, QueueError> {
        self.lock()
            .queue(url)
            .map(|q| Some(q.arn.clone()))
            .ok_or_else(|| queue_not_found(url))
    }

    fn provider_type(&self) -> ProviderType {
        ProviderType::InMemory
    }
}
