//! Caller-supplied queue creation options.

use serde::{Deserialize, Serialize};

/// Default `maxReceiveCount` for a redrive policy when none is given
pub const DEFAULT_MAX_RECEIVE_COUNT: u32 = 1;

/// Configuration intent for a new queue.
///
/// Every field is optional. A present field is forwarded as its queue
/// attribute; an absent field leaves the provider's default in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueueOptions {
    pub fifo: Option<bool>,
    pub visibility_timeout_seconds: Option<u32>,
    pub delay_seconds: Option<u32>,
    /// Name of an existing queue that receives undeliverable messages
    pub dead_letter_queue: Option<String>,
    pub max_receive_count: Option<u32>,
    pub encrypted: Option<bool>,
    pub message_retention_seconds: Option<u32>,
    pub receive_message_wait_time_seconds: Option<u32>,
}

impl QueueOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fifo(mut self, fifo: bool) -> Self {
        self.fifo = Some(fifo);
        self
    }

    pub fn with_visibility_timeout_seconds(mut self, seconds: u32) -> Self {
        self.visibility_timeout_seconds = Some(seconds);
        self
    }

    pub fn with_delay_seconds(mut self, seconds: u32) -> Self {
        self.delay_seconds = Some(seconds);
        self
    }

    /// Redirect messages to `queue_name` after too many receives
    pub fn with_dead_letter_queue(mut self, queue_name: impl Into<String>) -> Self {
        self.dead_letter_queue = Some(queue_name.into());
        self
    }

    pub fn with_max_receive_count(mut self, count: u32) -> Self {
        self.max_receive_count = Some(count);
        self
    }

    pub fn with_encryption(mut self, encrypted: bool) -> Self {
        self.encrypted = Some(encrypted);
        self
    }

    pub fn with_message_retention_seconds(mut self, seconds: u32) -> Self {
        self.message_retention_seconds = Some(seconds);
        self
    }

    pub fn with_receive_message_wait_time_seconds(mut self, seconds: u32) -> Self {
        self.receive_message_wait_time_seconds = Some(seconds);
        self
    }

    /// Receive count used in the redrive policy.
    ///
    /// A missing or zero count falls back to [`DEFAULT_MAX_RECEIVE_COUNT`].
    pub fn effective_max_receive_count(&self) -> u32 {
        match self.max_receive_count {
            Some(count) if count > 0 => count,
            _ => DEFAULT_MAX_RECEIVE_COUNT,
        }
    }
}

#[cfg(test)]
#[path = "options_tests.rs"]
mod tests;
