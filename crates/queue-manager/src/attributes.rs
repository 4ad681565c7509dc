//! Strongly-typed queue attributes.
//!
//! Queue creation attributes are carried as [`QueueAttribute`] values and
//! only converted to the provider's string map by [`QueueAttributes::to_wire`].

use crate::error::SerializationError;
use crate::message::QueueArn;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Names of the queue attributes this crate sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum QueueAttributeName {
    VisibilityTimeout,
    FifoQueue,
    DelaySeconds,
    RedrivePolicy,
    SqsManagedSseEnabled,
    MessageRetentionPeriod,
    ReceiveMessageWaitTimeSeconds,
}

impl QueueAttributeName {
    /// Provider wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VisibilityTimeout => "VisibilityTimeout",
            Self::FifoQueue => "FifoQueue",
            Self::DelaySeconds => "DelaySeconds",
            Self::RedrivePolicy => "RedrivePolicy",
            Self::SqsManagedSseEnabled => "SqsManagedSseEnabled",
            Self::MessageRetentionPeriod => "MessageRetentionPeriod",
            Self::ReceiveMessageWaitTimeSeconds => "ReceiveMessageWaitTimeSeconds",
        }
    }
}

impl fmt::Display for QueueAttributeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dead-letter redirection for messages received too many times
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedrivePolicy {
    pub dead_letter_target_arn: String,
    pub max_receive_count: u32,
}

impl RedrivePolicy {
    pub fn new(target: &QueueArn, max_receive_count: u32) -> Self {
        Self {
            dead_letter_target_arn: target.as_str().to_string(),
            max_receive_count,
        }
    }
}

/// A single queue attribute with its typed value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueAttribute {
    VisibilityTimeout(u32),
    FifoQueue,
    DelaySeconds(u32),
    RedrivePolicy(RedrivePolicy),
    SqsManagedSseEnabled,
    MessageRetentionPeriod(u32),
    ReceiveMessageWaitTimeSeconds(u32),
}

impl QueueAttribute {
    pub fn name(&self) -> QueueAttributeName {
        match self {
            Self::VisibilityTimeout(_) => QueueAttributeName::VisibilityTimeout,
            Self::FifoQueue => QueueAttributeName::FifoQueue,
            Self::DelaySeconds(_) => QueueAttributeName::DelaySeconds,
            Self::RedrivePolicy(_) => QueueAttributeName::RedrivePolicy,
            Self::SqsManagedSseEnabled => QueueAttributeName::SqsManagedSseEnabled,
            Self::MessageRetentionPeriod(_) => QueueAttributeName::MessageRetentionPeriod,
            Self::ReceiveMessageWaitTimeSeconds(_) => {
                QueueAttributeName::ReceiveMessageWaitTimeSeconds
            }
        }
    }

    /// Encode the value the way the provider expects it on the wire
    pub fn wire_value(&self) -> Result<String, SerializationError> {
        match self {
            Self::VisibilityTimeout(seconds)
            | Self::DelaySeconds(seconds)
            | Self::MessageRetentionPeriod(seconds)
            | Self::ReceiveMessageWaitTimeSeconds(seconds) => Ok(seconds.to_string()),
            Self::FifoQueue | Self::SqsManagedSseEnabled => Ok("true".to_string()),
            Self::RedrivePolicy(policy) => {
                serde_json::to_string(policy).map_err(SerializationError::RedrivePolicy)
            }
        }
    }
}

/// Resolved attribute set for a queue creation call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueAttributes {
    entries: BTreeMap<QueueAttributeName, QueueAttribute>,
}

impl QueueAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute, replacing any previous value of the same name
    pub fn set(&mut self, attribute: QueueAttribute) {
        self.entries.insert(attribute.name(), attribute);
    }

    pub fn get(&self, name: QueueAttributeName) -> Option<&QueueAttribute> {
        self.entries.get(&name)
    }

    pub fn contains(&self, name: QueueAttributeName) -> bool {
        self.entries.contains_key(&name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = QueueAttributeName> + '_ {
        self.entries.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueueAttribute> {
        self.entries.values()
    }

    /// Convert to the provider's `name -> string` attribute map
    pub fn to_wire(&self) -> Result<HashMap<String, String>, SerializationError> {
        self.entries
            .values()
            .map(|attribute| Ok((attribute.name().as_str().to_string(), attribute.wire_value()?)))
            .collect()
    }
}

#[cfg(test)]
#[path = "attributes_tests.rs"]
mod tests;
