//! Provider types and configuration.

use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Enumeration of supported queue providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderType {
    AwsSqs,
    InMemory,
}

impl ProviderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AwsSqs => "AwsSqs",
            Self::InMemory => "InMemory",
        }
    }
}

impl std::fmt::Display for ProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// AWS SQS configuration.
///
/// Credentials always come from the AWS default provider chain; only region
/// and endpoint selection live here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwsSqsConfig {
    pub region: Option<String>,
    /// Endpoint override, e.g. `http://localhost:4566` for LocalStack
    pub endpoint_url: Option<String>,
}

/// Raw environment keys read by [`AwsSqsConfig::from_env`]
#[derive(Debug, Default, Deserialize)]
struct AwsEnvironment {
    aws_region: Option<String>,
    aws_default_region: Option<String>,
    sqs_endpoint: Option<String>,
}

impl AwsSqsConfig {
    /// Load configuration from environment variables
    ///
    /// Expected environment variables:
    /// - `AWS_REGION`: region, takes precedence
    /// - `AWS_DEFAULT_REGION`: region fallback
    /// - `SQS_ENDPOINT`: endpoint override
    ///
    /// All are optional; an unset region defers to the AWS SDK's own
    /// resolution (profile files, instance metadata).
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::load(config::Environment::default())
    }

    /// Load the same keys from an explicit variable map instead of the
    /// process environment
    pub fn from_source(variables: HashMap<String, String>) -> Result<Self, ConfigurationError> {
        Self::load(config::Environment::default().source(Some(variables)))
    }

    fn load(environment: config::Environment) -> Result<Self, ConfigurationError> {
        let env: AwsEnvironment = config::Config::builder()
            .add_source(environment)
            .build()?
            .try_deserialize()?;

        Ok(Self {
            region: non_empty(env.aws_region).or_else(|| non_empty(env.aws_default_region)),
            endpoint_url: non_empty(env.sqs_endpoint),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// In-memory provider configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InMemoryConfig {
    pub region: String,
    pub account_id: String,
    /// Base URL queue URLs are built from
    pub endpoint: String,
    /// Maximum queue URLs per listing page
    pub page_size: usize,
    /// Visibility timeout for queues created without one
    pub default_visibility_timeout_seconds: u32,
}

impl Default for InMemoryConfig {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            account_id: "000000000000".to_string(),
            endpoint: "http://localhost:4566".to_string(),
            page_size: 1000,
            default_visibility_timeout_seconds: 30,
        }
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
