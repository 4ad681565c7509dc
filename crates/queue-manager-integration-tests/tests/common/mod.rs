//! Common test utilities for queue-manager integration tests
//!
//! This module provides:
//! - Test logging setup
//! - Queue manager factories over the in-memory transport
//! - A recording transport that counts provider calls

use async_trait::async_trait;
use queue_manager::providers::InMemoryTransport;
use queue_manager::{
    InMemoryConfig, MessageId, ProviderType, QueueArn, QueueError, QueueListPage, QueueManager,
    QueueTransport, QueueUrl, RawMessage, ReceiptHandle,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Once};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

static TRACING: Once = Once::new();

/// Install a test-writer subscriber once per test binary.
///
/// Verbosity follows `RUST_LOG`, defaulting to debug output for the crate
/// under test.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "queue_manager=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().with_test_writer())
            .try_init();
    });
}

/// Manager over a fresh in-memory transport with the given listing page size
#[allow(dead_code)]
pub fn in_memory_manager(page_size: usize) -> (QueueManager, Arc<InMemoryTransport>) {
    init_tracing();
    let transport = Arc::new(InMemoryTransport::new(InMemoryConfig {
        page_size,
        ..Default::default()
    }));
    (QueueManager::new(transport.clone()), transport)
}

// ============================================================================
// Recording Transport
// ============================================================================

/// Transport wrapper that records every call before delegating
#[derive(Clone)]
#[allow(dead_code)]
pub struct RecordingTransport {
    inner: Arc<InMemoryTransport>,
    calls: Arc<Mutex<Vec<String>>>,
}

#[allow(dead_code)]
impl RecordingTransport {
    pub fn new(inner: Arc<InMemoryTransport>) -> Self {
        Self {
            inner,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn get_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.split(':').next() == Some(operation))
            .count()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl QueueTransport for RecordingTransport {
    async fn create_queue(
        &self,
        name: &str,
        attributes: HashMap<String, String>,
    ) -> Result<Option<QueueUrl>, QueueError> {
        self.record(format!("create_queue:{}", name));
        self.inner.create_queue(name, attributes).await
    }

    async fn get_queue_url(&self, name: &str) -> Result<QueueUrl, QueueError> {
        self.record(format!("get_queue_url:{}", name));
        self.inner.get_queue_url(name).await
    }

    async fn list_queues(
        &self,
        prefix: Option<&str>,
        next_token: Option<String>,
    ) -> Result<QueueListPage, QueueError> {
        self.record(format!(
            "list_queues:{}",
            next_token.as_deref().unwrap_or_default()
        ));
        self.inner.list_queues(prefix, next_token).await
    }

    async fn delete_queue(&self, url: &QueueUrl) -> Result<(), QueueError> {
        self.record(format!("delete_queue:{}", url));
        self.inner.delete_queue(url).await
    }

    async fn send_message(
        &self,
        url: &QueueUrl,
        body: &str,
        message_group_id: Option<&str>,
    ) -> Result<MessageId, QueueError> {
        self.record(format!("send_message:{}", url));
        self.inner.send_message(url, body, message_group_id).await
    }

    async fn receive_messages(
        &self,
        url: &QueueUrl,
        max_messages: u32,
        wait_time_seconds: u32,
    ) -> Result<Vec<RawMessage>, QueueError> {
        self.record(format!("receive_messages:{}", url));
        self.inner
            .receive_messages(url, max_messages, wait_time_seconds)
            .await
    }

    async fn delete_message(
        &self,
        url: &QueueUrl,
        receipt: &ReceiptHandle,
    ) -> Result<(), QueueError> {
        self.record(format!("delete_message:{}", url));
        self.inner.delete_message(url, receipt).await
    }

    async fn get_queue_arn(&self, url: &QueueUrl) -> Result<Option<QueueArn>, QueueError> {
        self.record(format!("get_queue_arn:{}", url));
        self.inner.get_queue_arn(url).await
    }

    fn provider_type(&self) -> ProviderType {
        self.inner.provider_type()
    }
}

/// Manager over a recording transport, plus handles to inspect both layers
#[allow(dead_code)]
pub fn recording_manager() -> (QueueManager, RecordingTransport, Arc<InMemoryTransport>) {
    init_tracing();
    let inner = Arc::new(InMemoryTransport::default());
    let recorder = RecordingTransport::new(inner.clone());
    (
        QueueManager::new(Arc::new(recorder.clone())),
        recorder,
        inner,
    )
}
