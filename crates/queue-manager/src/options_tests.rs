//! Tests for queue options.

use super::*;

#[test]
fn test_default_options_are_empty() {
    let options = QueueOptions::default();
    assert_eq!(options, QueueOptions::new());
    assert_eq!(options.fifo, None);
    assert_eq!(options.dead_letter_queue, None);
}

#[test]
fn test_builder_sets_fields() {
    let options = QueueOptions::new()
        .with_fifo(true)
        .with_visibility_timeout_seconds(30)
        .with_delay_seconds(5)
        .with_dead_letter_queue("orders-dlq")
        .with_max_receive_count(4)
        .with_encryption(true)
        .with_message_retention_seconds(86_400)
        .with_receive_message_wait_time_seconds(20);

    assert_eq!(options.fifo, Some(true));
    assert_eq!(options.visibility_timeout_seconds, Some(30));
    assert_eq!(options.delay_seconds, Some(5));
    assert_eq!(options.dead_letter_queue.as_deref(), Some("orders-dlq"));
    assert_eq!(options.max_receive_count, Some(4));
    assert_eq!(options.encrypted, Some(true));
    assert_eq!(options.message_retention_seconds, Some(86_400));
    assert_eq!(options.receive_message_wait_time_seconds, Some(20));
}

#[test]
fn test_effective_max_receive_count() {
    assert_eq!(QueueOptions::new().effective_max_receive_count(), 1);
    assert_eq!(
        QueueOptions::new()
            .with_max_receive_count(0)
            .effective_max_receive_count(),
        1
    );
    assert_eq!(
        QueueOptions::new()
            .with_max_receive_count(7)
            .effective_max_receive_count(),
        7
    );
}

#[test]
fn test_deserialize_from_camel_case_json() {
    let options: QueueOptions = serde_json::from_str(
        r#"{"fifo": true, "deadLetterQueue": "dlq", "receiveMessageWaitTimeSeconds": 10}"#,
    )
    .unwrap();

    assert_eq!(options.fifo, Some(true));
    assert_eq!(options.dead_letter_queue.as_deref(), Some("dlq"));
    assert_eq!(options.receive_message_wait_time_seconds, Some(10));
    assert_eq!(options.delay_seconds, None);
}
