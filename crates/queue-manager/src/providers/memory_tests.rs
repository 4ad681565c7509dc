//! Tests for the in-memory queue transport.

use super::*;

fn attrs(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

async fn create(transport: &InMemoryTransport, name: &str) -> QueueUrl {
    transport
        .create_queue(name, HashMap::new())
        .await
        .expect("Setup: create should succeed")
        .expect("Setup: create should return a URL")
}

// ============================================================================
// Queue Lifecycle
// ============================================================================

mod queue_lifecycle {
    use super::*;

    #[tokio::test]
    async fn test_create_builds_sqs_shaped_url_and_arn() {
        let transport = InMemoryTransport::default();
        let url = create(&transport, "orders").await;

        assert_eq!(url.as_str(), "http://localhost:4566/000000000000/orders");
        assert_eq!(
            transport.get_queue_arn(&url).await.unwrap(),
            Some(QueueArn::new("arn:aws:sqs:us-east-1:000000000000:orders"))
        );
        assert_eq!(transport.provider_type(), ProviderType::InMemory);
    }

    #[tokio::test]
    async fn test_create_is_idempotent_for_identical_attributes() {
        let transport = InMemoryTransport::default();
        let attributes = attrs(&[("DelaySeconds", "5")]);

        let first = transport
            .create_queue("orders", attributes.clone())
            .await
            .unwrap();
        let second = transport.create_queue("orders", attributes).await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_create_with_different_attributes_conflicts() {
        let transport = InMemoryTransport::default();
        create(&transport, "orders").await;

        let result = transport
            .create_queue("orders", attrs(&[("DelaySeconds", "5")]))
            .await;

        assert!(matches!(
            result,
            Err(QueueError::QueueAlreadyExists { ref queue_name }) if queue_name == "orders"
        ));
    }

    #[tokio::test]
    async fn test_fifo_naming_rule_is_enforced() {
        let transport = InMemoryTransport::default();

        let missing_suffix = transport
            .create_queue("orders", attrs(&[("FifoQueue", "true")]))
            .await;
        assert!(matches!(
            missing_suffix,
            Err(QueueError::ProviderError { ref code, .. }) if code == "InvalidParameterValue"
        ));

        let missing_attribute = transport.create_queue("orders.fifo", HashMap::new()).await;
        assert!(missing_attribute.is_err());

        let valid = transport
            .create_queue("orders.fifo", attrs(&[("FifoQueue", "true")]))
            .await;
        assert!(valid.is_ok());
    }

    #[tokio::test]
    async fn test_invalid_names_are_rejected() {
        let transport = InMemoryTransport::default();

        let too_long = "a".repeat(81);
        for name in ["", "has space", "dots.in.name", too_long.as_str()] {
            let result = transport.create_queue(name, HashMap::new()).await;
            assert!(result.is_err(), "Name '{}' should be rejected", name);
        }
    }

    #[tokio::test]
    async fn test_out_of_range_attributes_are_rejected() {
        let transport = InMemoryTransport::default();

        for (name, value) in [
            ("VisibilityTimeout", "43201"),
            ("DelaySeconds", "901"),
            ("MessageRetentionPeriod", "59"),
            ("ReceiveMessageWaitTimeSeconds", "21"),
            ("DelaySeconds", "soon"),
        ] {
            let result = transport.create_queue("orders", attrs(&[(name, value)])).await;
            assert!(
                matches!(result, Err(QueueError::ProviderError { .. })),
                "{}={} should be rejected",
                name,
                value
            );
        }
    }

    #[tokio::test]
    async fn test_redrive_target_must_exist() {
        let transport = InMemoryTransport::default();
        let policy = r#"{"deadLetterTargetArn":"arn:aws:sqs:us-east-1:000000000000:nope","maxReceiveCount":1}"#;

        let result = transport
            .create_queue("orders", attrs(&[("RedrivePolicy", policy)]))
            .await;

        assert!(matches!(result, Err(QueueError::ProviderError { .. })));
    }

    #[tokio::test]
    async fn test_get_queue_url_and_delete() {
        let transport = InMemoryTransport::default();
        let url = create(&transport, "orders").await;

        assert_eq!(transport.get_queue_url("orders").await.unwrap(), url);

        transport.delete_queue(&url).await.unwrap();

        assert!(matches!(
            transport.get_queue_url("orders").await,
            Err(QueueError::QueueNotFound { .. })
        ));
        assert!(matches!(
            transport.delete_queue(&url).await,
            Err(QueueError::QueueNotFound { ref queue_name }) if queue_name == "orders"
        ));
    }

    #[tokio::test]
    async fn test_queue_attributes_are_recorded() {
        let transport = InMemoryTransport::default();
        let url = transport
            .create_queue("orders", attrs(&[("VisibilityTimeout", "60")]))
            .await
            .unwrap()
            .unwrap();

        let stored = transport.queue_attributes(&url).unwrap();
        assert_eq!(stored.get("VisibilityTimeout").map(String::as_str), Some("60"));
    }
}

// ============================================================================
// Listing
// ============================================================================

mod listing {
    use super::*;

    #[tokio::test]
    async fn test_listing_pages_follow_creation_order() {
        let transport = InMemoryTransport::new(InMemoryConfig {
            page_size: 2,
            ..Default::default()
        });
        for i in 0..5 {
            create(&transport, &format!("queue-{}", i)).await;
        }

        let first = transport.list_queues(None, None).await.unwrap();
        assert_eq!(first.queue_urls.len(), 2);
        assert_eq!(first.next_token.as_deref(), Some("2"));

        let second = transport.list_queues(None, first.next_token).await.unwrap();
        let third = transport.list_queues(None, second.next_token).await.unwrap();
        assert_eq!(third.queue_urls.len(), 1);
        assert_eq!(third.next_token, None);
        assert_eq!(third.queue_urls[0].queue_name(), Some("queue-4"));
    }

    #[tokio::test]
    async fn test_listing_filters_by_prefix() {
        let transport = InMemoryTransport::default();
        create(&transport, "orders").await;
        create(&transport, "orders-dlq").await;
        create(&transport, "payments").await;

        let page = transport.list_queues(Some("orders"), None).await.unwrap();
        let names: Vec<_> = page
            .queue_urls
            .iter()
            .filter_map(|u| u.queue_name())
            .collect();

        assert_eq!(names, vec!["orders", "orders-dlq"]);
        assert_eq!(page.next_token, None);
    }

    #[tokio::test]
    async fn test_invalid_token_is_rejected() {
        let transport = InMemoryTransport::default();
        let result = transport
            .list_queues(None, Some("not-a-token".to_string()))
            .await;
        assert!(result.is_err());
    }
}

// ============================================================================
// Messaging
// ============================================================================

mod messaging {
    use super::*;

    #[tokio::test]
    async fn test_send_receive_delete() {
        let transport = InMemoryTransport::default();
        let url = create(&transport, "orders").await;

        let id = transport.send_message(&url, r#"{"id":1}"#, None).await.unwrap();
        let received = transport.receive_messages(&url, 1, 0).await.unwrap();

        assert_eq!(received.len(), 1);
        assert_eq!(received[0].message_id, id);
        assert_eq!(received[0].body, r#"{"id":1}"#);

        transport
            .delete_message(&url, &received[0].receipt_handle)
            .await
            .unwrap();
        assert_eq!(transport.message_count(&url), Some(0));
    }

    #[tokio::test]
    async fn test_deleting_twice_fails() {
        let transport = InMemoryTransport::default();
        let url = create(&transport, "orders").await;
        transport.send_message(&url, "1", None).await.unwrap();

        let received = transport.receive_messages(&url, 1, 0).await.unwrap();
        let receipt = &received[0].receipt_handle;

        transport.delete_message(&url, receipt).await.unwrap();
        assert!(matches!(
            transport.delete_message(&url, receipt).await,
            Err(QueueError::MessageNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_receive_respects_batch_limits() {
        let transport = InMemoryTransport::default();
        let url = create(&transport, "orders").await;
        for i in 0..3 {
            transport.send_message(&url, &i.to_string(), None).await.unwrap();
        }

        let batch = transport.receive_messages(&url, 2, 0).await.unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].body, "0");
        assert_eq!(batch[1].body, "1");

        assert!(transport.receive_messages(&url, 0, 0).await.is_err());
        assert!(transport.receive_messages(&url, 11, 0).await.is_err());
    }

    #[tokio::test]
    async fn test_wait_time_above_twenty_seconds_is_rejected() {
        let transport = InMemoryTransport::default();
        let url = create(&transport, "orders").await;

        let result = transport.receive_messages(&url, 1, 21).await;

        assert!(matches!(
            result,
            Err(QueueError::ProviderError { ref code, .. }) if code == "InvalidParameterValue"
        ));
    }

    #[tokio::test]
    async fn test_fifo_send_requires_message_group() {
        let transport = InMemoryTransport::default();
        let url = transport
            .create_queue("orders.fifo", attrs(&[("FifoQueue", "true")]))
            .await
            .unwrap()
            .unwrap();

        let without_group = transport.send_message(&url, "1", None).await;
        assert!(matches!(
            without_group,
            Err(QueueError::ProviderError { ref code, .. }) if code == "InvalidParameterValue"
        ));
        assert_eq!(transport.message_count(&url), Some(0));

        let id = transport
            .send_message(&url, "1", Some("customer-7"))
            .await
            .unwrap();
        let received = transport.receive_messages(&url, 1, 0).await.unwrap();
        assert_eq!(received[0].message_id, id);
    }

    #[tokio::test]
    async fn test_standard_queue_ignores_message_group() {
        let transport = InMemoryTransport::default();
        let url = create(&transport, "orders").await;

        transport
            .send_message(&url, "1", Some("customer-7"))
            .await
            .unwrap();

        assert_eq!(transport.message_count(&url), Some(1));
    }

    #[tokio::test]
    async fn test_receive_on_missing_queue_fails() {
        let transport = InMemoryTransport::default();
        let url = QueueUrl::new("http://localhost:4566/000000000000/missing");

        assert!(matches!(
            transport.receive_messages(&url, 1, 0).await,
            Err(QueueError::QueueNotFound { .. })
        ));
        assert!(matches!(
            transport.send_message(&url, "x", None).await,
            Err(QueueError::QueueNotFound { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_visibility_timeout_hides_then_redelivers() {
        let transport = InMemoryTransport::default();
        let url = transport
            .create_queue("orders", attrs(&[("VisibilityTimeout", "10")]))
            .await
            .unwrap()
            .unwrap();
        transport.send_message(&url, "1", None).await.unwrap();

        let first = transport.receive_messages(&url, 1, 0).await.unwrap();
        assert_eq!(first.len(), 1);
        assert!(transport.receive_messages(&url, 1, 0).await.unwrap().is_empty());

        tokio::time::advance(Duration::from_secs(11)).await;

        let second = transport.receive_messages(&url, 1, 0).await.unwrap();
        assert_eq!(second.len(), 1);
        assert_ne!(second[0].receipt_handle, first[0].receipt_handle);

        // The stale receipt no longer deletes the message
        assert!(transport
            .delete_message(&url, &first[0].receipt_handle)
            .await
            .is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_seconds_postpones_delivery() {
        let transport = InMemoryTransport::default();
        let url = transport
            .create_queue("orders", attrs(&[("DelaySeconds", "5")]))
            .await
            .unwrap()
            .unwrap();
        transport.send_message(&url, "1", None).await.unwrap();

        assert!(transport.receive_messages(&url, 1, 0).await.unwrap().is_empty());

        // Long poll covers the delay
        let received = transport.receive_messages(&url, 1, 10).await.unwrap();
        assert_eq!(received.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_long_poll_returns_empty_after_wait() {
        let transport = InMemoryTransport::default();
        let url = create(&transport, "orders").await;

        let started = Instant::now();
        let received = transport.receive_messages(&url, 1, 3).await.unwrap();

        assert!(received.is_empty());
        assert!(started.elapsed() >= Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_long_poll_wakes_on_send() {
        let transport = Arc::new(InMemoryTransport::default());
        let url = create(&transport, "orders").await;

        let receiver = {
            let transport = Arc::clone(&transport);
            let url = url.clone();
            tokio::spawn(async move { transport.receive_messages(&url, 1, 20).await })
        };

        tokio::time::sleep(Duration::from_secs(1)).await;
        transport.send_message(&url, "late", None).await.unwrap();

        let received = receiver.await.unwrap().unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].body, "late");
    }
}

// ============================================================================
// Dead Letter Redrive
// ============================================================================

mod redrive {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_message_moves_to_dead_letter_queue_after_max_receives() {
        let transport = InMemoryTransport::default();
        let dlq = create(&transport, "orders-dlq").await;
        let policy = r#"{"deadLetterTargetArn":"arn:aws:sqs:us-east-1:000000000000:orders-dlq","maxReceiveCount":2}"#;
        let url = transport
            .create_queue(
                "orders",
                attrs(&[("RedrivePolicy", policy), ("VisibilityTimeout", "1")]),
            )
            .await
            .unwrap()
            .unwrap();

        let sent = transport.send_message(&url, "poison", None).await.unwrap();

        for _ in 0..2 {
            let received = transport.receive_messages(&url, 1, 0).await.unwrap();
            assert_eq!(received.len(), 1);
            tokio::time::advance(Duration::from_secs(2)).await;
        }

        // Third attempt exceeds maxReceiveCount
        assert!(transport.receive_messages(&url, 1, 0).await.unwrap().is_empty());
        assert_eq!(transport.message_count(&url), Some(0));

        let dead = transport.receive_messages(&dlq, 1, 0).await.unwrap();
        assert_eq!(dead.len(), 1);
        assert_eq!(dead[0].message_id, sent);
        assert_eq!(dead[0].body, "poison");
    }
}
