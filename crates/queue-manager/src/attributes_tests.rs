//! Tests for typed queue attributes.

use super::*;

mod wire_encoding {
    use super::*;

    #[test]
    fn test_numeric_attributes_encode_as_decimal_strings() {
        assert_eq!(
            QueueAttribute::VisibilityTimeout(45).wire_value().unwrap(),
            "45"
        );
        assert_eq!(QueueAttribute::DelaySeconds(0).wire_value().unwrap(), "0");
        assert_eq!(
            QueueAttribute::MessageRetentionPeriod(1_209_600)
                .wire_value()
                .unwrap(),
            "1209600"
        );
        assert_eq!(
            QueueAttribute::ReceiveMessageWaitTimeSeconds(20)
                .wire_value()
                .unwrap(),
            "20"
        );
    }

    #[test]
    fn test_flag_attributes_encode_as_true() {
        assert_eq!(QueueAttribute::FifoQueue.wire_value().unwrap(), "true");
        assert_eq!(
            QueueAttribute::SqsManagedSseEnabled.wire_value().unwrap(),
            "true"
        );
    }

    #[test]
    fn test_redrive_policy_uses_camel_case_keys() {
        let policy = RedrivePolicy::new(&QueueArn::new("arn:aws:sqs:us-east-1:1:dlq"), 3);
        let encoded = QueueAttribute::RedrivePolicy(policy).wire_value().unwrap();

        let value: serde_json::Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(value["deadLetterTargetArn"], "arn:aws:sqs:us-east-1:1:dlq");
        assert_eq!(value["maxReceiveCount"], 3);
    }
}

mod attribute_set {
    use super::*;

    #[test]
    fn test_set_replaces_same_name() {
        let mut attributes = QueueAttributes::new();
        attributes.set(QueueAttribute::DelaySeconds(5));
        attributes.set(QueueAttribute::DelaySeconds(10));

        assert_eq!(attributes.len(), 1);
        assert_eq!(
            attributes.get(QueueAttributeName::DelaySeconds),
            Some(&QueueAttribute::DelaySeconds(10))
        );
    }

    #[test]
    fn test_to_wire_uses_provider_names() {
        let mut attributes = QueueAttributes::new();
        attributes.set(QueueAttribute::FifoQueue);
        attributes.set(QueueAttribute::VisibilityTimeout(60));

        let wire = attributes.to_wire().unwrap();
        assert_eq!(wire.len(), 2);
        assert_eq!(wire.get("FifoQueue").map(String::as_str), Some("true"));
        assert_eq!(wire.get("VisibilityTimeout").map(String::as_str), Some("60"));
    }

    #[test]
    fn test_empty_set_produces_empty_map() {
        let attributes = QueueAttributes::new();
        assert!(attributes.is_empty());
        assert!(attributes.to_wire().unwrap().is_empty());
    }
}
