//! Serialization tests for broadcast results
//!
//! Progress snapshots, summaries and outcomes are logged as structured JSON,
//! so their shape is part of the observable surface.

use dmcast::broadcast::source::{Attachment, Payload};
use dmcast::broadcast::state::FailedRecipient;
use dmcast::broadcast::{DeliveryOutcome, FinalSummary, RejectReason};
use rstest::rstest;
use serde_json::json;

#[rstest]
#[case(DeliveryOutcome::Delivered, json!({"status": "delivered"}))]
#[case(
    DeliveryOutcome::Rejected(RejectReason::Blocking),
    json!({"status": "rejected", "reason": "blocking"})
)]
#[case(
    DeliveryOutcome::Rejected(RejectReason::Transient),
    json!({"status": "rejected", "reason": "transient"})
)]
fn test_outcome_serialization(#[case] outcome: DeliveryOutcome, #[case] expected: serde_json::Value) {
    assert_eq!(serde_json::to_value(outcome).unwrap(), expected);
}

#[test]
fn test_final_summary_serialization() {
    let summary = FinalSummary {
        succeeded: 21,
        failed: 2,
        total: 23,
        failed_sample: vec![
            FailedRecipient {
                tag: "alice".to_string(),
                reason: RejectReason::Blocking,
            },
            FailedRecipient {
                tag: "bob".to_string(),
                reason: RejectReason::Unreachable,
            },
        ],
        failed_overflow: 0,
        cancelled: false,
    };

    assert_eq!(
        serde_json::to_value(&summary).unwrap(),
        json!({
            "succeeded": 21,
            "failed": 2,
            "total": 23,
            "failed_sample": [
                {"tag": "alice", "reason": "blocking"},
                {"tag": "bob", "reason": "unreachable"}
            ],
            "failed_overflow": 0,
            "cancelled": false
        })
    );
}

#[test]
fn test_payload_is_tagged_by_kind() {
    let payload = Payload::WithAttachments {
        text: "see attached".to_string(),
        attachments: vec![Attachment::new("a.png", "https://cdn.test/a.png")],
    };

    assert_eq!(
        serde_json::to_value(&payload).unwrap(),
        json!({
            "kind": "with_attachments",
            "text": "see attached",
            "attachments": [{"filename": "a.png", "url": "https://cdn.test/a.png"}]
        })
    );

    let text = Payload::Text {
        text: "hello".to_string(),
    };
    assert_eq!(
        serde_json::to_value(&text).unwrap(),
        json!({"kind": "text", "text": "hello"})
    );
}
