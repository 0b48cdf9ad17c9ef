//! Tests for audit sink

use order_admission::core::{
    customer_record, request_record, AuditSink, CustomerRef, InMemoryAuditSink, LogLevel,
    OrderRequest, ProductRef, Tier,
};

fn order() -> OrderRequest {
    OrderRequest::new(
        CustomerRef {
            id: 7,
            name: "Deniz".into(),
            tier: Tier::Premium,
        },
        ProductRef {
            id: 3,
            name: "Scarf".into(),
            unit_price: 18.0,
        },
        2,
        1_000,
    )
    .unwrap()
}

#[test]
fn test_in_memory_audit_sink() {
    let mut sink = InMemoryAuditSink::new(10);
    sink.record(request_record(&order(), LogLevel::Info, "Queued", None, 1_000));

    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].customer_id, Some(7));
    assert_eq!(records[0].customer_tier, Some(Tier::Premium));
    assert_eq!(records[0].product_name.as_deref(), Some("Scarf"));
    assert_eq!(records[0].quantity, Some(2));
    assert_eq!(records[0].result_text, "Queued");
}

#[test]
fn test_audit_sink_overflow() {
    let mut sink = InMemoryAuditSink::new(2);

    sink.record(customer_record(1, Tier::Standard, "first", 1));
    sink.record(customer_record(2, Tier::Standard, "second", 2));
    sink.record(customer_record(3, Tier::Standard, "third", 3));

    let records = sink.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].result_text, "second"); // oldest evicted
    assert_eq!(records[1].result_text, "third");
}

#[test]
fn test_audit_record_serializes() {
    let record = request_record(&order(), LogLevel::Error, "Timed out", None, 42);
    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["level"], "error");
    assert_eq!(json["customer_tier"], "Premium");
    assert_eq!(json["order_id"], serde_json::Value::Null);
}
