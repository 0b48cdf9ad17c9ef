//! Tests for error types

use order_admission::core::{
    classify_message, AdminError, GatewayError, OutcomeKind, RequestError, SchedulerError,
};

#[test]
fn test_insufficient_stock_error() {
    let err = GatewayError::InsufficientStock {
        product_id: 4,
        requested: 3,
        available: 1,
    };
    assert_eq!(
        format!("{err}"),
        "insufficient stock for product 4: requested 3, available 1"
    );
}

#[test]
fn test_insufficient_budget_error() {
    let err = GatewayError::InsufficientBudget {
        customer_id: 2,
        required: 270.0,
        available: 99.5,
    };
    assert_eq!(
        format!("{err}"),
        "insufficient budget for customer 2: required 270.00, available 99.50"
    );
}

#[test]
fn test_data_store_error() {
    let err = GatewayError::DataStore("connection reset".to_string());
    assert_eq!(format!("{err}"), "data store error: connection reset");
    assert_eq!(err.outcome_kind(), OutcomeKind::DataStoreError);
}

#[test]
fn test_keyword_classification() {
    assert_eq!(classify_message("Insufficient stock"), OutcomeKind::InsufficientStock);
    assert_eq!(classify_message("Yetersiz bakiye"), OutcomeKind::InsufficientBudget);
    assert_eq!(classify_message("low BALANCE"), OutcomeKind::InsufficientBudget);
    assert_eq!(classify_message("deadlock detected"), OutcomeKind::DataStoreError);
}

#[test]
fn test_outcome_labels() {
    assert_eq!(OutcomeKind::Timeout.to_string(), "timeout");
    assert_eq!(OutcomeKind::DataStoreError.to_string(), "data store error");
    assert!(!OutcomeKind::Success.is_failure());
    assert!(OutcomeKind::NotFound.is_failure());
}

#[test]
fn test_scheduler_errors() {
    assert_eq!(format!("{}", SchedulerError::AlreadyStarted), "scheduler already started");
    assert_eq!(
        format!("{}", SchedulerError::InvalidConfig("timeout_secs must be greater than 0".into())),
        "invalid configuration: timeout_secs must be greater than 0"
    );
}

#[test]
fn test_request_and_admin_errors() {
    assert_eq!(format!("{}", RequestError::ZeroQuantity), "quantity must be greater than 0");
    let wrapped = AdminError::from(GatewayError::NotFound("product 8".into()));
    assert_eq!(format!("{wrapped}"), "not found: product 8");
}
