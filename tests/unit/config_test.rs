//! Tests for configuration validation

use std::time::Duration;

use order_admission::config::SchedulerConfig;

#[test]
fn test_scheduler_config_defaults_validate() {
    let cfg = SchedulerConfig::new();
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.timeout_secs, 15);
    assert_eq!(cfg.idle_poll_ms, 200);
    assert_eq!(cfg.work_latency_ms, 2_000);
    assert_eq!(cfg.traffic_interval(), Duration::from_secs(8));
}

#[test]
fn test_scheduler_config_invalid_timeout() {
    let cfg = SchedulerConfig::new().with_timeout_secs(0);
    assert!(cfg.validate().is_err());
}

#[test]
fn test_scheduler_config_invalid_idle_poll() {
    let cfg = SchedulerConfig::new().with_idle_poll_ms(0);
    assert!(cfg.validate().is_err());
}

#[test]
fn test_scheduler_config_invalid_threshold() {
    assert!(SchedulerConfig::new()
        .with_promotion_threshold(-1.0)
        .validate()
        .is_err());
    assert!(SchedulerConfig::new()
        .with_promotion_threshold(f64::NAN)
        .validate()
        .is_err());
}

#[test]
fn test_scheduler_config_from_json() {
    let cfg = SchedulerConfig::from_json_str(r#"{"timeout_secs": 5, "work_latency_ms": 50}"#)
        .unwrap();
    assert_eq!(cfg.timeout_secs, 5);
    assert_eq!(cfg.work_latency_ms, 50);
    assert_eq!(cfg.idle_poll_ms, 200);
}

#[test]
fn test_scheduler_config_from_json_rejects_invalid() {
    assert!(SchedulerConfig::from_json_str(r#"{"timeout_secs": 0}"#).is_err());
    let err = SchedulerConfig::from_json_str("{not json").unwrap_err();
    assert!(err.starts_with("parse error"));
}
