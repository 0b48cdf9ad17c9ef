//! Scheduler configuration.

use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::core::AppResult;

/// Prefix of the environment variables read by [`SchedulerConfig::from_env`].
pub const ENV_PREFIX: &str = "ORDER_SCHEDULER_";

/// Tunables of the order admission scheduler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Processing deadline measured from pickup, in seconds.
    pub timeout_secs: u64,
    /// Sleep between polls of an empty queue, in milliseconds.
    pub idle_poll_ms: u64,
    /// Simulated downstream latency per request, in milliseconds.
    pub work_latency_ms: u64,
    /// Lifetime spend at which a Standard customer becomes Premium.
    pub promotion_threshold: f64,
    /// Capacity of the default in-memory audit sink.
    pub audit_capacity: usize,
    /// Interval between simulated orders, in milliseconds.
    pub traffic_interval_ms: u64,
    /// How long `shutdown_and_wait` waits for the worker to exit, in milliseconds.
    pub shutdown_grace_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            idle_poll_ms: 200,
            work_latency_ms: 2_000,
            promotion_threshold: 2_000.0,
            audit_capacity: 1_024,
            traffic_interval_ms: 8_000,
            shutdown_grace_ms: 5_000,
        }
    }
}

impl SchedulerConfig {
    /// Defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the processing deadline.
    #[must_use]
    pub const fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the idle poll interval.
    #[must_use]
    pub const fn with_idle_poll_ms(mut self, ms: u64) -> Self {
        self.idle_poll_ms = ms;
        self
    }

    /// Set the simulated work latency.
    #[must_use]
    pub const fn with_work_latency_ms(mut self, ms: u64) -> Self {
        self.work_latency_ms = ms;
        self
    }

    /// Set the promotion threshold.
    #[must_use]
    pub const fn with_promotion_threshold(mut self, threshold: f64) -> Self {
        self.promotion_threshold = threshold;
        self
    }

    /// Set the audit sink capacity.
    #[must_use]
    pub const fn with_audit_capacity(mut self, capacity: usize) -> Self {
        self.audit_capacity = capacity;
        self
    }

    /// Set the simulated traffic interval.
    #[must_use]
    pub const fn with_traffic_interval_ms(mut self, ms: u64) -> Self {
        self.traffic_interval_ms = ms;
        self
    }

    /// Set the shutdown grace period.
    #[must_use]
    pub const fn with_shutdown_grace_ms(mut self, ms: u64) -> Self {
        self.shutdown_grace_ms = ms;
        self
    }

    /// Processing deadline.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Idle poll interval.
    #[must_use]
    pub const fn idle_poll(&self) -> Duration {
        Duration::from_millis(self.idle_poll_ms)
    }

    /// Simulated work latency.
    #[must_use]
    pub const fn work_latency(&self) -> Duration {
        Duration::from_millis(self.work_latency_ms)
    }

    /// Simulated traffic interval.
    #[must_use]
    pub const fn traffic_interval(&self) -> Duration {
        Duration::from_millis(self.traffic_interval_ms)
    }

    /// Shutdown grace period.
    #[must_use]
    pub const fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".into());
        }
        if self.idle_poll_ms == 0 {
            return Err("idle_poll_ms must be greater than 0".into());
        }
        if !self.promotion_threshold.is_finite() || self.promotion_threshold < 0.0 {
            return Err("promotion_threshold must be a non-negative number".into());
        }
        if self.audit_capacity == 0 {
            return Err("audit_capacity must be greater than 0".into());
        }
        if self.traffic_interval_ms == 0 {
            return Err("traffic_interval_ms must be greater than 0".into());
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate. Missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns a message on malformed JSON or invalid values.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load configuration from `ORDER_SCHEDULER_*` environment variables, reading a
    /// `.env` file first if one exists. Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Fails if a variable is set but does not parse, or the result is invalid.
    pub fn from_env() -> AppResult<Self> {
        let _ = dotenvy::dotenv();
        let mut cfg = Self::default();
        if let Some(v) = env_var("TIMEOUT_SECS")? {
            cfg.timeout_secs = v;
        }
        if let Some(v) = env_var("IDLE_POLL_MS")? {
            cfg.idle_poll_ms = v;
        }
        if let Some(v) = env_var("WORK_LATENCY_MS")? {
            cfg.work_latency_ms = v;
        }
        if let Some(v) = env_var("PROMOTION_THRESHOLD")? {
            cfg.promotion_threshold = v;
        }
        if let Some(v) = env_var("AUDIT_CAPACITY")? {
            cfg.audit_capacity = v;
        }
        if let Some(v) = env_var("TRAFFIC_INTERVAL_MS")? {
            cfg.traffic_interval_ms = v;
        }
        if let Some(v) = env_var("SHUTDOWN_GRACE_MS")? {
            cfg.shutdown_grace_ms = v;
        }
        cfg.validate().map_err(anyhow::Error::msg)?;
        Ok(cfg)
    }
}

fn env_var<T>(suffix: &str) -> AppResult<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let name = format!("{ENV_PREFIX}{suffix}");
    match std::env::var(&name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("invalid value for {name}: `{raw}`")),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(e).with_context(|| format!("cannot read {name}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = SchedulerConfig::default();
        assert_eq!(cfg.timeout(), Duration::from_secs(15));
        assert_eq!(cfg.idle_poll(), Duration::from_millis(200));
        assert_eq!(cfg.work_latency(), Duration::from_millis(2_000));
        assert!((cfg.promotion_threshold - 2_000.0).abs() < f64::EPSILON);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_zero_work_latency_is_allowed() {
        assert!(SchedulerConfig::new().with_work_latency_ms(0).validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        std::env::set_var("ORDER_SCHEDULER_TIMEOUT_SECS", "3");
        std::env::set_var("ORDER_SCHEDULER_WORK_LATENCY_MS", "10");
        let cfg = SchedulerConfig::from_env().unwrap();
        assert_eq!(cfg.timeout_secs, 3);
        assert_eq!(cfg.work_latency_ms, 10);

        std::env::set_var("ORDER_SCHEDULER_TIMEOUT_SECS", "soon");
        let err = SchedulerConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("ORDER_SCHEDULER_TIMEOUT_SECS"));

        std::env::remove_var("ORDER_SCHEDULER_TIMEOUT_SECS");
        std::env::remove_var("ORDER_SCHEDULER_WORK_LATENCY_MS");
    }
}
