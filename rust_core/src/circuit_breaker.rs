//! Circuit breaker for stats-provider calls.
//!
//! The stats API throttles aggressively; once it starts failing we stop
//! hammering it for a while and fail fast instead. This module provides:
//! - Consecutive failure tracking with a trip threshold
//! - Automatic half-open probe after a recovery timeout
//! - A `call` wrapper that records the outcome of an async request

use anyhow::{anyhow, Result};
use parking_lot::RwLock;
use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

/// Breaker states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Requests flow normally
    Closed,
    /// Requests are rejected without touching the network
    Open,
    /// Probing whether the provider recovered
    HalfOpen,
}

#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that open the circuit
    pub failure_threshold: u32,
    /// Time spent open before a probe is allowed
    pub recovery_timeout: Duration,
    /// Successful probes needed to close again
    pub success_threshold: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            recovery_timeout: Duration::from_secs(30),
            success_threshold: 2,
        }
    }
}

pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    state: RwLock<CircuitState>,
    failures: AtomicU32,
    probe_successes: AtomicU32,
    opened_at: RwLock<Option<Instant>>,
}

impl std::fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("name", &self.name)
            .field("state", &self.state())
            .field("failures", &self.failure_count())
            .finish()
    }
}

impl CircuitBreaker {
    pub fn new(name: &str, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.to_string(),
            config,
            state: RwLock::new(CircuitState::Closed),
            failures: AtomicU32::new(0),
            probe_successes: AtomicU32::new(0),
            opened_at: RwLock::new(None),
        }
    }

    /// Whether a request may be attempted now.
    ///
    /// Moves Open -> HalfOpen once the recovery timeout has elapsed.
    pub fn is_available(&self) -> bool {
        let mut state = self.state.write();
        match *state {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Open => {
                let recovered = self
                    .opened_at
                    .read()
                    .map(|t| t.elapsed() >= self.config.recovery_timeout)
                    .unwrap_or(true);
                if recovered {
                    *state = CircuitState::HalfOpen;
                    self.probe_successes.store(0, Ordering::SeqCst);
                }
                recovered
            }
        }
    }

    pub fn record_success(&self) {
        self.failures.store(0, Ordering::SeqCst);
        let mut state = self.state.write();
        if *state == CircuitState::HalfOpen {
            let probes = self.probe_successes.fetch_add(1, Ordering::SeqCst) + 1;
            if probes < self.config.success_threshold {
                return;
            }
            tracing::info!("Circuit '{}' closed after {} successful probes", self.name, probes);
        }
        *state = CircuitState::Closed;
    }

    pub fn record_failure(&self) {
        let failures = self.failures.fetch_add(1, Ordering::SeqCst) + 1;
        let mut state = self.state.write();
        let trip = match *state {
            CircuitState::Closed => failures >= self.config.failure_threshold,
            CircuitState::HalfOpen => true,
            CircuitState::Open => false,
        };
        if trip {
            *state = CircuitState::Open;
            *self.opened_at.write() = Some(Instant::now());
            tracing::warn!(
                "Circuit '{}' OPEN after {} consecutive failures",
                self.name,
                failures
            );
        }
    }

    /// Run `request` through the breaker, recording its outcome
    pub async fn call<T, F>(&self, request: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if !self.is_available() {
            return Err(anyhow!("circuit '{}' is open", self.name));
        }
        let result = request.await;
        match &result {
            Ok(_) => self.record_success(),
            Err(_) => self.record_failure(),
        }
        result
    }

    pub fn state(&self) -> CircuitState {
        *self.state.read()
    }

    pub fn failure_count(&self) -> u32 {
        self.failures.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        *self.state.write() = CircuitState::Closed;
        self.failures.store(0, Ordering::SeqCst);
        self.probe_successes.store(0, Ordering::SeqCst);
        *self.opened_at.write() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breaker(failure_threshold: u32, success_threshold: u32) -> CircuitBreaker {
        CircuitBreaker::new(
            "nba_stats_test",
            CircuitBreakerConfig {
                failure_threshold,
                recovery_timeout: Duration::from_millis(10),
                success_threshold,
            },
        )
    }

    #[test]
    fn test_opens_after_threshold() {
        let cb = CircuitBreaker::new(
            "nba_stats_test",
            CircuitBreakerConfig {
                failure_threshold: 3,
                recovery_timeout: Duration::from_secs(60),
                success_threshold: 1,
            },
        );
        cb.record_failure();
        cb.record_failure();
        assert!(cb.is_available());

        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Open);
        assert!(!cb.is_available());
    }

    #[test]
    fn test_half_open_recovery() {
        let cb = breaker(2, 2);
        cb.record_failure();
        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Open);

        std::thread::sleep(Duration::from_millis(20));
        assert!(cb.is_available());
        assert_eq!(cb.state(), CircuitState::HalfOpen);

        cb.record_success();
        assert_eq!(cb.state(), CircuitState::HalfOpen);
        cb.record_success();
        assert_eq!(cb.state(), CircuitState::Closed);
    }

    #[test]
    fn test_half_open_failure_reopens() {
        let cb = breaker(1, 1);
        cb.record_failure();
        std::thread::sleep(Duration::from_millis(20));
        assert!(cb.is_available());

        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Open);
        assert!(!cb.is_available());
    }

    #[tokio::test]
    async fn test_call_records_outcome() {
        let cb = CircuitBreaker::new(
            "nba_stats_test",
            CircuitBreakerConfig {
                failure_threshold: 1,
                recovery_timeout: Duration::from_secs(60),
                success_threshold: 1,
            },
        );
        let ok: Result<u32> = cb.call(async { Ok(7) }).await;
        assert_eq!(ok.unwrap(), 7);

        let err: Result<u32> = cb.call(async { Err(anyhow!("503")) }).await;
        assert!(err.is_err());
        assert_eq!(cb.state(), CircuitState::Open);

        let blocked: Result<u32> = cb.call(async { Ok(1) }).await;
        assert!(blocked.unwrap_err().to_string().contains("is open"));

        cb.reset();
        assert_eq!(cb.failure_count(), 0);
        assert_eq!(cb.state(), CircuitState::Closed);
    }
}
