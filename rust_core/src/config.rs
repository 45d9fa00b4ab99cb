use crate::circuit_breaker::CircuitBreakerConfig;
use crate::clients::nba_stats::DEFAULT_BASE_URL;
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Agent runtime configuration
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub stats_base_url: String,
    pub stats_timeout: Duration,

    /// Pause between emitted chunks; zero disables pacing
    pub chunk_delay: Duration,

    /// Replaces the built-in prop roster when set
    pub prop_roster_path: Option<PathBuf>,

    pub breaker_failure_threshold: u32,
    pub breaker_recovery: Duration,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            stats_base_url: DEFAULT_BASE_URL.to_string(),
            stats_timeout: Duration::from_secs(15),
            chunk_delay: Duration::from_millis(10),
            prop_roster_path: None,
            breaker_failure_threshold: 5,
            breaker_recovery: Duration::from_secs(30),
        }
    }
}

impl AgentConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the process env in production)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let stats_base_url = lookup("NBA_STATS_BASE_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let stats_timeout =
            Duration::from_secs(parse_u64(&lookup, "NBA_STATS_TIMEOUT_SECS", 15)?);
        let chunk_delay = Duration::from_millis(parse_u64(&lookup, "CHUNK_DELAY_MS", 10)?);

        let prop_roster_path = lookup("PROP_ROSTER_PATH")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        let breaker_failure_threshold =
            parse_u64(&lookup, "STATS_CB_FAILURE_THRESHOLD", 5)? as u32;
        let breaker_recovery =
            Duration::from_secs(parse_u64(&lookup, "STATS_CB_RECOVERY_SECS", 30)?);

        Ok(Self {
            stats_base_url,
            stats_timeout,
            chunk_delay,
            prop_roster_path,
            breaker_failure_threshold,
            breaker_recovery,
        })
    }

    pub fn circuit_breaker(&self) -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            failure_threshold: self.breaker_failure_threshold.max(1),
            recovery_timeout: self.breaker_recovery,
            ..Default::default()
        }
    }
}

fn parse_u64<F>(lookup: &F, key: &str, default: u64) -> Result<u64>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key).unwrap_or_else(|| default.to_string());
    raw.trim()
        .parse::<u64>()
        .with_context(|| format!("Invalid {key}: {raw} (expected integer)"))
}
