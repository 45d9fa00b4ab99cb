//! Query error taxonomy.
//!
//! Handlers return these instead of formatting failures themselves; the agent
//! renders each kind to a single response chunk.

use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum QueryError {
    /// Malformed command arguments; no data was fetched
    #[error("usage: {0}")]
    Usage(String),

    /// Player, team or game did not resolve
    #[error("not found: {0}")]
    NotFound(String),

    /// Entity resolved but the requested record set is empty
    #[error("no data: {0}")]
    NoData(String),

    /// The stats provider failed
    #[error("upstream failure while {action}")]
    Upstream {
        action: String,
        #[source]
        source: anyhow::Error,
    },
}

impl QueryError {
    pub fn usage(msg: impl Into<String>) -> Self {
        QueryError::Usage(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        QueryError::NotFound(msg.into())
    }

    pub fn no_data(msg: impl Into<String>) -> Self {
        QueryError::NoData(msg.into())
    }

    /// Adapter for `map_err` at data-source call sites
    pub fn upstream(action: impl Into<String>) -> impl FnOnce(anyhow::Error) -> QueryError {
        let action = action.into();
        move |source| QueryError::Upstream { action, source }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            QueryError::Usage(_) => "usage",
            QueryError::NotFound(_) => "not_found",
            QueryError::NoData(_) => "no_data",
            QueryError::Upstream { .. } => "upstream",
        }
    }

    /// User-facing text. Upstream detail is logged here and never echoed.
    pub fn render(&self) -> String {
        match self {
            QueryError::Usage(msg) => format!("⚠️ {}", msg),
            QueryError::NotFound(msg) | QueryError::NoData(msg) => {
                warn!("{}: {}", self.kind(), msg);
                format!("❌ {}", msg)
            }
            QueryError::Upstream { action, source } => {
                error!("Upstream error while {}: {:#}", action, source);
                format!("❌ Error {}. Try again.", action)
            }
        }
    }
}

pub type HandlerResult<T> = Result<T, QueryError>;

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_upstream_render_hides_source() {
        let err: Result<(), _> = Err(anyhow!("HTTP 503 from stats.nba.com"));
        let err = err.map_err(QueryError::upstream("checking trend")).unwrap_err();
        let text = err.render();
        assert_eq!(text, "❌ Error checking trend. Try again.");
        assert!(!text.contains("503"));
        assert_eq!(err.kind(), "upstream");
    }

    #[test]
    fn test_render_kinds() {
        assert!(QueryError::usage("Stat must be one of: PTS, AST, REB, 3PM.")
            .render()
            .starts_with("⚠️"));
        assert_eq!(
            QueryError::not_found("Couldn't find a player named 'Nobody'.").render(),
            "❌ Couldn't find a player named 'Nobody'."
        );
        assert_eq!(QueryError::no_data("No games found for today.").kind(), "no_data");
    }
}
