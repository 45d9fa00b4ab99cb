//! Scoring handlers
//!
//! One handler per intent. Every handler resolves identifiers, fetches its
//! record set through the `StatsDataSource`, computes via `metrics` and
//! returns a single consolidated chunk or a `QueryError` for the agent to
//! render.

use crate::classifier::{Command, Intent};
use crate::error::{HandlerResult, QueryError};
use crate::metrics::GameLog;
use crate::models::{ResponseChunk, Season};
use crate::providers::{PlayerRef, StatsDataSource};
use crate::roster::PropRoster;
use crate::season::{current_season, Clock};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

pub mod batch;
pub mod game;
pub mod info;
pub mod league;
pub mod player;
pub mod trend;

#[async_trait]
pub trait IntentHandler: Send + Sync {
    /// Intent this handler answers
    fn intent(&self) -> Intent;

    async fn handle(&self, ctx: &HandlerContext, cmd: &Command) -> HandlerResult<ResponseChunk>;
}

/// Everything a handler needs for one query
#[derive(Clone)]
pub struct HandlerContext {
    pub source: Arc<dyn StatsDataSource>,
    pub clock: Arc<dyn Clock>,
    pub roster: Arc<PropRoster>,
}

impl HandlerContext {
    pub fn new(
        source: Arc<dyn StatsDataSource>,
        clock: Arc<dyn Clock>,
        roster: Arc<PropRoster>,
    ) -> Self {
        Self {
            source,
            clock,
            roster,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Active season and season type for today
    pub fn season(&self) -> Season {
        current_season(self.today())
    }

    /// Resolve a player name or fail with a "couldn't find" message
    pub async fn resolve_player(&self, name: &str, action: &str) -> HandlerResult<PlayerRef> {
        self.source
            .find_player(name)
            .await
            .map_err(QueryError::upstream(action))?
            .ok_or_else(|| QueryError::not_found(format!("Couldn't find a player named '{}'.", name)))
    }

    /// Season game log for a resolved player, sorted most recent first
    pub async fn player_log(&self, player: &PlayerRef, action: &str) -> HandlerResult<GameLog> {
        let season = self.season();
        let games = self
            .source
            .player_game_log(player.id, &season)
            .await
            .map_err(QueryError::upstream(action))?;
        debug!(
            "{} returned {} games for {} ({} {})",
            self.source.provider_name(),
            games.len(),
            player.full_name,
            season.label,
            season.season_type
        );

        if games.is_empty() {
            return Err(QueryError::no_data(format!(
                "No game logs for {} in {}.",
                player.full_name, season.label
            )));
        }
        Ok(GameLog::new(games))
    }

    /// Resolve a player and fetch their log in one step
    pub async fn lookup_player_log(
        &self,
        name: &str,
        action: &str,
    ) -> HandlerResult<(PlayerRef, GameLog)> {
        let player = self.resolve_player(name, action).await?;
        let log = self.player_log(&player, action).await?;
        Ok((player, log))
    }
}

impl std::fmt::Debug for HandlerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerContext")
            .field("source", &self.source.provider_name())
            .field("today", &self.today())
            .field("roster", &self.roster.len())
            .finish()
    }
}

/// Registry mapping each intent to its handler.
///
/// New intents are added by registering a handler, not by growing a dispatcher.
pub struct HandlerRegistry {
    handlers: HashMap<Intent, Arc<dyn IntentHandler>>,
}

impl HandlerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Create a registry with a handler for every dispatched intent.
    ///
    /// Welcome is answered by the agent itself and never dispatched.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        let defaults: Vec<Arc<dyn IntentHandler>> = vec![
            Arc::new(info::HelpHandler),
            Arc::new(info::InjuryReportHandler),
            Arc::new(info::FallbackHandler),
            Arc::new(player::SearchPlayerHandler),
            Arc::new(player::MomentumRatingHandler),
            Arc::new(player::RiskIndexHandler),
            Arc::new(player::RisingStarHandler),
            Arc::new(trend::TrendPlayerHandler),
            Arc::new(trend::ConsistencyPlayerHandler),
            Arc::new(batch::BestOversHandler),
            Arc::new(batch::BestUndersHandler),
            Arc::new(batch::SafePicksHandler),
            Arc::new(batch::AutoFlexHandler),
            Arc::new(batch::TrendBreakersHandler),
            Arc::new(league::SimulateGameHandler),
            Arc::new(league::TeamMomentumHandler),
            Arc::new(league::HotStreaksHandler),
            Arc::new(league::GamePaceHandler),
            Arc::new(league::BackToBackHandler),
            Arc::new(league::FatigueWatchHandler),
            Arc::new(league::ClutchLeadersHandler),
            Arc::new(league::MismatchRatingsHandler),
            Arc::new(game::RecentPlaysHandler),
            Arc::new(game::AdvancedStatsHandler),
        ];
        for handler in defaults {
            registry.handlers.insert(handler.intent(), handler);
        }

        info!(
            "HandlerRegistry initialized with {} handlers",
            registry.handlers.len()
        );

        registry
    }

    /// Register or replace the handler for its intent
    pub fn register(&mut self, handler: Arc<dyn IntentHandler>) {
        info!("Registering handler: {}", handler.intent());
        self.handlers.insert(handler.intent(), handler);
    }

    pub fn get(&self, intent: Intent) -> Option<Arc<dyn IntentHandler>> {
        self.handlers.get(&intent).cloned()
    }

    /// Handler for `intent`, falling back to the fallback handler
    pub fn get_or_fallback(&self, intent: Intent) -> Arc<dyn IntentHandler> {
        self.get(intent)
            .or_else(|| self.get(Intent::Fallback))
            .unwrap_or_else(|| Arc::new(info::FallbackHandler))
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::models::SeasonType;
    use crate::providers::InMemoryStatsSource;

    #[test]
    fn test_registry_with_defaults_covers_every_intent() {
        let registry = HandlerRegistry::with_defaults();
        for rule in crate::classifier::COMMAND_RULES {
            assert!(registry.get(rule.intent).is_some(), "{}", rule.intent);
        }
        assert!(registry.get(Intent::Welcome).is_none());
        assert!(registry.get(Intent::Fallback).is_some());
        assert_eq!(registry.len(), 24);
    }

    #[test]
    fn test_empty_registry_falls_back() {
        let registry = HandlerRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(
            registry.get_or_fallback(Intent::BestOvers).intent(),
            Intent::Fallback
        );
    }

    #[tokio::test]
    async fn test_player_log_uses_clock_season() {
        let source = Arc::new(
            InMemoryStatsSource::new().with_player(2544, "LeBron James", points_log(&[25.0])),
        );
        let ctx = context(source.clone(), date(2025, 5, 10));

        let (player, log) = ctx.lookup_player_log("LeBron James", "searching").await.unwrap();
        assert_eq!(player.id, 2544);
        assert_eq!(log.len(), 1);
        assert_eq!(
            source.requested_seasons(),
            vec![Season::new("2024-25", SeasonType::Playoffs)]
        );
    }

    #[tokio::test]
    async fn test_lookup_errors() {
        let source = Arc::new(InMemoryStatsSource::new().with_player(1, "Empty Log", vec![]));
        let ctx = context(source.clone(), date(2025, 1, 15));

        let err = ctx.lookup_player_log("Nobody", "searching").await.unwrap_err();
        assert!(matches!(err, QueryError::NotFound(_)));

        let err = ctx.lookup_player_log("Empty Log", "searching").await.unwrap_err();
        assert_eq!(err.render(), "❌ No game logs for Empty Log in 2024-25.");

        source.set_failing(true);
        let err = ctx.lookup_player_log("Empty Log", "searching").await.unwrap_err();
        assert!(matches!(err, QueryError::Upstream { .. }));
    }
}
