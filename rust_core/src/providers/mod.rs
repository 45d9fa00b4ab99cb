//! Stats data source abstraction
//!
//! Defines the StatsDataSource trait consumed by every scoring handler. The
//! live implementation is `clients::nba_stats::NbaStatsClient`; the in-memory
//! implementation backs tests and offline runs.

use crate::models::{
    ClutchFilters, ClutchRow, GameRecord, PlayEvent, PlayerId, Scoreboard, Season,
    TeamAdvancedRow, TeamId, TeamRating,
};
use crate::teams::TeamInfo;
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub mod memory;
pub mod result_set;

pub use memory::InMemoryStatsSource;

/// Resolved player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRef {
    pub id: PlayerId,
    pub full_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PerMode {
    PerGame,
    Totals,
}

impl PerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PerMode::PerGame => "PerGame",
            PerMode::Totals => "Totals",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeasureType {
    Base,
    Advanced,
}

impl MeasureType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeasureType::Base => "Base",
            MeasureType::Advanced => "Advanced",
        }
    }
}

/// Query contract of the external stats provider.
///
/// Errors are opaque upstream failures; "not found" is `Ok(None)` and "no
/// data" is an empty collection.
#[async_trait]
pub trait StatsDataSource: Send + Sync {
    /// Resolve a player by full name
    async fn find_player(&self, full_name: &str) -> Result<Option<PlayerRef>>;

    /// Resolve a team by abbreviation (e.g. "BOS")
    async fn find_team(&self, abbreviation: &str) -> Result<Option<TeamInfo>>;

    async fn player_game_log(&self, player_id: PlayerId, season: &Season)
        -> Result<Vec<GameRecord>>;

    async fn team_game_log(&self, team_id: TeamId, season: &Season) -> Result<Vec<GameRecord>>;

    async fn league_team_stats(
        &self,
        season: &Season,
        per_mode: PerMode,
        measure: MeasureType,
    ) -> Result<Vec<TeamRating>>;

    async fn league_player_clutch(
        &self,
        season: &Season,
        filters: &ClutchFilters,
    ) -> Result<Vec<ClutchRow>>;

    /// Header and line-score tables for one calendar day
    async fn day_scoreboard(&self, date: NaiveDate) -> Result<Scoreboard>;

    async fn play_by_play(&self, game_id: &str) -> Result<Vec<PlayEvent>>;

    async fn advanced_boxscore(&self, game_id: &str) -> Result<Vec<TeamAdvancedRow>>;

    /// Provider name for logging and debugging
    fn provider_name(&self) -> &str;
}
