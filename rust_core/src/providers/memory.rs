//! In-memory stats source.
//!
//! Deterministic implementation of `StatsDataSource` backed by fixed tables.
//! It records how often it was called and which seasons were requested, and
//! can be switched into a failing mode to exercise upstream-error paths.

use super::{MeasureType, PerMode, PlayerRef, StatsDataSource};
use crate::models::{
    ClutchFilters, ClutchRow, GameRecord, PlayEvent, PlayerId, Scoreboard, Season,
    TeamAdvancedRow, TeamId, TeamRating,
};
use crate::teams::{self, TeamInfo};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct InMemoryStatsSource {
    players: Vec<PlayerRef>,
    player_logs: HashMap<PlayerId, Vec<GameRecord>>,
    team_logs: HashMap<TeamId, Vec<GameRecord>>,
    team_ratings: Vec<TeamRating>,
    clutch: Vec<ClutchRow>,
    scoreboards: HashMap<NaiveDate, Scoreboard>,
    plays: HashMap<String, Vec<PlayEvent>>,
    boxscores: HashMap<String, Vec<TeamAdvancedRow>>,
    failing: AtomicBool,
    calls: AtomicUsize,
    seasons: RwLock<Vec<Season>>,
}

impl InMemoryStatsSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_player(mut self, id: PlayerId, full_name: &str, games: Vec<GameRecord>) -> Self {
        self.players.push(PlayerRef {
            id,
            full_name: full_name.to_string(),
        });
        self.player_logs.insert(id, games);
        self
    }

    pub fn with_team_log(mut self, team_id: TeamId, games: Vec<GameRecord>) -> Self {
        self.team_logs.insert(team_id, games);
        self
    }

    pub fn with_team_ratings(mut self, ratings: Vec<TeamRating>) -> Self {
        self.team_ratings = ratings;
        self
    }

    pub fn with_clutch(mut self, rows: Vec<ClutchRow>) -> Self {
        self.clutch = rows;
        self
    }

    pub fn with_scoreboard(mut self, date: NaiveDate, board: Scoreboard) -> Self {
        self.scoreboards.insert(date, board);
        self
    }

    pub fn with_plays(mut self, game_id: &str, plays: Vec<PlayEvent>) -> Self {
        self.plays.insert(game_id.to_string(), plays);
        self
    }

    pub fn with_boxscore(mut self, game_id: &str, rows: Vec<TeamAdvancedRow>) -> Self {
        self.boxscores.insert(game_id.to_string(), rows);
        self
    }

    /// Make every subsequent call fail
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of data-source calls served (or failed)
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Seasons passed to season-scoped calls, in call order
    pub fn requested_seasons(&self) -> Vec<Season> {
        self.seasons.read().clone()
    }

    fn enter(&self, call: &str) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(anyhow!("in-memory source configured to fail ({})", call));
        }
        Ok(())
    }

    fn record_season(&self, season: &Season) {
        self.seasons.write().push(season.clone());
    }
}

#[async_trait]
impl StatsDataSource for InMemoryStatsSource {
    async fn find_player(&self, full_name: &str) -> Result<Option<PlayerRef>> {
        self.enter("find_player")?;
        let needle = full_name.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(None);
        }
        Ok(self
            .players
            .iter()
            .find(|p| p.full_name.to_lowercase() == needle)
            .or_else(|| {
                self.players
                    .iter()
                    .find(|p| p.full_name.to_lowercase().contains(&needle))
            })
            .cloned())
    }

    async fn find_team(&self, abbreviation: &str) -> Result<Option<TeamInfo>> {
        self.enter("find_team")?;
        Ok(teams::find_by_abbreviation(abbreviation).map(|t| t.info()))
    }

    async fn player_game_log(
        &self,
        player_id: PlayerId,
        season: &Season,
    ) -> Result<Vec<GameRecord>> {
        self.enter("player_game_log")?;
        self.record_season(season);
        Ok(self.player_logs.get(&player_id).cloned().unwrap_or_default())
    }

    async fn team_game_log(&self, team_id: TeamId, season: &Season) -> Result<Vec<GameRecord>> {
        self.enter("team_game_log")?;
        self.record_season(season);
        Ok(self.team_logs.get(&team_id).cloned().unwrap_or_default())
    }

    async fn league_team_stats(
        &self,
        season: &Season,
        _per_mode: PerMode,
        _measure: MeasureType,
    ) -> Result<Vec<TeamRating>> {
        self.enter("league_team_stats")?;
        self.record_season(season);
        Ok(self.team_ratings.clone())
    }

    async fn league_player_clutch(
        &self,
        season: &Season,
        _filters: &ClutchFilters,
    ) -> Result<Vec<ClutchRow>> {
        self.enter("league_player_clutch")?;
        self.record_season(season);
        Ok(self.clutch.clone())
    }

    async fn day_scoreboard(&self, date: NaiveDate) -> Result<Scoreboard> {
        self.enter("day_scoreboard")?;
        Ok(self.scoreboards.get(&date).cloned().unwrap_or_default())
    }

    async fn play_by_play(&self, game_id: &str) -> Result<Vec<PlayEvent>> {
        self.enter("play_by_play")?;
        Ok(self.plays.get(game_id).cloned().unwrap_or_default())
    }

    async fn advanced_boxscore(&self, game_id: &str) -> Result<Vec<TeamAdvancedRow>> {
        self.enter("advanced_boxscore")?;
        Ok(self.boxscores.get(game_id).cloned().unwrap_or_default())
    }

    fn provider_name(&self) -> &str {
        "in-memory"
    }
}
