// Shared models for the Momentum query engine
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Identifiers & Season
// ============================================================================

/// Stats-provider player identifier
pub type PlayerId = u64;

/// Stats-provider team identifier
pub type TeamId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeasonType {
    #[serde(rename = "Regular Season")]
    RegularSeason,
    Playoffs,
}

impl SeasonType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeasonType::RegularSeason => "Regular Season",
            SeasonType::Playoffs => "Playoffs",
        }
    }
}

impl fmt::Display for SeasonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Season selector passed to every season-scoped data-source call
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Season {
    /// Season label, e.g. "2024-25"
    pub label: String,
    pub season_type: SeasonType,
}

impl Season {
    pub fn new(label: impl Into<String>, season_type: SeasonType) -> Self {
        Self {
            label: label.into(),
            season_type,
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

// ============================================================================
// Game Records
// ============================================================================

/// One row of a player or team game log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub game_id: String,
    pub date: NaiveDate,
    pub matchup: String,
    pub points: f64,
    pub rebounds: f64,
    pub assists: f64,
    pub threes_made: f64,
    /// `Some(true)` for a win; `None` while the game is in progress
    pub win: Option<bool>,
    pub possessions: Option<f64>,
}

impl GameRecord {
    /// Value of a single stat column
    pub fn stat(&self, stat: StatCode) -> f64 {
        match stat {
            StatCode::Points => self.points,
            StatCode::Assists => self.assists,
            StatCode::Rebounds => self.rebounds,
            StatCode::ThreesMade => self.threes_made,
        }
    }
}

/// Stat codes accepted in prop queries.
///
/// `3PM` maps onto the provider's `FG3M` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatCode {
    #[serde(rename = "PTS")]
    Points,
    #[serde(rename = "AST")]
    Assists,
    #[serde(rename = "REB")]
    Rebounds,
    #[serde(rename = "3PM")]
    ThreesMade,
}

impl StatCode {
    /// Code as typed by users
    pub fn as_str(&self) -> &'static str {
        match self {
            StatCode::Points => "PTS",
            StatCode::Assists => "AST",
            StatCode::Rebounds => "REB",
            StatCode::ThreesMade => "3PM",
        }
    }
}

impl fmt::Display for StatCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PTS" => Ok(StatCode::Points),
            "AST" => Ok(StatCode::Assists),
            "REB" => Ok(StatCode::Rebounds),
            "3PM" => Ok(StatCode::ThreesMade),
            other => Err(format!("unknown stat code: {}", other)),
        }
    }
}

// ============================================================================
// League Tables
// ============================================================================

/// Neutral rating used when a team is missing from the ratings table
pub const DEFAULT_TEAM_RATING: f64 = 110.0;

/// Season-level team efficiency row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamRating {
    pub team_id: TeamId,
    pub team_name: String,
    pub offensive_rating: f64,
    pub defensive_rating: f64,
    pub pace: f64,
}

/// One row of the league clutch-performance table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClutchRow {
    pub player_name: String,
    pub team_abbreviation: String,
    pub games_played: u32,
    pub points: f64,
    pub plus_minus: f64,
}

/// Filters forwarded to the clutch table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClutchFilters {
    /// Clutch window, e.g. "Last 5 Minutes"
    pub clutch_time: String,
    /// Score margin, e.g. "Ahead or Behind"
    pub ahead_behind: String,
    pub point_diff: u32,
}

impl Default for ClutchFilters {
    fn default() -> Self {
        Self {
            clutch_time: "Last 5 Minutes".to_string(),
            ahead_behind: "Ahead or Behind".to_string(),
            point_diff: 5,
        }
    }
}

// ============================================================================
// Scoreboard & Game Detail
// ============================================================================

/// Game header row of a day scoreboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameHeader {
    pub game_id: String,
    pub status_text: String,
    pub home_team_id: TeamId,
    pub visitor_team_id: TeamId,
}

impl GameHeader {
    pub fn is_final(&self) -> bool {
        self.status_text.trim().eq_ignore_ascii_case("final")
    }
}

/// Per-team line score row of a day scoreboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineScore {
    pub game_id: String,
    pub team_id: TeamId,
    pub team_abbreviation: String,
    pub points: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scoreboard {
    pub headers: Vec<GameHeader>,
    pub line_scores: Vec<LineScore>,
}

impl Scoreboard {
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Line score for one team in one game
    pub fn line_for(&self, game_id: &str, team_id: TeamId) -> Option<&LineScore> {
        self.line_scores
            .iter()
            .find(|l| l.game_id == game_id && l.team_id == team_id)
    }

    /// Every team id appearing in the header table
    pub fn team_ids(&self) -> Vec<TeamId> {
        let mut ids: Vec<TeamId> = self
            .headers
            .iter()
            .flat_map(|h| [h.home_team_id, h.visitor_team_id])
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

/// Single play-by-play event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayEvent {
    pub event_num: u32,
    pub period: u8,
    pub clock: String,
    pub description: String,
    pub score: Option<String>,
}

/// Team row of an advanced box score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamAdvancedRow {
    pub team_abbreviation: String,
    pub offensive_rating: f64,
    pub defensive_rating: f64,
    pub pace: f64,
    pub effective_fg_pct: f64,
    pub true_shooting_pct: f64,
}

// ============================================================================
// Prop Candidates & Output
// ============================================================================

/// (player, stat, line) tuple scanned by batch handlers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropCandidate {
    pub player: String,
    pub stat: StatCode,
    pub line: f64,
}

impl PropCandidate {
    pub fn new(player: impl Into<String>, stat: StatCode, line: f64) -> Self {
        Self {
            player: player.into(),
            stat,
            line,
        }
    }
}

/// A single unit of agent output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseChunk {
    pub text: String,
}

impl ResponseChunk {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}
