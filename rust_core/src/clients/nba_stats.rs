use crate::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig};
use crate::models::{
    ClutchFilters, ClutchRow, GameRecord, PlayEvent, PlayerId, Scoreboard, Season,
    TeamAdvancedRow, TeamId, TeamRating,
};
use crate::providers::result_set::{self, StatsResponse};
use crate::providers::{MeasureType, PerMode, PlayerRef, StatsDataSource};
use crate::season::{season_label, Clock, SystemClock};
use crate::teams::{self, TeamInfo};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::RwLock;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ORIGIN, REFERER, USER_AGENT};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_BASE_URL: &str = "https://stats.nba.com/stats";

/// Minimum Jaro-Winkler similarity accepted for a fuzzy player match
const FUZZY_NAME_THRESHOLD: f64 = 0.92;

/// Player index for one season label, fetched once per label
#[derive(Debug, Clone)]
struct PlayerDirectory {
    season: String,
    players: Vec<PlayerRef>,
}

/// Client for the public NBA stats API.
///
/// Every endpoint returns `resultSets` tables which are converted to typed
/// records by `providers::result_set`. The player index is kept in memory and
/// refetched only when the clock moves into a new season.
#[derive(Clone)]
pub struct NbaStatsClient {
    client: Client,
    base_url: String,
    circuit_breaker: Arc<CircuitBreaker>,
    clock: Arc<dyn Clock>,
    directory: Arc<RwLock<Option<PlayerDirectory>>>,
}

impl std::fmt::Debug for NbaStatsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NbaStatsClient")
            .field("base_url", &self.base_url)
            .field("circuit_state", &self.circuit_breaker.state())
            .field(
                "directory",
                &self.directory.read().as_ref().map(|d| (d.season.clone(), d.players.len())),
            )
            .finish()
    }
}

impl NbaStatsClient {
    pub fn new() -> Result<Self> {
        Self::with_config(DEFAULT_BASE_URL, Duration::from_secs(15), CircuitBreakerConfig::default())
    }

    pub fn with_config(
        base_url: &str,
        timeout: Duration,
        breaker: CircuitBreakerConfig,
    ) -> Result<Self> {
        // The API rejects requests that don't look like they come from nba.com
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36",
            ),
        );
        headers.insert(REFERER, HeaderValue::from_static("https://www.nba.com/"));
        headers.insert(ORIGIN, HeaderValue::from_static("https://www.nba.com"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .context("Failed to build stats HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            circuit_breaker: Arc::new(CircuitBreaker::new("nba_stats", breaker)),
            clock: Arc::new(SystemClock),
            directory: Arc::new(RwLock::new(None)),
        })
    }

    /// Clock that picks the season of the player index
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Match against the cached index when it covers `season`
    fn cached_match(&self, season: &str, needle: &str) -> Option<Option<PlayerRef>> {
        let guard = self.directory.read();
        let directory = guard.as_ref().filter(|d| d.season == season)?;
        Some(match_player(&directory.players, needle).cloned())
    }

    fn store_directory(&self, season: String, players: Vec<PlayerRef>) {
        info!("Cached {} players for {}", players.len(), season);
        *self.directory.write() = Some(PlayerDirectory { season, players });
    }

    async fn fetch(&self, endpoint: &str, params: &[(&str, String)]) -> Result<StatsResponse> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!("GET {} {:?}", url, params);

        self.circuit_breaker
            .call(async {
                let resp = self
                    .client
                    .get(&url)
                    .query(params)
                    .send()
                    .await
                    .with_context(|| format!("request to {} failed", endpoint))?;

                let status = resp.status();
                if !status.is_success() {
                    return Err(anyhow!("{} returned HTTP {}", endpoint, status));
                }

                resp.json::<StatsResponse>()
                    .await
                    .with_context(|| format!("{} returned an unexpected body", endpoint))
            })
            .await
    }

    fn season_params(season: &Season) -> Vec<(&'static str, String)> {
        vec![
            ("Season", season.label.clone()),
            ("SeasonType", season.season_type.as_str().to_string()),
        ]
    }

    /// League dashboard endpoints insist on the full filter set
    fn dashboard_params(season: &Season, per_mode: PerMode, measure: MeasureType) -> Vec<(&'static str, String)> {
        let mut params = Self::season_params(season);
        for key in [
            "DateFrom", "DateTo", "GameSegment", "Location", "Outcome", "PORound",
            "PlayerExperience", "PlayerPosition", "SeasonSegment", "StarterBench",
            "VsConference", "VsDivision", "Conference", "Division", "GameScope",
            "ShotClockRange", "TwoWay",
        ] {
            params.push((key, String::new()));
        }
        for key in ["LastNGames", "Month", "OpponentTeamID", "Period", "TeamID"] {
            params.push((key, "0".to_string()));
        }
        params.extend([
            ("LeagueID", "00".to_string()),
            ("MeasureType", measure.as_str().to_string()),
            ("PerMode", per_mode.as_str().to_string()),
            ("PaceAdjust", "N".to_string()),
            ("PlusMinus", "N".to_string()),
            ("Rank", "N".to_string()),
        ]);
        params
    }
}

#[async_trait]
impl StatsDataSource for NbaStatsClient {
    async fn find_player(&self, full_name: &str) -> Result<Option<PlayerRef>> {
        let needle = full_name.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(None);
        }

        let season = season_label(self.clock.today());
        if let Some(found) = self.cached_match(&season, &needle) {
            return Ok(found);
        }

        let resp = self
            .fetch(
                "commonallplayers",
                &[
                    ("LeagueID", "00".to_string()),
                    ("Season", season.clone()),
                    ("IsOnlyCurrentSeason", "0".to_string()),
                ],
            )
            .await?;
        let players = result_set::players(resp.first()?)?;
        let found = match_player(&players, &needle).cloned();
        self.store_directory(season, players);
        Ok(found)
    }

    async fn find_team(&self, abbreviation: &str) -> Result<Option<TeamInfo>> {
        Ok(teams::find_by_abbreviation(abbreviation).map(|t| t.info()))
    }

    async fn player_game_log(
        &self,
        player_id: PlayerId,
        season: &Season,
    ) -> Result<Vec<GameRecord>> {
        let mut params = Self::season_params(season);
        params.push(("PlayerID", player_id.to_string()));
        let resp = self.fetch("playergamelog", &params).await?;
        result_set::game_records(resp.first()?)
    }

    async fn team_game_log(&self, team_id: TeamId, season: &Season) -> Result<Vec<GameRecord>> {
        let mut params = Self::season_params(season);
        params.push(("TeamID", team_id.to_string()));
        params.push(("LeagueID", "00".to_string()));
        let resp = self.fetch("teamgamelog", &params).await?;
        result_set::game_records(resp.first()?)
    }

    async fn league_team_stats(
        &self,
        season: &Season,
        per_mode: PerMode,
        measure: MeasureType,
    ) -> Result<Vec<TeamRating>> {
        let params = Self::dashboard_params(season, per_mode, measure);
        let resp = self.fetch("leaguedashteamstats", &params).await?;
        result_set::team_ratings(resp.first()?)
    }

    async fn league_player_clutch(
        &self,
        season: &Season,
        filters: &ClutchFilters,
    ) -> Result<Vec<ClutchRow>> {
        let mut params = Self::dashboard_params(season, PerMode::PerGame, MeasureType::Base);
        params.extend([
            ("ClutchTime", filters.clutch_time.clone()),
            ("AheadBehind", filters.ahead_behind.clone()),
            ("PointDiff", filters.point_diff.to_string()),
        ]);
        let resp = self.fetch("leaguedashplayerclutch", &params).await?;
        result_set::clutch_rows(resp.first()?)
    }

    async fn day_scoreboard(&self, date: NaiveDate) -> Result<Scoreboard> {
        let resp = self
            .fetch(
                "scoreboardv2",
                &[
                    ("GameDate", date.format("%Y-%m-%d").to_string()),
                    ("LeagueID", "00".to_string()),
                    ("DayOffset", "0".to_string()),
                ],
            )
            .await?;
        Ok(Scoreboard {
            headers: result_set::game_headers(resp.table("GameHeader")?)?,
            line_scores: result_set::line_scores(resp.table("LineScore")?)?,
        })
    }

    async fn play_by_play(&self, game_id: &str) -> Result<Vec<PlayEvent>> {
        let resp = self
            .fetch(
                "playbyplayv2",
                &[
                    ("GameID", game_id.to_string()),
                    ("StartPeriod", "0".to_string()),
                    ("EndPeriod", "10".to_string()),
                ],
            )
            .await?;
        result_set::play_events(resp.table("PlayByPlay")?)
    }

    async fn advanced_boxscore(&self, game_id: &str) -> Result<Vec<TeamAdvancedRow>> {
        let resp = self
            .fetch(
                "boxscoreadvancedv2",
                &[
                    ("GameID", game_id.to_string()),
                    ("StartPeriod", "0".to_string()),
                    ("EndPeriod", "10".to_string()),
                    ("StartRange", "0".to_string()),
                    ("EndRange", "0".to_string()),
                    ("RangeType", "0".to_string()),
                ],
            )
            .await?;
        result_set::team_advanced_rows(resp.table("TeamStats")?)
    }

    fn provider_name(&self) -> &str {
        "nba_stats"
    }
}

/// Exact name, then substring, then the closest Jaro-Winkler match
fn match_player<'a>(players: &'a [PlayerRef], needle: &str) -> Option<&'a PlayerRef> {
    if let Some(exact) = players.iter().find(|p| p.full_name.to_lowercase() == needle) {
        return Some(exact);
    }
    if let Some(partial) = players
        .iter()
        .find(|p| p.full_name.to_lowercase().contains(needle))
    {
        return Some(partial);
    }

    players
        .iter()
        .map(|p| (p, strsim::jaro_winkler(&p.full_name.to_lowercase(), needle)))
        .filter(|(_, score)| *score >= FUZZY_NAME_THRESHOLD)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(p, _)| p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SeasonType;
    use crate::season::FixedClock;

    fn roster() -> Vec<PlayerRef> {
        vec![
            PlayerRef { id: 2544, full_name: "LeBron James".to_string() },
            PlayerRef { id: 1628369, full_name: "Jayson Tatum".to_string() },
            PlayerRef { id: 203999, full_name: "Nikola Jokic".to_string() },
        ]
    }

    #[test]
    fn test_match_player_strategies() {
        let players = roster();
        assert_eq!(match_player(&players, "lebron james").unwrap().id, 2544);
        assert_eq!(match_player(&players, "tatum").unwrap().id, 1628369);
        assert_eq!(match_player(&players, "nikola jokicc").unwrap().id, 203999);
        assert!(match_player(&players, "michael jordan").is_none());
    }

    #[test]
    fn test_dashboard_params() {
        let season = Season::new("2024-25", SeasonType::Playoffs);
        let params = NbaStatsClient::dashboard_params(&season, PerMode::PerGame, MeasureType::Advanced);
        let get = |k: &str| params.iter().find(|(key, _)| *key == k).map(|(_, v)| v.as_str());
        assert_eq!(get("Season"), Some("2024-25"));
        assert_eq!(get("SeasonType"), Some("Playoffs"));
        assert_eq!(get("MeasureType"), Some("Advanced"));
        assert_eq!(get("PerMode"), Some("PerGame"));
        assert_eq!(get("LastNGames"), Some("0"));
    }

    #[tokio::test]
    async fn test_find_player_served_from_directory() {
        // Nothing listens on the discard port, so any fetch would fail
        let client = NbaStatsClient::with_config(
            "http://127.0.0.1:9/stats",
            Duration::from_secs(1),
            CircuitBreakerConfig::default(),
        )
        .unwrap()
        .with_clock(Arc::new(FixedClock(NaiveDate::from_ymd_opt(2025, 2, 1).unwrap())));
        client.store_directory("2024-25".to_string(), roster());

        for _ in 0..3 {
            let found = client.find_player("LeBron James").await.unwrap();
            assert_eq!(found.map(|p| p.id), Some(2544));
        }
        assert!(client.find_player("Michael Jordan").await.unwrap().is_none());
        assert!(client.cached_match("2025-26", "lebron james").is_none());
    }

    #[test]
    fn test_client_debug_shows_circuit() {
        let client = NbaStatsClient::new().unwrap();
        let dbg = format!("{:?}", client);
        assert!(dbg.contains("Closed"));
        assert!(dbg.contains("stats.nba.com"));
    }
}
