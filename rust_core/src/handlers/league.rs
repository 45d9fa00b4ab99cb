//! League and day-wide scans over scoreboards and season tables.

use super::{HandlerContext, IntentHandler};
use crate::classifier::{Command, Intent};
use crate::error::{HandlerResult, QueryError};
use crate::metrics::{self, GameLog};
use crate::models::{
    ClutchFilters, ResponseChunk, Scoreboard, StatCode, TeamId, TeamRating, DEFAULT_TEAM_RATING,
};
use crate::providers::{MeasureType, PerMode};
use crate::teams;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, warn};

/// Possessions assumed by the toy simulation
pub const SIMULATED_PACE: f64 = 100.0;

const MOMENTUM_GAMES: usize = 5;
const FATIGUE_WINDOW_NIGHTS: i64 = 4;
const FATIGUE_GAMES: usize = 3;
const CLUTCH_MIN_GAMES: u32 = 5;
const CLUTCH_LIMIT: usize = 5;
const MISMATCH_EDGE: f64 = 3.0;

async fn today_scoreboard(ctx: &HandlerContext, action: &str) -> HandlerResult<Scoreboard> {
    let board = ctx
        .source
        .day_scoreboard(ctx.today())
        .await
        .map_err(QueryError::upstream(action))?;
    if board.is_empty() {
        return Err(QueryError::no_data("No games found for today."));
    }
    Ok(board)
}

async fn advanced_ratings(ctx: &HandlerContext, action: &str) -> HandlerResult<Vec<TeamRating>> {
    ctx.source
        .league_team_stats(&ctx.season(), PerMode::PerGame, MeasureType::Advanced)
        .await
        .map_err(QueryError::upstream(action))
}

fn rating_by_id(ratings: &[TeamRating], team_id: TeamId) -> Option<&TeamRating> {
    ratings.iter().find(|r| r.team_id == team_id)
}

/// Rating row for a free-text team name: full name, nickname or abbreviation
fn rating_by_name<'a>(ratings: &'a [TeamRating], name: &str) -> Option<&'a TeamRating> {
    if let Some(entry) = teams::find_by_name(name) {
        if let Some(rating) = rating_by_id(ratings, entry.id) {
            return Some(rating);
        }
    }
    let needle = name.trim().to_lowercase();
    ratings.iter().find(|r| {
        let team = r.team_name.to_lowercase();
        team == needle || team.ends_with(&format!(" {}", needle))
    })
}

// ============================================================================
// Simulation
// ============================================================================

/// Illustrative final score, not a prediction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulatedGame {
    pub home: String,
    pub away: String,
    pub home_score: u32,
    pub away_score: u32,
}

fn simulated_score(offensive_rating: f64) -> u32 {
    (offensive_rating * SIMULATED_PACE / 100.0).max(0.0) as u32
}

/// Offensive rating x assumed pace, truncated; unknown teams rate 110
pub fn simulate(ratings: &[TeamRating], home: &str, away: &str) -> SimulatedGame {
    let side = |name: &str| match rating_by_name(ratings, name) {
        Some(r) => (r.team_name.clone(), r.offensive_rating),
        None => {
            debug!("No rating for '{}', using {}", name, DEFAULT_TEAM_RATING);
            (name.to_string(), DEFAULT_TEAM_RATING)
        }
    };
    let (home, home_rating) = side(home);
    let (away, away_rating) = side(away);

    SimulatedGame {
        home,
        away,
        home_score: simulated_score(home_rating),
        away_score: simulated_score(away_rating),
    }
}

pub struct SimulateGameHandler;

#[async_trait]
impl IntentHandler for SimulateGameHandler {
    fn intent(&self) -> Intent {
        Intent::SimulateGame
    }

    async fn handle(&self, ctx: &HandlerContext, cmd: &Command) -> HandlerResult<ResponseChunk> {
        let (home, away) = cmd.matchup()?;
        let ratings = advanced_ratings(ctx, "simulating game").await?;
        let game = simulate(&ratings, home, away);

        Ok(ResponseChunk::new(format!(
            "🎲 Simulated Final:\n{} {} – {} {}\n(illustrative estimate at {} possessions, not a prediction)",
            game.home, game.home_score, game.away, game.away_score, SIMULATED_PACE
        )))
    }
}

// ============================================================================
// Team momentum
// ============================================================================

pub struct TeamMomentumHandler;

#[async_trait]
impl IntentHandler for TeamMomentumHandler {
    fn intent(&self) -> Intent {
        Intent::TeamMomentum
    }

    async fn handle(&self, ctx: &HandlerContext, cmd: &Command) -> HandlerResult<ResponseChunk> {
        let abbreviation = cmd.team()?;
        let action = "checking team momentum";
        let team = ctx
            .source
            .find_team(abbreviation)
            .await
            .map_err(QueryError::upstream(action))?
            .ok_or_else(|| QueryError::not_found(format!("Couldn't find team '{}'.", abbreviation)))?;

        let season = ctx.season();
        let games = ctx
            .source
            .team_game_log(team.id, &season)
            .await
            .map_err(QueryError::upstream(action))?;
        if games.is_empty() {
            return Err(QueryError::no_data(format!(
                "No games found for {} in {}.",
                team.full_name, season.label
            )));
        }

        let log = GameLog::new(games);
        let window = log.window(MOMENTUM_GAMES);
        let wins = window.iter().filter(|g| g.win == Some(true)).count();
        let losses = window.iter().filter(|g| g.win == Some(false)).count();
        let label = if wins >= 4 {
            "🔥 Hot"
        } else if wins >= 2 {
            "➖ Steady"
        } else {
            "🧊 Cold"
        };

        Ok(ResponseChunk::new(format!(
            "🏀 Team Momentum for {} ({}):\n\
             - Last {}: {}-{}\n\
             - Avg Points: {:.1}\n\
             - Trend vs Season: {:+.1} PPG\n\
             - Rating: {}",
            team.full_name,
            season.label,
            window.len(),
            wins,
            losses,
            metrics::mean(window, StatCode::Points),
            metrics::trend_delta(log.all(), StatCode::Points, MOMENTUM_GAMES),
            label
        )))
    }
}

// ============================================================================
// Scoreboard scans
// ============================================================================

pub struct HotStreaksHandler;

#[async_trait]
impl IntentHandler for HotStreaksHandler {
    fn intent(&self) -> Intent {
        Intent::HotStreaks
    }

    async fn handle(&self, ctx: &HandlerContext, _cmd: &Command) -> HandlerResult<ResponseChunk> {
        let board = today_scoreboard(ctx, "fetching scores").await?;

        let mut lines = Vec::new();
        for header in board.headers.iter().filter(|h| h.is_final()) {
            let home = board.line_for(&header.game_id, header.home_team_id);
            let away = board.line_for(&header.game_id, header.visitor_team_id);
            match (home, away) {
                (Some(home), Some(away)) => match (home.points, away.points) {
                    (Some(hp), Some(ap)) => lines.push(format!(
                        "{} {} – {} {}",
                        home.team_abbreviation, hp, away.team_abbreviation, ap
                    )),
                    _ => debug!("Game {} final without points", header.game_id),
                },
                _ => warn!("Game {} has no line score", header.game_id),
            }
        }

        if lines.is_empty() {
            return Ok(ResponseChunk::new("⚠️ No games have finished yet today."));
        }
        Ok(ResponseChunk::new(format!(
            "🔥 Today's Final Scores:\n{}",
            lines.join("\n")
        )))
    }
}

pub struct GamePaceHandler;

#[async_trait]
impl IntentHandler for GamePaceHandler {
    fn intent(&self) -> Intent {
        Intent::GamePace
    }

    async fn handle(&self, ctx: &HandlerContext, _cmd: &Command) -> HandlerResult<ResponseChunk> {
        let action = "projecting game pace";
        let board = today_scoreboard(ctx, action).await?;
        let ratings = advanced_ratings(ctx, action).await?;

        let mut text = String::from("🏎️ Projected Game Pace:\n");
        let mut found = false;
        for header in &board.headers {
            let home = rating_by_id(&ratings, header.home_team_id);
            let away = rating_by_id(&ratings, header.visitor_team_id);
            if let (Some(home), Some(away)) = (home, away) {
                text.push_str(&format!(
                    "{} vs {}: {:.1} possessions\n",
                    teams::abbreviation_for(header.home_team_id),
                    teams::abbreviation_for(header.visitor_team_id),
                    (home.pace + away.pace) / 2.0
                ));
                found = true;
            }
        }

        if !found {
            return Ok(ResponseChunk::new("⚠️ No pace data available for today's games."));
        }
        Ok(ResponseChunk::new(text.trim_end()))
    }
}

pub struct BackToBackHandler;

#[async_trait]
impl IntentHandler for BackToBackHandler {
    fn intent(&self) -> Intent {
        Intent::BackToBack
    }

    async fn handle(&self, ctx: &HandlerContext, _cmd: &Command) -> HandlerResult<ResponseChunk> {
        let action = "checking back-to-backs";
        let today = today_scoreboard(ctx, action).await?;
        let yesterday = ctx
            .source
            .day_scoreboard(yesterday_of(ctx.today()))
            .await
            .map_err(QueryError::upstream(action))?;

        let played_yesterday = yesterday.team_ids();
        let tired: Vec<TeamId> = today
            .team_ids()
            .into_iter()
            .filter(|id| played_yesterday.binary_search(id).is_ok())
            .collect();

        if tired.is_empty() {
            return Ok(ResponseChunk::new("✅ No back-to-back concerns for today."));
        }
        let mut text = String::from("⚠️ Back-to-Back Teams:\n");
        for id in tired {
            text.push_str(&format!("- {} played yesterday!\n", teams::abbreviation_for(id)));
        }
        Ok(ResponseChunk::new(text.trim_end()))
    }
}

fn yesterday_of(today: NaiveDate) -> NaiveDate {
    today.pred_opt().unwrap_or(today)
}

pub struct FatigueWatchHandler;

#[async_trait]
impl IntentHandler for FatigueWatchHandler {
    fn intent(&self) -> Intent {
        Intent::FatigueWatch
    }

    async fn handle(&self, ctx: &HandlerContext, _cmd: &Command) -> HandlerResult<ResponseChunk> {
        let action = "checking fatigue";
        let board = today_scoreboard(ctx, action).await?;
        let season = ctx.season();
        let today = ctx.today();
        let yesterday = yesterday_of(today);
        let window_start = today - chrono::Duration::days(FATIGUE_WINDOW_NIGHTS - 1);

        let mut text = String::from("😮‍💨 Fatigue Watch:\n");
        let mut found = false;
        for team_id in board.team_ids() {
            let games = ctx
                .source
                .team_game_log(team_id, &season)
                .await
                .map_err(QueryError::upstream(action))?;

            let recent = games
                .iter()
                .filter(|g| g.date >= window_start && g.date <= today)
                .count();
            let played_yesterday = games.iter().any(|g| g.date == yesterday);

            let mut reasons = Vec::new();
            if recent >= FATIGUE_GAMES {
                reasons.push(format!("{} games in {} nights", recent, FATIGUE_WINDOW_NIGHTS));
            }
            if played_yesterday {
                reasons.push("played yesterday".to_string());
            }
            if !reasons.is_empty() {
                text.push_str(&format!(
                    "- {}: {}\n",
                    teams::abbreviation_for(team_id),
                    reasons.join(", ")
                ));
                found = true;
            }
        }

        if !found {
            return Ok(ResponseChunk::new("✅ No fatigue concerns for today's slate."));
        }
        Ok(ResponseChunk::new(text.trim_end()))
    }
}

pub struct ClutchLeadersHandler;

#[async_trait]
impl IntentHandler for ClutchLeadersHandler {
    fn intent(&self) -> Intent {
        Intent::ClutchLeaders
    }

    async fn handle(&self, ctx: &HandlerContext, _cmd: &Command) -> HandlerResult<ResponseChunk> {
        let season = ctx.season();
        let filters = ClutchFilters::default();
        let rows = ctx
            .source
            .league_player_clutch(&season, &filters)
            .await
            .map_err(QueryError::upstream("fetching clutch stats"))?;
        if rows.is_empty() {
            return Err(QueryError::no_data(format!(
                "No clutch data available for {}.",
                season.label
            )));
        }

        let mut leaders: Vec<_> = rows
            .into_iter()
            .filter(|r| r.games_played >= CLUTCH_MIN_GAMES)
            .collect();
        if leaders.is_empty() {
            return Ok(ResponseChunk::new(format!(
                "🤷 No players with {}+ clutch games yet.",
                CLUTCH_MIN_GAMES
            )));
        }
        leaders.sort_by(|a, b| b.points.total_cmp(&a.points));
        leaders.truncate(CLUTCH_LIMIT);

        let mut text = format!("🧊 Clutch Leaders ({}):\n", filters.clutch_time);
        for (i, row) in leaders.iter().enumerate() {
            text.push_str(&format!(
                "{}. {} ({}): {:.1} pts, {:+.1} +/- in {} games\n",
                i + 1,
                row.player_name,
                row.team_abbreviation,
                row.points,
                row.plus_minus,
                row.games_played
            ));
        }
        Ok(ResponseChunk::new(text.trim_end()))
    }
}

pub struct MismatchRatingsHandler;

#[async_trait]
impl IntentHandler for MismatchRatingsHandler {
    fn intent(&self) -> Intent {
        Intent::MismatchRatings
    }

    async fn handle(&self, ctx: &HandlerContext, _cmd: &Command) -> HandlerResult<ResponseChunk> {
        let action = "rating mismatches";
        let board = today_scoreboard(ctx, action).await?;
        let ratings = advanced_ratings(ctx, action).await?;

        let ortg_drtg = |id: TeamId| {
            rating_by_id(&ratings, id)
                .map(|r| (r.offensive_rating, r.defensive_rating))
                .unwrap_or((DEFAULT_TEAM_RATING, DEFAULT_TEAM_RATING))
        };

        let mut text = String::from("⚔️ Mismatch Ratings:\n");
        let mut found = false;
        for header in &board.headers {
            let (home_ortg, home_drtg) = ortg_drtg(header.home_team_id);
            let (away_ortg, away_drtg) = ortg_drtg(header.visitor_team_id);
            let edge = (home_ortg - away_drtg) - (away_ortg - home_drtg);
            if edge.abs() < MISMATCH_EDGE {
                continue;
            }

            let home = teams::abbreviation_for(header.home_team_id);
            let away = teams::abbreviation_for(header.visitor_team_id);
            let favoured = if edge > 0.0 { &home } else { &away };
            text.push_str(&format!(
                "- {} vs {}: net edge {:+.1}, favours {}\n",
                home, away, edge, favoured
            ));
            found = true;
        }

        if !found {
            return Ok(ResponseChunk::new("⚖️ No major mismatches on today's slate."));
        }
        Ok(ResponseChunk::new(text.trim_end()))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::classifier::classify;
    use crate::models::{ClutchRow, GameHeader, GameRecord, LineScore};
    use crate::providers::InMemoryStatsSource;
    use std::sync::Arc;

    const LAL: TeamId = 1610612747;
    const BOS: TeamId = 1610612738;
    const NYK: TeamId = 1610612752;
    const MIA: TeamId = 1610612748;

    fn rating(team_id: TeamId, name: &str, ortg: f64, drtg: f64, pace: f64) -> TeamRating {
        TeamRating {
            team_id,
            team_name: name.to_string(),
            offensive_rating: ortg,
            defensive_rating: drtg,
            pace,
        }
    }

    fn ratings() -> Vec<TeamRating> {
        vec![
            rating(LAL, "Los Angeles Lakers", 114.0, 112.0, 99.0),
            rating(BOS, "Boston Celtics", 118.9, 108.0, 97.0),
            rating(NYK, "New York Knicks", 116.0, 111.0, 96.0),
            rating(MIA, "Miami Heat", 111.0, 112.0, 95.0),
        ]
    }

    fn header(game_id: &str, status: &str, home: TeamId, away: TeamId) -> GameHeader {
        GameHeader {
            game_id: game_id.to_string(),
            status_text: status.to_string(),
            home_team_id: home,
            visitor_team_id: away,
        }
    }

    fn line(game_id: &str, team_id: TeamId, points: Option<u32>) -> LineScore {
        LineScore {
            game_id: game_id.to_string(),
            team_id,
            team_abbreviation: teams::abbreviation_for(team_id),
            points,
        }
    }

    fn today() -> NaiveDate {
        date(2025, 2, 10)
    }

    fn slate() -> Scoreboard {
        Scoreboard {
            headers: vec![
                header("0022400701", "Final", BOS, LAL),
                header("0022400702", "7:30 pm ET", NYK, MIA),
            ],
            line_scores: vec![
                line("0022400701", BOS, Some(121)),
                line("0022400701", LAL, Some(109)),
                line("0022400702", NYK, None),
                line("0022400702", MIA, None),
            ],
        }
    }

    async fn run(source: InMemoryStatsSource, handler: &dyn IntentHandler, query: &str) -> HandlerResult<ResponseChunk> {
        let ctx = context(Arc::new(source), today());
        handler.handle(&ctx, &classify(query).unwrap()).await
    }

    #[test]
    fn test_simulate_known_ratings() {
        let ratings = vec![
            rating(LAL, "Los Angeles Lakers", 114.0, 110.0, 100.0),
            rating(BOS, "Boston Celtics", 118.0, 108.0, 100.0),
        ];
        let game = simulate(&ratings, "Lakers", "Celtics");
        assert_eq!((game.home_score, game.away_score), (114, 118));
        assert_eq!(game.home, "Los Angeles Lakers");
    }

    #[test]
    fn test_simulate_truncates_and_defaults() {
        let game = simulate(&ratings(), "BOS", "Springfield Isotopes");
        assert_eq!(game.home_score, 118);
        assert_eq!(game.away_score, 110);
        assert_eq!(game.away, "Springfield Isotopes");
    }

    #[tokio::test]
    async fn test_simulate_handler() {
        let source = InMemoryStatsSource::new().with_team_ratings(ratings());
        let chunk = run(source, &SimulateGameHandler, "simulate game Lakers vs Knicks")
            .await
            .unwrap();
        assert!(chunk.text.contains("Los Angeles Lakers 114 – New York Knicks 116"));
    }

    #[tokio::test]
    async fn test_team_momentum_hot() {
        let games: Vec<GameRecord> = (1..=8)
            .map(|d| {
                let mut g = game(d, 100.0 + d as f64, 40.0, 25.0, 12.0);
                g.win = Some(d != 5);
                g
            })
            .collect();
        let source = InMemoryStatsSource::new().with_team_log(BOS, games);
        let text = run(source, &TeamMomentumHandler, "team momentum bos")
            .await
            .unwrap()
            .text;
        assert!(text.contains("Boston Celtics"));
        assert!(text.contains("Last 5: 4-1"));
        // last five 106, season 104.5
        assert!(text.contains("Avg Points: 106.0"));
        assert!(text.contains("+1.5 PPG"));
        assert!(text.contains("🔥 Hot"));
    }

    #[tokio::test]
    async fn test_team_momentum_unknown_team() {
        let err = run(InMemoryStatsSource::new(), &TeamMomentumHandler, "team momentum XYZ")
            .await
            .unwrap_err();
        assert_eq!(err.render(), "❌ Couldn't find team 'XYZ'.");
    }

    #[tokio::test]
    async fn test_hot_streaks_joins_line_scores() {
        let source = InMemoryStatsSource::new().with_scoreboard(today(), slate());
        let text = run(source, &HotStreaksHandler, "hot streaks").await.unwrap().text;
        assert_eq!(text, "🔥 Today's Final Scores:\nBOS 121 – LAL 109");
    }

    #[tokio::test]
    async fn test_scoreboard_scans_without_games() {
        let cases: [(&dyn IntentHandler, &str); 5] = [
            (&HotStreaksHandler, "hot streaks"),
            (&GamePaceHandler, "game pace"),
            (&BackToBackHandler, "back to back"),
            (&FatigueWatchHandler, "fatigue"),
            (&MismatchRatingsHandler, "mismatch"),
        ];
        for (handler, query) in cases {
            let err = run(InMemoryStatsSource::new(), handler, query).await.unwrap_err();
            assert_eq!(err.render(), "❌ No games found for today.", "{}", query);
        }
    }

    #[tokio::test]
    async fn test_game_pace_mean_of_teams() {
        let source = InMemoryStatsSource::new()
            .with_scoreboard(today(), slate())
            .with_team_ratings(ratings());
        let text = run(source, &GamePaceHandler, "game pace").await.unwrap().text;
        assert!(text.contains("BOS vs LAL: 98.0 possessions"));
        assert!(text.contains("NYK vs MIA: 95.5 possessions"));
    }

    #[tokio::test]
    async fn test_back_to_back_teams() {
        let yesterday = Scoreboard {
            headers: vec![header("0022400690", "Final", LAL, MIA)],
            line_scores: vec![],
        };
        let source = InMemoryStatsSource::new()
            .with_scoreboard(today(), slate())
            .with_scoreboard(date(2025, 2, 9), yesterday);
        let text = run(source, &BackToBackHandler, "back to back").await.unwrap().text;
        assert!(text.contains("- LAL played yesterday!"));
        assert!(text.contains("- MIA played yesterday!"));
        assert!(!text.contains("BOS"));

        let source = InMemoryStatsSource::new().with_scoreboard(today(), slate());
        let text = run(source, &BackToBackHandler, "back to back").await.unwrap().text;
        assert_eq!(text, "✅ No back-to-back concerns for today.");
    }

    #[tokio::test]
    async fn test_fatigue_watch() {
        let on = |d: u32| GameRecord {
            date: date(2025, 2, d),
            ..game(1, 110.0, 40.0, 25.0, 12.0)
        };
        let source = InMemoryStatsSource::new()
            .with_scoreboard(today(), slate())
            // three games in the four nights ending today
            .with_team_log(BOS, vec![on(7), on(8), on(10), on(1)])
            .with_team_log(NYK, vec![on(9), on(2)])
            .with_team_log(LAL, vec![on(3), on(5)]);
        let text = run(source, &FatigueWatchHandler, "fatigue watch").await.unwrap().text;
        assert!(text.contains("- BOS: 3 games in 4 nights"));
        assert!(text.contains("- NYK: played yesterday"));
        assert!(!text.contains("LAL"));
    }

    #[tokio::test]
    async fn test_clutch_leaders_filter_and_sort() {
        let row = |name: &str, gp: u32, pts: f64| ClutchRow {
            player_name: name.to_string(),
            team_abbreviation: "BOS".to_string(),
            games_played: gp,
            points: pts,
            plus_minus: 1.0,
        };
        let source = InMemoryStatsSource::new().with_clutch(vec![
            row("Small Sample", 2, 9.0),
            row("Second", 10, 3.5),
            row("First", 12, 4.2),
        ]);
        let text = run(source, &ClutchLeadersHandler, "clutch leaders").await.unwrap().text;
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("1. First (BOS): 4.2 pts"));
        assert!(lines[2].starts_with("2. Second"));
    }

    #[tokio::test]
    async fn test_mismatch_edge() {
        let source = InMemoryStatsSource::new()
            .with_scoreboard(today(), slate())
            .with_team_ratings(ratings());
        let text = run(source, &MismatchRatingsHandler, "mismatch").await.unwrap().text;
        // BOS vs LAL: (118.9 - 112) - (114 - 108) = 0.9 -> skipped
        // NYK vs MIA: (116 - 112) - (111 - 111) = 4.0
        assert_eq!(text, "⚔️ Mismatch Ratings:\n- NYK vs MIA: net edge +4.0, favours NYK");
    }
}
