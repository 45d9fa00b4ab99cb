//! Tabular response adapter.
//!
//! The stats API answers with `{"resultSets": [{name, headers, rowSet}]}`.
//! Every table is turned into typed records here and nowhere else, so
//! handlers never touch column names.

use crate::models::{
    ClutchRow, GameHeader, GameRecord, LineScore, PlayEvent, TeamAdvancedRow, TeamRating,
};
use crate::providers::PlayerRef;
use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
pub struct StatsResponse {
    #[serde(rename = "resultSets", alias = "resultSet")]
    pub result_sets: Vec<ResultSet>,
}

impl StatsResponse {
    /// Table by name
    pub fn table(&self, name: &str) -> Result<&ResultSet> {
        self.result_sets
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| anyhow!("result set '{}' missing from response", name))
    }

    /// First table, for endpoints returning a single set
    pub fn first(&self) -> Result<&ResultSet> {
        self.result_sets
            .first()
            .ok_or_else(|| anyhow!("response contained no result sets"))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResultSet {
    pub name: String,
    pub headers: Vec<String>,
    #[serde(rename = "rowSet")]
    pub rows: Vec<Vec<Value>>,
}

impl ResultSet {
    fn column(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| anyhow!("column '{}' missing from result set '{}'", name, self.name))
    }

    fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }

    /// Convert every row with `f`
    pub fn records<T>(&self, f: impl Fn(&Row<'_>) -> Result<T>) -> Result<Vec<T>> {
        self.rows
            .iter()
            .enumerate()
            .map(|(i, values)| {
                f(&Row { set: self, values })
                    .with_context(|| format!("row {} of result set '{}'", i, self.name))
            })
            .collect()
    }
}

/// Borrowed view of one row
pub struct Row<'a> {
    set: &'a ResultSet,
    values: &'a [Value],
}

impl<'a> Row<'a> {
    fn value(&self, column: &str) -> Result<&'a Value> {
        let idx = self.set.column(column)?;
        self.values
            .get(idx)
            .ok_or_else(|| anyhow!("row is shorter than header for '{}'", column))
    }

    pub fn opt_str(&self, column: &str) -> Result<Option<String>> {
        Ok(match self.value(column)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        })
    }

    pub fn str(&self, column: &str) -> Result<String> {
        self.opt_str(column)?
            .ok_or_else(|| anyhow!("column '{}' is null", column))
    }

    pub fn opt_f64(&self, column: &str) -> Result<Option<f64>> {
        Ok(match self.value(column)? {
            Value::Null => None,
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        })
    }

    /// Numeric column; nulls read as zero, as box scores leave DNP cells empty
    pub fn f64(&self, column: &str) -> Result<f64> {
        Ok(self.opt_f64(column)?.unwrap_or(0.0))
    }

    pub fn u64(&self, column: &str) -> Result<u64> {
        match self.value(column)? {
            Value::Number(n) => n
                .as_u64()
                .or_else(|| n.as_f64().map(|f| f as u64))
                .ok_or_else(|| anyhow!("column '{}' is not an unsigned integer", column)),
            Value::String(s) => s
                .trim()
                .parse::<u64>()
                .with_context(|| format!("column '{}' is not an unsigned integer", column)),
            other => Err(anyhow!("column '{}' has unexpected value {}", column, other)),
        }
    }
}

/// Game dates arrive as "APR 13, 2025", "Apr 13, 2025" or ISO timestamps
pub fn parse_game_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%b %d, %Y")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .or_else(|_| NaiveDate::parse_from_str(raw.get(..10).unwrap_or(raw), "%Y-%m-%d"))
        .with_context(|| format!("unparseable game date '{}'", raw))
}

// ============================================================================
// Table -> record conversions
// ============================================================================

/// Player or team game log (`PlayerGameLog` / `TeamGameLog`)
pub fn game_records(set: &ResultSet) -> Result<Vec<GameRecord>> {
    let game_id_col = if set.has_column("Game_ID") { "Game_ID" } else { "GAME_ID" };
    let has_poss = set.has_column("POSS");

    set.records(|row| {
        let win = match row.opt_str("WL")?.as_deref() {
            Some("W") => Some(true),
            Some("L") => Some(false),
            _ => None,
        };
        Ok(GameRecord {
            game_id: row.str(game_id_col)?,
            date: parse_game_date(&row.str("GAME_DATE")?)?,
            matchup: row.opt_str("MATCHUP")?.unwrap_or_default(),
            points: row.f64("PTS")?,
            rebounds: row.f64("REB")?,
            assists: row.f64("AST")?,
            threes_made: row.f64("FG3M")?,
            win,
            possessions: if has_poss { row.opt_f64("POSS")? } else { None },
        })
    })
}

/// `CommonAllPlayers` rows
pub fn players(set: &ResultSet) -> Result<Vec<PlayerRef>> {
    set.records(|row| {
        Ok(PlayerRef {
            id: row.u64("PERSON_ID")?,
            full_name: row.str("DISPLAY_FIRST_LAST")?,
        })
    })
}

/// `LeagueDashTeamStats` rows (Advanced measure)
pub fn team_ratings(set: &ResultSet) -> Result<Vec<TeamRating>> {
    set.records(|row| {
        Ok(TeamRating {
            team_id: row.u64("TEAM_ID")?,
            team_name: row.str("TEAM_NAME")?,
            offensive_rating: row.f64("OFF_RATING")?,
            defensive_rating: row.f64("DEF_RATING")?,
            pace: row.f64("PACE")?,
        })
    })
}

/// `LeagueDashPlayerClutch` rows
pub fn clutch_rows(set: &ResultSet) -> Result<Vec<ClutchRow>> {
    set.records(|row| {
        Ok(ClutchRow {
            player_name: row.str("PLAYER_NAME")?,
            team_abbreviation: row.opt_str("TEAM_ABBREVIATION")?.unwrap_or_default(),
            games_played: row.u64("GP")? as u32,
            points: row.f64("PTS")?,
            plus_minus: row.f64("PLUS_MINUS")?,
        })
    })
}

/// `GameHeader` table of the day scoreboard
pub fn game_headers(set: &ResultSet) -> Result<Vec<GameHeader>> {
    set.records(|row| {
        Ok(GameHeader {
            game_id: row.str("GAME_ID")?,
            status_text: row.opt_str("GAME_STATUS_TEXT")?.unwrap_or_default(),
            home_team_id: row.u64("HOME_TEAM_ID")?,
            visitor_team_id: row.u64("VISITOR_TEAM_ID")?,
        })
    })
}

/// `LineScore` table of the day scoreboard
pub fn line_scores(set: &ResultSet) -> Result<Vec<LineScore>> {
    set.records(|row| {
        Ok(LineScore {
            game_id: row.str("GAME_ID")?,
            team_id: row.u64("TEAM_ID")?,
            team_abbreviation: row.str("TEAM_ABBREVIATION")?,
            points: row.opt_f64("PTS")?.map(|p| p as u32),
        })
    })
}

/// `PlayByPlay` rows; the first non-empty description column wins
pub fn play_events(set: &ResultSet) -> Result<Vec<PlayEvent>> {
    set.records(|row| {
        let description = ["HOMEDESCRIPTION", "VISITORDESCRIPTION", "NEUTRALDESCRIPTION"]
            .iter()
            .filter_map(|col| row.opt_str(col).ok().flatten())
            .find(|d| !d.trim().is_empty())
            .unwrap_or_default();
        Ok(PlayEvent {
            event_num: row.u64("EVENTNUM")? as u32,
            period: row.u64("PERIOD")? as u8,
            clock: row.opt_str("PCTIMESTRING")?.unwrap_or_default(),
            description,
            score: row.opt_str("SCORE")?,
        })
    })
}

/// `TeamStats` table of the advanced box score
pub fn team_advanced_rows(set: &ResultSet) -> Result<Vec<TeamAdvancedRow>> {
    set.records(|row| {
        Ok(TeamAdvancedRow {
            team_abbreviation: row.str("TEAM_ABBREVIATION")?,
            offensive_rating: row.f64("OFF_RATING")?,
            defensive_rating: row.f64("DEF_RATING")?,
            pace: row.f64("PACE")?,
            effective_fg_pct: row.f64("EFG_PCT")?,
            true_shooting_pct: row.f64("TS_PCT")?,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(value: serde_json::Value) -> StatsResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_player_game_log_conversion() {
        let resp = response(json!({
            "resultSets": [{
                "name": "PlayerGameLog",
                "headers": ["SEASON_ID", "Player_ID", "Game_ID", "GAME_DATE", "MATCHUP", "WL", "FG3M", "REB", "AST", "PTS"],
                "rowSet": [
                    ["22024", 2544, "0022401185", "APR 13, 2025", "LAL vs. POR", "W", 2, 8, 11, 28],
                    ["22024", 2544, "0022401170", "Apr 11, 2025", "LAL @ HOU", "L", 1, null, 7, 21]
                ]
            }]
        }));
        let games = game_records(resp.first().unwrap()).unwrap();
        assert_eq!(games.len(), 2);
        assert_eq!(games[0].date, NaiveDate::from_ymd_opt(2025, 4, 13).unwrap());
        assert_eq!(games[0].points, 28.0);
        assert_eq!(games[0].win, Some(true));
        assert_eq!(games[1].rebounds, 0.0);
        assert_eq!(games[1].win, Some(false));
        assert_eq!(games[1].possessions, None);
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let resp = response(json!({
            "resultSets": [{"name": "LeagueDashTeamStats", "headers": ["TEAM_ID"], "rowSet": [[1]]}]
        }));
        let err = team_ratings(resp.table("LeagueDashTeamStats").unwrap()).unwrap_err();
        assert!(format!("{:#}", err).contains("TEAM_NAME"));
        assert!(resp.table("GameHeader").is_err());
    }

    #[test]
    fn test_scoreboard_tables() {
        let resp = response(json!({
            "resultSets": [
                {"name": "GameHeader",
                 "headers": ["GAME_DATE_EST", "GAME_ID", "GAME_STATUS_TEXT", "HOME_TEAM_ID", "VISITOR_TEAM_ID"],
                 "rowSet": [["2025-01-10T00:00:00", "0022400555", "Final", 1610612738, 1610612747]]},
                {"name": "LineScore",
                 "headers": ["GAME_ID", "TEAM_ID", "TEAM_ABBREVIATION", "PTS"],
                 "rowSet": [["0022400555", 1610612738, "BOS", 118], ["0022400555", 1610612747, "LAL", null]]}
            ]
        }));
        let headers = game_headers(resp.table("GameHeader").unwrap()).unwrap();
        assert!(headers[0].is_final());
        let lines = line_scores(resp.table("LineScore").unwrap()).unwrap();
        assert_eq!(lines[0].points, Some(118));
        assert_eq!(lines[1].points, None);
    }

    #[test]
    fn test_play_event_description_fallback() {
        let resp = response(json!({
            "resultSets": [{
                "name": "PlayByPlay",
                "headers": ["EVENTNUM", "PERIOD", "PCTIMESTRING", "HOMEDESCRIPTION", "NEUTRALDESCRIPTION", "VISITORDESCRIPTION", "SCORE"],
                "rowSet": [[7, 1, "11:02", null, null, "Tatum 26' 3PT Jump Shot", "0 - 3"]]
            }]
        }));
        let plays = play_events(resp.first().unwrap()).unwrap();
        assert_eq!(plays[0].description, "Tatum 26' 3PT Jump Shot");
        assert_eq!(plays[0].score.as_deref(), Some("0 - 3"));
    }

    #[test]
    fn test_parse_game_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 10, 22).unwrap();
        assert_eq!(parse_game_date("OCT 22, 2024").unwrap(), expected);
        assert_eq!(parse_game_date("2024-10-22").unwrap(), expected);
        assert_eq!(parse_game_date("2024-10-22T00:00:00").unwrap(), expected);
        assert!(parse_game_date("yesterday").is_err());
    }
}
