//! Single-game detail: play-by-play and advanced box score.

use super::{HandlerContext, IntentHandler};
use crate::classifier::{Command, Intent};
use crate::error::{HandlerResult, QueryError};
use crate::models::ResponseChunk;
use async_trait::async_trait;

const RECENT_PLAYS: usize = 5;

pub struct RecentPlaysHandler;

#[async_trait]
impl IntentHandler for RecentPlaysHandler {
    fn intent(&self) -> Intent {
        Intent::RecentPlays
    }

    async fn handle(&self, ctx: &HandlerContext, cmd: &Command) -> HandlerResult<ResponseChunk> {
        let game_id = cmd.game_id()?;
        let plays = ctx
            .source
            .play_by_play(game_id)
            .await
            .map_err(QueryError::upstream("fetching plays"))?;
        if plays.is_empty() {
            return Err(QueryError::not_found(format!(
                "Couldn't find plays for game {}.",
                game_id
            )));
        }

        let mut described: Vec<_> = plays
            .iter()
            .filter(|p| !p.description.trim().is_empty())
            .collect();
        described.sort_by_key(|p| p.event_num);

        let mut text = format!("📝 Recent Plays ({}):\n", game_id);
        for play in described.iter().rev().take(RECENT_PLAYS) {
            text.push_str(&format!("Q{} {} {}", play.period, play.clock, play.description));
            if let Some(score) = &play.score {
                text.push_str(&format!(" ({})", score));
            }
            text.push('\n');
        }
        Ok(ResponseChunk::new(text.trim_end()))
    }
}

pub struct AdvancedStatsHandler;

#[async_trait]
impl IntentHandler for AdvancedStatsHandler {
    fn intent(&self) -> Intent {
        Intent::AdvancedStats
    }

    async fn handle(&self, ctx: &HandlerContext, cmd: &Command) -> HandlerResult<ResponseChunk> {
        let game_id = cmd.game_id()?;
        let rows = ctx
            .source
            .advanced_boxscore(game_id)
            .await
            .map_err(QueryError::upstream("fetching advanced stats"))?;
        if rows.is_empty() {
            return Err(QueryError::not_found(format!(
                "Couldn't find a box score for game {}.",
                game_id
            )));
        }

        let mut text = format!("📐 Advanced Stats ({}):\n", game_id);
        for row in &rows {
            text.push_str(&format!(
                "{}: ORtg {:.1} | DRtg {:.1} | Pace {:.1} | eFG% {:.1} | TS% {:.1}\n",
                row.team_abbreviation,
                row.offensive_rating,
                row.defensive_rating,
                row.pace,
                row.effective_fg_pct * 100.0,
                row.true_shooting_pct * 100.0
            ));
        }
        Ok(ResponseChunk::new(text.trim_end()))
    }
}
