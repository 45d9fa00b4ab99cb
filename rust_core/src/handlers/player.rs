//! Single-entity player lookups: search, momentum, risk, rising star.

use super::{HandlerContext, IntentHandler};
use crate::classifier::{Command, Intent};
use crate::error::HandlerResult;
use crate::metrics::{self, MomentumLabel, RiskBucket};
use crate::models::{ResponseChunk, StatCode};
use async_trait::async_trait;

/// Points delta over season average that counts as a surge
pub const RISING_STAR_MARGIN: f64 = 5.0;

const RECENT_GAMES: usize = 5;
const RISK_GAMES: usize = 10;

pub struct SearchPlayerHandler;

#[async_trait]
impl IntentHandler for SearchPlayerHandler {
    fn intent(&self) -> Intent {
        Intent::SearchPlayer
    }

    async fn handle(&self, ctx: &HandlerContext, cmd: &Command) -> HandlerResult<ResponseChunk> {
        let (player, log) = ctx
            .lookup_player_log(cmd.player()?, "searching player")
            .await?;
        let window = log.window(RECENT_GAMES);

        let mut text = format!(
            "📊 Last {} Games for {} ({}):\n",
            window.len(),
            player.full_name,
            ctx.season().label
        );
        for game in window {
            text.push_str(&format!(
                "{}: {:.0} pts, {:.0} ast, {:.0} reb\n",
                game.date.format("%b %d, %Y"),
                game.points,
                game.assists,
                game.rebounds
            ));
        }
        text.push_str(&format!(
            "\n➕ Avg Assists (last {}): {:.1}",
            window.len(),
            metrics::mean(window, StatCode::Assists)
        ));

        Ok(ResponseChunk::new(text))
    }
}

pub struct MomentumRatingHandler;

#[async_trait]
impl IntentHandler for MomentumRatingHandler {
    fn intent(&self) -> Intent {
        Intent::MomentumRating
    }

    async fn handle(&self, ctx: &HandlerContext, cmd: &Command) -> HandlerResult<ResponseChunk> {
        let (player, log) = ctx
            .lookup_player_log(cmd.player()?, "rating momentum")
            .await?;
        let score = metrics::composite_score(
            log.window(RECENT_GAMES),
            &[StatCode::Points, StatCode::Rebounds, StatCode::Assists],
        );

        Ok(ResponseChunk::new(format!(
            "📈 Momentum Rating for {}:\n- Avg (PTS+REB+AST): {:.1}\n- Rating: {}",
            player.full_name,
            score,
            MomentumLabel::from_score(score).label()
        )))
    }
}

pub struct RiskIndexHandler;

#[async_trait]
impl IntentHandler for RiskIndexHandler {
    fn intent(&self) -> Intent {
        Intent::RiskIndex
    }

    async fn handle(&self, ctx: &HandlerContext, cmd: &Command) -> HandlerResult<ResponseChunk> {
        let (player, log) = ctx
            .lookup_player_log(cmd.player()?, "computing risk index")
            .await?;
        let window = log.window(RISK_GAMES);
        let std_dev = metrics::volatility(window, StatCode::Points);

        Ok(ResponseChunk::new(format!(
            "🎯 Risk Index for {} ({}):\nSTD DEV (last {} games): {:.1}\nRating: {}",
            player.full_name,
            ctx.season().label,
            window.len(),
            std_dev,
            RiskBucket::from_std_dev(std_dev).label()
        )))
    }
}

pub struct RisingStarHandler;

#[async_trait]
impl IntentHandler for RisingStarHandler {
    fn intent(&self) -> Intent {
        Intent::RisingStar
    }

    async fn handle(&self, ctx: &HandlerContext, cmd: &Command) -> HandlerResult<ResponseChunk> {
        let (player, log) = ctx
            .lookup_player_log(cmd.player()?, "checking rising star")
            .await?;
        let delta = metrics::trend_delta(log.all(), StatCode::Points, RECENT_GAMES);

        let text = if delta >= RISING_STAR_MARGIN {
            format!(
                "🚀 Rising Star Alert: {} averaging +{:.1} PPG over season average!",
                player.full_name, delta
            )
        } else {
            format!(
                "ℹ️ {}'s recent PPG change: {:+.1}, not a major surge.",
                player.full_name, delta
            )
        };
        Ok(ResponseChunk::new(text))
    }
}
