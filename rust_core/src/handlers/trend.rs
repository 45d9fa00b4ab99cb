//! Parameterized prop checks: player + stat + line.
//!
//! Stat codes are validated by the classifier, so an unknown code never
//! reaches these handlers and nothing is fetched for it.

use super::{HandlerContext, IntentHandler};
use crate::classifier::{Command, Intent};
use crate::error::HandlerResult;
use crate::metrics::{self, RiskBucket};
use crate::models::{GameRecord, ResponseChunk, StatCode};
use async_trait::async_trait;

const TREND_GAMES: usize = 5;

/// Roughly a 30-day lookback
const CONSISTENCY_GAMES: usize = 10;

fn list_values(window: &[GameRecord], stat: StatCode) -> String {
    window
        .iter()
        .map(|g| format!("{:.0}", g.stat(stat)))
        .collect::<Vec<_>>()
        .join(", ")
}

pub struct TrendPlayerHandler;

#[async_trait]
impl IntentHandler for TrendPlayerHandler {
    fn intent(&self) -> Intent {
        Intent::TrendPlayer
    }

    async fn handle(&self, ctx: &HandlerContext, cmd: &Command) -> HandlerResult<ResponseChunk> {
        let prop = cmd.prop()?;
        let (player, log) = ctx.lookup_player_log(&prop.player, "checking trend").await?;
        let window = log.window(TREND_GAMES);
        let hr = metrics::hit_rate(window, prop.stat, prop.line);

        Ok(ResponseChunk::new(format!(
            "📈 {} {} vs {}:\nHit {}/{} games ({:.0}%)\n({})",
            player.full_name,
            prop.stat,
            prop.line,
            hr.hits,
            hr.games,
            hr.pct,
            list_values(window, prop.stat)
        )))
    }
}

pub struct ConsistencyPlayerHandler;

#[async_trait]
impl IntentHandler for ConsistencyPlayerHandler {
    fn intent(&self) -> Intent {
        Intent::ConsistencyPlayer
    }

    async fn handle(&self, ctx: &HandlerContext, cmd: &Command) -> HandlerResult<ResponseChunk> {
        let prop = cmd.prop()?;
        let (player, log) = ctx
            .lookup_player_log(&prop.player, "checking consistency")
            .await?;
        let window = log.window(CONSISTENCY_GAMES);
        let hr = metrics::hit_rate(window, prop.stat, prop.line);
        let std_dev = metrics::volatility(window, prop.stat);

        Ok(ResponseChunk::new(format!(
            "🧮 Consistency for {} {} over {} (last {} games):\n\
             Hit {}/{} ({:.0}%)\n\
             Avg: {:.1} | STD DEV: {:.1}\n\
             Volatility: {}",
            player.full_name,
            prop.stat,
            prop.line,
            hr.games,
            hr.hits,
            hr.games,
            hr.pct,
            metrics::mean(window, prop.stat),
            std_dev,
            RiskBucket::from_std_dev(std_dev).label()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::classifier::classify;
    use crate::models::{Season, SeasonType};
    use crate::providers::InMemoryStatsSource;
    use std::sync::Arc;

    fn source() -> Arc<InMemoryStatsSource> {
        Arc::new(InMemoryStatsSource::new().with_player(
            2544,
            "LeBron James",
            points_log(&[30.0, 25.0, 28.0, 22.0, 35.0, 10.0, 12.0]),
        ))
    }

    #[tokio::test]
    async fn test_trend_player_hit_rate() {
        let ctx = context(source(), date(2025, 2, 1));
        let cmd = classify("trend player LeBron James PTS 25").unwrap();
        let chunk = TrendPlayerHandler.handle(&ctx, &cmd).await.unwrap();
        assert_eq!(
            chunk.text,
            "📈 LeBron James PTS vs 25:\nHit 3/5 games (60%)\n(30, 25, 28, 22, 35)"
        );
    }

    #[tokio::test]
    async fn test_consistency_uses_ten_game_window() {
        let ctx = context(source(), date(2025, 2, 1));
        let cmd = classify("consistency player LeBron James PTS 24.5").unwrap();
        let chunk = ConsistencyPlayerHandler.handle(&ctx, &cmd).await.unwrap();
        // only seven games on record
        assert!(chunk.text.contains("(last 7 games)"));
        assert!(chunk.text.contains("Hit 4/7"));
        assert!(chunk.text.contains("Volatility: 🟡 Medium Risk"));
    }

    #[tokio::test]
    async fn test_playoff_months_request_playoffs() {
        let source = source();
        let ctx = context(source.clone(), date(2025, 4, 20));
        let cmd = classify("trend player LeBron James AST 5.5").unwrap();
        TrendPlayerHandler.handle(&ctx, &cmd).await.unwrap();

        let ctx = context(source.clone(), date(2024, 11, 5));
        TrendPlayerHandler.handle(&ctx, &cmd).await.unwrap();

        assert_eq!(
            source.requested_seasons(),
            vec![
                Season::new("2024-25", SeasonType::Playoffs),
                Season::new("2023-24", SeasonType::RegularSeason),
            ]
        );
    }
}
