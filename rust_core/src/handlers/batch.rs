//! Batch scans over the prop roster.
//!
//! Candidates are looked up sequentially in roster order, and output lines
//! keep that order unless a handler sorts explicitly. A candidate that fails
//! to resolve is skipped; the scan only fails when every lookup hit an
//! upstream error.

use super::{HandlerContext, IntentHandler};
use crate::classifier::{Command, Intent};
use crate::error::{HandlerResult, QueryError};
use crate::metrics::{self, GameLog, HitRate};
use crate::models::{PropCandidate, ResponseChunk, StatCode};
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, warn};

const SCAN_GAMES: usize = 10;
const LEAN_THRESHOLD_PCT: f64 = 60.0;
const SAFE_THRESHOLD_PCT: f64 = 80.0;
const FLEX_LEGS: usize = 3;

const BREAKER_RECENT_GAMES: usize = 5;
const BREAKER_THRESHOLD_PCT: f64 = 20.0;
const BREAKER_LIMIT: usize = 5;

/// Game logs for every roster player that resolved, keyed by lower-cased name
struct RosterLogs {
    logs: HashMap<String, GameLog>,
}

impl RosterLogs {
    /// Fetch each distinct roster player once
    async fn load(ctx: &HandlerContext, action: &str) -> HandlerResult<Self> {
        let mut logs = HashMap::new();
        let mut last_upstream = None;

        for name in ctx.roster.players() {
            match ctx.lookup_player_log(name, action).await {
                Ok((_, log)) => {
                    logs.insert(name.to_lowercase(), log);
                }
                Err(err @ QueryError::Upstream { .. }) => {
                    warn!("Skipping {} while {}: {}", name, action, err);
                    last_upstream = Some(err);
                }
                Err(err) => debug!("Skipping {}: {}", name, err),
            }
        }

        match last_upstream {
            Some(err) if logs.is_empty() => Err(err),
            _ => Ok(Self { logs }),
        }
    }

    fn get(&self, player: &str) -> Option<&GameLog> {
        self.logs.get(&player.to_lowercase())
    }
}

/// Roster props with their rate over the scan window, in roster order
async fn scan_props<F>(ctx: &HandlerContext, action: &str, rate: F) -> HandlerResult<Vec<(PropCandidate, HitRate)>>
where
    F: Fn(&GameLog, &PropCandidate) -> HitRate,
{
    let logs = RosterLogs::load(ctx, action).await?;
    Ok(ctx
        .roster
        .candidates()
        .iter()
        .filter_map(|c| logs.get(&c.player).map(|log| (c.clone(), rate(log, c))))
        .collect())
}

fn over_rate(log: &GameLog, c: &PropCandidate) -> HitRate {
    metrics::hit_rate(log.window(SCAN_GAMES), c.stat, c.line)
}

fn under_rate(log: &GameLog, c: &PropCandidate) -> HitRate {
    metrics::under_rate(log.window(SCAN_GAMES), c.stat, c.line)
}

fn render_props(
    header: &str,
    side: &str,
    props: &[(PropCandidate, HitRate)],
    none_available: &str,
) -> ResponseChunk {
    if props.is_empty() {
        return ResponseChunk::new(none_available);
    }
    let mut text = format!("{}\n", header);
    for (c, hr) in props {
        text.push_str(&format!(
            "- {} {} {} {}: {}/{} ({:.0}%)\n",
            c.player, c.stat, side, c.line, hr.hits, hr.games, hr.pct
        ));
    }
    ResponseChunk::new(text.trim_end())
}

pub struct BestOversHandler;

#[async_trait]
impl IntentHandler for BestOversHandler {
    fn intent(&self) -> Intent {
        Intent::BestOvers
    }

    async fn handle(&self, ctx: &HandlerContext, _cmd: &Command) -> HandlerResult<ResponseChunk> {
        let props: Vec<_> = scan_props(ctx, "scanning overs", over_rate)
            .await?
            .into_iter()
            .filter(|(_, hr)| hr.pct >= LEAN_THRESHOLD_PCT)
            .collect();

        Ok(render_props(
            "📈 Best Overs (last 10 games, hit ≥60%):",
            "over",
            &props,
            "🤷 No strong overs available right now.",
        ))
    }
}

pub struct BestUndersHandler;

#[async_trait]
impl IntentHandler for BestUndersHandler {
    fn intent(&self) -> Intent {
        Intent::BestUnders
    }

    async fn handle(&self, ctx: &HandlerContext, _cmd: &Command) -> HandlerResult<ResponseChunk> {
        let props: Vec<_> = scan_props(ctx, "scanning unders", under_rate)
            .await?
            .into_iter()
            .filter(|(_, hr)| hr.pct >= LEAN_THRESHOLD_PCT)
            .collect();

        Ok(render_props(
            "📉 Best Unders (last 10 games, under ≥60%):",
            "under",
            &props,
            "🤷 No strong unders available right now.",
        ))
    }
}

/// Overs hitting at least 80% over the scan window, roster order
async fn safe_props(ctx: &HandlerContext, action: &str) -> HandlerResult<Vec<(PropCandidate, HitRate)>> {
    Ok(scan_props(ctx, action, over_rate)
        .await?
        .into_iter()
        .filter(|(_, hr)| hr.pct >= SAFE_THRESHOLD_PCT)
        .collect())
}

pub struct SafePicksHandler;

#[async_trait]
impl IntentHandler for SafePicksHandler {
    fn intent(&self) -> Intent {
        Intent::SafePicks
    }

    async fn handle(&self, ctx: &HandlerContext, _cmd: &Command) -> HandlerResult<ResponseChunk> {
        let props = safe_props(ctx, "scanning safe picks").await?;
        Ok(render_props(
            "🛡️ Safe Picks (last 10 games, hit ≥80%):",
            "over",
            &props,
            "🤷 No safe picks available right now.",
        ))
    }
}

pub struct AutoFlexHandler;

#[async_trait]
impl IntentHandler for AutoFlexHandler {
    fn intent(&self) -> Intent {
        Intent::AutoFlex
    }

    async fn handle(&self, ctx: &HandlerContext, _cmd: &Command) -> HandlerResult<ResponseChunk> {
        let mut props = safe_props(ctx, "building auto flex").await?;
        if props.is_empty() {
            return Ok(ResponseChunk::new(
                "🤷 No auto flex available right now. Not enough safe legs.",
            ));
        }

        // Stable sort keeps roster order on ties
        props.sort_by(|a, b| b.1.pct.total_cmp(&a.1.pct));
        props.truncate(FLEX_LEGS);

        let mut text = format!("🎰 Auto Flex ({} legs):\n", props.len());
        for (i, (c, hr)) in props.iter().enumerate() {
            text.push_str(&format!(
                "{}. {} {} over {} ({:.0}% last {})\n",
                i + 1,
                c.player,
                c.stat,
                c.line,
                hr.pct,
                hr.games
            ));
        }
        Ok(ResponseChunk::new(text.trim_end()))
    }
}

/// Recent scoring deviation from the season mean
#[derive(Debug, Clone, PartialEq)]
struct TrendBreak {
    player: String,
    recent_avg: f64,
    season_avg: f64,
    pct: f64,
}

pub struct TrendBreakersHandler;

#[async_trait]
impl IntentHandler for TrendBreakersHandler {
    fn intent(&self) -> Intent {
        Intent::TrendBreakers
    }

    async fn handle(&self, ctx: &HandlerContext, _cmd: &Command) -> HandlerResult<ResponseChunk> {
        let logs = RosterLogs::load(ctx, "scanning trend breakers").await?;

        let mut breaks: Vec<TrendBreak> = ctx
            .roster
            .players()
            .into_iter()
            .filter_map(|name| {
                let log = logs.get(name)?;
                let recent = log.window(BREAKER_RECENT_GAMES);
                Some(TrendBreak {
                    player: name.to_string(),
                    recent_avg: metrics::mean(recent, StatCode::Points),
                    season_avg: metrics::mean(log.all(), StatCode::Points),
                    pct: metrics::trend_delta_pct(log.all(), StatCode::Points, BREAKER_RECENT_GAMES),
                })
            })
            .filter(|b| b.pct.abs() >= BREAKER_THRESHOLD_PCT)
            .collect();

        if breaks.is_empty() {
            return Ok(ResponseChunk::new("😴 No trend breakers right now."));
        }

        breaks.sort_by(|a, b| b.pct.abs().total_cmp(&a.pct.abs()));
        breaks.truncate(BREAKER_LIMIT);

        let mut text = String::from("⚡ Trend Breakers (PTS last 5 vs season):\n");
        for b in &breaks {
            let label = if b.pct > 0.0 { "📈 Surge" } else { "📉 Slump" };
            text.push_str(&format!(
                "- {}: {:.1} vs {:.1} ({:+.0}%) {}\n",
                b.player, b.recent_avg, b.season_avg, b.pct, label
            ));
        }
        Ok(ResponseChunk::new(text.trim_end()))
    }
}
