//! Windowed statistics over game logs.
//!
//! Every function here takes a window ordered most-recent-first and is pure.
//! Callers must short-circuit on empty logs; the functions assume at least
//! one record.

use crate::models::{GameRecord, StatCode};
use serde::Serialize;

/// Game log sorted by date descending.
///
/// Construction sorts, so "last N games" is always `window(N)`.
#[derive(Debug, Clone, Default)]
pub struct GameLog {
    games: Vec<GameRecord>,
}

impl GameLog {
    pub fn new(mut games: Vec<GameRecord>) -> Self {
        // Stable sort keeps provider order for same-day rows
        games.sort_by(|a, b| b.date.cmp(&a.date));
        Self { games }
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    /// Up to `n` most recent games
    pub fn window(&self, n: usize) -> &[GameRecord] {
        &self.games[..n.min(self.games.len())]
    }

    /// Full season, most recent first
    pub fn all(&self) -> &[GameRecord] {
        &self.games
    }
}

/// Hit-rate of a stat against a line
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HitRate {
    pub hits: usize,
    pub games: usize,
    pub pct: f64,
}

fn rate(hits: usize, games: usize) -> HitRate {
    debug_assert!(games > 0, "hit rate over an empty window");
    HitRate {
        hits,
        games,
        pct: hits as f64 / games.max(1) as f64 * 100.0,
    }
}

/// Games where `stat` strictly exceeds `threshold`, as a percentage of the window
pub fn hit_rate(window: &[GameRecord], stat: StatCode, threshold: f64) -> HitRate {
    let hits = window.iter().filter(|g| g.stat(stat) > threshold).count();
    rate(hits, window.len())
}

/// Games where `stat` falls strictly below `threshold`
pub fn under_rate(window: &[GameRecord], stat: StatCode, threshold: f64) -> HitRate {
    let hits = window.iter().filter(|g| g.stat(stat) < threshold).count();
    rate(hits, window.len())
}

pub fn mean(window: &[GameRecord], stat: StatCode) -> f64 {
    debug_assert!(!window.is_empty(), "mean over an empty window");
    let sum: f64 = window.iter().map(|g| g.stat(stat)).sum();
    sum / window.len().max(1) as f64
}

/// Population standard deviation of `stat` over the window
pub fn volatility(window: &[GameRecord], stat: StatCode) -> f64 {
    let avg = mean(window, stat);
    let variance = window
        .iter()
        .map(|g| (g.stat(stat) - avg).powi(2))
        .sum::<f64>()
        / window.len().max(1) as f64;
    variance.sqrt()
}

/// Mean of the most recent `recent` games minus the mean of the full history.
///
/// Order-sensitive: `history` must be most-recent-first.
pub fn trend_delta(history: &[GameRecord], stat: StatCode, recent: usize) -> f64 {
    let recent_window = &history[..recent.min(history.len())];
    mean(recent_window, stat) - mean(history, stat)
}

/// Trend delta relative to the season mean, in percent.
///
/// Zero when the season mean is zero.
pub fn trend_delta_pct(history: &[GameRecord], stat: StatCode, recent: usize) -> f64 {
    let season = mean(history, stat);
    if season.abs() < f64::EPSILON {
        return 0.0;
    }
    trend_delta(history, stat, recent) / season * 100.0
}

/// Per-game average of the summed stats, e.g. PTS+REB+AST
pub fn composite_score(window: &[GameRecord], stats: &[StatCode]) -> f64 {
    debug_assert!(!window.is_empty(), "composite score over an empty window");
    let total: f64 = window
        .iter()
        .map(|g| stats.iter().map(|s| g.stat(*s)).sum::<f64>())
        .sum();
    total / window.len().max(1) as f64
}

// ============================================================================
// Qualitative buckets
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskBucket {
    Low,
    Medium,
    High,
}

impl RiskBucket {
    pub fn from_std_dev(std_dev: f64) -> Self {
        if std_dev < 5.0 {
            RiskBucket::Low
        } else if std_dev < 10.0 {
            RiskBucket::Medium
        } else {
            RiskBucket::High
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskBucket::Low => "🟢 Low Risk (very consistent)",
            RiskBucket::Medium => "🟡 Medium Risk (some variance)",
            RiskBucket::High => "🔴 High Risk (volatile)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MomentumLabel {
    Sizzling,
    Strong,
    Medium,
    Cold,
}

impl MomentumLabel {
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            MomentumLabel::Sizzling
        } else if score >= 70.0 {
            MomentumLabel::Strong
        } else if score >= 50.0 {
            MomentumLabel::Medium
        } else {
            MomentumLabel::Cold
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MomentumLabel::Sizzling => "Sizzling 🔥",
            MomentumLabel::Strong => "Strong 🏀",
            MomentumLabel::Medium => "Medium 🚶",
            MomentumLabel::Cold => "Cold 🧊",
        }
    }
}
