pub mod nba_stats;

// Re-export commonly used types
pub use nba_stats::NbaStatsClient;
