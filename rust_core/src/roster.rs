//! Prop candidate roster for batch scans.
//!
//! This module provides:
//! - A built-in list of (player, stat, line) candidates
//! - JSON loading to replace the list per deployment

use crate::models::{PropCandidate, StatCode};
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::Path;

/// Static candidate list scanned by best-overs, safe-picks and friends.
///
/// Scan output follows roster order.
#[derive(Debug, Clone)]
pub struct PropRoster {
    candidates: Vec<PropCandidate>,
}

impl Default for PropRoster {
    fn default() -> Self {
        Self::new(vec![
            PropCandidate::new("LeBron James", StatCode::Points, 24.5),
            PropCandidate::new("LeBron James", StatCode::Assists, 7.5),
            PropCandidate::new("Stephen Curry", StatCode::ThreesMade, 4.5),
            PropCandidate::new("Stephen Curry", StatCode::Points, 26.5),
            PropCandidate::new("Nikola Jokic", StatCode::Rebounds, 12.5),
            PropCandidate::new("Nikola Jokic", StatCode::Assists, 9.5),
            PropCandidate::new("Giannis Antetokounmpo", StatCode::Points, 30.5),
            PropCandidate::new("Giannis Antetokounmpo", StatCode::Rebounds, 11.5),
            PropCandidate::new("Jayson Tatum", StatCode::Points, 26.5),
            PropCandidate::new("Luka Doncic", StatCode::Assists, 8.5),
            PropCandidate::new("Shai Gilgeous-Alexander", StatCode::Points, 30.5),
            PropCandidate::new("Anthony Edwards", StatCode::ThreesMade, 3.5),
            PropCandidate::new("Jalen Brunson", StatCode::Points, 25.5),
            PropCandidate::new("Domantas Sabonis", StatCode::Rebounds, 13.5),
            PropCandidate::new("Tyrese Haliburton", StatCode::Assists, 9.5),
        ])
    }
}

impl PropRoster {
    pub fn new(candidates: Vec<PropCandidate>) -> Self {
        Self { candidates }
    }

    /// Load a JSON array of `{player, stat, line}` objects.
    ///
    /// Unknown stat codes fail the whole load.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read prop roster {}", path.display()))?;
        let candidates: Vec<PropCandidate> = serde_json::from_str(&content)
            .with_context(|| format!("Invalid prop roster {}", path.display()))?;
        if candidates.is_empty() {
            return Err(anyhow!("Prop roster {} is empty", path.display()));
        }
        Ok(Self::new(candidates))
    }

    pub fn candidates(&self) -> &[PropCandidate] {
        &self.candidates
    }

    /// Distinct player names in first-appearance order
    pub fn players(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for c in &self.candidates {
            if !seen.iter().any(|p| p.eq_ignore_ascii_case(&c.player)) {
                seen.push(&c.player);
            }
        }
        seen
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_file(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("{}-{}.json", name, std::process::id()));
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_default_roster_players_dedup() {
        let roster = PropRoster::default();
        let players = roster.players();
        assert_eq!(players[0], "LeBron James");
        assert_eq!(players[1], "Stephen Curry");
        assert_eq!(
            players.iter().filter(|p| **p == "Nikola Jokic").count(),
            1
        );
        assert!(roster.len() > players.len());
    }

    #[test]
    fn test_load_roster_file() {
        let path = temp_file(
            "roster-ok",
            r#"[{"player": "Jalen Brunson", "stat": "3PM", "line": 2.5},
                {"player": "Jalen Brunson", "stat": "PTS", "line": 26.5}]"#,
        );
        let roster = PropRoster::load(&path).unwrap();
        assert_eq!(roster.len(), 2);
        assert_eq!(roster.candidates()[0].stat, StatCode::ThreesMade);
        assert_eq!(roster.players(), vec!["Jalen Brunson"]);
        fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_rejects_unknown_stat() {
        let path = temp_file(
            "roster-bad",
            r#"[{"player": "Jalen Brunson", "stat": "STL", "line": 1.5}]"#,
        );
        assert!(PropRoster::load(&path).is_err());
        fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_missing_file() {
        assert!(PropRoster::load("/definitely/not/here.json").is_err());
    }
}
