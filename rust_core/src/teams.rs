//! Static NBA team directory.
//!
//! This module provides:
//! - Abbreviation and id lookup for all 30 franchises
//! - Loose name lookup (full name, nickname or city) for free-text queries

use crate::models::TeamId;
use serde::Serialize;

/// One franchise
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamInfo {
    pub id: TeamId,
    pub abbreviation: String,
    pub full_name: String,
}

#[derive(Debug, Clone, Copy)]
pub struct TeamEntry {
    pub id: TeamId,
    pub abbreviation: &'static str,
    pub city: &'static str,
    pub nickname: &'static str,
    pub full_name: &'static str,
}

impl TeamEntry {
    pub fn info(&self) -> TeamInfo {
        TeamInfo {
            id: self.id,
            abbreviation: self.abbreviation.to_string(),
            full_name: self.full_name.to_string(),
        }
    }
}

const fn team(
    id: TeamId,
    abbreviation: &'static str,
    city: &'static str,
    nickname: &'static str,
    full_name: &'static str,
) -> TeamEntry {
    TeamEntry {
        id,
        abbreviation,
        city,
        nickname,
        full_name,
    }
}

pub static NBA_TEAMS: &[TeamEntry] = &[
    team(1610612737, "ATL", "Atlanta", "Hawks", "Atlanta Hawks"),
    team(1610612738, "BOS", "Boston", "Celtics", "Boston Celtics"),
    team(1610612739, "CLE", "Cleveland", "Cavaliers", "Cleveland Cavaliers"),
    team(1610612740, "NOP", "New Orleans", "Pelicans", "New Orleans Pelicans"),
    team(1610612741, "CHI", "Chicago", "Bulls", "Chicago Bulls"),
    team(1610612742, "DAL", "Dallas", "Mavericks", "Dallas Mavericks"),
    team(1610612743, "DEN", "Denver", "Nuggets", "Denver Nuggets"),
    team(1610612744, "GSW", "Golden State", "Warriors", "Golden State Warriors"),
    team(1610612745, "HOU", "Houston", "Rockets", "Houston Rockets"),
    team(1610612746, "LAC", "Los Angeles", "Clippers", "LA Clippers"),
    team(1610612747, "LAL", "Los Angeles", "Lakers", "Los Angeles Lakers"),
    team(1610612748, "MIA", "Miami", "Heat", "Miami Heat"),
    team(1610612749, "MIL", "Milwaukee", "Bucks", "Milwaukee Bucks"),
    team(1610612750, "MIN", "Minnesota", "Timberwolves", "Minnesota Timberwolves"),
    team(1610612751, "BKN", "Brooklyn", "Nets", "Brooklyn Nets"),
    team(1610612752, "NYK", "New York", "Knicks", "New York Knicks"),
    team(1610612753, "ORL", "Orlando", "Magic", "Orlando Magic"),
    team(1610612754, "IND", "Indiana", "Pacers", "Indiana Pacers"),
    team(1610612755, "PHI", "Philadelphia", "76ers", "Philadelphia 76ers"),
    team(1610612756, "PHX", "Phoenix", "Suns", "Phoenix Suns"),
    team(1610612757, "POR", "Portland", "Trail Blazers", "Portland Trail Blazers"),
    team(1610612758, "SAC", "Sacramento", "Kings", "Sacramento Kings"),
    team(1610612759, "SAS", "San Antonio", "Spurs", "San Antonio Spurs"),
    team(1610612760, "OKC", "Oklahoma City", "Thunder", "Oklahoma City Thunder"),
    team(1610612761, "TOR", "Toronto", "Raptors", "Toronto Raptors"),
    team(1610612762, "UTA", "Utah", "Jazz", "Utah Jazz"),
    team(1610612763, "MEM", "Memphis", "Grizzlies", "Memphis Grizzlies"),
    team(1610612764, "WAS", "Washington", "Wizards", "Washington Wizards"),
    team(1610612765, "DET", "Detroit", "Pistons", "Detroit Pistons"),
    team(1610612766, "CHA", "Charlotte", "Hornets", "Charlotte Hornets"),
];

pub fn find_by_abbreviation(abbreviation: &str) -> Option<&'static TeamEntry> {
    let abbreviation = abbreviation.trim();
    NBA_TEAMS
        .iter()
        .find(|t| t.abbreviation.eq_ignore_ascii_case(abbreviation))
}

pub fn find_by_id(id: TeamId) -> Option<&'static TeamEntry> {
    NBA_TEAMS.iter().find(|t| t.id == id)
}

/// Full name, nickname, abbreviation, then a unique city match
pub fn find_by_name(name: &str) -> Option<&'static TeamEntry> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    NBA_TEAMS
        .iter()
        .find(|t| t.full_name.eq_ignore_ascii_case(name) || t.nickname.eq_ignore_ascii_case(name))
        .or_else(|| find_by_abbreviation(name))
        .or_else(|| {
            // "Los Angeles" is ambiguous, so only accept a single city hit
            let mut hits = NBA_TEAMS.iter().filter(|t| t.city.eq_ignore_ascii_case(name));
            match (hits.next(), hits.next()) {
                (Some(t), None) => Some(t),
                _ => None,
            }
        })
}

/// Abbreviation for display, falling back to the raw id
pub fn abbreviation_for(id: TeamId) -> String {
    find_by_id(id)
        .map(|t| t.abbreviation.to_string())
        .unwrap_or_else(|| format!("#{}", id))
}
