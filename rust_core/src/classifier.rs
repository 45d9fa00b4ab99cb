//! Free-text command classification.
//!
//! Rules are checked in declaration order and the first match wins. Prefix
//! rules come first so that e.g. `trend player` is never swallowed by a
//! looser substring rule.

use crate::error::QueryError;
use crate::models::StatCode;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Intent {
    Welcome,
    SearchPlayer,
    TrendPlayer,
    ConsistencyPlayer,
    MomentumRating,
    RiskIndex,
    RisingStar,
    SimulateGame,
    TeamMomentum,
    RecentPlays,
    AdvancedStats,
    BestOvers,
    BestUnders,
    SafePicks,
    AutoFlex,
    TrendBreakers,
    MismatchRatings,
    FatigueWatch,
    ClutchLeaders,
    InjuryReport,
    BackToBack,
    HotStreaks,
    GamePace,
    Help,
    Fallback,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Welcome => "welcome",
            Intent::SearchPlayer => "search-player",
            Intent::TrendPlayer => "trend-player",
            Intent::ConsistencyPlayer => "consistency-player",
            Intent::MomentumRating => "momentum-rating",
            Intent::RiskIndex => "risk-index",
            Intent::RisingStar => "rising-star",
            Intent::SimulateGame => "simulate-game",
            Intent::TeamMomentum => "team-momentum",
            Intent::RecentPlays => "recent-plays",
            Intent::AdvancedStats => "advanced-stats",
            Intent::BestOvers => "best-overs",
            Intent::BestUnders => "best-unders",
            Intent::SafePicks => "safe-picks",
            Intent::AutoFlex => "auto-flex",
            Intent::TrendBreakers => "trend-breakers",
            Intent::MismatchRatings => "mismatch-ratings",
            Intent::FatigueWatch => "fatigue-watch",
            Intent::ClutchLeaders => "clutch-leaders",
            Intent::InjuryReport => "injury-report",
            Intent::BackToBack => "back-to-back",
            Intent::HotStreaks => "hot-streaks",
            Intent::GamePace => "game-pace",
            Intent::Help => "help",
            Intent::Fallback => "fallback",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy)]
enum Pattern {
    Prefix(&'static str),
    Contains(&'static str),
}

/// One classification rule
#[derive(Debug, Clone, Copy)]
pub struct CommandRule {
    pub intent: Intent,
    pattern: Pattern,
    /// Syntax shown by `help`
    pub syntax: &'static str,
}

const fn prefix(intent: Intent, keyword: &'static str, syntax: &'static str) -> CommandRule {
    CommandRule {
        intent,
        pattern: Pattern::Prefix(keyword),
        syntax,
    }
}

const fn contains(intent: Intent, keyword: &'static str, syntax: &'static str) -> CommandRule {
    CommandRule {
        intent,
        pattern: Pattern::Contains(keyword),
        syntax,
    }
}

/// Priority-ordered rule table
pub static COMMAND_RULES: &[CommandRule] = &[
    prefix(Intent::SearchPlayer, "search player", "search player <Name>"),
    prefix(
        Intent::TrendPlayer,
        "trend player",
        "trend player <Name> <Stat> <PropLine>",
    ),
    prefix(
        Intent::ConsistencyPlayer,
        "consistency player",
        "consistency player <Name> <Stat> <PropLine>",
    ),
    prefix(Intent::MomentumRating, "momentum rating", "momentum rating <Name>"),
    prefix(Intent::RiskIndex, "risk index", "risk index <Name>"),
    prefix(Intent::RisingStar, "rising star", "rising star <Name>"),
    prefix(
        Intent::SimulateGame,
        "simulate game",
        "simulate game <TeamA> vs <TeamB>",
    ),
    prefix(Intent::TeamMomentum, "team momentum", "team momentum <TeamAbbr>"),
    prefix(Intent::RecentPlays, "recent plays", "recent plays <GameID>"),
    prefix(Intent::AdvancedStats, "advanced stats", "advanced stats <GameID>"),
    contains(Intent::BestOvers, "best overs", "best overs"),
    contains(Intent::BestUnders, "best unders", "best unders"),
    contains(Intent::SafePicks, "safe picks", "safe picks"),
    contains(Intent::AutoFlex, "auto flex", "auto flex"),
    contains(Intent::TrendBreakers, "trend breakers", "trend breakers"),
    contains(Intent::MismatchRatings, "mismatch", "mismatch ratings"),
    contains(Intent::FatigueWatch, "fatigue", "fatigue watch"),
    contains(Intent::ClutchLeaders, "clutch", "clutch leaders"),
    contains(Intent::InjuryReport, "injury report", "injury report"),
    contains(Intent::BackToBack, "back to back", "back to back"),
    contains(Intent::HotStreaks, "hot streak", "hot streaks"),
    contains(Intent::GamePace, "game pace", "game pace"),
    contains(Intent::Help, "help", "help"),
];

/// Syntax lines for every recognised command, in rule order
pub fn command_syntax() -> impl Iterator<Item = &'static str> {
    COMMAND_RULES.iter().map(|r| r.syntax)
}

/// Validated (player, stat, line) query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropQuery {
    pub player: String,
    pub stat: StatCode,
    pub line: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CommandArgs {
    None,
    Player(String),
    Prop(PropQuery),
    Team(String),
    Matchup { home: String, away: String },
    GameId(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Command {
    pub intent: Intent,
    pub args: CommandArgs,
}

impl Command {
    fn bare(intent: Intent) -> Self {
        Self {
            intent,
            args: CommandArgs::None,
        }
    }

    pub fn player(&self) -> Result<&str, QueryError> {
        match &self.args {
            CommandArgs::Player(name) => Ok(name),
            CommandArgs::Prop(prop) => Ok(&prop.player),
            _ => Err(self.missing_args()),
        }
    }

    pub fn prop(&self) -> Result<&PropQuery, QueryError> {
        match &self.args {
            CommandArgs::Prop(prop) => Ok(prop),
            _ => Err(self.missing_args()),
        }
    }

    pub fn team(&self) -> Result<&str, QueryError> {
        match &self.args {
            CommandArgs::Team(team) => Ok(team),
            _ => Err(self.missing_args()),
        }
    }

    pub fn matchup(&self) -> Result<(&str, &str), QueryError> {
        match &self.args {
            CommandArgs::Matchup { home, away } => Ok((home, away)),
            _ => Err(self.missing_args()),
        }
    }

    pub fn game_id(&self) -> Result<&str, QueryError> {
        match &self.args {
            CommandArgs::GameId(id) => Ok(id),
            _ => Err(self.missing_args()),
        }
    }

    fn missing_args(&self) -> QueryError {
        QueryError::usage(usage_hint(self.intent))
    }
}

/// Usage hint for an intent with malformed arguments
pub fn usage_hint(intent: Intent) -> String {
    match intent {
        Intent::TrendPlayer => {
            "Usage: `trend player <Name> <Stat> <PropLine>` (e.g., trend player LeBron James AST 5.5)"
                .to_string()
        }
        Intent::ConsistencyPlayer => {
            "Usage: `consistency player <Name> <Stat> <PropLine>` (e.g., consistency player Jayson Tatum PTS 26.5)"
                .to_string()
        }
        Intent::SimulateGame => {
            "Usage: `simulate game <TeamA> vs <TeamB>` (e.g., simulate game Lakers vs Celtics)"
                .to_string()
        }
        other => {
            let syntax = COMMAND_RULES
                .iter()
                .find(|r| r.intent == other)
                .map(|r| r.syntax)
                .unwrap_or("help");
            format!("Usage: `{}`", syntax)
        }
    }
}

/// Classify a raw query into exactly one command.
///
/// An `Err` is always `QueryError::Usage` and means the intent was recognised
/// but its arguments were not; nothing should be fetched.
pub fn classify(raw: &str) -> Result<Command, QueryError> {
    let query = raw.trim();
    let lower = query.to_lowercase();

    if lower.is_empty() {
        return Ok(Command::bare(Intent::Welcome));
    }

    for rule in COMMAND_RULES {
        match rule.pattern {
            Pattern::Prefix(keyword) => {
                if let Some(rest) = strip_keyword(query, keyword) {
                    return parse_args(rule.intent, rest.trim());
                }
            }
            Pattern::Contains(keyword) if lower.contains(keyword) => {
                return Ok(Command::bare(rule.intent));
            }
            _ => {}
        }
    }

    Ok(Command::bare(Intent::Fallback))
}

/// Remainder of `query` after a case-insensitive `keyword` prefix.
///
/// Compares char by char so the cut lands on the original string even when
/// lower-casing changes a char's byte length.
fn strip_keyword<'a>(query: &'a str, keyword: &str) -> Option<&'a str> {
    let mut chars = query.chars();
    for expected in keyword.chars() {
        let c = chars.next()?;
        if !c.to_lowercase().eq(std::iter::once(expected)) {
            return None;
        }
    }
    Some(chars.as_str())
}

fn parse_args(intent: Intent, rest: &str) -> Result<Command, QueryError> {
    let tokens: Vec<&str> = rest.split_whitespace().collect();
    let usage = || QueryError::usage(usage_hint(intent));

    let args = match intent {
        Intent::TrendPlayer | Intent::ConsistencyPlayer => {
            CommandArgs::Prop(parse_prop(intent, &tokens)?)
        }
        Intent::SimulateGame => {
            let (home, away) = parse_matchup(&tokens).ok_or_else(usage)?;
            CommandArgs::Matchup { home, away }
        }
        Intent::TeamMomentum => match tokens.as_slice() {
            [abbr] => CommandArgs::Team(abbr.to_uppercase()),
            _ => return Err(usage()),
        },
        Intent::RecentPlays | Intent::AdvancedStats => match tokens.as_slice() {
            [id] if id.chars().all(|c| c.is_ascii_digit()) => CommandArgs::GameId(id.to_string()),
            _ => return Err(usage()),
        },
        _ => {
            if tokens.is_empty() {
                return Err(usage());
            }
            CommandArgs::Player(tokens.join(" "))
        }
    };

    Ok(Command { intent, args })
}

/// `<Name...> <Stat> <Line>`; unknown stat codes are rejected here
fn parse_prop(intent: Intent, tokens: &[&str]) -> Result<PropQuery, QueryError> {
    if tokens.len() < 3 {
        return Err(QueryError::usage(usage_hint(intent)));
    }
    let (name, tail) = tokens.split_at(tokens.len() - 2);
    let stat = tail[0]
        .parse::<StatCode>()
        .map_err(|_| QueryError::usage("Stat must be one of: PTS, AST, REB, 3PM."))?;
    let line = tail[1]
        .parse::<f64>()
        .ok()
        .filter(|l| l.is_finite())
        .ok_or_else(|| QueryError::usage(usage_hint(intent)))?;
    Ok(PropQuery {
        player: name.join(" "),
        stat,
        line,
    })
}

fn parse_matchup(tokens: &[&str]) -> Option<(String, String)> {
    let split = tokens
        .iter()
        .position(|t| matches!(t.to_lowercase().as_str(), "vs" | "vs." | "@"));

    let (home, away) = match split {
        Some(idx) => (tokens[..idx].join(" "), tokens[idx + 1..].join(" ")),
        None if tokens.len() == 2 => (tokens[0].to_string(), tokens[1].to_string()),
        None => return None,
    };

    if home.is_empty() || away.is_empty() {
        return None;
    }
    Some((home, away))
}
