//! Season selection driven by an injectable clock.
//!
//! The active season label is `{year-1}-{yy}` for the current calendar year,
//! and April through July select the Playoffs season type.

use crate::models::{Season, SeasonType};
use chrono::{Datelike, Local, NaiveDate};

/// Source of "today" for season selection and day scoreboards
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Wall clock in the local timezone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to a single date (tests, replays)
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Season label for a given date, e.g. 2025-03-01 -> "2024-25"
pub fn season_label(date: NaiveDate) -> String {
    let year = date.year();
    format!("{}-{:02}", year - 1, year.rem_euclid(100))
}

/// Playoffs from April through July inclusive, Regular Season otherwise
pub fn season_type_for(date: NaiveDate) -> SeasonType {
    match date.month() {
        4..=7 => SeasonType::Playoffs,
        _ => SeasonType::RegularSeason,
    }
}

/// Active season for a given date
pub fn current_season(date: NaiveDate) -> Season {
    Season::new(season_label(date), season_type_for(date))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_season_label() {
        assert_eq!(season_label(date(2025, 3, 1)), "2024-25");
        assert_eq!(season_label(date(2000, 1, 15)), "1999-00");
        assert_eq!(season_label(date(2009, 12, 31)), "2008-09");
    }

    #[test]
    fn test_season_type_by_month() {
        assert_eq!(season_type_for(date(2025, 3, 31)), SeasonType::RegularSeason);
        assert_eq!(season_type_for(date(2025, 4, 1)), SeasonType::Playoffs);
        assert_eq!(season_type_for(date(2025, 7, 31)), SeasonType::Playoffs);
        assert_eq!(season_type_for(date(2025, 8, 1)), SeasonType::RegularSeason);
        assert_eq!(season_type_for(date(2025, 11, 5)), SeasonType::RegularSeason);
    }

    #[test]
    fn test_fixed_clock() {
        let clock = FixedClock(date(2025, 5, 10));
        let season = current_season(clock.today());
        assert_eq!(season.label, "2024-25");
        assert_eq!(season.season_type, SeasonType::Playoffs);
    }
}
