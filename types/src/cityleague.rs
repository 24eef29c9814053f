use std::{fmt::Display, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeagueType {
    Open,
    Junior,
    Senior,
    Master,
}

impl Display for LeagueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LeagueType::Open => write!(f, "Open"),
            LeagueType::Junior => write!(f, "Junior"),
            LeagueType::Senior => write!(f, "Senior"),
            LeagueType::Master => write!(f, "Master"),
        }
    }
}

impl FromStr for LeagueType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Open" => Ok(LeagueType::Open),
            "Junior" => Ok(LeagueType::Junior),
            "Senior" => Ok(LeagueType::Senior),
            "Master" => Ok(LeagueType::Master),
            other => Err(format!("unknown league type: {other}")),
        }
    }
}

/// A city league season window. Official events held between `from_date`
/// and `to_date` belong to it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityleagueSchedule {
    pub id: String,
    pub title: String,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
}

/// One player's placement at one official event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventResult {
    pub official_event_id: u32,
    pub player_id: String,
    pub player_name: String,
    pub rank: u32,
    pub point: u32,
    pub deck_code: String,
}

/// All placements of one official event, under that event's schedule,
/// league and date.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityleagueResult {
    pub cityleague_schedule_id: String,
    pub official_event_id: u32,
    pub league_type: LeagueType,
    pub event_date: NaiveDate,
    pub results: Vec<EventResult>,
}

impl CityleagueSchedule {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from_date <= date && date <= self.to_date
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_league_type_text_round_trip() {
        for league_type in [
            LeagueType::Open,
            LeagueType::Junior,
            LeagueType::Senior,
            LeagueType::Master,
        ] {
            assert_eq!(league_type.to_string().parse::<LeagueType>(), Ok(league_type));
        }
        assert!("Expert".parse::<LeagueType>().is_err());
    }

    #[test]
    fn test_schedule_contains_bounds() {
        let schedule = CityleagueSchedule {
            id: "2024_season1".to_string(),
            title: "City League 2024 Season 1".to_string(),
            from_date: NaiveDate::from_ymd_opt(2024, 1, 13).unwrap(),
            to_date: NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
        };

        assert!(schedule.contains(schedule.from_date));
        assert!(schedule.contains(schedule.to_date));
        assert!(!schedule.contains(NaiveDate::from_ymd_opt(2024, 3, 11).unwrap()));
    }
}
