use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Short status codes reported by the sports-data source
const FINISHED: [&str; 3] = ["FT", "AET", "PEN"];
const NOT_STARTED: [&str; 2] = ["NS", "TBD"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Goals {
    pub home: Option<u32>,
    pub away: Option<u32>,
}

// A single match as handed to pages and the leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    pub id: i64,
    pub date: DateTime<Utc>,
    pub status: String,
    pub round: String,
    pub league_id: i64,
    pub season: i32,
    pub home_team: Team,
    pub away_team: Team,
    pub goals: Goals,
}

/// Which side won, or a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Home,
    Draw,
    Away,
}

impl Side {
    pub fn from_score(home: u32, away: u32) -> Self {
        match home.cmp(&away) {
            std::cmp::Ordering::Greater => Side::Home,
            std::cmp::Ordering::Less => Side::Away,
            std::cmp::Ordering::Equal => Side::Draw,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "home" | "1" => Some(Side::Home),
            "draw" | "x" => Some(Side::Draw),
            "away" | "2" => Some(Side::Away),
            _ => None,
        }
    }
}

/// Final score of a finished fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub home: u32,
    pub away: u32,
}

impl Outcome {
    pub fn side(&self) -> Side {
        Side::from_score(self.home, self.away)
    }
}

impl Fixture {
    pub fn is_finished(&self) -> bool {
        FINISHED.contains(&self.status.as_str())
    }

    pub fn has_started(&self) -> bool {
        !NOT_STARTED.contains(&self.status.as_str())
    }

    /// The final score, present only once the fixture is over and both
    /// goal counts are known.
    pub fn outcome(&self) -> Option<Outcome> {
        if !self.is_finished() {
            return None;
        }
        match (self.goals.home, self.goals.away) {
            (Some(home), Some(away)) => Some(Outcome { home, away }),
            _ => None,
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::TimeZone;

    pub fn fixture(id: i64, status: &str, goals: (Option<u32>, Option<u32>)) -> Fixture {
        Fixture {
            id,
            date: Utc.with_ymd_and_hms(2024, 5, 1, 19, 0, 0).unwrap(),
            status: status.to_string(),
            round: "Regular Season - 1".to_string(),
            league_id: 71,
            season: 2024,
            home_team: Team { id: 1, name: "Palmeiras".into(), logo: None },
            away_team: Team { id: 2, name: "Flamengo".into(), logo: None },
            goals: Goals { home: goals.0, away: goals.1 },
        }
    }

    pub fn finished(id: i64, home: u32, away: u32) -> Fixture {
        fixture(id, "FT", (Some(home), Some(away)))
    }
}
