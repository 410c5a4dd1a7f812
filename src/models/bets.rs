use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::fixture::Side;

pub const BET_TYPE_SCORE: &str = "score";
pub const BET_TYPE_RESULT: &str = "result";

// Database model for the bets collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bet {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    // Pool-membership that placed the bet
    pub user_bolao_id: String,
    pub fixture_id: i64,

    #[serde(rename = "type")]
    pub bet_type: String, // "score" or "result"
    pub value: String,    // "2-1" for score, "home" / "draw" / "away" for result

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A bet's value read according to its type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prediction {
    Score { home: u32, away: u32 },
    Result(Side),
}

impl Prediction {
    pub fn parse(bet_type: &str, value: &str) -> Option<Self> {
        match bet_type.trim().to_lowercase().as_str() {
            BET_TYPE_SCORE => parse_score(value).map(|(home, away)| Prediction::Score { home, away }),
            BET_TYPE_RESULT => Side::parse(value).map(Prediction::Result),
            _ => None,
        }
    }

    pub fn side(&self) -> Side {
        match *self {
            Prediction::Score { home, away } => Side::from_score(home, away),
            Prediction::Result(side) => side,
        }
    }
}

impl Bet {
    pub fn prediction(&self) -> Option<Prediction> {
        Prediction::parse(&self.bet_type, &self.value)
    }
}

// "2-1", "2 x 1" and "2:1" all read as home 2, away 1
fn parse_score(value: &str) -> Option<(u32, u32)> {
    let (home, away) = value.split_once(|c: char| c == '-' || c == 'x' || c == 'X' || c == ':')?;
    Some((home.trim().parse().ok()?, away.trim().parse().ok()?))
}

#[derive(Debug, Deserialize, Validate)]
pub struct PlaceBetRequest {
    #[validate(range(min = 1, message = "fixture_id must be positive"))]
    pub fixture_id: i64,

    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 16, message = "type is required"))]
    pub bet_type: String,

    #[validate(length(min = 1, max = 16, message = "value is required"))]
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct BetResponse {
    pub id: String,
    pub user_bolao_id: String,
    pub fixture_id: i64,
    #[serde(rename = "type")]
    pub bet_type: String,
    pub value: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Bet> for BetResponse {
    fn from(bet: Bet) -> Self {
        BetResponse {
            id: bet.id.map(|id| id.to_hex()).unwrap_or_default(),
            user_bolao_id: bet.user_bolao_id,
            fixture_id: bet.fixture_id,
            bet_type: bet.bet_type,
            value: bet.value,
            created_at: bet.created_at,
            updated_at: bet.updated_at,
        }
    }
}

#[cfg(test)]
pub(crate) fn bet(user_bolao_id: &str, fixture_id: i64, bet_type: &str, value: &str) -> Bet {
    let now = Utc::now();
    Bet {
        id: None,
        user_bolao_id: user_bolao_id.to_string(),
        fixture_id,
        bet_type: bet_type.to_string(),
        value: value.to_string(),
        created_at: now,
        updated_at: now,
    }
}
