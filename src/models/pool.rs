use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use validator::Validate;

// Database model for the pools collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pool {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub competition_id: i64,
    pub season: i32,
    pub owner_id: String,
    pub invite_code: String,
    pub created_at: DateTime<Utc>,
}

impl Pool {
    pub fn new(name: String, competition_id: i64, season: i32, owner_id: String) -> Self {
        Pool {
            id: Some(ObjectId::new()),
            name,
            competition_id,
            season,
            owner_id,
            invite_code: uuid::Uuid::new_v4().simple().to_string(),
            created_at: Utc::now(),
        }
    }
}

/// A user's participation in a pool. This is the "player" that owns bets
/// and shows up on the leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Membership {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub pool_id: String,
    pub user_id: String,
    pub name: String,
    pub joined_at: DateTime<Utc>,
}

impl Membership {
    pub fn new(pool_id: String, user_id: String, name: String) -> Self {
        Membership {
            id: Some(ObjectId::new()),
            pool_id,
            user_id,
            name,
            joined_at: Utc::now(),
        }
    }

    pub fn id_hex(&self) -> String {
        self.id.map(|id| id.to_hex()).unwrap_or_default()
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePoolRequest {
    #[validate(length(min = 3, max = 60, message = "Pool name must be 3 to 60 characters"))]
    pub name: String,

    #[validate(range(min = 1, message = "competition_id must be positive"))]
    pub competition_id: i64,

    #[validate(range(min = 1900, max = 2100, message = "season must be a year"))]
    pub season: i32,
}

#[derive(Debug, Serialize)]
pub struct PoolResponse {
    pub id: String,
    pub name: String,
    pub competition_id: i64,
    pub season: i32,
    pub owner_id: String,
    pub invite_code: String,
    pub created_at: DateTime<Utc>,
}

impl From<Pool> for PoolResponse {
    fn from(pool: Pool) -> Self {
        PoolResponse {
            id: pool.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: pool.name,
            competition_id: pool.competition_id,
            season: pool.season,
            owner_id: pool.owner_id,
            invite_code: pool.invite_code,
            created_at: pool.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MembershipResponse {
    pub id: String,
    pub pool_id: String,
    pub user_id: String,
    pub name: String,
    pub joined_at: DateTime<Utc>,
}

impl From<Membership> for MembershipResponse {
    fn from(membership: Membership) -> Self {
        MembershipResponse {
            id: membership.id_hex(),
            pool_id: membership.pool_id,
            user_id: membership.user_id,
            name: membership.name,
            joined_at: membership.joined_at,
        }
    }
}
