// config.rs
use std::env;
use std::time::Duration;

use crate::errors::{AppError, Result};
use crate::services::leaderboard::ScoringTable;

const DEFAULT_SPORTS_API_URL: &str = "https://v3.football.api-sports.io";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database_name: String,
    pub jwt_secret: String,
    pub sports_api_url: String,
    pub sports_api_key: String,
    pub sports_api_timeout: Duration,
    pub scoring: ScoringTable,
    pub port: u16,
    pub host: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests don't have to touch
    /// the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| AppError::configuration(format!("{} must be set", key)))
        };

        let defaults = ScoringTable::default();
        let scoring = ScoringTable {
            exact_score: parse_or(&lookup, "SCORING_EXACT_POINTS", defaults.exact_score)?,
            correct_result: parse_or(&lookup, "SCORING_RESULT_POINTS", defaults.correct_result)?,
            miss: parse_or(&lookup, "SCORING_MISS_POINTS", defaults.miss)?,
        };
        if !(scoring.exact_score > scoring.correct_result && scoring.correct_result > scoring.miss) {
            return Err(AppError::configuration(format!(
                "scoring points must satisfy exact > result > miss, got {} / {} / {}",
                scoring.exact_score, scoring.correct_result, scoring.miss
            )));
        }

        Ok(AppConfig {
            database_url: required("DATABASE_URL")?,
            database_name: lookup("DATABASE_NAME").unwrap_or_else(|| "bolao".to_string()),
            jwt_secret: required("JWT_SECRET")?,
            sports_api_url: lookup("SPORTS_API_URL")
                .unwrap_or_else(|| DEFAULT_SPORTS_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            sports_api_key: required("SPORTS_API_KEY")?,
            sports_api_timeout: Duration::from_secs(parse_or(&lookup, "SPORTS_API_TIMEOUT_SECS", 10)?),
            scoring,
            port: parse_or(&lookup, "PORT", 10000)?,
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| AppError::configuration(format!("{} must be a number, got '{}'", key, raw))),
        _ => Ok(default),
    }
}
