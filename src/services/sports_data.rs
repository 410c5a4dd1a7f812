use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::fixture::{Fixture, Goals, Team};

#[derive(Debug, Error)]
pub enum SportsDataError {
    #[error("could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("network error for {1}: {0}")]
    Network(#[source] reqwest::Error, String),

    #[error("sports API returned {status} for {url}")]
    Status { status: u16, url: String },

    #[error("parse error for {1}: {0}")]
    Parsing(#[source] reqwest::Error, String),

    #[error("sports API rejected the request: {0}")]
    Upstream(String),
}

pub type SportsResult<T> = std::result::Result<T, SportsDataError>;

/// Client for the API-Football style sports-data service.
#[derive(Debug, Clone)]
pub struct SportsDataClient {
    client: Client,
    base_url: String,
    api_key: String,
}

// Envelope shared by every endpoint
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    errors: serde_json::Value,
    #[serde(default = "Vec::new")]
    response: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct RawFixture {
    fixture: RawFixtureInfo,
    league: RawLeague,
    teams: RawTeams,
    #[serde(default)]
    goals: Goals,
}

#[derive(Debug, Deserialize)]
struct RawFixtureInfo {
    id: i64,
    date: DateTime<Utc>,
    status: RawStatus,
}

#[derive(Debug, Deserialize)]
struct RawStatus {
    short: String,
}

#[derive(Debug, Deserialize)]
struct RawLeague {
    id: i64,
    season: i32,
    #[serde(default)]
    round: String,
}

#[derive(Debug, Deserialize)]
struct RawTeams {
    home: Team,
    away: Team,
}

impl From<RawFixture> for Fixture {
    fn from(raw: RawFixture) -> Self {
        Fixture {
            id: raw.fixture.id,
            date: raw.fixture.date,
            status: raw.fixture.status.short,
            round: raw.league.round,
            league_id: raw.league.id,
            season: raw.league.season,
            home_team: raw.teams.home,
            away_team: raw.teams.away,
            goals: raw.goals,
        }
    }
}

fn has_errors(errors: &serde_json::Value) -> bool {
    match errors {
        serde_json::Value::Array(items) => !items.is_empty(),
        serde_json::Value::Object(map) => !map.is_empty(),
        serde_json::Value::Null => false,
        _ => true,
    }
}

impl SportsDataClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> SportsResult<Self> {
        let client = Client::builder()
            .user_agent("bolao-api/0.1")
            .timeout(timeout)
            .build()
            .map_err(SportsDataError::Client)?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// All round labels of a competition season, in the order the source
    /// reports them.
    pub async fn fetch_rounds(&self, league_id: i64, season: i32) -> SportsResult<Vec<String>> {
        let query = [("league", league_id.to_string()), ("season", season.to_string())];
        self.get::<String>("/fixtures/rounds", &query).await
    }

    /// The round the source considers active right now, if any.
    pub async fn fetch_current_round(&self, league_id: i64, season: i32) -> SportsResult<Option<String>> {
        let query = [
            ("league", league_id.to_string()),
            ("season", season.to_string()),
            ("current", "true".to_string()),
        ];
        let rounds = self.get::<String>("/fixtures/rounds", &query).await?;
        Ok(rounds.into_iter().next())
    }

    /// Fixtures of a season, optionally restricted to one round.
    pub async fn fetch_fixtures(&self, league_id: i64, season: i32, round: Option<&str>) -> SportsResult<Vec<Fixture>> {
        let mut query = vec![("league", league_id.to_string()), ("season", season.to_string())];
        if let Some(round) = round {
            query.push(("round", round.to_string()));
        }
        let raw = self.get::<RawFixture>("/fixtures", &query).await?;
        Ok(raw.into_iter().map(Fixture::from).collect())
    }

    pub async fn fetch_fixture(&self, fixture_id: i64) -> SportsResult<Option<Fixture>> {
        let query = [("id", fixture_id.to_string())];
        let raw = self.get::<RawFixture>("/fixtures", &query).await?;
        Ok(raw.into_iter().next().map(Fixture::from))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> SportsResult<Vec<T>> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {} {:?}", url, query);

        let response = self
            .client
            .get(&url)
            .header("x-apisports-key", &self.api_key)
            .query(query)
            .send()
            .await
            .map_err(|e| SportsDataError::Network(e, url.clone()))?;

        let status = response.status();
        if !status.is_success() {
            warn!("Sports API returned {} for {}", status, url);
            return Err(SportsDataError::Status { status: status.as_u16(), url });
        }

        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| SportsDataError::Parsing(e, url.clone()))?;

        if has_errors(&envelope.errors) {
            warn!("Sports API errors for {}: {}", url, envelope.errors);
            return Err(SportsDataError::Upstream(envelope.errors.to_string()));
        }

        Ok(envelope.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn client(server: &mockito::Server) -> SportsDataClient {
        SportsDataClient::new(server.url(), "test-key", Duration::from_secs(5)).unwrap()
    }

    fn raw_fixture(id: i64, date: &str, status: &str, goals: serde_json::Value) -> serde_json::Value {
        json!({
            "fixture": { "id": id, "date": date, "status": { "long": "whatever", "short": status } },
            "league": { "id": 71, "season": 2024, "round": "Regular Season - 12" },
            "teams": {
                "home": { "id": 121, "name": "Palmeiras", "logo": "https://img/121.png" },
                "away": { "id": 127, "name": "Flamengo" }
            },
            "goals": goals
        })
    }

    #[tokio::test]
    async fn fetches_round_labels_with_api_key() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/fixtures/rounds")
            .match_header("x-apisports-key", "test-key")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("league".into(), "71".into()),
                Matcher::UrlEncoded("season".into(), "2024".into()),
            ]))
            .with_body(json!({ "errors": [], "response": ["Regular Season - 1", "Regular Season - 2"] }).to_string())
            .create_async()
            .await;

        let rounds = client(&server).fetch_rounds(71, 2024).await.unwrap();
        assert_eq!(rounds, vec!["Regular Season - 1", "Regular Season - 2"]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn current_round_uses_current_flag() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/fixtures/rounds")
            .match_query(Matcher::UrlEncoded("current".into(), "true".into()))
            .with_body(json!({ "errors": [], "response": ["Regular Season - 12"] }).to_string())
            .create_async()
            .await;

        let current = client(&server).fetch_current_round(71, 2024).await.unwrap();
        assert_eq!(current.as_deref(), Some("Regular Season - 12"));
    }

    #[tokio::test]
    async fn fixtures_are_mapped() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/fixtures")
            .match_query(Matcher::UrlEncoded("round".into(), "Regular Season - 12".into()))
            .with_body(
                json!({
                    "errors": {},
                    "response": [
                        raw_fixture(1001, "2024-06-01T19:00:00+00:00", "FT", json!({ "home": 2, "away": 0 })),
                        raw_fixture(1002, "2024-06-01T21:30:00+00:00", "NS", json!({ "home": null, "away": null })),
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let fixtures = client(&server)
            .fetch_fixtures(71, 2024, Some("Regular Season - 12"))
            .await
            .unwrap();

        assert_eq!(fixtures.len(), 2);
        assert_eq!(fixtures[0].id, 1001);
        assert_eq!(fixtures[0].home_team.name, "Palmeiras");
        assert_eq!(fixtures[0].away_team.logo, None);
        assert_eq!(fixtures[0].outcome().map(|o| (o.home, o.away)), Some((2, 0)));
        assert_eq!(fixtures[1].goals, Goals::default());
        assert!(!fixtures[1].has_started());
    }

    #[tokio::test]
    async fn error_payload_in_ok_response_is_upstream_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/fixtures/rounds")
            .match_query(Matcher::Any)
            .with_body(json!({ "errors": { "token": "Error/Missing application key" }, "response": [] }).to_string())
            .create_async()
            .await;

        let err = client(&server).fetch_rounds(71, 2024).await.unwrap_err();
        assert!(matches!(err, SportsDataError::Upstream(msg) if msg.contains("application key")));
    }

    #[tokio::test]
    async fn http_failure_is_status_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/fixtures")
            .match_query(Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let err = client(&server).fetch_fixture(1).await.unwrap_err();
        assert!(matches!(err, SportsDataError::Status { status: 503, .. }));
    }

    #[tokio::test]
    async fn unknown_fixture_is_none() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/fixtures")
            .match_query(Matcher::UrlEncoded("id".into(), "42".into()))
            .with_body(json!({ "errors": [], "response": [] }).to_string())
            .create_async()
            .await;

        assert_eq!(client(&server).fetch_fixture(42).await.unwrap(), None);
    }

    #[tokio::test]
    async fn slow_source_hits_the_configured_timeout() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            // Accept and never answer
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
        });

        let client = SportsDataClient::new(format!("http://{}", addr), "test-key", Duration::from_millis(200)).unwrap();
        let err = client.fetch_rounds(71, 2024).await.unwrap_err();
        assert!(matches!(err, SportsDataError::Network(ref e, _) if e.is_timeout()));
    }
}
