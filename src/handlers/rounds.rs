use axum::{
    extract::{Path, Query, State},
    response::Json,
    Extension,
};

use crate::{
    errors::Result,
    handlers::pools::lookup_member_pool,
    models::lookup::Lookup,
    models::pool::Pool,
    models::round::{RoundList, RoundPage, RoundQuery},
    models::user::Claims,
    services::rounds::{clean_rounds, pick_round, sort_fixtures},
    services::sports_data::SportsDataClient,
    state::AppState,
};

// Round list and current round, fetched together
async fn load_rounds(sports: &SportsDataClient, pool: &Pool) -> Lookup<RoundList> {
    let (all, current) = tokio::join!(
        sports.fetch_rounds(pool.competition_id, pool.season),
        sports.fetch_current_round(pool.competition_id, pool.season),
    );

    let rounds = match all {
        Ok(raw) => clean_rounds(raw),
        Err(e) => {
            tracing::error!("Failed to fetch rounds for league {}: {}", pool.competition_id, e);
            return Lookup::Error(format!("round list unavailable: {}", e));
        }
    };
    let current_round = match current {
        Ok(current) => current.map(|r| r.trim().to_string()),
        Err(e) => {
            tracing::error!("Failed to fetch current round for league {}: {}", pool.competition_id, e);
            return Lookup::Error(format!("current round unavailable: {}", e));
        }
    };

    if rounds.is_empty() {
        return Lookup::NotFound;
    }
    Lookup::Found(RoundList { rounds, current_round })
}

async fn load_round_page(sports: &SportsDataClient, pool: &Pool, round_param: Option<&str>) -> Lookup<RoundPage> {
    let list = match load_rounds(sports, pool).await.into_result() {
        Ok(list) => list,
        Err(missing) => return missing,
    };

    let selection = match pick_round(&list, round_param).into_result() {
        Ok(selection) => selection,
        Err(missing) => {
            tracing::info!("No round for param {:?} in league {}", round_param, pool.competition_id);
            return missing;
        }
    };

    match sports
        .fetch_fixtures(pool.competition_id, pool.season, Some(selection.round.as_str()))
        .await
    {
        Ok(fixtures) => {
            tracing::info!("✅ {} fixtures for '{}'", fixtures.len(), selection.round);
            Lookup::Found(RoundPage {
                fixtures: sort_fixtures(&fixtures),
                selection,
            })
        }
        Err(e) => {
            tracing::error!("Failed to fetch fixtures for '{}': {}", selection.round, e);
            Lookup::Error(format!("fixtures unavailable: {}", e))
        }
    }
}

pub async fn get_rounds(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(pool_id): Path<String>,
) -> Result<Json<Lookup<RoundList>>> {
    let pool = match lookup_member_pool(&state.db, &pool_id, &claims.sub).await?.into_result() {
        Ok(pool) => pool,
        Err(missing) => return Ok(Json(missing)),
    };
    Ok(Json(load_rounds(&state.sports, &pool).await))
}

/// One round of fixtures. `?round=N` pages through the competition, 1-based;
/// without it the current round is shown.
pub async fn get_round_page(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(pool_id): Path<String>,
    Query(query): Query<RoundQuery>,
) -> Result<Json<Lookup<RoundPage>>> {
    tracing::info!("🔍 Round page for pool {} (round param: {:?})", pool_id, query.round);

    let pool = match lookup_member_pool(&state.db, &pool_id, &claims.sub).await?.into_result() {
        Ok(pool) => pool,
        Err(missing) => return Ok(Json(missing)),
    };

    Ok(Json(load_round_page(&state.sports, &pool, query.round.as_deref()).await))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;
    use std::time::Duration;

    fn pool() -> Pool {
        Pool::new("Office pool".into(), 71, 2024, "owner".into())
    }

    fn sports(server: &mockito::Server) -> SportsDataClient {
        SportsDataClient::new(server.url(), "test-key", Duration::from_secs(5)).unwrap()
    }

    fn raw_fixture(id: i64, date: &str) -> serde_json::Value {
        json!({
            "fixture": { "id": id, "date": date, "status": { "short": "NS" } },
            "league": { "id": 71, "season": 2024, "round": "R3" },
            "teams": { "home": { "id": 1, "name": "Santos" }, "away": { "id": 2, "name": "Bahia" } },
            "goals": { "home": null, "away": null }
        })
    }

    #[tokio::test]
    async fn unavailable_source_is_a_tagged_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/fixtures/rounds")
            .match_query(Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let list = load_rounds(&sports(&server), &pool()).await;
        let body = serde_json::to_value(&list).unwrap();
        assert_eq!(body["status"], "error");
        assert!(body["data"].as_str().unwrap().contains("503"));

        let page = load_round_page(&sports(&server), &pool(), None).await;
        assert!(matches!(page, Lookup::Error(_)));
    }

    #[tokio::test]
    async fn finished_season_shows_last_round_sorted() {
        let mut server = mockito::Server::new_async().await;
        let _all = server
            .mock("GET", "/fixtures/rounds")
            .match_query(Matcher::Exact("league=71&season=2024".into()))
            .with_body(json!({ "errors": [], "response": ["R1", "R2", "R3"] }).to_string())
            .create_async()
            .await;
        let _current = server
            .mock("GET", "/fixtures/rounds")
            .match_query(Matcher::UrlEncoded("current".into(), "true".into()))
            .with_body(json!({ "errors": [], "response": [] }).to_string())
            .create_async()
            .await;
        let fixtures = server
            .mock("GET", "/fixtures")
            .match_query(Matcher::UrlEncoded("round".into(), "R3".into()))
            .with_body(
                json!({
                    "errors": [],
                    "response": [
                        raw_fixture(30, "2024-12-08T21:00:00+00:00"),
                        raw_fixture(10, "2024-12-08T16:00:00+00:00"),
                        raw_fixture(20, "2024-12-08T18:30:00+00:00"),
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let page = load_round_page(&sports(&server), &pool(), None).await.found().unwrap();

        assert_eq!(page.selection.round, "R3");
        assert_eq!(page.selection.page, 3);
        assert!(page.selection.is_last_round);
        assert_eq!(page.fixtures.iter().map(|f| f.id).collect::<Vec<_>>(), vec![10, 20, 30]);
        fixtures.assert_async().await;
    }

    #[tokio::test]
    async fn page_past_the_end_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _rounds = server
            .mock("GET", "/fixtures/rounds")
            .match_query(Matcher::Any)
            .with_body(json!({ "errors": [], "response": ["R1"] }).to_string())
            .create_async()
            .await;

        let page = load_round_page(&sports(&server), &pool(), Some("2")).await;
        assert_eq!(serde_json::to_value(&page).unwrap(), json!({ "status": "not_found" }));
    }
}
