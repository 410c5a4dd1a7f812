use axum::{
    extract::{Path, State},
    response::Json,
    Extension,
};
use chrono::Utc;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, to_bson};
use mongodb::options::ReturnDocument;
use mongodb::Collection;
use validator::Validate;

use crate::{
    database::connection::BETS,
    errors::{AppError, Result},
    handlers::pools::{find_pool, require_membership},
    models::bets::{Bet, BetResponse, PlaceBetRequest, Prediction},
    models::user::Claims,
    state::AppState,
};

// Place or replace the caller's bet on a fixture
pub async fn place_bet(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(pool_id): Path<String>,
    Json(payload): Json<PlaceBetRequest>,
) -> Result<Json<BetResponse>> {
    payload.validate()?;
    tracing::info!("🎯 Bet from {} on fixture {} in pool {}", claims.sub, payload.fixture_id, pool_id);

    let bet_type = payload.bet_type.trim().to_lowercase();
    let value = payload.value.trim().to_string();
    if Prediction::parse(&bet_type, &value).is_none() {
        return Err(AppError::invalid_data(format!(
            "'{}' is not a valid value for a '{}' bet",
            value, bet_type
        )));
    }

    let pool = find_pool(&state.db, &pool_id)
        .await?
        .ok_or(AppError::PoolNotFound)?;
    let membership = require_membership(&state.db, &pool_id, &claims.sub).await?;

    let fixture = state
        .sports
        .fetch_fixture(payload.fixture_id)
        .await?
        .ok_or(AppError::FixtureNotFound)?;

    if fixture.league_id != pool.competition_id || fixture.season != pool.season {
        return Err(AppError::invalid_data("Fixture does not belong to this pool's competition"));
    }
    if fixture.has_started() {
        return Err(AppError::betting_closed(format!(
            "fixture {} has status {}",
            fixture.id, fixture.status
        )));
    }

    let now = to_bson(&Utc::now())?;
    let collection: Collection<Bet> = state.db.collection(BETS);
    let bet = collection
        .find_one_and_update(
            doc! {
                "user_bolao_id": membership.id_hex(),
                "fixture_id": payload.fixture_id,
                "type": bet_type.as_str(),
            },
            doc! {
                "$set": { "value": value.as_str(), "updated_at": now.clone() },
                "$setOnInsert": { "created_at": now },
            },
        )
        .upsert(true)
        .return_document(ReturnDocument::After)
        .await?
        .ok_or(AppError::DocumentNotFound)?;

    tracing::info!("✅ Saved {} bet '{}' for membership {}", bet_type, value, membership.id_hex());
    Ok(Json(BetResponse::from(bet)))
}

// The caller's bets in a pool
pub async fn get_my_bets(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(pool_id): Path<String>,
) -> Result<Json<Vec<BetResponse>>> {
    let membership = require_membership(&state.db, &pool_id, &claims.sub).await?;

    let collection: Collection<Bet> = state.db.collection(BETS);
    let bets: Vec<Bet> = collection
        .find(doc! { "user_bolao_id": membership.id_hex() })
        .sort(doc! { "fixture_id": 1 })
        .await?
        .try_collect()
        .await?;

    tracing::info!("✅ Fetched {} bets for membership {}", bets.len(), membership.id_hex());
    Ok(Json(bets.into_iter().map(BetResponse::from).collect()))
}
