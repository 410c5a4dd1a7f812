use axum::{
    extract::{Path, State},
    response::Json,
    Extension,
};
use futures_util::TryStreamExt;
use mongodb::bson::doc;
use mongodb::{Collection, Database};

use crate::{
    database::connection::BETS,
    errors::Result,
    handlers::pools::{list_memberships, lookup_member_pool},
    models::bets::Bet,
    models::fixture::Fixture,
    models::leaderboard::LeaderboardResponse,
    models::lookup::Lookup,
    models::pool::{Membership, Pool},
    models::user::Claims,
    services::leaderboard::{calc_lead, rank, ScoringRule},
    services::sports_data::SportsResult,
    state::AppState,
};

// Members of a pool together with every bet they placed
async fn load_players_and_bets(db: &Database, pool_id: &str) -> Result<(Vec<Membership>, Vec<Bet>)> {
    let players = list_memberships(db, pool_id).await?;
    let ids: Vec<String> = players.iter().map(Membership::id_hex).collect();

    let collection: Collection<Bet> = db.collection(BETS);
    let bets: Vec<Bet> = collection
        .find(doc! { "user_bolao_id": { "$in": ids } })
        .await?
        .try_collect()
        .await?;

    Ok((players, bets))
}

// Scores and ranks once both the stored bets and the season's fixtures are in
fn build_leaderboard<R: ScoringRule + ?Sized>(
    pool_id: String,
    pool: Pool,
    stored: Result<(Vec<Membership>, Vec<Bet>)>,
    fixtures: SportsResult<Vec<Fixture>>,
    rule: &R,
) -> Lookup<LeaderboardResponse> {
    let (players, bets) = match stored {
        Ok(stored) => stored,
        Err(e) => {
            tracing::error!("Failed to load members and bets for pool {}: {}", pool_id, e);
            return Lookup::Error(format!("bets unavailable: {}", e));
        }
    };
    let fixtures = match fixtures {
        Ok(fixtures) => fixtures,
        Err(e) => {
            tracing::error!("Failed to fetch fixtures for league {}: {}", pool.competition_id, e);
            return Lookup::Error(format!("fixtures unavailable: {}", e));
        }
    };

    let lead = calc_lead(&players, &fixtures, &bets, rule);
    tracing::info!(
        "✅ Scored {} bets across {} players and {} fixtures",
        bets.len(),
        players.len(),
        fixtures.len()
    );

    Lookup::Found(LeaderboardResponse {
        pool_id,
        pool_name: pool.name,
        entries: rank(&lead),
    })
}

pub async fn get_leaderboard(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(pool_id): Path<String>,
) -> Result<Json<Lookup<LeaderboardResponse>>> {
    tracing::info!("📊 Leaderboard for pool {}", pool_id);

    let pool = match lookup_member_pool(&state.db, &pool_id, &claims.sub).await?.into_result() {
        Ok(pool) => pool,
        Err(missing) => return Ok(Json(missing)),
    };

    let (stored, fixtures) = tokio::join!(
        load_players_and_bets(&state.db, &pool_id),
        state.sports.fetch_fixtures(pool.competition_id, pool.season, None),
    );

    Ok(Json(build_leaderboard(pool_id, pool, stored, fixtures, &state.scoring)))
}
