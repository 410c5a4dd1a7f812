use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::handlers::{bets, leaderboard, pools, rounds};
use crate::middleware::auth::auth_middleware;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(pools::get_my_pools).post(pools::create_pool))
        .route("/join/:invite_code", post(pools::join_pool))
        .route("/:id", get(pools::get_pool))
        .route("/:id/members", get(pools::get_members))
        .route("/:id/rounds", get(rounds::get_round_page))
        .route("/:id/rounds/all", get(rounds::get_rounds))
        .route("/:id/leaderboard", get(leaderboard::get_leaderboard))
        .route("/:id/bets", get(bets::get_my_bets).put(bets::place_bet))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
