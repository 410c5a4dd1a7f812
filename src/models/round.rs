use serde::{Deserialize, Serialize};

use crate::models::fixture::Fixture;

/// Which round a page shows and where it sits in the competition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundSelection {
    pub round: String,
    // 1-based; 0 when the round is not in the list
    pub page: usize,
    pub total_pages: usize,
    pub is_first_round: bool,
    pub is_last_round: bool,
}

#[derive(Debug, Serialize)]
pub struct RoundPage {
    #[serde(flatten)]
    pub selection: RoundSelection,
    pub fixtures: Vec<Fixture>,
}

#[derive(Debug, Serialize)]
pub struct RoundList {
    pub rounds: Vec<String>,
    pub current_round: Option<String>,
}

// Query parameters for the round page
#[derive(Debug, Deserialize)]
pub struct RoundQuery {
    pub round: Option<String>,
}
