use std::sync::Arc;

use mongodb::Database;

use crate::services::leaderboard::ScoringTable;
use crate::services::sports_data::SportsDataClient;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub sports: Arc<SportsDataClient>,
    pub scoring: ScoringTable,
    pub jwt_secret: Arc<String>,
}

impl AppState {
    pub fn new(db: Database, sports: SportsDataClient, jwt_secret: String) -> Self {
        AppState {
            db,
            sports: Arc::new(sports),
            scoring: ScoringTable::default(),
            jwt_secret: Arc::new(jwt_secret),
        }
    }

    pub fn with_scoring(mut self, scoring: ScoringTable) -> Self {
        self.scoring = scoring;
        self
    }
}
