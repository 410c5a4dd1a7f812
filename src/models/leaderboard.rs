use serde::Serialize;

/// Accumulated points of one player. Recomputed on every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeadData {
    pub id: String,
    pub name: String,
    pub total: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedLead {
    pub position: usize,
    #[serde(flatten)]
    pub lead: LeadData,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardResponse {
    pub pool_id: String,
    pub pool_name: String,
    pub entries: Vec<RankedLead>,
}
