pub(crate) mod bets;
pub(crate) mod leaderboard;
pub(crate) mod pools;
pub(crate) mod rounds;
