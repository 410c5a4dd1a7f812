pub mod leaderboard;
pub mod rounds;
pub mod sports_data;
