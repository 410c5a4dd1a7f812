pub mod bets;
pub mod fixture;
pub mod leaderboard;
pub mod lookup;
pub mod pool;
pub mod round;
pub mod user;
