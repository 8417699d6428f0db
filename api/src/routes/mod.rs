pub mod chat;
pub mod health;
pub mod history;
pub mod leaderboard;
pub mod predictions;
pub mod users;
