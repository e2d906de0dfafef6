pub mod matchmaking;
pub mod players;

pub use matchmaking::MatchmakingService;
pub use players::PlayerService;
