pub mod nhl_players;
pub mod nhl_stats;
pub mod util;
