pub mod attendance;
pub mod config;
pub mod game_stats;
pub mod identity;
pub mod model;
pub mod pipeline;
pub mod player_stats;
pub mod report;
pub mod rules;
pub mod store;
