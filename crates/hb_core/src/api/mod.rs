pub mod json_api;

pub use json_api::{
    simulate_match, simulate_match_json, simulate_match_with_cancel, MatchRequest, PlayerData,
    TeamData,
};
