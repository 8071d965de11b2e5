//! # hb_core - Deterministic Handball Match Simulation Engine
//!
//! Two rosters, two tactics and a seed go in; a tick-by-tick evolution of
//! players, ball, score, phases and events comes out.
//!
//! ## Features
//! - 100% deterministic simulation (same seed = same event log)
//! - Fixed 0.1s timestep with a level-of-detail AI scheduler
//! - Pure probability calculators driven by pre-drawn rolls
//! - JSON API for easy integration with presentation layers

#![allow(clippy::too_many_arguments)]

pub mod api;
pub mod engine;
pub mod error;
pub mod models;

pub use api::{simulate_match, simulate_match_json, simulate_match_with_cancel, MatchRequest};
pub use engine::{CancelToken, MatchConfig, MatchSimulator};
pub use error::{Result, SimError};
pub use models::{
    MatchEvent, MatchResult, MatchSetup, MatchSnapshot, Player, PlayerAttributes, PlayerRole,
    TacticConfig, Team, TeamSide,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const SCHEMA_VERSION: u8 = 1;
