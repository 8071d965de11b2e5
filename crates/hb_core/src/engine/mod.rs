pub mod action_resolver;
pub mod action_result;
pub mod ai;
pub mod ball;
pub mod calculators;
pub mod config;
pub mod decision;
pub mod evaluators;
pub mod event_detector;
pub mod event_handler;
pub mod geometry;
pub mod match_state;
pub mod messages;
pub mod movement;
pub mod orchestrator;
pub mod passive_play;
pub mod phase;
pub mod physics_constants;
pub mod sim_player;
pub mod snapshot;
pub mod substitutions;
pub mod timeouts;

#[cfg(test)]
pub(crate) mod test_fixtures;

#[cfg(test)]
mod contract_tests;

pub use action_result::{ActionResult, BlockKind, FoulDetails, FoulSeverity, Outcome, ReasonTag};
pub use ball::{BallState, SimBall};
pub use config::MatchConfig;
pub use match_state::{MatchState, Possession};
pub use orchestrator::{CancelToken, MatchSimulator};
pub use phase::{MatchPhase, PhaseManager};
pub use sim_player::{PlayerAction, SimPlayer};
