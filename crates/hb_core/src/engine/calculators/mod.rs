//! Pure probability calculators.
//!
//! Every function here is deterministic given its inputs: the caller draws the
//! random numbers from the match RNG into a `*Rolls` struct and passes them
//! in. Nothing in this module touches `MatchState`.

pub mod block;
pub mod foul;
pub mod interception;
pub mod pass;
pub mod shot;
pub mod tackle;

pub use block::{block_kind, block_probability, rebound_velocity, BlockInput};
pub use foul::{assess_foul, severity_score, FoulContext};
pub use interception::{interception_probability, InterceptionInput};
pub use pass::{
    catch_probability, pass_accuracy, pre_release_interception_chance, resolve_pass, PassExecution,
    PassInput, PassRolls,
};
pub use shot::{
    resolve_shot, save_probability, shot_allowed, zone_error_chance, SaveInput, ShotExecution,
    ShotInput, ShotRolls,
};
pub use tackle::{
    resolve_tackle, tackle_probabilities, TackleInput, TackleProbabilities, TackleRolls,
    TackleVerdict,
};
