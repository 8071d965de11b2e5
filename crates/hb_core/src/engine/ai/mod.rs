//! AI controllers.
//!
//! Each controller turns a decision-maker choice plus positioning into one
//! `AiCommand` per player per AI tick. Commands are computed against a shared
//! borrow of the state and applied afterwards, so every player in a tick sees
//! the same snapshot.

pub mod defensive;
pub mod goalkeeper;
pub mod offensive;
pub mod positioning;
pub mod scheduler;

use log::debug;
use nalgebra::Vector2;

use self::scheduler::{is_due, lod_tier, next_decision_at};
use super::match_state::MatchState;
use super::sim_player::{PlayerAction, SimPlayer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DribbleIntent {
    Keep,
    Start,
    Stop,
}

/// One resolved action for one player.
#[derive(Debug, Clone, PartialEq)]
pub struct AiCommand {
    pub action: PlayerAction,
    pub timer: Option<f32>,
    pub target_player: Option<usize>,
    pub target_position: Option<Vector2<f32>>,
    pub dribble: DribbleIntent,
    pub jump: bool,
}

impl AiCommand {
    pub fn new(action: PlayerAction) -> Self {
        Self {
            action,
            timer: None,
            target_player: None,
            target_position: None,
            dribble: DribbleIntent::Keep,
            jump: false,
        }
    }

    pub fn idle() -> Self {
        Self::new(PlayerAction::Idle)
    }

    pub fn move_to(action: PlayerAction, spot: Vector2<f32>) -> Self {
        Self::new(action).toward(spot)
    }

    pub fn toward(mut self, spot: Vector2<f32>) -> Self {
        self.target_position = Some(spot);
        self
    }

    pub fn on(mut self, player: usize) -> Self {
        self.target_player = Some(player);
        self
    }

    pub fn timed(mut self, secs: f32) -> Self {
        self.timer = Some(secs);
        self
    }

    pub fn dribbling(mut self, intent: DribbleIntent) -> Self {
        self.dribble = intent;
        self
    }

    pub fn jumping(mut self) -> Self {
        self.jump = true;
        self
    }
}

/// Applies a command to its player.
pub fn apply_command(player: &mut SimPlayer, cmd: &AiCommand) {
    match cmd.dribble {
        DribbleIntent::Start => {
            player.start_dribble();
        }
        DribbleIntent::Stop => player.stop_dribble(),
        DribbleIntent::Keep => {}
    }
    player.set_action(cmd.action, cmd.timer);
    player.target_player = cmd.target_player;
    player.target_position = cmd.target_position;
    player.jump_shot = cmd.jump && cmd.action == PlayerAction::PreparingShot;
    if player.jump_shot {
        player.start_jump();
    }
}

/// Which controller owns `idx` this tick.
fn command_for(state: &MatchState, idx: usize) -> AiCommand {
    let player = &state.players[idx];
    if player.is_goalkeeper() {
        return goalkeeper::command(state, idx);
    }
    let attacking = match state.holder_side() {
        Some(side) => side == player.side,
        // In-flight passes still belong to the passing team
        None => state.ball.pass.as_ref().map(|p| p.team) == Some(player.side),
    };
    if attacking {
        offensive::command(state, idx)
    } else {
        defensive::command(state, idx)
    }
}

/// Runs every due player's controller once.
pub fn run_ai(state: &mut MatchState) {
    let now = state.elapsed();
    let ball = state.ball.ground_position();
    let holder = state.holder();
    let pass_target = state.ball.pass.as_ref().map(|p| p.target);

    let mut commands = Vec::new();
    for p in state.players.iter() {
        // Timed actions run to resolution; stumbling or airborne players
        // cannot pick a new action.
        if !p.can_act() || p.action_timer.is_some() {
            continue;
        }
        if !is_due(now, p.next_decision_at) {
            continue;
        }
        let tier = lod_tier(p.idx, &p.position, &ball, holder, pass_target);
        commands.push((p.idx, command_for(state, p.idx), next_decision_at(now, tier)));
    }

    for (idx, cmd, next_at) in commands {
        let player = &mut state.players[idx];
        if player.action != cmd.action {
            debug!("{} {} -> {}", player.name, player.action.label(), cmd.action.label());
        }
        apply_command(player, &cmd);
        player.next_decision_at = next_at;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_fixtures::{fixture_state, player_with_role};
    use crate::models::{PlayerRole, TeamSide};

    #[test]
    fn test_apply_jump_shot_leaves_ground() {
        let mut state = fixture_state(4);
        let idx = player_with_role(&state, TeamSide::Home, PlayerRole::LeftBack);
        let cmd = AiCommand::new(PlayerAction::PreparingShot).timed(0.6).jumping();
        apply_command(&mut state.players[idx], &cmd);
        assert!(state.players[idx].is_airborne());
        assert!(state.players[idx].jump_shot);
        assert_eq!(state.players[idx].action_timer, Some(0.6));
    }

    #[test]
    fn test_jump_flag_ignored_for_other_actions() {
        let mut state = fixture_state(4);
        let idx = player_with_role(&state, TeamSide::Home, PlayerRole::LeftBack);
        let cmd =
            AiCommand::move_to(PlayerAction::MovingToPosition, Vector2::new(10.0, 10.0)).jumping();
        apply_command(&mut state.players[idx], &cmd);
        assert!(!state.players[idx].is_airborne());
    }

    #[test]
    fn test_run_ai_respects_schedule() {
        let mut state = fixture_state(4);
        run_ai(&mut state);
        let scheduled: Vec<f32> = state
            .players
            .iter()
            .filter(|p| p.is_active())
            .map(|p| p.next_decision_at)
            .collect();
        assert!(scheduled.iter().all(|&t| t > 0.0));

        // Nobody is due again at the same instant
        for p in state.players.iter_mut() {
            p.action = PlayerAction::Idle;
        }
        run_ai(&mut state);
        assert!(state.players.iter().all(|p| p.action == PlayerAction::Idle));
    }

    #[test]
    fn test_timed_actions_are_not_interrupted() {
        let mut state = fixture_state(4);
        let idx = player_with_role(&state, TeamSide::Home, PlayerRole::CentreBack);
        state.give_ball_to(idx);
        state.players[idx].set_action(PlayerAction::PreparingPass, Some(0.3));
        run_ai(&mut state);
        assert_eq!(state.players[idx].action, PlayerAction::PreparingPass);
        assert_eq!(state.players[idx].action_timer, Some(0.3));
    }
}
