//! Per-player runtime state.

use log::debug;
use nalgebra::Vector2;

use super::geometry;
use super::physics_constants::{movement, skills};
use crate::models::{Player, PlayerAttributes, PlayerRole, TeamSide};

const BODY_EPS: f32 = 1e-4;

/// Discrete player action. `Preparing*` and `Tackling` carry a countdown and
/// are resolved by the action resolver when it elapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerAction {
    Idle,
    MovingToPosition,
    MovingWithBall,
    Dribbling,
    ReceivingPass,
    PreparingPass,
    Passing,
    PreparingShot,
    Shooting,
    Tackling,
    Intercepting,
    Blocking,
    SettingScreen,
    MarkingPlayer,
    ChasingBall,
    GoalkeeperPositioning,
    GoalkeeperSaving,
    Landing,
    Fallen,
}

impl PlayerAction {
    /// Actions that carry a resolution timer.
    pub fn is_timed(&self) -> bool {
        matches!(
            self,
            PlayerAction::PreparingPass
                | PlayerAction::PreparingShot
                | PlayerAction::Tackling
                | PlayerAction::Passing
                | PlayerAction::Shooting
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            PlayerAction::Idle => "idle",
            PlayerAction::MovingToPosition => "moving_to_position",
            PlayerAction::MovingWithBall => "moving_with_ball",
            PlayerAction::Dribbling => "dribbling",
            PlayerAction::ReceivingPass => "receiving_pass",
            PlayerAction::PreparingPass => "preparing_pass",
            PlayerAction::Passing => "passing",
            PlayerAction::PreparingShot => "preparing_shot",
            PlayerAction::Shooting => "shooting",
            PlayerAction::Tackling => "tackling",
            PlayerAction::Intercepting => "intercepting",
            PlayerAction::Blocking => "blocking",
            PlayerAction::SettingScreen => "setting_screen",
            PlayerAction::MarkingPlayer => "marking_player",
            PlayerAction::ChasingBall => "chasing_ball",
            PlayerAction::GoalkeeperPositioning => "goalkeeper_positioning",
            PlayerAction::GoalkeeperSaving => "goalkeeper_saving",
            PlayerAction::Landing => "landing",
            PlayerAction::Fallen => "fallen",
        }
    }
}

/// Jump / stumble sub-state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BodyState {
    Grounded,
    Airborne { remaining: f32 },
    Landing { remaining: f32 },
    Fallen { remaining: f32 },
}

#[derive(Debug, Clone)]
pub struct SimPlayer {
    pub idx: usize,
    pub name: String,
    pub side: TeamSide,
    pub role: PlayerRole,
    pub attributes: PlayerAttributes,
    /// Index into the tactic's offensive slots / defensive tiers
    pub tactical_slot: Option<usize>,
    pub on_court: bool,

    pub position: Vector2<f32>,
    pub velocity: Vector2<f32>,
    /// Heading in radians
    pub orientation: f32,
    pub target_position: Option<Vector2<f32>>,

    pub action: PlayerAction,
    pub action_timer: Option<f32>,
    pub target_player: Option<usize>,
    /// Set when the pending shot is a jump shot
    pub jump_shot: bool,
    /// Next clock time (s) the AI may re-evaluate this player
    pub next_decision_at: f32,

    pub has_ball: bool,
    pub stamina: f32,

    // Step / holding rules
    pub steps: u8,
    step_distance: f32,
    pub holding_time: f32,
    pub dribbled_since_possession: bool,
    pub is_dribbling: bool,
    /// Seconds since this player last caught a pass
    pub since_pass_received: Option<f32>,

    // Discipline
    pub suspension_timer: f32,
    pub yellow_cards: u8,
    pub two_minute_suspensions: u8,
    pub red_carded: bool,

    pub body: BodyState,
}

impl SimPlayer {
    pub fn new(idx: usize, side: TeamSide, player: &Player, tactical_slot: Option<usize>) -> Self {
        Self {
            idx,
            name: player.name.clone(),
            side,
            role: player.role,
            attributes: player.attributes.clone().clamped(),
            tactical_slot,
            on_court: false,
            position: Vector2::zeros(),
            velocity: Vector2::zeros(),
            orientation: 0.0,
            target_position: None,
            action: PlayerAction::Idle,
            action_timer: None,
            target_player: None,
            jump_shot: false,
            next_decision_at: 0.0,
            has_ball: false,
            stamina: 1.0,
            steps: 0,
            step_distance: 0.0,
            holding_time: 0.0,
            dribbled_since_possession: false,
            is_dribbling: false,
            since_pass_received: None,
            suspension_timer: 0.0,
            yellow_cards: 0,
            two_minute_suspensions: 0,
            red_carded: false,
            body: BodyState::Grounded,
        }
    }

    pub fn is_goalkeeper(&self) -> bool {
        self.role.is_goalkeeper()
    }

    pub fn is_suspended(&self) -> bool {
        self.suspension_timer > 0.0
    }

    /// On court, not serving a suspension, not sent off.
    pub fn is_active(&self) -> bool {
        self.on_court && !self.is_suspended() && !self.red_carded
    }

    pub fn is_airborne(&self) -> bool {
        matches!(self.body, BodyState::Airborne { .. })
    }

    pub fn is_fallen(&self) -> bool {
        matches!(self.body, BodyState::Fallen { .. })
    }

    /// Active and on their feet.
    pub fn can_act(&self) -> bool {
        self.is_active() && matches!(self.body, BodyState::Grounded)
    }

    pub fn fatigue(&self) -> f32 {
        (1.0 - self.stamina).clamp(0.0, 1.0)
    }

    pub fn facing(&self) -> Vector2<f32> {
        geometry::heading_vector(self.orientation)
    }

    pub fn max_speed(&self) -> f32 {
        let pace =
            skills::lerp(movement::MIN_PACE_FACTOR, 1.0, skills::normalize(self.attributes.pace));
        let stamina = skills::lerp(
            super::physics_constants::stamina::EXHAUSTED_SPEED_FACTOR,
            1.0,
            self.stamina,
        );
        let mut speed = movement::MAX_SPEED_MPS * pace * stamina;
        if self.has_ball {
            speed *= movement::BALL_CARRIER_SPEED_FACTOR;
        }
        if self.is_goalkeeper() {
            speed *= movement::GOALKEEPER_SPEED_FACTOR;
        }
        speed
    }

    pub fn acceleration(&self) -> f32 {
        skills::lerp(
            movement::MIN_ACCEL_MPS2,
            movement::MAX_ACCEL_MPS2,
            skills::normalize(self.attributes.acceleration),
        )
    }

    /// Possession starts: step count and dribble flag reset.
    pub fn start_possession(&mut self) {
        self.has_ball = true;
        self.steps = 0;
        self.step_distance = 0.0;
        self.holding_time = 0.0;
        self.dribbled_since_possession = false;
        self.is_dribbling = false;
    }

    pub fn release_ball(&mut self) {
        self.has_ball = false;
        self.steps = 0;
        self.step_distance = 0.0;
        self.holding_time = 0.0;
        self.is_dribbling = false;
    }

    /// Starts the single dribble allowed per possession. A second dribble is
    /// rejected and leaves the state untouched.
    pub fn start_dribble(&mut self) -> bool {
        if !self.has_ball {
            debug!("{} cannot dribble without the ball", self.name);
            return false;
        }
        if self.dribbled_since_possession {
            debug!("{} double dribble rejected", self.name);
            return false;
        }
        self.dribbled_since_possession = true;
        self.is_dribbling = true;
        self.steps = 0;
        self.step_distance = 0.0;
        self.holding_time = 0.0;
        true
    }

    /// Picks the ball up again: a fresh set of steps and holding time.
    pub fn stop_dribble(&mut self) {
        if self.is_dribbling {
            self.is_dribbling = false;
            self.steps = 0;
            self.step_distance = 0.0;
            self.holding_time = 0.0;
        }
    }

    /// Accumulates steps and holding time for a carrier that moved `distance`.
    pub fn record_carry(&mut self, distance: f32, dt: f32) {
        if !self.has_ball || self.is_dribbling {
            return;
        }
        self.holding_time += dt;
        if self.is_airborne() {
            return;
        }
        self.step_distance += distance;
        while self.step_distance >= movement::STEP_LENGTH_M {
            self.step_distance -= movement::STEP_LENGTH_M;
            self.steps = self.steps.saturating_add(1);
        }
    }

    pub fn steps_violated(&self) -> bool {
        self.has_ball && !self.is_dribbling && self.steps > movement::MAX_STEPS
    }

    pub fn holding_violated(&self) -> bool {
        self.has_ball && !self.is_dribbling && self.holding_time > movement::MAX_HOLDING_TIME_S
    }

    pub fn set_action(&mut self, action: PlayerAction, timer: Option<f32>) {
        self.action = action;
        self.action_timer = timer;
    }

    pub fn reset_action(&mut self) {
        self.action = PlayerAction::Idle;
        self.action_timer = None;
        self.target_player = None;
        self.jump_shot = false;
    }

    pub fn start_jump(&mut self) {
        self.body = BodyState::Airborne { remaining: movement::JUMP_AIRTIME_S };
    }

    /// Stumble after a lost duel.
    pub fn fall(&mut self) {
        self.body = BodyState::Fallen { remaining: movement::FALLEN_TIME_S };
        self.velocity = Vector2::zeros();
        self.set_action(PlayerAction::Fallen, None);
        self.target_player = None;
    }

    /// Advances the jump / stumble sub-state.
    pub fn tick_body(&mut self, dt: f32) {
        let body = self.body;
        self.body = match body {
            BodyState::Grounded => BodyState::Grounded,
            BodyState::Airborne { remaining } if remaining - dt > BODY_EPS => {
                BodyState::Airborne { remaining: remaining - dt }
            }
            BodyState::Airborne { .. } => {
                if !self.action.is_timed() {
                    self.set_action(PlayerAction::Landing, None);
                }
                BodyState::Landing { remaining: movement::LANDING_TIME_S }
            }
            BodyState::Landing { remaining } if remaining - dt > BODY_EPS => {
                BodyState::Landing { remaining: remaining - dt }
            }
            BodyState::Fallen { remaining } if remaining - dt > BODY_EPS => {
                BodyState::Fallen { remaining: remaining - dt }
            }
            BodyState::Landing { .. } | BodyState::Fallen { .. } => {
                if matches!(self.action, PlayerAction::Landing | PlayerAction::Fallen) {
                    self.reset_action();
                }
                BodyState::Grounded
            }
        };
        if let Some(t) = self.since_pass_received.as_mut() {
            *t += dt;
        }
    }

    /// Full reset used after goals and at half time.
    pub fn reset_for_restart(&mut self) {
        self.reset_action();
        self.release_ball();
        self.dribbled_since_possession = false;
        self.velocity = Vector2::zeros();
        self.target_position = None;
        self.body = BodyState::Grounded;
        self.since_pass_received = None;
        self.next_decision_at = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> SimPlayer {
        let p = Player::new("Back", PlayerRole::LeftBack, PlayerAttributes::uniform(60));
        SimPlayer::new(0, TeamSide::Home, &p, Some(1))
    }

    #[test]
    fn test_start_possession_resets_step_rule() {
        let mut p = player();
        p.start_possession();
        p.record_carry(2.0, 0.5);
        assert!(p.start_dribble());
        p.stop_dribble();
        p.record_carry(1.0, 0.1);
        assert!(p.steps > 0 && p.dribbled_since_possession);

        p.start_possession();
        assert_eq!(p.steps, 0);
        assert!(!p.dribbled_since_possession);
        assert_eq!(p.holding_time, 0.0);
    }

    #[test]
    fn test_second_dribble_is_rejected() {
        let mut p = player();
        p.start_possession();
        assert!(p.start_dribble());
        p.stop_dribble();
        p.record_carry(1.0, 0.2);
        let steps_before = p.steps;
        assert!(!p.start_dribble());
        assert!(!p.is_dribbling);
        assert_eq!(p.steps, steps_before);
    }

    #[test]
    fn test_steps_accumulate_only_on_ground() {
        let mut p = player();
        p.start_possession();
        p.record_carry(movement::STEP_LENGTH_M * 2.5, 0.3);
        assert_eq!(p.steps, 2);
        p.start_jump();
        p.record_carry(5.0, 0.3);
        assert_eq!(p.steps, 2);
        p.body = BodyState::Grounded;
        p.record_carry(movement::STEP_LENGTH_M * 2.0, 0.3);
        assert!(p.steps_violated());
    }

    #[test]
    fn test_holding_time_violation() {
        let mut p = player();
        p.start_possession();
        for _ in 0..31 {
            p.record_carry(0.0, 0.1);
        }
        assert!(p.holding_violated());
    }

    #[test]
    fn test_carrier_is_slower() {
        let mut p = player();
        let free = p.max_speed();
        p.start_possession();
        assert!(p.max_speed() < free);
        assert!(free <= movement::MAX_SPEED_MPS);
    }

    #[test]
    fn test_jump_then_land_then_ground() {
        let mut p = player();
        p.start_jump();
        assert!(p.is_airborne());
        for _ in 0..6 {
            p.tick_body(0.1);
        }
        assert!(matches!(p.body, BodyState::Landing { .. }));
        for _ in 0..3 {
            p.tick_body(0.1);
        }
        assert_eq!(p.body, BodyState::Grounded);
        assert_eq!(p.action, PlayerAction::Idle);
    }

    #[test]
    fn test_fall_blocks_actions() {
        let mut p = player();
        p.on_court = true;
        p.fall();
        assert!(!p.can_act());
        for _ in 0..10 {
            p.tick_body(0.1);
        }
        assert!(p.can_act());
    }
}
