//! Ball state and flight physics.

use nalgebra::{Vector2, Vector3};

use crate::models::TeamSide;

const GRAVITY_MPS2: f32 = 9.81;
const BOUNCE_RESTITUTION: f32 = 0.55;
const BOUNCE_FRICTION: f32 = 0.8;
/// Vertical speed below which a bounce settles into rolling
const MIN_BOUNCE_VZ: f32 = 1.0;
const ROLLING_DECEL_MPS2: f32 = 3.0;
/// Below this speed a rolling ball is loose
const LOOSE_SPEED_MPS: f32 = 0.3;
const SPIN_DECAY_PER_S: f32 = 0.5;
/// Ball height while carried
pub const CARRY_HEIGHT_M: f32 = 1.0;

/// Exactly one of these is authoritative at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BallState {
    Held(usize),
    InFlight,
    Rolling,
    Loose,
}

impl BallState {
    pub fn label(&self) -> &'static str {
        match self {
            BallState::Held(_) => "held",
            BallState::InFlight => "in_flight",
            BallState::Rolling => "rolling",
            BallState::Loose => "loose",
        }
    }
}

/// Active pass: who threw it, to whom, from where.
#[derive(Debug, Clone, PartialEq)]
pub struct PassContext {
    pub passer: usize,
    pub target: usize,
    pub team: TeamSide,
    pub origin: Vector2<f32>,
}

/// Active shot.
#[derive(Debug, Clone, PartialEq)]
pub struct ShotContext {
    pub shooter: usize,
    pub team: TeamSide,
    pub origin: Vector2<f32>,
    pub goal_x: f32,
    /// 0..1, higher is harder for the keeper
    pub save_difficulty: f32,
    pub speed: f32,
    pub is_penalty: bool,
}

#[derive(Debug, Clone)]
pub struct SimBall {
    pub position: Vector3<f32>,
    pub previous_position: Vector3<f32>,
    pub velocity: Vector3<f32>,
    pub angular_velocity: Vector3<f32>,
    pub state: BallState,
    pub last_touch_team: Option<TeamSide>,
    pub last_touch_player: Option<usize>,
    pub pass: Option<PassContext>,
    pub shot: Option<ShotContext>,
}

impl Default for SimBall {
    fn default() -> Self {
        Self::new()
    }
}

impl SimBall {
    pub fn new() -> Self {
        let center = Vector3::new(20.0, 10.0, 0.0);
        Self {
            position: center,
            previous_position: center,
            velocity: Vector3::zeros(),
            angular_velocity: Vector3::zeros(),
            state: BallState::Loose,
            last_touch_team: None,
            last_touch_player: None,
            pass: None,
            shot: None,
        }
    }

    pub fn holder(&self) -> Option<usize> {
        match self.state {
            BallState::Held(idx) => Some(idx),
            _ => None,
        }
    }

    pub fn is_held(&self) -> bool {
        matches!(self.state, BallState::Held(_))
    }

    pub fn is_in_flight(&self) -> bool {
        self.state == BallState::InFlight
    }

    pub fn is_rolling(&self) -> bool {
        self.state == BallState::Rolling
    }

    pub fn is_loose(&self) -> bool {
        self.state == BallState::Loose
    }

    /// Not held: in flight, rolling or loose.
    pub fn is_free(&self) -> bool {
        !self.is_held()
    }

    pub fn ground_position(&self) -> Vector2<f32> {
        Vector2::new(self.position.x, self.position.y)
    }

    pub fn ground_velocity(&self) -> Vector2<f32> {
        Vector2::new(self.velocity.x, self.velocity.y)
    }

    /// Gives the ball to `player`. Clears flight state and pass/shot context.
    pub fn take_possession(&mut self, player: usize, team: TeamSide, at: Vector2<f32>) {
        self.state = BallState::Held(player);
        self.velocity = Vector3::zeros();
        self.angular_velocity = Vector3::zeros();
        self.position = Vector3::new(at.x, at.y, CARRY_HEIGHT_M);
        self.previous_position = self.position;
        self.pass = None;
        self.shot = None;
        self.last_touch_team = Some(team);
        self.last_touch_player = Some(player);
    }

    /// Keeps a held ball with its carrier.
    pub fn follow_holder(&mut self, at: Vector2<f32>) {
        self.previous_position = self.position;
        self.position = Vector3::new(at.x, at.y, CARRY_HEIGHT_M);
    }

    pub fn launch_pass(&mut self, ctx: PassContext, from: Vector3<f32>, velocity: Vector3<f32>) {
        self.last_touch_team = Some(ctx.team);
        self.last_touch_player = Some(ctx.passer);
        self.launch(from, velocity);
        self.pass = Some(ctx);
        self.shot = None;
    }

    pub fn launch_shot(&mut self, ctx: ShotContext, from: Vector3<f32>, velocity: Vector3<f32>) {
        self.last_touch_team = Some(ctx.team);
        self.last_touch_player = Some(ctx.shooter);
        self.launch(from, velocity);
        self.angular_velocity = Vector3::new(0.0, 0.0, velocity.norm() * 0.5);
        self.pass = None;
        self.shot = Some(ctx);
    }

    fn launch(&mut self, from: Vector3<f32>, velocity: Vector3<f32>) {
        self.state = BallState::InFlight;
        self.position = from;
        self.previous_position = from;
        self.velocity = velocity;
    }

    /// Drops the ball at `at` with `velocity`. A (near) zero velocity on the
    /// ground leaves it loose; otherwise it flies or rolls.
    pub fn make_loose(&mut self, at: Vector3<f32>, velocity: Vector3<f32>) {
        self.position = Vector3::new(at.x, at.y, at.z.max(0.0));
        self.previous_position = self.position;
        self.velocity = velocity;
        self.pass = None;
        self.shot = None;
        self.state = if self.position.z > 0.05 || velocity.z > 0.0 {
            BallState::InFlight
        } else if velocity.norm() < LOOSE_SPEED_MPS {
            self.velocity = Vector3::zeros();
            BallState::Loose
        } else {
            BallState::Rolling
        };
    }

    /// Places a dead ball at a restart spot (no holder yet).
    pub fn place(&mut self, at: Vector2<f32>) {
        self.make_loose(Vector3::new(at.x, at.y, 0.0), Vector3::zeros());
    }

    /// Advances free-ball physics by `dt`. Held balls are moved by their carrier.
    pub fn update(&mut self, dt: f32) {
        self.previous_position = self.position;
        match self.state {
            BallState::Held(_) | BallState::Loose => {}
            BallState::InFlight => {
                self.velocity.z -= GRAVITY_MPS2 * dt;
                self.position += self.velocity * dt;
                if self.position.z <= 0.0 {
                    self.position.z = 0.0;
                    if self.velocity.z.abs() > MIN_BOUNCE_VZ {
                        self.velocity.z = -self.velocity.z * BOUNCE_RESTITUTION;
                        self.velocity.x *= BOUNCE_FRICTION;
                        self.velocity.y *= BOUNCE_FRICTION;
                    } else {
                        self.velocity.z = 0.0;
                        self.state = BallState::Rolling;
                    }
                }
            }
            BallState::Rolling => {
                let speed = self.velocity.norm();
                let new_speed = speed - ROLLING_DECEL_MPS2 * dt;
                if new_speed <= LOOSE_SPEED_MPS {
                    self.velocity = Vector3::zeros();
                    self.state = BallState::Loose;
                } else {
                    self.velocity *= new_speed / speed;
                    self.position += self.velocity * dt;
                }
            }
        }
        self.angular_velocity *= (1.0 - SPIN_DECAY_PER_S * dt).max(0.0);
    }
}
