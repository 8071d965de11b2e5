//! Per-tick kinematics: steering, goal-area exclusion, stamina and ball
//! carry. Runs every tick regardless of AI throttling.

use nalgebra::Vector2;

use super::ai::positioning;
use super::geometry;
use super::match_state::MatchState;
use super::physics_constants::{court, movement, skills, stamina};
use super::sim_player::{PlayerAction, SimPlayer};

/// Steering velocity toward `target` with an arrive slowdown.
pub fn desired_velocity(
    from: &Vector2<f32>,
    target: &Vector2<f32>,
    max_speed: f32,
) -> Vector2<f32> {
    let offset = target - from;
    let dist = offset.norm();
    if dist <= movement::ARRIVE_RADIUS_M {
        return Vector2::zeros();
    }
    let speed = if dist < movement::SLOWDOWN_RADIUS_M {
        max_speed * dist / movement::SLOWDOWN_RADIUS_M
    } else {
        max_speed
    };
    offset / dist * speed
}

/// Moves `current` toward `desired` by at most `accel * dt`.
pub fn accelerate(
    current: &Vector2<f32>,
    desired: &Vector2<f32>,
    accel: f32,
    dt: f32,
) -> Vector2<f32> {
    let delta = desired - current;
    let max_delta = accel * dt;
    if delta.norm() <= max_delta {
        *desired
    } else {
        current + delta / delta.norm() * max_delta
    }
}

/// Stamina after `dt` seconds at `speed_ratio` of max speed.
pub fn stamina_after(current: f32, speed_ratio: f32, endurance: u8, dt: f32) -> f32 {
    if speed_ratio <= stamina::REST_SPEED_RATIO {
        return (current + stamina::RECOVERY_PER_S * dt).min(1.0);
    }
    // Endurance 100 drains at 60 %, endurance 0 at 140 %
    let endurance_factor = skills::lerp(1.4, 0.6, skills::normalize(endurance));
    (current - stamina::DRAIN_PER_S * speed_ratio * speed_ratio * endurance_factor * dt).max(0.0)
}

/// Where this player is steering to right now.
fn steering_target(state: &MatchState, p: &SimPlayer) -> Option<Vector2<f32>> {
    match p.action {
        PlayerAction::MarkingPlayer => match p.target_player {
            Some(t) if state.players[t].is_active() => {
                Some(positioning::marking_spot(state, p, &state.players[t]))
            }
            _ => p.target_position,
        },
        PlayerAction::Tackling => {
            p.target_player.map(|t| state.players[t].position).or(p.target_position)
        }
        PlayerAction::ChasingBall => Some(state.ball.ground_position()),
        // Winding up: plant the feet
        PlayerAction::PreparingPass
        | PlayerAction::PreparingShot
        | PlayerAction::Passing
        | PlayerAction::Shooting => None,
        _ => p.target_position,
    }
}

/// Advances every on-court player and the ball by one tick.
pub fn update_movement(state: &mut MatchState, dt: f32) {
    let targets: Vec<Option<Vector2<f32>>> = state
        .players
        .iter()
        .map(|p| if p.is_active() { steering_target(state, p) } else { None })
        .collect();
    let ball_pos = state.ball.ground_position();

    for (p, target) in state.players.iter_mut().zip(targets) {
        if !p.on_court || p.is_suspended() || p.red_carded {
            p.velocity = Vector2::zeros();
            p.stamina = (p.stamina + stamina::BENCH_RECOVERY_PER_S * dt).min(1.0);
            continue;
        }
        p.tick_body(dt);

        let max_speed = p.max_speed();
        if p.is_airborne() {
            // Ballistic: keep the take-off velocity
        } else if p.is_fallen() {
            p.velocity = Vector2::zeros();
        } else {
            let desired = match target {
                Some(t) => desired_velocity(&p.position, &t, max_speed),
                None => Vector2::zeros(),
            };
            p.velocity = accelerate(&p.velocity, &desired, p.acceleration(), dt);
            let speed = p.velocity.norm();
            if speed > max_speed {
                p.velocity *= max_speed / speed;
            }
        }

        let before = p.position;
        let mut next = p.position + p.velocity * dt;
        if !p.is_goalkeeper() && !p.is_airborne() {
            for goal_x in [court::LEFT_GOAL_X, court::RIGHT_GOAL_X] {
                next = geometry::push_outside_goal_area(next, goal_x, movement::GOAL_AREA_MARGIN_M);
            }
        }
        p.position = geometry::clamp_to_court(next);

        let moved = (p.position - before).norm();
        if p.velocity.norm() > 0.1 {
            p.orientation = geometry::heading(&p.velocity);
        } else {
            let to_ball = ball_pos - p.position;
            if to_ball.norm() > 1e-3 {
                p.orientation = geometry::heading(&to_ball);
            }
        }

        let ratio = if max_speed > 0.0 { (moved / dt) / max_speed } else { 0.0 };
        p.stamina = stamina_after(p.stamina, ratio.min(1.0), p.attributes.stamina, dt);
        p.record_carry(moved, dt);
    }

    match state.holder() {
        Some(h) => {
            let at = state.players[h].position;
            state.ball.follow_holder(at);
        }
        None => state.ball.update(dt),
    }
}
