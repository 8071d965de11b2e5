//! Serializable state snapshot for display layers.
//!
//! # Example
//! ```ignore
//! let mut sim = MatchSimulator::new(&setup)?;
//! for _ in 0..600 {
//!     sim.step();
//! }
//! let snapshot = snapshot::capture(sim.state());
//! ```

use super::match_state::MatchState;
use crate::models::{BallSnapshot, MatchSnapshot, PlayerSnapshot};

/// Copies every player's transform, action and stats plus the ball's full
/// physical state.
pub fn capture(state: &MatchState) -> MatchSnapshot {
    let ball = &state.ball;
    MatchSnapshot {
        elapsed: state.elapsed() as f64,
        half: state.half,
        phase: state.phase.label().to_string(),
        home_score: state.scores[0],
        away_score: state.scores[1],
        possession: state.possession.team(),
        ball: BallSnapshot {
            position: [ball.position.x, ball.position.y, ball.position.z],
            velocity: [ball.velocity.x, ball.velocity.y, ball.velocity.z],
            angular_velocity: [
                ball.angular_velocity.x,
                ball.angular_velocity.y,
                ball.angular_velocity.z,
            ],
            state: ball.state.label().to_string(),
            holder: ball.holder(),
            last_touch_team: ball.last_touch_team,
            last_touch_player: ball.last_touch_player,
        },
        players: state
            .players
            .iter()
            .map(|p| PlayerSnapshot {
                id: p.idx,
                name: p.name.clone(),
                team: p.side,
                role: p.role.code().to_string(),
                on_court: p.on_court,
                position: [p.position.x, p.position.y],
                velocity: [p.velocity.x, p.velocity.y],
                orientation: p.orientation,
                action: p.action.label().to_string(),
                has_ball: p.has_ball,
                stamina: p.stamina,
                suspension_remaining: p.suspension_timer,
                stats: state.player_stats.get(&p.idx).cloned().unwrap_or_default(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_fixtures::{fixture_state, player_with_role};
    use crate::models::{PlayerRole, TeamSide};

    #[test]
    fn test_snapshot_covers_every_player() {
        let mut state = fixture_state(61);
        let cb = player_with_role(&state, TeamSide::Away, PlayerRole::CentreBack);
        state.give_ball_to(cb);
        let snap = capture(&state);
        assert_eq!(snap.players.len(), state.players.len());
        assert_eq!(snap.ball.holder, Some(cb));
        assert_eq!(snap.ball.state, "held");
        assert_eq!(snap.possession, Some(TeamSide::Away));
        assert!(snap.players[cb].has_ball);
        assert_eq!(snap.players[cb].role, "CB");
    }

    #[test]
    fn test_snapshot_serializes() {
        let state = fixture_state(62);
        let json = serde_json::to_string(&capture(&state)).unwrap();
        assert!(json.contains("\"angular_velocity\""));
        assert!(json.contains("\"suspension_remaining\""));
    }
}
