//! Court geometry: goal areas, free-throw line, goal mouth, boundaries.
//!
//! All helpers are pure. A goal is identified by the x coordinate of its goal
//! line (`court::LEFT_GOAL_X` or `court::RIGHT_GOAL_X`).

use nalgebra::{Vector2, Vector3};

use super::physics_constants::court;
use crate::models::TeamSide;

/// Goal line x of the goal `side` defends during `half` (1 or 2).
pub fn defended_goal_x(side: TeamSide, half: u8) -> f32 {
    let home_left = half <= 1;
    match (side, home_left) {
        (TeamSide::Home, true) | (TeamSide::Away, false) => court::LEFT_GOAL_X,
        _ => court::RIGHT_GOAL_X,
    }
}

/// Goal line x of the goal `side` attacks during `half`.
pub fn attacked_goal_x(side: TeamSide, half: u8) -> f32 {
    defended_goal_x(side.opponent(), half)
}

/// Unit x direction from the goal line into the court.
#[inline]
pub fn into_court(goal_x: f32) -> f32 {
    if goal_x < court::HALFWAY_X {
        1.0
    } else {
        -1.0
    }
}

pub fn goal_center(goal_x: f32) -> Vector2<f32> {
    Vector2::new(goal_x, court::CENTER_Y)
}

/// (lower post, upper post) in y order.
pub fn goal_posts(goal_x: f32) -> (Vector2<f32>, Vector2<f32>) {
    let half = court::GOAL_WIDTH_M / 2.0;
    (
        Vector2::new(goal_x, court::CENTER_Y - half),
        Vector2::new(goal_x, court::CENTER_Y + half),
    )
}

pub fn closest_point_on_segment(
    p: &Vector2<f32>,
    a: &Vector2<f32>,
    b: &Vector2<f32>,
) -> Vector2<f32> {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq <= f32::EPSILON {
        return *a;
    }
    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

pub fn distance_point_to_segment(p: &Vector2<f32>, a: &Vector2<f32>, b: &Vector2<f32>) -> f32 {
    (p - closest_point_on_segment(p, a, b)).norm()
}

/// Distance from `p` to the goal-mouth segment between the posts.
pub fn distance_to_goal_mouth(p: &Vector2<f32>, goal_x: f32) -> f32 {
    let (a, b) = goal_posts(goal_x);
    distance_point_to_segment(p, &a, &b)
}

/// Signed distance to the goal-area line (negative inside the area).
pub fn distance_to_goal_area(p: &Vector2<f32>, goal_x: f32) -> f32 {
    distance_to_goal_mouth(p, goal_x) - court::GOAL_AREA_RADIUS_M
}

pub fn is_in_goal_area(p: &Vector2<f32>, goal_x: f32) -> bool {
    distance_to_goal_area(p, goal_x) < 0.0
}

/// True when `p` is at or beyond the 9 m line, seen from `goal_x`.
pub fn is_beyond_free_throw_line(p: &Vector2<f32>, goal_x: f32) -> bool {
    distance_to_goal_mouth(p, goal_x) >= court::FREE_THROW_LINE_M
}

/// Moves `p` radially out of the goal area (plus `margin`). Points outside
/// are returned unchanged.
pub fn push_outside_goal_area(p: Vector2<f32>, goal_x: f32, margin: f32) -> Vector2<f32> {
    push_outside_radius(p, goal_x, court::GOAL_AREA_RADIUS_M + margin)
}

/// Moves `p` behind the free-throw line, used when clearing space at restarts.
pub fn push_outside_free_throw_line(p: Vector2<f32>, goal_x: f32) -> Vector2<f32> {
    push_outside_radius(p, goal_x, court::FREE_THROW_LINE_M + 0.1)
}

fn push_outside_radius(p: Vector2<f32>, goal_x: f32, radius: f32) -> Vector2<f32> {
    let (a, b) = goal_posts(goal_x);
    let anchor = closest_point_on_segment(&p, &a, &b);
    let offset = p - anchor;
    let dist = offset.norm();
    if dist >= radius {
        return p;
    }
    let dir = if dist > 1e-4 {
        offset / dist
    } else {
        Vector2::new(into_court(goal_x), 0.0)
    };
    // A point exactly on the goal line would be pushed out of the court.
    let dir = if dir.x * into_court(goal_x) < 0.0 {
        Vector2::new(0.0, dir.y.signum())
    } else {
        dir
    };
    clamp_to_court(anchor + dir * radius)
}

pub fn clamp_to_court(p: Vector2<f32>) -> Vector2<f32> {
    Vector2::new(p.x.clamp(0.0, court::LENGTH_M), p.y.clamp(0.0, court::WIDTH_M))
}

pub fn is_on_court(p: &Vector2<f32>) -> bool {
    (0.0..=court::LENGTH_M).contains(&p.x) && (0.0..=court::WIDTH_M).contains(&p.y)
}

/// The 7 m mark in front of the goal at `goal_x`.
pub fn penalty_mark(goal_x: f32) -> Vector2<f32> {
    Vector2::new(goal_x + into_court(goal_x) * court::PENALTY_MARK_M, court::CENTER_Y)
}

pub fn center_spot() -> Vector2<f32> {
    Vector2::new(court::HALFWAY_X, court::CENTER_Y)
}

/// Angle in degrees between the goal normal and the line goal centre -> `p`.
pub fn shot_angle_deg(p: &Vector2<f32>, goal_x: f32) -> f32 {
    let to_p = p - goal_center(goal_x);
    let depth = (to_p.x * into_court(goal_x)).max(1e-3);
    to_p.y.abs().atan2(depth).to_degrees()
}

pub fn is_wide_angle(p: &Vector2<f32>, goal_x: f32) -> bool {
    shot_angle_deg(p, goal_x) > court::WIDE_ANGLE_DEG
}

/// Point at `radius` from the goal centre, `angle_deg` off the goal normal
/// (positive angles toward larger y).
pub fn arc_point(goal_x: f32, radius: f32, angle_deg: f32) -> Vector2<f32> {
    let a = angle_deg.to_radians();
    let p = goal_center(goal_x)
        + Vector2::new(into_court(goal_x) * radius * a.cos(), radius * a.sin());
    clamp_to_court(p)
}

/// Where the ball segment `prev -> curr` crosses the goal line at `goal_x`,
/// if it does.
pub fn goal_line_crossing(
    prev: &Vector3<f32>,
    curr: &Vector3<f32>,
    goal_x: f32,
) -> Option<Vector3<f32>> {
    let before = (prev.x - goal_x) * into_court(goal_x);
    let after = (curr.x - goal_x) * into_court(goal_x);
    if before < 0.0 || after > 0.0 {
        return None;
    }
    let span = before - after;
    let t = if span.abs() <= f32::EPSILON { 1.0 } else { before / span };
    Some(prev + (curr - prev) * t)
}

/// Crossing point when the crossing lies between the posts and under the bar.
pub fn goal_mouth_crossing(
    prev: &Vector3<f32>,
    curr: &Vector3<f32>,
    goal_x: f32,
) -> Option<Vector3<f32>> {
    goal_line_crossing(prev, curr, goal_x).filter(|c| is_in_goal_mouth(c.y, c.z))
}

pub fn is_in_goal_mouth(y: f32, z: f32) -> bool {
    let half = court::GOAL_WIDTH_M / 2.0;
    (y - court::CENTER_Y).abs() <= half && (0.0..=court::GOAL_HEIGHT_M).contains(&z)
}

/// Rotates a planar direction by `deg` degrees.
pub fn rotate(v: &Vector2<f32>, deg: f32) -> Vector2<f32> {
    let (s, c) = deg.to_radians().sin_cos();
    Vector2::new(v.x * c - v.y * s, v.x * s + v.y * c)
}

/// Heading (radians) of a planar direction.
pub fn heading(v: &Vector2<f32>) -> f32 {
    v.y.atan2(v.x)
}

pub fn heading_vector(orientation: f32) -> Vector2<f32> {
    Vector2::new(orientation.cos(), orientation.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ends_switch_at_half_time() {
        assert_eq!(defended_goal_x(TeamSide::Home, 1), court::LEFT_GOAL_X);
        assert_eq!(defended_goal_x(TeamSide::Home, 2), court::RIGHT_GOAL_X);
        assert_eq!(attacked_goal_x(TeamSide::Away, 1), court::LEFT_GOAL_X);
    }

    #[test]
    fn test_goal_area_follows_mouth_segment() {
        // Straight out in front of a post: 5.9m from the post -> inside
        let p = Vector2::new(5.9, 11.5);
        assert!(is_in_goal_area(&p, 0.0));
        // Corner of the court is outside
        assert!(!is_in_goal_area(&Vector2::new(0.5, 0.5), 0.0));
        assert!((distance_to_goal_area(&Vector2::new(8.0, 10.0), 0.0) - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_free_throw_line() {
        assert!(is_beyond_free_throw_line(&Vector2::new(9.5, 10.0), 0.0));
        assert!(!is_beyond_free_throw_line(&Vector2::new(8.0, 10.0), 0.0));
        assert!(is_beyond_free_throw_line(&Vector2::new(30.0, 10.0), 40.0));
    }

    #[test]
    fn test_push_outside_goal_area() {
        let inside = Vector2::new(3.0, 10.0);
        let out = push_outside_goal_area(inside, 0.0, 0.1);
        assert!(!is_in_goal_area(&out, 0.0));
        assert!((out.x - 6.1).abs() < 1e-4);

        let outside = Vector2::new(15.0, 4.0);
        assert_eq!(push_outside_goal_area(outside, 0.0, 0.1), outside);

        // Degenerate: exactly on the goal line
        let on_line = push_outside_goal_area(Vector2::new(40.0, 10.0), 40.0, 0.1);
        assert!(!is_in_goal_area(&on_line, 40.0));
        assert!(is_on_court(&on_line));
    }

    #[test]
    fn test_penalty_mark() {
        assert_eq!(penalty_mark(0.0), Vector2::new(7.0, 10.0));
        assert_eq!(penalty_mark(40.0), Vector2::new(33.0, 10.0));
    }

    #[test]
    fn test_wide_angle() {
        assert!(is_wide_angle(&Vector2::new(2.0, 18.0), 0.0));
        assert!(!is_wide_angle(&Vector2::new(9.0, 10.0), 0.0));
    }

    #[test]
    fn test_goal_mouth_crossing() {
        let prev = Vector3::new(0.5, 10.0, 1.0);
        let curr = Vector3::new(-0.5, 10.2, 1.0);
        let c = goal_mouth_crossing(&prev, &curr, 0.0).unwrap();
        assert!(c.x.abs() < 1e-5);
        assert!((c.y - 10.1).abs() < 1e-5);

        // Over the bar
        let high = Vector3::new(-0.5, 10.0, 2.5);
        assert!(goal_mouth_crossing(&Vector3::new(0.5, 10.0, 2.5), &high, 0.0).is_none());
        assert!(goal_line_crossing(&Vector3::new(0.5, 10.0, 2.5), &high, 0.0).is_some());

        // Not crossing
        assert!(goal_line_crossing(&Vector3::new(2.0, 10.0, 1.0), &prev, 0.0).is_none());
    }

    #[test]
    fn test_arc_point_radius() {
        let p = arc_point(40.0, 6.8, 30.0);
        assert!(((p - goal_center(40.0)).norm() - 6.8).abs() < 1e-4);
        assert!(p.x < 40.0 && p.y > 10.0);
    }

    #[test]
    fn test_segment_distance() {
        let a = Vector2::new(0.0, 0.0);
        let b = Vector2::new(10.0, 0.0);
        assert!((distance_point_to_segment(&Vector2::new(5.0, 3.0), &a, &b) - 3.0).abs() < 1e-6);
        assert!((distance_point_to_segment(&Vector2::new(-4.0, 3.0), &a, &b) - 5.0).abs() < 1e-6);
    }
}
