//! Collision detection and response for the Pong court
//!
//! Walls are horizontal lines, paddles are axis-aligned boxes with a thin
//! contact band on their inner face. Paddle hits ignore the incoming angle:
//! the outgoing direction depends only on where the ball met the paddle.

use glam::Vec2;

use crate::consts::pong::{BALL_MAX_SPEED, BALL_SPEED_INCREMENT, MAX_BOUNCE_ANGLE};

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Surface normal at collision (pointing toward ball center, for reflection)
    pub normal: Vec2,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Check collision with the top (y = 0) and bottom (y = height) walls
pub fn ball_wall_collision(ball_pos: Vec2, ball_radius: f32, height: f32) -> CollisionResult {
    if ball_pos.y <= ball_radius {
        return CollisionResult {
            hit: true,
            normal: Vec2::Y,
            penetration: ball_radius - ball_pos.y,
        };
    }
    if ball_pos.y >= height - ball_radius {
        return CollisionResult {
            hit: true,
            normal: Vec2::NEG_Y,
            penetration: ball_pos.y - (height - ball_radius),
        };
    }
    CollisionResult::miss()
}

/// The strip in front of a paddle where the ball counts as touching it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactBand {
    pub x_min: f32,
    pub x_max: f32,
    /// Paddle top edge
    pub top: f32,
    pub height: f32,
}

impl ContactBand {
    /// Ball center inside the band and within the paddle's vertical span
    pub fn contains(&self, ball_pos: Vec2) -> bool {
        ball_pos.x >= self.x_min
            && ball_pos.x <= self.x_max
            && ball_pos.y >= self.top
            && ball_pos.y <= self.top + self.height
    }

    /// Where the ball met the paddle: +1 at the top edge, 0 at center, -1 at the bottom
    pub fn offset(&self, ball_y: f32) -> f32 {
        let half = self.height / 2.0;
        ((self.top + half - ball_y) / half).clamp(-1.0, 1.0)
    }
}

/// Bounce angle for a normalized paddle offset (±45° at the edges)
#[inline]
pub fn bounce_angle(offset: f32) -> f32 {
    offset.clamp(-1.0, 1.0) * MAX_BOUNCE_ANGLE
}

/// Rally speed after a paddle contact, capped at [`BALL_MAX_SPEED`]
#[inline]
pub fn next_speed(speed: f32) -> f32 {
    (speed + BALL_SPEED_INCREMENT).min(BALL_MAX_SPEED)
}

/// Outgoing velocity after a paddle hit
///
/// `toward` is +1 to send the ball right, -1 to send it left. A positive
/// angle sends the ball up (toward y = 0).
pub fn bounce_velocity(speed: f32, angle: f32, toward: f32) -> Vec2 {
    Vec2::new(toward * speed * angle.cos(), -speed * angle.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_4;

    fn band() -> ContactBand {
        ContactBand {
            x_min: 21.0,
            x_max: 36.0,
            top: 100.0,
            height: 100.0,
        }
    }

    #[test]
    fn test_reflect_velocity() {
        // Ball moving up, hits top wall (normal pointing down the screen)
        let reflected = reflect_velocity(Vec2::new(3.0, -5.0), Vec2::Y);
        assert!((reflected.x - 3.0).abs() < 0.001);
        assert!((reflected.y - 5.0).abs() < 0.001);
    }

    #[test]
    fn test_wall_collision() {
        assert!(!ball_wall_collision(Vec2::new(100.0, 240.0), 6.0, 480.0).hit);

        let top = ball_wall_collision(Vec2::new(100.0, 4.0), 6.0, 480.0);
        assert!(top.hit);
        assert_eq!(top.normal, Vec2::Y);
        assert!((top.penetration - 2.0).abs() < 0.001);

        let bottom = ball_wall_collision(Vec2::new(100.0, 479.0), 6.0, 480.0);
        assert!(bottom.hit);
        assert_eq!(bottom.normal, Vec2::NEG_Y);
    }

    #[test]
    fn test_contact_band() {
        let band = band();
        assert!(band.contains(Vec2::new(30.0, 150.0)));
        assert!(band.contains(Vec2::new(21.0, 100.0)));
        assert!(!band.contains(Vec2::new(40.0, 150.0)));
        assert!(!band.contains(Vec2::new(30.0, 201.0)));
    }

    #[test]
    fn test_offset_and_angle() {
        let band = band();
        assert!(band.offset(150.0).abs() < 0.001);
        assert!((band.offset(100.0) - 1.0).abs() < 0.001);
        assert!((band.offset(200.0) + 1.0).abs() < 0.001);
        assert!((bounce_angle(1.0) - FRAC_PI_4).abs() < 0.001);
        assert!((bounce_angle(-3.0) + FRAC_PI_4).abs() < 0.001);
    }

    #[test]
    fn test_center_hit_is_horizontal() {
        let vel = bounce_velocity(5.2, bounce_angle(0.0), -1.0);
        assert!((vel.x + 5.2).abs() < 0.001);
        assert!(vel.y.abs() < 0.001);
    }

    #[test]
    fn test_next_speed_caps() {
        assert!((next_speed(5.0) - 5.2).abs() < 0.001);
        assert_eq!(next_speed(BALL_MAX_SPEED), BALL_MAX_SPEED);
        assert_eq!(next_speed(14.9), BALL_MAX_SPEED);
    }
}
