//! The controllable agent.

use crate::motion::{slide_within, Resolution};
use crate::structs::{Point, Rect, Vector2D, WorldBounds};
use serde::{Deserialize, Serialize};

pub const DEFAULT_ROBOT_SPEED: f64 = 3.0;
pub const DEFAULT_ROBOT_RADIUS: f64 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Robot {
    pub position: Point,
    pub radius: f64,
    pub speed: f64,
}

impl Robot {
    pub fn new(position: Point) -> Self {
        Robot {
            position,
            radius: DEFAULT_ROBOT_RADIUS,
            speed: DEFAULT_ROBOT_SPEED,
        }
    }

    pub fn distance_to(&self, p: &Point) -> f64 {
        self.position.distance(p)
    }

    /// Turns a strategy output into a displacement of exactly `speed`.
    ///
    /// A zero vector means no movement this tick.
    pub fn command_to_delta(&self, command: Vector2D) -> Option<Vector2D> {
        if command.length_squared() > 0.0 {
            Some(command.normalize() * self.speed)
        } else {
            None
        }
    }

    /// Applies a strategy output through the obstacle resolver.
    pub fn apply_command(
        &mut self,
        command: Vector2D,
        obstacles: &[Rect],
        bounds: &WorldBounds,
    ) -> Option<Resolution> {
        let delta = self.command_to_delta(command)?;
        let (reached, resolution) =
            slide_within(self.position, delta, self.radius, obstacles, bounds);
        self.position = reached;
        Some(resolution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_command_to_delta_rescales_to_speed() {
        let robot = Robot::new(Point::new(100.0, 100.0));
        let delta = robot.command_to_delta(Vector2D::new(1.0, 1.0)).unwrap();
        assert_relative_eq!(delta.magnitude(), DEFAULT_ROBOT_SPEED, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_command_does_not_move() {
        let mut robot = Robot::new(Point::new(100.0, 100.0));
        let outcome = robot.apply_command(Vector2D::ZERO, &[], &WorldBounds::default());
        assert!(outcome.is_none());
        assert_eq!(robot.position, Point::new(100.0, 100.0));
    }

    #[test]
    fn test_apply_command_stops_at_obstacle() {
        let mut robot = Robot::new(Point::new(86.0, 50.0));
        let wall = vec![Rect::new(100, 0, 20, 400)];
        let outcome = robot.apply_command(Vector2D::new(1.0, 0.0), &wall, &WorldBounds::default());
        assert_ne!(outcome, Some(Resolution::Free));
        assert_eq!(robot.position, Point::new(86.0, 50.0), "Robot must not enter the wall");
    }

    #[test]
    fn test_apply_command_clamps_to_canvas() {
        let mut robot = Robot::new(Point::new(13.0, 300.0));
        robot.apply_command(Vector2D::new(-1.0, 0.0), &[], &WorldBounds::default());
        assert_eq!(robot.position.x, DEFAULT_ROBOT_RADIUS);
    }
}
