//! # Obstacle-Aware Motion Resolution
//!
//! Axis-separated sliding shared by the robot and the pedestrians.
//!
//! ## Algorithm
//!
//! A proposed displacement is first tried in full. When the agent's hitbox
//! would overlap an obstacle at the destination, the x component is tried
//! alone, then the y component alone, which lets agents slide along walls
//! instead of sticking to them. If both axes are blocked the move is
//! reported as [`Resolution::Blocked`] and the caller decides what to do
//! (the robot stays put, pedestrians bounce).
//!
//! The resolver does not push agents out of obstacles they already overlap;
//! it only refuses moves that end inside one.

use crate::structs::{Point, Rect, Vector2D, WorldBounds};

/// How a proposed move was resolved against the obstacle set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Full move applied.
    Free,
    /// Only the x component was applied.
    SlideX,
    /// Only the y component was applied.
    SlideY,
    /// Neither axis could move; position is unchanged.
    Blocked,
}

/// Square pixel hitbox of a disk, truncated onto the integer grid.
pub fn hitbox(center: Point, radius: f64) -> Rect {
    let size = (radius * 2.0) as i32;
    Rect::new(
        (center.x - radius) as i32,
        (center.y - radius) as i32,
        size,
        size,
    )
}

pub fn would_collide(center: Point, radius: f64, obstacles: &[Rect]) -> bool {
    let bbox = hitbox(center, radius);
    obstacles.iter().any(|obstacle| bbox.intersects(obstacle))
}

/// Resolves `from + delta` against `obstacles`, returning the reached point.
pub fn resolve_move(
    from: Point,
    delta: Vector2D,
    radius: f64,
    obstacles: &[Rect],
) -> (Point, Resolution) {
    let proposed = from + delta;

    if obstacles.is_empty() || !would_collide(proposed, radius, obstacles) {
        return (proposed, Resolution::Free);
    }

    let x_only = Point::new(proposed.x, from.y);
    if !would_collide(x_only, radius, obstacles) {
        return (x_only, Resolution::SlideX);
    }

    let y_only = Point::new(from.x, proposed.y);
    if !would_collide(y_only, radius, obstacles) {
        return (y_only, Resolution::SlideY);
    }

    (from, Resolution::Blocked)
}

/// Resolves a move and clamps the result onto the canvas.
pub fn slide_within(
    from: Point,
    delta: Vector2D,
    radius: f64,
    obstacles: &[Rect],
    bounds: &WorldBounds,
) -> (Point, Resolution) {
    let (reached, resolution) = resolve_move(from, delta, radius, obstacles);
    (bounds.clamp_disk(reached, radius), resolution)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall() -> Vec<Rect> {
        // Vertical wall spanning x in [100, 120)
        vec![Rect::new(100, 0, 20, 400)]
    }

    // ==================== Hitbox Tests ====================

    #[test]
    fn test_hitbox_truncates_toward_zero() {
        let bbox = hitbox(Point::new(50.7, 30.2), 10.0);
        assert_eq!(bbox, Rect::new(40, 20, 20, 20));
    }

    #[test]
    fn test_would_collide_empty_obstacles() {
        assert!(!would_collide(Point::new(10.0, 10.0), 10.0, &[]));
    }

    #[test]
    fn test_would_collide_against_wall() {
        assert!(would_collide(Point::new(95.0, 50.0), 10.0, &wall()));
        assert!(!would_collide(Point::new(89.0, 50.0), 10.0, &wall()));
    }

    // ==================== resolve_move Tests ====================

    #[test]
    fn test_resolve_move_free() {
        let (p, r) = resolve_move(Point::new(10.0, 10.0), Vector2D::new(3.0, 4.0), 10.0, &wall());
        assert_eq!(r, Resolution::Free);
        assert_eq!(p, Point::new(13.0, 14.0));
    }

    #[test]
    fn test_resolve_move_slides_along_wall() {
        // Moving diagonally into the wall keeps the vertical component
        let from = Point::new(88.0, 50.0);
        let (p, r) = resolve_move(from, Vector2D::new(3.0, 3.0), 10.0, &wall());
        assert_eq!(r, Resolution::SlideY, "x is blocked so only y should apply");
        assert_eq!(p, Point::new(88.0, 53.0));
    }

    #[test]
    fn test_resolve_move_slides_horizontally_under_ceiling() {
        let ceiling = vec![Rect::new(0, 0, 400, 20)];
        let from = Point::new(50.0, 31.0);
        let (p, r) = resolve_move(from, Vector2D::new(2.0, -3.0), 10.0, &ceiling);
        assert_eq!(r, Resolution::SlideX);
        assert_eq!(p, Point::new(52.0, 31.0));
    }

    #[test]
    fn test_resolve_move_blocked_in_corner() {
        let corner = vec![Rect::new(100, 0, 20, 400), Rect::new(0, 100, 400, 20)];
        let from = Point::new(88.0, 88.0);
        let (p, r) = resolve_move(from, Vector2D::new(3.0, 3.0), 10.0, &corner);
        assert_eq!(r, Resolution::Blocked);
        assert_eq!(p, from);
    }

    #[test]
    fn test_slide_within_clamps_to_bounds() {
        let bounds = WorldBounds::new(200.0, 200.0);
        let (p, _) = slide_within(Point::new(185.0, 100.0), Vector2D::new(10.0, 0.0), 12.0, &[], &bounds);
        assert_eq!(p, Point::new(188.0, 100.0));
    }
}
