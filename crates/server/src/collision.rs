//! Collision detection.
//!
//! Every check is circle based:
//! - Head against another player's body cell (sum of both radii)
//! - Head against an orb (mover's radius only)
//! - Head against the arena border

use protocol::Position;

use crate::world::ArenaBorder;

/// Result of checking a head against another body cell.
#[derive(Debug, Clone, Copy)]
pub struct CollisionResult {
    /// Combined radius of both circles.
    pub r: f64,
    /// Distance between the centers.
    pub d: f64,
}

impl CollisionResult {
    /// Touching counts as colliding.
    #[inline]
    pub fn is_colliding(&self) -> bool {
        self.d <= self.r
    }
}

/// Check a head circle against a body cell circle.
#[inline]
pub fn check_body_collision(
    head: Position,
    head_radius: f64,
    cell: Position,
    cell_radius: f64,
) -> CollisionResult {
    CollisionResult {
        r: head_radius + cell_radius,
        d: head.distance(cell),
    }
}

/// Whether a head of the given radius reaches an orb.
#[inline]
pub fn can_eat_orb(head: Position, head_radius: f64, orb: Position) -> bool {
    head.distance(orb) <= head_radius
}

/// Whether a head of the given radius pokes out of the arena.
///
/// A circle exactly touching the edge is still inside.
#[inline]
pub fn exceeds_border(border: &ArenaBorder, head: Position, radius: f64) -> bool {
    head.x() - radius < border.min_x
        || head.x() + radius > border.max_x
        || head.y() - radius < border.min_y
        || head.y() + radius > border.max_y
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collision_check() {
        let result = check_body_collision(Position::new(0.0, 0.0), 17.5, Position::new(30.0, 0.0), 17.5);
        assert!(result.is_colliding()); // 17.5 + 17.5 = 35, distance = 30
        assert_eq!(result.d, 30.0);
    }

    #[test]
    fn test_touching_counts() {
        let result = check_body_collision(Position::new(0.0, 0.0), 20.0, Position::new(0.0, 45.0), 25.0);
        assert!(result.is_colliding());
    }

    #[test]
    fn test_no_collision() {
        let result = check_body_collision(Position::new(0.0, 0.0), 10.0, Position::new(100.0, 0.0), 10.0);
        assert!(!result.is_colliding());
    }

    #[test]
    fn test_orb_reach() {
        assert!(can_eat_orb(Position::new(0.0, 0.0), 17.5, Position::new(17.5, 0.0)));
        assert!(!can_eat_orb(Position::new(0.0, 0.0), 17.5, Position::new(17.51, 0.0)));
    }

    #[test]
    fn test_border_exact_threshold() {
        let border = ArenaBorder::new(1500.0);
        assert!(!exceeds_border(&border, Position::new(1482.5, 0.0), 17.5));
        assert!(exceeds_border(&border, Position::new(1483.5, 0.0), 17.5));
        assert!(!exceeds_border(&border, Position::new(0.0, -1482.5), 17.5));
        assert!(exceeds_border(&border, Position::new(0.0, -1483.5), 17.5));
    }
}
