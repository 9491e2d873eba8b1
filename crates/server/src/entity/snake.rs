//! Player bodies.
//!
//! A body is an ordered run of occupied cells, head first. It lives
//! together with the player's growth and boost accumulators so that
//! everything about one player is created and dropped in one place.

use std::collections::VecDeque;

use protocol::Position;

use crate::server::client::Player;

/// Per-player aggregate guarded by the player's lock.
#[derive(Debug)]
pub struct SnakeState {
    pub player: Player,
    body: VecDeque<Position>,
    /// Fractional progress toward the next growth segment.
    pub growth_accumulator: f64,
    /// Boost cost owed but not yet deducted from score.
    pub boost_cost_accumulator: f64,
    /// Fractional progress toward the next boost shrink.
    pub boost_segment_accumulator: f64,
    alive: bool,
}

impl SnakeState {
    pub fn new(player: Player, body: VecDeque<Position>, growth_accumulator: f64) -> Self {
        Self {
            player,
            body,
            growth_accumulator,
            boost_cost_accumulator: 0.0,
            boost_segment_accumulator: 0.0,
            alive: true,
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Flip to dead. Returns false if the body was already dead.
    pub fn mark_dead(&mut self) -> bool {
        std::mem::replace(&mut self.alive, false)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    #[inline]
    pub fn tail(&self) -> Option<Position> {
        self.body.back().copied()
    }

    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.body.iter().copied()
    }

    pub fn body_snapshot(&self) -> Vec<Position> {
        self.body.iter().copied().collect()
    }

    /// Push a new head and drop the current tail. Returns the dropped tail.
    pub fn advance(&mut self, head: Position) -> Option<Position> {
        self.body.push_front(head);
        self.body.pop_back()
    }

    /// Append `count` segments stacked on the current tail.
    ///
    /// Stacked segments only separate as the body moves forward.
    pub fn grow(&mut self, count: usize) -> Vec<Position> {
        let Some(tail) = self.tail() else {
            return Vec::new();
        };
        let added = vec![tail; count];
        self.body.extend(added.iter().copied());
        added
    }

    /// Pop up to `count` tail segments without going below `min_len`.
    /// Returns the removed positions, tail first.
    pub fn shrink(&mut self, count: usize, min_len: usize) -> Vec<Position> {
        let removable = count.min(self.body.len().saturating_sub(min_len));
        (0..removable).filter_map(|_| self.body.pop_back()).collect()
    }
}

/// Lay out a fresh body: `base_len` segments from `head` along +y spaced by
/// `spacing`, then `total_len - base_len` extra segments stacked on the last
/// base segment.
pub fn spawn_body(head: Position, spacing: f64, base_len: usize, total_len: usize) -> VecDeque<Position> {
    let mut body = VecDeque::with_capacity(total_len.max(base_len));
    for i in 0..base_len {
        body.push_back(Position::new(head.x(), head.y() + spacing * i as f64));
    }
    let stack = Position::new(head.x(), head.y() + spacing * base_len.saturating_sub(1) as f64);
    for _ in base_len..total_len {
        body.push_back(stack);
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snake(len: usize) -> SnakeState {
        let player = Player::new(1, "tester", "flare");
        SnakeState::new(player, spawn_body(Position::new(0.0, 0.0), 5.0, len, len), 0.0)
    }

    #[test]
    fn test_spawn_body_layout() {
        let body = spawn_body(Position::new(600.0, 100.0), 5.0, 10, 13);
        assert_eq!(body.len(), 13);
        assert_eq!(body[0], Position::new(600.0, 100.0));
        assert_eq!(body[9], Position::new(600.0, 145.0));
        assert_eq!(body[10], body[9]);
        assert_eq!(body[12], body[9]);
    }

    #[test]
    fn test_advance_moves_head_and_tail() {
        let mut s = snake(10);
        let old_tail = s.tail().unwrap();
        let dropped = s.advance(Position::new(0.0, -5.0));
        assert_eq!(dropped, Some(old_tail));
        assert_eq!(s.body_snapshot()[0], Position::new(0.0, -5.0));
        assert_eq!(s.len(), 10);
    }

    #[test]
    fn test_grow_stacks_on_tail() {
        let mut s = snake(10);
        let tail = s.tail().unwrap();
        let added = s.grow(3);
        assert_eq!(added, vec![tail; 3]);
        assert_eq!(s.len(), 13);
        assert_eq!(s.tail(), Some(tail));
    }

    #[test]
    fn test_shrink_respects_min_len() {
        let mut s = snake(12);
        let removed = s.shrink(5, 10);
        assert_eq!(removed.len(), 2);
        assert_eq!(s.len(), 10);
        assert!(s.shrink(1, 10).is_empty());
    }

    #[test]
    fn test_mark_dead_once() {
        let mut s = snake(10);
        assert!(s.mark_dead());
        assert!(!s.mark_dead());
        assert!(!s.is_alive());
    }
}
