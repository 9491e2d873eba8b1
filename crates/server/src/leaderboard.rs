//! Session score board.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use protocol::LeaderboardEntry;

use crate::server::client::{Player, PlayerId};

#[derive(Debug, Clone)]
struct ScoreEntry {
    username: String,
    skin_id: String,
    score: u32,
    /// Join order, used to break ties.
    joined: u64,
}

/// Player -> score. Scores never go below zero.
#[derive(Debug, Default)]
pub struct ScoreBoard {
    entries: DashMap<PlayerId, ScoreEntry>,
    next_seq: AtomicU64,
}

impl ScoreBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create (or reset) the entry for `player`.
    pub fn register(&self, player: &Player, initial_score: u32) {
        let joined = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.entries.insert(
            player.id,
            ScoreEntry {
                username: player.username.clone(),
                skin_id: player.skin_id.clone(),
                score: initial_score,
                joined,
            },
        );
    }

    /// Score of `id`, 0 if unknown.
    pub fn current_score(&self, id: PlayerId) -> u32 {
        self.entries.get(&id).map_or(0, |entry| entry.score)
    }

    /// Add `delta` to the score of `id`, flooring at zero.
    /// Returns the new score, or `None` if the player is unknown.
    pub fn apply_delta(&self, id: PlayerId, delta: i64) -> Option<u32> {
        let mut entry = self.entries.get_mut(&id)?;
        let next = (entry.score as i64).saturating_add(delta).clamp(0, u32::MAX as i64);
        entry.score = next as u32;
        Some(entry.score)
    }

    pub fn remove(&self, id: PlayerId) -> bool {
        self.entries.remove(&id).is_some()
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ranked rows, highest score first; equal scores keep join order.
    pub fn snapshot(&self) -> Vec<LeaderboardEntry> {
        let mut rows: Vec<(u32, u64, LeaderboardEntry)> = self
            .entries
            .iter()
            .map(|entry| {
                let e = entry.value();
                (
                    e.score,
                    e.joined,
                    LeaderboardEntry {
                        username: e.username.clone(),
                        score: e.score,
                        skin_id: e.skin_id.clone(),
                    },
                )
            })
            .collect();
        rows.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        rows.into_iter().map(|(_, _, row)| row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with(players: &[(PlayerId, &str, u32)]) -> ScoreBoard {
        let board = ScoreBoard::new();
        for &(id, name, score) in players {
            board.register(&Player::new(id, name, "ion"), score);
        }
        board
    }

    #[test]
    fn test_delta_floors_at_zero() {
        let board = board_with(&[(1, "a", 5)]);
        assert_eq!(board.apply_delta(1, 3), Some(8));
        assert_eq!(board.apply_delta(1, -20), Some(0));
        assert_eq!(board.current_score(1), 0);
    }

    #[test]
    fn test_unknown_player() {
        let board = ScoreBoard::new();
        assert_eq!(board.apply_delta(9, 10), None);
        assert_eq!(board.current_score(9), 0);
        assert!(!board.remove(9));
    }

    #[test]
    fn test_snapshot_ordering() {
        let board = board_with(&[(1, "first", 10), (2, "second", 30), (3, "third", 10)]);
        let names: Vec<_> = board.snapshot().into_iter().map(|e| e.username).collect();
        assert_eq!(names, ["second", "first", "third"]);
    }

    #[test]
    fn test_remove_drops_row() {
        let board = board_with(&[(1, "a", 1), (2, "b", 2)]);
        assert!(board.remove(1));
        assert_eq!(board.len(), 1);
        assert_eq!(board.snapshot()[0].username, "b");
    }

    #[test]
    fn test_concurrent_deltas() {
        let board = board_with(&[(1, "a", 0)]);
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..250 {
                        board.apply_delta(1, 1);
                    }
                });
            }
        });
        assert_eq!(board.current_score(1), 1000);
    }
}
