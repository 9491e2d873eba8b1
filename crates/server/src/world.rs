//! Arena geometry and the session-wide cell ownership index.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use protocol::Position;
use rand::Rng;
use smallvec::SmallVec;
use tracing::debug;

use crate::server::client::PlayerId;

/// Arena bounds. The arena is a square centered on the origin.
#[derive(Debug, Clone, Copy)]
pub struct ArenaBorder {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
    pub half_extent: f64,
}

impl ArenaBorder {
    pub fn new(half_extent: f64) -> Self {
        Self {
            min_x: -half_extent,
            min_y: -half_extent,
            max_x: half_extent,
            max_y: half_extent,
            half_extent,
        }
    }

    /// Get a random position at least `margin` away from every edge.
    #[inline]
    pub fn random_position(&self, margin: f64) -> Position {
        let mut rng = rand::rng();
        Position::new(
            rng.random_range(self.min_x + margin..self.max_x - margin),
            rng.random_range(self.min_y + margin..self.max_y - margin),
        )
    }
}

/// One player's claim on a cell. Stacked growth segments share a cell, so
/// claims are counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occupant {
    pub owner: PlayerId,
    pub count: u32,
}

/// Occupied cell -> owning player(s).
///
/// Shared by every player's update; each cell is updated atomically under
/// its shard lock, but there is no atomicity across cells.
#[derive(Debug, Default)]
pub struct OwnerIndex {
    cells: DashMap<Position, SmallVec<[Occupant; 2]>>,
}

impl OwnerIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one more segment of `owner` at `position`.
    pub fn insert(&self, position: Position, owner: PlayerId) {
        let mut occupants = self.cells.entry(position).or_default();
        match occupants.iter_mut().find(|o| o.owner == owner) {
            Some(occupant) => occupant.count += 1,
            None => occupants.push(Occupant { owner, count: 1 }),
        }
    }

    /// Drop one segment of `owner` at `position`. Returns false (and does
    /// nothing) if the index holds no such segment.
    pub fn remove(&self, position: Position, owner: PlayerId) -> bool {
        match self.cells.entry(position) {
            Entry::Occupied(mut entry) => {
                let occupants = entry.get_mut();
                let Some(i) = occupants.iter().position(|o| o.owner == owner) else {
                    debug!("Owner index: {} holds no segment of player {}", position, owner);
                    return false;
                };
                occupants[i].count -= 1;
                if occupants[i].count == 0 {
                    occupants.swap_remove(i);
                }
                if occupants.is_empty() {
                    entry.remove();
                }
                true
            }
            Entry::Vacant(_) => {
                debug!("Owner index: {} is not occupied (player {})", position, owner);
                false
            }
        }
    }

    /// Whether `owner` has any segment at `position`.
    pub fn is_occupied_by(&self, position: Position, owner: PlayerId) -> bool {
        self.cells
            .get(&position)
            .is_some_and(|occupants| occupants.iter().any(|o| o.owner == owner))
    }

    /// Snapshot of every cell claimed by someone other than `owner`.
    ///
    /// This is the "others' positions" view used by the body collision pass.
    pub fn foreign_cells(&self, owner: PlayerId) -> Vec<(Position, PlayerId)> {
        let mut out = Vec::with_capacity(self.cells.len());
        for entry in self.cells.iter() {
            for occupant in entry.value().iter().filter(|o| o.owner != owner) {
                out.push((*entry.key(), occupant.owner));
            }
        }
        out
    }

    /// Total segments recorded for `owner`, counting stacked ones.
    pub fn segment_count(&self, owner: PlayerId) -> usize {
        self.cells
            .iter()
            .map(|entry| {
                entry
                    .value()
                    .iter()
                    .filter(|o| o.owner == owner)
                    .map(|o| o.count as usize)
                    .sum::<usize>()
            })
            .sum()
    }

    /// Number of distinct occupied cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_position_respects_margin() {
        let border = ArenaBorder::new(100.0);
        for _ in 0..500 {
            let p = border.random_position(10.0);
            assert!(p.x() >= -90.0 && p.x() <= 90.0);
            assert!(p.y() >= -90.0 && p.y() <= 90.0);
        }
    }

    #[test]
    fn test_stacked_segments_are_counted() {
        let index = OwnerIndex::new();
        let p = Position::new(5.0, 5.0);
        index.insert(p, 1);
        index.insert(p, 1);
        assert_eq!(index.segment_count(1), 2);

        assert!(index.remove(p, 1));
        assert!(index.is_occupied_by(p, 1));
        assert!(index.remove(p, 1));
        assert!(!index.is_occupied_by(p, 1));
        assert!(index.is_empty());
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let index = OwnerIndex::new();
        let p = Position::new(1.0, 1.0);
        assert!(!index.remove(p, 7));
        index.insert(p, 1);
        assert!(!index.remove(p, 2));
        assert!(index.is_occupied_by(p, 1));
    }

    #[test]
    fn test_shared_cell_keeps_both_owners() {
        let index = OwnerIndex::new();
        let p = Position::new(0.0, 0.0);
        index.insert(p, 1);
        index.insert(p, 2);
        assert_eq!(index.len(), 1);
        assert_eq!(index.foreign_cells(1), vec![(p, 2)]);
        assert_eq!(index.foreign_cells(2), vec![(p, 1)]);

        index.remove(p, 1);
        assert!(!index.is_occupied_by(p, 1));
        assert!(index.is_occupied_by(p, 2));
    }
}
