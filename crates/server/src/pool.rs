//! The live orb set of a session.
//!
//! Orbs are keyed by their quantized position, so two orbs never share a
//! cell and eating an orb is a single atomic remove.

use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use protocol::{Color, OrbData, Position};
use tracing::debug;

use crate::collision::can_eat_orb;
use crate::config::OrbConfig;
use crate::entity::Orb;
use crate::world::ArenaBorder;

/// Random placements tried per missing orb before a replenish gives up.
const PLACEMENT_ATTEMPTS: usize = 4;

/// Concurrent orb pool.
#[derive(Debug)]
pub struct ItemPool {
    orbs: DashMap<Position, Orb>,
    /// Live death drops. Kept apart so they don't count toward the ambient target.
    death_count: AtomicUsize,
    target: usize,
    border: ArenaBorder,
    spawn_margin: f64,
    death_spacing: f64,
}

impl ItemPool {
    pub fn new(border: ArenaBorder, config: &OrbConfig) -> Self {
        Self {
            orbs: DashMap::with_capacity(config.target_count),
            death_count: AtomicUsize::new(0),
            target: config.target_count,
            border,
            spawn_margin: config.spawn_margin.clamp(0.0, border.half_extent / 2.0),
            death_spacing: config.death_orb_min_spacing,
        }
    }

    /// Top up ambient orbs until the target is met. Returns how many were added.
    pub fn replenish(&self) -> usize {
        let missing = self.target.saturating_sub(self.ambient_count());
        let mut added = 0;
        let mut attempts = missing * PLACEMENT_ATTEMPTS;
        while added < missing && attempts > 0 {
            attempts -= 1;
            let position = self.border.random_position(self.spawn_margin);
            if self.place(Orb::random_ambient(position)) {
                added += 1;
            }
        }
        if added < missing {
            debug!("Replenish placed {} of {} orbs", added, missing);
        }
        added
    }

    /// Insert `orb` if its cell is free. Returns false if an orb already sits there.
    pub fn place(&self, orb: Orb) -> bool {
        match self.orbs.entry(orb.position) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                if orb.is_death_drop() {
                    self.death_count.fetch_add(1, Ordering::Relaxed);
                }
                entry.insert(orb);
                true
            }
        }
    }

    /// Remove the orb at `position`. Of any number of concurrent callers,
    /// exactly one gets `Some`.
    pub fn consume(&self, position: Position) -> Option<Orb> {
        let (_, orb) = self.orbs.remove(&position)?;
        if orb.is_death_drop() {
            // Never wraps: every live death orb was counted when placed.
            let _ = self
                .death_count
                .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
        }
        Some(orb)
    }

    /// Scatter death orbs along a dead body. Positions closer than the
    /// configured spacing to the previous drop are skipped.
    pub fn drop_death_items(&self, track: &[Position], color: Color) -> usize {
        let mut last: Option<Position> = None;
        let mut placed = 0;
        for &position in track {
            if last.is_some_and(|prev| prev.distance(position) < self.death_spacing) {
                continue;
            }
            last = Some(position);
            if self.place(Orb::death(position, color)) {
                placed += 1;
            }
        }
        placed
    }

    /// Orbs a head of `radius` at `center` can reach.
    pub fn orbs_within(&self, center: Position, radius: f64) -> Vec<Orb> {
        self.orbs
            .iter()
            .filter(|entry| can_eat_orb(center, radius, *entry.key()))
            .map(|entry| *entry.value())
            .collect()
    }

    pub fn snapshot(&self) -> Vec<Orb> {
        self.orbs.iter().map(|entry| *entry.value()).collect()
    }

    /// Snapshot in the shape clients receive.
    pub fn snapshot_data(&self) -> Vec<OrbData> {
        self.orbs.iter().map(|entry| entry.value().to_data()).collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.orbs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.orbs.is_empty()
    }

    #[inline]
    pub fn death_count(&self) -> usize {
        self.death_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn ambient_count(&self) -> usize {
        self.len().saturating_sub(self.death_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::color_for_skin;
    use protocol::OrbSize;

    fn pool(target: usize) -> ItemPool {
        let config = OrbConfig {
            target_count: target,
            ..OrbConfig::default()
        };
        ItemPool::new(ArenaBorder::new(1500.0), &config)
    }

    #[test]
    fn test_replenish_reaches_target() {
        let pool = pool(200);
        assert_eq!(pool.replenish(), 200);
        assert_eq!(pool.len(), 200);
        assert_eq!(pool.replenish(), 0);
        for orb in pool.snapshot() {
            assert!(orb.position.x().abs() <= 1450.0);
            assert!(orb.position.y().abs() <= 1450.0);
        }
    }

    #[test]
    fn test_replenish_ignores_death_drops() {
        let pool = pool(10);
        let color = color_for_skin("ion");
        let track: Vec<Position> = (0..5).map(|i| Position::new(0.0, i as f64 * 10.0)).collect();
        assert_eq!(pool.drop_death_items(&track, color), 5);
        assert_eq!(pool.death_count(), 5);
        assert_eq!(pool.ambient_count(), 0);

        assert_eq!(pool.replenish(), 10);
        assert_eq!(pool.len(), 15);
        assert_eq!(pool.ambient_count(), 10);
    }

    #[test]
    fn test_place_never_overwrites() {
        let pool = pool(0);
        let p = Position::new(5.0, 5.0);
        assert!(pool.place(Orb::ambient(p, OrbSize::Small, color_for_skin("music"))));
        assert!(!pool.place(Orb::death(p, color_for_skin("ion"))));
        assert_eq!(pool.snapshot()[0].size, OrbSize::Small);
        assert_eq!(pool.death_count(), 0);
    }

    #[test]
    fn test_consume_once() {
        let pool = pool(0);
        let p = Position::new(1.0, 1.0);
        pool.place(Orb::death(p, color_for_skin("gamma")));
        assert_eq!(pool.death_count(), 1);

        let orb = pool.consume(p).unwrap();
        assert_eq!(orb.points(), 10);
        assert_eq!(pool.death_count(), 0);
        assert!(pool.consume(p).is_none());
        assert_eq!(pool.death_count(), 0);
    }

    #[test]
    fn test_death_drops_skip_close_positions() {
        let pool = pool(0);
        let track = vec![
            Position::new(0.0, 0.0),
            Position::new(0.0, 2.0),
            Position::new(0.0, 5.0),
            Position::new(0.0, 5.0),
            Position::new(0.0, 10.0),
        ];
        assert_eq!(pool.drop_death_items(&track, color_for_skin("helio")), 3);
        assert!(pool.snapshot().iter().all(|o| o.position != Position::new(0.0, 2.0)));
        assert!(pool.snapshot().iter().all(|o| o.size == OrbSize::Large));
    }

    #[test]
    fn test_orbs_within() {
        let pool = pool(0);
        let color = color_for_skin("music");
        pool.place(Orb::ambient(Position::new(10.0, 0.0), OrbSize::Small, color));
        pool.place(Orb::ambient(Position::new(30.0, 0.0), OrbSize::Small, color));
        let near = pool.orbs_within(Position::new(0.0, 0.0), 17.5);
        assert_eq!(near.len(), 1);
        assert_eq!(near[0].position, Position::new(10.0, 0.0));
    }

    #[test]
    fn test_concurrent_consume_has_one_winner() {
        let pool = pool(0);
        let p = Position::new(3.0, 4.0);
        pool.place(Orb::ambient(p, OrbSize::Medium, color_for_skin("ion")));
        let winners = AtomicUsize::new(0);
        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    if pool.consume(p).is_some() {
                        winners.fetch_add(1, Ordering::Relaxed);
                    }
                });
            }
        });
        assert_eq!(winners.load(Ordering::Relaxed), 1);
        assert!(pool.is_empty());
    }
}
