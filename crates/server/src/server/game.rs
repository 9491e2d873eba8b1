//! Session state and the per-update pipeline.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::Mutex;
use protocol::{Position, PositionUpdateRequest, ServerMessage};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, trace};

use crate::collision::{check_body_collision, exceeds_border};
use crate::config::Config;
use crate::entity::{color_for_skin, spawn_body, SnakeState};
use crate::leaderboard::ScoreBoard;
use crate::pool::ItemPool;
use crate::scaling::{accrue_segments, growth_from_score, ScalingCurve};
use crate::world::{ArenaBorder, OwnerIndex};

use super::client::{username_key, Player, PlayerId};
use super::{EngineError, MessageSink, Outbound, Recipient};

type SnakeHandle = Arc<Mutex<SnakeState>>;

/// Why a player died.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathCause {
    /// Head left the arena.
    Border,
    /// Head hit this player's body.
    Collision(PlayerId),
}

/// Result of one position update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Player unknown or already dead; nothing changed.
    Discarded,
    /// Player moved and survived.
    Moved {
        eaten: usize,
        grown: usize,
        shrunk: usize,
    },
    /// Player moved and died.
    Died(DeathCause),
}

/// What a successful join produced.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinOutcome {
    /// Full spawned body, head first.
    pub body: Vec<Position>,
    pub score: u32,
}

/// Authoritative state of one game session.
///
/// Every player sits behind its own lock; the orb pool, score board and
/// owner index are shared concurrent maps. An update holds only the
/// mover's lock, so updates from different players run in parallel.
pub struct SessionEngine {
    config: Config,
    curve: ScalingCurve,
    border: ArenaBorder,
    boost_cost: f64,
    players: DashMap<PlayerId, SnakeHandle>,
    /// Case-folded username -> holder.
    names: DashMap<String, PlayerId>,
    index: OwnerIndex,
    pool: ItemPool,
    scores: ScoreBoard,
    sink: Arc<dyn MessageSink>,
}

impl SessionEngine {
    /// Create an empty session. Fails if `config` does not validate.
    pub fn new(config: Config, sink: Arc<dyn MessageSink>) -> anyhow::Result<Self> {
        config.validate()?;
        let border = ArenaBorder::new(config.arena.half_extent);
        Ok(Self {
            curve: config.scaling,
            border,
            boost_cost: config.boost_cost_per_update(),
            players: DashMap::new(),
            names: DashMap::new(),
            index: OwnerIndex::new(),
            pool: ItemPool::new(border, &config.orbs),
            scores: ScoreBoard::new(),
            sink,
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn pool(&self) -> &ItemPool {
        &self.pool
    }

    pub fn scores(&self) -> &ScoreBoard {
        &self.scores
    }

    pub fn index(&self) -> &OwnerIndex {
        &self.index
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn player_ids(&self) -> Vec<PlayerId> {
        self.players.iter().map(|entry| *entry.key()).collect()
    }

    pub fn score(&self, id: PlayerId) -> u32 {
        self.scores.current_score(id)
    }

    pub fn track_length(&self, id: PlayerId) -> Option<usize> {
        let handle = self.lookup(id)?;
        let snake = handle.lock();
        Some(snake.len())
    }

    /// Current body of `id`, head first.
    pub fn track(&self, id: PlayerId) -> Option<Vec<Position>> {
        let handle = self.lookup(id)?;
        let snake = handle.lock();
        Some(snake.body_snapshot())
    }

    pub fn is_username_taken(&self, username: &str) -> bool {
        self.names.contains_key(&username_key(username))
    }

    /// Add a player to the session, spawning a body sized for `initial_score`.
    pub fn add_player(&self, player: Player, initial_score: u32) -> Result<JoinOutcome, EngineError> {
        let head = Position::new(self.config.server.spawn_x, self.config.server.spawn_y);
        self.join_at(player, initial_score, head)
    }

    fn join_at(&self, player: Player, initial_score: u32, head: Position) -> Result<JoinOutcome, EngineError> {
        let id = player.id;
        if self.players.contains_key(&id) {
            return Err(EngineError::PlayerExists(id));
        }
        let name_key = username_key(&player.username);
        match self.names.entry(name_key.clone()) {
            Entry::Occupied(_) => return Err(EngineError::UsernameTaken(player.username)),
            Entry::Vacant(entry) => {
                entry.insert(id);
            }
        }

        let base_len = self.config.snake.spawn_length;
        let (extra, leftover) = growth_from_score(&self.curve, initial_score);
        let spacing = self.config.snake.segment_spacing * self.curve.scale(initial_score);
        let body = spawn_body(head, spacing, base_len, base_len + extra);

        let handle = Arc::new(Mutex::new(SnakeState::new(player, body, leftover)));
        // Hold the new lock until the shared maps agree with the body.
        let snake = handle.lock();
        match self.players.entry(id) {
            Entry::Occupied(_) => {
                self.release_name(&name_key, id);
                return Err(EngineError::PlayerExists(id));
            }
            Entry::Vacant(entry) => {
                entry.insert(Arc::clone(&handle));
            }
        }
        for position in snake.positions() {
            self.index.insert(position, id);
        }
        self.scores.register(&snake.player, initial_score);
        let body = snake.body_snapshot();
        let skin_id = snake.player.skin_id.clone();
        info!(
            "Player {} ({}) joined with score {} and length {}",
            id,
            snake.player.username,
            initial_score,
            body.len()
        );
        drop(snake);

        self.send(
            Recipient::AllExcept(id),
            ServerMessage::IncreaseOtherLength {
                new_body_parts: body.clone(),
                skin_id,
            },
        );
        if body.len() > base_len {
            self.send(
                Recipient::Only(id),
                ServerMessage::IncreaseOwnLength {
                    new_body_parts: body[base_len..].to_vec(),
                },
            );
        }
        self.send(
            Recipient::Only(id),
            ServerMessage::SendOrbs {
                orb_set: self.pool.snapshot_data(),
            },
        );
        self.broadcast_leaderboard();

        Ok(JoinOutcome {
            body,
            score: initial_score,
        })
    }

    /// Remove a player that left. Returns false if the player was already
    /// gone, including when it died first.
    pub fn remove_player(&self, id: PlayerId) -> bool {
        let Some(handle) = self.lookup(id) else {
            return false;
        };
        let mut snake = handle.lock();
        if !snake.mark_dead() {
            return false;
        }
        let track = snake.body_snapshot();
        self.unregister(&handle, id, &snake.player.username, &track);
        info!("Player {} ({}) disconnected", id, snake.player.username);
        let skin_id = snake.player.skin_id.clone();
        drop(snake);

        self.send(
            Recipient::AllExcept(id),
            ServerMessage::OtherUserDied {
                remove_positions: track,
                skin_id,
            },
        );
        self.broadcast_leaderboard();
        true
    }

    /// Run one movement update for `id`.
    pub fn handle_update(&self, id: PlayerId, request: &PositionUpdateRequest) -> Result<UpdateOutcome, EngineError> {
        let update = request.validate()?;
        let Some(handle) = self.lookup(id) else {
            trace!("Update for unknown player {}", id);
            return Ok(UpdateOutcome::Discarded);
        };
        let mut snake = handle.lock();
        if !snake.is_alive() {
            trace!("Update for dead player {}", id);
            return Ok(UpdateOutcome::Discarded);
        }

        // Move
        let Some(tail) = snake.advance(update.add) else {
            return Ok(UpdateOutcome::Discarded);
        };
        self.index.insert(update.add, id);
        self.index.remove(tail, id);
        if tail != update.remove {
            trace!("Player {} expected tail {}, dropped {}", id, update.remove, tail);
        }
        self.send(
            Recipient::AllExcept(id),
            ServerMessage::UpdatePosition {
                add: update.add,
                remove: tail,
                skin_id: snake.player.skin_id.clone(),
                username: snake.player.username.clone(),
                boosting: update.boosting,
            },
        );

        let radius = self.curve.collision_radius(self.scores.current_score(id));
        if exceeds_border(&self.border, update.add, radius) {
            self.kill(&handle, &mut snake, DeathCause::Border);
            return Ok(UpdateOutcome::Died(DeathCause::Border));
        }
        if let Some(owner) = self.body_collision(id, update.add, radius) {
            let cause = DeathCause::Collision(owner);
            self.kill(&handle, &mut snake, cause);
            return Ok(UpdateOutcome::Died(cause));
        }

        let (eaten, grown) = self.eat_orbs(&mut snake, update.add, radius);
        let shrunk = if update.boosting {
            self.apply_boost(&mut snake)
        } else {
            0
        };
        Ok(UpdateOutcome::Moved { eaten, grown, shrunk })
    }

    /// Top up ambient orbs and send everyone the orb set.
    pub fn replenish(&self) -> usize {
        let added = self.pool.replenish();
        if added > 0 {
            debug!("Spawned {} orbs ({} live)", added, self.pool.len());
        }
        self.broadcast_orbs();
        added
    }

    fn lookup(&self, id: PlayerId) -> Option<SnakeHandle> {
        self.players.get(&id).map(|entry| Arc::clone(entry.value()))
    }

    /// First foreign body cell the head touches.
    fn body_collision(&self, id: PlayerId, head: Position, radius: f64) -> Option<PlayerId> {
        let mut radii: HashMap<PlayerId, f64> = HashMap::new();
        self.index.foreign_cells(id).into_iter().find_map(|(cell, owner)| {
            let owner_radius = *radii
                .entry(owner)
                .or_insert_with(|| self.curve.collision_radius(self.scores.current_score(owner)));
            check_body_collision(head, radius, cell, owner_radius)
                .is_colliding()
                .then_some(owner)
        })
    }

    /// Eat every orb the head reaches. Returns (orbs eaten, segments grown).
    fn eat_orbs(&self, snake: &mut SnakeState, head: Position, radius: f64) -> (usize, usize) {
        let id = snake.player.id;
        let mut eaten = 0;
        let mut new_parts = Vec::new();
        for candidate in self.pool.orbs_within(head, radius) {
            // Someone else may have taken it since the scan.
            let Some(orb) = self.pool.consume(candidate.position) else {
                continue;
            };
            eaten += 1;
            let before = self.scores.current_score(id);
            self.scores.apply_delta(id, orb.points() as i64);
            let segments = accrue_segments(
                &mut snake.growth_accumulator,
                orb.points() as f64,
                self.curve.points_per_segment(before),
            );
            for position in snake.grow(segments) {
                self.index.insert(position, id);
                new_parts.push(position);
            }
        }
        if eaten == 0 {
            return (0, 0);
        }

        self.broadcast_orbs();
        if !new_parts.is_empty() {
            debug!("Player {} grew by {} to {}", id, new_parts.len(), snake.len());
            self.send(
                Recipient::Only(id),
                ServerMessage::IncreaseOwnLength {
                    new_body_parts: new_parts.clone(),
                },
            );
            self.send(
                Recipient::AllExcept(id),
                ServerMessage::IncreaseOtherLength {
                    new_body_parts: new_parts.clone(),
                    skin_id: snake.player.skin_id.clone(),
                },
            );
        }
        self.broadcast_leaderboard();
        (eaten, new_parts.len())
    }

    /// Charge one boosted update. Returns the number of segments removed.
    fn apply_boost(&self, snake: &mut SnakeState) -> usize {
        let id = snake.player.id;
        let score = self.scores.current_score(id);
        if score == 0 {
            return 0;
        }
        snake.boost_cost_accumulator += self.boost_cost;
        if snake.boost_cost_accumulator < 1.0 {
            return 0;
        }

        let deducted = (snake.boost_cost_accumulator.floor() as u32).min(score);
        snake.boost_cost_accumulator -= deducted as f64;
        self.scores.apply_delta(id, -(deducted as i64));
        let segments = accrue_segments(
            &mut snake.boost_segment_accumulator,
            deducted as f64,
            self.curve.points_per_segment(score),
        );
        let removed = snake.shrink(segments, self.config.snake.spawn_length);
        for &position in &removed {
            self.index.remove(position, id);
        }

        if !removed.is_empty() {
            debug!("Player {} shrank by {} to {}", id, removed.len(), snake.len());
            self.send(
                Recipient::Only(id),
                ServerMessage::DecreaseOwnLength { count: removed.len() },
            );
            self.send(
                Recipient::AllExcept(id),
                ServerMessage::DecreaseOtherLength {
                    removed_positions: removed.clone(),
                    skin_id: snake.player.skin_id.clone(),
                },
            );
        }
        self.broadcast_leaderboard();
        removed.len()
    }

    /// Death sequence. The caller holds `snake`'s lock.
    fn kill(&self, handle: &SnakeHandle, snake: &mut SnakeState, cause: DeathCause) {
        if !snake.mark_dead() {
            return;
        }
        let id = snake.player.id;
        self.send(Recipient::Only(id), ServerMessage::YouDied);
        let track = snake.body_snapshot();
        self.send(
            Recipient::AllExcept(id),
            ServerMessage::OtherUserDied {
                remove_positions: track.clone(),
                skin_id: snake.player.skin_id.clone(),
            },
        );

        self.unregister(handle, id, &snake.player.username, &track);
        let dropped = self
            .pool
            .drop_death_items(&track, color_for_skin(&snake.player.skin_id));
        info!(
            "Player {} ({}) died ({:?}) at length {}, dropped {} orbs",
            id,
            snake.player.username,
            cause,
            track.len(),
            dropped
        );

        self.broadcast_orbs();
        self.broadcast_leaderboard();
    }

    /// Forget every shared trace of a player.
    fn unregister(&self, handle: &SnakeHandle, id: PlayerId, username: &str, track: &[Position]) {
        for &position in track {
            self.index.remove(position, id);
        }
        self.scores.remove(id);
        self.release_name(&username_key(username), id);
        self.players
            .remove_if(&id, |_, current| Arc::ptr_eq(current, handle));
    }

    /// Free a reserved username, but only if `id` still holds it.
    fn release_name(&self, key: &str, id: PlayerId) {
        self.names.remove_if(key, |_, holder| *holder == id);
    }

    fn send(&self, recipient: Recipient, message: ServerMessage) {
        self.sink.deliver(Outbound { recipient, message });
    }

    fn broadcast_orbs(&self) {
        self.send(
            Recipient::All,
            ServerMessage::SendOrbs {
                orb_set: self.pool.snapshot_data(),
            },
        );
    }

    fn broadcast_leaderboard(&self) {
        self.send(
            Recipient::All,
            ServerMessage::UpdateLeaderboard {
                leaderboard: self.scores.snapshot(),
            },
        );
    }
}

/// Replenish the orb pool every `period` until the task is dropped.
pub async fn run_item_ticker(engine: Arc<SessionEngine>, period: Duration) {
    let start = Instant::now() + period;
    let mut ticker = interval_at(start, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        engine.replenish();
    }
}
