//! Authoritative session engine for the slither arena.

pub mod collision;
pub mod config;
pub mod entity;
pub mod leaderboard;
pub mod pool;
pub mod scaling;
pub mod server;
pub mod world;

// Re-export commonly used types
pub use config::Config;
pub use leaderboard::ScoreBoard;
pub use pool::ItemPool;
pub use scaling::ScalingCurve;
pub use server::{
    run_item_ticker, DeathCause, EngineError, JoinOutcome, MessageSink, NullSink, Outbound, Player, PlayerId,
    Recipient, SessionEngine, UpdateOutcome,
};
