//! Session engine and its outbound plumbing.

use protocol::{ProtocolError, ServerMessage};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::trace;

pub mod client;
pub mod game;

pub use client::{Player, PlayerId};
pub use game::{run_item_ticker, DeathCause, JoinOutcome, SessionEngine, UpdateOutcome};

/// Who a message is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// A single player.
    Only(PlayerId),
    /// Everyone in the session but this player.
    AllExcept(PlayerId),
    /// Everyone in the session.
    All,
}

impl Recipient {
    /// Whether a player in the session receives a message sent here.
    pub fn includes(&self, id: PlayerId) -> bool {
        match *self {
            Recipient::Only(target) => target == id,
            Recipient::AllExcept(excluded) => excluded != id,
            Recipient::All => true,
        }
    }
}

/// An addressed server message.
#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub recipient: Recipient,
    pub message: ServerMessage,
}

/// Where the engine hands its messages. Delivery must not block.
pub trait MessageSink: Send + Sync {
    fn deliver(&self, outbound: Outbound);
}

impl MessageSink for mpsc::UnboundedSender<Outbound> {
    fn deliver(&self, outbound: Outbound) {
        if let Err(e) = self.send(outbound) {
            trace!("Dropping {} message, receiver closed", e.0.message.kind());
        }
    }
}

/// Sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl MessageSink for NullSink {
    fn deliver(&self, _outbound: Outbound) {}
}

/// Errors returned by the session engine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("malformed update: {0}")]
    Protocol(#[from] ProtocolError),
    #[error("player {0} is already in the session")]
    PlayerExists(PlayerId),
    #[error("username {0:?} is already taken")]
    UsernameTaken(String),
}
