//! Server -> Client message definitions.

use serde::Serialize;

use crate::{Color, Position};

/// Size tier of a collectible orb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrbSize {
    Small,
    Medium,
    Large,
}

impl OrbSize {
    /// Score awarded for eating an orb of this tier.
    #[inline]
    pub const fn points(self) -> u32 {
        match self {
            OrbSize::Small => 1,
            OrbSize::Medium => 5,
            OrbSize::Large => 10,
        }
    }
}

/// Orb as seen by clients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OrbData {
    pub position: Position,
    pub size: OrbSize,
    pub color: Color,
}

/// A leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub username: String,
    pub score: u32,
    pub skin_id: String,
}

/// Messages sent from the session engine to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(
    tag = "type",
    content = "data",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum ServerMessage {
    /// Another player's body moved by one cell.
    UpdatePosition {
        add: Position,
        remove: Position,
        skin_id: String,
        username: String,
        boosting: bool,
    },
    /// Full set of live orbs.
    SendOrbs { orb_set: Vec<OrbData> },
    /// The receiver's own body grew.
    IncreaseOwnLength { new_body_parts: Vec<Position> },
    /// Another player's body grew (or spawned).
    IncreaseOtherLength {
        new_body_parts: Vec<Position>,
        skin_id: String,
    },
    /// The receiver's own body lost `count` tail segments.
    DecreaseOwnLength { count: usize },
    /// Another player's body lost these tail segments.
    DecreaseOtherLength {
        removed_positions: Vec<Position>,
        skin_id: String,
    },
    /// Terminal notice for the receiver.
    YouDied,
    /// Another player died; erase these cells.
    OtherUserDied {
        remove_positions: Vec<Position>,
        skin_id: String,
    },
    /// Ranked scores for the session.
    UpdateLeaderboard { leaderboard: Vec<LeaderboardEntry> },
    /// A message from the receiver was rejected.
    Error { reason: String },
}

impl ServerMessage {
    /// Short name used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            ServerMessage::UpdatePosition { .. } => "UPDATE_POSITION",
            ServerMessage::SendOrbs { .. } => "SEND_ORBS",
            ServerMessage::IncreaseOwnLength { .. } => "INCREASE_OWN_LENGTH",
            ServerMessage::IncreaseOtherLength { .. } => "INCREASE_OTHER_LENGTH",
            ServerMessage::DecreaseOwnLength { .. } => "DECREASE_OWN_LENGTH",
            ServerMessage::DecreaseOtherLength { .. } => "DECREASE_OTHER_LENGTH",
            ServerMessage::YouDied => "YOU_DIED",
            ServerMessage::OtherUserDied { .. } => "OTHER_USER_DIED",
            ServerMessage::UpdateLeaderboard { .. } => "UPDATE_LEADERBOARD",
            ServerMessage::Error { .. } => "ERROR",
        }
    }
}
