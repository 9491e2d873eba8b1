//! Player identity.

use crate::entity::DEFAULT_SKIN;

/// Session-unique player id, assigned by the connection layer.
pub type PlayerId = u32;

/// A joined player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    /// Unique player ID.
    pub id: PlayerId,
    /// Display name, unique per session ignoring case.
    pub username: String,
    /// Skin name. Also picks the color of the player's death orbs.
    pub skin_id: String,
}

impl Player {
    /// Create a player. A blank skin falls back to the default one.
    pub fn new(id: PlayerId, username: impl Into<String>, skin_id: impl Into<String>) -> Self {
        let skin_id = skin_id.into();
        Self {
            id,
            username: username.into(),
            skin_id: if skin_id.trim().is_empty() {
                DEFAULT_SKIN.to_string()
            } else {
                skin_id
            },
        }
    }
}

/// Key under which a username is reserved. Case is folded with full
/// Unicode rules, so "ÉMILE" and "émile" collide.
pub fn username_key(username: &str) -> String {
    username.to_lowercase()
}
