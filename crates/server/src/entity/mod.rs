//! Game entities.
//!
//! This module defines orbs and player bodies.

mod orb;
mod snake;

pub use orb::{color_for_skin, random_orb_color, Orb, OrbKind, DEFAULT_SKIN, SKIN_COLORS};
pub use snake::{spawn_body, SnakeState};
