//! Collectible orbs.

use protocol::{Color, OrbData, OrbSize, Position};
use rand::Rng;

/// Skin used when a join does not name one.
pub const DEFAULT_SKIN: &str = "astro";

/// Body color of each known skin. Orbs are drawn from the same palette.
pub const SKIN_COLORS: [(&str, Color); 9] = [
    ("music", Color::new(0xff, 0x25, 0x4f)),
    ("games", Color::new(0xfe, 0x4e, 0x3e)),
    ("invites", Color::new(0xf8, 0xdc, 0x1f)),
    ("numbers", Color::new(0x05, 0xe2, 0x16)),
    ("appstore", Color::new(0x1c, 0x8b, 0xf3)),
    ("flare", Color::new(0x3d, 0x45, 0xea)),
    ("gamma", Color::new(0x8a, 0x3d, 0xea)),
    ("helio", Color::new(0xe4, 0x3d, 0xea)),
    ("ion", Color::new(0x88, 0x88, 0x88)),
];

/// Color of a skin, falling back to the first palette entry.
pub fn color_for_skin(skin_id: &str) -> Color {
    SKIN_COLORS
        .iter()
        .find(|(id, _)| *id == skin_id)
        .map(|(_, color)| *color)
        .unwrap_or(SKIN_COLORS[0].1)
}

/// Pick a random palette color.
#[inline]
pub fn random_orb_color() -> Color {
    let mut rng = rand::rng();
    SKIN_COLORS[rng.random_range(0..SKIN_COLORS.len())].1
}

/// Where an orb came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrbKind {
    /// Spawned by replenishment.
    Ambient,
    /// Dropped along a dead player's body.
    Death,
}

/// An orb lying in the arena.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orb {
    pub position: Position,
    pub size: OrbSize,
    pub color: Color,
    pub kind: OrbKind,
}

impl Orb {
    pub fn ambient(position: Position, size: OrbSize, color: Color) -> Self {
        Self {
            position,
            size,
            color,
            kind: OrbKind::Ambient,
        }
    }

    /// Death drops are always the largest tier.
    pub fn death(position: Position, color: Color) -> Self {
        Self {
            position,
            size: OrbSize::Large,
            color,
            kind: OrbKind::Death,
        }
    }

    /// Ambient orb with a random tier and color. Small orbs are the most common.
    pub fn random_ambient(position: Position) -> Self {
        let mut rng = rand::rng();
        let size = match rng.random_range(0..100) {
            0..70 => OrbSize::Small,
            70..95 => OrbSize::Medium,
            _ => OrbSize::Large,
        };
        Self::ambient(position, size, random_orb_color())
    }

    /// Score awarded to whoever eats this orb.
    #[inline]
    pub fn points(&self) -> u32 {
        self.size.points()
    }

    #[inline]
    pub fn is_death_drop(&self) -> bool {
        self.kind == OrbKind::Death
    }

    #[inline]
    pub fn to_data(&self) -> OrbData {
        OrbData {
            position: self.position,
            size: self.size,
            color: self.color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skin_colors() {
        assert_eq!(color_for_skin("flare"), Color::new(0x3d, 0x45, 0xea));
        assert_eq!(color_for_skin("ion"), Color::new(0x88, 0x88, 0x88));
        assert_eq!(color_for_skin(DEFAULT_SKIN), Color::new(0xff, 0x25, 0x4f));
    }

    #[test]
    fn test_random_ambient_uses_palette() {
        let p = Position::new(1.0, 2.0);
        for _ in 0..100 {
            let orb = Orb::random_ambient(p);
            assert_eq!(orb.kind, OrbKind::Ambient);
            assert!(SKIN_COLORS.iter().any(|(_, c)| *c == orb.color));
        }
    }

    #[test]
    fn test_death_orb_is_large() {
        let orb = Orb::death(Position::new(0.0, 0.0), color_for_skin("gamma"));
        assert!(orb.is_death_drop());
        assert_eq!(orb.points(), 10);
    }
}
