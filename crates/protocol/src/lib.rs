//! Shared protocol crate for the slither arena server.
//!
//! This crate contains:
//! - Quantized arena positions and colors
//! - Inbound message validation
//! - Outbound message definitions
//!
//! Framing and transport live outside this crate.

mod error;
pub mod packets;

use std::fmt;
use std::hash::{Hash, Hasher};

use glam::DVec2;
use serde::{Deserialize, Serialize, Serializer};

pub use error::ProtocolError;
pub use packets::{
    LeaderboardEntry, OrbData, OrbSize, PositionUpdate, PositionUpdateRequest, RawPoint,
    ServerMessage,
};

/// Number of fractional steps kept per coordinate (2 decimal places).
const QUANTUM: f64 = 100.0;

/// An arena-relative position, origin at the arena center.
///
/// Coordinates are quantized to two decimal places on construction, which
/// makes exact equality meaningful and lets positions act as map keys.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(from = "PositionRepr")]
pub struct Position {
    x: f64,
    y: f64,
}

#[derive(Deserialize)]
struct PositionRepr {
    x: f64,
    y: f64,
}

impl From<PositionRepr> for Position {
    fn from(repr: PositionRepr) -> Self {
        Self::new(repr.x, repr.y)
    }
}

impl Position {
    /// Create a position, quantizing both coordinates.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: quantize(x),
            y: quantize(y),
        }
    }

    #[inline]
    pub fn x(&self) -> f64 {
        self.x
    }

    #[inline]
    pub fn y(&self) -> f64 {
        self.y
    }

    #[inline]
    pub fn as_dvec2(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    /// Euclidean distance to another position.
    #[inline]
    pub fn distance(&self, other: Position) -> f64 {
        self.as_dvec2().distance(other.as_dvec2())
    }
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.x.to_bits() == other.x.to_bits() && self.y.to_bits() == other.y.to_bits()
    }
}

impl Eq for Position {}

impl Hash for Position {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.x.to_bits().hash(state);
        self.y.to_bits().hash(state);
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

#[inline]
fn quantize(v: f64) -> f64 {
    let q = (v * QUANTUM).round() / QUANTUM;
    // Collapse -0.0 so that bitwise equality matches numeric equality.
    if q == 0.0 { 0.0 } else { q }
}

/// RGB color used for orbs and skins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_position_quantizes_to_two_decimals() {
        let p = Position::new(1.23456, -9.87654);
        assert_eq!(p.x(), 1.23);
        assert_eq!(p.y(), -9.88);
        assert_eq!(p, Position::new(1.2349, -9.8751));
    }

    #[test]
    fn test_negative_zero_hashes_like_zero() {
        let mut set = HashSet::new();
        set.insert(Position::new(-0.001, 0.0));
        assert!(set.contains(&Position::new(0.0, 0.0)));
    }

    #[test]
    fn test_distance() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(3.0, 4.0);
        assert_eq!(a.distance(b), 5.0);
    }

    #[test]
    fn test_color_display() {
        assert_eq!(Color::new(0x3d, 0x45, 0xea).to_string(), "#3d45ea");
    }

    #[test]
    fn test_huge_coordinate_overflows_when_quantized() {
        assert!(Position::new(1e307, 0.0).x().is_infinite());
        assert!(Position::new(1e300, -1e300).y().is_finite());
    }
}
