//! Score-driven body scaling.
//!
//! Bodies grow visually (and in collision size) linearly with score up to a
//! cap, and each new body segment costs more points the higher the score,
//! so growth stays sub-linear for long bodies.

use serde::{Deserialize, Serialize};

/// Parameters of the score -> size curves.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct ScalingCurve {
    /// Segment diameter at score 0.
    #[serde(default = "default_base_size")]
    pub base_size: f64,
    /// Largest multiple of `base_size` a body can reach.
    #[serde(default = "default_max_scale")]
    pub max_scale: f64,
    /// Diameter added per point of score.
    #[serde(default = "default_size_per_point")]
    pub size_per_point: f64,
    /// Points per growth segment at score 0.
    #[serde(default = "default_base_points_per_segment")]
    pub base_points_per_segment: f64,
    /// Points per growth segment at and beyond `cap_score`.
    #[serde(default = "default_max_points_per_segment")]
    pub max_points_per_segment: f64,
    /// Score at which points per segment stops rising.
    #[serde(default = "default_cap_score")]
    pub cap_score: f64,
}

impl Default for ScalingCurve {
    fn default() -> Self {
        Self {
            base_size: default_base_size(),
            max_scale: default_max_scale(),
            size_per_point: default_size_per_point(),
            base_points_per_segment: default_base_points_per_segment(),
            max_points_per_segment: default_max_points_per_segment(),
            cap_score: default_cap_score(),
        }
    }
}

fn default_base_size() -> f64 {
    35.0
}
fn default_max_scale() -> f64 {
    3.0
}
fn default_size_per_point() -> f64 {
    0.05
}
fn default_base_points_per_segment() -> f64 {
    2.0
}
fn default_max_points_per_segment() -> f64 {
    5.0
}
fn default_cap_score() -> f64 {
    2000.0
}

impl ScalingCurve {
    /// Scale factor relative to `base_size`, in `[1, max_scale]`.
    #[inline]
    pub fn scale(&self, score: u32) -> f64 {
        let growth_rate = self.size_per_point / self.base_size;
        (1.0 + score as f64 * growth_rate).min(self.max_scale)
    }

    /// Radius used for every distance check involving this body.
    #[inline]
    pub fn collision_radius(&self, score: u32) -> f64 {
        (self.base_size / 2.0) * self.scale(score)
    }

    /// Points needed to earn one body segment at `score`.
    #[inline]
    pub fn points_per_segment(&self, score: u32) -> f64 {
        let score = score as f64;
        if score >= self.cap_score {
            return self.max_points_per_segment;
        }
        let ratio = score / self.cap_score;
        self.base_points_per_segment
            + (self.max_points_per_segment - self.base_points_per_segment) * ratio
    }

    /// A curve whose segment cost never changes. Handy when a fixed cost is needed.
    pub fn with_flat_segment_cost(mut self, points: f64) -> Self {
        self.base_points_per_segment = points;
        self.max_points_per_segment = points;
        self
    }
}

/// Fractional growth bookkeeping shared by live play and join synthesis.
///
/// Adds `value / points_per_segment` to `accumulator` and returns the whole
/// segments earned, leaving the fraction behind.
#[inline]
pub fn accrue_segments(accumulator: &mut f64, value: f64, points_per_segment: f64) -> usize {
    *accumulator += value / points_per_segment;
    let whole = accumulator.floor();
    *accumulator -= whole;
    whole as usize
}

/// Number of extra segments a body earns by collecting `score` one-point
/// orbs starting from zero, plus the leftover growth fraction.
pub fn growth_from_score(curve: &ScalingCurve, score: u32) -> (usize, f64) {
    let mut accumulator = 0.0;
    let mut segments = 0;
    for s in 0..score {
        segments += accrue_segments(&mut accumulator, 1.0, curve.points_per_segment(s));
    }
    (segments, accumulator)
}
