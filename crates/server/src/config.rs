//! Server configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::scaling::ScalingCurve;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub arena: ArenaConfig,
    #[serde(default)]
    pub scaling: ScalingCurve,
    #[serde(default)]
    pub snake: SnakeConfig,
    #[serde(default)]
    pub orbs: OrbConfig,
    #[serde(default)]
    pub boost: BoostConfig,
}

impl Config {
    /// Load configuration from `config.toml` or use defaults.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(Path::new("config.toml"))
    }

    /// Load configuration from `path`, writing the defaults there if it does not exist.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let config: Self = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str(&contents)?
        } else {
            info!("No {} found, creating default config", path.display());
            let default_config = Self::default();
            std::fs::write(path, toml::to_string_pretty(&default_config)?)?;
            default_config
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        let curve = &self.scaling;
        if self.arena.half_extent <= 0.0 {
            anyhow::bail!("arena.half_extent must be positive");
        }
        if curve.base_size <= 0.0 || curve.max_scale < 1.0 {
            anyhow::bail!("scaling.base_size must be positive and scaling.max_scale at least 1");
        }
        if curve.base_points_per_segment <= 0.0
            || curve.max_points_per_segment < curve.base_points_per_segment
        {
            anyhow::bail!("scaling points-per-segment must be positive and non-decreasing");
        }
        if curve.cap_score <= 0.0 {
            anyhow::bail!("scaling.cap_score must be positive");
        }
        if self.snake.spawn_length < 2 {
            anyhow::bail!("snake.spawn_length must be at least 2");
        }
        if self.server.update_rate_hz <= 0.0 {
            anyhow::bail!("server.update_rate_hz must be positive");
        }
        if self.orbs.replenish_interval_secs == 0 {
            anyhow::bail!("orbs.replenish_interval_secs must be at least 1");
        }
        if self.orbs.spawn_margin < 0.0 || self.orbs.spawn_margin >= self.arena.half_extent {
            anyhow::bail!("orbs.spawn_margin leaves no room inside the arena");
        }
        Ok(())
    }
}

/// General session settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server name shown in logs.
    #[serde(default = "default_name")]
    pub name: String,
    /// Expected per-player update rate in Hz (used to spread boost cost).
    #[serde(default = "default_update_rate")]
    pub update_rate_hz: f64,
    /// Head position of a freshly spawned body.
    #[serde(default = "default_spawn_x")]
    pub spawn_x: f64,
    #[serde(default = "default_spawn_y")]
    pub spawn_y: f64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            update_rate_hz: default_update_rate(),
            spawn_x: default_spawn_x(),
            spawn_y: default_spawn_y(),
        }
    }
}

fn default_name() -> String {
    "Slither".to_string()
}
fn default_update_rate() -> f64 {
    20.0
}
fn default_spawn_x() -> f64 {
    600.0
}
fn default_spawn_y() -> f64 {
    100.0
}

/// Arena bounds. The arena is a square centered on the origin.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArenaConfig {
    #[serde(default = "default_half_extent")]
    pub half_extent: f64,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            half_extent: default_half_extent(),
        }
    }
}

fn default_half_extent() -> f64 {
    1500.0
}

/// Body growth and sizing.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SnakeConfig {
    /// Length of a new body; bodies never shrink below this.
    #[serde(default = "default_spawn_length")]
    pub spawn_length: usize,
    /// Distance between spawned segments at scale 1.
    #[serde(default = "default_segment_spacing")]
    pub segment_spacing: f64,
}

impl Default for SnakeConfig {
    fn default() -> Self {
        Self {
            spawn_length: default_spawn_length(),
            segment_spacing: default_segment_spacing(),
        }
    }
}

fn default_spawn_length() -> usize {
    10
}
fn default_segment_spacing() -> f64 {
    5.0
}

/// Orb pool configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OrbConfig {
    /// Ambient orbs kept alive (death drops are counted separately).
    #[serde(default = "default_orb_target")]
    pub target_count: usize,
    /// Seconds between replenishment ticks.
    #[serde(default = "default_replenish_interval")]
    pub replenish_interval_secs: u64,
    /// Death drops closer than this to the previous drop are merged.
    #[serde(default = "default_death_spacing")]
    pub death_orb_min_spacing: f64,
    /// Ambient orbs are kept this far inside the arena edge.
    #[serde(default = "default_spawn_margin")]
    pub spawn_margin: f64,
}

impl OrbConfig {
    #[inline]
    pub fn replenish_interval(&self) -> Duration {
        Duration::from_secs(self.replenish_interval_secs)
    }
}

impl Default for OrbConfig {
    fn default() -> Self {
        Self {
            target_count: default_orb_target(),
            replenish_interval_secs: default_replenish_interval(),
            death_orb_min_spacing: default_death_spacing(),
            spawn_margin: default_spawn_margin(),
        }
    }
}

fn default_orb_target() -> usize {
    200
}
fn default_replenish_interval() -> u64 {
    5
}
fn default_death_spacing() -> f64 {
    3.0
}
fn default_spawn_margin() -> f64 {
    50.0
}

/// Boost cost configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BoostConfig {
    /// Score drained per second while boosting.
    #[serde(default = "default_boost_cost")]
    pub points_per_second: f64,
}

impl Default for BoostConfig {
    fn default() -> Self {
        Self {
            points_per_second: default_boost_cost(),
        }
    }
}

fn default_boost_cost() -> f64 {
    10.0
}

impl Config {
    /// Score drained by one boosted update.
    #[inline]
    pub fn boost_cost_per_update(&self) -> f64 {
        self.boost.points_per_second / self.server.update_rate_hz
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.arena.half_extent, 1500.0);
        assert_eq!(config.snake.spawn_length, 10);
        assert_eq!(config.orbs.replenish_interval(), Duration::from_secs(5));
        assert_eq!(config.boost_cost_per_update(), 0.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            "[arena]\nhalf_extent = 800.0\n\n[scaling]\nmax_scale = 4.0\n",
        )
        .unwrap();
        assert_eq!(config.arena.half_extent, 800.0);
        assert_eq!(config.scaling.max_scale, 4.0);
        assert_eq!(config.scaling.base_size, 35.0);
        assert_eq!(config.orbs.target_count, 200);
    }

    #[test]
    fn test_toml_roundtrip() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back.snake.spawn_length, 10);
        assert_eq!(back.scaling.cap_score, 2000.0);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.snake.spawn_length = 1;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.scaling.max_points_per_segment = 1.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.server.update_rate_hz = 0.0;
        assert!(config.validate().is_err());
    }
}
