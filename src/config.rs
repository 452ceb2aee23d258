//! Tuning for the rope and the herd
//!
//! Every field has a default matching the shipped game, and every struct is
//! `#[serde(default)]` so a JSON file only needs the values it overrides.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::LayerMask;

/// Rope generation, loop detection and capture tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RopeConfig {
    /// Minimum distance between consecutive links
    pub segment_spacing: f32,
    /// Every Nth link stays anchored (static)
    pub anchor_to_dynamic_ratio: usize,
    /// Maximum links in one rope; reaching it aborts the rope
    pub segment_limit: usize,
    /// Seconds between self-intersection scans
    pub check_interval: f32,
    /// Two non-adjacent links closer than this close the loop
    pub intersection_threshold: f32,
    /// Outward impulse applied to each link when the loop closes
    pub impulse_magnitude: f32,
    /// Pause between the snap and the start of the fade
    pub fade_delay: f32,
    /// Seconds for rope and captured entities to fade to zero
    pub fade_duration: f32,
    /// Entity layers the capture query considers
    pub detection_layers: LayerMask,
}

impl Default for RopeConfig {
    fn default() -> Self {
        Self {
            segment_spacing: SEGMENT_SPACING,
            anchor_to_dynamic_ratio: ANCHOR_TO_DYNAMIC_RATIO,
            segment_limit: SEGMENT_LIMIT,
            check_interval: CHECK_INTERVAL,
            intersection_threshold: INTERSECTION_THRESHOLD,
            impulse_magnitude: IMPULSE_MAGNITUDE,
            fade_delay: FADE_DELAY,
            fade_duration: FADE_DURATION,
            detection_layers: LayerMask::HERDABLE,
        }
    }
}

impl RopeConfig {
    /// Parse a (possibly partial) JSON rope config
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(json).map(Self::validated)
    }

    /// Replace values the simulation can't run with
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();

        if self.anchor_to_dynamic_ratio == 0 {
            log::warn!("anchor_to_dynamic_ratio must be >= 1, using 1");
            self.anchor_to_dynamic_ratio = 1;
        }
        if !(self.segment_spacing > 0.0) {
            log::warn!(
                "segment_spacing {} is not positive, using {}",
                self.segment_spacing,
                defaults.segment_spacing
            );
            self.segment_spacing = defaults.segment_spacing;
        }
        if !(self.check_interval > 0.0) {
            log::warn!(
                "check_interval {} is not positive, using {}",
                self.check_interval,
                defaults.check_interval
            );
            self.check_interval = defaults.check_interval;
        }
        if !(self.intersection_threshold > 0.0) {
            log::warn!(
                "intersection_threshold {} is not positive, using {}",
                self.intersection_threshold,
                defaults.intersection_threshold
            );
            self.intersection_threshold = defaults.intersection_threshold;
        }
        if self.segment_limit < 3 {
            log::warn!("segment_limit {} can't form a loop, using 3", self.segment_limit);
            self.segment_limit = 3;
        }
        self.fade_delay = self.fade_delay.max(0.0);
        self.fade_duration = self.fade_duration.max(0.0);
        self
    }
}

/// Herdable steering tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HerdConfig {
    /// Units per second
    pub move_speed: f32,
    /// How far away a newly picked goal point is
    pub goal_distance: f32,
    /// Radius in which herders and fences startle a herdable
    pub sense_radius: f32,
}

impl Default for HerdConfig {
    fn default() -> Self {
        Self {
            move_speed: HERD_MOVE_SPEED,
            goal_distance: HERD_GOAL_DISTANCE,
            sense_radius: HERD_SENSE_RADIUS,
        }
    }
}

/// Complete game tuning
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub rope: RopeConfig,
    pub herd: HerdConfig,
    /// Seed for herd steering RNG
    pub seed: u64,
}

impl GameConfig {
    /// Parse a (possibly partial) JSON game config
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut config: Self = serde_json::from_str(json)?;
        config.rope = config.rope.validated();
        Ok(config)
    }

    /// Load from a JSON file, falling back to defaults
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(config) => {
                    log::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    log::warn!("Invalid config {}: {}, using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::info!("No config at {} ({}), using defaults", path.display(), e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = RopeConfig::from_json(r#"{ "segment_spacing": 0.5 }"#).unwrap();
        assert_eq!(config.segment_spacing, 0.5);
        assert_eq!(config.anchor_to_dynamic_ratio, ANCHOR_TO_DYNAMIC_RATIO);
        assert_eq!(config.fade_duration, FADE_DURATION);
    }

    #[test]
    fn test_validated_fixes_zero_ratio() {
        let config = RopeConfig {
            anchor_to_dynamic_ratio: 0,
            check_interval: -1.0,
            ..Default::default()
        }
        .validated();
        assert_eq!(config.anchor_to_dynamic_ratio, 1);
        assert_eq!(config.check_interval, CHECK_INTERVAL);
    }

    #[test]
    fn test_game_config_nested() {
        let config =
            GameConfig::from_json(r#"{ "seed": 7, "herd": { "move_speed": 2.0 } }"#).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.herd.move_speed, 2.0);
        assert_eq!(config.rope, RopeConfig::default());
    }

    #[test]
    fn test_bad_json_is_error() {
        assert!(RopeConfig::from_json("{ not json").is_err());
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = GameConfig::load(std::path::Path::new("/nonexistent/lasso.json"));
        assert_eq!(config, GameConfig::default());
    }
}
