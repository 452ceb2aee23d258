//! Lasso Herd - rope-lasso herding game core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (rope chain, loop detection, capture, herd)
//! - `config`: Data-driven tuning loaded from JSON
//! - `game`: Level flow with injected audio and level-transition services

pub mod config;
pub mod game;
pub mod sim;

pub use config::{GameConfig, HerdConfig, RopeConfig};
pub use game::{AudioSink, GameDirector, LevelTransition, SoundCue};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Rope defaults
    pub const SEGMENT_SPACING: f32 = 0.3;
    pub const ANCHOR_TO_DYNAMIC_RATIO: usize = 4;
    pub const SEGMENT_LIMIT: usize = 256;
    pub const CHECK_INTERVAL: f32 = 0.2;
    pub const INTERSECTION_THRESHOLD: f32 = 0.2;
    /// Tolerance on the spacing comparison so float drift doesn't skip a link
    pub const SPACING_EPSILON: f32 = 1e-4;

    /// Loop completion defaults (snap impulse is a 500 N push over one 0.02 s step)
    pub const IMPULSE_MAGNITUDE: f32 = 10.0;
    pub const FADE_DELAY: f32 = 1.0;
    pub const FADE_DURATION: f32 = 2.0;

    /// Scripted rope-layer defaults
    pub const NPC_MOVE_SPEED: f32 = 1.5;
    pub const NPC_START_DELAY: f32 = 6.0;
    pub const WAYPOINT_EPSILON: f32 = 0.05;

    /// Herd defaults
    pub const HERD_MOVE_SPEED: f32 = 1.0;
    pub const HERD_GOAL_DISTANCE: f32 = 1.0;
    pub const HERD_SENSE_RADIUS: f32 = 1.5;
    pub const HERD_GOAL_REACHED: f32 = 0.5;
}

/// Move `current` toward `target` by at most `max_delta`, never overshooting
#[inline]
pub fn move_towards(current: Vec2, target: Vec2, max_delta: f32) -> Vec2 {
    let delta = target - current;
    let dist = delta.length();
    if dist <= max_delta || dist <= f32::EPSILON {
        target
    } else {
        current + delta / dist * max_delta
    }
}

/// Linear interpolation between `a` and `b`, `t` clamped to [0, 1]
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}
