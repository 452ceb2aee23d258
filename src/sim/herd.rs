//! Herdable animals and their steering
//!
//! A herdable is either idle, roaming toward a random nearby point, or
//! startled and running away from whatever spooked it. Fences spook harder
//! than herders: if any fence is in range, herders are ignored.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::geometry::centroid;
use super::services::{EntityId, Fadeable, HerdCounter, Removable};
use crate::config::HerdConfig;
use crate::consts::HERD_GOAL_REACHED;
use crate::move_towards;

/// Steering state of a herdable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HerdState {
    /// Needs a new goal
    Idle,
    /// Wandering toward a random point
    Roaming,
    /// Fleeing from fences or herders
    Startled,
}

/// A herdable entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Herdable {
    pub id: EntityId,
    pub pos: Vec2,
    pub state: HerdState,
    /// Point currently being walked to
    pub goal: Vec2,
    opacity: f32,
    #[serde(default)]
    torn_down: bool,
}

impl Herdable {
    pub fn new(id: EntityId, pos: Vec2) -> Self {
        Self {
            id,
            pos,
            state: HerdState::Idle,
            goal: pos,
            opacity: 1.0,
            torn_down: false,
        }
    }

    /// Pick a goal for this tick given nearby threats
    pub fn update_state(
        &mut self,
        fences: &[Vec2],
        herders: &[Vec2],
        config: &HerdConfig,
        rng: &mut Pcg32,
    ) {
        let threats = if fences.is_empty() { herders } else { fences };

        if let Some(threat_center) = centroid(threats) {
            match flee_direction(self.pos, threat_center) {
                Some(dir) => {
                    self.state = HerdState::Startled;
                    self.goal = self.pos + dir * config.goal_distance;
                }
                // Standing right on the threat center: bolt anywhere
                None => self.roam(config, rng),
            }
        } else if self.state == HerdState::Idle {
            self.roam(config, rng);
        }

        if self.state != HerdState::Idle && self.pos.distance(self.goal) < HERD_GOAL_REACHED {
            self.state = HerdState::Idle;
        }
    }

    fn roam(&mut self, config: &HerdConfig, rng: &mut Pcg32) {
        self.state = HerdState::Roaming;
        self.goal = self.pos + random_direction(rng) * config.goal_distance;
    }

    /// Walk toward the goal
    pub fn step(&mut self, speed: f32, dt: f32) {
        if self.state != HerdState::Idle {
            self.pos = move_towards(self.pos, self.goal, speed * dt);
        }
    }
}

impl Fadeable for Herdable {
    fn set_opacity(&mut self, alpha: f32) {
        self.opacity = alpha.clamp(0.0, 1.0);
    }

    fn opacity(&self) -> f32 {
        self.opacity
    }
}

impl Removable for Herdable {
    fn teardown(&mut self, counter: &mut HerdCounter) {
        if !self.torn_down {
            self.torn_down = true;
            counter.unregister();
        }
    }
}

/// Unit vector from `threat` to `pos`, `None` when they coincide
pub fn flee_direction(pos: Vec2, threat: Vec2) -> Option<Vec2> {
    let dir = (pos - threat).normalize_or_zero();
    (dir != Vec2::ZERO).then_some(dir)
}

/// Random unit vector; never zero
pub fn random_direction(rng: &mut Pcg32) -> Vec2 {
    let v = Vec2::new(rng.random_range(-1.0..1.0), rng.random_range(-1.0..1.0));
    let dir = v.normalize_or_zero();
    if dir == Vec2::ZERO { Vec2::X } else { dir }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(42)
    }

    #[test]
    fn test_idle_herdable_roams() {
        let config = HerdConfig::default();
        let mut h = Herdable::new(1, Vec2::ZERO);
        h.update_state(&[], &[], &config, &mut rng());
        assert_eq!(h.state, HerdState::Roaming);
        assert!((h.goal.length() - config.goal_distance).abs() < 1e-5);
    }

    #[test]
    fn test_flees_from_herder() {
        let config = HerdConfig::default();
        let mut h = Herdable::new(1, Vec2::ZERO);
        h.update_state(&[], &[Vec2::new(1.0, 0.0)], &config, &mut rng());
        assert_eq!(h.state, HerdState::Startled);
        assert!(h.goal.x < 0.0);
    }

    #[test]
    fn test_fences_take_priority() {
        let config = HerdConfig::default();
        let mut h = Herdable::new(1, Vec2::ZERO);
        h.update_state(&[Vec2::new(0.0, 1.0)], &[Vec2::new(0.0, -1.0)], &config, &mut rng());
        assert_eq!(h.state, HerdState::Startled);
        // Away from the fence, toward the herder
        assert!(h.goal.y < 0.0);
    }

    #[test]
    fn test_threat_on_top_falls_back_to_roam() {
        let config = HerdConfig::default();
        let mut h = Herdable::new(1, Vec2::new(2.0, 2.0));
        h.update_state(&[], &[Vec2::new(2.0, 2.0)], &config, &mut rng());
        assert_eq!(h.state, HerdState::Roaming);
        assert!(h.goal.is_finite());
        assert!(h.goal != h.pos);
    }

    #[test]
    fn test_reaching_goal_goes_idle() {
        let config = HerdConfig::default();
        let mut h = Herdable::new(1, Vec2::ZERO);
        h.state = HerdState::Roaming;
        h.goal = Vec2::new(0.2, 0.0);
        h.update_state(&[], &[], &config, &mut rng());
        assert_eq!(h.state, HerdState::Idle);
    }

    #[test]
    fn test_step_moves_toward_goal() {
        let mut h = Herdable::new(1, Vec2::ZERO);
        h.state = HerdState::Roaming;
        h.goal = Vec2::new(1.0, 0.0);
        h.step(1.0, 0.25);
        assert!((h.pos.x - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_teardown_runs_once() {
        let mut counter = HerdCounter::default();
        counter.register();
        counter.register();
        let mut h = Herdable::new(1, Vec2::ZERO);
        h.teardown(&mut counter);
        h.teardown(&mut counter);
        assert_eq!(counter.count(), 1);
    }
}
