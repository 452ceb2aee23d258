//! In-memory host world
//!
//! Implements every rope service without a game engine: herdables, static
//! markers (herders and fences) and a minimal link-body store. Link bodies
//! only integrate impulses with damping; joints are recorded, not solved.
//! Used by the demo binary and by tests.

use std::collections::BTreeMap;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::herd::Herdable;
use super::services::{
    BodyHandle, BodyKind, Candidate, EntityId, EntityRemoval, Fade, FadeTarget, Fadeable,
    HerdCounter, LayerMask, PhysicsBodies, Removable, SpatialQuery,
};
use crate::config::HerdConfig;

/// Velocity decay rate of dynamic link bodies (per second)
pub const LINK_DAMPING: f32 = 4.0;

/// A rope link body
#[derive(Debug, Clone)]
pub struct LinkBody {
    pub pos: Vec2,
    pub vel: Vec2,
    pub kind: BodyKind,
    pub joint: Option<BodyHandle>,
}

/// Minimal physics body store
#[derive(Debug, Clone, Default)]
pub struct LinkBodies {
    bodies: BTreeMap<BodyHandle, LinkBody>,
    next_handle: BodyHandle,
}

impl LinkBodies {
    /// Integrate dynamic bodies
    pub fn step(&mut self, dt: f32) {
        let decay = (-LINK_DAMPING * dt).exp();
        for body in self.bodies.values_mut() {
            if body.kind == BodyKind::Dynamic {
                body.pos += body.vel * dt;
                body.vel *= decay;
            }
        }
    }

    pub fn get(&self, handle: BodyHandle) -> Option<&LinkBody> {
        self.bodies.get(&handle)
    }

    pub fn kind(&self, handle: BodyHandle) -> Option<BodyKind> {
        self.bodies.get(&handle).map(|b| b.kind)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

impl PhysicsBodies for LinkBodies {
    fn spawn_link(&mut self, pos: Vec2, kind: BodyKind) -> BodyHandle {
        let handle = self.next_handle;
        self.next_handle += 1;
        self.bodies.insert(
            handle,
            LinkBody {
                pos,
                vel: Vec2::ZERO,
                kind,
                joint: None,
            },
        );
        handle
    }

    fn joint(&mut self, body: BodyHandle, previous: BodyHandle) {
        if let Some(b) = self.bodies.get_mut(&body) {
            b.joint = Some(previous);
        }
    }

    fn set_kind(&mut self, body: BodyHandle, kind: BodyKind) {
        if let Some(b) = self.bodies.get_mut(&body) {
            b.kind = kind;
            if kind == BodyKind::Static {
                b.vel = Vec2::ZERO;
            }
        }
    }

    fn apply_impulse(&mut self, body: BodyHandle, impulse: Vec2) {
        // Static bodies don't respond to forces
        if let Some(b) = self.bodies.get_mut(&body) {
            if b.kind == BodyKind::Dynamic {
                b.vel += impulse;
            }
        }
    }

    fn position(&self, body: BodyHandle) -> Option<Vec2> {
        self.bodies.get(&body).map(|b| b.pos)
    }

    fn despawn(&mut self, body: BodyHandle) {
        self.bodies.remove(&body);
    }
}

/// A non-removable entity: a herder or a fence post
#[derive(Debug, Clone)]
pub struct Marker {
    pub id: EntityId,
    pub pos: Vec2,
    pub layers: LayerMask,
}

/// Self-contained world hosting herdables and the rope's bodies
#[derive(Debug, Clone)]
pub struct HerdWorld {
    pub bodies: LinkBodies,
    pub config: HerdConfig,
    herdables: Vec<Herdable>,
    markers: Vec<Marker>,
    counter: HerdCounter,
    rope_opacity: f32,
    rng: Pcg32,
    next_id: EntityId,
}

impl HerdWorld {
    pub fn new(config: HerdConfig, seed: u64) -> Self {
        Self {
            bodies: LinkBodies::default(),
            config,
            herdables: Vec::new(),
            markers: Vec::new(),
            counter: HerdCounter::default(),
            rope_opacity: 1.0,
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Add a herdable and count it toward the level
    pub fn spawn_herdable(&mut self, pos: Vec2) -> EntityId {
        let id = self.next_entity_id();
        self.herdables.push(Herdable::new(id, pos));
        self.counter.register();
        id
    }

    /// Add a herder or fence marker
    pub fn spawn_marker(&mut self, pos: Vec2, layers: LayerMask) -> EntityId {
        let id = self.next_entity_id();
        self.markers.push(Marker { id, pos, layers });
        id
    }

    /// Move a marker (e.g. the herder following the controller)
    pub fn move_marker(&mut self, id: EntityId, pos: Vec2) {
        if let Some(m) = self.markers.iter_mut().find(|m| m.id == id) {
            m.pos = pos;
        }
    }

    pub fn herdable(&self, id: EntityId) -> Option<&Herdable> {
        self.herdables.iter().find(|h| h.id == id)
    }

    pub fn herdables(&self) -> &[Herdable] {
        &self.herdables
    }

    pub fn counter(&self) -> &HerdCounter {
        &self.counter
    }

    pub fn rope_opacity(&self) -> f32 {
        self.rope_opacity
    }

    /// Steer the herd and integrate link bodies
    pub fn step(&mut self, dt: f32) {
        let sense = self.config.sense_radius;
        for herdable in &mut self.herdables {
            let nearby = |layer: LayerMask| -> Vec<Vec2> {
                self.markers
                    .iter()
                    .filter(|m| m.layers.intersects(layer) && m.pos.distance(herdable.pos) <= sense)
                    .map(|m| m.pos)
                    .collect()
            };
            let fences = nearby(LayerMask::FENCE);
            let herders = nearby(LayerMask::HERDER);
            herdable.update_state(&fences, &herders, &self.config, &mut self.rng);
            herdable.step(self.config.move_speed, dt);
        }
        self.bodies.step(dt);
    }
}

impl SpatialQuery for HerdWorld {
    fn query_circle(&self, center: Vec2, radius: f32, layers: LayerMask) -> Vec<Candidate> {
        let mut hits = Vec::new();
        if layers.intersects(LayerMask::HERDABLE) {
            hits.extend(
                self.herdables
                    .iter()
                    .filter(|h| h.pos.distance(center) <= radius)
                    .map(|h| Candidate { id: h.id, pos: h.pos }),
            );
        }
        hits.extend(
            self.markers
                .iter()
                .filter(|m| m.layers.intersects(layers) && m.pos.distance(center) <= radius)
                .map(|m| Candidate { id: m.id, pos: m.pos }),
        );
        hits.sort_by_key(|c| c.id);
        hits
    }
}

impl PhysicsBodies for HerdWorld {
    fn spawn_link(&mut self, pos: Vec2, kind: BodyKind) -> BodyHandle {
        self.rope_opacity = 1.0;
        self.bodies.spawn_link(pos, kind)
    }

    fn joint(&mut self, body: BodyHandle, previous: BodyHandle) {
        self.bodies.joint(body, previous);
    }

    fn set_kind(&mut self, body: BodyHandle, kind: BodyKind) {
        self.bodies.set_kind(body, kind);
    }

    fn apply_impulse(&mut self, body: BodyHandle, impulse: Vec2) {
        self.bodies.apply_impulse(body, impulse);
    }

    fn position(&self, body: BodyHandle) -> Option<Vec2> {
        self.bodies.position(body)
    }

    fn despawn(&mut self, body: BodyHandle) {
        self.bodies.despawn(body);
    }
}

impl Fade for HerdWorld {
    fn set_opacity(&mut self, target: FadeTarget, alpha: f32) {
        match target {
            FadeTarget::Rope => self.rope_opacity = alpha.clamp(0.0, 1.0),
            FadeTarget::Entity(id) => {
                if let Some(h) = self.herdables.iter_mut().find(|h| h.id == id) {
                    Fadeable::set_opacity(h, alpha);
                }
            }
        }
    }
}

impl EntityRemoval for HerdWorld {
    fn remove_entity(&mut self, id: EntityId) -> bool {
        let Some(index) = self.herdables.iter().position(|h| h.id == id) else {
            return false;
        };
        let mut herdable = self.herdables.remove(index);
        herdable.teardown(&mut self.counter);
        log::debug!("Removed herdable {} ({} left)", id, self.counter.count());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_filters_layers_and_radius() {
        let mut world = HerdWorld::new(HerdConfig::default(), 1);
        let near = world.spawn_herdable(Vec2::new(0.5, 0.0));
        let _far = world.spawn_herdable(Vec2::new(5.0, 0.0));
        let fence = world.spawn_marker(Vec2::new(0.2, 0.0), LayerMask::FENCE);

        let ids: Vec<_> = world
            .query_circle(Vec2::ZERO, 1.0, LayerMask::HERDABLE)
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![near]);

        let ids: Vec<_> = world
            .query_circle(Vec2::ZERO, 1.0, LayerMask::HERDABLE | LayerMask::FENCE)
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![near, fence]);
    }

    #[test]
    fn test_removal_is_idempotent() {
        let mut world = HerdWorld::new(HerdConfig::default(), 1);
        let a = world.spawn_herdable(Vec2::ZERO);
        let _b = world.spawn_herdable(Vec2::ONE);
        assert_eq!(world.counter().count(), 2);

        assert!(world.remove_entity(a));
        assert!(!world.remove_entity(a));
        assert_eq!(world.counter().count(), 1);
        assert!(!world.counter().is_cleared());
    }

    #[test]
    fn test_markers_are_not_removable() {
        let mut world = HerdWorld::new(HerdConfig::default(), 1);
        let fence = world.spawn_marker(Vec2::ZERO, LayerMask::FENCE);
        assert!(!world.remove_entity(fence));
    }

    #[test]
    fn test_fade_targets() {
        let mut world = HerdWorld::new(HerdConfig::default(), 1);
        let id = world.spawn_herdable(Vec2::ZERO);
        world.set_opacity(FadeTarget::Entity(id), 0.25);
        world.set_opacity(FadeTarget::Rope, 0.5);
        assert_eq!(world.herdable(id).map(|h| h.opacity()), Some(0.25));
        assert_eq!(world.rope_opacity(), 0.5);
        // Fading a removed entity is a no-op
        world.remove_entity(id);
        world.set_opacity(FadeTarget::Entity(id), 0.0);
    }

    #[test]
    fn test_impulse_moves_only_dynamic_bodies() {
        let mut bodies = LinkBodies::default();
        let fixed = bodies.spawn_link(Vec2::ZERO, BodyKind::Static);
        let free = bodies.spawn_link(Vec2::ZERO, BodyKind::Dynamic);
        bodies.apply_impulse(fixed, Vec2::X);
        bodies.apply_impulse(free, Vec2::X);
        bodies.step(0.1);
        assert_eq!(bodies.position(fixed), Some(Vec2::ZERO));
        assert!(bodies.position(free).unwrap().x > 0.0);
    }

    #[test]
    fn test_herder_scares_herd() {
        let mut world = HerdWorld::new(HerdConfig::default(), 3);
        let id = world.spawn_herdable(Vec2::ZERO);
        world.spawn_marker(Vec2::new(0.5, 0.0), LayerMask::HERDER);
        world.step(0.1);
        let h = world.herdable(id).unwrap();
        assert!(h.pos.x < 0.0);
    }
}
