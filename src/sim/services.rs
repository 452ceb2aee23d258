//! Engine services the rope core talks to
//!
//! The core never simulates physics, renders or owns entities itself. It sees
//! the world only through these traits, so a game engine, the in-memory
//! [`HerdWorld`](super::world::HerdWorld) or a test double can host it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Entity identifier handed out by the host world
pub type EntityId = u32;

/// Physics body handle handed out by the host world
pub type BodyHandle = u32;

/// Bitmask of entity layers (collision/detection categories)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const NONE: Self = Self(0);
    pub const HERDABLE: Self = Self(1 << 0);
    pub const HERDER: Self = Self(1 << 1);
    pub const FENCE: Self = Self(1 << 2);
    pub const ALL: Self = Self(u32::MAX);

    #[inline]
    pub fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
}

impl std::ops::BitOr for LayerMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// How a rope link body moves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    /// Pinned in place, anchors the rope
    Static,
    /// Free, swings with the joints
    Dynamic,
}

/// A broad-phase hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub id: EntityId,
    pub pos: Vec2,
}

/// Something whose opacity can be set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeTarget {
    /// The rope's line visual
    Rope,
    Entity(EntityId),
}

/// "Return all entities of these layers within this circle"
pub trait SpatialQuery {
    fn query_circle(&self, center: Vec2, radius: f32, layers: LayerMask) -> Vec<Candidate>;
}

/// Opaque physics: the core asks for bodies, joints and impulses
pub trait PhysicsBodies {
    fn spawn_link(&mut self, pos: Vec2, kind: BodyKind) -> BodyHandle;
    /// Hinge `body` to `previous`
    fn joint(&mut self, body: BodyHandle, previous: BodyHandle);
    fn set_kind(&mut self, body: BodyHandle, kind: BodyKind);
    fn apply_impulse(&mut self, body: BodyHandle, impulse: Vec2);
    /// Current position, `None` once despawned
    fn position(&self, body: BodyHandle) -> Option<Vec2>;
    /// Destroy the body; unknown handles are ignored
    fn despawn(&mut self, body: BodyHandle);
}

/// "Set opacity of renderable R to alpha"
pub trait Fade {
    fn set_opacity(&mut self, target: FadeTarget, alpha: f32);
}

/// "Permanently remove entity E"
pub trait EntityRemoval {
    /// Runs the entity's teardown then removes it.
    ///
    /// Returns `false` (and does nothing) if the entity is already gone.
    fn remove_entity(&mut self, id: EntityId) -> bool;
}

/// Everything a rope session needs from its host
pub trait RopeEnvironment: SpatialQuery + PhysicsBodies + Fade + EntityRemoval {}

impl<T: SpatialQuery + PhysicsBodies + Fade + EntityRemoval> RopeEnvironment for T {}

/// Capability: the entity has a visual that can fade
pub trait Fadeable {
    fn set_opacity(&mut self, alpha: f32);
    fn opacity(&self) -> f32;
}

/// Capability: the entity can be permanently removed
pub trait Removable {
    /// Cleanup run once, right before the entity disappears
    fn teardown(&mut self, counter: &mut HerdCounter);
}

/// Running count of live herdables; the level is won when it hits zero
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HerdCounter {
    count: u32,
    cleared: bool,
}

impl HerdCounter {
    pub fn register(&mut self) {
        self.count += 1;
        self.cleared = false;
    }

    pub fn unregister(&mut self) {
        self.count = self.count.saturating_sub(1);
        if self.count == 0 {
            self.cleared = true;
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// True once every registered herdable has been removed
    pub fn is_cleared(&self) -> bool {
        self.cleared
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_mask() {
        let mask = LayerMask::HERDABLE | LayerMask::FENCE;
        assert!(mask.intersects(LayerMask::HERDABLE));
        assert!(!mask.intersects(LayerMask::HERDER));
        assert!(!LayerMask::NONE.intersects(LayerMask::ALL));
    }

    #[test]
    fn test_herd_counter() {
        let mut counter = HerdCounter::default();
        assert!(!counter.is_cleared());
        counter.register();
        counter.register();
        counter.unregister();
        assert!(!counter.is_cleared());
        counter.unregister();
        assert!(counter.is_cleared());
        // Extra unregister doesn't underflow
        counter.unregister();
        assert_eq!(counter.count(), 0);
    }
}
