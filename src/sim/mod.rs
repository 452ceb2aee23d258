//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time only advances through `tick(.., dt)`
//! - Seeded RNG only
//! - Stable iteration order (by creation index / entity ID)
//! - No rendering, audio or engine dependencies; the host is reached through
//!   the traits in `services`

pub mod capture;
pub mod chain;
pub mod geometry;
pub mod herd;
pub mod intersect;
pub mod path;
pub mod services;
pub mod session;
pub mod world;

pub use capture::{Capture, compute_capture, outward_impulse};
pub use chain::{AdvanceOutcome, Chain, Link};
pub use geometry::{bounding_circle, bounding_radius, centroid, point_in_polygon};
pub use herd::{HerdState, Herdable};
pub use intersect::{Closure, IntersectionDetector, find_closure};
pub use path::{PathFollower, PathSignal, ScriptedRoper};
pub use services::{
    BodyHandle, BodyKind, Candidate, EntityId, EntityRemoval, Fade, FadeTarget, Fadeable,
    HerdCounter, LayerMask, PhysicsBodies, Removable, RopeEnvironment, SpatialQuery,
};
pub use session::{AbortReason, RopeEvent, RopeInput, RopePhase, RopeSession};
pub use world::{HerdWorld, LinkBodies};
