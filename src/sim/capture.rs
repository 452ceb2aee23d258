//! Loop completion: what the closed rope caught
//!
//! Broad phase asks the host for everything inside the loop's bounding
//! circle; narrow phase keeps only what the even-odd test puts inside the
//! polygon traced by the links.

use glam::Vec2;

use super::chain::Chain;
use super::geometry::{bounding_circle, point_in_polygon};
use super::services::{EntityId, LayerMask, PhysicsBodies, SpatialQuery};
use crate::lerp;

/// Entities caught by a closed loop
#[derive(Debug, Clone, PartialEq)]
pub struct Capture {
    /// Vertex mean of the loop polygon
    pub centroid: Vec2,
    /// Bounding radius around the centroid
    pub radius: f32,
    /// Broad-phase hit count (before the polygon test)
    pub candidates: usize,
    /// Entities inside the polygon, in query order
    pub captured: Vec<EntityId>,
}

/// Run broad and narrow phase for a loop polygon
///
/// Returns `None` for a polygon that can't enclose anything (< 3 vertices).
pub fn compute_capture<Q>(polygon: &[Vec2], query: &Q, layers: LayerMask) -> Option<Capture>
where
    Q: SpatialQuery + ?Sized,
{
    if polygon.len() < 3 {
        return None;
    }
    let (centroid, radius) = bounding_circle(polygon)?;

    let candidates = query.query_circle(centroid, radius, layers);
    let captured = candidates
        .iter()
        .filter(|c| point_in_polygon(c.pos, polygon))
        .map(|c| c.id)
        .collect();

    Some(Capture {
        centroid,
        radius,
        candidates: candidates.len(),
        captured,
    })
}

/// Outward impulse for one link, `None` if the link sits on the centroid
#[inline]
pub fn outward_impulse(centroid: Vec2, link_pos: Vec2, magnitude: f32) -> Option<Vec2> {
    let dir = (link_pos - centroid).normalize_or_zero();
    if dir == Vec2::ZERO {
        None
    } else {
        Some(dir * magnitude)
    }
}

/// Kick every link away from the centroid; returns how many were kicked
pub fn snap_outward<P>(chain: &Chain, centroid: Vec2, magnitude: f32, bodies: &mut P) -> usize
where
    P: PhysicsBodies + ?Sized,
{
    let mut applied = 0;
    for link in chain.links() {
        if let Some(impulse) = outward_impulse(centroid, link.pos, magnitude) {
            bodies.apply_impulse(link.body, impulse);
            applied += 1;
        }
    }
    applied
}

/// Opacity `elapsed` seconds into a fade of `duration`
#[inline]
pub fn fade_alpha(elapsed: f32, duration: f32) -> f32 {
    if duration <= 0.0 {
        return 0.0;
    }
    lerp(1.0, 0.0, elapsed / duration)
}
