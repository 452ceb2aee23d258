//! Rope chain builder
//!
//! The rope is laid one link at a time behind the controller. Each link is a
//! physics body hinged to the one before it. Links are ordered by creation,
//! which is also arc-length order along the rope.
//!
//! Anchoring: the newest link is always static (it is held by the
//! controller). When link `n` is spawned, link `n - 1` settles: it stays
//! static iff `(n - 1) % anchor_to_dynamic_ratio == 0`, otherwise it is
//! released as dynamic. Settled anchors are therefore exactly the indices
//! that are multiples of the ratio.

use glam::Vec2;

use super::services::{BodyHandle, BodyKind, PhysicsBodies};
use crate::config::RopeConfig;
use crate::consts::SPACING_EPSILON;

/// One physical unit of the rope
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    /// Creation index within the chain
    pub index: usize,
    /// Current position, synced from the physics body
    pub pos: Vec2,
    /// Where the link was spawned
    pub spawn_pos: Vec2,
    pub body: BodyHandle,
    /// Body of the previous link this one is hinged to
    pub joint: Option<BodyHandle>,
    pub kind: BodyKind,
}

/// What a call to [`Chain::advance`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// Controller hasn't moved a full spacing yet
    Waiting,
    /// A link was appended at this index
    Spawned(usize),
    /// A link was due but the chain is full
    LimitReached,
}

/// The ordered links of one rope
#[derive(Debug, Clone)]
pub struct Chain {
    links: Vec<Link>,
    spacing: f32,
    anchor_ratio: usize,
    limit: usize,
}

impl Chain {
    pub fn new(config: &RopeConfig) -> Self {
        Self {
            links: Vec::new(),
            spacing: config.segment_spacing,
            anchor_ratio: config.anchor_to_dynamic_ratio.max(1),
            limit: config.segment_limit,
        }
    }

    /// Lay rope behind the controller (call once per tick while generating)
    ///
    /// The first call places a link at the controller. After that a link is
    /// appended whenever the controller is at least one spacing away from
    /// where the previous link was spawned.
    pub fn advance<P>(&mut self, controller: Vec2, bodies: &mut P) -> AdvanceOutcome
    where
        P: PhysicsBodies + ?Sized,
    {
        if let Some(last) = self.links.last() {
            if controller.distance(last.spawn_pos) + SPACING_EPSILON < self.spacing {
                return AdvanceOutcome::Waiting;
            }
        }

        if self.links.len() >= self.limit {
            return AdvanceOutcome::LimitReached;
        }

        AdvanceOutcome::Spawned(self.spawn(controller, bodies))
    }

    fn spawn<P>(&mut self, pos: Vec2, bodies: &mut P) -> usize
    where
        P: PhysicsBodies + ?Sized,
    {
        let index = self.links.len();
        let body = bodies.spawn_link(pos, BodyKind::Static);

        let joint = match self.links.last_mut() {
            Some(prev) => {
                bodies.joint(body, prev.body);
                if !Self::anchors(prev.index, self.anchor_ratio) {
                    prev.kind = BodyKind::Dynamic;
                    bodies.set_kind(prev.body, BodyKind::Dynamic);
                }
                Some(prev.body)
            }
            None => None,
        };

        self.links.push(Link {
            index,
            pos,
            spawn_pos: pos,
            body,
            joint,
            kind: BodyKind::Static,
        });
        log::debug!("Rope link {} at ({:.2}, {:.2})", index, pos.x, pos.y);
        index
    }

    #[inline]
    fn anchors(index: usize, ratio: usize) -> bool {
        index % ratio == 0
    }

    /// Whether link `index` stays anchored once a later link exists
    pub fn is_anchor_index(&self, index: usize) -> bool {
        Self::anchors(index, self.anchor_ratio)
    }

    /// Indices of links that are currently static (settled anchors plus tail)
    pub fn static_indices(&self) -> Vec<usize> {
        self.links
            .iter()
            .filter(|l| l.kind == BodyKind::Static)
            .map(|l| l.index)
            .collect()
    }

    /// Pull current positions from the physics bodies
    pub fn sync_positions<P>(&mut self, bodies: &P)
    where
        P: PhysicsBodies + ?Sized,
    {
        for link in &mut self.links {
            if let Some(pos) = bodies.position(link.body) {
                link.pos = pos;
            }
        }
    }

    /// Link positions in chain order (the rope polyline)
    pub fn positions(&self) -> Vec<Vec2> {
        self.links.iter().map(|l| l.pos).collect()
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Total length of the rope polyline
    pub fn arc_length(&self) -> f32 {
        self.links
            .windows(2)
            .map(|w| w[0].pos.distance(w[1].pos))
            .sum()
    }

    /// Destroy every link body and start over
    pub fn clear<P>(&mut self, bodies: &mut P)
    where
        P: PhysicsBodies + ?Sized,
    {
        for link in self.links.drain(..) {
            bodies.despawn(link.body);
        }
    }
}
