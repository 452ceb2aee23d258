//! Rope lifecycle
//!
//! One session per rope-drawing actor. Per tick, in order: lay rope, sync
//! link positions from physics, run the self-intersection scan, and on a hit
//! run loop completion. Timed phases carry their own clocks and advance only
//! inside [`RopeSession::tick`].
//!
//! ```text
//! Idle --start--> Generating --stop / segment limit--> Idle
//!                 Generating --closure--> Closing --> Fading --fade done--> Idle
//! ```

use glam::Vec2;

use super::capture::{Capture, compute_capture, fade_alpha, snap_outward};
use super::chain::{AdvanceOutcome, Chain};
use super::intersect::{Closure, IntersectionDetector};
use super::services::{EntityId, FadeTarget, RopeEnvironment};
use crate::config::RopeConfig;

/// Session state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RopePhase {
    /// No rope
    Idle,
    /// Rope growing behind the controller, detector running
    Generating,
    /// Loop found; generation frozen while the capture is computed
    Closing,
    /// Snap delay, then rope and captured entities fade out
    Fading { delay_left: f32, elapsed: f32 },
}

/// Controller state for a single tick
#[derive(Debug, Clone, Default)]
pub struct RopeInput {
    /// Where the rope is being dragged from (mouse or NPC position)
    pub controller: Vec2,
    /// Begin a rope (press)
    pub start: bool,
    /// Drop the rope (release)
    pub stop: bool,
}

/// Why a rope was discarded without a capture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    /// Input released before the loop closed
    Released,
    /// Rope hit the segment limit
    SegmentLimit,
    /// Forced closed with too few links to enclose anything
    TooShort,
}

/// Something that happened during a tick
#[derive(Debug, Clone, PartialEq)]
pub enum RopeEvent {
    Started,
    LinkSpawned { index: usize },
    Aborted { reason: AbortReason, links: usize },
    LoopClosed { centroid: Vec2, links: usize, candidates: usize },
    /// Fade finished; these entities were removed
    Captured { ids: Vec<EntityId> },
}

/// A single actor's rope
#[derive(Debug, Clone)]
pub struct RopeSession {
    config: RopeConfig,
    phase: RopePhase,
    chain: Chain,
    detector: IntersectionDetector,
    capture: Option<Capture>,
    events: Vec<RopeEvent>,
}

impl RopeSession {
    pub fn new(config: RopeConfig) -> Self {
        let config = config.validated();
        Self {
            chain: Chain::new(&config),
            detector: IntersectionDetector::new(config.check_interval, config.intersection_threshold),
            config,
            phase: RopePhase::Idle,
            capture: None,
            events: Vec::new(),
        }
    }

    pub fn phase(&self) -> RopePhase {
        self.phase
    }

    pub fn config(&self) -> &RopeConfig {
        &self.config
    }

    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    /// Capture in progress (Fading only)
    pub fn capture(&self) -> Option<&Capture> {
        self.capture.as_ref()
    }

    /// Closure point from the most recent scan
    pub fn last_closure(&self) -> Option<Closure> {
        self.detector.last_closure()
    }

    /// Take the events recorded since the last drain
    pub fn drain_events(&mut self) -> Vec<RopeEvent> {
        std::mem::take(&mut self.events)
    }

    /// Begin a new rope; ignored unless Idle
    pub fn start<E>(&mut self, env: &mut E) -> bool
    where
        E: RopeEnvironment + ?Sized,
    {
        if self.phase != RopePhase::Idle {
            log::debug!("Rope start ignored in {:?}", self.phase);
            return false;
        }
        self.chain.clear(env);
        self.detector.reset();
        env.set_opacity(FadeTarget::Rope, 1.0);
        self.phase = RopePhase::Generating;
        self.events.push(RopeEvent::Started);
        true
    }

    /// Drop the rope; only meaningful while Generating
    pub fn stop<E>(&mut self, env: &mut E)
    where
        E: RopeEnvironment + ?Sized,
    {
        if self.phase == RopePhase::Generating {
            self.abort(env, AbortReason::Released);
        }
    }

    /// Close the loop now with whatever rope exists (end of a scripted path)
    pub fn force_close<E>(&mut self, env: &mut E)
    where
        E: RopeEnvironment + ?Sized,
    {
        if self.phase == RopePhase::Generating {
            self.complete(env);
        }
    }

    /// Cancel whatever is going on and return to Idle
    ///
    /// Captured entities that still exist are made fully visible again;
    /// nothing is removed.
    pub fn reset<E>(&mut self, env: &mut E)
    where
        E: RopeEnvironment + ?Sized,
    {
        if let Some(capture) = self.capture.take() {
            for &id in &capture.captured {
                env.set_opacity(FadeTarget::Entity(id), 1.0);
            }
        }
        env.set_opacity(FadeTarget::Rope, 1.0);
        self.chain.clear(env);
        self.detector.reset();
        self.phase = RopePhase::Idle;
    }

    /// Advance the session by one tick
    pub fn tick<E>(&mut self, input: &RopeInput, env: &mut E, dt: f32)
    where
        E: RopeEnvironment + ?Sized,
    {
        if input.start {
            self.start(env);
        }
        if input.stop {
            self.stop(env);
        }

        match self.phase {
            RopePhase::Generating => {
                match self.chain.advance(input.controller, env) {
                    AdvanceOutcome::Spawned(index) => {
                        self.events.push(RopeEvent::LinkSpawned { index });
                    }
                    AdvanceOutcome::LimitReached => {
                        self.abort(env, AbortReason::SegmentLimit);
                        return;
                    }
                    AdvanceOutcome::Waiting => {}
                }
                self.chain.sync_positions(&*env);

                if self.detector.tick(dt, &self.chain.positions()).is_some() {
                    self.complete(env);
                }
            }
            RopePhase::Fading { .. } => {
                self.chain.sync_positions(&*env);
                self.advance_fade(env, dt);
            }
            RopePhase::Idle | RopePhase::Closing => {}
        }
    }

    /// Discard the rope without capturing anything
    fn abort<E>(&mut self, env: &mut E, reason: AbortReason)
    where
        E: RopeEnvironment + ?Sized,
    {
        let links = self.chain.len();
        log::info!("Rope dropped ({:?}) with {} links", reason, links);
        self.chain.clear(env);
        self.detector.reset();
        self.capture = None;
        self.phase = RopePhase::Idle;
        self.events.push(RopeEvent::Aborted { reason, links });
    }

    /// Loop completion: freeze, capture, snap, start the fade
    fn complete<E>(&mut self, env: &mut E)
    where
        E: RopeEnvironment + ?Sized,
    {
        self.phase = RopePhase::Closing;

        let polygon = self.chain.positions();
        let Some(capture) = compute_capture(&polygon, &*env, self.config.detection_layers) else {
            self.abort(env, AbortReason::TooShort);
            return;
        };

        let kicked = snap_outward(&self.chain, capture.centroid, self.config.impulse_magnitude, env);
        log::info!(
            "Loop closed: {} links, {} candidates, {} captured, {} links kicked",
            polygon.len(),
            capture.candidates,
            capture.captured.len(),
            kicked
        );

        self.events.push(RopeEvent::LoopClosed {
            centroid: capture.centroid,
            links: polygon.len(),
            candidates: capture.candidates,
        });
        self.capture = Some(capture);
        self.phase = RopePhase::Fading {
            delay_left: self.config.fade_delay,
            elapsed: 0.0,
        };
    }

    fn advance_fade<E>(&mut self, env: &mut E, dt: f32)
    where
        E: RopeEnvironment + ?Sized,
    {
        let RopePhase::Fading {
            mut delay_left,
            mut elapsed,
        } = self.phase
        else {
            return;
        };

        let mut dt = dt;
        if delay_left > 0.0 {
            delay_left -= dt;
            if delay_left > 0.0 {
                self.phase = RopePhase::Fading { delay_left, elapsed };
                return;
            }
            // Spend the part of this tick left over after the delay
            dt = -delay_left;
            delay_left = 0.0;
        }
        elapsed += dt;

        let alpha = fade_alpha(elapsed, self.config.fade_duration);
        env.set_opacity(FadeTarget::Rope, alpha);
        if let Some(capture) = &self.capture {
            for &id in &capture.captured {
                env.set_opacity(FadeTarget::Entity(id), alpha);
            }
        }

        if elapsed >= self.config.fade_duration {
            self.finish(env);
        } else {
            self.phase = RopePhase::Fading { delay_left, elapsed };
        }
    }

    /// Fade done: remove what was caught and destroy the rope
    fn finish<E>(&mut self, env: &mut E)
    where
        E: RopeEnvironment + ?Sized,
    {
        let captured = self.capture.take().map(|c| c.captured).unwrap_or_default();
        let ids: Vec<EntityId> = captured
            .into_iter()
            .filter(|&id| env.remove_entity(id))
            .collect();
        log::info!("Rope faded, removed {} entities", ids.len());

        self.chain.clear(env);
        self.detector.reset();
        self.phase = RopePhase::Idle;
        self.events.push(RopeEvent::Captured { ids });
    }
}
