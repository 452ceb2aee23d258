//! Scripted rope-layer
//!
//! An NPC walks a fixed list of waypoints after a start delay, dragging a
//! rope. Reaching the last waypoint closes the loop even if the detector
//! hasn't seen the rope cross itself.

use glam::Vec2;

use super::session::{RopeInput, RopeSession};
use super::services::RopeEnvironment;
use crate::consts::{NPC_MOVE_SPEED, NPC_START_DELAY, WAYPOINT_EPSILON};
use crate::move_towards;

/// What the follower did this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSignal {
    /// Still counting down the start delay
    Waiting,
    /// First tick of movement
    Started,
    Moving,
    /// Last waypoint reached this tick
    Finished,
    /// Already finished earlier
    Done,
}

/// Walks a waypoint list at constant speed
#[derive(Debug, Clone)]
pub struct PathFollower {
    waypoints: Vec<Vec2>,
    current: usize,
    pos: Vec2,
    move_speed: f32,
    delay_left: f32,
    started: bool,
    finished: bool,
}

impl PathFollower {
    /// Starts standing on the first waypoint
    pub fn new(waypoints: Vec<Vec2>, move_speed: f32, start_delay: f32) -> Self {
        let pos = waypoints.first().copied().unwrap_or(Vec2::ZERO);
        Self {
            waypoints,
            current: 0,
            pos,
            move_speed,
            delay_left: start_delay,
            started: false,
            finished: false,
        }
    }

    /// Follower with the stock NPC speed and start delay
    pub fn with_defaults(waypoints: Vec<Vec2>) -> Self {
        Self::new(waypoints, NPC_MOVE_SPEED, NPC_START_DELAY)
    }

    pub fn position(&self) -> Vec2 {
        self.pos
    }

    /// Index of the waypoint being walked to
    pub fn current_waypoint(&self) -> usize {
        self.current
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn tick(&mut self, dt: f32) -> PathSignal {
        if self.finished {
            return PathSignal::Done;
        }

        self.delay_left -= dt;
        if self.delay_left > 0.0 {
            return PathSignal::Waiting;
        }

        let Some(&target) = self.waypoints.get(self.current) else {
            self.finished = true;
            return PathSignal::Finished;
        };

        let first = !self.started;
        self.started = true;
        self.pos = move_towards(self.pos, target, self.move_speed * dt);
        if self.pos.distance(target) < WAYPOINT_EPSILON {
            self.current += 1;
        }

        if first { PathSignal::Started } else { PathSignal::Moving }
    }
}

/// An NPC that lays a rope along its path and closes it at the end
#[derive(Debug, Clone)]
pub struct ScriptedRoper {
    pub follower: PathFollower,
    pub session: RopeSession,
}

impl ScriptedRoper {
    pub fn new(follower: PathFollower, session: RopeSession) -> Self {
        Self { follower, session }
    }

    pub fn tick<E>(&mut self, env: &mut E, dt: f32) -> PathSignal
    where
        E: RopeEnvironment + ?Sized,
    {
        let signal = self.follower.tick(dt);
        let input = RopeInput {
            controller: self.follower.position(),
            start: signal == PathSignal::Started,
            stop: false,
        };

        match signal {
            PathSignal::Finished => {
                log::info!("Scripted path finished, closing rope");
                self.session.force_close(env);
                self.session.tick(&input, env, dt);
            }
            PathSignal::Waiting => {}
            _ => self.session.tick(&input, env, dt),
        }
        signal
    }
}
