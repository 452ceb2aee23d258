//! Periodic self-intersection scan
//!
//! Approximates "the rope crossed itself" by vertex proximity: two links at
//! least two apart in the chain that come within the threshold close the
//! loop. Link spacing is small and uniform, so this stands in for a proper
//! segment-segment test.

use glam::Vec2;

/// Links closer than this in index are hinged neighbours and never count
pub const ADJACENCY_SKIP: usize = 2;

/// A detected closure
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Closure {
    /// Earlier link of the pair
    pub first: usize,
    /// Later link of the pair (always `>= first + 2`)
    pub second: usize,
    /// Midpoint of the two links
    pub point: Vec2,
}

/// Scan positions for the first pair `(i, j)`, `j >= i + 2`, closer than
/// `threshold`. First match in `(i, j)` order wins, not the closest.
pub fn find_closure(points: &[Vec2], threshold: f32) -> Option<Closure> {
    let threshold_sq = threshold * threshold;
    for i in 0..points.len() {
        for j in (i + ADJACENCY_SKIP)..points.len() {
            if points[i].distance_squared(points[j]) < threshold_sq {
                return Some(Closure {
                    first: i,
                    second: j,
                    point: (points[i] + points[j]) * 0.5,
                });
            }
        }
    }
    None
}

/// Runs [`find_closure`] on a fixed interval
#[derive(Debug, Clone)]
pub struct IntersectionDetector {
    interval: f32,
    threshold: f32,
    timer: f32,
    last: Option<Closure>,
}

impl IntersectionDetector {
    pub fn new(interval: f32, threshold: f32) -> Self {
        Self {
            interval,
            threshold,
            timer: 0.0,
            last: None,
        }
    }

    /// Accumulate `dt`; scan once the interval has elapsed
    ///
    /// Returns the closure found by this tick's scan. Ticks that don't scan
    /// return `None` and leave the last result alone.
    pub fn tick(&mut self, dt: f32, points: &[Vec2]) -> Option<Closure> {
        self.timer += dt;
        if self.timer < self.interval {
            return None;
        }
        self.timer = 0.0;

        self.last = find_closure(points, self.threshold);
        if let Some(closure) = self.last {
            log::debug!(
                "Rope closure between links {} and {} at ({:.2}, {:.2})",
                closure.first,
                closure.second,
                closure.point.x,
                closure.point.y
            );
        }
        self.last
    }

    /// Result of the most recent scan
    pub fn last_closure(&self) -> Option<Closure> {
        self.last
    }

    pub fn reset(&mut self) {
        self.timer = 0.0;
        self.last = None;
    }
}
