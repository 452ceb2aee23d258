//! Level flow
//!
//! Turns rope events into sound cues and decides when the level is won.
//! Audio and level loading are services handed in at construction; nothing
//! here reaches for a global.

use crate::sim::{HerdCounter, RopeEvent};

/// Sound cue types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    /// A rope link was laid
    RopeStretch,
    /// Loop closed and the rope snapped outward
    RopeSnap,
    /// Captured herdables vanished
    Capture,
    /// Rope dropped without a catch
    RopeDrop,
    /// Herd fully captured
    LevelComplete,
}

/// Plays sound cues
pub trait AudioSink {
    fn play(&mut self, cue: SoundCue);
}

/// Moves on to the next level
pub trait LevelTransition {
    fn load_next_level(&mut self);
}

/// Audio sink that only logs (headless runs)
#[derive(Debug, Default)]
pub struct LogAudio;

impl AudioSink for LogAudio {
    fn play(&mut self, cue: SoundCue) {
        log::debug!("Sound: {:?}", cue);
    }
}

/// Level-flow bookkeeping for one level
pub struct GameDirector {
    audio: Box<dyn AudioSink>,
    level: Box<dyn LevelTransition>,
    /// Loops closed this level
    pub loops_closed: u32,
    /// Herdables removed this level
    pub captured_total: usize,
    level_complete: bool,
}

impl GameDirector {
    pub fn new(audio: Box<dyn AudioSink>, level: Box<dyn LevelTransition>) -> Self {
        Self {
            audio,
            level,
            loops_closed: 0,
            captured_total: 0,
            level_complete: false,
        }
    }

    pub fn is_level_complete(&self) -> bool {
        self.level_complete
    }

    /// React to a batch of rope events, then check the win condition
    pub fn handle_events(&mut self, events: &[RopeEvent], herd: &HerdCounter) {
        for event in events {
            match event {
                RopeEvent::LinkSpawned { .. } => self.audio.play(SoundCue::RopeStretch),
                RopeEvent::LoopClosed { .. } => {
                    self.loops_closed += 1;
                    self.audio.play(SoundCue::RopeSnap);
                }
                RopeEvent::Captured { ids } => {
                    self.captured_total += ids.len();
                    if !ids.is_empty() {
                        self.audio.play(SoundCue::Capture);
                    }
                }
                RopeEvent::Aborted { .. } => self.audio.play(SoundCue::RopeDrop),
                RopeEvent::Started => {}
            }
        }

        if herd.is_cleared() && !self.level_complete {
            self.level_complete = true;
            log::info!(
                "Herd cleared: {} captured in {} loops",
                self.captured_total,
                self.loops_closed
            );
            self.audio.play(SoundCue::LevelComplete);
            self.level.load_next_level();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct Recorder {
        cues: Rc<RefCell<Vec<SoundCue>>>,
        loads: Rc<RefCell<u32>>,
    }

    impl AudioSink for Recorder {
        fn play(&mut self, cue: SoundCue) {
            self.cues.borrow_mut().push(cue);
        }
    }

    impl LevelTransition for Recorder {
        fn load_next_level(&mut self) {
            *self.loads.borrow_mut() += 1;
        }
    }

    fn director() -> (GameDirector, Recorder) {
        let rec = Recorder::default();
        let director = GameDirector::new(Box::new(rec.clone()), Box::new(rec.clone()));
        (director, rec)
    }

    #[test]
    fn test_events_map_to_cues() {
        let (mut director, rec) = director();
        let mut herd = HerdCounter::default();
        herd.register();

        director.handle_events(
            &[
                RopeEvent::Started,
                RopeEvent::LinkSpawned { index: 0 },
                RopeEvent::LoopClosed {
                    centroid: glam::Vec2::ZERO,
                    links: 8,
                    candidates: 0,
                },
                RopeEvent::Captured { ids: vec![] },
            ],
            &herd,
        );
        assert_eq!(
            *rec.cues.borrow(),
            vec![SoundCue::RopeStretch, SoundCue::RopeSnap]
        );
        assert_eq!(director.loops_closed, 1);
        assert!(!director.is_level_complete());
    }

    #[test]
    fn test_level_transition_fires_once() {
        let (mut director, rec) = director();
        let mut herd = HerdCounter::default();
        herd.register();
        herd.unregister();

        director.handle_events(&[RopeEvent::Captured { ids: vec![1] }], &herd);
        director.handle_events(&[], &herd);
        assert!(director.is_level_complete());
        assert_eq!(*rec.loads.borrow(), 1);
        assert_eq!(director.captured_total, 1);
        assert_eq!(rec.cues.borrow().last(), Some(&SoundCue::LevelComplete));
    }
}
