//! Lasso Herd entry point
//!
//! Headless demo: an NPC walks a square around part of the herd, its rope
//! closes, and the captured herdables fade out. Pass a JSON config path as the
//! first argument to override tuning.

use glam::Vec2;

use lasso_herd::consts::*;
use lasso_herd::game::{GameDirector, LevelTransition, LogAudio};
use lasso_herd::sim::{HerdWorld, LayerMask, PathFollower, RopeSession, ScriptedRoper};
use lasso_herd::GameConfig;

/// Demo runs at most this long (seconds of simulated time)
const DEMO_SECONDS: f32 = 30.0;

struct LogLevelTransition;

impl LevelTransition for LogLevelTransition {
    fn load_next_level(&mut self) {
        log::info!("Level complete, loading next level");
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Lasso Herd (headless demo) starting...");

    let config = match std::env::args().nth(1) {
        Some(path) => GameConfig::load(std::path::Path::new(&path)),
        None => GameConfig::default(),
    };

    let mut world = HerdWorld::new(config.herd.clone(), config.seed);
    for pos in [Vec2::new(1.5, 1.5), Vec2::new(2.5, 2.0), Vec2::new(2.0, 2.8)] {
        world.spawn_herdable(pos);
    }
    let stray = world.spawn_herdable(Vec2::new(12.0, 12.0));

    let waypoints = vec![
        Vec2::new(0.0, 0.0),
        Vec2::new(4.0, 0.0),
        Vec2::new(4.0, 4.0),
        Vec2::new(0.0, 4.0),
        Vec2::new(0.0, 0.4),
    ];
    let follower = PathFollower::new(waypoints, NPC_MOVE_SPEED * 2.0, 0.5);
    let mut npc = ScriptedRoper::new(follower, RopeSession::new(config.rope.clone()));
    let herder = world.spawn_marker(npc.follower.position(), LayerMask::HERDER);

    let mut director = GameDirector::new(Box::new(LogAudio), Box::new(LogLevelTransition));

    let ticks = (DEMO_SECONDS / SIM_DT) as u32;
    for tick in 0..ticks {
        npc.tick(&mut world, SIM_DT);
        world.move_marker(herder, npc.follower.position());
        world.step(SIM_DT);

        let events = npc.session.drain_events();
        director.handle_events(&events, world.counter());

        if npc.follower.is_finished() && npc.session.phase() == lasso_herd::sim::RopePhase::Idle {
            log::info!("Rope sequence done after {:.2}s", tick as f32 * SIM_DT);
            break;
        }
    }

    log::info!(
        "Captured {} herdables in {} loops, {} left (stray {})",
        director.captured_total,
        director.loops_closed,
        world.counter().count(),
        if world.herdable(stray).is_some() { "still roaming" } else { "caught" }
    );
}
