//! Headless run of the bouncing-sphere scene
//!
//! Drops the sphere from 8 m and prints its height every half second while the
//! loop ticks against a simulated 60 Hz clock.
//!
//! Run with: cargo run --example basic_simulation

use std::future::{self, Future};

use bounce::config::{AssetsConfig, SceneConfig};
use bounce::host::FrameHost;
use bounce::input::Key;
use bounce::logging;
use bounce::prelude::*;

const SECONDS: u64 = 6;

/// 60 Hz clock that ends the run after a fixed number of frames
struct FixedRateHost {
    frames: u64,
    stop_after: u64,
    stop: StopHandle,
}

impl FrameHost for FixedRateHost {
    fn elapsed(&self) -> f64 {
        self.frames as f64 / 60.0
    }

    fn poll_keys(&mut self) -> Vec<Key> {
        // Push the sphere sideways once it has settled
        if self.frames == 60 * 4 {
            vec![Key::ArrowRight]
        } else {
            Vec::new()
        }
    }

    fn next_frame(&mut self) -> impl Future<Output = ()> {
        self.frames += 1;
        if self.frames >= self.stop_after {
            self.stop.stop();
        }
        future::ready(())
    }
}

fn main() {
    logging::init();

    println!("Bounce - Headless Simulation");
    println!("============================\n");

    let config = SceneConfig {
        assets: AssetsConfig {
            model: None,
            font: None,
            ..AssetsConfig::default()
        },
        ..SceneConfig::default()
    };
    let context = match build_scene(&config) {
        Ok(context) => context,
        Err(err) => {
            eprintln!("could not build scene: {err}");
            return;
        }
    };
    let Some(ball) = context.controlled.map(|c| c.body) else {
        eprintln!("scene has no controlled body");
        return;
    };
    let Some(entity) = context.bindings.entity_for(ball) else {
        eprintln!("sphere is not bound to an entity");
        return;
    };

    let mut sim = SimulationLoop::new(context, FrameRecorder::tracking(entity));
    let mut host = FixedRateHost {
        frames: 0,
        stop_after: SECONDS * 60,
        stop: sim.stop_handle(),
    };

    let frames = pollster::block_on(sim.run(&mut host));

    for frame in sim.renderer().frames().iter().step_by(30) {
        if let Some(pose) = frame.tracked {
            println!(
                "t={:.2}s: position=({:.3}, {:.3}, {:.3})",
                (frame.frame + 1) as f32 * FIXED_DT,
                pose.position.x,
                pose.position.y,
                pose.position.z
            );
        }
    }

    let world = &sim.context().world;
    let position = world.body_position(ball);
    println!("\n{frames} frames, {:.2}s simulated", world.time());
    println!("Final sphere position: ({:.3}, {:.3}, {:.3})", position.x, position.y, position.z);
    println!("Expected resting height: ~1.0 (sphere radius)");
}
