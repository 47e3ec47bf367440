//! Test doubles for driving the run loop without a window.

use std::collections::BTreeMap;
use std::future::{self, Future};

use crossbeam_channel::Sender;

use crate::assets::AssetEvent;
use crate::collision::BodyHandle;
use crate::config::{AssetsConfig, SceneConfig};
use crate::host::FrameHost;
use crate::input::Key;
use crate::render::{FrameRecorder, Renderer};
use crate::setup::build_scene;
use crate::simulation::{SimulationLoop, StopHandle};

/// A host with a fake 60 Hz clock and scripted keys and asset completions.
///
/// Schedules are keyed by frame index: keys for frame `n` are returned by the
/// `poll_keys` call made while `frames() == n`; deliveries and stops for
/// frame `n` happen as `next_frame` advances to `n`.
#[derive(Default)]
pub struct ScriptedHost {
    frames: u64,
    keys: BTreeMap<u64, Vec<Key>>,
    deliveries: BTreeMap<u64, Vec<(Sender<AssetEvent>, AssetEvent)>>,
    stop: Option<(u64, StopHandle)>,
}

impl ScriptedHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keys(mut self, frame: u64, keys: impl IntoIterator<Item = Key>) -> Self {
        self.keys.entry(frame).or_default().extend(keys);
        self
    }

    pub fn deliver_at(mut self, frame: u64, sender: Sender<AssetEvent>, event: AssetEvent) -> Self {
        self.deliveries.entry(frame).or_default().push((sender, event));
        self
    }

    pub fn stop_at(mut self, frame: u64, handle: StopHandle) -> Self {
        self.stop = Some((frame, handle));
        self
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl FrameHost for ScriptedHost {
    fn elapsed(&self) -> f64 {
        self.frames as f64 / 60.0
    }

    fn poll_keys(&mut self) -> Vec<Key> {
        self.keys.remove(&self.frames).unwrap_or_default()
    }

    fn next_frame(&mut self) -> impl Future<Output = ()> {
        self.frames += 1;

        for (sender, event) in self.deliveries.remove(&self.frames).unwrap_or_default() {
            sender.send(event).expect("tracker alive");
        }
        if let Some((frame, handle)) = &self.stop {
            if *frame == self.frames {
                handle.stop();
            }
        }

        future::ready(())
    }
}

/// Default scene without file assets, rendered into a recorder that tracks
/// the sphere
pub fn headless_loop() -> SimulationLoop<FrameRecorder> {
    let config = SceneConfig {
        assets: AssetsConfig {
            model: None,
            font: None,
            ..AssetsConfig::default()
        },
        ..SceneConfig::default()
    };
    let ctx = build_scene(&config).expect("default scene builds");
    let ball = ctx.controlled.expect("sphere is controlled").body;
    let entity = ctx.bindings.entity_for(ball).expect("sphere is bound");
    SimulationLoop::new(ctx, FrameRecorder::tracking(entity))
}

/// The controlled sphere's body
pub fn ball_of<R: Renderer>(sim: &SimulationLoop<R>) -> BodyHandle {
    sim.context().controlled.expect("sphere is controlled").body
}
