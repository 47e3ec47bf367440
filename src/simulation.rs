//! The fixed-step run loop.
//!
//! Every tick runs the same sequence: attach finished assets, apply queued
//! input, advance physics by [`FIXED_DT`], copy body poses onto their
//! entities, update the camera and decorations, render, count the frame.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use glam::Vec3;
use tracing::{debug, info, trace, warn};

use crate::animation::Spin;
use crate::assets::{AssetEvent, AssetId, AssetKind, AssetPayload, AssetTracker};
use crate::clock::ClockState;
use crate::collision::BodyHandle;
use crate::dynamics::Pose;
use crate::host::FrameHost;
use crate::input::{InputMap, InputQueue, KeyAction};
use crate::render::Renderer;
use crate::scene::{Camera, CameraFollow, EntityId, EntityKind, RenderEntity, Rgba, SceneGraph, TextDesc};
use crate::sync::BindingSet;
use crate::world::World;

/// Physics step per tick, in seconds
pub const FIXED_DT: f32 = 1.0 / 60.0;

/// Shared running flag of a loop
#[derive(Debug, Clone)]
pub struct RunState {
    running: Arc<AtomicBool>,
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}

impl RunState {
    pub fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    /// A handle that can stop the loop from elsewhere
    pub fn handle(&self) -> StopHandle {
        StopHandle {
            running: Arc::clone(&self.running),
        }
    }
}

/// Stops a running loop after its current tick
#[derive(Debug, Clone)]
pub struct StopHandle {
    running: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }
}

/// The body keyboard input acts on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Controlled {
    pub body: BodyHandle,
    /// Pose restored by [`KeyAction::Reset`]
    pub initial: Pose,
}

/// Text label placed once its font arrives
#[derive(Debug, Clone, PartialEq)]
pub struct LabelSpec {
    pub text: String,
    pub position: Vec3,
    pub size: f32,
    pub color: Rgba,
}

/// What to add to the scene when an asset becomes ready
#[derive(Debug, Clone, PartialEq)]
pub enum Attachment {
    /// The model itself, as a root entity
    Model,
    /// A label drawn with the loaded font
    Label(LabelSpec),
}

/// Everything a tick reads and writes
pub struct SimulationContext {
    pub world: World,
    pub scene: SceneGraph,
    pub camera: Camera,
    pub bindings: BindingSet,
    pub spins: Vec<Spin>,
    pub follow: Option<CameraFollow>,
    pub input_map: InputMap,
    pub input: InputQueue,
    pub controlled: Option<Controlled>,
    pub clock: ClockState,
    pub assets: AssetTracker,
    pub fixed_dt: f32,
    attachments: HashMap<AssetId, Attachment>,
    attached: HashMap<AssetId, EntityId>,
}

impl SimulationContext {
    pub fn new(world: World, scene: SceneGraph, camera: Camera) -> Self {
        Self {
            world,
            scene,
            camera,
            bindings: BindingSet::new(),
            spins: Vec::new(),
            follow: None,
            input_map: InputMap::default(),
            input: InputQueue::default(),
            controlled: None,
            clock: ClockState::new(),
            assets: AssetTracker::new(),
            fixed_dt: FIXED_DT,
            attachments: HashMap::new(),
            attached: HashMap::new(),
        }
    }

    /// Registers an asset without loading it
    pub fn register_asset(
        &mut self,
        kind: AssetKind,
        path: impl Into<PathBuf>,
        required: bool,
        attachment: Attachment,
    ) -> AssetId {
        let id = self.assets.register(kind, path, required);
        self.attachments.insert(id, attachment);
        id
    }

    /// Registers an asset and starts its background load
    pub fn request_asset(
        &mut self,
        kind: AssetKind,
        path: impl Into<PathBuf>,
        required: bool,
        attachment: Attachment,
    ) -> AssetId {
        let id = self.assets.request(kind, path, required);
        self.attachments.insert(id, attachment);
        id
    }

    /// Entity created for a ready asset
    pub fn attached(&self, id: AssetId) -> Option<EntityId> {
        self.attached.get(&id).copied()
    }

    /// Drains finished loads and adds the ready ones to the scene
    pub fn attach_completed_assets(&mut self) -> usize {
        let mut count = 0;
        for event in self.assets.pump() {
            if self.on_asset_ready(event).is_some() {
                count += 1;
            }
        }
        count
    }

    fn on_asset_ready(&mut self, event: AssetEvent) -> Option<EntityId> {
        let AssetEvent { id, result } = event;
        let attachment = self.attachments.remove(&id)?;
        // Failures were already logged by the tracker
        let payload = result.ok()?;

        let entity = match (payload, attachment) {
            (AssetPayload::Model(model), Attachment::Model) => {
                let position = model.position();
                let scale = Vec3::splat(model.scale);
                let cast_shadow = model.cast_shadow;
                let name = model.name.clone();
                RenderEntity::new(name, EntityKind::Model(model))
                    .with_position(position)
                    .with_scale(scale)
                    .with_shadows(cast_shadow, false)
            }
            (AssetPayload::Font(font), Attachment::Label(label)) => RenderEntity::new(
                "label",
                EntityKind::Text(TextDesc {
                    text: label.text,
                    size: label.size,
                    color: label.color,
                    font,
                }),
            )
            .with_position(label.position)
            .with_shadows(true, false),
            (payload, attachment) => {
                warn!(?id, payload = ?payload_kind(&payload), ?attachment, "asset does not fit its attachment");
                return None;
            }
        };

        let name = entity.name.clone();
        let entity_id = self.scene.add(entity);
        self.attached.insert(id, entity_id);
        debug!(?id, entity = ?entity_id, %name, "asset attached");
        Some(entity_id)
    }
}

fn payload_kind(payload: &AssetPayload) -> AssetKind {
    match payload {
        AssetPayload::Model(_) => AssetKind::Model,
        AssetPayload::Font(_) => AssetKind::Font,
    }
}

/// Drives a [`SimulationContext`] and a [`Renderer`] one tick at a time
pub struct SimulationLoop<R> {
    context: SimulationContext,
    renderer: R,
    run_state: RunState,
    frames: u64,
}

impl<R: Renderer> SimulationLoop<R> {
    pub fn new(context: SimulationContext, renderer: R) -> Self {
        Self {
            context,
            renderer,
            run_state: RunState::new(),
            frames: 0,
        }
    }

    pub fn context(&self) -> &SimulationContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut SimulationContext {
        &mut self.context
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn run_state(&self) -> &RunState {
        &self.run_state
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.run_state.handle()
    }

    /// Ticks completed so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn into_parts(self) -> (SimulationContext, R) {
        (self.context, self.renderer)
    }

    /// Runs one tick at host time `now` (seconds)
    pub fn tick(&mut self, now: f64) {
        let delta = self.context.clock.sample(now);

        self.context.attach_completed_assets();
        self.apply_input();

        let ctx = &mut self.context;
        ctx.world.step(ctx.fixed_dt);
        ctx.bindings.sync(&ctx.world, &mut ctx.scene);

        if let Some(follow) = ctx.follow {
            follow.apply(&ctx.scene, &mut ctx.camera);
        }
        let elapsed = ctx.clock.elapsed;
        for spin in &ctx.spins {
            spin.apply(&mut ctx.scene, elapsed);
        }

        self.renderer.render(&ctx.scene, &ctx.camera);
        self.frames += 1;

        trace!(frame = self.frames, delta, contacts = ctx.world.contacts().len(), "tick");
    }

    fn apply_input(&mut self) {
        let ctx = &mut self.context;
        for key in ctx.input.drain() {
            let Some(action) = ctx.input_map.action(key) else {
                trace!(?key, "unbound key");
                continue;
            };
            debug!(?key, ?action, "input");

            match action {
                KeyAction::Quit => self.run_state.stop(),
                KeyAction::Nudge { .. } => {
                    if let (Some(controlled), Some(delta)) = (ctx.controlled, action.velocity_delta()) {
                        ctx.world.nudge_velocity(controlled.body, delta);
                    }
                }
                KeyAction::Reset => {
                    if let Some(controlled) = ctx.controlled {
                        ctx.world.reset_body(controlled.body, controlled.initial);
                    }
                }
            }
        }
    }

    /// Waits, a frame at a time, until every required asset is Ready or Failed.
    ///
    /// Each waiting frame renders the scene as it stands without stepping
    /// physics. Optional assets that finish meanwhile are attached too. Keys
    /// pressed while waiting are queued for the first tick, except Quit which
    /// stops the wait. Returns false if the loop was stopped before the
    /// barrier opened.
    pub async fn wait_for_assets<H: FrameHost>(&mut self, host: &mut H) -> bool {
        loop {
            self.context.attach_completed_assets();
            if self.context.assets.required_settled() {
                info!(assets = self.context.assets.len(), "required assets settled");
                return true;
            }

            for key in host.poll_keys() {
                if self.context.input_map.action(key) == Some(KeyAction::Quit) {
                    self.run_state.stop();
                } else {
                    self.context.input.push(key);
                }
            }
            if !self.run_state.is_running() {
                info!("stopped while waiting for assets");
                return false;
            }

            self.renderer.render(&self.context.scene, &self.context.camera);
            host.next_frame().await;
        }
    }

    /// Ticks once per host frame until stopped; returns the frame count
    pub async fn run<H: FrameHost>(&mut self, host: &mut H) -> u64 {
        info!(fixed_dt = self.context.fixed_dt, "simulation loop started");

        while self.run_state.is_running() {
            self.context.input.extend(host.poll_keys());
            self.tick(host.elapsed());
            host.next_frame().await;
        }

        info!(frames = self.frames, sim_time = self.context.world.time(), "simulation loop stopped");
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{AssetState, ModelDesc, ModelPart};
    use crate::error::AssetError;
    use crate::input::Key;
    use crate::scene::Geometry;
    use crate::testing::{ball_of, headless_loop, ScriptedHost};

    fn palm() -> ModelDesc {
        ModelDesc {
            name: "palm".to_string(),
            parts: vec![ModelPart {
                geometry: Geometry::Cylinder { radius: 0.3, height: 6.0 },
                offset: [0.0, 3.0, 0.0],
                color: Rgba::rgb(120, 80, 40),
            }],
            position: [8.0, 0.0, -6.0],
            scale: 1.0,
            cast_shadow: true,
        }
    }

    fn label() -> Attachment {
        Attachment::Label(LabelSpec {
            text: "Three JS".to_string(),
            position: Vec3::new(-10.0, 0.0, -12.0),
            size: 4.0,
            color: Rgba::rgb(0, 128, 0),
        })
    }

    #[test]
    fn test_tick_order_render_sees_stepped_pose() {
        let mut sim = headless_loop();
        let ball = ball_of(&sim);

        for n in 1..=120u64 {
            sim.tick(n as f64 / 60.0);

            let world = &sim.context().world;
            let frame = sim.renderer().last().copied().expect("rendered");
            assert_eq!(sim.frames(), n);
            assert_eq!(world.step_count(), n);
            assert_eq!(sim.renderer().frame_count(), n);
            // Render happens after step and sync
            assert_eq!(frame.tracked.map(|p| p.position), Some(world.body_position(ball)));
            // and after the camera follow
            let position = world.body_position(ball);
            assert_eq!(frame.camera_position.x, position.x);
            assert_eq!(frame.camera_position.y, position.y);
            assert_eq!(frame.camera_position.z, 22.0);
        }
    }

    #[test]
    fn test_pose_sync_is_exact() {
        let mut sim = headless_loop();
        let ball = ball_of(&sim);
        let entity = sim.context().bindings.entity_for(ball).expect("ball is bound");

        for n in 0..200 {
            sim.tick(f64::from(n) / 60.0);
            let ctx = sim.context();
            let pose = ctx.scene.pose(entity).expect("entity");
            assert_eq!(pose.position, ctx.world.body_position(ball));
            assert_eq!(pose.rotation, ctx.world.body_rotation(ball));
        }
    }

    #[test]
    fn test_drop_settles_on_ground() {
        let mut sim = headless_loop();
        let ball = ball_of(&sim);
        let mut lowest = f32::MAX;

        for n in 0..1200 {
            sim.tick(f64::from(n) / 60.0);
            lowest = lowest.min(sim.context().world.body_position(ball).y);
        }

        let body = sim.context().world.body(ball).expect("ball");
        assert!((body.position.y - 1.0).abs() < 0.02, "resting height {}", body.position.y);
        assert!(body.linear_velocity.length() < 0.05);
        assert!(lowest > 0.75, "sphere sank to {lowest}");
    }

    #[test]
    fn test_resting_ticks_are_idempotent() {
        let mut sim = headless_loop();
        let ball = ball_of(&sim);
        for n in 0..1500 {
            sim.tick(f64::from(n) / 60.0);
        }
        let before = sim.context().world.body_position(ball);

        for n in 1500..1560 {
            sim.tick(f64::from(n) / 60.0);
        }
        let after = sim.context().world.body_position(ball);

        assert!((after - before).length() < 1e-3, "drifted from {before} to {after}");
    }

    #[test]
    fn test_input_applies_on_next_tick() {
        let mut sim = headless_loop();
        let ball = ball_of(&sim);
        for n in 0..3 {
            sim.tick(f64::from(n) / 60.0);
        }

        // Arrives between tick 3 and tick 4
        sim.context_mut().input.push(Key::ArrowRight);
        let vx_before = sim.context().world.body(ball).map(|b| b.linear_velocity.x);
        assert_eq!(vx_before, Some(0.0));

        sim.tick(3.0 / 60.0);
        let vx = sim.context().world.body(ball).map(|b| b.linear_velocity.x).unwrap_or_default();
        // Nudge of 10 less a little linear damping over one step
        assert!(vx > 9.9 && vx <= 10.0, "vx = {vx}");
        assert!(sim.context().input.is_empty());
        assert!(sim.context().world.body_position(ball).x > 0.0);
    }

    #[test]
    fn test_repeated_nudges_accumulate() {
        let mut sim = headless_loop();
        let ball = ball_of(&sim);
        for n in 0..600 {
            sim.tick(f64::from(n) / 60.0);
        }

        sim.context_mut().input.extend([Key::ArrowRight; 12]);
        sim.tick(10.0);

        let vx = sim.context().world.body(ball).map(|b| b.linear_velocity.x).unwrap_or_default();
        assert!((vx - 120.0).abs() < 0.5, "vx = {vx}");
    }

    #[test]
    fn test_reset_restores_start() {
        let mut sim = headless_loop();
        let ball = ball_of(&sim);
        for n in 0..90 {
            sim.tick(f64::from(n) / 60.0);
        }
        assert!(sim.context().world.body_position(ball).y < 7.0);

        sim.context_mut().input.push(Key::R);
        sim.tick(1.5);

        // One step of free fall after the reset
        let body = sim.context().world.body(ball).expect("ball");
        assert!((body.position.y - 8.0).abs() < 0.01);
        assert!((body.linear_velocity.y + 9.82 / 60.0).abs() < 0.01);
    }

    #[test]
    fn test_quit_key_stops_run() {
        let mut sim = headless_loop();
        let mut host = ScriptedHost::new().with_keys(3, [Key::Escape]);

        let frames = pollster::block_on(sim.run(&mut host));

        assert_eq!(frames, 4);
        assert!(!sim.run_state().is_running());
        assert_eq!(sim.renderer().frame_count(), 4);
    }

    #[test]
    fn test_stop_handle_ends_run() {
        let mut sim = headless_loop();
        let mut host = ScriptedHost::new().stop_at(10, sim.stop_handle());

        let frames = pollster::block_on(sim.run(&mut host));

        assert_eq!(frames, 10);
        assert_eq!(sim.context().world.step_count(), 10);
        assert!((sim.context().clock.elapsed - 9.0 / 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_keeps_ticking_when_assets_never_load() {
        let mut sim = headless_loop();
        let model = sim
            .context_mut()
            .register_asset(AssetKind::Model, "never.ron", true, Attachment::Model);
        let entities = sim.context().scene.len();

        for n in 0..300 {
            sim.tick(f64::from(n) / 60.0);
        }

        assert_eq!(sim.frames(), 300);
        assert_eq!(sim.renderer().frame_count(), 300);
        assert_eq!(sim.context().assets.state(model), Some(AssetState::Loading));
        assert_eq!(sim.context().scene.len(), entities);
    }

    #[test]
    fn test_barrier_waits_for_required_asset() {
        let mut sim = headless_loop();
        let model = sim
            .context_mut()
            .register_asset(AssetKind::Model, "palm.ron", true, Attachment::Model);
        let font = sim
            .context_mut()
            .register_asset(AssetKind::Font, "label.ttf", false, label());
        let sender = sim.context().assets.sender();

        let mut host = ScriptedHost::new().deliver_at(
            5,
            sender,
            AssetEvent {
                id: model,
                result: Ok(AssetPayload::Model(palm())),
            },
        );

        assert!(pollster::block_on(sim.wait_for_assets(&mut host)));

        assert_eq!(host.frames(), 5);
        assert_eq!(sim.frames(), 0);
        // Waiting frames draw the partial scene but never step physics
        assert_eq!(sim.renderer().frame_count(), 5);
        assert_eq!(sim.context().world.step_count(), 0);
        let start = sim.renderer().last().and_then(|f| f.tracked).map(|p| p.position);
        assert_eq!(start, Some(Vec3::new(0.0, 8.0, 0.0)));
        let entity = sim.context().attached(model).expect("model attached");
        assert_eq!(sim.context().scene.get(entity).map(|e| e.name.as_str()), Some("palm"));
        assert_eq!(
            sim.context().scene.pose(entity).map(|p| p.position),
            Some(Vec3::new(8.0, 0.0, -6.0))
        );
        // The optional font is still outstanding and did not hold the loop
        assert_eq!(sim.context().attached(font), None);
    }

    #[test]
    fn test_optional_asset_attaches_mid_run() {
        let mut sim = headless_loop();
        let font = sim
            .context_mut()
            .register_asset(AssetKind::Font, "label.ttf", false, label());
        let sender = sim.context().assets.sender();

        sim.tick(0.0);
        let visible = sim.renderer().last().map(|f| f.visible_entities).unwrap_or_default();

        sender
            .send(AssetEvent {
                id: font,
                result: Ok(AssetPayload::Font(vec![0, 1, 0, 0])),
            })
            .expect("send");
        sim.tick(1.0 / 60.0);

        let entity = sim.context().attached(font).expect("label attached");
        assert!(matches!(
            sim.context().scene.get(entity).map(|e| &e.kind),
            Some(EntityKind::Text(TextDesc { size, .. })) if *size == 4.0
        ));
        // Attached before the render of the same tick
        assert_eq!(sim.renderer().last().map(|f| f.visible_entities), Some(visible + 1));
    }

    #[test]
    fn test_failed_required_asset_opens_barrier() {
        let mut sim = headless_loop();
        let model = sim
            .context_mut()
            .register_asset(AssetKind::Model, "palm.ron", true, Attachment::Model);
        let entities = sim.context().scene.len();
        sim.context()
            .assets
            .sender()
            .send(AssetEvent {
                id: model,
                result: Err(AssetError::Parse {
                    path: "palm.ron".into(),
                    message: "broken".to_string(),
                }),
            })
            .expect("send");

        let mut host = ScriptedHost::new();
        assert!(pollster::block_on(sim.wait_for_assets(&mut host)));
        assert_eq!(host.frames(), 0);

        for n in 0..10 {
            sim.tick(f64::from(n) / 60.0);
        }
        assert_eq!(sim.context().attached(model), None);
        assert_eq!(sim.context().scene.len(), entities);
        assert_eq!(sim.frames(), 10);
    }

    #[test]
    fn test_quit_while_waiting() {
        let mut sim = headless_loop();
        sim.context_mut()
            .register_asset(AssetKind::Model, "never.ron", true, Attachment::Model);
        let mut host = ScriptedHost::new().with_keys(2, [Key::ArrowUp, Key::Escape]);

        assert!(!pollster::block_on(sim.wait_for_assets(&mut host)));
        assert_eq!(host.frames(), 2);
        assert_eq!(sim.renderer().frame_count(), 2);
        // Non-quit keys wait for the first tick
        assert_eq!(sim.context().input.len(), 1);
    }

    #[test]
    fn test_mismatched_payload_ignored() {
        let mut sim = headless_loop();
        let id = sim
            .context_mut()
            .register_asset(AssetKind::Font, "label.ttf", false, label());
        sim.context()
            .assets
            .sender()
            .send(AssetEvent {
                id,
                result: Ok(AssetPayload::Model(palm())),
            })
            .expect("send");

        assert_eq!(sim.context_mut().attach_completed_assets(), 0);
        assert_eq!(sim.context().attached(id), None);
    }
}
