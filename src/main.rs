//! Windowed bouncing-sphere scene.
//!
//! Reads `bounce.toml` from the working directory when present.
//! Arrow keys push the sphere, R resets it, Escape quits.

use bounce::config::{SceneConfig, DEFAULT_CONFIG_FILE};
use bounce::host::MacroquadHost;
use bounce::logging;
use bounce::render::MacroquadRenderer;
use bounce::setup::build_scene;
use bounce::simulation::SimulationLoop;
use macroquad::prelude::*;
use tracing::{error, info};

fn window_conf() -> Conf {
    Conf {
        window_title: "Bounce".to_owned(),
        window_width: 1280,
        window_height: 720,
        high_dpi: true,
        sample_count: 4,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    logging::init();

    let config = match SceneConfig::load_or_default(DEFAULT_CONFIG_FILE) {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, file = DEFAULT_CONFIG_FILE, "invalid configuration");
            return;
        }
    };

    let context = match build_scene(&config) {
        Ok(context) => context,
        Err(err) => {
            error!(error = %err, "could not build scene");
            return;
        }
    };

    let mut host = MacroquadHost;
    let mut sim = SimulationLoop::new(context, MacroquadRenderer::new());

    if !sim.wait_for_assets(&mut host).await {
        return;
    }
    let frames = sim.run(&mut host).await;
    info!(frames, "bye");
}
