use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::input::{Axis, Key, KeyAction, KeyBinding};

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "bounce.toml";

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_fixed_dt() -> f32 {
    1.0 / 60.0
}
const fn default_gravity() -> [f32; 3] {
    [0.0, -9.82, 0.0]
}
const fn default_solver_iterations() -> usize {
    7
}
const fn default_solver_tolerance() -> f32 {
    0.1
}
const fn default_contact_stiffness() -> f32 {
    1e9
}
const fn default_contact_relaxation() -> f32 {
    4.0
}
const fn default_restitution_threshold() -> f32 {
    0.5
}
fn default_ground_material() -> String {
    "concrete".into()
}
fn default_ball_material() -> String {
    "plastic".into()
}
const fn default_friction() -> f32 {
    0.1
}
const fn default_restitution() -> f32 {
    0.6
}
const fn default_radius() -> f32 {
    1.0
}
const fn default_mass() -> f32 {
    1.0
}
const fn default_start() -> [f32; 3] {
    [0.0, 8.0, 0.0]
}
const fn default_sphere_color() -> [u8; 4] {
    [255, 139, 18, 255]
}
const fn default_camera_position() -> [f32; 3] {
    [0.0, 3.0, 22.0]
}
const fn default_pitch() -> f32 {
    -0.3
}
const fn default_fov_y() -> f32 {
    75.0
}
const fn default_near() -> f32 {
    0.1
}
const fn default_far() -> f32 {
    10000.0
}
const fn default_true() -> bool {
    true
}
const fn default_spin_rate() -> f32 {
    -0.1
}
const fn default_background() -> [u8; 4] {
    [106, 193, 222, 255]
}
const fn default_fog_near() -> f32 {
    100.0
}
const fn default_fog_far() -> f32 {
    1000.0
}
const fn default_floor_size() -> [f32; 2] {
    [2000.0, 100.0]
}
fn default_model() -> Option<AssetSpec> {
    Some(AssetSpec {
        path: PathBuf::from("assets/models/palmtree.ron"),
        required: true,
    })
}
fn default_font() -> Option<AssetSpec> {
    Some(AssetSpec {
        path: PathBuf::from("assets/fonts/label.ttf"),
        required: false,
    })
}
fn default_label() -> String {
    "Three JS".into()
}
const fn default_label_position() -> [f32; 3] {
    [-10.0, 0.0, -12.0]
}
const fn default_nudge() -> f32 {
    10.0
}

// ---------------------------------------------------------------------------
// SceneConfig
// ---------------------------------------------------------------------------

/// Complete scene configuration; every field has a default so an empty
/// file is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SceneConfig {
    #[serde(default)]
    pub physics: PhysicsConfig,
    #[serde(default)]
    pub materials: MaterialsConfig,
    #[serde(default)]
    pub sphere: SphereConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub decor: DecorConfig,
    #[serde(default)]
    pub assets: AssetsConfig,
    #[serde(default)]
    pub input: InputConfig,
}

/// World and solver parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsConfig {
    /// Seconds advanced per tick, independent of wall-clock time.
    #[serde(default = "default_fixed_dt")]
    pub fixed_dt: f32,
    #[serde(default = "default_gravity")]
    pub gravity: [f32; 3],
    #[serde(default = "default_solver_iterations")]
    pub solver_iterations: usize,
    #[serde(default = "default_solver_tolerance")]
    pub solver_tolerance: f32,
    /// Default contact material stiffness
    #[serde(default = "default_contact_stiffness")]
    pub contact_stiffness: f32,
    /// Default contact material relaxation (steps)
    #[serde(default = "default_contact_relaxation")]
    pub contact_relaxation: f32,
    #[serde(default = "default_restitution_threshold")]
    pub restitution_threshold: f32,
    #[serde(default)]
    pub allow_sleep: bool,
    #[serde(default)]
    pub quat_normalize_skip: u32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            fixed_dt: default_fixed_dt(),
            gravity: default_gravity(),
            solver_iterations: default_solver_iterations(),
            solver_tolerance: default_solver_tolerance(),
            contact_stiffness: default_contact_stiffness(),
            contact_relaxation: default_contact_relaxation(),
            restitution_threshold: default_restitution_threshold(),
            allow_sleep: false,
            quat_normalize_skip: 0,
        }
    }
}

impl PhysicsConfig {
    pub fn gravity(&self) -> Vec3 {
        Vec3::from_array(self.gravity)
    }
}

/// Ground/ball materials and their contact parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialsConfig {
    #[serde(default = "default_ground_material")]
    pub ground: String,
    #[serde(default = "default_ball_material")]
    pub ball: String,
    #[serde(default = "default_friction")]
    pub friction: f32,
    #[serde(default = "default_restitution")]
    pub restitution: f32,
}

impl Default for MaterialsConfig {
    fn default() -> Self {
        Self {
            ground: default_ground_material(),
            ball: default_ball_material(),
            friction: default_friction(),
            restitution: default_restitution(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SphereConfig {
    #[serde(default = "default_radius")]
    pub radius: f32,
    #[serde(default = "default_mass")]
    pub mass: f32,
    #[serde(default = "default_start")]
    pub start: [f32; 3],
    #[serde(default = "default_sphere_color")]
    pub color: [u8; 4],
}

impl Default for SphereConfig {
    fn default() -> Self {
        Self {
            radius: default_radius(),
            mass: default_mass(),
            start: default_start(),
            color: default_sphere_color(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    #[serde(default = "default_camera_position")]
    pub position: [f32; 3],
    /// Rotation about X in radians (negative looks down)
    #[serde(default = "default_pitch")]
    pub pitch: f32,
    /// Vertical field of view in degrees
    #[serde(default = "default_fov_y")]
    pub fov_y: f32,
    #[serde(default = "default_near")]
    pub near: f32,
    #[serde(default = "default_far")]
    pub far: f32,
    /// Track the sphere's X/Y every tick
    #[serde(default = "default_true")]
    pub follow: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: default_camera_position(),
            pitch: default_pitch(),
            fov_y: default_fov_y(),
            near: default_near(),
            far: default_far(),
            follow: true,
        }
    }
}

/// Purely visual settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecorConfig {
    /// Sun and sun-light spin about Z, radians per second
    #[serde(default = "default_spin_rate")]
    pub sun_spin_rate: f32,
    #[serde(default = "default_background")]
    pub background: [u8; 4],
    #[serde(default = "default_fog_near")]
    pub fog_near: f32,
    #[serde(default = "default_fog_far")]
    pub fog_far: f32,
    #[serde(default = "default_floor_size")]
    pub floor_size: [f32; 2],
}

impl Default for DecorConfig {
    fn default() -> Self {
        Self {
            sun_spin_rate: default_spin_rate(),
            background: default_background(),
            fog_near: default_fog_near(),
            fog_far: default_fog_far(),
            floor_size: default_floor_size(),
        }
    }
}

/// A file to load asynchronously.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetSpec {
    pub path: PathBuf,
    /// The loop does not start until required assets settle
    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetsConfig {
    #[serde(default = "default_model")]
    pub model: Option<AssetSpec>,
    #[serde(default = "default_font")]
    pub font: Option<AssetSpec>,
    #[serde(default = "default_label")]
    pub label: String,
    #[serde(default = "default_label_position")]
    pub label_position: [f32; 3],
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            font: default_font(),
            label: default_label(),
            label_position: default_label_position(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    /// Velocity change applied by the default arrow-key bindings
    #[serde(default = "default_nudge")]
    pub nudge: f32,
    /// Replaces the default bindings when non-empty
    #[serde(default)]
    pub bindings: Vec<KeyBinding>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            nudge: default_nudge(),
            bindings: Vec::new(),
        }
    }
}

impl InputConfig {
    /// Effective bindings: the configured list, or the arrow-key defaults
    pub fn effective_bindings(&self) -> Vec<KeyBinding> {
        if !self.bindings.is_empty() {
            return self.bindings.clone();
        }

        vec![
            KeyBinding::new(Key::ArrowRight, KeyAction::Nudge { axis: Axis::X, delta: self.nudge }),
            KeyBinding::new(Key::ArrowLeft, KeyAction::Nudge { axis: Axis::X, delta: -self.nudge }),
            KeyBinding::new(Key::ArrowUp, KeyAction::Nudge { axis: Axis::Y, delta: self.nudge }),
            KeyBinding::new(Key::R, KeyAction::Reset),
            KeyBinding::new(Key::Escape, KeyAction::Quit),
        ]
    }
}

impl SceneConfig {
    /// Reads and validates a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    /// Loads `path` if it exists, otherwise returns the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parses and validates a TOML string.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let physics = &self.physics;
        if !(physics.fixed_dt > 0.0 && physics.fixed_dt.is_finite()) {
            return Err(ConfigError::InvalidFixedDt(physics.fixed_dt));
        }
        if physics.solver_iterations == 0 {
            return Err(ConfigError::invalid("physics.solver_iterations", "must be >= 1"));
        }
        if physics.solver_tolerance < 0.0 {
            return Err(ConfigError::invalid("physics.solver_tolerance", "must be >= 0"));
        }
        if physics.contact_stiffness <= 0.0 {
            return Err(ConfigError::invalid("physics.contact_stiffness", "must be > 0"));
        }
        if physics.contact_relaxation <= 0.0 {
            return Err(ConfigError::invalid("physics.contact_relaxation", "must be > 0"));
        }

        let materials = &self.materials;
        if !(0.0..=1.0).contains(&materials.friction) {
            return Err(ConfigError::invalid("materials.friction", "must be in [0, 1]"));
        }
        if !(0.0..=1.0).contains(&materials.restitution) {
            return Err(ConfigError::invalid("materials.restitution", "must be in [0, 1]"));
        }
        if materials.ground == materials.ball {
            return Err(ConfigError::invalid("materials.ball", "must differ from materials.ground"));
        }

        if self.sphere.radius <= 0.0 {
            return Err(ConfigError::invalid("sphere.radius", "must be > 0"));
        }
        if self.sphere.mass < 0.0 {
            return Err(ConfigError::invalid("sphere.mass", "must be >= 0"));
        }

        let camera = &self.camera;
        if !(camera.fov_y > 0.0 && camera.fov_y < 180.0) {
            return Err(ConfigError::invalid("camera.fov_y", "must be in (0, 180)"));
        }
        if !(camera.near > 0.0 && camera.near < camera.far) {
            return Err(ConfigError::invalid("camera.near", "must be > 0 and < camera.far"));
        }

        if self.decor.fog_near >= self.decor.fog_far {
            return Err(ConfigError::invalid("decor.fog_near", "must be < decor.fog_far"));
        }

        Ok(())
    }
}
