use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::AssetError;
use crate::scene::{Geometry, Rgba};

fn default_scale() -> f32 {
    1.0
}

fn default_true() -> bool {
    true
}

/// One primitive of a model, placed relative to the model origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelPart {
    pub geometry: Geometry,
    #[serde(default)]
    pub offset: [f32; 3],
    pub color: Rgba,
}

impl ModelPart {
    pub fn offset(&self) -> Vec3 {
        Vec3::from_array(self.offset)
    }
}

/// Static decoration built from primitives, stored as RON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDesc {
    pub name: String,
    pub parts: Vec<ModelPart>,
    #[serde(default)]
    pub position: [f32; 3],
    #[serde(default = "default_scale")]
    pub scale: f32,
    #[serde(default = "default_true")]
    pub cast_shadow: bool,
}

impl ModelDesc {
    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    /// Parses a model; `path` only labels errors
    pub fn from_ron_str(text: &str, path: &Path) -> Result<Self, AssetError> {
        let model: Self = ron::from_str(text).map_err(|e| AssetError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        if model.parts.is_empty() {
            return Err(AssetError::Parse {
                path: path.to_path_buf(),
                message: "model has no parts".to_string(),
            });
        }
        Ok(model)
    }

    pub fn load(path: &Path) -> Result<Self, AssetError> {
        let text = std::fs::read_to_string(path).map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&text, path)
    }
}
