use std::path::PathBuf;

use thiserror::Error;

use crate::assets::AssetId;
use crate::collision::BodyHandle;
use crate::scene::EntityId;

/// Top-level error type for scene construction.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    #[error("Binding error: {0}")]
    Binding(#[from] BindingError),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid fixed_dt: {0} (must be > 0)")]
    InvalidFixedDt(f32),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Asset loading errors.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse model {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Unknown asset: {0:?}")]
    Unknown(AssetId),

    #[error("Not a TrueType/OpenType font: {}", path.display())]
    InvalidFont { path: PathBuf },
}

/// Body/entity pairing errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BindingError {
    #[error("Body {0:?} is already bound")]
    BodyAlreadyBound(BodyHandle),

    #[error("Entity {0:?} is already bound")]
    EntityAlreadyBound(EntityId),

    #[error("Body {0:?} does not exist")]
    UnknownBody(BodyHandle),

    #[error("Entity {0:?} does not exist")]
    UnknownEntity(EntityId),
}
