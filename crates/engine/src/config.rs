use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::xml::XmlError;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path} at '{field}': {message}")]
    Json {
        path: PathBuf,
        field: String,
        message: String,
    },
    #[error(transparent)]
    Xml(#[from] XmlError),
    #[error("{path}: duplicate {kind} '{name}'")]
    DuplicateName {
        path: PathBuf,
        kind: &'static str,
        name: String,
    },
    #[error("{kind} '{name}' is invalid: {message}")]
    Invalid {
        kind: &'static str,
        name: String,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoopSettings {
    pub target_rate: u32,
    pub max_frame_delta_ms: u64,
    pub max_steps_per_frame: u32,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            target_rate: 60,
            max_frame_delta_ms: 250,
            max_steps_per_frame: 5,
        }
    }
}

impl LoopSettings {
    pub fn max_frame_delta(&self) -> Duration {
        Duration::from_millis(self.max_frame_delta_ms.max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewSettings {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub screen_height: i32,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            width: 320,
            height: 240,
            screen_height: 240,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraSettings {
    pub interval_horizontal: i32,
    pub interval_vertical: i32,
}

/// Engine-wide settings. Every section is optional in the JSON source.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    #[serde(rename = "loop")]
    pub frame_loop: LoopSettings,
    pub view: ViewSettings,
    pub camera: CameraSettings,
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &raw)
    }

    pub fn parse(path: &Path, raw: &str) -> Result<Self, ConfigError> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        serde_path_to_error::deserialize::<_, Self>(&mut deserializer).map_err(|error| {
            let field = error.path().to_string();
            ConfigError::Json {
                path: path.to_path_buf(),
                field,
                message: error.into_inner().to_string(),
            }
        })
    }
}
