//! Centralized tuning options with TOML preset support.
//!
//! Every tweakable constant of the animator (gait timing, root motion,
//! path generation, camera placement) is consolidated here. Options
//! serialize to/from TOML so a scene can be described by a preset file.

mod camera;
mod gait;
mod locomotion;
mod path;

use std::path::Path;

pub use camera::CameraOptions;
pub use gait::GaitOptions;
pub use locomotion::{HeadingSmoothing, LocomotionOptions};
pub use path::PathOptions;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::SkitterError;

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[gait]`) work correctly.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(default)]
pub struct Options {
    /// Leg stepping parameters.
    pub gait: GaitOptions,
    /// Root motion parameters.
    pub locomotion: LocomotionOptions,
    /// Path generation parameters.
    pub path: PathOptions,
    /// Camera placement.
    pub camera: CameraOptions,
}

impl Options {
    /// Generate JSON Schema describing the UI-exposed options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Pretty-printed JSON Schema, for tooling that consumes it as text.
    pub fn json_schema_string() -> Result<String, SkitterError> {
        serde_json::to_string_pretty(&Self::json_schema())
            .map_err(|e| SkitterError::OptionsParse(e.to_string()))
    }

    /// Check cross-field constraints that serde can't express.
    pub fn validate(&self) -> Result<(), SkitterError> {
        self.gait.validate()?;
        self.locomotion.validate()
    }

    /// Parse options from TOML text. Missing fields use defaults.
    pub fn from_toml(content: &str) -> Result<Self, SkitterError> {
        let options: Self = toml::from_str(content)
            .map_err(|e| SkitterError::OptionsParse(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from a TOML file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self, SkitterError> {
        let content = std::fs::read_to_string(path).map_err(SkitterError::Io)?;
        Self::from_toml(&content)
    }

    /// Save options to a TOML file (pretty-printed).
    pub fn save(&self, path: &Path) -> Result<(), SkitterError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SkitterError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(SkitterError::Io)?;
        }
        std::fs::write(path, content).map_err(SkitterError::Io)
    }

    /// List available preset names (TOML file stems) in a directory.
    #[must_use]
    pub fn list_presets(dir: &Path) -> Vec<String> {
        let mut names = Vec::new();
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) =
                        path.file_stem().and_then(|s| s.to_str())
                    {
                        names.push(stem.to_owned());
                    }
                }
            }
        }
        names.sort();
        names
    }
}
