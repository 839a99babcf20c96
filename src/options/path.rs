use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::locomotion::PathBounds;

/// Wandering path generation parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Path", inline)]
#[serde(default)]
pub struct PathOptions {
    /// Random control points the curve passes through.
    #[schemars(title = "Control Points", range(min = 4, max = 32))]
    pub control_points: usize,
    /// Number of polyline samples taken along the closed curve.
    #[schemars(skip)]
    pub samples: usize,
    /// Minimum `[x, z]` corner of the area the path wanders in.
    #[schemars(skip)]
    pub min: [f32; 2],
    /// Maximum `[x, z]` corner of the area the path wanders in.
    #[schemars(skip)]
    pub max: [f32; 2],
    /// Ground height of the path.
    #[schemars(skip)]
    pub elevation: f32,
}

impl PathOptions {
    /// The wander area as path bounds.
    #[must_use]
    pub fn bounds(&self) -> PathBounds {
        PathBounds {
            min_x: self.min[0],
            min_z: self.min[1],
            max_x: self.max[0],
            max_z: self.max[1],
            elevation: self.elevation,
        }
    }
}

impl Default for PathOptions {
    fn default() -> Self {
        Self {
            control_points: 8,
            samples: 100,
            min: [-10.0, -10.0],
            max: [10.0, 10.0],
            elevation: 0.0,
        }
    }
}
