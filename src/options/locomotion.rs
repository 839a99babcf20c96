use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::SkitterError;

/// How the root yaw chases the heading of the current path edge.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum HeadingSmoothing {
    /// Blend a fixed fraction of the remaining angle every frame. Turn rate
    /// depends on frame rate.
    PerFrame {
        /// Fraction of the remaining angle covered per frame.
        factor: f32,
    },
    /// Blend as if running at 60 FPS regardless of the real delta.
    PerSecond {
        /// Fraction of the remaining angle covered per 1/60 s.
        factor: f32,
    },
}

impl HeadingSmoothing {
    /// Blend weight to use for a frame lasting `dt` seconds.
    #[must_use]
    pub fn blend(self, dt: f32) -> f32 {
        match self {
            Self::PerFrame { factor } => factor,
            Self::PerSecond { factor } => {
                1.0 - (1.0 - factor).powf(dt.max(0.0) * 60.0)
            }
        }
    }
}

impl Default for HeadingSmoothing {
    fn default() -> Self {
        Self::PerFrame { factor: 0.02 }
    }
}

/// Root motion parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Locomotion", inline)]
#[serde(default)]
pub struct LocomotionOptions {
    /// Heading smoothing strategy.
    #[schemars(skip)]
    pub heading_smoothing: HeadingSmoothing,
    /// Heading lag (radians) above which forward progress is held back.
    #[schemars(
        title = "Turn Lag Threshold",
        range(min = 0.05, max = 3.0),
        extend("step" = 0.05)
    )]
    pub turn_lag_threshold: f32,
    /// Spawn speed range `[min, max]` in world units per second.
    #[schemars(skip)]
    pub speed_range: [f32; 2],
    /// CCD iterations per IK chain per frame.
    #[schemars(title = "IK Iterations", range(min = 1, max = 100))]
    pub ik_iterations: u32,
}

impl LocomotionOptions {
    /// Reject tunings that would leave a creature frozen forever.
    pub fn validate(&self) -> Result<(), SkitterError> {
        let threshold = self.turn_lag_threshold;
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(SkitterError::InvalidConfiguration(format!(
                "turn_lag_threshold must be positive, got {threshold}"
            )));
        }
        let [min, max] = self.speed_range;
        if min.is_nan() || max.is_nan() || min <= 0.0 || max < min {
            return Err(SkitterError::InvalidConfiguration(format!(
                "speed_range must satisfy 0 < min <= max, got [{min}, {max}]"
            )));
        }
        let factor = match self.heading_smoothing {
            HeadingSmoothing::PerFrame { factor }
            | HeadingSmoothing::PerSecond { factor } => factor,
        };
        if !(factor > 0.0 && factor <= 1.0) {
            return Err(SkitterError::InvalidConfiguration(format!(
                "heading smoothing factor must be in (0, 1], got {factor}"
            )));
        }
        if self.ik_iterations == 0 {
            return Err(SkitterError::InvalidConfiguration(
                "ik_iterations must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }
}

impl Default for LocomotionOptions {
    fn default() -> Self {
        Self {
            heading_smoothing: HeadingSmoothing::default(),
            turn_lag_threshold: 0.5,
            speed_range: [1.5, 3.5],
            ik_iterations: 50,
        }
    }
}
