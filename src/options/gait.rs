use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::SkitterError;

/// Leg stepping parameters shared by every leg of a creature.
///
/// The overshoot factor and minimum step distance were tuned by eye; they
/// are exposed here rather than baked into the stepper.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Gait", inline)]
#[serde(default)]
pub struct GaitOptions {
    /// Seconds between opportunities for a leg to step.
    #[schemars(title = "Step Period", range(min = 0.2, max = 5.0), extend("step" = 0.1))]
    pub step_period: f32,
    /// Seconds a single step takes from lift-off to landing.
    #[schemars(title = "Step Duration", range(min = 0.05, max = 1.0), extend("step" = 0.01))]
    pub step_duration: f32,
    /// Horizontal speed-up so the foot lands before the step timer ends.
    #[schemars(skip)]
    pub overshoot: f32,
    /// Candidate targets closer than this keep the foot planted.
    #[schemars(title = "Min Step Distance", range(min = 0.0, max = 2.0), extend("step" = 0.05))]
    pub min_step_distance: f32,
    /// Arc height as a fraction of the step length.
    #[schemars(title = "Step Height", range(min = 0.0, max = 1.0), extend("step" = 0.05))]
    pub arc_height_ratio: f32,
    /// Arc height subtracted before lifting; short shuffles stay flat.
    #[schemars(skip)]
    pub arc_deadband: f32,
}

impl GaitOptions {
    /// Reject tunings that would stall or divide by zero.
    pub fn validate(&self) -> Result<(), SkitterError> {
        if !self.step_period.is_finite() || self.step_period <= 0.0 {
            return Err(SkitterError::InvalidConfiguration(format!(
                "step_period must be positive, got {}",
                self.step_period
            )));
        }
        if !self.step_duration.is_finite() || self.step_duration <= 0.0 {
            return Err(SkitterError::InvalidConfiguration(format!(
                "step_duration must be positive, got {}",
                self.step_duration
            )));
        }
        if self.overshoot.is_nan() || self.overshoot < 1.0 {
            return Err(SkitterError::InvalidConfiguration(format!(
                "overshoot must be at least 1.0, got {}",
                self.overshoot
            )));
        }
        let distances = [
            ("min_step_distance", self.min_step_distance),
            ("arc_height_ratio", self.arc_height_ratio),
            ("arc_deadband", self.arc_deadband),
        ];
        for (name, value) in distances {
            if !value.is_finite() || value < 0.0 {
                return Err(SkitterError::InvalidConfiguration(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for GaitOptions {
    fn default() -> Self {
        Self {
            step_period: 2.0,
            step_duration: 0.3,
            overshoot: 1.3,
            min_step_distance: 0.5,
            arc_height_ratio: 0.4,
            arc_deadband: 0.1,
        }
    }
}
