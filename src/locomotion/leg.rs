//! Per-leg gait state machine.
//!
//! Each leg runs two clocks: a continuous phase clock that decides *when*
//! the leg may consider stepping, and a step timer that drives one swing of
//! the foot from its source to its target. Giving legs different phase
//! offsets staggers the gait.

use glam::Vec3;

use super::body::RootPose;
use crate::error::SkitterError;
use crate::options::GaitOptions;

/// Foot placement and timing for one leg.
#[derive(Debug, Clone)]
pub struct LegState {
    anchor_offset: Vec3,
    source_position: Vec3,
    target_position: Vec3,
    foot_position: Vec3,
    phase_clock: f32,
    step_elapsed: f32,
    is_stepping: bool,
    steps_taken: u32,
}

impl LegState {
    /// Planted leg resting at `foot_position`.
    ///
    /// `anchor_offset` is the rest foot position in the root's local frame;
    /// `phase_offset` pre-loads the phase clock so legs don't step in
    /// unison.
    #[must_use]
    pub fn new(
        anchor_offset: Vec3,
        phase_offset: f32,
        foot_position: Vec3,
    ) -> Self {
        Self {
            anchor_offset,
            source_position: foot_position,
            target_position: foot_position,
            foot_position,
            phase_clock: phase_offset,
            step_elapsed: 0.0,
            is_stepping: false,
            steps_taken: 0,
        }
    }

    /// Rest foot position relative to the root.
    #[must_use]
    pub fn anchor_offset(&self) -> Vec3 {
        self.anchor_offset
    }

    /// Where the current (or last) step started.
    #[must_use]
    pub fn source_position(&self) -> Vec3 {
        self.source_position
    }

    /// Where the current (or last) step lands.
    #[must_use]
    pub fn target_position(&self) -> Vec3 {
        self.target_position
    }

    /// Current world-space foot position, lift included.
    #[must_use]
    pub fn foot_position(&self) -> Vec3 {
        self.foot_position
    }

    /// Seconds since the last step opportunity.
    #[must_use]
    pub fn phase_clock(&self) -> f32 {
        self.phase_clock
    }

    /// Seconds since the current step began.
    #[must_use]
    pub fn step_elapsed(&self) -> f32 {
        self.step_elapsed
    }

    /// Whether the foot is in the air.
    #[must_use]
    pub fn is_stepping(&self) -> bool {
        self.is_stepping
    }

    /// Steps committed since construction.
    #[must_use]
    pub fn steps_taken(&self) -> u32 {
        self.steps_taken
    }
}

/// Advances [`LegState`]s according to a gait tuning.
#[derive(Debug, Clone)]
pub struct LegStepper {
    gait: GaitOptions,
}

impl LegStepper {
    /// Stepper for a validated gait.
    pub fn new(gait: &GaitOptions) -> Result<Self, SkitterError> {
        gait.validate()?;
        Ok(Self { gait: gait.clone() })
    }

    /// Seconds between step opportunities.
    #[must_use]
    pub fn step_period(&self) -> f32 {
        self.gait.step_period
    }

    /// Advance one leg by `dt` and return its new foot position.
    pub fn advance(
        &self,
        leg: &mut LegState,
        root: &RootPose,
        dt: f32,
    ) -> Vec3 {
        let dt = dt.max(0.0);
        leg.phase_clock += dt;

        if leg.is_stepping {
            leg.step_elapsed += dt;
            if leg.step_elapsed >= self.gait.step_duration {
                leg.is_stepping = false;
                leg.foot_position = leg.target_position;
            } else {
                let fraction = leg.step_elapsed / self.gait.step_duration;
                leg.foot_position = self.swing_position(
                    leg.source_position,
                    leg.target_position,
                    fraction,
                );
            }
        }

        // Opportunities that arrive mid-swing are spent without stepping,
        // so the clock never runs more than one period ahead.
        if leg.phase_clock > self.gait.step_period {
            leg.phase_clock -= self.gait.step_period;
            if !leg.is_stepping {
                self.plan_step(leg, root);
            }
        }

        leg.foot_position
    }

    /// Consider a new step toward the leg's rest position under `root`.
    fn plan_step(&self, leg: &mut LegState, root: &RootPose) {
        leg.step_elapsed = 0.0;
        leg.source_position = leg.foot_position;

        let candidate = root.to_world(leg.anchor_offset);
        let distance = leg.source_position.distance(candidate);
        if distance < self.gait.min_step_distance {
            return;
        }

        leg.target_position = candidate;
        leg.is_stepping = true;
        leg.steps_taken += 1;
    }

    /// Foot position `fraction` of the way through a step.
    ///
    /// The horizontal motion runs `overshoot` times faster than the step
    /// timer and then holds at the target. The lift is a tent peaking at
    /// the middle of the step and zero at both ends.
    #[must_use]
    pub fn swing_position(
        &self,
        source: Vec3,
        target: Vec3,
        fraction: f32,
    ) -> Vec3 {
        let t = (fraction * self.gait.overshoot).clamp(0.0, 1.0);
        let mut position = source.lerp(target, t);

        let arc_height = (source.distance(target) * self.gait.arc_height_ratio
            - self.gait.arc_deadband)
            .max(0.0);
        let lift = (1.0 - (fraction - 0.5).abs() * 2.0).max(0.0);
        position.y += lift * arc_height;
        position
    }
}

impl Default for LegStepper {
    fn default() -> Self {
        Self {
            gait: GaitOptions::default(),
        }
    }
}
