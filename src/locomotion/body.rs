//! Root motion along a closed path.
//!
//! The root walks the sampled polyline edge by edge at constant speed. Yaw
//! is smoothed toward the heading of the current edge, and forward progress
//! is held back while the body is still turning so the creature doesn't
//! slide sideways through corners.

use glam::Vec3;

use super::path::Path;
use crate::error::SkitterError;
use crate::options::{HeadingSmoothing, LocomotionOptions};
use crate::util::angle;

/// Progress within this distance of 1.0 counts as a finished segment;
/// absorbs rounding when many small deltas sum to one segment duration.
const PROGRESS_EPSILON: f32 = 1e-4;

/// World-space placement of a creature's root bone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootPose {
    /// Root position.
    pub position: Vec3,
    /// Rotation about +Y, radians.
    pub yaw: f32,
}

impl RootPose {
    /// Transform a point from the root's local frame into world space.
    #[must_use]
    pub fn to_world(&self, local: Vec3) -> Vec3 {
        self.position + glam::Quat::from_rotation_y(self.yaw) * local
    }
}

/// Per-creature progress along its path.
#[derive(Debug, Clone)]
pub struct LocomotionState {
    current_node: usize,
    next_node: usize,
    segment_elapsed: f32,
    segment_duration: f32,
    heading: f32,
    target_heading: f32,
    speed: f32,
    laps: u32,
}

impl LocomotionState {
    /// Start on the first edge of `path`, already facing along it.
    pub fn new(path: &Path, speed: f32) -> Result<Self, SkitterError> {
        if !(speed > 0.0 && speed.is_finite()) {
            return Err(SkitterError::InvalidConfiguration(format!(
                "creature speed must be positive and finite, got {speed}"
            )));
        }
        let next_node = path.next_index(0);
        let heading = angle::normalize(edge_heading(path, 0, next_node));
        Ok(Self {
            current_node: 0,
            next_node,
            segment_elapsed: 0.0,
            segment_duration: path.point(0).distance(path.point(next_node))
                / speed,
            heading,
            target_heading: heading,
            speed,
            laps: 0,
        })
    }

    /// Index of the node the root last passed.
    #[must_use]
    pub fn current_node(&self) -> usize {
        self.current_node
    }

    /// Index of the node the root is walking toward.
    #[must_use]
    pub fn next_node(&self) -> usize {
        self.next_node
    }

    /// Seconds spent on the current edge.
    #[must_use]
    pub fn segment_elapsed(&self) -> f32 {
        self.segment_elapsed
    }

    /// Seconds the current edge takes at full speed.
    #[must_use]
    pub fn segment_duration(&self) -> f32 {
        self.segment_duration
    }

    /// Current (smoothed) yaw.
    #[must_use]
    pub fn heading(&self) -> f32 {
        self.heading
    }

    /// Yaw of the current edge, unwrapped for the short way round.
    #[must_use]
    pub fn target_heading(&self) -> f32 {
        self.target_heading
    }

    /// Walking speed in world units per second.
    #[must_use]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Completed traversals of the closed path.
    #[must_use]
    pub fn laps(&self) -> u32 {
        self.laps
    }

    fn progress(&self) -> f32 {
        if self.segment_duration > 0.0 {
            self.segment_elapsed / self.segment_duration
        } else {
            1.0
        }
    }

    /// Move onto the following edge and retarget the heading.
    fn begin_next_segment(&mut self, path: &Path) {
        self.current_node = self.next_node;
        self.next_node = path.next_index(self.current_node);
        if self.current_node == 0 {
            self.laps += 1;
        }

        let distance = path
            .point(self.current_node)
            .distance(path.point(self.next_node));
        self.segment_duration = distance / self.speed;
        self.segment_elapsed = 0.0;

        self.heading = angle::normalize(self.heading);
        let target = angle::normalize(edge_heading(
            path,
            self.current_node,
            self.next_node,
        ));
        self.target_heading = angle::shortest_target(self.heading, target);
    }
}

/// Yaw that faces from node `from` toward node `to`.
fn edge_heading(path: &Path, from: usize, to: usize) -> f32 {
    let delta = path.point(to) - path.point(from);
    delta.x.atan2(delta.z)
}

/// Advances a [`LocomotionState`] along a path.
#[derive(Debug, Clone, Copy)]
pub struct BodyLocomotor {
    smoothing: HeadingSmoothing,
    turn_lag_threshold: f32,
}

impl BodyLocomotor {
    /// Locomotor using the given tuning.
    #[must_use]
    pub fn new(options: &LocomotionOptions) -> Self {
        Self {
            smoothing: options.heading_smoothing,
            turn_lag_threshold: options.turn_lag_threshold,
        }
    }

    /// Advance the root by `dt` seconds and return its new pose.
    ///
    /// At most one node is passed per call, so very large deltas slow the
    /// creature down rather than making it skip corners.
    pub fn advance(
        &self,
        state: &mut LocomotionState,
        path: &Path,
        dt: f32,
    ) -> RootPose {
        state.segment_elapsed += dt.max(0.0);
        let mut progress = state.progress();

        if progress >= 1.0 - PROGRESS_EPSILON {
            state.begin_next_segment(path);
            progress = 0.0;
        }

        let blend = self.smoothing.blend(dt);
        state.heading = angle::lerp(state.heading, state.target_heading, blend);

        // Hold position until the turn catches up.
        let lag = (state.heading - state.target_heading).abs();
        if lag > self.turn_lag_threshold {
            state.segment_elapsed = 0.0;
        }

        RootPose {
            position: path
                .point(state.current_node)
                .lerp(path.point(state.next_node), progress),
            yaw: state.heading,
        }
    }
}

impl Default for BodyLocomotor {
    fn default() -> Self {
        Self::new(&LocomotionOptions::default())
    }
}
