//! Per-creature driver composing root motion, leg stepping and IK.

use std::sync::Arc;

use glam::{Quat, Vec3};

use super::body::{BodyLocomotor, LocomotionState, RootPose};
use super::ik::{CcdSolver, IkChain, IkSolver};
use super::leg::{LegState, LegStepper};
use super::path::Path;
use super::rig::{RigDescriptor, Skeleton};
use crate::error::SkitterError;
use crate::options::Options;

/// Everything that only exists once a rig has been accepted.
struct ActiveRig {
    skeleton: Skeleton,
    /// Bind-pose bone positions in the root's local frame.
    bind_local: Vec<Vec3>,
    chains: Vec<IkChain>,
    locomotion: LocomotionState,
    legs: Vec<LegState>,
    pose: RootPose,
}

/// Drives one creature along a shared path.
///
/// An animator built from a malformed rig is *disabled*: it keeps its path
/// reference but every [`update`](Self::update) is a no-op.
pub struct CreatureAnimator {
    path: Arc<Path>,
    body: BodyLocomotor,
    stepper: LegStepper,
    solver: Box<dyn IkSolver>,
    rig: Option<ActiveRig>,
}

impl CreatureAnimator {
    /// Accept `rig` and place the creature at the start of `path`.
    ///
    /// Legs get evenly staggered phase offsets across one step period.
    pub fn new(
        rig: &RigDescriptor,
        path: Arc<Path>,
        speed: f32,
        options: &Options,
    ) -> Result<Self, SkitterError> {
        let stepper = LegStepper::new(&options.gait)?;
        options.locomotion.validate()?;
        let body = BodyLocomotor::new(&options.locomotion);

        let root = rig.root_index()?;
        let chains = rig.leg_chains(options.locomotion.ik_iterations)?;
        let locomotion = LocomotionState::new(&path, speed)?;

        let root_bind = rig.skeleton.position(root);
        let bind_local = rig
            .skeleton
            .bones()
            .iter()
            .map(|bone| bone.position - root_bind)
            .collect::<Vec<_>>();

        let pose = RootPose {
            position: path.point(locomotion.current_node()),
            yaw: locomotion.heading(),
        };

        let period = stepper.step_period();
        let leg_count = chains.len();
        let legs = chains
            .iter()
            .enumerate()
            .map(|(i, chain)| {
                let anchor = bind_local[chain.target];
                let offset = i as f32 * period / leg_count as f32;
                LegState::new(anchor, offset, pose.to_world(anchor))
            })
            .collect();

        log::debug!(
            "creature on '{}': {leg_count} legs, speed {speed:.2}",
            rig.skinned_mesh
        );

        let mut animator = Self {
            path,
            body,
            stepper,
            solver: Box::new(CcdSolver),
            rig: Some(ActiveRig {
                skeleton: rig.skeleton.clone(),
                bind_local,
                chains,
                locomotion,
                legs,
                pose,
            }),
        };
        animator.pose_skeleton();
        Ok(animator)
    }

    /// Like [`new`](Self::new), but a rig without the expected root or leg
    /// joints yields a disabled animator instead of an error.
    pub fn new_or_disabled(
        rig: &RigDescriptor,
        path: Arc<Path>,
        speed: f32,
        options: &Options,
    ) -> Result<Self, SkitterError> {
        match Self::new(rig, Arc::clone(&path), speed, options) {
            Err(SkitterError::SkeletonShape(msg)) => {
                log::warn!(
                    "disabling animator for '{}': {msg}",
                    rig.skinned_mesh
                );
                Ok(Self::disabled(path))
            }
            other => other,
        }
    }

    /// An animator that never moves anything.
    #[must_use]
    pub fn disabled(path: Arc<Path>) -> Self {
        Self {
            path,
            body: BodyLocomotor::default(),
            stepper: LegStepper::default(),
            solver: Box::new(CcdSolver),
            rig: None,
        }
    }

    /// Replace the per-leg phase offsets (seconds), one per leg.
    pub fn with_phase_offsets(
        mut self,
        offsets: &[f32],
    ) -> Result<Self, SkitterError> {
        let Some(rig) = self.rig.as_mut() else {
            return Ok(self);
        };
        if offsets.len() != rig.legs.len() {
            return Err(SkitterError::InvalidConfiguration(format!(
                "expected {} phase offsets, got {}",
                rig.legs.len(),
                offsets.len()
            )));
        }
        for (leg, &offset) in rig.legs.iter_mut().zip(offsets) {
            *leg = LegState::new(
                leg.anchor_offset(),
                offset,
                leg.foot_position(),
            );
        }
        Ok(self)
    }

    /// Swap in a different IK solver.
    #[must_use]
    pub fn with_solver(mut self, solver: Box<dyn IkSolver>) -> Self {
        self.solver = solver;
        self
    }

    /// Advance the creature by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        let Some(rig) = self.rig.as_mut() else {
            return;
        };

        rig.pose = self.body.advance(&mut rig.locomotion, &self.path, dt);
        for leg in &mut rig.legs {
            let _ = self.stepper.advance(leg, &rig.pose, dt);
        }
        self.pose_skeleton();
    }

    /// Displace bones by `offsets`, given in the root's local frame, on
    /// top of the pose from the last [`update`](Self::update). The next
    /// update rebuilds the pose from scratch.
    pub fn layer_offsets(&mut self, offsets: &[(usize, Vec3)]) {
        let Some(rig) = self.rig.as_mut() else {
            return;
        };
        let rotation = Quat::from_rotation_y(rig.pose.yaw);
        for &(index, offset) in offsets {
            if index < rig.skeleton.len() {
                let position = rig.skeleton.position(index);
                rig.skeleton.set_position(index, position + rotation * offset);
            }
        }
    }

    /// Carry the bind pose along with the root, pin IK targets to the feet
    /// and let the solver bend the legs.
    fn pose_skeleton(&mut self) {
        let Some(rig) = self.rig.as_mut() else {
            return;
        };

        let rotation = Quat::from_rotation_y(rig.pose.yaw);
        for (index, local) in rig.bind_local.iter().enumerate() {
            rig.skeleton
                .set_position(index, rig.pose.position + rotation * *local);
        }
        for (chain, leg) in rig.chains.iter().zip(&rig.legs) {
            rig.skeleton.set_position(chain.target, leg.foot_position());
        }
        self.solver.solve(&mut rig.skeleton, &rig.chains);
    }

    /// Whether the rig was accepted.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.rig.is_some()
    }

    /// The path being followed.
    #[must_use]
    pub fn path(&self) -> &Arc<Path> {
        &self.path
    }

    /// Current root placement.
    #[must_use]
    pub fn root_pose(&self) -> Option<RootPose> {
        self.rig.as_ref().map(|rig| rig.pose)
    }

    /// Root motion state.
    #[must_use]
    pub fn locomotion(&self) -> Option<&LocomotionState> {
        self.rig.as_ref().map(|rig| &rig.locomotion)
    }

    /// Per-leg state, in discovery order.
    #[must_use]
    pub fn legs(&self) -> &[LegState] {
        match &self.rig {
            Some(rig) => &rig.legs,
            None => &[],
        }
    }

    /// The posed skeleton.
    #[must_use]
    pub fn skeleton(&self) -> Option<&Skeleton> {
        self.rig.as_ref().map(|rig| &rig.skeleton)
    }

    /// IK chains, one per leg.
    #[must_use]
    pub fn chains(&self) -> &[IkChain] {
        match &self.rig {
            Some(rig) => &rig.chains,
            None => &[],
        }
    }
}

impl std::fmt::Debug for CreatureAnimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreatureAnimator")
            .field("enabled", &self.is_enabled())
            .field("legs", &self.legs().len())
            .field("pose", &self.root_pose())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::locomotion::ik::NoopSolver;
    use crate::locomotion::path::{generate_path, PathBounds};
    use crate::locomotion::rig::{procedural_spider, Bone};
    use crate::options::LocomotionOptions;

    fn test_path() -> Arc<Path> {
        let mut rng = StdRng::seed_from_u64(11);
        let bounds = PathBounds::square(10.0, 0.0);
        Arc::new(generate_path(8, &bounds, &mut rng).unwrap())
    }

    #[test]
    fn legs_get_staggered_offsets() {
        let rig = procedural_spider(2, 2.0);
        let animator =
            CreatureAnimator::new(&rig, test_path(), 3.5, &Options::default())
                .unwrap();
        let clocks: Vec<f32> =
            animator.legs().iter().map(LegState::phase_clock).collect();
        assert_eq!(clocks, vec![0.0, 0.5, 1.0, 1.5]);
    }

    #[test]
    fn feet_start_under_the_body() {
        let rig = procedural_spider(2, 2.0);
        let animator =
            CreatureAnimator::new(&rig, test_path(), 3.5, &Options::default())
                .unwrap();
        let pose = animator.root_pose().unwrap();
        for leg in animator.legs() {
            let expected = pose.to_world(leg.anchor_offset());
            assert!(leg.foot_position().distance(expected) < 1e-5);
        }
    }

    #[test]
    fn ik_pulls_effectors_toward_feet() {
        let rig = procedural_spider(2, 2.0);
        let path = test_path();
        let options = Options::default();
        let mut solved =
            CreatureAnimator::new(&rig, Arc::clone(&path), 1.0, &options)
                .unwrap();
        let mut unsolved = CreatureAnimator::new(&rig, path, 1.0, &options)
            .unwrap()
            .with_solver(Box::new(NoopSolver));

        for _ in 0..240 {
            solved.update(1.0 / 60.0);
            unsolved.update(1.0 / 60.0);
        }

        let with_ik = solved.skeleton().unwrap();
        let without_ik = unsolved.skeleton().unwrap();
        for (chain, leg) in solved.chains().iter().zip(solved.legs()) {
            assert_eq!(with_ik.position(chain.target), leg.foot_position());
            let foot = leg.foot_position();
            let solved_gap = with_ik.position(chain.effector).distance(foot);
            let unsolved_gap =
                without_ik.position(chain.effector).distance(foot);
            assert!(solved_gap <= unsolved_gap + 1e-4);
        }
    }

    #[test]
    fn body_bones_follow_the_root() {
        let rig = procedural_spider(1, 2.0);
        let mut animator =
            CreatureAnimator::new(&rig, test_path(), 3.5, &Options::default())
                .unwrap()
                .with_solver(Box::new(NoopSolver));
        for _ in 0..90 {
            animator.update(1.0 / 60.0);
        }
        let pose = animator.root_pose().unwrap();
        let skeleton = animator.skeleton().unwrap();
        let body = skeleton.find("body").unwrap();
        assert!(skeleton.position(0).distance(pose.position) < 1e-5);
        assert!(
            skeleton
                .position(body)
                .distance(pose.to_world(Vec3::new(0.0, 0.8, 0.0)))
                < 1e-4
        );
    }

    #[test]
    fn layered_offsets_follow_the_root_until_next_update() {
        let rig = procedural_spider(1, 2.0);
        let mut animator =
            CreatureAnimator::new(&rig, test_path(), 3.5, &Options::default())
                .unwrap()
                .with_solver(Box::new(NoopSolver));
        animator.update(1.0 / 60.0);
        let body = animator.skeleton().unwrap().find("body").unwrap();
        let rest = animator.skeleton().unwrap().position(body);
        let yaw = animator.root_pose().unwrap().yaw;

        animator.layer_offsets(&[(body, Vec3::Z), (999, Vec3::X)]);
        let lifted = animator.skeleton().unwrap().position(body);
        let expected = rest + Quat::from_rotation_y(yaw) * Vec3::Z;
        assert!(lifted.distance(expected) < 1e-5);

        animator.update(0.0);
        let settled = animator.skeleton().unwrap().position(body);
        assert!(settled.distance(rest) < 1e-4);
    }

    #[test]
    fn malformed_rig_disables_the_animator() {
        let rig = RigDescriptor::from_bones(
            "rock",
            vec![Bone::new("pebble", None, Vec3::ZERO)],
        );
        let mut animator = CreatureAnimator::new_or_disabled(
            &rig,
            test_path(),
            3.5,
            &Options::default(),
        )
        .unwrap();
        assert!(!animator.is_enabled());
        animator.update(1.0);
        assert!(animator.root_pose().is_none());
        assert!(animator.legs().is_empty());
    }

    #[test]
    fn bad_speed_is_still_an_error() {
        let rig = procedural_spider(1, 2.0);
        let err = CreatureAnimator::new_or_disabled(
            &rig,
            test_path(),
            0.0,
            &Options::default(),
        )
        .unwrap_err();
        assert!(matches!(err, SkitterError::InvalidConfiguration(_)));
    }

    #[test]
    fn zero_turn_lag_threshold_is_rejected() {
        let options = Options {
            locomotion: LocomotionOptions {
                turn_lag_threshold: 0.0,
                ..LocomotionOptions::default()
            },
            ..Options::default()
        };
        let rig = procedural_spider(1, 2.0);
        let err = CreatureAnimator::new(&rig, test_path(), 3.5, &options)
            .unwrap_err();
        assert!(matches!(err, SkitterError::InvalidConfiguration(_)));
    }

    #[test]
    fn phase_offsets_must_match_leg_count() {
        let rig = procedural_spider(2, 2.0);
        let animator =
            CreatureAnimator::new(&rig, test_path(), 3.5, &Options::default())
                .unwrap();
        assert!(animator.with_phase_offsets(&[0.0, 1.0]).is_err());
    }
}
