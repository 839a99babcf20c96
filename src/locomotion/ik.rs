//! Inverse kinematics boundary and the bundled CCD solver.

use std::f32::consts::TAU;

use glam::Quat;

use super::rig::Skeleton;

/// Effector distance below which a chain counts as solved.
const REACH_TOLERANCE: f32 = 1e-4;

/// One IK chain: pull `effector` onto `target` by rotating `links`.
#[derive(Debug, Clone, PartialEq)]
pub struct IkChain {
    /// Bone whose position is the goal.
    pub target: usize,
    /// Bone that should end up on the goal.
    pub effector: usize,
    /// Joints to rotate, ordered from the effector outward.
    pub links: Vec<usize>,
    /// Solver passes per frame.
    pub iterations: u32,
    /// Smallest rotation (radians) a link may take per pass.
    pub min_angle: f32,
    /// Largest rotation (radians) a link may take per pass.
    pub max_angle: f32,
}

impl IkChain {
    /// Chain with unrestricted angles (±2π).
    #[must_use]
    pub fn new(
        target: usize,
        effector: usize,
        links: Vec<usize>,
        iterations: u32,
    ) -> Self {
        Self {
            target,
            effector,
            links,
            iterations,
            min_angle: -TAU,
            max_angle: TAU,
        }
    }
}

/// Reconciles joint positions with IK targets.
pub trait IkSolver {
    /// Move the joints of every chain so its effector approaches its target.
    fn solve(&mut self, skeleton: &mut Skeleton, chains: &[IkChain]);
}

/// Position-based cyclic coordinate descent.
///
/// Each pass walks the links from the effector outward and swings the
/// downstream joints about the link so the effector points at the target.
/// Bone lengths are preserved.
#[derive(Debug, Clone, Copy, Default)]
pub struct CcdSolver;

impl CcdSolver {
    fn solve_chain(skeleton: &mut Skeleton, chain: &IkChain) {
        let target = skeleton.position(chain.target);

        for _ in 0..chain.iterations {
            for (depth, &link) in chain.links.iter().enumerate() {
                let pivot = skeleton.position(link);
                let to_effector = skeleton.position(chain.effector) - pivot;
                let to_target = target - pivot;
                let (Some(from), Some(to)) =
                    (to_effector.try_normalize(), to_target.try_normalize())
                else {
                    continue;
                };

                let (axis, angle) =
                    Quat::from_rotation_arc(from, to).to_axis_angle();
                let angle = angle.clamp(chain.min_angle, chain.max_angle);
                if angle.abs() < f32::EPSILON {
                    continue;
                }
                let rotation = Quat::from_axis_angle(axis, angle);

                // Everything closer to the effector than this link swings.
                for &joint in chain.links[..depth]
                    .iter()
                    .chain(std::iter::once(&chain.effector))
                {
                    let offset = skeleton.position(joint) - pivot;
                    skeleton.set_position(joint, pivot + rotation * offset);
                }
            }

            let miss = skeleton.position(chain.effector).distance(target);
            if miss < REACH_TOLERANCE {
                break;
            }
        }
    }
}

impl IkSolver for CcdSolver {
    fn solve(&mut self, skeleton: &mut Skeleton, chains: &[IkChain]) {
        for chain in chains {
            Self::solve_chain(skeleton, chain);
        }
    }
}

/// Solver that leaves the skeleton untouched; for hosts that run IK
/// themselves.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSolver;

impl IkSolver for NoopSolver {
    fn solve(&mut self, _skeleton: &mut Skeleton, _chains: &[IkChain]) {}
}
