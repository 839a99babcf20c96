//! Procedural locomotion for multi-legged creatures.
//!
//! The pieces stack bottom-up: a [`Path`] is sampled once and shared, a
//! [`BodyLocomotor`] walks the root along it, a [`LegStepper`] plants and
//! swings each foot, and an [`IkSolver`] bends the leg joints onto the
//! feet. [`CreatureAnimator`] ties them together for one rig.

pub mod body;
pub mod creature;
pub mod ik;
pub mod leg;
pub mod path;
pub mod rig;

pub use body::{BodyLocomotor, LocomotionState, RootPose};
pub use creature::CreatureAnimator;
pub use ik::{CcdSolver, IkChain, IkSolver, NoopSolver};
pub use leg::{LegState, LegStepper};
pub use path::{
    generate_path, generate_path_from_options, generate_path_with_samples,
    Path, PathBounds,
};
pub use rig::{procedural_spider, Bone, RigDescriptor, Skeleton};
