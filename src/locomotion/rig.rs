//! Typed skeleton description handed over by the model loader.
//!
//! The loader resolves the root bone and skinned mesh once; the animator
//! only ever works with this descriptor and never probes a scene graph.

use glam::Vec3;

use super::ik::IkChain;
use crate::error::SkitterError;

/// Name of the bone that carries root motion.
pub const ROOT_BONE: &str = "root";

/// Prefix of the IK target bone paired with each leg (`IK_legaL`, ...).
pub const IK_TARGET_PREFIX: &str = "IK_";

/// A single joint. Positions are world space at bind time and are rewritten
/// every frame once the rig is animated.
#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
    /// Bone name as authored.
    pub name: String,
    /// Index of the parent bone, if any.
    pub parent: Option<usize>,
    /// World-space joint position.
    pub position: Vec3,
}

impl Bone {
    /// Convenience constructor.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        parent: Option<usize>,
        position: Vec3,
    ) -> Self {
        Self {
            name: name.into(),
            parent,
            position,
        }
    }
}

/// Flat bone list, indexed the way the loader authored it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Skeleton {
    bones: Vec<Bone>,
}

impl Skeleton {
    /// Wrap a bone list.
    #[must_use]
    pub fn new(bones: Vec<Bone>) -> Self {
        Self { bones }
    }

    /// All bones.
    #[must_use]
    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    /// Number of bones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    /// Whether the skeleton has no bones.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// Index of the bone called `name`.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<usize> {
        self.bones.iter().position(|b| b.name == name)
    }

    /// World position of bone `index`.
    #[must_use]
    pub fn position(&self, index: usize) -> Vec3 {
        self.bones[index].position
    }

    /// Overwrite the world position of bone `index`.
    pub fn set_position(&mut self, index: usize, position: Vec3) {
        self.bones[index].position = position;
    }
}

/// What the loader resolved for one skeletal model.
#[derive(Debug, Clone, PartialEq)]
pub struct RigDescriptor {
    /// Index of the root-motion bone, if the model has one.
    pub root: Option<usize>,
    /// Name of the skinned mesh bound to the skeleton.
    pub skinned_mesh: String,
    /// The skeleton itself.
    pub skeleton: Skeleton,
}

impl RigDescriptor {
    /// Build a descriptor, resolving the root bone by name.
    #[must_use]
    pub fn from_bones(
        skinned_mesh: impl Into<String>,
        bones: Vec<Bone>,
    ) -> Self {
        let skeleton = Skeleton::new(bones);
        Self {
            root: skeleton.find(ROOT_BONE),
            skinned_mesh: skinned_mesh.into(),
            skeleton,
        }
    }

    /// Root bone index, checked against the skeleton.
    pub fn root_index(&self) -> Result<usize, SkitterError> {
        match self.root {
            Some(index) if index < self.skeleton.len() => Ok(index),
            Some(index) => Err(SkitterError::SkeletonShape(format!(
                "root index {index} is out of range for {} bones",
                self.skeleton.len()
            ))),
            None => Err(SkitterError::SkeletonShape(format!(
                "mesh '{}' has no '{ROOT_BONE}' bone",
                self.skinned_mesh
            ))),
        }
    }

    /// Discover every leg and describe its IK chain.
    ///
    /// A leg is a bone named `leg*L` or `leg*R`, followed by three child
    /// joints down to the foot, with an `IK_<name>` target bone. Any leg
    /// that doesn't fit that shape rejects the whole rig.
    pub fn leg_chains(
        &self,
        iterations: u32,
    ) -> Result<Vec<IkChain>, SkitterError> {
        let bones = self.skeleton.bones();
        let mut chains = Vec::new();

        for (index, bone) in bones.iter().enumerate() {
            if !is_leg_name(&bone.name) {
                continue;
            }
            let ik_name = format!("{IK_TARGET_PREFIX}{}", bone.name);
            let target = self.skeleton.find(&ik_name).ok_or_else(|| {
                SkitterError::SkeletonShape(format!(
                    "leg '{}' has no '{ik_name}' target bone",
                    bone.name
                ))
            })?;

            let effector = index + 3;
            if effector >= bones.len() {
                return Err(SkitterError::SkeletonShape(format!(
                    "leg '{}' is missing joints below it",
                    bone.name
                )));
            }
            for joint in index + 1..=effector {
                if bones[joint].parent != Some(joint - 1) {
                    return Err(SkitterError::SkeletonShape(format!(
                        "joint '{}' of leg '{}' is not attached to the \
                         previous joint",
                        bones[joint].name, bone.name
                    )));
                }
            }

            chains.push(IkChain::new(
                target,
                effector,
                vec![index + 2, index + 1, index],
                iterations,
            ));
        }

        if chains.is_empty() {
            return Err(SkitterError::SkeletonShape(format!(
                "mesh '{}' has no legs",
                self.skinned_mesh
            )));
        }
        Ok(chains)
    }
}

fn is_leg_name(name: &str) -> bool {
    name.starts_with("leg") && (name.ends_with('L') || name.ends_with('R'))
}

/// Procedurally built spider rig: a root, a body, and `leg_pairs` pairs of
/// four-joint legs fanned around the body with their IK targets resting on
/// the ground.
///
/// Stands in for a loaded model in the demo and in tests.
#[must_use]
pub fn procedural_spider(leg_pairs: usize, span: f32) -> RigDescriptor {
    let mut bones = vec![
        Bone::new(ROOT_BONE, None, Vec3::ZERO),
        Bone::new("body", Some(0), Vec3::new(0.0, 0.8, 0.0)),
    ];
    let mut targets = Vec::new();

    for pair in 0..leg_pairs {
        // Spread pairs from front to back.
        let along = if leg_pairs > 1 {
            span * (0.5 - pair as f32 / (leg_pairs - 1) as f32)
        } else {
            0.0
        };
        let letter = char::from(b'a' + (pair % 26) as u8);

        for (side, sign) in [('L', 1.0_f32), ('R', -1.0_f32)] {
            let name = format!("leg{letter}{side}");
            let hip = Vec3::new(sign * 0.4, 0.8, along * 0.3);
            let knee = Vec3::new(sign * span * 0.45, 1.4, along * 0.6);
            let ankle = Vec3::new(sign * span * 0.8, 0.7, along * 0.85);
            let foot = Vec3::new(sign * span, 0.0, along);

            let base = bones.len();
            bones.push(Bone::new(name.clone(), Some(1), hip));
            bones.push(Bone::new(format!("{name}_knee"), Some(base), knee));
            bones.push(Bone::new(
                format!("{name}_ankle"),
                Some(base + 1),
                ankle,
            ));
            bones.push(Bone::new(format!("{name}_foot"), Some(base + 2), foot));
            let target = format!("{IK_TARGET_PREFIX}{name}");
            targets.push(Bone::new(target, Some(0), foot));
        }
    }

    bones.extend(targets);
    RigDescriptor::from_bones("spider", bones)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn procedural_spider_has_expected_legs() {
        let rig = procedural_spider(4, 2.0);
        assert_eq!(rig.root_index().unwrap(), 0);
        let chains = rig.leg_chains(50).unwrap();
        assert_eq!(chains.len(), 8);
        for chain in &chains {
            let name = &rig.skeleton.bones()[chain.target].name;
            assert!(name.starts_with(IK_TARGET_PREFIX));
            assert_eq!(chain.links.len(), 3);
            assert_eq!(chain.links[0] + 1, chain.effector);
        }
    }

    #[test]
    fn missing_root_is_a_shape_error() {
        let mut rig = procedural_spider(1, 1.0);
        rig.root = None;
        assert!(matches!(
            rig.root_index(),
            Err(SkitterError::SkeletonShape(_))
        ));
    }

    #[test]
    fn missing_ik_target_is_a_shape_error() {
        let rig = procedural_spider(2, 1.0);
        let bones: Vec<Bone> = rig
            .skeleton
            .bones()
            .iter()
            .filter(|b| b.name != "IK_legaL")
            .cloned()
            .collect();
        let rig = RigDescriptor::from_bones("spider", bones);
        assert!(matches!(
            rig.leg_chains(10),
            Err(SkitterError::SkeletonShape(_))
        ));
    }

    #[test]
    fn detached_joint_is_a_shape_error() {
        let mut rig = procedural_spider(1, 1.0);
        let mut bones = rig.skeleton.bones().to_vec();
        let knee = bones.iter().position(|b| b.name == "legaL_knee").unwrap();
        bones[knee].parent = Some(0);
        rig.skeleton = Skeleton::new(bones);
        assert!(rig.leg_chains(10).is_err());
    }

    #[test]
    fn legless_rig_is_a_shape_error() {
        let rig = RigDescriptor::from_bones(
            "blob",
            vec![Bone::new(ROOT_BONE, None, Vec3::ZERO)],
        );
        assert!(rig.leg_chains(10).is_err());
    }
}
