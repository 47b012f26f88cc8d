//! Skeleton Targets
//!
//! The retargeter only needs two things from an avatar: the bind-time world
//! transforms of each humanoid bone (to calibrate once), and a sink for the
//! per-frame parent-local transforms. [`HumanoidRig`] captures exactly that,
//! and [`Skeleton`] is a self-contained bone hierarchy implementing it.

pub mod hierarchy;
pub mod transform;

pub use hierarchy::{Bone, Skeleton};
pub use transform::Transform;

use glam::{Affine3A, Quat, Vec3};
use slotmap::new_key_type;

use crate::motion::HumanBone;

new_key_type! {
    pub struct BoneKey;
}

/// Bind-time placement of one bone, relative to the avatar root.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BindPose {
    /// World transform of the bone's parent (identity if the bone is a root).
    pub parent_world: Affine3A,
    /// World transform of the bone itself.
    pub world: Affine3A,
}

/// An avatar skeleton the pose stream can drive.
///
/// Implementations never change topology in response to these calls, only
/// per-bone local transform values.
pub trait HumanoidRig {
    /// Bind-time world transforms for `bone`, or `None` if the rig lacks it.
    fn bind_pose(&self, bone: HumanBone) -> Option<BindPose>;

    /// Writes a parent-local transform. `None` fields are left untouched.
    fn set_local_transform(
        &mut self,
        bone: HumanBone,
        rotation: Quat,
        position: Option<Vec3>,
        scale: Option<f32>,
    );
}
