use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::motion::HumanBone;
use crate::skeleton::HumanoidRig;

/// Parent-local transform of one driven bone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BonePose {
    pub bone: HumanBone,
    pub rotation: Quat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Vec3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f32>,
}

impl BonePose {
    #[must_use]
    pub fn rotation_only(bone: HumanBone, rotation: Quat) -> Self {
        Self {
            bone,
            rotation,
            position: None,
            scale: None,
        }
    }
}

/// Retargeted pose of one avatar for one frame.
///
/// Only bones that resolved against the avatar are present; there is no
/// zero-filling for bones the skeleton lacks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetargetedPose {
    pub bones: Vec<BonePose>,
}

impl RetargetedPose {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bones: Vec::with_capacity(capacity),
        }
    }

    #[must_use]
    pub fn get(&self, bone: HumanBone) -> Option<&BonePose> {
        self.bones.iter().find(|p| p.bone == bone)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BonePose> {
        self.bones.iter()
    }

    /// Writes every bone transform into `rig`.
    pub fn apply_to<R: HumanoidRig + ?Sized>(&self, rig: &mut R) {
        for pose in &self.bones {
            rig.set_local_transform(pose.bone, pose.rotation, pose.position, pose.scale);
        }
    }
}
