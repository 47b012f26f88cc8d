use glam::{Affine3A, Quat, Vec3};
use log::{debug, warn};
use rustc_hash::FxHashMap;

use crate::motion::{BoneChannelLayout, HumanBone};
use crate::retarget::reference::{ReferenceFrame, ReferencePoses};
use crate::skeleton::{BindPose, HumanoidRig};

/// Per-bone calibration captured once when an avatar is bound.
///
/// `rest_to_world` takes a reference-space rotation into the bone's
/// parent-local frame; `world_to_rest` takes the bone's own bind orientation
/// back out of the neutral reference. Composing a decoded rotation between the
/// two yields the parent-local rotation for this particular skeleton.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneCalibration {
    pub rest_to_world: Quat,
    pub world_to_rest: Quat,
    pub axis_sign: f32,
    /// Maps avatar-root space into the bone's parent space. Only used for
    /// bones that carry translation.
    pub parent_from_root: Affine3A,
}

impl BoneCalibration {
    pub const IDENTITY: Self = Self {
        rest_to_world: Quat::IDENTITY,
        world_to_rest: Quat::IDENTITY,
        axis_sign: 1.0,
        parent_from_root: Affine3A::IDENTITY,
    };

    /// Derives the calibration of one bone from its bind pose and reference frame.
    #[must_use]
    pub fn from_bind(bind: &BindPose, reference: &ReferenceFrame, flip_z: bool) -> Self {
        let (_, parent_rotation, _) = bind.parent_world.to_scale_rotation_translation();
        let (_, bone_rotation, _) = bind.world.to_scale_rotation_translation();

        let relaxed = to_target_handedness(reference.relaxed, flip_z).normalize();
        let neutral = to_target_handedness(reference.neutral, flip_z).normalize();

        Self {
            rest_to_world: (parent_rotation.inverse() * relaxed).normalize(),
            world_to_rest: (neutral.inverse() * bone_rotation).normalize(),
            axis_sign: reference.axis_sign,
            parent_from_root: bind.parent_world.inverse(),
        }
    }
}

impl Default for BoneCalibration {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Calibration table of one bound avatar. Read-only after construction.
#[derive(Debug, Clone)]
pub struct AvatarCalibration {
    bones: FxHashMap<HumanBone, BoneCalibration>,
    target_hip_height: f32,
}

impl AvatarCalibration {
    /// An empty table for an avatar whose hips stand `target_hip_height` above
    /// its root.
    #[must_use]
    pub fn new(target_hip_height: f32) -> Self {
        Self {
            bones: FxHashMap::default(),
            target_hip_height,
        }
    }

    /// Identity calibration for every slot of `layout`.
    #[must_use]
    pub fn identity(layout: &BoneChannelLayout, target_hip_height: f32) -> Self {
        let mut calibration = Self::new(target_hip_height);
        for slot in layout.slots() {
            calibration.insert(slot.bone, BoneCalibration::IDENTITY);
        }
        calibration
    }

    /// Calibrates every layout bone that exists both in the rig and in the
    /// reference table. Other bones are left out and will be skipped.
    pub fn compute<R: HumanoidRig + ?Sized>(
        rig: &R,
        layout: &BoneChannelLayout,
        references: &ReferencePoses,
        flip_z: bool,
    ) -> Self {
        let target_hip_height = match rig.bind_pose(HumanBone::Hips) {
            Some(bind) if bind.world.translation.y > f32::EPSILON => bind.world.translation.y,
            _ => {
                warn!("Rig has no usable hips height, assuming 1.0");
                1.0
            }
        };

        let mut calibration = Self::new(target_hip_height);
        for slot in layout.slots() {
            let Some(bind) = rig.bind_pose(slot.bone) else {
                debug!("Rig has no {} bone, it will not be driven", slot.bone);
                continue;
            };
            let Some(reference) = references.get(slot.bone) else {
                debug!("No reference frame for {}, it will not be driven", slot.bone);
                continue;
            };
            calibration.insert(slot.bone, BoneCalibration::from_bind(&bind, reference, flip_z));
        }

        debug!(
            "Calibrated {} of {} bones (hips height {:.3})",
            calibration.len(),
            layout.len(),
            target_hip_height
        );
        calibration
    }

    pub fn insert(&mut self, bone: HumanBone, calibration: BoneCalibration) {
        self.bones.insert(bone, calibration);
    }

    #[must_use]
    pub fn get(&self, bone: HumanBone) -> Option<&BoneCalibration> {
        self.bones.get(&bone)
    }

    #[inline]
    #[must_use]
    pub fn target_hip_height(&self) -> f32 {
        self.target_hip_height
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }
}

/// Mirrors a rotation across the XY plane (left-handed <-> right-handed).
#[inline]
#[must_use]
pub fn to_target_handedness(q: Quat, flip_z: bool) -> Quat {
    if flip_z {
        Quat::from_xyzw(-q.x, -q.y, q.z, q.w)
    } else {
        q
    }
}

/// Mirrors a position across the XY plane.
#[inline]
#[must_use]
pub fn to_target_handedness_vec(v: Vec3, flip_z: bool) -> Vec3 {
    if flip_z { Vec3::new(v.x, v.y, -v.z) } else { v }
}
