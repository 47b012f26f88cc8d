use glam::{Quat, Vec3};

use crate::errors::Result;
use crate::motion::{BoneChannelLayout, DEFAULT_TRANSLATION_PERIOD, MotionFrame, MotionSample};
use crate::retarget::calibration::{
    AvatarCalibration, BoneCalibration, to_target_handedness, to_target_handedness_vec,
};
use crate::retarget::pose::{BonePose, RetargetedPose};

/// Retargeting parameters shared by every avatar fed from one stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetargetConfig {
    /// Period of the encoder's position wraparound, per axis.
    pub wrap_period: f32,
    /// Hips height of the performer the stream was captured from.
    pub source_hip_height: f32,
    /// Convert the encoder's left-handed frame to a right-handed one.
    pub flip_z: bool,
}

impl Default for RetargetConfig {
    fn default() -> Self {
        Self {
            wrap_period: DEFAULT_TRANSLATION_PERIOD,
            source_hip_height: 1.0,
            flip_z: true,
        }
    }
}

/// Maps decoded motion samples onto one calibrated avatar.
///
/// Stateless apart from its configuration: the same retargeter can serve any
/// number of avatars, each with its own [`AvatarCalibration`].
#[derive(Debug, Clone, Default)]
pub struct PoseRetargeter {
    config: RetargetConfig,
}

impl PoseRetargeter {
    #[must_use]
    pub fn new(config: RetargetConfig) -> Self {
        Self { config }
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &RetargetConfig {
        &self.config
    }

    /// Decodes subject `layer` of `frame` through `layout` and retargets it.
    pub fn retarget(
        &self,
        frame: &MotionFrame,
        layout: &BoneChannelLayout,
        layer: usize,
        calibration: &AvatarCalibration,
    ) -> Result<RetargetedPose> {
        let samples = layout.samples(frame, layer)?;
        Ok(self.retarget_samples(&samples, calibration))
    }

    /// Retargets already split samples.
    #[must_use]
    pub fn retarget_samples(
        &self,
        samples: &[MotionSample],
        calibration: &AvatarCalibration,
    ) -> RetargetedPose {
        let mut pose = RetargetedPose::with_capacity(samples.len());
        self.retarget_samples_into(samples, calibration, &mut pose);
        pose
    }

    /// Like [`Self::retarget_samples`], reusing `pose`'s allocation.
    pub fn retarget_samples_into(
        &self,
        samples: &[MotionSample],
        calibration: &AvatarCalibration,
        pose: &mut RetargetedPose,
    ) {
        pose.bones.clear();
        let ratio = self.height_ratio(calibration);

        for sample in samples {
            let Some(bone_calibration) = calibration.get(sample.bone) else {
                continue;
            };
            pose.bones.push(self.retarget_bone(sample, bone_calibration, ratio));
        }
    }

    fn retarget_bone(&self, sample: &MotionSample, calibration: &BoneCalibration, ratio: f32) -> BonePose {
        let decoded = sample.rotation.resolve(calibration.axis_sign);
        let decoded = to_target_handedness(decoded, self.config.flip_z);
        let rotation = apply_calibration(calibration, decoded);

        let position = sample.translation.map(|t| {
            let t = to_target_handedness_vec(t, self.config.flip_z);
            let t = unwrap_position(t, self.config.wrap_period) * ratio;
            calibration.parent_from_root.transform_point3(t)
        });

        let scale = sample.scale.map(|s| s / ratio);

        BonePose {
            bone: sample.bone,
            rotation,
            position,
            scale,
        }
    }

    /// `target / source` hips height; 1 when either side is degenerate.
    #[must_use]
    pub fn height_ratio(&self, calibration: &AvatarCalibration) -> f32 {
        let source = self.config.source_hip_height;
        let target = calibration.target_hip_height();
        if source > f32::EPSILON && target > f32::EPSILON {
            target / source
        } else {
            1.0
        }
    }
}

/// Removes the encoder's position wraparound: each axis is shifted by the
/// nearest multiple of `period`, `t - round(t / period) * period`.
#[must_use]
pub fn unwrap_position(t: Vec3, period: f32) -> Vec3 {
    if period <= 0.0 {
        return t;
    }
    t - (t / period).round() * period
}

/// `rest_to_world * rotation * world_to_rest` without the rest of the pipeline.
#[inline]
#[must_use]
pub fn apply_calibration(calibration: &BoneCalibration, rotation: Quat) -> Quat {
    (calibration.rest_to_world * rotation * calibration.world_to_rest).normalize()
}
