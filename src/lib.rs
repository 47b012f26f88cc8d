#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

//! Motion texture decoding and humanoid pose retargeting.
//!
//! A performer's motion arrives as a small RGBA8 texture. This crate decodes
//! it into per-bone channels, reconstructs rotations, retargets them onto any
//! calibrated humanoid skeleton and optionally records the result as a clip.
//!
//! ```text
//! pixels ─▶ MotionTextureCodec ─▶ MotionFrame ─▶ BoneChannelLayout ─▶ [MotionSample]
//!        ─▶ PoseRetargeter ─▶ RetargetedPose ─▶ HumanoidRig / ClipRecorder
//! ```

pub mod animation;
pub mod avatar;
pub mod config;
pub mod errors;
pub mod motion;
pub mod retarget;
pub mod skeleton;

pub use animation::{AnimationClip, Clip, ClipPlayback, ClipRecorder, LoopMode};
pub use avatar::{Avatar, PixelSource};
pub use config::MotionConfig;
pub use errors::{MocapError, Result};
pub use motion::{
    BoneChannelLayout, HumanBone, MotionFrame, MotionSample, MotionTextureCodec, RotationEncoding,
};
pub use retarget::{AvatarCalibration, BoneCalibration, PoseRetargeter, RetargetedPose};
pub use skeleton::{HumanoidRig, Skeleton};
