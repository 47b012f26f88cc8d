//! Pose Retargeting
//!
//! Drives arbitrarily proportioned humanoid skeletons from one generic motion
//! stream. Each avatar is calibrated once at bind time against two reference
//! poses; afterwards every frame is a pure function of the decoded samples and
//! the read-only calibration table.

pub mod calibration;
pub mod pose;
pub mod reference;
pub mod retargeter;

pub use calibration::{AvatarCalibration, BoneCalibration};
pub use pose::{BonePose, RetargetedPose};
pub use reference::{ReferenceFrame, ReferencePoses};
pub use retargeter::{PoseRetargeter, RetargetConfig, apply_calibration, unwrap_position};
