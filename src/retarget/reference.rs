//! Reference Poses
//!
//! For every humanoid bone, the orientation a generic skeleton gives that bone
//! in two reference poses: *relaxed* (arms down, fingers curled) and *neutral*
//! (T-pose). The motion stream is expressed relative to these frames, so the
//! table must match the encoder bit for bit. Quaternions are stored in the
//! encoder's left-handed convention as `[x, y, z, w]`.

use glam::Quat;
use rustc_hash::FxHashMap;

use crate::motion::HumanBone;

/// Reference orientations of one bone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceFrame {
    pub relaxed: Quat,
    pub neutral: Quat,
    /// `-1` for bones whose swing channels are mirrored.
    pub axis_sign: f32,
}

impl ReferenceFrame {
    pub const IDENTITY: Self = Self {
        relaxed: Quat::IDENTITY,
        neutral: Quat::IDENTITY,
        axis_sign: 1.0,
    };

    const fn from_table(relaxed: [f32; 4], neutral: [f32; 4], axis_sign: f32) -> Self {
        Self {
            relaxed: Quat::from_array(relaxed),
            neutral: Quat::from_array(neutral),
            axis_sign,
        }
    }
}

/// Reference frames keyed by bone.
#[derive(Debug, Clone, Default)]
pub struct ReferencePoses {
    frames: FxHashMap<HumanBone, ReferenceFrame>,
}

impl ReferencePoses {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in humanoid table. `Jaw` has no reference and is never driven.
    #[must_use]
    pub fn humanoid() -> Self {
        let frames = HumanBone::ALL
            .iter()
            .zip(HUMANOID_REFERENCES.iter())
            .filter_map(|(&bone, frame)| frame.map(|f| (bone, f)))
            .collect();
        Self { frames }
    }

    /// The same frame for every bone in `bones`.
    #[must_use]
    pub fn uniform(bones: &[HumanBone], frame: ReferenceFrame) -> Self {
        Self {
            frames: bones.iter().map(|&b| (b, frame)).collect(),
        }
    }

    pub fn insert(&mut self, bone: HumanBone, frame: ReferenceFrame) {
        self.frames.insert(bone, frame);
    }

    #[must_use]
    pub fn get(&self, bone: HumanBone) -> Option<&ReferenceFrame> {
        self.frames.get(&bone)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

const fn r(relaxed: [f32; 4], neutral: [f32; 4], axis_sign: f32) -> Option<ReferenceFrame> {
    Some(ReferenceFrame::from_table(relaxed, neutral, axis_sign))
}

// Indexed by `HumanBone::index()`.
#[rustfmt::skip]
const HUMANOID_REFERENCES: [Option<ReferenceFrame>; HumanBone::COUNT] = [
    r([ 0.00000,  0.00000,  0.00000,  1.00000], [ 0.00000,  0.00000,  0.00000,  1.00000],  1.0), // Hips
    r([-0.62644,  0.34855, -0.59144,  0.36918], [-0.50952,  0.48977, -0.48105,  0.51876],  1.0), // LeftUpperLeg
    r([ 0.36918,  0.59144,  0.34855,  0.62644], [ 0.51876,  0.48105,  0.48977,  0.50952],  1.0), // RightUpperLeg
    r([ 0.71450, -0.04313, -0.69691,  0.04422], [ 0.51894, -0.48097, -0.50616,  0.49312],  1.0), // LeftLowerLeg
    r([ 0.04422,  0.69691, -0.04313, -0.71450], [ 0.49312,  0.50616, -0.48097, -0.51894],  1.0), // RightLowerLeg
    r([-0.50000,  0.50000, -0.50000,  0.50000], [-0.50000,  0.50000, -0.50000,  0.50000],  1.0), // LeftFoot
    r([ 0.50000,  0.50000,  0.50000,  0.50000], [ 0.50000,  0.50000,  0.50000,  0.50000],  1.0), // RightFoot
    r([ 0.46815,  0.52994, -0.46815, -0.52994], [ 0.46815,  0.52994, -0.46815, -0.52994],  1.0), // Spine
    r([ 0.52661,  0.47189, -0.52661, -0.47189], [ 0.52661,  0.47189, -0.52661, -0.47189],  1.0), // Chest
    r([ 0.46642,  0.53160, -0.46748, -0.53040], [ 0.46642,  0.53160, -0.46748, -0.53040],  1.0), // Neck
    r([-0.50000, -0.50000,  0.50000,  0.50000], [-0.50000, -0.50000,  0.50000,  0.50000],  1.0), // Head
    r([ 0.00261, -0.03047, -0.08517, -0.99590], [ 0.00261, -0.03047, -0.08517, -0.99590], -1.0), // LeftShoulder
    r([ 0.99590, -0.08518,  0.03047,  0.00261], [ 0.99590, -0.08518,  0.03047,  0.00261], -1.0), // RightShoulder
    r([-0.00420, -0.24793, -0.35282, -0.90224], [ 0.00010, -0.00419, -0.02326, -0.99972], -1.0), // LeftUpperArm
    r([ 0.90224, -0.35282,  0.24793, -0.00420], [ 0.99972, -0.02326,  0.00419,  0.00010], -1.0), // RightUpperArm
    r([ 0.52201, -0.47584, -0.47697, -0.52305], [ 0.70648, -0.02834, -0.02988, -0.70654], -1.0), // LeftLowerArm
    r([ 0.52305, -0.47697,  0.47584,  0.52202], [ 0.70654, -0.02988,  0.02834,  0.70648], -1.0), // RightLowerArm
    r([ 0.00004, -0.04117, -0.00109, -0.99915], [ 0.00004, -0.04117, -0.00109, -0.99915], -1.0), // LeftHand
    r([ 0.99915, -0.00109,  0.04117,  0.00004], [ 0.99915, -0.00109,  0.04117,  0.00004], -1.0), // RightHand
    r([ 0.70711,  0.00000,  0.70711,  0.00000], [ 0.70711,  0.00000,  0.70711,  0.00000],  1.0), // LeftToes
    r([ 0.00000, -0.70711,  0.00000, -0.70711], [ 0.00000, -0.70711,  0.00000, -0.70711],  1.0), // RightToes
    r([-0.70711,  0.00000,  0.70711,  0.00000], [-0.70711,  0.00000,  0.70711,  0.00000],  1.0), // LeftEye
    r([ 0.00000,  0.70711,  0.00000, -0.70711], [ 0.00000,  0.70711,  0.00000, -0.70711],  1.0), // RightEye
    None,                                                                                          // Jaw
    r([-0.58070, -0.45060,  0.25516, -0.62821], [-0.65871, -0.29491,  0.25711, -0.64267], -1.0), // LeftThumbProximal
    r([-0.70013, -0.13590,  0.09906, -0.69392], [-0.66711, -0.26935,  0.23444, -0.65380], -1.0), // LeftThumbIntermediate
    r([-0.70013, -0.13590,  0.09906, -0.69392], [-0.66711, -0.26935,  0.23444, -0.65380], -1.0), // LeftThumbDistal
    r([ 0.15036,  0.02227,  0.94561, -0.28760], [ 0.07773,  0.00016,  0.99697, -0.00204], -1.0), // LeftIndexProximal
    r([ 0.05321,  0.01854,  0.94281, -0.32854], [ 0.05634,  0.00093,  0.99827, -0.01654], -1.0), // LeftIndexIntermediate
    r([ 0.05321,  0.01854,  0.94281, -0.32854], [ 0.05634,  0.00093,  0.99827, -0.01654], -1.0), // LeftIndexDistal
    r([ 0.06963,  0.00934,  0.94994, -0.30443], [ 0.03295,  0.00060,  0.99929, -0.01826], -1.0), // LeftMiddleProximal
    r([ 0.01913,  0.00746,  0.93156, -0.36300], [ 0.02051,  0.00108,  0.99839, -0.05279], -1.0), // LeftMiddleIntermediate
    r([ 0.01913,  0.00746,  0.93156, -0.36300], [ 0.02051,  0.00108,  0.99839, -0.05279], -1.0), // LeftMiddleDistal
    r([ 0.00104,  0.03589, -0.29463, -0.95494], [ 0.00002, -0.00251, -0.00784, -0.99997], -1.0), // LeftRingProximal
    r([ 0.00186, -0.00600, -0.29653, -0.95500], [-0.00011, -0.00628,  0.01768, -0.99982], -1.0), // LeftRingIntermediate
    r([ 0.00186, -0.00600, -0.29653, -0.95500], [-0.00011, -0.00628,  0.01768, -0.99982], -1.0), // LeftRingDistal
    r([ 0.00044,  0.07607, -0.29066, -0.95380], [ 0.00000, -0.00035, -0.00435, -0.99999], -1.0), // LeftLittleProximal
    r([-0.00770,  0.02491, -0.29538, -0.95502], [ 0.00049,  0.02607,  0.01878, -0.99948], -1.0), // LeftLittleIntermediate
    r([-0.00770,  0.02491, -0.29538, -0.95502], [ 0.00049,  0.02607,  0.01878, -0.99948], -1.0), // LeftLittleDistal
    r([ 0.62827,  0.25540,  0.45053, -0.58057], [-0.64270, -0.25738, -0.29486,  0.65860], -1.0), // RightThumbProximal
    r([ 0.69394,  0.09930,  0.13583, -0.70010], [-0.65382, -0.23468, -0.26929,  0.66703], -1.0), // RightThumbIntermediate
    r([ 0.69394,  0.09930,  0.13583, -0.70010], [-0.65382, -0.23468, -0.26929,  0.66703], -1.0), // RightThumbDistal
    r([-0.28761, -0.94561,  0.02227, -0.15036], [ 0.00204,  0.99697, -0.00016,  0.07773], -1.0), // RightIndexProximal
    r([-0.32854, -0.94281,  0.01854, -0.05320], [ 0.01654,  0.99827, -0.00093,  0.05633], -1.0), // RightIndexIntermediate
    r([-0.32854, -0.94281,  0.01854, -0.05320], [ 0.01654,  0.99827, -0.00093,  0.05633], -1.0), // RightIndexDistal
    r([-0.30443, -0.94994,  0.00934, -0.06962], [ 0.01826,  0.99929, -0.00060,  0.03295], -1.0), // RightMiddleProximal
    r([-0.36299, -0.93157,  0.00746, -0.01913], [ 0.05278,  0.99840, -0.00108,  0.02050], -1.0), // RightMiddleIntermediate
    r([-0.36299, -0.93157,  0.00746, -0.01913], [ 0.05278,  0.99840, -0.00108,  0.02050], -1.0), // RightMiddleDistal
    r([-0.95494,  0.29463,  0.03589, -0.00104], [ 0.99997, -0.00784,  0.00251,  0.00002], -1.0), // RightRingProximal
    r([-0.95500,  0.29654, -0.00599, -0.00186], [ 0.99982,  0.01767,  0.00627, -0.00011], -1.0), // RightRingIntermediate
    r([-0.95500,  0.29654, -0.00599, -0.00186], [ 0.99982,  0.01767,  0.00627, -0.00011], -1.0), // RightRingDistal
    r([-0.95380,  0.29066,  0.07606, -0.00044], [ 0.99999, -0.00435,  0.00036,  0.00000], -1.0), // RightLittleProximal
    r([-0.95503,  0.29537,  0.02490,  0.00770], [ 0.99948,  0.01879, -0.02606,  0.00049], -1.0), // RightLittleIntermediate
    r([-0.95503,  0.29537,  0.02490,  0.00770], [ 0.99948,  0.01879, -0.02606,  0.00049], -1.0), // RightLittleDistal
    r([ 0.56563,  0.42434, -0.56563, -0.42434], [ 0.56563,  0.42434, -0.56563, -0.42434],  1.0), // UpperChest
];
