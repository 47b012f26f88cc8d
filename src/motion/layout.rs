//! Bone Channel Layout
//!
//! Maps the flat channels of a [`MotionFrame`] onto humanoid bones. The layout
//! is the one bit-exact compatibility surface between whatever renders the
//! motion texture and this decoder: slot order and arity must match on both
//! sides, and any disagreement in channel count is a hard error.
//!
//! Every slot spans [`CHANNEL_STRIDE`] channels:
//!
//! | offset | full slot (hips)  | swing slot |
//! |--------|-------------------|------------|
//! | 0..3   | translation xyz   | unused     |
//! | 3..7   | rotation xyzw     | swing xyz + unused |
//! | 7      | uniform scale     | unused     |
//!
//! Translations are quantized over the layout's translation period: each axis
//! is reduced modulo the period and mapped onto `[0, CHANNEL_MAX)`. Decoded
//! translations therefore lie in `[0, period)`; the retargeter's wraparound
//! correction re-centres them.

use std::fmt;
use std::str::FromStr;

use glam::{Quat, Vec3};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::errors::{MocapError, Result};
use crate::motion::codec::CHANNEL_MAX;
use crate::motion::frame::MotionFrame;
use crate::motion::swing::{reconstruct_swing, swing_from_rotation};

/// Channels reserved per bone slot.
pub const CHANNEL_STRIDE: usize = 8;

const TRANSLATION_OFFSET: usize = 0;
const ROTATION_OFFSET: usize = 3;
const SCALE_OFFSET: usize = 7;

/// Default period over which translations are quantized.
pub const DEFAULT_TRANSLATION_PERIOD: f32 = 10.0;

macro_rules! humanoid_bones {
    ($($bone:ident),* $(,)?) => {
        /// The canonical humanoid bone set, in stream order.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum HumanBone {
            $($bone,)*
        }

        impl HumanBone {
            /// All bones in canonical order.
            pub const ALL: &'static [HumanBone] = &[$(HumanBone::$bone,)*];

            /// The bone's canonical name, e.g. `"LeftUpperArm"`.
            #[must_use]
            pub fn name(self) -> &'static str {
                match self {
                    $(HumanBone::$bone => stringify!($bone),)*
                }
            }
        }

        impl FromStr for HumanBone {
            type Err = MocapError;

            fn from_str(s: &str) -> Result<Self> {
                match s {
                    $(stringify!($bone) => Ok(HumanBone::$bone),)*
                    _ => Err(MocapError::UnknownBone(s.to_string())),
                }
            }
        }
    };
}

humanoid_bones! {
    Hips,
    LeftUpperLeg, RightUpperLeg,
    LeftLowerLeg, RightLowerLeg,
    LeftFoot, RightFoot,
    Spine,
    Chest,
    Neck,
    Head,
    LeftShoulder, RightShoulder,
    LeftUpperArm, RightUpperArm,
    LeftLowerArm, RightLowerArm,
    LeftHand, RightHand,
    LeftToes, RightToes,
    LeftEye, RightEye,
    Jaw,
    LeftThumbProximal, LeftThumbIntermediate, LeftThumbDistal,
    LeftIndexProximal, LeftIndexIntermediate, LeftIndexDistal,
    LeftMiddleProximal, LeftMiddleIntermediate, LeftMiddleDistal,
    LeftRingProximal, LeftRingIntermediate, LeftRingDistal,
    LeftLittleProximal, LeftLittleIntermediate, LeftLittleDistal,
    RightThumbProximal, RightThumbIntermediate, RightThumbDistal,
    RightIndexProximal, RightIndexIntermediate, RightIndexDistal,
    RightMiddleProximal, RightMiddleIntermediate, RightMiddleDistal,
    RightRingProximal, RightRingIntermediate, RightRingDistal,
    RightLittleProximal, RightLittleIntermediate, RightLittleDistal,
    UpperChest,
}

impl HumanBone {
    /// Number of bones in the canonical set.
    pub const COUNT: usize = Self::ALL.len();

    /// Position in canonical order.
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for HumanBone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a slot carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotArity {
    /// Translation, explicit rotation quaternion and uniform scale.
    Full,
    /// Swing vector only; twist is implied.
    Swing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoneSlot {
    pub bone: HumanBone,
    pub arity: SlotArity,
}

/// How a sample's rotation was transmitted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RotationEncoding {
    /// A complete quaternion.
    Explicit(Quat),
    /// The vector part of a quaternion whose twist must be reconstructed.
    Swing(Vec3),
}

impl RotationEncoding {
    /// Resolves to a quaternion. `axis_sign` mirrors swing vectors of
    /// left/right limbs into one canonical channel definition.
    #[must_use]
    pub fn resolve(self, axis_sign: f32) -> Quat {
        match self {
            RotationEncoding::Explicit(q) => q,
            RotationEncoding::Swing(s) => reconstruct_swing(s * axis_sign),
        }
    }
}

/// One bone's decoded motion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionSample {
    pub bone: HumanBone,
    pub translation: Option<Vec3>,
    pub rotation: RotationEncoding,
    pub scale: Option<f32>,
}

impl MotionSample {
    /// A swing-only sample.
    #[must_use]
    pub fn swing(bone: HumanBone, swing: Vec3) -> Self {
        Self {
            bone,
            translation: None,
            rotation: RotationEncoding::Swing(swing),
            scale: None,
        }
    }

    /// A full translation / rotation / scale sample.
    #[must_use]
    pub fn full(bone: HumanBone, translation: Vec3, rotation: Quat, scale: f32) -> Self {
        Self {
            bone,
            translation: Some(translation),
            rotation: RotationEncoding::Explicit(rotation),
            scale: Some(scale),
        }
    }
}

/// Ordered bone slots shared by encoder and decoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoneChannelLayout {
    slots: Vec<BoneSlot>,
    translation_period: f32,
}

impl BoneChannelLayout {
    /// Builds a layout, rejecting empty slot lists and repeated bones.
    pub fn new(slots: Vec<BoneSlot>) -> Result<Self> {
        if slots.is_empty() {
            return Err(MocapError::InvalidLayout("layout has no slots".to_string()));
        }
        let mut seen = FxHashSet::default();
        for slot in &slots {
            if !seen.insert(slot.bone) {
                return Err(MocapError::InvalidLayout(format!(
                    "bone {} declared twice",
                    slot.bone
                )));
            }
        }
        Ok(Self {
            slots,
            translation_period: DEFAULT_TRANSLATION_PERIOD,
        })
    }

    /// Sets the period translations are quantized over. Must match the
    /// encoder and the retargeter's wrap period.
    pub fn with_translation_period(mut self, period: f32) -> Result<Self> {
        if !(period.is_finite() && period > 0.0) {
            return Err(MocapError::InvalidLayout(format!(
                "translation period must be positive, got {period}"
            )));
        }
        self.translation_period = period;
        Ok(self)
    }

    /// The canonical 55-bone humanoid layout: hips carry full motion, every
    /// other bone a swing vector.
    #[must_use]
    pub fn humanoid() -> Self {
        let slots = HumanBone::ALL
            .iter()
            .map(|&bone| BoneSlot {
                bone,
                arity: if bone == HumanBone::Hips {
                    SlotArity::Full
                } else {
                    SlotArity::Swing
                },
            })
            .collect();
        Self {
            slots,
            translation_period: DEFAULT_TRANSLATION_PERIOD,
        }
    }

    #[inline]
    #[must_use]
    pub fn slots(&self) -> &[BoneSlot] {
        &self.slots
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn translation_period(&self) -> f32 {
        self.translation_period
    }

    #[inline]
    #[must_use]
    pub fn stride(&self) -> usize {
        CHANNEL_STRIDE
    }

    /// Channels one subject occupies.
    #[inline]
    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.slots.len() * CHANNEL_STRIDE
    }

    /// Texture size holding `layers` subjects: one slot per row.
    #[must_use]
    pub fn texture_size(&self, layers: usize) -> (u32, u32) {
        (CHANNEL_STRIDE as u32, (self.slots.len() * layers.max(1)) as u32)
    }

    /// Number of subjects in `frame`, or an error if its length is not a whole
    /// number of layout copies.
    pub fn layer_count(&self, frame: &MotionFrame) -> Result<usize> {
        let per_layer = self.channel_count();
        if frame.is_empty() || frame.len() % per_layer != 0 {
            return Err(MocapError::ChannelCountMismatch {
                expected: per_layer,
                actual: frame.len(),
            });
        }
        Ok(frame.len() / per_layer)
    }

    fn layer_range(&self, frame: &MotionFrame, layer: usize) -> Result<std::ops::Range<usize>> {
        let layers = self.layer_count(frame)?;
        if layer >= layers {
            return Err(MocapError::LayerOutOfRange { layer, layers });
        }
        let start = layer * self.channel_count();
        Ok(start..start + self.channel_count())
    }

    /// Splits one subject of `frame` into per-bone samples, in slot order.
    pub fn samples(&self, frame: &MotionFrame, layer: usize) -> Result<Vec<MotionSample>> {
        let range = self.layer_range(frame, layer)?;
        let channels = &frame.channels()[range];

        let samples = self
            .slots
            .iter()
            .zip(channels.chunks_exact(CHANNEL_STRIDE))
            .map(|(slot, c)| read_slot(*slot, c, self.translation_period))
            .collect();
        Ok(samples)
    }

    /// Writes samples into one subject of `frame`.
    ///
    /// Samples are matched to slots by bone; bones absent from the layout are
    /// ignored. Rotations are converted to the slot's arity.
    pub fn write_samples(
        &self,
        samples: &[MotionSample],
        frame: &mut MotionFrame,
        layer: usize,
    ) -> Result<()> {
        let range = self.layer_range(frame, layer)?;
        let channels = &mut frame.channels_mut()[range];

        for sample in samples {
            let Some(index) = self.slots.iter().position(|s| s.bone == sample.bone) else {
                continue;
            };
            let slot = self.slots[index];
            let c = &mut channels[index * CHANNEL_STRIDE..(index + 1) * CHANNEL_STRIDE];
            write_slot(slot, sample, c, self.translation_period);
        }
        Ok(())
    }

    /// A zeroed frame holding `layers` subjects with every slot at rest.
    #[must_use]
    pub fn rest_frame(&self, layers: usize) -> MotionFrame {
        let layers = layers.max(1);
        let mut frame = MotionFrame::zeroed(self.channel_count() * layers);
        for layer in 0..layers {
            let start = layer * self.channel_count();
            for (i, slot) in self.slots.iter().enumerate() {
                if slot.arity == SlotArity::Full {
                    let base = start + i * CHANNEL_STRIDE;
                    let c = &mut frame.channels_mut()[base..base + CHANNEL_STRIDE];
                    c[ROTATION_OFFSET + 3] = 1.0;
                    c[SCALE_OFFSET] = 1.0;
                }
            }
        }
        frame
    }
}

/// Maps a translation onto channel values in `[0, CHANNEL_MAX)`.
fn quantize_translation(t: Vec3, period: f32) -> Vec3 {
    t.rem_euclid(Vec3::splat(period)) * (CHANNEL_MAX / period)
}

/// Inverse of [`quantize_translation`], yielding values in `[0, period)`.
fn dequantize_translation(c: Vec3, period: f32) -> Vec3 {
    c * (period / CHANNEL_MAX)
}

fn read_slot(slot: BoneSlot, c: &[f32], period: f32) -> MotionSample {
    let r = &c[ROTATION_OFFSET..ROTATION_OFFSET + 4];
    match slot.arity {
        SlotArity::Full => {
            let t = &c[TRANSLATION_OFFSET..TRANSLATION_OFFSET + 3];
            let q = Quat::from_xyzw(r[0], r[1], r[2], r[3]);
            // An all-zero rotation means the encoder left the slot blank.
            let q = if q.length_squared() > f32::EPSILON {
                q.normalize()
            } else {
                Quat::IDENTITY
            };
            MotionSample {
                bone: slot.bone,
                translation: Some(dequantize_translation(Vec3::new(t[0], t[1], t[2]), period)),
                rotation: RotationEncoding::Explicit(q),
                scale: Some(c[SCALE_OFFSET]),
            }
        }
        SlotArity::Swing => MotionSample::swing(slot.bone, Vec3::new(r[0], r[1], r[2])),
    }
}

fn write_slot(slot: BoneSlot, sample: &MotionSample, c: &mut [f32], period: f32) {
    c.fill(0.0);
    match slot.arity {
        SlotArity::Full => {
            let t = quantize_translation(sample.translation.unwrap_or(Vec3::ZERO), period);
            let q = sample.rotation.resolve(1.0);
            c[TRANSLATION_OFFSET..TRANSLATION_OFFSET + 3].copy_from_slice(&t.to_array());
            c[ROTATION_OFFSET..ROTATION_OFFSET + 4].copy_from_slice(&q.to_array());
            c[SCALE_OFFSET] = sample.scale.unwrap_or(1.0);
        }
        SlotArity::Swing => {
            let s = match sample.rotation {
                RotationEncoding::Swing(s) => s,
                RotationEncoding::Explicit(q) => swing_from_rotation(q),
            };
            c[ROTATION_OFFSET..ROTATION_OFFSET + 3].copy_from_slice(&s.to_array());
        }
    }
}
