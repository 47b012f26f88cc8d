//! Motion Stream Decoding
//!
//! Turns the RGBA8 pixels of a motion texture into per-bone motion samples:
//!
//! ```text
//! pixels ──codec──▶ MotionFrame ──layout──▶ [MotionSample] ──swing──▶ Quat
//! ```

pub mod codec;
pub mod frame;
pub mod layout;
pub mod swing;

pub use codec::{MotionTextureCodec, decode, decode_value, encode, encode_value};
pub use frame::MotionFrame;
pub use layout::{
    BoneChannelLayout, BoneSlot, CHANNEL_STRIDE, DEFAULT_TRANSLATION_PERIOD, HumanBone,
    MotionSample, RotationEncoding, SlotArity,
};
pub use swing::{reconstruct_swing, swing_from_rotation};
