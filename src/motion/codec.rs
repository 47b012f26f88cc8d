//! Motion Texture Codec
//!
//! Every channel of a motion texture occupies one RGBA8 pixel. The four bytes
//! form a 32-bit fixed-point number with scale 1/64 and bias -1:
//!
//! ```text
//! value = R/64 + G/16384 + B/4194304 + A/1073741824 - 1
//! ```
//!
//! `R` carries the integer steps of 1/64, `G`, `B` and `A` refine the fraction
//! as successive base-256 residues. The representable range is
//! `[-1, 3 - 2^-30]` with a quantization step of `2^-30`.
//!
//! Pixels are consumed in row-major order; which channel belongs to which bone
//! is decided by a [`BoneChannelLayout`](super::layout::BoneChannelLayout), never
//! by the texture geometry.

use crate::errors::{MocapError, Result};
use crate::motion::frame::MotionFrame;
use crate::motion::layout::BoneChannelLayout;

/// Bytes per encoded channel (one RGBA8 pixel).
pub const BYTES_PER_CHANNEL: usize = 4;

/// Smallest encodable channel value.
pub const CHANNEL_MIN: f32 = -1.0;

/// Largest encodable channel value, rounded to `f32`.
///
/// The exact ceiling is `3 - 2^-30`; values above it saturate.
pub const CHANNEL_MAX: f32 = 3.0;

const R_SCALE: f64 = 64.0;
const G_SCALE: f64 = 16_384.0;
const B_SCALE: f64 = 4_194_304.0;
const A_SCALE: f64 = 1_073_741_824.0;

// (value + 1) * 64 must stay below 256 so R fits in a byte.
const T_MAX: f64 = 256.0 - 1.0 / 16_777_216.0;

/// Decodes one RGBA8 pixel into a channel value.
#[inline]
#[must_use]
pub fn decode_value(pixel: [u8; 4]) -> f32 {
    let [r, g, b, a] = pixel;
    let value = f64::from(r) / R_SCALE
        + f64::from(g) / G_SCALE
        + f64::from(b) / B_SCALE
        + f64::from(a) / A_SCALE
        - 1.0;
    value as f32
}

/// Encodes a channel value into one RGBA8 pixel.
///
/// Values outside the representable range are clamped. `NaN` encodes as `0.0`.
#[must_use]
pub fn encode_value(value: f32) -> [u8; 4] {
    let value = if value.is_nan() { 0.0 } else { f64::from(value) };
    let t = ((value + 1.0) * R_SCALE).clamp(0.0, T_MAX);

    let r = t.floor();
    let rest = (t - r) * 256.0;
    let g = rest.floor();
    let rest = (rest - g) * 256.0;
    let b = rest.floor();
    let rest = (rest - b) * 256.0;
    let a = rest.floor();

    [r as u8, g as u8, b as u8, a as u8]
}

/// Decodes a full RGBA8 buffer of `width * height` pixels into a new frame.
pub fn decode(pixels: &[u8], width: u32, height: u32) -> Result<MotionFrame> {
    let mut frame = MotionFrame::default();
    decode_into(pixels, width, height, &mut frame)?;
    Ok(frame)
}

/// Encodes a flat channel slice into an RGBA8 buffer, one pixel per channel.
#[must_use]
pub fn encode(channels: &[f32]) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(channels.len() * BYTES_PER_CHANNEL);
    for &value in channels {
        pixels.extend_from_slice(&encode_value(value));
    }
    pixels
}

fn decode_into(pixels: &[u8], width: u32, height: u32, frame: &mut MotionFrame) -> Result<()> {
    let channel_count = channel_count(width, height)?;
    let expected = channel_count * BYTES_PER_CHANNEL;
    if pixels.len() != expected {
        return Err(MocapError::PixelBufferSize {
            expected,
            actual: pixels.len(),
        });
    }

    let texels: &[[u8; 4]] = bytemuck::cast_slice(pixels);
    let channels = frame.reset(channel_count);
    for (dst, &texel) in channels.iter_mut().zip(texels) {
        *dst = decode_value(texel);
    }
    Ok(())
}

fn channel_count(width: u32, height: u32) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(MocapError::InvalidDimensions { width, height });
    }
    Ok(width as usize * height as usize)
}

/// A reusable decoder bound to fixed texture dimensions.
///
/// Each codec owns the scratch frame it decodes into, so repeated decoding
/// allocates only once. Independent avatars use independent codecs.
#[derive(Debug, Clone)]
pub struct MotionTextureCodec {
    width: u32,
    height: u32,
    frame: MotionFrame,
}

impl MotionTextureCodec {
    /// Creates a codec for a `width x height` motion texture.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let channels = channel_count(width, height)?;
        Ok(Self {
            width,
            height,
            frame: MotionFrame::zeroed(channels),
        })
    }

    /// Creates a codec sized for `layers` stacked copies of `layout`.
    pub fn for_layout(layout: &BoneChannelLayout, layers: usize) -> Result<Self> {
        let (width, height) = layout.texture_size(layers);
        Self::new(width, height)
    }

    #[inline]
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of channels one texture carries.
    #[inline]
    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// The most recently decoded frame.
    #[inline]
    #[must_use]
    pub fn frame(&self) -> &MotionFrame {
        &self.frame
    }

    /// Decodes `pixels` into the codec's scratch frame.
    ///
    /// On error the scratch frame keeps its previous contents.
    pub fn decode(&mut self, pixels: &[u8]) -> Result<&MotionFrame> {
        decode_into(pixels, self.width, self.height, &mut self.frame)?;
        Ok(&self.frame)
    }

    /// Encodes a frame into an RGBA8 buffer matching this codec's dimensions.
    pub fn encode(&self, frame: &MotionFrame) -> Result<Vec<u8>> {
        if frame.len() != self.channel_count() {
            return Err(MocapError::ChannelCountMismatch {
                expected: self.channel_count(),
                actual: frame.len(),
            });
        }
        Ok(encode(frame.channels()))
    }
}
