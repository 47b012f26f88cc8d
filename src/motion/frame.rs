/// One decoded snapshot of a motion texture.
///
/// A flat sequence of channel values in texture order. Its length is fixed by
/// the texture dimensions; the layout that interprets it checks that the length
/// is a whole number of layout copies.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MotionFrame {
    channels: Vec<f32>,
}

impl MotionFrame {
    #[must_use]
    pub fn new(channels: Vec<f32>) -> Self {
        Self { channels }
    }

    /// A frame of `len` channels, all zero.
    #[must_use]
    pub fn zeroed(len: usize) -> Self {
        Self {
            channels: vec![0.0; len],
        }
    }

    #[inline]
    #[must_use]
    pub fn channels(&self) -> &[f32] {
        &self.channels
    }

    #[inline]
    pub fn channels_mut(&mut self) -> &mut [f32] {
        &mut self.channels
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Resizes to `len` channels, reusing the allocation.
    pub(crate) fn reset(&mut self, len: usize) -> &mut [f32] {
        self.channels.resize(len, 0.0);
        &mut self.channels
    }
}

impl From<Vec<f32>> for MotionFrame {
    fn from(channels: Vec<f32>) -> Self {
        Self::new(channels)
    }
}
