use serde::{Deserialize, Serialize};

use crate::animation::values::Interpolatable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterpolationMode {
    Linear,
    Step,
    /// glTF-style cubic spline: `values` holds `[in, value, out]` per key.
    CubicSpline,
}

// How far the cursor scans around its last position before falling back to
// a binary search.
const MAX_SCAN_OFFSET: usize = 3;

/// Remembers the last keyframe interval a track was sampled in.
///
/// Playback is almost always monotonic, so the next sample usually lands in
/// the same or the following interval.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyframeCursor {
    pub last_index: usize,
}

#[derive(Debug, Clone)]
pub struct KeyframeTrack<T: Interpolatable> {
    pub times: Vec<f32>,
    pub values: Vec<T>,
    pub interpolation: InterpolationMode,
}

impl<T: Interpolatable> KeyframeTrack<T> {
    #[must_use]
    pub fn new(times: Vec<f32>, values: Vec<T>, interpolation: InterpolationMode) -> Self {
        Self {
            times,
            values,
            interpolation,
        }
    }

    /// Time of the last keyframe, or 0 for an empty track.
    #[must_use]
    pub fn end_time(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }

    /// Stateless sampling (binary search). An empty track samples as `T::default()`.
    #[must_use]
    pub fn sample(&self, time: f32) -> T {
        if self.times.is_empty() {
            return T::default();
        }
        let index = self.times.partition_point(|&t| t <= time).saturating_sub(1);
        self.sample_at_frame(index, time)
    }

    /// Sampling accelerated by `cursor`, which is updated in place.
    pub fn sample_with_cursor(&self, time: f32, cursor: &mut KeyframeCursor) -> T {
        match self.times.len() {
            0 => T::default(),
            1 => self.value_at(0),
            _ => {
                let index = self.locate(time, cursor.last_index);
                cursor.last_index = index;
                self.sample_at_frame(index, time)
            }
        }
    }

    /// Index of the keyframe interval containing `time`, searching near `hint`
    /// first.
    fn locate(&self, time: f32, hint: usize) -> usize {
        let last = self.times.len() - 1;
        let hint = hint.min(last);

        if time >= self.times[hint] {
            let end = (hint + MAX_SCAN_OFFSET + 1).min(last);
            for index in hint..end {
                if time < self.times[index + 1] {
                    return index;
                }
            }
        } else {
            let start = hint.saturating_sub(MAX_SCAN_OFFSET);
            for index in (start..hint).rev() {
                if time >= self.times[index] {
                    return index;
                }
            }
        }

        self.times.partition_point(|&t| t <= time).saturating_sub(1)
    }

    fn value_at(&self, index: usize) -> T {
        match self.interpolation {
            InterpolationMode::CubicSpline => self.values[index * 3 + 1],
            InterpolationMode::Linear | InterpolationMode::Step => self.values[index],
        }
    }

    fn sample_at_frame(&self, index: usize, time: f32) -> T {
        let last = self.times.len() - 1;
        if index >= last {
            return self.value_at(last);
        }

        let next = index + 1;
        let t0 = self.times[index];
        let dt = self.times[next] - t0;
        let t = if dt > 1e-6 { ((time - t0) / dt).clamp(0.0, 1.0) } else { 0.0 };

        match self.interpolation {
            InterpolationMode::Step => self.value_at(index),
            InterpolationMode::Linear => {
                T::interpolate_linear(self.value_at(index), self.value_at(next), t)
            }
            InterpolationMode::CubicSpline => {
                let a = index * 3;
                let b = next * 3;
                T::interpolate_cubic(
                    self.values[a + 1],
                    self.values[a + 2],
                    self.values[b],
                    self.values[b + 1],
                    t,
                    dt,
                )
            }
        }
    }
}
