//! Clip Recording
//!
//! A [`ClipRecorder`] snapshots the retargeted pose once per frame. Its only
//! clock is the `dt` the caller passes in, so the recorded timing follows the
//! caller's frame cadence exactly. Recording caps at a fixed duration instead
//! of growing without bound.

use std::io::Write;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::animation::clip::{AnimationClip, TargetPath, Track, TrackData, TrackMeta};
use crate::animation::tracks::{InterpolationMode, KeyframeTrack};
use crate::errors::{MocapError, Result};
use crate::motion::HumanBone;
use crate::retarget::RetargetedPose;

/// Default recording ceiling in seconds.
pub const DEFAULT_MAX_DURATION: f32 = 60.0;

/// One timestamped pose snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipSample {
    pub time: f32,
    pub pose: RetargetedPose,
}

/// A finalized recording. Read-only once handed out by the recorder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    max_duration: f32,
    samples: Vec<ClipSample>,
}

impl Clip {
    /// Ceiling the recording was made with.
    #[inline]
    #[must_use]
    pub fn max_duration(&self) -> f32 {
        self.max_duration
    }

    #[inline]
    #[must_use]
    pub fn samples(&self) -> &[ClipSample] {
        &self.samples
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Timestamp of the last sample.
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.samples.last().map_or(0.0, |s| s.time)
    }

    pub fn to_json_writer<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Converts the snapshots into keyframe tracks for playback.
    ///
    /// Every bone gets a rotation track; translation and scale tracks exist
    /// only for bones that carried them. Keys are taken from the snapshots the
    /// bone appears in.
    #[must_use]
    pub fn to_animation_clip(&self, name: &str, interpolation: InterpolationMode) -> AnimationClip {
        // Cubic splines need tangents the recording does not have.
        let interpolation = match interpolation {
            InterpolationMode::CubicSpline => InterpolationMode::Linear,
            other => other,
        };

        let mut bones: Vec<HumanBone> = Vec::new();
        for sample in &self.samples {
            for pose in &sample.pose.bones {
                if !bones.contains(&pose.bone) {
                    bones.push(pose.bone);
                }
            }
        }

        let mut tracks = Vec::new();
        for bone in bones {
            let mut rotation = (Vec::new(), Vec::new());
            let mut position = (Vec::new(), Vec::new());
            let mut scale = (Vec::new(), Vec::new());

            for sample in &self.samples {
                let Some(pose) = sample.pose.get(bone) else {
                    continue;
                };
                rotation.0.push(sample.time);
                rotation.1.push(pose.rotation);
                if let Some(p) = pose.position {
                    position.0.push(sample.time);
                    position.1.push(p);
                }
                if let Some(s) = pose.scale {
                    scale.0.push(sample.time);
                    scale.1.push(s);
                }
            }

            tracks.push(Track {
                meta: TrackMeta { bone, target: TargetPath::Rotation },
                data: TrackData::Quaternion(KeyframeTrack::new(rotation.0, rotation.1, interpolation)),
            });
            if !position.0.is_empty() {
                tracks.push(Track {
                    meta: TrackMeta { bone, target: TargetPath::Translation },
                    data: TrackData::Vector3(KeyframeTrack::new(position.0, position.1, interpolation)),
                });
            }
            if !scale.0.is_empty() {
                tracks.push(Track {
                    meta: TrackMeta { bone, target: TargetPath::Scale },
                    data: TrackData::Scalar(KeyframeTrack::new(scale.0, scale.1, interpolation)),
                });
            }
        }

        AnimationClip::new(name.to_string(), tracks)
    }
}

/// Accumulates pose snapshots for one recording session.
#[derive(Debug, Clone)]
pub struct ClipRecorder {
    current_time: f32,
    max_duration: f32,
    samples: Vec<ClipSample>,
    finalized: bool,
    capped: bool,
}

impl ClipRecorder {
    #[must_use]
    pub fn new(max_duration: f32) -> Self {
        Self {
            current_time: 0.0,
            max_duration: max_duration.max(0.0),
            samples: Vec::new(),
            finalized: false,
            capped: false,
        }
    }

    /// Recording time so far.
    #[inline]
    #[must_use]
    pub fn current_time(&self) -> f32 {
        self.current_time
    }

    #[inline]
    #[must_use]
    pub fn max_duration(&self) -> f32 {
        self.max_duration
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Records `pose` at the current time, then advances the clock by `dt`.
    ///
    /// Once the clock reaches the ceiling this is a no-op. Negative `dt` is
    /// treated as zero so the clock never runs backwards.
    pub fn sample(&mut self, dt: f32, pose: &RetargetedPose) -> Result<()> {
        if self.finalized {
            warn!("ClipRecorder::sample called after finalize");
            return Err(MocapError::RecorderFinalized);
        }

        if self.current_time >= self.max_duration {
            if !self.capped {
                debug!("Recording reached its {:.1}s ceiling", self.max_duration);
                self.capped = true;
            }
            return Ok(());
        }

        self.samples.push(ClipSample {
            time: self.current_time,
            pose: pose.clone(),
        });
        self.current_time += dt.max(0.0);
        Ok(())
    }

    /// Stops accumulation and hands over the recorded clip.
    pub fn finalize(&mut self) -> Result<Clip> {
        if self.finalized {
            return Err(MocapError::RecorderFinalized);
        }
        self.finalized = true;
        debug!(
            "Finalized clip: {} samples over {:.2}s",
            self.samples.len(),
            self.current_time
        );
        Ok(Clip {
            max_duration: self.max_duration,
            samples: std::mem::take(&mut self.samples),
        })
    }
}

impl Default for ClipRecorder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DURATION)
    }
}
