use std::sync::Arc;

use glam::Quat;

use crate::animation::clip::{AnimationClip, TargetPath, TrackData};
use crate::animation::tracks::KeyframeCursor;
use crate::retarget::{BonePose, RetargetedPose};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopMode {
    Once,
    Loop,
    PingPong,
}

/// Plays an [`AnimationClip`] back as a stream of [`RetargetedPose`]s.
#[derive(Debug, Clone)]
pub struct ClipPlayback {
    clip: Arc<AnimationClip>,

    pub time: f32,
    pub time_scale: f32,
    pub loop_mode: LoopMode,
    pub paused: bool,

    track_cursors: Vec<KeyframeCursor>,
}

impl ClipPlayback {
    #[must_use]
    pub fn new(clip: Arc<AnimationClip>) -> Self {
        let track_count = clip.tracks.len();
        Self {
            clip,
            time: 0.0,
            time_scale: 1.0,
            loop_mode: LoopMode::Once,
            paused: false,
            track_cursors: vec![KeyframeCursor::default(); track_count],
        }
    }

    #[must_use]
    pub fn clip(&self) -> &Arc<AnimationClip> {
        &self.clip
    }

    /// Advances the playhead by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        if self.paused {
            return;
        }

        let duration = self.clip.duration;
        if duration <= 0.0 {
            return;
        }

        self.time += dt * self.time_scale;

        match self.loop_mode {
            LoopMode::Once => {
                if self.time >= duration {
                    self.time = duration;
                    self.paused = true;
                } else if self.time < 0.0 {
                    self.time = 0.0;
                    self.paused = true;
                }
            }
            LoopMode::Loop => {
                self.time = self.time.rem_euclid(duration);
            }
            LoopMode::PingPong => {
                let t = self.time.rem_euclid(duration * 2.0);
                self.time = if t > duration { duration * 2.0 - t } else { t };
            }
        }
    }

    /// Samples every track at the current playhead into a pose.
    ///
    /// Bones appear in the order their first track appears in the clip.
    pub fn sample_pose(&mut self) -> RetargetedPose {
        let mut pose = RetargetedPose::new();

        for (track, cursor) in self.clip.tracks.iter().zip(self.track_cursors.iter_mut()) {
            let bone = track.meta.bone;
            let index = match pose.bones.iter().position(|p| p.bone == bone) {
                Some(index) => index,
                None => {
                    pose.bones.push(BonePose::rotation_only(bone, Quat::IDENTITY));
                    pose.bones.len() - 1
                }
            };
            let entry = &mut pose.bones[index];

            match (&track.data, track.meta.target) {
                (TrackData::Quaternion(t), TargetPath::Rotation) => {
                    entry.rotation = t.sample_with_cursor(self.time, cursor);
                }
                (TrackData::Vector3(t), TargetPath::Translation) => {
                    entry.position = Some(t.sample_with_cursor(self.time, cursor));
                }
                (TrackData::Scalar(t), TargetPath::Scale) => {
                    entry.scale = Some(t.sample_with_cursor(self.time, cursor));
                }
                _ => {}
            }
        }

        pose
    }
}
