use glam::{Quat, Vec3};

use crate::animation::tracks::KeyframeTrack;
use crate::motion::HumanBone;

/// The bone property a track drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetPath {
    Translation,
    Rotation,
    Scale,
}

#[derive(Debug, Clone)]
pub struct TrackMeta {
    pub bone: HumanBone,
    pub target: TargetPath,
}

#[derive(Debug, Clone)]
pub enum TrackData {
    Vector3(KeyframeTrack<Vec3>),
    Quaternion(KeyframeTrack<Quat>),
    Scalar(KeyframeTrack<f32>),
}

impl TrackData {
    #[must_use]
    pub fn end_time(&self) -> f32 {
        match self {
            TrackData::Vector3(t) => t.end_time(),
            TrackData::Quaternion(t) => t.end_time(),
            TrackData::Scalar(t) => t.end_time(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Track {
    pub meta: TrackMeta,
    pub data: TrackData,
}

/// Keyframed humanoid animation, ready for playback.
#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
    pub tracks: Vec<Track>,
}

impl AnimationClip {
    /// Builds a clip; the duration is the latest keyframe over all tracks.
    #[must_use]
    pub fn new(name: String, tracks: Vec<Track>) -> Self {
        let duration = tracks
            .iter()
            .map(|t| t.data.end_time())
            .fold(0.0_f32, f32::max);

        Self {
            name,
            duration,
            tracks,
        }
    }

    /// Bones driven by at least one track, in first-appearance order.
    #[must_use]
    pub fn bones(&self) -> Vec<HumanBone> {
        let mut bones = Vec::new();
        for track in &self.tracks {
            if !bones.contains(&track.meta.bone) {
                bones.push(track.meta.bone);
            }
        }
        bones
    }
}
