pub mod action;
pub mod clip;
pub mod recorder;
pub mod tracks;
pub mod values;

pub use action::{ClipPlayback, LoopMode};
pub use clip::{AnimationClip, TargetPath, Track, TrackData, TrackMeta};
pub use recorder::{Clip, ClipRecorder, ClipSample, DEFAULT_MAX_DURATION};
pub use tracks::{InterpolationMode, KeyframeCursor, KeyframeTrack};
pub use values::Interpolatable;
