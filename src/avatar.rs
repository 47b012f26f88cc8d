//! Avatar Driver
//!
//! Owns everything one avatar needs to follow a motion stream: its own codec
//! scratch buffer, the layout, the calibration captured at bind time, the last
//! good pose, and an optional recording session. The host render loop calls
//! [`Avatar::tick`] (or [`Avatar::update`]) once per frame.

use log::{info, warn};

use crate::animation::{Clip, ClipRecorder};
use crate::config::MotionConfig;
use crate::errors::{MocapError, Result};
use crate::motion::{BoneChannelLayout, MotionFrame, MotionTextureCodec};
use crate::retarget::{AvatarCalibration, PoseRetargeter, ReferencePoses, RetargetedPose};
use crate::skeleton::HumanoidRig;

/// Supplies the raw RGBA8 motion texture, typically a GPU readback.
pub trait PixelSource {
    fn read_pixels(&mut self) -> Result<&[u8]>;
}

impl PixelSource for Vec<u8> {
    fn read_pixels(&mut self) -> Result<&[u8]> {
        Ok(self.as_slice())
    }
}

pub struct Avatar {
    layout: BoneChannelLayout,
    codec: MotionTextureCodec,
    calibration: AvatarCalibration,
    retargeter: PoseRetargeter,
    layer: usize,
    max_record_seconds: f32,

    pose: RetargetedPose,
    recorder: Option<ClipRecorder>,
    dropped_frames: u64,
}

impl Avatar {
    /// Binds a rig with the canonical humanoid layout and reference table.
    pub fn bind<R: HumanoidRig + ?Sized>(rig: &R, config: &MotionConfig) -> Result<Self> {
        let layout = BoneChannelLayout::humanoid().with_translation_period(config.wrap_period)?;
        let calibration =
            AvatarCalibration::compute(rig, &layout, &ReferencePoses::humanoid(), config.flip_z);
        Self::with_calibration(layout, calibration, config)
    }

    /// Builds a driver from an explicit layout and calibration.
    pub fn with_calibration(
        layout: BoneChannelLayout,
        calibration: AvatarCalibration,
        config: &MotionConfig,
    ) -> Result<Self> {
        let layers = config.layers.max(1);
        if config.layer >= layers {
            return Err(MocapError::LayerOutOfRange {
                layer: config.layer,
                layers,
            });
        }
        let codec = MotionTextureCodec::for_layout(&layout, layers)?;

        Ok(Self {
            layout,
            codec,
            calibration,
            retargeter: PoseRetargeter::new(config.retarget_config()),
            layer: config.layer,
            max_record_seconds: config.max_record_seconds,
            pose: RetargetedPose::new(),
            recorder: None,
            dropped_frames: 0,
        })
    }

    #[inline]
    #[must_use]
    pub fn layout(&self) -> &BoneChannelLayout {
        &self.layout
    }

    #[inline]
    #[must_use]
    pub fn calibration(&self) -> &AvatarCalibration {
        &self.calibration
    }

    /// Texture size this avatar expects.
    #[must_use]
    pub fn texture_size(&self) -> (u32, u32) {
        (self.codec.width(), self.codec.height())
    }

    /// The last successfully retargeted pose.
    #[inline]
    #[must_use]
    pub fn pose(&self) -> &RetargetedPose {
        &self.pose
    }

    #[inline]
    #[must_use]
    pub fn dropped_frames(&self) -> u64 {
        self.dropped_frames
    }

    /// Decodes one motion texture and retargets it.
    ///
    /// On error the previous pose is kept untouched.
    pub fn update(&mut self, pixels: &[u8]) -> Result<&RetargetedPose> {
        let frame = self.codec.decode(pixels)?;
        let samples = self.layout.samples(frame, self.layer)?;
        self.retargeter
            .retarget_samples_into(&samples, &self.calibration, &mut self.pose);
        Ok(&self.pose)
    }

    /// Retargets an already decoded frame.
    pub fn update_frame(&mut self, frame: &MotionFrame) -> Result<&RetargetedPose> {
        let samples = self.layout.samples(frame, self.layer)?;
        self.retargeter
            .retarget_samples_into(&samples, &self.calibration, &mut self.pose);
        Ok(&self.pose)
    }

    /// One render-loop step: read, decode, retarget, apply, record.
    ///
    /// A bad frame is logged and counted, and the previous pose is applied
    /// again. Returns whether this frame produced a fresh pose.
    pub fn tick<S, R>(&mut self, source: &mut S, rig: &mut R, dt: f32) -> bool
    where
        S: PixelSource + ?Sized,
        R: HumanoidRig + ?Sized,
    {
        let fresh = match source.read_pixels().and_then(|pixels| self.update(pixels).map(|_| ())) {
            Ok(()) => true,
            Err(err) => {
                self.dropped_frames += 1;
                warn!("Dropping motion frame: {err}");
                false
            }
        };

        self.pose.apply_to(rig);

        if let Some(recorder) = self.recorder.as_mut() {
            if let Err(err) = recorder.sample(dt, &self.pose) {
                warn!("Recording sample rejected: {err}");
            }
        }
        fresh
    }

    /// Starts a new recording, discarding any unfinished one.
    pub fn start_recording(&mut self) {
        if self.recorder.is_some() {
            warn!("Restarting an unfinished recording");
        }
        self.recorder = Some(ClipRecorder::new(self.max_record_seconds));
        info!("Recording started (max {:.0}s)", self.max_record_seconds);
    }

    #[must_use]
    pub fn is_recording(&self) -> bool {
        self.recorder.is_some()
    }

    /// Elapsed time of the active recording.
    #[must_use]
    pub fn recording_time(&self) -> Option<f32> {
        self.recorder.as_ref().map(ClipRecorder::current_time)
    }

    /// Stops the active recording and returns its clip.
    pub fn stop_recording(&mut self) -> Option<Clip> {
        let mut recorder = self.recorder.take()?;
        match recorder.finalize() {
            Ok(clip) => {
                info!("Recording stopped: {} samples", clip.len());
                Some(clip)
            }
            Err(err) => {
                warn!("Failed to finalize recording: {err}");
                None
            }
        }
    }
}
