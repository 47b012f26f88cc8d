//! Stream Configuration
//!
//! Settings that must agree with whatever produced the motion texture, plus
//! per-avatar choices such as which subject layer to follow.
//!
//! ```rust,ignore
//! use mocap::config::MotionConfig;
//!
//! // Defaults: two subjects per texture, follow the first one
//! let config = MotionConfig::default();
//!
//! // Follow the second performer, record at most 30 seconds
//! let config = MotionConfig {
//!     layer: 1,
//!     max_record_seconds: 30.0,
//!     ..Default::default()
//! };
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::animation::DEFAULT_MAX_DURATION;
use crate::errors::Result;
use crate::retarget::RetargetConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Subjects stacked in one motion texture.
    pub layers: usize,
    /// The subject this avatar follows.
    pub layer: usize,
    /// Position wraparound period of the encoder, also the period hips
    /// translations are quantized over.
    pub wrap_period: f32,
    /// Hips height of the captured performer.
    pub source_hip_height: f32,
    /// Convert from the encoder's left-handed frame.
    pub flip_z: bool,
    /// Recording ceiling in seconds.
    pub max_record_seconds: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        let retarget = RetargetConfig::default();
        Self {
            layers: 2,
            layer: 0,
            wrap_period: retarget.wrap_period,
            source_hip_height: retarget.source_hip_height,
            flip_z: retarget.flip_z,
            max_record_seconds: DEFAULT_MAX_DURATION,
        }
    }
}

impl MotionConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    #[must_use]
    pub fn retarget_config(&self) -> RetargetConfig {
        RetargetConfig {
            wrap_period: self.wrap_period,
            source_hip_height: self.source_hip_height,
            flip_z: self.flip_z,
        }
    }
}
