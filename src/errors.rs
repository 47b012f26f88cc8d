//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! The main error type [`MocapError`] covers all failure modes including:
//! - Malformed motion textures (buffer size, channel count, layer index)
//! - Invalid bone channel layouts
//! - Recording session lifecycle misuse
//! - Clip export and configuration I/O
//!
//! Numeric degeneracies (over-long swing vectors) and incomplete skeletons are
//! not errors; they are handled in place by the pipeline.
//!
//! # Usage
//!
//! All fallible APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, MocapError>`.
//!
//! ```rust,ignore
//! use mocap::errors::{MocapError, Result};
//!
//! fn decode_frame(pixels: &[u8]) -> Result<()> {
//!     // Operations that may fail return Result
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for the motion pipeline.
#[derive(Error, Debug)]
pub enum MocapError {
    // ========================================================================
    // Decode Errors (local to one frame)
    // ========================================================================
    /// The RGBA buffer does not cover exactly `width * height` pixels.
    #[error("Pixel buffer size mismatch: expected {expected} bytes, got {actual}")]
    PixelBufferSize {
        /// `width * height * 4`
        expected: usize,
        /// Length of the supplied buffer
        actual: usize,
    },

    /// The decoded frame does not match the declared channel layout.
    #[error("Channel count mismatch: expected {expected} channels, got {actual}")]
    ChannelCountMismatch {
        /// Channel count required by the layout or codec
        expected: usize,
        /// Channel count actually present
        actual: usize,
    },

    /// A subject layer outside the frame was requested.
    #[error("Layer {layer} out of range (frame holds {layers} layers)")]
    LayerOutOfRange {
        /// Requested layer
        layer: usize,
        /// Layers present in the frame
        layers: usize,
    },

    /// Texture dimensions that cannot hold any channel.
    #[error("Invalid texture dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Texture width in pixels
        width: u32,
        /// Texture height in pixels
        height: u32,
    },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// The bone channel layout is internally inconsistent.
    #[error("Invalid channel layout: {0}")]
    InvalidLayout(String),

    /// A bone name that is not part of the humanoid table.
    #[error("Unknown humanoid bone: {0}")]
    UnknownBone(String),

    // ========================================================================
    // Recording Errors
    // ========================================================================
    /// `sample` or `finalize` was called on a recorder that was already finalized.
    #[error("Clip recorder already finalized")]
    RecorderFinalized,

    // ========================================================================
    // I/O & Serialization Errors
    // ========================================================================
    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// File I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Alias for `Result<T, MocapError>`.
pub type Result<T> = std::result::Result<T, MocapError>;
