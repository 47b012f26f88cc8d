//! Swing Reconstruction
//!
//! Limb bones are streamed as the vector part of a unit quaternion; the twist
//! (real) part is implied. Mocap solvers that drive these bones never produce a
//! meaningful twist around the bone's own axis, so the positive root is always
//! the right one.

use glam::{Quat, Vec3};

const DEGENERATE_EPSILON: f32 = 1e-12;

/// Rebuilds a unit quaternion from a swing vector `(sx, sy, sz)`.
///
/// `w = sqrt(max(0, 1 - |s|^2))`. When quantization noise pushes `|s|` past 1
/// the radicand is clamped and the vector part renormalized, yielding a unit
/// quaternion with `w = 0` instead of `NaN`.
#[must_use]
pub fn reconstruct_swing(swing: Vec3) -> Quat {
    let len_sq = swing.length_squared();
    if len_sq <= 1.0 {
        let w = (1.0 - len_sq).max(0.0).sqrt();
        return Quat::from_xyzw(swing.x, swing.y, swing.z, w);
    }
    let axis = swing / len_sq.sqrt();
    Quat::from_xyzw(axis.x, axis.y, axis.z, 0.0)
}

/// Extracts the swing vector of a rotation, the inverse of [`reconstruct_swing`].
///
/// The quaternion is first brought into the `w >= 0` hemisphere so the
/// implied twist root is the positive one.
#[must_use]
pub fn swing_from_rotation(rotation: Quat) -> Vec3 {
    let len_sq = rotation.length_squared();
    if len_sq < DEGENERATE_EPSILON {
        return Vec3::ZERO;
    }
    let q = rotation.normalize();
    let q = if q.w < 0.0 { -q } else { q };
    q.xyz()
}
