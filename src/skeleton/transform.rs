use glam::{Affine3A, Quat, Vec3};

/// Transform component of a bone.
///
/// Holds the parent-local translation, rotation and scale together with the
/// cached local/world matrices. The local matrix is only rebuilt when one of
/// the TRS fields changed since the last update.
#[derive(Debug, Clone)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,

    pub(crate) local_matrix: Affine3A,
    pub(crate) world_matrix: Affine3A,

    last_position: Vec3,
    last_rotation: Quat,
    last_scale: Vec3,
    force_update: bool,
}

impl Transform {
    #[must_use]
    pub fn new() -> Self {
        Self::from_trs(Vec3::ZERO, Quat::IDENTITY, Vec3::ONE)
    }

    #[must_use]
    pub fn from_trs(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
            local_matrix: Affine3A::IDENTITY,
            world_matrix: Affine3A::IDENTITY,
            last_position: position,
            last_rotation: rotation,
            last_scale: scale,
            force_update: true,
        }
    }

    /// Rebuilds the local matrix if the TRS fields changed.
    ///
    /// Returns whether a rebuild happened.
    pub fn update_local_matrix(&mut self) -> bool {
        let changed = self.position != self.last_position
            || self.rotation != self.last_rotation
            || self.scale != self.last_scale
            || self.force_update;

        if changed {
            self.local_matrix = self.compose();
            self.last_position = self.position;
            self.last_rotation = self.rotation;
            self.last_scale = self.scale;
            self.force_update = false;
        }

        changed
    }

    /// The local matrix built from the current TRS fields, ignoring the cache.
    #[inline]
    #[must_use]
    pub fn compose(&self) -> Affine3A {
        Affine3A::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    #[inline]
    #[must_use]
    pub fn local_matrix(&self) -> &Affine3A {
        &self.local_matrix
    }

    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> &Affine3A {
        &self.world_matrix
    }

    pub fn set_world_matrix(&mut self, mat: Affine3A) {
        self.world_matrix = mat;
    }

    pub fn mark_dirty(&mut self) {
        self.force_update = true;
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}
