use glam::{Affine3A, Quat, Vec3};
use log::debug;
use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use smallvec::SmallVec;

use crate::motion::HumanBone;
use crate::skeleton::{BindPose, BoneKey, HumanoidRig, Transform};

/// A single joint of a [`Skeleton`].
#[derive(Debug, Clone)]
pub struct Bone {
    pub name: String,
    pub(crate) parent: Option<BoneKey>,
    pub(crate) children: SmallVec<[BoneKey; 4]>,
    pub transform: Transform,
}

impl Bone {
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<BoneKey> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[BoneKey] {
        &self.children
    }
}

/// A bone hierarchy with a humanoid mapping.
///
/// World matrices are expressed relative to the avatar root, i.e. the space
/// the hips translation of the motion stream lives in.
#[derive(Debug, Clone, Default)]
pub struct Skeleton {
    bones: SlotMap<BoneKey, Bone>,
    roots: Vec<BoneKey>,
    by_name: FxHashMap<String, BoneKey>,
    humanoid: FxHashMap<HumanBone, BoneKey>,
}

impl Skeleton {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a bone under `parent` (or as a root).
    ///
    /// A bone whose name matches a [`HumanBone`] name is mapped automatically.
    pub fn add_bone(&mut self, name: &str, parent: Option<BoneKey>, transform: Transform) -> BoneKey {
        let parent = parent.filter(|p| self.bones.contains_key(*p));
        let key = self.bones.insert(Bone {
            name: name.to_string(),
            parent,
            children: SmallVec::new(),
            transform,
        });

        match parent {
            Some(p) => self.bones[p].children.push(key),
            None => self.roots.push(key),
        }
        self.by_name.insert(name.to_string(), key);

        if let Ok(human) = name.parse::<HumanBone>() {
            self.humanoid.insert(human, key);
        }
        key
    }

    /// Maps a humanoid bone onto an existing bone, overriding name matching.
    pub fn map_humanoid(&mut self, bone: HumanBone, key: BoneKey) {
        if self.bones.contains_key(key) {
            self.humanoid.insert(bone, key);
        }
    }

    #[inline]
    #[must_use]
    pub fn bone(&self, key: BoneKey) -> Option<&Bone> {
        self.bones.get(key)
    }

    #[inline]
    pub fn bone_mut(&mut self, key: BoneKey) -> Option<&mut Bone> {
        self.bones.get_mut(key)
    }

    #[must_use]
    pub fn find(&self, name: &str) -> Option<BoneKey> {
        self.by_name.get(name).copied()
    }

    #[must_use]
    pub fn humanoid_bone(&self, bone: HumanBone) -> Option<BoneKey> {
        self.humanoid.get(&bone).copied()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// World matrix composed from the current local TRS fields up the parent
    /// chain. Does not rely on [`Self::update_world_matrices`] having run.
    #[must_use]
    pub fn compute_world(&self, key: BoneKey) -> Affine3A {
        let mut world = Affine3A::IDENTITY;
        let mut current = Some(key);
        while let Some(k) = current {
            let Some(bone) = self.bones.get(k) else {
                break;
            };
            world = bone.transform.compose() * world;
            current = bone.parent;
        }
        world
    }

    /// Propagates local matrices down the hierarchy into cached world matrices.
    ///
    /// Uses an explicit stack; subtrees whose locals did not change and whose
    /// parent did not move are skipped.
    pub fn update_world_matrices(&mut self) {
        let mut stack: Vec<(BoneKey, Affine3A, bool)> = Vec::with_capacity(64);
        for &root in self.roots.iter().rev() {
            stack.push((root, Affine3A::IDENTITY, false));
        }

        while let Some((key, parent_world, parent_changed)) = stack.pop() {
            let Some(bone) = self.bones.get_mut(key) else {
                continue;
            };

            let local_changed = bone.transform.update_local_matrix();
            let changed = local_changed || parent_changed;
            if changed {
                let world = parent_world * *bone.transform.local_matrix();
                bone.transform.set_world_matrix(world);
            }

            let world = *bone.transform.world_matrix();
            for &child in bone.children.iter().rev() {
                stack.push((child, world, changed));
            }
        }
    }
}

impl HumanoidRig for Skeleton {
    fn bind_pose(&self, bone: HumanBone) -> Option<BindPose> {
        let key = self.humanoid_bone(bone)?;
        let parent_world = self.bones[key]
            .parent
            .map_or(Affine3A::IDENTITY, |p| self.compute_world(p));
        Some(BindPose {
            parent_world,
            world: self.compute_world(key),
        })
    }

    fn set_local_transform(
        &mut self,
        bone: HumanBone,
        rotation: Quat,
        position: Option<Vec3>,
        scale: Option<f32>,
    ) {
        let Some(key) = self.humanoid_bone(bone) else {
            debug!("Skeleton has no {bone} bone, skipping local transform");
            return;
        };
        let transform = &mut self.bones[key].transform;
        transform.rotation = rotation;
        if let Some(position) = position {
            transform.position = position;
        }
        if let Some(scale) = scale {
            transform.scale = Vec3::splat(scale);
        }
    }
}
