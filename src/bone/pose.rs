use super::clip::BoneFrame;
use super::id::BoneId;
use super::mask::BoneMask;
use crate::error::MplError;
use crate::statement::Statement;
use glam::{Quat, Vec3};

/// Resolved pose: one local rotation and offset per bone.
///
/// Only bones in `touched` were set by statements; the rest stay at identity
/// and are left out of keyframes. Updates are functional (`with_rotation`).
#[derive(Debug, Clone, PartialEq)]
pub struct Pose {
    /// Local rotation for each bone
    pub rotations: [Quat; BoneId::COUNT],

    /// Position offset for each bone, zero unless moved
    pub offsets: [Vec3; BoneId::COUNT],

    pub touched: BoneMask,
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

impl Pose {
    /// All rotations at identity, nothing touched
    pub fn identity() -> Self {
        Self {
            rotations: [Quat::IDENTITY; BoneId::COUNT],
            offsets: [Vec3::ZERO; BoneId::COUNT],
            touched: BoneMask::EMPTY,
        }
    }

    /// Synthesize statements in written order.
    /// Statements on the same bone compose left to right and are never reordered.
    pub fn from_statements<'a>(
        statements: impl IntoIterator<Item = &'a Statement>,
    ) -> Result<Self, MplError> {
        statements
            .into_iter()
            .try_fold(Self::identity(), |pose, statement| pose.apply(statement))
    }

    /// Return a new pose with one more statement applied to its bone
    pub fn apply(self, statement: &Statement) -> Result<Self, MplError> {
        let bone = statement.bone;
        let rotation = self.rotations[bone.index()] * statement.rotation()?;
        let offset = self.offsets[bone.index()] + statement.translation()?;
        Ok(self.with_rotation(bone, rotation).with_offset(bone, offset))
    }

    /// Return a new pose with the specified bone rotation (Functional Set)
    pub fn with_rotation(self, bone: BoneId, rotation: Quat) -> Self {
        let mut new_pose = self;
        new_pose.rotations[bone.index()] = rotation;
        new_pose.touched = new_pose.touched.with(bone);
        new_pose
    }

    /// Return a new pose with the specified bone offset (Functional Set)
    pub fn with_offset(self, bone: BoneId, offset: Vec3) -> Self {
        let mut new_pose = self;
        new_pose.offsets[bone.index()] = offset;
        new_pose.touched = new_pose.touched.with(bone);
        new_pose
    }

    #[inline]
    pub fn rotation(&self, bone: BoneId) -> Quat {
        self.rotations[bone.index()]
    }

    #[inline]
    pub fn offset(&self, bone: BoneId) -> Vec3 {
        self.offsets[bone.index()]
    }

    /// Union of two poses that must not share a bone.
    /// On overlap returns the first shared bone in table order.
    pub fn combine(&self, other: &Pose) -> Result<Pose, BoneId> {
        if let Some(bone) = self.touched.intersection(other.touched).iter().next() {
            return Err(bone);
        }
        Ok(self.clone().overlay(other))
    }

    /// Copy every bone `other` touched over this pose
    pub fn overlay(self, other: &Pose) -> Pose {
        other.touched.iter().fold(self, |pose, bone| {
            pose.with_rotation(bone, other.rotation(bone))
                .with_offset(bone, other.offset(bone))
        })
    }

    /// Frames for touched bones, in table order
    pub fn bone_frames(&self) -> Vec<BoneFrame> {
        self.touched
            .iter()
            .map(|bone| BoneFrame {
                bone,
                position: self.offset(bone),
                rotation: self.rotation(bone),
            })
            .collect()
    }
}
