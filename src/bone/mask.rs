use super::id::BoneId;
use static_assertions::const_assert;

const_assert!(BoneId::COUNT <= 64);

/// Bones a pose's statements have set, one bit per table index.
/// Bones outside the mask stay at rest and are left out of keyframes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoneMask(u64);

impl BoneMask {
    pub const EMPTY: Self = Self(0);

    #[inline]
    pub const fn contains(self, bone: BoneId) -> bool {
        (self.0 & (1 << bone.index())) != 0
    }

    /// Return a new mask with the bone added
    #[inline]
    pub const fn with(self, bone: BoneId) -> Self {
        Self(self.0 | (1 << bone.index()))
    }

    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[inline]
    pub const fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Touched bones in table order
    pub fn iter(self) -> impl Iterator<Item = BoneId> {
        BoneId::ALL
            .into_iter()
            .filter(move |bone| self.contains(*bone))
    }
}

impl FromIterator<BoneId> for BoneMask {
    fn from_iter<I: IntoIterator<Item = BoneId>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, Self::with)
    }
}
