//! Stable handles for scene objects and arena records.

slotmap::new_key_type! {
    /// Handle to a prepared solid in the scene.
    pub struct SolidId;

    /// Handle to a region (a named boolean combination of solids).
    pub struct RegionId;
}

/// Handle to a segment record in a worker's [`Resource`](crate::Resource)
/// arena. Plain index, only meaningful against the arena that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SegId(pub(crate) u32);

impl SegId {
    /// Raw arena index.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}
