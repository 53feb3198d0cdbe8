//! The per-worker resource: pooled segment records and partition lists.
//!
//! Each worker thread owns exactly one [`Resource`]. Steady-state ray
//! tracing acquires and releases records through private free lists and
//! never touches the global allocator; when a free list runs dry a whole
//! block of records is grown at once, the only allocation fallback.

use crate::ids::SegId;
use crate::segment::{Partition, PartitionList, Segment};
use thiserror::Error;

/// Records added per bulk growth of the segment arena.
const DEFAULT_BLOCK: usize = 64;

/// Default ceiling on live segment records per worker.
const DEFAULT_MAX_SEGS: usize = 1 << 20;

/// Errors from the resource arena.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResourceError {
    /// The segment arena hit its configured ceiling. This indicates a
    /// process-wide resource problem rather than a per-ray anomaly and is
    /// the one arena condition escalated to a hard failure of the current
    /// ray shot.
    #[error("segment arena exhausted ({cap} records in use)")]
    Exhausted {
        /// Configured record ceiling.
        cap: usize,
    },
}

#[derive(Debug)]
enum SegSlot {
    Free { next: Option<u32> },
    Used(Segment),
}

/// Usage counters, mostly for tests and diagnostics.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ResourceStats {
    /// Segments handed out over the resource's lifetime.
    pub seg_gets: u64,
    /// Segments returned.
    pub seg_frees: u64,
    /// Bulk growths of the segment arena.
    pub blocks_grown: u64,
    /// Partition lists handed out.
    pub plist_gets: u64,
    /// Partition lists returned.
    pub plist_frees: u64,
}

/// A per-worker pool of reusable segment and partition storage.
///
/// Never shared between workers; every operation takes `&mut self`.
/// Concurrency comes from many workers each owning one `Resource`, not
/// from sharing one.
#[derive(Debug)]
pub struct Resource {
    slots: Vec<SegSlot>,
    free_head: Option<u32>,
    block_size: usize,
    max_segs: usize,
    plist_pool: Vec<Vec<Partition>>,
    /// Usage counters.
    pub stats: ResourceStats,
}

impl Resource {
    /// A resource with default block size and record ceiling.
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_BLOCK, DEFAULT_MAX_SEGS)
    }

    /// A resource with explicit bulk-growth block size and record ceiling.
    pub fn with_limits(block_size: usize, max_segs: usize) -> Self {
        Self {
            slots: Vec::new(),
            free_head: None,
            block_size: block_size.max(1),
            max_segs,
            plist_pool: Vec::new(),
            stats: ResourceStats::default(),
        }
    }

    /// Acquire a segment record.
    ///
    /// Falls back to one bulk growth when the free list is exhausted;
    /// fails hard only at the configured ceiling.
    pub fn get_seg(&mut self, seg: Segment) -> Result<SegId, ResourceError> {
        if self.free_head.is_none() {
            self.grow()?;
        }
        let idx = self.free_head.take().ok_or(ResourceError::Exhausted {
            cap: self.max_segs,
        })?;
        match self.slots[idx as usize] {
            SegSlot::Free { next } => self.free_head = next,
            SegSlot::Used(_) => unreachable!("free list points at a live segment"),
        }
        self.slots[idx as usize] = SegSlot::Used(seg);
        self.stats.seg_gets += 1;
        Ok(SegId(idx))
    }

    /// Release a segment record back to the free list.
    pub fn free_seg(&mut self, id: SegId) {
        debug_assert!(
            matches!(self.slots[id.index()], SegSlot::Used(_)),
            "double free of segment record"
        );
        self.slots[id.index()] = SegSlot::Free {
            next: self.free_head,
        };
        self.free_head = Some(id.0);
        self.stats.seg_frees += 1;
    }

    /// Borrow a live segment.
    ///
    /// Panics on a freed or foreign handle; handles never escape the
    /// engine so this is a bug trap, not a runtime error path.
    #[inline]
    pub fn seg(&self, id: SegId) -> &Segment {
        match &self.slots[id.index()] {
            SegSlot::Used(seg) => seg,
            SegSlot::Free { .. } => panic!("segment handle used after free"),
        }
    }

    /// Borrow a live segment mutably.
    #[inline]
    pub fn seg_mut(&mut self, id: SegId) -> &mut Segment {
        match &mut self.slots[id.index()] {
            SegSlot::Used(seg) => seg,
            SegSlot::Free { .. } => panic!("segment handle used after free"),
        }
    }

    /// Number of live segment records.
    pub fn segs_in_use(&self) -> usize {
        (self.stats.seg_gets - self.stats.seg_frees) as usize
    }

    /// Acquire a (cleared) partition list from the pool.
    pub fn get_partition_list(&mut self) -> PartitionList {
        self.stats.plist_gets += 1;
        let parts = self.plist_pool.pop().unwrap_or_default();
        PartitionList { parts }
    }

    /// Return a partition list's buffer to the pool.
    pub fn free_partition_list(&mut self, mut list: PartitionList) {
        list.parts.clear();
        self.plist_pool.push(list.parts);
        self.stats.plist_frees += 1;
    }

    fn grow(&mut self) -> Result<(), ResourceError> {
        if self.slots.len() >= self.max_segs {
            return Err(ResourceError::Exhausted {
                cap: self.max_segs,
            });
        }
        let start = self.slots.len();
        let count = self.block_size.min(self.max_segs - start);
        self.slots.reserve(count);
        for i in 0..count {
            let next = if i + 1 < count {
                Some((start + i + 1) as u32)
            } else {
                None
            };
            self.slots.push(SegSlot::Free { next });
        }
        self.free_head = Some(start as u32);
        self.stats.blocks_grown += 1;
        log::debug!(
            "segment arena grew by {} records ({} total)",
            count,
            self.slots.len()
        );
        Ok(())
    }
}

impl Default for Resource {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{RegionId, SolidId};
    use crate::segment::Hit;
    use solidcast_math::Point3;

    fn seg(in_d: f64, out_d: f64) -> Segment {
        Segment {
            seg_in: Hit::at_dist(in_d, Point3::origin(), 0),
            seg_out: Hit::at_dist(out_d, Point3::origin(), 0),
            solid: SolidId::default(),
            region: RegionId::default(),
        }
    }

    #[test]
    fn test_get_free_reuse() {
        let mut res = Resource::with_limits(4, 64);
        let a = res.get_seg(seg(1.0, 2.0)).unwrap();
        let b = res.get_seg(seg(3.0, 4.0)).unwrap();
        assert_eq!(res.seg(a).seg_in.dist, 1.0);
        assert_eq!(res.seg(b).seg_out.dist, 4.0);
        assert_eq!(res.segs_in_use(), 2);

        res.free_seg(a);
        // Freed record is reused before the arena grows again.
        let c = res.get_seg(seg(5.0, 6.0)).unwrap();
        assert_eq!(c, a);
        assert_eq!(res.stats.blocks_grown, 1);
    }

    #[test]
    fn test_bulk_growth_only_on_exhaustion() {
        let mut res = Resource::with_limits(2, 64);
        let _a = res.get_seg(seg(0.0, 1.0)).unwrap();
        let _b = res.get_seg(seg(0.0, 1.0)).unwrap();
        assert_eq!(res.stats.blocks_grown, 1);
        let _c = res.get_seg(seg(0.0, 1.0)).unwrap();
        assert_eq!(res.stats.blocks_grown, 2);
    }

    #[test]
    fn test_exhaustion_is_hard_error() {
        let mut res = Resource::with_limits(2, 2);
        let _a = res.get_seg(seg(0.0, 1.0)).unwrap();
        let _b = res.get_seg(seg(0.0, 1.0)).unwrap();
        let err = res.get_seg(seg(0.0, 1.0)).unwrap_err();
        assert_eq!(err, ResourceError::Exhausted { cap: 2 });
    }

    #[test]
    fn test_partition_list_pooling() {
        let mut res = Resource::new();
        let mut list = res.get_partition_list();
        list.push(Partition {
            in_dist: 0.0,
            out_dist: 1.0,
            in_seg: SegId(0),
            out_seg: SegId(0),
            in_flip: false,
            out_flip: false,
            region: RegionId::default(),
        });
        res.free_partition_list(list);
        let list2 = res.get_partition_list();
        assert!(list2.is_empty(), "pooled buffer comes back cleared");
        assert_eq!(res.stats.plist_gets, 2);
        assert_eq!(res.stats.plist_frees, 1);
    }
}
