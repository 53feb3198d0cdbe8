//! Segment and partition records.
//!
//! A segment is one entry/exit pair along a ray for a single primitive.
//! A partition is one boolean-evaluated in/out interval of the whole CSG
//! tree, bounded by hits borrowed from the segments that produced it.

use crate::ids::{RegionId, SegId, SolidId};
use solidcast_math::{Point3, Tolerance, Vec3};

/// One ray/surface crossing.
///
/// Only the data needed to reconstruct a normal later is stored; the
/// normal itself is computed on demand through the owning primitive's
/// `norm` capability.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Distance along the ray from its origin.
    pub dist: f64,
    /// Intersection point.
    pub point: Point3,
    /// Which surface of the primitive was crossed (primitive-specific).
    pub surf: i32,
    /// Incidence data the primitive stashes for deferred normal
    /// computation (meaning is primitive-specific).
    pub vpriv: Vec3,
}

impl Hit {
    /// A hit at distance `dist` with no incidence data.
    pub fn at_dist(dist: f64, point: Point3, surf: i32) -> Self {
        Self {
            dist,
            point,
            surf,
            vpriv: Vec3::zeros(),
        }
    }
}

/// One primitive-level entry/exit interval along a ray.
///
/// Created by a primitive's shoot capability with `seg_in.dist <=
/// seg_out.dist`; owned by the worker's [`Resource`](crate::Resource)
/// until released at the end of the ray's evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// Entry crossing.
    pub seg_in: Hit,
    /// Exit crossing.
    pub seg_out: Hit,
    /// Primitive that produced this segment.
    pub solid: SolidId,
    /// Region the primitive belongs to.
    pub region: RegionId,
}

/// One boolean-evaluated interval of the whole CSG tree along a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Partition {
    /// Entry distance.
    pub in_dist: f64,
    /// Exit distance; `in_dist <= out_dist`.
    pub out_dist: f64,
    /// Segment whose hit forms the entry boundary.
    pub in_seg: SegId,
    /// Segment whose hit forms the exit boundary.
    pub out_seg: SegId,
    /// The entry boundary is the in-segment's *exit* hit, so its normal
    /// must be flipped when presented as an entry normal.
    pub in_flip: bool,
    /// The exit boundary is the out-segment's *entry* hit.
    pub out_flip: bool,
    /// Region that owns this interval after boolean composition.
    pub region: RegionId,
}

impl Partition {
    /// Interval width along the ray.
    #[inline]
    pub fn width(&self) -> f64 {
        self.out_dist - self.in_dist
    }
}

/// An ordered sequence of partitions along one ray.
///
/// Invariant: sorted by entry distance and pairwise non-overlapping
/// (`p[i].out_dist <= p[i+1].in_dist` within tolerance). The sequence is
/// an explicit growable array; the buffers are pooled per worker through
/// the [`Resource`](crate::Resource).
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PartitionList {
    pub(crate) parts: Vec<Partition>,
}

impl PartitionList {
    /// An empty list (unpooled; prefer
    /// [`Resource::get_partition_list`](crate::Resource::get_partition_list)
    /// during tracing).
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a partition; the caller maintains ordering.
    #[inline]
    pub fn push(&mut self, p: Partition) {
        debug_assert!(
            self.parts.last().map_or(true, |l| l.in_dist <= p.in_dist),
            "partitions must be appended in entry-distance order"
        );
        self.parts.push(p);
    }

    /// Number of partitions.
    #[inline]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// True when no partitions are present (ray missed everything).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// The partitions, in entry-distance order.
    #[inline]
    pub fn as_slice(&self) -> &[Partition] {
        &self.parts
    }

    /// Iterate in entry-distance order.
    pub fn iter(&self) -> std::slice::Iter<'_, Partition> {
        self.parts.iter()
    }

    /// Drop all partitions, keeping the buffer.
    pub fn clear(&mut self) {
        self.parts.clear();
    }

    /// The last partition, if any.
    #[inline]
    pub fn last(&self) -> Option<&Partition> {
        self.parts.last()
    }

    /// Mutable access to the last partition, for in-place fusing during
    /// evaluation.
    #[inline]
    pub fn last_mut(&mut self) -> Option<&mut Partition> {
        self.parts.last_mut()
    }

    /// Check the ordering/non-overlap invariant.
    pub fn is_ordered(&self, tol: &Tolerance) -> bool {
        self.parts.windows(2).all(|w| {
            w[0].in_dist <= w[1].in_dist && w[0].out_dist <= w[1].in_dist + tol.dist
        })
    }
}

impl<'a> IntoIterator for &'a PartitionList {
    type Item = &'a Partition;
    type IntoIter = std::slice::Iter<'a, Partition>;

    fn into_iter(self) -> Self::IntoIter {
        self.parts.iter()
    }
}
