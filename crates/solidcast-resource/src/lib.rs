#![warn(missing_docs)]

//! Per-worker resource pools for the solidcast ray tracing core.
//!
//! Concurrent ray tracing is lock-free in steady state because every worker
//! owns a private [`Resource`]: a pool of reusable segment records and
//! partition-list buffers, grown in bulk only when exhausted. The prepared
//! scene is the only shared state, and it is read-only.
//!
//! This crate also defines the records themselves, [`Segment`] (one
//! primitive-level entry/exit interval along a ray) and [`Partition`] (one
//! boolean-evaluated interval of the whole CSG tree), plus [`MemMap`], the
//! generic best-fit coalescing allocator used for auxiliary scratch space.

mod arena;
mod ids;
mod memmap;
mod segment;

pub use arena::{Resource, ResourceError, ResourceStats};
pub use ids::{RegionId, SegId, SolidId};
pub use memmap::MemMap;
pub use segment::{Hit, Partition, PartitionList, Segment};
