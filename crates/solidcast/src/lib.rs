#![warn(missing_docs)]

//! solidcast: a ray-firing CSG boolean evaluation pipeline.
//!
//! A single ray query becomes an ordered list of region-attributed
//! material intervals ("partitions") along the ray:
//!
//! 1. The shoot driver asks the spatial index for candidate primitives
//!    and invokes each one's shoot capability, collecting raw segments.
//! 2. The boolean evaluator walks the scene's CSG tree bottom-up, merging
//!    children's partition lists per union / intersect / subtract.
//! 3. The application boundary delivers the final list (or a miss) to
//!    caller callbacks and reclaims all storage into the per-worker
//!    resource.
//!
//! Curved primitives reduce intersection to polynomial root finding
//! ([`poly`]); all dispatch goes through the primitive capability table
//! ([`geom`]); per-worker pools ([`resource`]) keep concurrent tracing
//! lock-free.

/// Math aliases and tolerances.
pub mod math {
    pub use solidcast_math::*;
}

/// Polynomial root finding for curved-surface intersection.
pub mod poly {
    pub use solidcast_poly::*;
}

/// Per-worker segment/partition pools and the scratch allocator.
pub mod resource {
    pub use solidcast_resource::*;
}

/// Primitive capability dispatch and the built-in solid types.
pub mod geom {
    pub use solidcast_geom::*;
}

/// CSG tree and the boolean evaluator.
pub mod boolean {
    pub use solidcast_boolean::*;
}

/// Scene preparation, the shoot driver and the application boundary.
pub mod trace {
    pub use solidcast_trace::*;
}

pub use solidcast_boolean::{BoolOp, CsgTree};
pub use solidcast_geom::{Halfspace, Primitive, Ray, Rpp, Sphere, Torus};
pub use solidcast_math::{Point3, Tolerance, Vec3};
pub use solidcast_resource::{Partition, PartitionList, Resource, SegId, Segment};
pub use solidcast_trace::{
    fire, fire_parallel, Application, Callbacks, LinearIndex, PartitionView, Scene,
    TraceError, TraceOptions,
};
