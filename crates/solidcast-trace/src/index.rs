//! The spatial-index seam.
//!
//! Space-partitioning acceleration structures live outside this core; the
//! driver consumes them through [`SpatialIndex`] only. The linear
//! implementation here filters on prepared bounds and is adequate for
//! small scenes and tests.

use crate::scene::Scene;
use solidcast_geom::Ray;
use solidcast_resource::SolidId;

/// Narrow interface the shoot driver uses to find candidate primitives.
pub trait SpatialIndex: Send + Sync {
    /// Append every solid the ray may strike to `out`. Over-reporting is
    /// harmless (the shoot capability decides); under-reporting loses
    /// hits.
    fn candidates(&self, scene: &Scene, ray: &Ray, out: &mut Vec<SolidId>);
}

/// Bounds-filter index with no spatial structure.
#[derive(Debug, Default, Clone, Copy)]
pub struct LinearIndex;

impl SpatialIndex for LinearIndex {
    fn candidates(&self, scene: &Scene, ray: &Ray, out: &mut Vec<SolidId>) {
        for (id, solid) in scene.solids() {
            if solid.bounds.radius.is_infinite()
                || ray.intersect_aabb(&solid.bounds.aabb).is_some()
            {
                out.push(id);
            }
        }
    }
}
