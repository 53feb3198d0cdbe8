//! The ray shoot driver.
//!
//! Gathers raw segments from every candidate primitive. The driver fails
//! soft: one misbehaving primitive is logged and treated as a miss for
//! that primitive, never aborting the whole ray. Only arena exhaustion
//! escalates.

use crate::error::TraceError;
use crate::index::SpatialIndex;
use crate::scene::Scene;
use slotmap::SecondaryMap;
use solidcast_geom::{PrimitiveError, Ray, SegTag};
use solidcast_resource::{Resource, SegId, SolidId};

/// Shoot one ray at every candidate primitive, collecting raw segments
/// per solid. No cross-primitive sorting happens here; that is the
/// boolean evaluator's job.
pub fn shoot_ray(
    scene: &Scene,
    ray: &Ray,
    index: &dyn SpatialIndex,
    res: &mut Resource,
) -> Result<SecondaryMap<SolidId, Vec<SegId>>, TraceError> {
    let mut candidates = Vec::new();
    index.candidates(scene, ray, &mut candidates);

    let cull = scene.opts().cull_dist;
    let mut leaf_segs: SecondaryMap<SolidId, Vec<SegId>> = SecondaryMap::new();

    for sid in candidates {
        let solid = scene.solid(sid);
        let tag = SegTag {
            solid: sid,
            region: solid.region,
        };
        let mut seghead = Vec::new();
        match solid.prim.shoot(ray, tag, res, &mut seghead) {
            Ok(_) => {
                let mut kept = Vec::with_capacity(seghead.len());
                for id in seghead {
                    // Totally ignore things behind the start position.
                    if res.seg(id).seg_out.dist < -cull {
                        res.free_seg(id);
                    } else {
                        kept.push(id);
                    }
                }
                if !kept.is_empty() {
                    leaf_segs.insert(sid, kept);
                }
            }
            Err(PrimitiveError::Resource(e)) => {
                release_all(res, &leaf_segs, &seghead);
                return Err(TraceError::Resource(e));
            }
            Err(e) => {
                log::warn!(
                    "solid '{}' shoot failed ({}), treated as a miss",
                    solid.name,
                    e
                );
                for id in seghead {
                    res.free_seg(id);
                }
            }
        }
    }
    Ok(leaf_segs)
}

/// Release every segment gathered so far (error-path cleanup).
pub(crate) fn release_all(
    res: &mut Resource,
    leaf_segs: &SecondaryMap<SolidId, Vec<SegId>>,
    extra: &[SegId],
) {
    for (_, segs) in leaf_segs.iter() {
        for &id in segs {
            res.free_seg(id);
        }
    }
    for &id in extra {
        res.free_seg(id);
    }
}
