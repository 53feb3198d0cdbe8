//! The application boundary.
//!
//! [`fire`] runs one complete ray shot (candidate gathering, per-solid
//! shoot, boolean evaluation) and delivers the result to the caller's
//! hit or miss callback. After the callback returns, every partition and
//! segment is reclaimed into the worker's resource: callbacks must copy
//! out whatever they want to keep.

use crate::error::Result;
use crate::index::SpatialIndex;
use crate::scene::Scene;
use crate::shoot::{release_all, shoot_ray};
use solidcast_boolean::evaluate;
use solidcast_geom::{Curvature, Ray};
use solidcast_math::Dir3;
use solidcast_resource::{Partition, PartitionList, Resource};

/// Caller-supplied callbacks receiving the result of a ray shot.
///
/// The status code returned by either callback is propagated verbatim
/// through [`fire`].
pub trait Application {
    /// The ray produced at least one partition. References into the view
    /// must not outlive the call.
    fn hit(&mut self, view: &PartitionView<'_>) -> i32;

    /// The ray struck nothing.
    fn miss(&mut self) -> i32;
}

/// Adapter implementing [`Application`] from two closures.
pub struct Callbacks<H, M> {
    /// Hit closure.
    pub on_hit: H,
    /// Miss closure.
    pub on_miss: M,
}

impl<H, M> Application for Callbacks<H, M>
where
    H: FnMut(&PartitionView<'_>) -> i32,
    M: FnMut() -> i32,
{
    fn hit(&mut self, view: &PartitionView<'_>) -> i32 {
        (self.on_hit)(view)
    }

    fn miss(&mut self) -> i32 {
        (self.on_miss)()
    }
}

/// A borrowed view of one ray's evaluated partitions, with the context
/// needed to resolve normals and region names on demand.
pub struct PartitionView<'a> {
    scene: &'a Scene,
    res: &'a Resource,
    ray: &'a Ray,
    list: &'a PartitionList,
}

impl<'a> PartitionView<'a> {
    /// The partitions, sorted by entry distance, non-overlapping.
    pub fn partitions(&self) -> &[Partition] {
        self.list.as_slice()
    }

    /// The ray that was fired.
    pub fn ray(&self) -> &Ray {
        self.ray
    }

    /// Name of the region owning a partition.
    pub fn region_name(&self, p: &Partition) -> &str {
        &self.scene.region(p.region).name
    }

    /// Outward-facing entry normal of a partition, computed on demand
    /// through the owning primitive's norm capability and the recorded
    /// flip state.
    pub fn in_normal(&self, p: &Partition) -> Dir3 {
        let seg = self.res.seg(p.in_seg);
        let prim = &self.scene.solid(seg.solid).prim;
        let hit = if p.in_flip { &seg.seg_out } else { &seg.seg_in };
        let n = prim.norm(hit, self.ray);
        if p.in_flip {
            Dir3::new_unchecked(-n.into_inner())
        } else {
            n
        }
    }

    /// Entry-side surface curvature of a partition.
    pub fn in_curvature(&self, p: &Partition) -> Curvature {
        let seg = self.res.seg(p.in_seg);
        let prim = &self.scene.solid(seg.solid).prim;
        let hit = if p.in_flip { &seg.seg_out } else { &seg.seg_in };
        prim.curvature(hit, self.ray)
    }

    /// Exit normal of a partition, facing along the ray.
    pub fn out_normal(&self, p: &Partition) -> Dir3 {
        let seg = self.res.seg(p.out_seg);
        let prim = &self.scene.solid(seg.solid).prim;
        let hit = if p.out_flip { &seg.seg_in } else { &seg.seg_out };
        let n = prim.norm(hit, self.ray);
        if p.out_flip {
            Dir3::new_unchecked(-n.into_inner())
        } else {
            n
        }
    }
}

/// Fire one ray through the scene and deliver the outcome.
///
/// Returns the callback's status code; [`crate::TraceError`] only for
/// conditions distinguishable from a miss (arena exhaustion). All segment and
/// partition storage is back in `res` when this returns, whatever the
/// path taken.
pub fn fire<A: Application>(
    scene: &Scene,
    ray: &Ray,
    index: &dyn SpatialIndex,
    res: &mut Resource,
    app: &mut A,
) -> Result<i32> {
    let leaf_segs = shoot_ray(scene, ray, index, res)?;

    let list = match scene.tree() {
        Some(tree) => evaluate(tree, &leaf_segs, res, &scene.opts().tol),
        None => res.get_partition_list(),
    };

    let status = if list.is_empty() {
        app.miss()
    } else {
        let view = PartitionView {
            scene,
            res: &*res,
            ray,
            list: &list,
        };
        app.hit(&view)
    };

    res.free_partition_list(list);
    release_all(res, &leaf_segs, &[]);
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::LinearIndex;
    use solidcast_math::{Point3, Vec3};
    use solidcast_boolean::{BoolOp, CsgTree};
    use solidcast_geom::{Rpp, Sphere};

    #[test]
    fn test_fire_hit_and_reclaim() {
        let mut b = Scene::builder();
        let r = b.add_region("ball");
        b.add_solid(r, "s", Box::new(Sphere::new(Point3::origin(), 2.0)))
            .unwrap();
        let scene = b.finish();
        let ray = Ray::new(Point3::new(-10.0, 0.0, 0.0), Vec3::x());
        let mut res = scene.opts().resource();

        let mut hits: Vec<Vec<(f64, f64)>> = Vec::new();
        let mut misses = 0u32;
        let mut app = Callbacks {
            on_hit: |view: &PartitionView<'_>| {
                hits.push(
                    view.partitions()
                        .iter()
                        .map(|p| (p.in_dist, p.out_dist))
                        .collect(),
                );
                1
            },
            on_miss: || {
                misses += 1;
                0
            },
        };
        let status = fire(&scene, &ray, &LinearIndex, &mut res, &mut app).unwrap();
        drop(app);
        assert_eq!(status, 1);
        assert_eq!(hits, vec![vec![(8.0, 12.0)]]);
        assert_eq!(misses, 0);
        assert_eq!(res.segs_in_use(), 0, "everything reclaimed after delivery");
    }

    #[test]
    fn test_fire_miss() {
        let mut b = Scene::builder();
        let r = b.add_region("ball");
        b.add_solid(r, "s", Box::new(Sphere::new(Point3::origin(), 2.0)))
            .unwrap();
        let scene = b.finish();
        let ray = Ray::new(Point3::new(-10.0, 50.0, 0.0), Vec3::x());
        let mut res = scene.opts().resource();

        let mut hit_count = 0u32;
        let mut misses = 0u32;
        let mut app = Callbacks {
            on_hit: |_view: &PartitionView<'_>| {
                hit_count += 1;
                1
            },
            on_miss: || {
                misses += 1;
                0
            },
        };
        let status = fire(&scene, &ray, &LinearIndex, &mut res, &mut app).unwrap();
        drop(app);
        assert_eq!(status, 0);
        assert_eq!(hit_count, 0);
        assert_eq!(misses, 1);
    }

    #[test]
    fn test_fire_subtraction_normals() {
        // Box [0,10] minus sphere r=2 at x=5: the cut boundaries face the
        // ray with the sphere's geometry, flipped.
        let mut b = Scene::builder();
        let r = b.add_region("plate");
        let rpp = b
            .add_solid(
                r,
                "slab",
                Box::new(Rpp::new(
                    Point3::new(0.0, -5.0, -5.0),
                    Point3::new(10.0, 5.0, 5.0),
                )),
            )
            .unwrap();
        let hole = b
            .add_solid(
                r,
                "hole",
                Box::new(Sphere::new(Point3::new(5.0, 0.0, 0.0), 2.0)),
            )
            .unwrap();
        b.set_region_tree(
            r,
            CsgTree::node(
                BoolOp::Subtract,
                CsgTree::leaf(rpp, r),
                CsgTree::leaf(hole, r),
            ),
        )
        .unwrap();
        let scene = b.finish();

        let ray = Ray::new(Point3::new(-10.0, 0.0, 0.0), Vec3::x());
        let mut res = scene.opts().resource();
        let mut normals = Vec::new();
        let mut app = Callbacks {
            on_hit: |view: &PartitionView<'_>| {
                for p in view.partitions() {
                    normals.push((
                        (p.in_dist, p.out_dist),
                        view.in_normal(p).x,
                        view.out_normal(p).x,
                    ));
                }
                1
            },
            on_miss: || 0,
        };
        fire(&scene, &ray, &LinearIndex, &mut res, &mut app).unwrap();

        // Partitions: [10,13] and [17,20] in ray distance.
        assert_eq!(normals.len(), 2);
        let ((i0, o0), n_in0, n_out0) = normals[0];
        assert!((i0 - 10.0).abs() < 1e-9 && (o0 - 13.0).abs() < 1e-9);
        assert!((n_in0 + 1.0).abs() < 1e-9, "entry through the box face");
        assert!(
            (n_out0 - 1.0).abs() < 1e-9,
            "exit into the hole: sphere normal flipped to face forward"
        );
        let ((i1, o1), n_in1, _) = normals[1];
        assert!((i1 - 17.0).abs() < 1e-9 && (o1 - 20.0).abs() < 1e-9);
        assert!(
            (n_in1 + 1.0).abs() < 1e-9,
            "re-entry out of the hole: sphere normal flipped to face the ray"
        );
    }
}
