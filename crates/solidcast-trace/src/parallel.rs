//! Parallel ray firing.
//!
//! One ray shot runs synchronously start to finish; throughput comes from
//! firing many rays across a thread pool, each worker owning a private
//! [`Resource`]. The prepared scene is shared read-only.

use crate::app::{fire, Application};
use crate::error::Result;
use crate::index::SpatialIndex;
use crate::scene::Scene;
use rayon::prelude::*;
use solidcast_geom::Ray;
use solidcast_resource::Resource;

/// Fire a batch of rays in parallel, preserving input order in the
/// output.
///
/// `make_app` builds a fresh application per worker state; its status
/// codes (or per-ray errors) come back in ray order. No lock is taken in
/// steady state: workers only touch their own resource.
pub fn fire_parallel<A, F>(
    scene: &Scene,
    rays: &[Ray],
    index: &dyn SpatialIndex,
    make_app: F,
) -> Vec<Result<i32>>
where
    A: Application + Send,
    F: Fn() -> A + Send + Sync,
{
    rays.par_iter()
        .map_init(
            || (scene.opts().resource(), make_app()),
            |(res, app): &mut (Resource, A), ray| fire(scene, ray, index, res, app),
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{Callbacks, PartitionView};
    use crate::index::LinearIndex;
    use solidcast_geom::Sphere;
    use solidcast_math::{Point3, Vec3};

    #[test]
    fn test_parallel_matches_serial() {
        let mut b = Scene::builder();
        let r = b.add_region("ball");
        b.add_solid(r, "s", Box::new(Sphere::new(Point3::origin(), 2.0)))
            .unwrap();
        let scene = b.finish();

        // A scanline of rays, some hitting, some missing.
        let rays: Vec<Ray> = (0..32)
            .map(|i| {
                let y = -4.0 + i as f64 * 0.25;
                Ray::new(Point3::new(-10.0, y, 0.0), Vec3::x())
            })
            .collect();

        let make_app = || Callbacks {
            on_hit: |view: &PartitionView<'_>| view.partitions().len() as i32,
            on_miss: || 0,
        };

        let parallel: Vec<i32> = fire_parallel(&scene, &rays, &LinearIndex, make_app)
            .into_iter()
            .map(|r| r.unwrap())
            .collect();

        let mut res = scene.opts().resource();
        let serial: Vec<i32> = rays
            .iter()
            .map(|ray| {
                let mut app = make_app();
                fire(&scene, ray, &LinearIndex, &mut res, &mut app).unwrap()
            })
            .collect();

        assert_eq!(parallel, serial);
        assert!(parallel.iter().any(|&s| s > 0));
        assert!(parallel.iter().any(|&s| s == 0));
    }
}
