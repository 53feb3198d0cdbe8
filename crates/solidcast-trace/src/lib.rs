#![warn(missing_docs)]

//! Ray firing for the solidcast CSG core.
//!
//! This crate ties the pipeline together: a prepared, immutable [`Scene`]
//! (primitives resolved and prepped, region trees assembled), the shoot
//! driver gathering raw segments from candidate primitives, the boolean
//! evaluator, and the application boundary delivering sorted,
//! region-attributed partitions to caller callbacks.
//!
//! ```ignore
//! use solidcast_trace::{Callbacks, fire, LinearIndex, Scene};
//! use solidcast_geom::{Ray, Sphere};
//!
//! let mut b = Scene::builder();
//! let region = b.add_region("ball");
//! b.add_solid(region, "s", Box::new(Sphere::new(origin, 2.0)))?;
//! let scene = b.finish();
//!
//! let mut res = scene.opts().resource();
//! let status = fire(&scene, &ray, &LinearIndex, &mut res, &mut app)?;
//! ```

mod app;
mod error;
mod index;
mod options;
mod parallel;
mod scene;
mod shoot;

pub use app::{fire, Application, Callbacks, PartitionView};
pub use error::{Result, TraceError};
pub use index::{LinearIndex, SpatialIndex};
pub use options::TraceOptions;
pub use parallel::fire_parallel;
pub use scene::{PreparedSolid, Region, Scene, SceneBuilder, SceneError};
pub use shoot::shoot_ray;
