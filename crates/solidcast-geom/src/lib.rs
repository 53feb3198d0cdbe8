#![warn(missing_docs)]

//! Primitive solids and capability dispatch for the solidcast core.
//!
//! Every solid type plugs into the ray engine through the [`Primitive`]
//! trait: prepare, shoot, normal, uv, curvature, classify, plot,
//! vectorized shoot, tessellate. The engine resolves raw database records
//! to type ids once at scene preparation ([`resolve_record_type`]) and
//! dispatches through an immutable [`CapabilityTable`]; unknown types fall
//! back to a placeholder set that contributes nothing instead of failing.
//!
//! The concrete types here (sphere, box, half-space, torus) cover the
//! closed-form quadratic, planar, half-infinite, and solver-backed quartic
//! intersection families; the full primitive catalogue lives with the
//! geometry collaborators, not in this crate.

pub mod bbox;
mod half;
mod primitive;
mod ray;
mod rpp;
mod sphere;
mod table;
mod tor;

pub use bbox::Aabb;
pub use half::Halfspace;
pub use primitive::{
    Bounds, Classification, Curvature, Primitive, PrimitiveError, Result, SegTag, TriMesh,
};
pub use ray::Ray;
pub use rpp::Rpp;
pub use sphere::Sphere;
pub use table::{
    resolve_record_type, Builder, CapabilityTable, Placeholder, PrimitiveType, RawRecord,
    SolidParams,
};
pub use tor::Torus;
