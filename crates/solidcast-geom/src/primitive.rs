//! The primitive capability set.
//!
//! Every solid type plugs into the engine through the [`Primitive`] trait;
//! the engine itself never names a concrete type. Capabilities the type
//! does not support fall back to neutral defaults so an exotic or
//! unimplemented solid degrades to "contributes nothing" instead of
//! failing the ray.

use crate::bbox::Aabb;
use crate::ray::Ray;
use crate::table::PrimitiveType;
use solidcast_math::{Dir3, Point3, Tolerance, Vec3};
use solidcast_resource::{Hit, RegionId, Resource, ResourceError, SegId, SolidId};
use thiserror::Error;

/// Errors a primitive capability may raise.
#[derive(Error, Debug)]
pub enum PrimitiveError {
    /// Solid parameters do not describe a usable shape.
    #[error("degenerate {kind:?} parameters: {reason}")]
    Degenerate {
        /// Offending primitive type.
        kind: PrimitiveType,
        /// What was wrong.
        reason: String,
    },
    /// Raw parameter vector has the wrong arity for the type.
    #[error("wrong parameter count for {kind:?}: expected {expect}, got {got}")]
    ParamCount {
        /// Primitive type being built.
        kind: PrimitiveType,
        /// Expected value count.
        expect: usize,
        /// Supplied value count.
        got: usize,
    },
    /// The capability is not implemented for this type.
    #[error("{op} is not supported by {kind:?}")]
    Unsupported {
        /// Capability name.
        op: &'static str,
        /// Primitive type.
        kind: PrimitiveType,
    },
    /// Segment arena exhaustion while emitting hits. Unlike the other
    /// variants this is escalated, not treated as a miss.
    #[error(transparent)]
    Resource(#[from] ResourceError),
}

/// Result alias for primitive capabilities.
pub type Result<T> = std::result::Result<T, PrimitiveError>;

/// Ownership tags stamped onto every segment a shoot emits.
#[derive(Debug, Clone, Copy)]
pub struct SegTag {
    /// The prepared solid the segments belong to.
    pub solid: SolidId,
    /// The region that solid participates in.
    pub region: RegionId,
}

/// Prepared bounding data for one solid.
#[derive(Debug, Clone, Copy)]
pub struct Bounds {
    /// Axis-aligned bounds.
    pub aabb: Aabb,
    /// Bounding-sphere center.
    pub center: Point3,
    /// Bounding-sphere radius; `f64::INFINITY` for unbounded solids.
    pub radius: f64,
}

impl Bounds {
    /// Bounds derived from an AABB.
    pub fn from_aabb(aabb: Aabb) -> Self {
        Self {
            center: aabb.center(),
            radius: aabb.bounding_radius(),
            aabb,
        }
    }

    /// Bounds of an unbounded solid (half-space): every ray is a candidate.
    pub fn unbounded() -> Self {
        Self {
            aabb: Aabb::new(
                Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
                Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            ),
            center: Point3::origin(),
            radius: f64::INFINITY,
        }
    }

    /// Empty bounds: no ray is ever a candidate.
    pub fn empty() -> Self {
        Self {
            aabb: Aabb::empty(),
            center: Point3::origin(),
            radius: 0.0,
        }
    }
}

/// Principal surface curvature at a hit.
#[derive(Debug, Clone, Copy)]
pub struct Curvature {
    /// First principal curvature.
    pub c1: f64,
    /// Second principal curvature.
    pub c2: f64,
    /// Direction of the first principal curvature.
    pub pdir: Dir3,
}

impl Curvature {
    /// Flat (zero-curvature) value with an arbitrary principal direction.
    pub fn flat() -> Self {
        Self {
            c1: 0.0,
            c2: 0.0,
            pdir: Dir3::new_unchecked(Vec3::x()),
        }
    }
}

/// Point-vs-solid classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Strictly inside the solid.
    Inside,
    /// Strictly outside.
    Outside,
    /// On the surface within tolerance.
    Surface,
    /// The type cannot classify points.
    Unknown,
}

/// A triangle mesh produced by the tessellation capability.
#[derive(Debug, Clone, Default)]
pub struct TriMesh {
    /// Vertex positions.
    pub vertices: Vec<Point3>,
    /// Triangles as vertex-index triples.
    pub triangles: Vec<[u32; 3]>,
}

/// The capability set a solid type implements to plug into the engine.
///
/// `shoot` and `prep` are the load-bearing capabilities; everything else
/// has a neutral default so partial implementations stay usable. All
/// methods take `&self`: primitives are immutable after preparation and
/// shared read-only across workers.
pub trait Primitive: Send + Sync + std::fmt::Debug {
    /// The type this instance implements.
    fn kind(&self) -> PrimitiveType;

    /// Validate parameters and compute bounding data. Run once at scene
    /// preparation, never per ray.
    fn prep(&self, tol: &Tolerance) -> Result<Bounds>;

    /// Intersect a ray with the solid.
    ///
    /// Appends the ids of zero or more arena-allocated segments to
    /// `seghead` and returns how many were added. Each segment must have
    /// entry distance <= exit distance. Must be pure with respect to the
    /// ray and the primitive.
    fn shoot(
        &self,
        ray: &Ray,
        tag: SegTag,
        res: &mut Resource,
        seghead: &mut Vec<SegId>,
    ) -> Result<usize>;

    /// Outward surface normal at a hit, reconstructed from the hit's
    /// incidence data. The default (for placeholder types) faces the
    /// ray origin.
    fn norm(&self, _hit: &Hit, ray: &Ray) -> Dir3 {
        log::debug!("{:?} has no norm capability", self.kind());
        Dir3::new_unchecked(-ray.direction.as_ref())
    }

    /// Surface parameter coordinates at a hit.
    fn uv(&self, _hit: &Hit) -> (f64, f64) {
        log::debug!("{:?} has no uv capability", self.kind());
        (0.0, 0.0)
    }

    /// Principal curvature at a hit.
    fn curvature(&self, _hit: &Hit, _ray: &Ray) -> Curvature {
        log::debug!("{:?} has no curvature capability", self.kind());
        Curvature::flat()
    }

    /// Classify a point against the solid.
    fn classify(&self, _point: &Point3, _tol: &Tolerance) -> Classification {
        log::debug!("{:?} has no classify capability", self.kind());
        Classification::Unknown
    }

    /// Wireframe edges for display.
    fn plot(&self) -> Vec<[Point3; 2]> {
        log::debug!("{:?} has no plot capability", self.kind());
        Vec::new()
    }

    /// Shoot a batch of rays.
    ///
    /// The default simply loops the scalar capability; types with a
    /// vectorized path override it.
    fn shoot_batch(
        &self,
        rays: &[Ray],
        tag: SegTag,
        res: &mut Resource,
    ) -> Result<Vec<Vec<SegId>>> {
        let mut out = Vec::with_capacity(rays.len());
        for ray in rays {
            let mut seghead = Vec::new();
            self.shoot(ray, tag, res, &mut seghead)?;
            out.push(seghead);
        }
        Ok(out)
    }

    /// Tessellate the solid into triangles.
    fn tessellate(&self, _tol: &Tolerance) -> Result<TriMesh> {
        Err(PrimitiveError::Unsupported {
            op: "tessellate",
            kind: self.kind(),
        })
    }
}
