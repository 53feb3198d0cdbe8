//! Half-space primitive.
//!
//! Material fills the side of the plane `n . x <= d`. Segments are
//! half-infinite; the distance at the unbounded end is +/-infinity and its
//! hit carries no surface data.

use crate::primitive::{Bounds, Classification, Primitive, PrimitiveError, Result, SegTag};
use crate::ray::Ray;
use crate::table::{PrimitiveType, SolidParams};
use solidcast_math::{Dir3, Point3, Tolerance, Vec3};
use solidcast_resource::{Hit, Resource, SegId, Segment};

/// A half-space bounded by the plane `normal . x = d`.
#[derive(Debug, Clone, Copy)]
pub struct Halfspace {
    /// Outward plane normal (unit).
    pub normal: Dir3,
    /// Plane offset along the normal.
    pub d: f64,
}

impl Halfspace {
    /// Create a half-space; the normal is unitized.
    pub fn new(normal: Vec3, d: f64) -> Self {
        Self {
            normal: Dir3::new_normalize(normal),
            d,
        }
    }

    /// Build from a raw parameter vector `[nx, ny, nz, d]`.
    pub fn build(params: &SolidParams) -> Result<Box<dyn Primitive>> {
        let [nx, ny, nz, d] = params.expect::<4>(PrimitiveType::Halfspace)?;
        let n = Vec3::new(nx, ny, nz);
        if n.norm() < 1.0e-12 {
            return Err(PrimitiveError::Degenerate {
                kind: PrimitiveType::Halfspace,
                reason: "zero-length normal".into(),
            });
        }
        Ok(Box::new(Self::new(n, d)))
    }

    fn unbounded_hit(dist: f64, ray: &Ray) -> Hit {
        // No surface exists at the unbounded end; the point is a
        // placeholder, only the distance participates in evaluation.
        Hit {
            dist,
            point: ray.origin,
            surf: -1,
            vpriv: Vec3::zeros(),
        }
    }
}

impl Primitive for Halfspace {
    fn kind(&self) -> PrimitiveType {
        PrimitiveType::Halfspace
    }

    fn prep(&self, _tol: &Tolerance) -> Result<Bounds> {
        Ok(Bounds::unbounded())
    }

    fn shoot(
        &self,
        ray: &Ray,
        tag: SegTag,
        res: &mut Resource,
        seghead: &mut Vec<SegId>,
    ) -> Result<usize> {
        let n = self.normal.as_ref();
        let denom = n.dot(ray.direction.as_ref());
        let height = n.dot(&ray.origin.coords) - self.d;

        let seg = if denom.abs() < 1.0e-12 {
            if height > 0.0 {
                return Ok(0);
            }
            // Ray runs parallel inside the material.
            Segment {
                seg_in: Self::unbounded_hit(f64::NEG_INFINITY, ray),
                seg_out: Self::unbounded_hit(f64::INFINITY, ray),
                solid: tag.solid,
                region: tag.region,
            }
        } else {
            let t = -height / denom;
            let plane_hit = Hit {
                dist: t,
                point: ray.at(t),
                surf: 0,
                vpriv: *n,
            };
            if denom < 0.0 {
                // Descending below the plane: entering material.
                Segment {
                    seg_in: plane_hit,
                    seg_out: Self::unbounded_hit(f64::INFINITY, ray),
                    solid: tag.solid,
                    region: tag.region,
                }
            } else {
                Segment {
                    seg_in: Self::unbounded_hit(f64::NEG_INFINITY, ray),
                    seg_out: plane_hit,
                    solid: tag.solid,
                    region: tag.region,
                }
            }
        };
        seghead.push(res.get_seg(seg)?);
        Ok(1)
    }

    fn norm(&self, _hit: &Hit, _ray: &Ray) -> Dir3 {
        self.normal
    }

    fn classify(&self, point: &Point3, tol: &Tolerance) -> Classification {
        let h = self.normal.as_ref().dot(&point.coords) - self.d;
        if h.abs() < tol.dist {
            Classification::Surface
        } else if h < 0.0 {
            Classification::Inside
        } else {
            Classification::Outside
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solidcast_resource::{RegionId, SolidId};

    fn tag() -> SegTag {
        SegTag {
            solid: SolidId::default(),
            region: RegionId::default(),
        }
    }

    #[test]
    fn test_entering() {
        // Material below z = 2; ray descending from above.
        let half = Halfspace::new(Vec3::z(), 2.0);
        let ray = Ray::new(Point3::new(0.0, 0.0, 10.0), -Vec3::z());
        let mut res = Resource::new();
        let mut segs = Vec::new();
        half.shoot(&ray, tag(), &mut res, &mut segs).unwrap();
        let seg = res.seg(segs[0]);
        assert!((seg.seg_in.dist - 8.0).abs() < 1e-10);
        assert_eq!(seg.seg_out.dist, f64::INFINITY);
    }

    #[test]
    fn test_leaving() {
        let half = Halfspace::new(Vec3::z(), 2.0);
        let ray = Ray::new(Point3::new(0.0, 0.0, -10.0), Vec3::z());
        let mut res = Resource::new();
        let mut segs = Vec::new();
        half.shoot(&ray, tag(), &mut res, &mut segs).unwrap();
        let seg = res.seg(segs[0]);
        assert_eq!(seg.seg_in.dist, f64::NEG_INFINITY);
        assert!((seg.seg_out.dist - 12.0).abs() < 1e-10);
    }

    #[test]
    fn test_parallel() {
        let half = Halfspace::new(Vec3::z(), 2.0);
        let mut res = Resource::new();

        let inside = Ray::new(Point3::new(0.0, 0.0, 0.0), Vec3::x());
        let mut segs = Vec::new();
        assert_eq!(half.shoot(&inside, tag(), &mut res, &mut segs).unwrap(), 1);
        let seg = res.seg(segs[0]);
        assert_eq!(seg.seg_in.dist, f64::NEG_INFINITY);
        assert_eq!(seg.seg_out.dist, f64::INFINITY);

        let outside = Ray::new(Point3::new(0.0, 0.0, 5.0), Vec3::x());
        let mut segs = Vec::new();
        assert_eq!(half.shoot(&outside, tag(), &mut res, &mut segs).unwrap(), 0);
    }

    #[test]
    fn test_classify() {
        let half = Halfspace::new(Vec3::z(), 2.0);
        let tol = Tolerance::DEFAULT;
        assert_eq!(
            half.classify(&Point3::new(0.0, 0.0, 0.0), &tol),
            Classification::Inside
        );
        assert_eq!(
            half.classify(&Point3::new(0.0, 0.0, 3.0), &tol),
            Classification::Outside
        );
        assert_eq!(
            half.classify(&Point3::new(5.0, 5.0, 2.0), &tol),
            Classification::Surface
        );
    }
}
