//! Sphere primitive (quadratic intersection).

use crate::primitive::{
    Bounds, Classification, Curvature, Primitive, PrimitiveError, Result, SegTag,
};
use crate::ray::Ray;
use crate::table::{PrimitiveType, SolidParams};
use crate::bbox::Aabb;
use solidcast_math::{Dir3, Point3, Tolerance, Vec3};
use solidcast_resource::{Hit, Resource, SegId, Segment};
use std::f64::consts::PI;

/// A sphere given by center and radius.
#[derive(Debug, Clone, Copy)]
pub struct Sphere {
    /// Center point.
    pub center: Point3,
    /// Radius; positive.
    pub radius: f64,
}

impl Sphere {
    /// Create a sphere.
    pub fn new(center: Point3, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Build from a raw parameter vector `[cx, cy, cz, r]`.
    pub fn build(params: &SolidParams) -> Result<Box<dyn Primitive>> {
        let [cx, cy, cz, r] = params.expect::<4>(PrimitiveType::Sphere)?;
        Ok(Box::new(Self::new(Point3::new(cx, cy, cz), r)))
    }
}

impl Primitive for Sphere {
    fn kind(&self) -> PrimitiveType {
        PrimitiveType::Sphere
    }

    fn prep(&self, tol: &Tolerance) -> Result<Bounds> {
        if self.radius <= tol.dist {
            return Err(PrimitiveError::Degenerate {
                kind: PrimitiveType::Sphere,
                reason: format!("radius {} is not positive", self.radius),
            });
        }
        let r = Vec3::new(self.radius, self.radius, self.radius);
        Ok(Bounds {
            aabb: Aabb::new(self.center - r, self.center + r),
            center: self.center,
            radius: self.radius,
        })
    }

    /// Solve `|oc + t*d|^2 = r^2` for t; a hit yields one entry/exit
    /// segment, a tangent a zero-width one.
    fn shoot(
        &self,
        ray: &Ray,
        tag: SegTag,
        res: &mut Resource,
        seghead: &mut Vec<SegId>,
    ) -> Result<usize> {
        let oc = ray.origin - self.center;
        let d = ray.direction.as_ref();

        let b = 2.0 * oc.dot(d);
        let c = oc.dot(&oc) - self.radius * self.radius;
        let disc = b * b - 4.0 * c;
        if disc < 0.0 {
            return Ok(0);
        }

        let sq = disc.sqrt();
        let t1 = (-b - sq) / 2.0;
        let t2 = (-b + sq) / 2.0;

        let p1 = ray.at(t1);
        let p2 = ray.at(t2);
        let id = res.get_seg(Segment {
            seg_in: Hit {
                dist: t1,
                point: p1,
                surf: 0,
                vpriv: p1 - self.center,
            },
            seg_out: Hit {
                dist: t2,
                point: p2,
                surf: 0,
                vpriv: p2 - self.center,
            },
            solid: tag.solid,
            region: tag.region,
        })?;
        seghead.push(id);
        Ok(1)
    }

    fn norm(&self, hit: &Hit, _ray: &Ray) -> Dir3 {
        Dir3::new_normalize(hit.vpriv)
    }

    fn uv(&self, hit: &Hit) -> (f64, f64) {
        let n = hit.vpriv / self.radius;
        // u = longitude in [0, 1), v = latitude in [0, 1]
        let mut u = n.y.atan2(n.x) / (2.0 * PI);
        if u < 0.0 {
            u += 1.0;
        }
        let v = n.z.clamp(-1.0, 1.0).asin() / PI + 0.5;
        (u, v)
    }

    fn curvature(&self, hit: &Hit, ray: &Ray) -> Curvature {
        let k = 1.0 / self.radius;
        let n = self.norm(hit, ray);
        // Any tangent works as the principal direction on a sphere.
        let seed = if n.x.abs() < 0.9 { Vec3::x() } else { Vec3::y() };
        Curvature {
            c1: k,
            c2: k,
            pdir: Dir3::new_normalize(n.cross(&seed)),
        }
    }

    fn classify(&self, point: &Point3, tol: &Tolerance) -> Classification {
        let d = (point - self.center).norm() - self.radius;
        if d.abs() < tol.dist {
            Classification::Surface
        } else if d < 0.0 {
            Classification::Inside
        } else {
            Classification::Outside
        }
    }

    fn plot(&self) -> Vec<[Point3; 2]> {
        // Three great circles, one per coordinate plane.
        let mut edges = Vec::new();
        let n = 16;
        for axis in 0..3 {
            let mut prev: Option<Point3> = None;
            for i in 0..=n {
                let a = 2.0 * PI * i as f64 / n as f64;
                let (s, c) = a.sin_cos();
                let offset = match axis {
                    0 => Vec3::new(0.0, c, s),
                    1 => Vec3::new(c, 0.0, s),
                    _ => Vec3::new(c, s, 0.0),
                };
                let p = self.center + self.radius * offset;
                if let Some(q) = prev {
                    edges.push([q, p]);
                }
                prev = Some(p);
            }
        }
        edges
    }
}
