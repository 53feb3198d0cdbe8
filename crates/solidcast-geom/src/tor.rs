//! Torus primitive (quartic intersection through the root solver).

use crate::bbox::Aabb;
use crate::primitive::{
    Bounds, Classification, Primitive, PrimitiveError, Result, SegTag,
};
use crate::ray::Ray;
use crate::table::{PrimitiveType, SolidParams};
use solidcast_math::{Dir3, Point3, Tolerance, Vec3};
use solidcast_poly::{Complex, Polynomial, MAX_DEGREE};
use solidcast_resource::{Hit, Resource, SegId, Segment};
use std::f64::consts::PI;

/// A torus given by center, axis, major radius and tube radius.
#[derive(Debug, Clone, Copy)]
pub struct Torus {
    /// Center of the ring.
    pub center: Point3,
    /// Ring axis (unit).
    pub axis: Dir3,
    /// Major (ring) radius.
    pub major: f64,
    /// Minor (tube) radius; `0 < minor <= major`.
    pub minor: f64,
    /// Reference direction in the equatorial plane, for uv.
    ref_dir: Dir3,
}

impl Torus {
    /// Create a torus; the axis is unitized.
    pub fn new(center: Point3, axis: Vec3, major: f64, minor: f64) -> Self {
        let axis = Dir3::new_normalize(axis);
        // Any equatorial direction serves as the uv reference.
        let seed = if axis.x.abs() < 0.9 { Vec3::x() } else { Vec3::y() };
        let ref_dir = Dir3::new_normalize(axis.cross(&seed).cross(axis.as_ref()));
        Self {
            center,
            axis,
            major,
            minor,
            ref_dir,
        }
    }

    /// Build from a raw parameter vector
    /// `[cx, cy, cz, ax, ay, az, major, minor]`.
    pub fn build(params: &SolidParams) -> Result<Box<dyn Primitive>> {
        let [cx, cy, cz, ax, ay, az, major, minor] = params.expect::<8>(PrimitiveType::Torus)?;
        let axis = Vec3::new(ax, ay, az);
        if axis.norm() < 1.0e-12 {
            return Err(PrimitiveError::Degenerate {
                kind: PrimitiveType::Torus,
                reason: "zero-length axis".into(),
            });
        }
        Ok(Box::new(Self::new(
            Point3::new(cx, cy, cz),
            axis,
            major,
            minor,
        )))
    }

    /// Center of the tube circle nearest to a surface point.
    fn tube_center(&self, point: &Point3) -> Option<Point3> {
        let w = point - self.center;
        let h = w.dot(self.axis.as_ref());
        let proj = w - h * self.axis.as_ref();
        let len = proj.norm();
        if len < 1.0e-12 {
            return None;
        }
        Some(self.center + proj * (self.major / len))
    }
}

impl Primitive for Torus {
    fn kind(&self) -> PrimitiveType {
        PrimitiveType::Torus
    }

    fn prep(&self, tol: &Tolerance) -> Result<Bounds> {
        if self.minor <= tol.dist || self.major <= tol.dist {
            return Err(PrimitiveError::Degenerate {
                kind: PrimitiveType::Torus,
                reason: "radii must be positive".into(),
            });
        }
        if self.minor > self.major {
            return Err(PrimitiveError::Degenerate {
                kind: PrimitiveType::Torus,
                reason: format!(
                    "tube radius {} exceeds ring radius {}",
                    self.minor, self.major
                ),
            });
        }
        let reach = self.major + self.minor;
        let r = Vec3::new(reach, reach, reach);
        Ok(Bounds {
            aabb: Aabb::new(self.center - r, self.center + r),
            center: self.center,
            radius: reach,
        })
    }

    /// Substituting the ray into the implicit torus equation yields a
    /// quartic in t; its real roots, paired in order, are the surface
    /// crossings. A root-solver convergence failure is a miss, not an
    /// error.
    fn shoot(
        &self,
        ray: &Ray,
        tag: SegTag,
        res: &mut Resource,
        seghead: &mut Vec<SegId>,
    ) -> Result<usize> {
        let r2 = self.major * self.major;
        let a2 = self.minor * self.minor;
        let axis = self.axis.as_ref();
        let d = ray.direction.as_ref();
        let o = ray.origin - self.center;

        let od = o.dot(d);
        let oo = o.dot(&o);
        let oa = o.dot(axis);
        let da = d.dot(axis);

        let k = oo - (r2 + a2);
        let c4 = 1.0;
        let c3 = 4.0 * od;
        let c2 = 2.0 * k + 4.0 * od * od + 4.0 * r2 * da * da;
        let c1 = 4.0 * k * od + 8.0 * r2 * oa * da;
        let c0 = k * k - 4.0 * r2 * (a2 - oa * oa);

        let mut roots = [Complex::ZERO; MAX_DEGREE];
        let n = match Polynomial::quartic(c4, c3, c2, c1, c0).find_roots(&mut roots) {
            Ok(n) => n,
            Err(e) => {
                log::warn!("torus root extraction failed ({}), treating as miss", e);
                return Ok(0);
            }
        };

        let mut hits: Vec<f64> = roots[..n]
            .iter()
            .filter(|r| r.im.abs() < 1.0e-6 * (1.0 + r.re.abs()))
            .map(|r| r.re)
            .collect();
        if hits.is_empty() {
            return Ok(0);
        }
        if hits.len() % 2 != 0 {
            log::warn!(
                "torus reported {} crossings, expected an even count; dropping",
                hits.len()
            );
            return Ok(0);
        }
        hits.sort_by(f64::total_cmp);

        let mut count = 0;
        for pair in hits.chunks_exact(2) {
            let (t_in, t_out) = (pair[0], pair[1]);
            let make_hit = |t: f64| {
                let point = ray.at(t);
                let vpriv = match self.tube_center(&point) {
                    Some(q) => point - q,
                    None => point - self.center,
                };
                Hit {
                    dist: t,
                    point,
                    surf: 0,
                    vpriv,
                }
            };
            let id = res.get_seg(Segment {
                seg_in: make_hit(t_in),
                seg_out: make_hit(t_out),
                solid: tag.solid,
                region: tag.region,
            })?;
            seghead.push(id);
            count += 1;
        }
        Ok(count)
    }

    fn norm(&self, hit: &Hit, _ray: &Ray) -> Dir3 {
        Dir3::new_normalize(hit.vpriv)
    }

    fn uv(&self, hit: &Hit) -> (f64, f64) {
        let axis = self.axis.as_ref();
        let ref_dir = self.ref_dir.as_ref();
        let y_dir = axis.cross(ref_dir);
        let w = hit.point - self.center;
        let h = w.dot(axis);
        let proj = w - h * axis;

        let mut u = proj.dot(&y_dir).atan2(proj.dot(ref_dir)) / (2.0 * PI);
        if u < 0.0 {
            u += 1.0;
        }
        let mut v = h.atan2(proj.norm() - self.major) / (2.0 * PI);
        if v < 0.0 {
            v += 1.0;
        }
        (u, v)
    }

    fn classify(&self, point: &Point3, tol: &Tolerance) -> Classification {
        let w = point - self.center;
        let h = w.dot(self.axis.as_ref());
        let proj = w - h * self.axis.as_ref();
        let ring = proj.norm() - self.major;
        let dist = (ring * ring + h * h).sqrt() - self.minor;
        if dist.abs() < tol.dist {
            Classification::Surface
        } else if dist < 0.0 {
            Classification::Inside
        } else {
            Classification::Outside
        }
    }

    fn plot(&self) -> Vec<[Point3; 2]> {
        let axis = self.axis.as_ref();
        let x = self.ref_dir.as_ref();
        let y = axis.cross(x);
        let n = 16;
        let mut edges = Vec::new();
        // Equators at the outer and inner silhouette.
        for radius in [self.major + self.minor, self.major - self.minor] {
            let mut prev: Option<Point3> = None;
            for i in 0..=n {
                let a = 2.0 * PI * i as f64 / n as f64;
                let p = self.center + radius * (a.cos() * x + a.sin() * y);
                if let Some(q) = prev {
                    edges.push([q, p]);
                }
                prev = Some(p);
            }
        }
        // One poloidal tube circle at the reference direction.
        let tube_center = self.center + self.major * x;
        let mut prev: Option<Point3> = None;
        for i in 0..=n {
            let a = 2.0 * PI * i as f64 / n as f64;
            let p = tube_center + self.minor * (a.cos() * x + a.sin() * axis);
            if let Some(q) = prev {
                edges.push([q, p]);
            }
            prev = Some(p);
        }
        edges
    }
}
