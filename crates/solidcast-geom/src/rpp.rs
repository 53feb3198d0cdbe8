//! Axis-aligned box primitive (slab-method intersection).

use crate::bbox::Aabb;
use crate::primitive::{
    Bounds, Classification, Primitive, PrimitiveError, Result, SegTag, TriMesh,
};
use crate::ray::Ray;
use crate::table::{PrimitiveType, SolidParams};
use solidcast_math::{Dir3, Point3, Tolerance, Vec3};
use solidcast_resource::{Hit, Resource, SegId, Segment};

/// An axis-aligned rectangular parallelepiped.
#[derive(Debug, Clone, Copy)]
pub struct Rpp {
    /// Minimum corner.
    pub min: Point3,
    /// Maximum corner.
    pub max: Point3,
}

impl Rpp {
    /// Create a box from its corners.
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Build from a raw parameter vector
    /// `[xmin, xmax, ymin, ymax, zmin, zmax]`.
    pub fn build(params: &SolidParams) -> Result<Box<dyn Primitive>> {
        let [x0, x1, y0, y1, z0, z1] = params.expect::<6>(PrimitiveType::Rpp)?;
        Ok(Box::new(Self::new(
            Point3::new(x0, y0, z0),
            Point3::new(x1, y1, z1),
        )))
    }

    /// Outward normal of face `surf` (0..6: -x, +x, -y, +y, -z, +z).
    fn face_normal(surf: i32) -> Vec3 {
        let mut n = Vec3::zeros();
        n[(surf / 2) as usize] = if surf % 2 == 0 { -1.0 } else { 1.0 };
        n
    }
}

impl Primitive for Rpp {
    fn kind(&self) -> PrimitiveType {
        PrimitiveType::Rpp
    }

    fn prep(&self, tol: &Tolerance) -> Result<Bounds> {
        for axis in 0..3 {
            if self.max[axis] - self.min[axis] <= tol.dist {
                return Err(PrimitiveError::Degenerate {
                    kind: PrimitiveType::Rpp,
                    reason: format!("axis {} extent is not positive", axis),
                });
            }
        }
        Ok(Bounds::from_aabb(Aabb::new(self.min, self.max)))
    }

    fn shoot(
        &self,
        ray: &Ray,
        tag: SegTag,
        res: &mut Resource,
        seghead: &mut Vec<SegId>,
    ) -> Result<usize> {
        let mut t_in = f64::NEG_INFINITY;
        let mut t_out = f64::INFINITY;
        let mut surf_in = -1;
        let mut surf_out = -1;

        for axis in 0..3 {
            let o = ray.origin[axis];
            let d = ray.direction.as_ref()[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);
            if d.abs() < 1.0e-12 {
                if o < lo || o > hi {
                    return Ok(0);
                }
                continue;
            }
            let (mut t1, mut t2) = ((lo - o) / d, (hi - o) / d);
            let (mut s1, mut s2) = ((axis * 2) as i32, (axis * 2 + 1) as i32);
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
                std::mem::swap(&mut s1, &mut s2);
            }
            if t1 > t_in {
                t_in = t1;
                surf_in = s1;
            }
            if t2 < t_out {
                t_out = t2;
                surf_out = s2;
            }
        }
        if t_in > t_out || surf_in < 0 || surf_out < 0 {
            return Ok(0);
        }

        let id = res.get_seg(Segment {
            seg_in: Hit {
                dist: t_in,
                point: ray.at(t_in),
                surf: surf_in,
                vpriv: Self::face_normal(surf_in),
            },
            seg_out: Hit {
                dist: t_out,
                point: ray.at(t_out),
                surf: surf_out,
                vpriv: Self::face_normal(surf_out),
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
        // Face-local parameters over the two in-plane axes.
        let axis = (hit.surf / 2) as usize;
        let (ua, va) = ((axis + 1) % 3, (axis + 2) % 3);
        let span = |a: usize| (self.max[a] - self.min[a]).max(1.0e-12);
        (
            (hit.point[ua] - self.min[ua]) / span(ua),
            (hit.point[va] - self.min[va]) / span(va),
        )
    }

    fn classify(&self, point: &Point3, tol: &Tolerance) -> Classification {
        let mut on_surface = false;
        for axis in 0..3 {
            let (p, lo, hi) = (point[axis], self.min[axis], self.max[axis]);
            if p < lo - tol.dist || p > hi + tol.dist {
                return Classification::Outside;
            }
            if (p - lo).abs() < tol.dist || (p - hi).abs() < tol.dist {
                on_surface = true;
            }
        }
        if on_surface {
            Classification::Surface
        } else {
            Classification::Inside
        }
    }

    fn plot(&self) -> Vec<[Point3; 2]> {
        let c = |mask: u8| {
            Point3::new(
                if mask & 1 != 0 { self.max.x } else { self.min.x },
                if mask & 2 != 0 { self.max.y } else { self.min.y },
                if mask & 4 != 0 { self.max.z } else { self.min.z },
            )
        };
        // 12 edges: each pair of corners differing in exactly one bit.
        let mut edges = Vec::with_capacity(12);
        for a in 0u8..8 {
            for bit in [1u8, 2, 4] {
                let b = a | bit;
                if b != a {
                    edges.push([c(a), c(b)]);
                }
            }
        }
        edges
    }

    fn tessellate(&self, _tol: &Tolerance) -> Result<TriMesh> {
        let c = |mask: u8| {
            Point3::new(
                if mask & 1 != 0 { self.max.x } else { self.min.x },
                if mask & 2 != 0 { self.max.y } else { self.min.y },
                if mask & 4 != 0 { self.max.z } else { self.min.z },
            )
        };
        let vertices: Vec<Point3> = (0u8..8).map(c).collect();
        // Two triangles per face, outward winding.
        let triangles = vec![
            [0, 2, 6], [0, 6, 4], // -y
            [1, 7, 3], [1, 5, 7], // +y
            [0, 4, 5], [0, 5, 1], // -z
            [2, 7, 6], [2, 3, 7], // +z
            [0, 3, 2], [0, 1, 3], // -x
            [4, 6, 7], [4, 7, 5], // +x
        ];
        Ok(TriMesh {
            vertices,
            triangles,
        })
    }
}
