//! Primitive type identifiers, raw-record resolution, and the capability
//! table.
//!
//! The engine dispatches every per-solid operation through this table; it
//! never hard-codes a primitive type. Unknown or unimplemented types
//! resolve to a placeholder capability set that contributes nothing to the
//! boolean result instead of failing the ray.

use std::collections::HashMap;

use crate::half::Halfspace;
use crate::primitive::{Bounds, Primitive, PrimitiveError, Result, SegTag};
use crate::ray::Ray;
use crate::rpp::Rpp;
use crate::sphere::Sphere;
use crate::tor::Torus;
use solidcast_math::Tolerance;
use solidcast_resource::{Resource, SegId};

/// Internal primitive type identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    /// Unknown or unimplemented record; resolves to the placeholder set.
    Null,
    /// Torus.
    Torus,
    /// Sphere.
    Sphere,
    /// Axis-aligned rectangular parallelepiped.
    Rpp,
    /// Half-space bounded by a plane.
    Halfspace,
    /// Extruded bitmap solid (string-typed record; not implemented here).
    Ebm,
    /// Voxel solid (string-typed record; not implemented here).
    Vol,
    /// Height field (string-typed record; not implemented here).
    HeightField,
    /// Displacement map (string-typed record; not implemented here).
    Dsp,
    /// Nested sub-model reference (string-typed record; not implemented
    /// here).
    Submodel,
}

/// A raw on-disk solid record as the database loader presents it, before
/// type resolution. Resolution happens once per primitive at scene
/// preparation, never per ray.
#[derive(Debug, Clone)]
pub enum RawRecord<'a> {
    /// Fixed-format solid record with a numeric subtype tag.
    Solid(u8),
    /// "Generic/typed" record keyed by a short textual discriminator.
    Typed {
        /// The keyword naming the solid type.
        keyword: &'a str,
    },
}

/// Numeric subtype tags of fixed-format solid records.
const SOLID_TAGS: &[(u8, PrimitiveType)] = &[
    (1, PrimitiveType::Torus),
    (2, PrimitiveType::Sphere),
    (3, PrimitiveType::Rpp),
    (4, PrimitiveType::Halfspace),
];

/// Map a raw on-disk record kind to the internal type id space.
///
/// A static table covers the numeric tags; string-typed records are
/// matched by keyword, with a prefix rule for versioned displacement-map
/// keywords (`dsp`, `dsp_v4`, ...). Unknown records log once and resolve
/// to [`PrimitiveType::Null`].
pub fn resolve_record_type(raw: &RawRecord<'_>) -> PrimitiveType {
    match raw {
        RawRecord::Solid(tag) => {
            for (t, ty) in SOLID_TAGS {
                if t == tag {
                    return *ty;
                }
            }
            log::warn!("unknown solid record tag {}", tag);
            PrimitiveType::Null
        }
        RawRecord::Typed { keyword } => match *keyword {
            "ebm" => PrimitiveType::Ebm,
            "vol" => PrimitiveType::Vol,
            "hf" => PrimitiveType::HeightField,
            "submodel" => PrimitiveType::Submodel,
            kw if kw.starts_with("dsp") => PrimitiveType::Dsp,
            kw => {
                log::warn!("string solid type '{}' unknown", kw);
                PrimitiveType::Null
            }
        },
    }
}

/// Raw parameter vector of a solid record.
#[derive(Debug, Clone)]
pub struct SolidParams {
    /// Type-specific values, in record order.
    pub values: Vec<f64>,
}

impl SolidParams {
    /// Wrap a value slice.
    pub fn new(values: &[f64]) -> Self {
        Self {
            values: values.to_vec(),
        }
    }

    /// The values as a fixed-size array, or the arity error.
    pub fn expect<const N: usize>(&self, kind: PrimitiveType) -> Result<[f64; N]> {
        let got = self.values.len();
        self.values
            .as_slice()
            .try_into()
            .map_err(|_| PrimitiveError::ParamCount {
                kind,
                expect: N,
                got,
            })
    }
}

/// Constructor for one primitive type.
pub type Builder = fn(&SolidParams) -> Result<Box<dyn Primitive>>;

/// The registry mapping a primitive type to its capability set.
///
/// Built once at scene preparation and read-only afterwards. Lookups for
/// unregistered types yield the placeholder builder, never an error.
#[derive(Debug, Default)]
pub struct CapabilityTable {
    builders: HashMap<PrimitiveType, Builder>,
}

impl CapabilityTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// A table with every built-in solid type registered.
    pub fn with_builtin() -> Self {
        let mut table = Self::new();
        table.register(PrimitiveType::Sphere, Sphere::build);
        table.register(PrimitiveType::Torus, Torus::build);
        table.register(PrimitiveType::Rpp, Rpp::build);
        table.register(PrimitiveType::Halfspace, Halfspace::build);
        table
    }

    /// Register (or replace) the builder for a type.
    pub fn register(&mut self, ty: PrimitiveType, builder: Builder) {
        self.builders.insert(ty, builder);
    }

    /// The capability set for a type id.
    ///
    /// Unregistered types resolve to the placeholder builder.
    pub fn capabilities_for(&self, ty: PrimitiveType) -> Builder {
        match self.builders.get(&ty) {
            Some(b) => *b,
            None => {
                log::debug!("{:?} is not registered, using placeholder", ty);
                placeholder_builder
            }
        }
    }

    /// Resolve a raw record and build its primitive in one step.
    pub fn build(&self, raw: &RawRecord<'_>, params: &SolidParams) -> Result<Box<dyn Primitive>> {
        let ty = resolve_record_type(raw);
        (self.capabilities_for(ty))(params)
    }
}

fn placeholder_builder(_params: &SolidParams) -> Result<Box<dyn Primitive>> {
    Ok(Box::new(Placeholder))
}

/// The no-op capability set for unimplemented or unknown types.
///
/// Shoot returns zero segments; every other capability uses the trait's
/// neutral default. The engine never crashes on an unrecognized type; it
/// silently contributes nothing to the boolean result.
#[derive(Debug, Clone, Copy)]
pub struct Placeholder;

impl Primitive for Placeholder {
    fn kind(&self) -> PrimitiveType {
        PrimitiveType::Null
    }

    fn prep(&self, _tol: &Tolerance) -> Result<Bounds> {
        Ok(Bounds::empty())
    }

    fn shoot(
        &self,
        _ray: &Ray,
        _tag: SegTag,
        _res: &mut Resource,
        _seghead: &mut Vec<SegId>,
    ) -> Result<usize> {
        log::debug!("shoot through placeholder type, no segments");
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solidcast_math::{Point3, Vec3};
    use solidcast_resource::{RegionId, SolidId};

    #[test]
    fn test_resolve_numeric_tags() {
        assert_eq!(
            resolve_record_type(&RawRecord::Solid(2)),
            PrimitiveType::Sphere
        );
        assert_eq!(
            resolve_record_type(&RawRecord::Solid(1)),
            PrimitiveType::Torus
        );
        assert_eq!(
            resolve_record_type(&RawRecord::Solid(99)),
            PrimitiveType::Null
        );
    }

    #[test]
    fn test_resolve_string_keywords() {
        assert_eq!(
            resolve_record_type(&RawRecord::Typed { keyword: "ebm" }),
            PrimitiveType::Ebm
        );
        assert_eq!(
            resolve_record_type(&RawRecord::Typed { keyword: "vol" }),
            PrimitiveType::Vol
        );
        // prefix rule for versioned keywords
        assert_eq!(
            resolve_record_type(&RawRecord::Typed { keyword: "dsp_v4" }),
            PrimitiveType::Dsp
        );
        assert_eq!(
            resolve_record_type(&RawRecord::Typed { keyword: "bogus" }),
            PrimitiveType::Null
        );
    }

    #[test]
    fn test_unregistered_type_gets_placeholder() {
        let table = CapabilityTable::with_builtin();
        // Ebm resolves but has no implementation registered.
        let builder = table.capabilities_for(PrimitiveType::Ebm);
        let prim = builder(&SolidParams::new(&[])).unwrap();
        assert_eq!(prim.kind(), PrimitiveType::Null);

        // Shooting through the placeholder yields no segments and no error.
        let mut res = Resource::new();
        let mut seghead = Vec::new();
        let ray = Ray::new(Point3::origin(), Vec3::x());
        let tag = SegTag {
            solid: SolidId::default(),
            region: RegionId::default(),
        };
        let n = prim.shoot(&ray, tag, &mut res, &mut seghead).unwrap();
        assert_eq!(n, 0);
        assert!(seghead.is_empty());
    }

    #[test]
    fn test_builtin_build_sphere() {
        let table = CapabilityTable::with_builtin();
        let prim = table
            .build(
                &RawRecord::Solid(2),
                &SolidParams::new(&[0.0, 0.0, 0.0, 5.0]),
            )
            .unwrap();
        assert_eq!(prim.kind(), PrimitiveType::Sphere);
    }

    #[test]
    fn test_param_arity_error() {
        let table = CapabilityTable::with_builtin();
        let err = table
            .build(&RawRecord::Solid(2), &SolidParams::new(&[1.0, 2.0]))
            .unwrap_err();
        assert!(matches!(err, PrimitiveError::ParamCount { .. }));
    }
}
