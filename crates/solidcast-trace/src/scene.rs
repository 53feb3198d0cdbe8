//! Scene preparation.
//!
//! A scene is prepared once (raw records resolved to primitive types,
//! each solid prepped for bounding data, region trees assembled into one
//! CSG tree) and is immutable afterwards, safely shared read-only by
//! every tracing worker.

use crate::options::TraceOptions;
use slotmap::SlotMap;
use solidcast_boolean::{BoolOp, CsgTree};
use solidcast_geom::{
    Bounds, CapabilityTable, Primitive, PrimitiveError, RawRecord, SolidParams,
};
use solidcast_resource::{RegionId, SolidId};
use thiserror::Error;

/// Errors from scene preparation.
#[derive(Error, Debug)]
pub enum SceneError {
    /// A solid failed preparation.
    #[error("solid '{name}' failed preparation: {source}")]
    Prep {
        /// Instance name of the failing solid.
        name: String,
        /// Underlying capability error.
        source: PrimitiveError,
    },
    /// A solid or tree referenced a region the builder never created.
    #[error("unknown region handle")]
    UnknownRegion,
}

/// One prepared solid instance.
#[derive(Debug)]
pub struct PreparedSolid {
    /// Instance name, for diagnostics.
    pub name: String,
    /// The capability set implementation.
    pub prim: Box<dyn Primitive>,
    /// Bounding data computed at preparation.
    pub bounds: Bounds,
    /// Region this solid participates in.
    pub region: RegionId,
}

/// A named boolean-combined solid.
#[derive(Debug)]
pub struct Region {
    /// Region name.
    pub name: String,
}

/// An immutable prepared scene.
#[derive(Debug)]
pub struct Scene {
    solids: SlotMap<SolidId, PreparedSolid>,
    regions: SlotMap<RegionId, Region>,
    tree: Option<CsgTree>,
    opts: TraceOptions,
}

impl Scene {
    /// Start building a scene with the built-in capability table.
    pub fn builder() -> SceneBuilder {
        SceneBuilder::new(CapabilityTable::with_builtin(), TraceOptions::default())
    }

    /// All prepared solids.
    pub fn solids(&self) -> impl Iterator<Item = (SolidId, &PreparedSolid)> {
        self.solids.iter()
    }

    /// One prepared solid.
    pub fn solid(&self, id: SolidId) -> &PreparedSolid {
        &self.solids[id]
    }

    /// One region.
    pub fn region(&self, id: RegionId) -> &Region {
        &self.regions[id]
    }

    /// The whole-scene CSG tree; `None` for an empty scene.
    pub fn tree(&self) -> Option<&CsgTree> {
        self.tree.as_ref()
    }

    /// The options the scene was prepared with.
    pub fn opts(&self) -> &TraceOptions {
        &self.opts
    }
}

/// Accumulates regions, solids and per-region trees, then prepares the
/// scene.
pub struct SceneBuilder {
    table: CapabilityTable,
    opts: TraceOptions,
    solids: SlotMap<SolidId, PreparedSolid>,
    regions: SlotMap<RegionId, Region>,
    region_order: Vec<RegionId>,
    region_solids: Vec<(RegionId, SolidId)>,
    region_trees: Vec<(RegionId, CsgTree)>,
}

impl SceneBuilder {
    /// A builder over an explicit capability table and options.
    pub fn new(table: CapabilityTable, opts: TraceOptions) -> Self {
        Self {
            table,
            opts,
            solids: SlotMap::with_key(),
            regions: SlotMap::with_key(),
            region_order: Vec::new(),
            region_solids: Vec::new(),
            region_trees: Vec::new(),
        }
    }

    /// Override the tracing options.
    pub fn options(mut self, opts: TraceOptions) -> Self {
        self.opts = opts;
        self
    }

    /// Create a region.
    pub fn add_region(&mut self, name: &str) -> RegionId {
        let id = self.regions.insert(Region { name: name.into() });
        self.region_order.push(id);
        id
    }

    /// Add an already-constructed primitive to a region.
    ///
    /// The primitive is prepped immediately; a degenerate solid fails the
    /// build rather than the first ray fired at it.
    pub fn add_solid(
        &mut self,
        region: RegionId,
        name: &str,
        prim: Box<dyn Primitive>,
    ) -> Result<SolidId, SceneError> {
        if !self.regions.contains_key(region) {
            return Err(SceneError::UnknownRegion);
        }
        let bounds = prim.prep(&self.opts.tol).map_err(|source| SceneError::Prep {
            name: name.into(),
            source,
        })?;
        let id = self.solids.insert(PreparedSolid {
            name: name.into(),
            prim,
            bounds,
            region,
        });
        self.region_solids.push((region, id));
        Ok(id)
    }

    /// Resolve a raw database record through the capability table and add
    /// the result. Unknown record kinds become placeholders and simply
    /// contribute nothing at trace time.
    pub fn add_record(
        &mut self,
        region: RegionId,
        name: &str,
        raw: &RawRecord<'_>,
        params: &SolidParams,
    ) -> Result<SolidId, SceneError> {
        let prim = self.table.build(raw, params).map_err(|source| SceneError::Prep {
            name: name.into(),
            source,
        })?;
        self.add_solid(region, name, prim)
    }

    /// Give a region an explicit boolean tree over its solids.
    ///
    /// Without one, the region defaults to the union of its solids in
    /// insertion order.
    pub fn set_region_tree(&mut self, region: RegionId, tree: CsgTree) -> Result<(), SceneError> {
        if !self.regions.contains_key(region) {
            return Err(SceneError::UnknownRegion);
        }
        self.region_trees.retain(|(r, _)| *r != region);
        self.region_trees.push((region, tree));
        Ok(())
    }

    /// Prepare the scene: assemble per-region trees and union them into
    /// the whole-scene tree.
    pub fn finish(self) -> Scene {
        let mut tree: Option<CsgTree> = None;
        for region in &self.region_order {
            let region_tree = match self.region_trees.iter().find(|(r, _)| r == region) {
                Some((_, t)) => Some(t.clone()),
                None => {
                    // Default: union of the region's solids, left to right.
                    let mut t: Option<CsgTree> = None;
                    for (r, s) in &self.region_solids {
                        if r == region {
                            let leaf = CsgTree::leaf(*s, *region);
                            t = Some(match t {
                                Some(prev) => CsgTree::node(BoolOp::Union, prev, leaf),
                                None => leaf,
                            });
                        }
                    }
                    t
                }
            };
            if let Some(rt) = region_tree {
                tree = Some(match tree {
                    Some(prev) => CsgTree::node(BoolOp::Union, prev, rt),
                    None => rt,
                });
            } else {
                log::debug!(
                    "region '{}' has no solids, skipped",
                    self.regions[*region].name
                );
            }
        }
        Scene {
            solids: self.solids,
            regions: self.regions,
            tree,
            opts: self.opts,
        }
    }
}
