//! The CSG combination tree.
//!
//! Built once during scene preparation and read-only during all
//! subsequent ray shots; the evaluator walks it bottom-up. Finite and
//! acyclic by construction, so no cycle detection is needed.

use solidcast_resource::{RegionId, SolidId};
use std::fmt;

/// Boolean operator of an internal CSG node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    /// Material present in either child.
    Union,
    /// Material present in both children.
    Intersect,
    /// Material of the left child not covered by the right.
    Subtract,
}

impl fmt::Display for BoolOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BoolOp::Union => "union",
            BoolOp::Intersect => "intersect",
            BoolOp::Subtract => "subtract",
        })
    }
}

/// A node of the CSG combination tree.
#[derive(Debug, Clone)]
pub enum CsgTree {
    /// A primitive solid, owned by a region.
    Leaf {
        /// The prepared solid this leaf references.
        solid: SolidId,
        /// The region the leaf belongs to.
        region: RegionId,
    },
    /// A boolean combination of two subtrees.
    Node {
        /// Operator applied to the children.
        op: BoolOp,
        /// Left operand.
        left: Box<CsgTree>,
        /// Right operand.
        right: Box<CsgTree>,
    },
}

impl CsgTree {
    /// A leaf node.
    pub fn leaf(solid: SolidId, region: RegionId) -> Self {
        CsgTree::Leaf { solid, region }
    }

    /// An internal node.
    pub fn node(op: BoolOp, left: CsgTree, right: CsgTree) -> Self {
        CsgTree::Node {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Every solid referenced by the tree, left-to-right.
    pub fn solids(&self) -> Vec<SolidId> {
        let mut out = Vec::new();
        self.collect_solids(&mut out);
        out
    }

    fn collect_solids(&self, out: &mut Vec<SolidId>) {
        match self {
            CsgTree::Leaf { solid, .. } => out.push(*solid),
            CsgTree::Node { left, right, .. } => {
                left.collect_solids(out);
                right.collect_solids(out);
            }
        }
    }
}
