#![warn(missing_docs)]

//! CSG boolean evaluation over ray partitions for the solidcast core.
//!
//! A ray fired through a scene yields raw per-primitive [`segments`]
//! (entry/exit intervals). This crate turns them into the final answer:
//! leaf promotion sorts and sanitizes each primitive's segments into
//! single-primitive partitions, and the evaluator walks the [`CsgTree`]
//! bottom-up, merging children with [`BoolOp::Union`],
//! [`BoolOp::Intersect`] or [`BoolOp::Subtract`] until one sorted,
//! non-overlapping, region-attributed partition list spans the whole tree.
//!
//! [`segments`]: solidcast_resource::Segment

mod eval;
mod tree;
mod weave;

pub use eval::{eval_op, evaluate};
pub use tree::{BoolOp, CsgTree};
pub use weave::promote_segments;
