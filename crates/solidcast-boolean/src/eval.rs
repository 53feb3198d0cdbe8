//! The boolean evaluator: merging partition lists through the CSG tree.
//!
//! Each operator consumes two sorted, non-overlapping partition lists and
//! produces a third; one distance tolerance is applied identically in all
//! three so touching faces neither open spurious gaps nor double-count
//! slivers. The operators are purely functional over their inputs: the
//! output list is allocated from the worker's resource and the inputs are
//! never mutated.

use crate::tree::{BoolOp, CsgTree};
use crate::weave::promote_segments;
use slotmap::SecondaryMap;
use solidcast_math::Tolerance;
use solidcast_resource::{Partition, PartitionList, Resource, SegId, SolidId};

/// Apply one boolean operator to two evaluated partition lists.
pub fn eval_op(
    op: BoolOp,
    a: &PartitionList,
    b: &PartitionList,
    res: &mut Resource,
    tol: &Tolerance,
) -> PartitionList {
    debug_assert!(a.is_ordered(tol), "left operand violates the invariant");
    debug_assert!(b.is_ordered(tol), "right operand violates the invariant");
    let mut out = res.get_partition_list();
    match op {
        BoolOp::Union => union_into(a.as_slice(), b.as_slice(), &mut out, tol),
        BoolOp::Intersect => intersect_into(a.as_slice(), b.as_slice(), &mut out, tol),
        BoolOp::Subtract => subtract_into(a.as_slice(), b.as_slice(), &mut out, tol),
    }
    debug_assert!(out.is_ordered(tol), "operator output violates the invariant");
    out
}

/// Evaluate a whole CSG tree bottom-up against one ray's segments.
///
/// `leaf_segs` maps each solid the ray may have struck to its raw
/// segments; solids with no entry are clean misses and contribute an
/// empty list. Intermediate lists are returned to the resource as the
/// walk unwinds.
pub fn evaluate(
    tree: &CsgTree,
    leaf_segs: &SecondaryMap<SolidId, Vec<SegId>>,
    res: &mut Resource,
    tol: &Tolerance,
) -> PartitionList {
    match tree {
        CsgTree::Leaf { solid, .. } => match leaf_segs.get(*solid) {
            Some(segs) => promote_segments(segs, res, tol),
            None => res.get_partition_list(),
        },
        CsgTree::Node { op, left, right } => {
            let l = evaluate(left, leaf_segs, res, tol);
            let r = evaluate(right, leaf_segs, res, tol);
            let out = eval_op(*op, &l, &r, res, tol);
            res.free_partition_list(l);
            res.free_partition_list(r);
            out
        }
    }
}

/// UNION: merge by entry distance; overlapping or touching partitions
/// fuse into one span attributed to whichever region's partition started
/// first. The left operand wins exact ties because it is drawn first.
fn union_into(av: &[Partition], bv: &[Partition], out: &mut PartitionList, tol: &Tolerance) {
    let (mut i, mut j) = (0usize, 0usize);
    let mut cur: Option<Partition> = None;
    loop {
        let next = if i < av.len() && (j >= bv.len() || av[i].in_dist <= bv[j].in_dist) {
            i += 1;
            av[i - 1]
        } else if j < bv.len() {
            j += 1;
            bv[j - 1]
        } else {
            break;
        };
        match cur.as_mut() {
            None => cur = Some(next),
            Some(c) => {
                if next.in_dist <= c.out_dist + tol.dist {
                    if next.out_dist > c.out_dist {
                        c.out_dist = next.out_dist;
                        c.out_seg = next.out_seg;
                        c.out_flip = next.out_flip;
                    }
                } else {
                    out.push(*c);
                    *c = next;
                }
            }
        }
    }
    if let Some(c) = cur {
        out.push(c);
    }
}

/// INTERSECT: emit every sub-interval simultaneously covered by both
/// operands. The interval is attributed to the operand whose in-hit is
/// nearer the ray origin; that is what lets subtraction and intersection
/// "see through" the composition. The boundary hits come from whichever
/// surface actually bounds the sub-interval.
fn intersect_into(av: &[Partition], bv: &[Partition], out: &mut PartitionList, tol: &Tolerance) {
    let (mut i, mut j) = (0usize, 0usize);
    while i < av.len() && j < bv.len() {
        let (pa, pb) = (av[i], bv[j]);
        let in_dist = pa.in_dist.max(pb.in_dist);
        let out_dist = pa.out_dist.min(pb.out_dist);
        if out_dist - in_dist > tol.dist {
            let region = if pa.in_dist <= pb.in_dist {
                pa.region
            } else {
                pb.region
            };
            let (in_seg, in_flip) = if pa.in_dist >= pb.in_dist {
                (pa.in_seg, pa.in_flip)
            } else {
                (pb.in_seg, pb.in_flip)
            };
            let (out_seg, out_flip) = if pa.out_dist <= pb.out_dist {
                (pa.out_seg, pa.out_flip)
            } else {
                (pb.out_seg, pb.out_flip)
            };
            out.push(Partition {
                in_dist,
                out_dist,
                in_seg,
                out_seg,
                in_flip,
                out_flip,
                region,
            });
        }
        if pa.out_dist <= pb.out_dist {
            i += 1;
        } else {
            j += 1;
        }
    }
}

/// SUBTRACT: emit the parts of A's partitions not covered by any B
/// partition, all still attributed to A's region. Where B punches a hole
/// through the middle of an A partition, two pieces come out; the cut
/// boundaries borrow B's hits with flipped orientation.
fn subtract_into(av: &[Partition], bv: &[Partition], out: &mut PartitionList, tol: &Tolerance) {
    let mut j = 0usize;
    for pa in av {
        while j < bv.len() && bv[j].out_dist <= pa.in_dist + tol.dist {
            j += 1;
        }
        let mut cur_in = pa.in_dist;
        let mut cur_in_seg = pa.in_seg;
        let mut cur_in_flip = pa.in_flip;
        let mut consumed = false;

        let mut k = j;
        while k < bv.len() && bv[k].in_dist < pa.out_dist - tol.dist {
            let pb = bv[k];
            if pb.out_dist <= cur_in + tol.dist {
                k += 1;
                continue;
            }
            if pb.in_dist > cur_in + tol.dist {
                out.push(Partition {
                    in_dist: cur_in,
                    out_dist: pb.in_dist,
                    in_seg: cur_in_seg,
                    out_seg: pb.in_seg,
                    in_flip: cur_in_flip,
                    out_flip: !pb.in_flip,
                    region: pa.region,
                });
            }
            if pb.out_dist >= pa.out_dist - tol.dist {
                consumed = true;
                break;
            }
            cur_in = pb.out_dist;
            cur_in_seg = pb.out_seg;
            cur_in_flip = !pb.out_flip;
            k += 1;
        }

        if !consumed && pa.out_dist - cur_in > tol.dist {
            out.push(Partition {
                in_dist: cur_in,
                out_dist: pa.out_dist,
                in_seg: cur_in_seg,
                out_seg: pa.out_seg,
                in_flip: cur_in_flip,
                out_flip: pa.out_flip,
                region: pa.region,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;
    use solidcast_math::Point3;
    use solidcast_resource::{Hit, RegionId, Segment};

    struct Fixture {
        res: Resource,
        tol: Tolerance,
        solids: SlotMap<SolidId, ()>,
        regions: SlotMap<RegionId, ()>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                res: Resource::new(),
                tol: Tolerance::DEFAULT,
                solids: SlotMap::with_key(),
                regions: SlotMap::with_key(),
            }
        }

        fn solid(&mut self) -> SolidId {
            self.solids.insert(())
        }

        fn region(&mut self) -> RegionId {
            self.regions.insert(())
        }

        fn seg(&mut self, solid: SolidId, region: RegionId, in_d: f64, out_d: f64) -> SegId {
            self.res
                .get_seg(Segment {
                    seg_in: Hit::at_dist(in_d, Point3::origin(), 0),
                    seg_out: Hit::at_dist(out_d, Point3::origin(), 0),
                    solid,
                    region,
                })
                .unwrap()
        }

        fn plist(&mut self, solid: SolidId, region: RegionId, spans: &[(f64, f64)]) -> PartitionList {
            let segs: Vec<SegId> = spans
                .iter()
                .map(|&(i, o)| self.seg(solid, region, i, o))
                .collect();
            promote_segments(&segs, &mut self.res, &self.tol)
        }
    }

    fn spans(list: &PartitionList) -> Vec<(f64, f64)> {
        list.iter().map(|p| (p.in_dist, p.out_dist)).collect()
    }

    #[test]
    fn test_scenario_union_intersect_subtract() {
        // A = [1,5], B = [3,7]
        let mut fx = Fixture::new();
        let (sa, sb) = (fx.solid(), fx.solid());
        let (ra, rb) = (fx.region(), fx.region());
        let a = fx.plist(sa, ra, &[(1.0, 5.0)]);
        let b = fx.plist(sb, rb, &[(3.0, 7.0)]);

        let u = eval_op(BoolOp::Union, &a, &b, &mut fx.res, &fx.tol);
        assert_eq!(spans(&u), vec![(1.0, 7.0)]);
        assert_eq!(u.as_slice()[0].region, ra, "union attributed to first entrant");

        let i = eval_op(BoolOp::Intersect, &a, &b, &mut fx.res, &fx.tol);
        assert_eq!(spans(&i), vec![(3.0, 5.0)]);
        assert_eq!(i.as_slice()[0].region, ra, "A's in-hit is nearer the origin");

        let s = eval_op(BoolOp::Subtract, &a, &b, &mut fx.res, &fx.tol);
        assert_eq!(spans(&s), vec![(1.0, 3.0)]);
        assert_eq!(s.as_slice()[0].region, ra);
        assert!(s.as_slice()[0].out_flip, "cut boundary borrows B's in-hit, flipped");
    }

    #[test]
    fn test_subtract_splits_partition() {
        let mut fx = Fixture::new();
        let (sa, sb) = (fx.solid(), fx.solid());
        let (ra, rb) = (fx.region(), fx.region());
        let a = fx.plist(sa, ra, &[(0.0, 10.0)]);
        let b = fx.plist(sb, rb, &[(4.0, 6.0)]);
        let s = eval_op(BoolOp::Subtract, &a, &b, &mut fx.res, &fx.tol);
        assert_eq!(spans(&s), vec![(0.0, 4.0), (6.0, 10.0)]);
        assert!(s.iter().all(|p| p.region == ra), "both pieces keep A's region");
    }

    #[test]
    fn test_union_of_disjoint_stays_disjoint() {
        let mut fx = Fixture::new();
        let (sa, sb) = (fx.solid(), fx.solid());
        let (ra, rb) = (fx.region(), fx.region());
        let a = fx.plist(sa, ra, &[(0.0, 1.0), (4.0, 5.0)]);
        let b = fx.plist(sb, rb, &[(2.0, 3.0)]);
        let u = eval_op(BoolOp::Union, &a, &b, &mut fx.res, &fx.tol);
        assert_eq!(spans(&u), vec![(0.0, 1.0), (2.0, 3.0), (4.0, 5.0)]);
    }

    #[test]
    fn test_touching_faces() {
        // Adjacent primitives with coincident faces: union bridges the
        // joint, intersection sees no shared material, subtraction leaves
        // A whole.
        let mut fx = Fixture::new();
        let (sa, sb) = (fx.solid(), fx.solid());
        let (ra, rb) = (fx.region(), fx.region());
        let a = fx.plist(sa, ra, &[(0.0, 1.0)]);
        let b = fx.plist(sb, rb, &[(1.0, 2.0)]);

        let u = eval_op(BoolOp::Union, &a, &b, &mut fx.res, &fx.tol);
        assert_eq!(spans(&u), vec![(0.0, 2.0)]);

        let i = eval_op(BoolOp::Intersect, &a, &b, &mut fx.res, &fx.tol);
        assert!(i.is_empty());

        let s = eval_op(BoolOp::Subtract, &a, &b, &mut fx.res, &fx.tol);
        assert_eq!(spans(&s), vec![(0.0, 1.0)]);
    }

    #[test]
    fn test_union_commutes_on_intervals() {
        let mut fx = Fixture::new();
        let (sa, sb) = (fx.solid(), fx.solid());
        let (ra, rb) = (fx.region(), fx.region());
        let a = fx.plist(sa, ra, &[(0.0, 2.0), (5.0, 8.0)]);
        let b = fx.plist(sb, rb, &[(1.0, 3.0), (9.0, 11.0)]);
        let ab = eval_op(BoolOp::Union, &a, &b, &mut fx.res, &fx.tol);
        let ba = eval_op(BoolOp::Union, &b, &a, &mut fx.res, &fx.tol);
        // Commutative up to region attribution.
        assert_eq!(spans(&ab), spans(&ba));
    }

    #[test]
    fn test_union_associates_on_intervals() {
        let mut fx = Fixture::new();
        let (sa, sb, sc) = (fx.solid(), fx.solid(), fx.solid());
        let r = fx.region();
        let a = fx.plist(sa, r, &[(0.0, 2.0)]);
        let b = fx.plist(sb, r, &[(1.0, 4.0)]);
        let c = fx.plist(sc, r, &[(3.0, 6.0)]);

        let ab = eval_op(BoolOp::Union, &a, &b, &mut fx.res, &fx.tol);
        let ab_c = eval_op(BoolOp::Union, &ab, &c, &mut fx.res, &fx.tol);
        let bc = eval_op(BoolOp::Union, &b, &c, &mut fx.res, &fx.tol);
        let a_bc = eval_op(BoolOp::Union, &a, &bc, &mut fx.res, &fx.tol);
        assert_eq!(spans(&ab_c), spans(&a_bc));
        assert_eq!(spans(&ab_c), vec![(0.0, 6.0)]);
    }

    #[test]
    fn test_intersect_self_is_identity() {
        let mut fx = Fixture::new();
        let sa = fx.solid();
        let ra = fx.region();
        let a = fx.plist(sa, ra, &[(1.0, 2.0), (4.0, 7.0)]);
        let i = eval_op(BoolOp::Intersect, &a, &a, &mut fx.res, &fx.tol);
        assert_eq!(spans(&i), spans(&a));
    }

    #[test]
    fn test_subtract_self_is_empty() {
        let mut fx = Fixture::new();
        let sa = fx.solid();
        let ra = fx.region();
        let a = fx.plist(sa, ra, &[(1.0, 2.0), (4.0, 7.0)]);
        let s = eval_op(BoolOp::Subtract, &a, &a, &mut fx.res, &fx.tol);
        assert!(s.is_empty());
    }

    #[test]
    fn test_outputs_preserve_invariant() {
        let mut fx = Fixture::new();
        let (sa, sb) = (fx.solid(), fx.solid());
        let (ra, rb) = (fx.region(), fx.region());
        let a = fx.plist(sa, ra, &[(0.0, 3.0), (5.0, 9.0), (12.0, 13.0)]);
        let b = fx.plist(sb, rb, &[(2.0, 6.0), (8.0, 14.0)]);
        for op in [BoolOp::Union, BoolOp::Intersect, BoolOp::Subtract] {
            let out = eval_op(op, &a, &b, &mut fx.res, &fx.tol);
            assert!(out.is_ordered(&fx.tol), "{} output must stay ordered", op);
        }
    }

    #[test]
    fn test_empty_operand_behaviour() {
        // A primitive that misses contributes an empty list; no operator
        // may fail on it.
        let mut fx = Fixture::new();
        let sa = fx.solid();
        let ra = fx.region();
        let a = fx.plist(sa, ra, &[(1.0, 5.0)]);
        let empty = fx.res.get_partition_list();

        let u = eval_op(BoolOp::Union, &a, &empty, &mut fx.res, &fx.tol);
        assert_eq!(spans(&u), vec![(1.0, 5.0)]);
        let i = eval_op(BoolOp::Intersect, &a, &empty, &mut fx.res, &fx.tol);
        assert!(i.is_empty());
        let s = eval_op(BoolOp::Subtract, &a, &empty, &mut fx.res, &fx.tol);
        assert_eq!(spans(&s), vec![(1.0, 5.0)]);
        let s2 = eval_op(BoolOp::Subtract, &empty, &a, &mut fx.res, &fx.tol);
        assert!(s2.is_empty());
    }

    #[test]
    fn test_evaluate_tree() {
        // (A union B) subtract C over one region each.
        let mut fx = Fixture::new();
        let (sa, sb, sc) = (fx.solid(), fx.solid(), fx.solid());
        let (ra, rb, rc) = (fx.region(), fx.region(), fx.region());

        let mut leaf_segs: SecondaryMap<SolidId, Vec<SegId>> = SecondaryMap::new();
        let seg_a = fx.seg(sa, ra, 0.0, 4.0);
        let seg_b = fx.seg(sb, rb, 6.0, 10.0);
        let seg_c = fx.seg(sc, rc, 3.0, 7.0);
        leaf_segs.insert(sa, vec![seg_a]);
        leaf_segs.insert(sb, vec![seg_b]);
        leaf_segs.insert(sc, vec![seg_c]);

        let tree = CsgTree::node(
            BoolOp::Subtract,
            CsgTree::node(BoolOp::Union, CsgTree::leaf(sa, ra), CsgTree::leaf(sb, rb)),
            CsgTree::leaf(sc, rc),
        );
        let out = evaluate(&tree, &leaf_segs, &mut fx.res, &fx.tol);
        assert_eq!(spans(&out), vec![(0.0, 3.0), (7.0, 10.0)]);
        assert_eq!(out.as_slice()[0].region, ra);
        assert_eq!(out.as_slice()[1].region, rb);
    }

    #[test]
    fn test_evaluate_missing_leaf_is_clean_miss() {
        let mut fx = Fixture::new();
        let (sa, sb) = (fx.solid(), fx.solid());
        let (ra, rb) = (fx.region(), fx.region());
        let mut leaf_segs: SecondaryMap<SolidId, Vec<SegId>> = SecondaryMap::new();
        let seg_a = fx.seg(sa, ra, 1.0, 2.0);
        leaf_segs.insert(sa, vec![seg_a]);
        // B has no segments at all.
        let tree = CsgTree::node(
            BoolOp::Union,
            CsgTree::leaf(sa, ra),
            CsgTree::leaf(sb, rb),
        );
        let out = evaluate(&tree, &leaf_segs, &mut fx.res, &fx.tol);
        assert_eq!(spans(&out), vec![(1.0, 2.0)]);
    }

    #[test]
    fn test_idempotent_evaluation() {
        let mut fx = Fixture::new();
        let (sa, sb) = (fx.solid(), fx.solid());
        let (ra, rb) = (fx.region(), fx.region());
        let mut leaf_segs: SecondaryMap<SolidId, Vec<SegId>> = SecondaryMap::new();
        leaf_segs.insert(sa, vec![fx.seg(sa, ra, 0.0, 5.0)]);
        leaf_segs.insert(sb, vec![fx.seg(sb, rb, 2.0, 8.0)]);
        let tree = CsgTree::node(
            BoolOp::Intersect,
            CsgTree::leaf(sa, ra),
            CsgTree::leaf(sb, rb),
        );
        let first = evaluate(&tree, &leaf_segs, &mut fx.res, &fx.tol);
        let second = evaluate(&tree, &leaf_segs, &mut fx.res, &fx.tol);
        assert_eq!(first, second, "same ray, same scene: bit-identical output");
    }
}
