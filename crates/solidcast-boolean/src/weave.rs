//! Leaf promotion: raw segments of one primitive become a sorted,
//! non-overlapping partition list.

use solidcast_math::Tolerance;
use solidcast_resource::{Partition, PartitionList, Resource, SegId};

/// Promote one leaf's segments to single-primitive partitions.
///
/// Entry/exit distances within tolerance of zero are snapped to exactly
/// zero. Inside-out segments (exit measurably before entry) are discarded
/// with a log entry and treated as if the primitive missed; zero-width
/// spans are dropped after snapping. The result is sorted by entry
/// distance, ties broken by exit distance then by a stable id order, and
/// overlapping spans from the same leaf are fused so the output always
/// satisfies the partition-list invariant.
pub fn promote_segments(
    segs: &[SegId],
    res: &mut Resource,
    tol: &Tolerance,
) -> PartitionList {
    let mut list = res.get_partition_list();

    let mut raw: Vec<Partition> = Vec::with_capacity(segs.len());
    for &sid in segs {
        let seg = res.seg(sid);
        let mut in_dist = seg.seg_in.dist;
        let mut out_dist = seg.seg_out.dist;
        if tol.is_zero(in_dist) {
            in_dist = 0.0;
        }
        if tol.is_zero(out_dist) {
            out_dist = 0.0;
        }

        if out_dist < in_dist - tol.dist {
            log::warn!(
                "inside-out segment ({:.6e}, {:.6e}) discarded",
                in_dist,
                out_dist
            );
            continue;
        }
        if out_dist - in_dist <= tol.dist {
            // Grazing hit with no measurable width.
            continue;
        }

        raw.push(Partition {
            in_dist,
            out_dist,
            in_seg: sid,
            out_seg: sid,
            in_flip: false,
            out_flip: false,
            region: seg.region,
        });
    }

    raw.sort_by(|a, b| {
        a.in_dist
            .partial_cmp(&b.in_dist)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(
                a.out_dist
                    .partial_cmp(&b.out_dist)
                    .unwrap_or(std::cmp::Ordering::Equal),
            )
            .then_with(|| {
                let (sa, sb) = (res.seg(a.in_seg).solid, res.seg(b.in_seg).solid);
                sa.cmp(&sb).then(a.in_seg.cmp(&b.in_seg))
            })
    });

    // Fuse overlapping or touching spans from the same leaf.
    for p in raw {
        match list.last_mut() {
            Some(last) if p.in_dist <= last.out_dist + tol.dist => {
                if p.out_dist > last.out_dist {
                    last.out_dist = p.out_dist;
                    last.out_seg = p.out_seg;
                    last.out_flip = p.out_flip;
                }
            }
            _ => list.push(p),
        }
    }
    list
}
