//! Tracing configuration.

use solidcast_math::Tolerance;
use solidcast_resource::Resource;

/// Options threaded through scene preparation and ray evaluation.
///
/// There is no global state: options live on the scene, and every worker
/// derives its private [`Resource`] from them.
#[derive(Debug, Clone, Copy)]
pub struct TraceOptions {
    /// Distance tolerance for coincident-surface decisions.
    pub tol: Tolerance,
    /// Segments whose exit lies more than this far behind the ray start
    /// are dropped by the driver.
    pub cull_dist: f64,
    /// Bulk-growth block size of the per-worker segment arena.
    pub seg_block: usize,
    /// Hard ceiling on live segment records per worker.
    pub max_segs: usize,
}

impl TraceOptions {
    /// Build the per-worker resource these options call for.
    pub fn resource(&self) -> Resource {
        Resource::with_limits(self.seg_block, self.max_segs)
    }
}

impl Default for TraceOptions {
    fn default() -> Self {
        Self {
            tol: Tolerance::DEFAULT,
            cull_dist: 10.0,
            seg_block: 64,
            max_segs: 1 << 20,
        }
    }
}
