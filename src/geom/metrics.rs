//! Opt-in timing hooks for the terrain pipeline.
//!
//! Timing is collected only when the `mesh_engine_metrics` feature is enabled. Without it,
//! every call compiles down to running the wrapped closure.
//!
//! # Usage
//!
//! ```ignore
//! use terrain_engine::geom::{EngineMetrics, TimingBucket};
//!
//! let mut metrics = EngineMetrics::default();
//! metrics.begin();
//!
//! let result = metrics.time(TimingBucket::Triangulation, || triangulate_points(&points));
//!
//! // None unless the feature is enabled
//! if let Some(report) = metrics.end() {
//!     println!("Triangulation: {} ns", report.triangulation_ns);
//! }
//! ```

use serde::Serialize;

/// Pipeline stages that can be timed. Each bucket accumulates across calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimingBucket {
    /// Delaunay triangulation of the input samples. Re-triangulation inside refinement
    /// counts as `Refinement`.
    Triangulation,
    /// Edge map and vertex fan construction.
    Topology,
    /// Per-triangle fatness measurements.
    Quality,
    /// Per-vertex angle deficit.
    Curvature,
    /// Steiner point insertion passes.
    Refinement,
    /// Diagnostics record assembly.
    Diagnostics,
}

/// Cumulative nanoseconds per stage.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct TimingReport {
    pub triangulation_ns: u64,
    pub topology_ns: u64,
    pub quality_ns: u64,
    pub curvature_ns: u64,
    pub refinement_ns: u64,
    pub diagnostics_ns: u64,
}

impl TimingReport {
    #[must_use]
    pub fn total_ns(&self) -> u64 {
        self.triangulation_ns
            .saturating_add(self.topology_ns)
            .saturating_add(self.quality_ns)
            .saturating_add(self.curvature_ns)
            .saturating_add(self.refinement_ns)
            .saturating_add(self.diagnostics_ns)
    }

    /// Returns the total time in milliseconds (for display purposes).
    #[must_use]
    pub fn total_ms(&self) -> f64 {
        self.total_ns() as f64 / 1_000_000.0
    }

    fn bucket_mut(&mut self, bucket: TimingBucket) -> &mut u64 {
        match bucket {
            TimingBucket::Triangulation => &mut self.triangulation_ns,
            TimingBucket::Topology => &mut self.topology_ns,
            TimingBucket::Quality => &mut self.quality_ns,
            TimingBucket::Curvature => &mut self.curvature_ns,
            TimingBucket::Refinement => &mut self.refinement_ns,
            TimingBucket::Diagnostics => &mut self.diagnostics_ns,
        }
    }

    /// Adds `nanos` to `bucket`, saturating at `u64::MAX`.
    pub fn add(&mut self, bucket: TimingBucket, nanos: u64) {
        let slot = self.bucket_mut(bucket);
        *slot = slot.saturating_add(nanos);
    }
}

/// Accumulator for timing pipeline stages.
///
/// Call [`begin`](Self::begin) to reset, wrap stages with [`time`](Self::time), and call
/// [`end`](Self::end) to retrieve the report. With the `mesh_engine_metrics` feature
/// disabled all methods are no-ops and [`end`](Self::end) returns `None`.
#[derive(Debug, Default)]
pub struct EngineMetrics {
    #[cfg(feature = "mesh_engine_metrics")]
    report: TimingReport,
}

impl EngineMetrics {
    pub fn begin(&mut self) {
        #[cfg(feature = "mesh_engine_metrics")]
        {
            self.report = TimingReport::default();
        }
    }

    #[must_use]
    pub fn end(&self) -> Option<TimingReport> {
        #[cfg(feature = "mesh_engine_metrics")]
        {
            Some(self.report.clone())
        }
        #[cfg(not(feature = "mesh_engine_metrics"))]
        {
            None
        }
    }

    /// Times `f` and accumulates the elapsed time in `bucket`.
    pub fn time<R>(&mut self, bucket: TimingBucket, f: impl FnOnce() -> R) -> R {
        #[cfg(feature = "mesh_engine_metrics")]
        {
            let start = std::time::Instant::now();
            let result = f();
            // Cap at u64::MAX to prevent overflow
            let nanos = u64::try_from(start.elapsed().as_nanos()).unwrap_or(u64::MAX);
            self.report.add(bucket, nanos);
            result
        }

        #[cfg(not(feature = "mesh_engine_metrics"))]
        {
            let _ = bucket;
            f()
        }
    }
}
