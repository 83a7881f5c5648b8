mod core;
mod curvature;
mod diagnostics;
mod mesh;
mod metrics;
mod quality;
mod refine;
mod stats;
mod topology;
mod triangulation;

pub use core::{EdgeKey, Point3, Tolerance, Triangle, Vec3};
pub use curvature::{
    CurvatureAnalysis, CurvatureOptions, CurvatureRecord, CurvatureReport, CurvatureScale,
    DEFAULT_RANK_COUNT, RankedVertex, VertexCurvature, analyze_curvature, angle_sum,
};
pub use diagnostics::MeshDiagnostics;
pub use mesh::TerrainMesh;
pub use metrics::{EngineMetrics, TimingBucket, TimingReport};
pub use quality::{
    DEFAULT_FAT_THRESHOLD, DEFAULT_SKINNY_THRESHOLD, MeasureSpace, QualityAnalysis, QualityGrade,
    QualityOptions, QualityReport, QualityThresholds, TriangleQuality, analyze_quality,
};
pub use refine::{
    RefineError, RefinementDiagnostics, RefinementResult, refine_mesh, refine_mesh_passes,
    steiner_points,
};
pub use stats::{DistributionSummary, mean, percentile};
pub use topology::{MeshTopology, TopologyError, VertexClass};
pub use triangulation::{
    TriangulationDiagnostics, TriangulationError, TriangulationResult, triangulate_points,
};

#[cfg(test)]
mod tests;
