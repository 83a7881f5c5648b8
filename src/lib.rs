#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod geom;

use serde::{Deserialize, Serialize};

use geom::{
    CurvatureAnalysis, CurvatureOptions, EngineMetrics, MeshDiagnostics, MeshTopology,
    QualityAnalysis, QualityOptions, RefineError, TerrainMesh, TimingBucket, TopologyError,
    TriangulationError, analyze_curvature, analyze_quality, refine_mesh_passes,
    triangulate_points,
};

/// Errors surfaced by [`Engine::analyze`] and [`PointSet::new`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// The coordinate sequences have different lengths.
    #[error("coordinate lengths differ: x={x}, y={y}, z={z:?}")]
    MismatchedCoordinates { x: usize, y: usize, z: Option<usize> },
    #[error(transparent)]
    Triangulation(#[from] TriangulationError),
    #[error(transparent)]
    Topology(#[from] TopologyError),
    #[error(transparent)]
    Refine(#[from] RefineError),
}

/// Projected, normalized terrain samples as parallel coordinate sequences.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PointSet {
    x: Vec<f64>,
    y: Vec<f64>,
    z: Option<Vec<f64>>,
}

impl PointSet {
    /// Fails when `x`, `y` (and `z`, if given) differ in length.
    pub fn new(x: Vec<f64>, y: Vec<f64>, z: Option<Vec<f64>>) -> Result<Self, EngineError> {
        let z_len = z.as_ref().map(Vec::len);
        if x.len() != y.len() || z_len.is_some_and(|n| n != x.len()) {
            return Err(EngineError::MismatchedCoordinates {
                x: x.len(),
                y: y.len(),
                z: z_len,
            });
        }
        Ok(Self { x, y, z })
    }

    /// Samples without elevation; every point gets `z = 0`.
    pub fn planar(x: Vec<f64>, y: Vec<f64>) -> Result<Self, EngineError> {
        Self::new(x, y, None)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    #[must_use]
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    #[must_use]
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    #[must_use]
    pub fn z(&self) -> Option<&[f64]> {
        self.z.as_deref()
    }

    #[must_use]
    pub fn to_points(&self) -> Vec<geom::Point3> {
        TerrainMesh::points_from_coordinates(&self.x, &self.y, self.z())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub quality: QualityOptions,
    pub curvature: CurvatureOptions,
    /// Steiner refinement passes; 0 skips refinement.
    pub refine_passes: usize,
}

/// Everything computed for one point set.
#[derive(Debug, Clone)]
pub struct TerrainAnalysis {
    pub mesh: TerrainMesh,
    pub topology: MeshTopology,
    pub quality: QualityAnalysis,
    pub curvature: CurvatureAnalysis,
    /// Present when `refine_passes > 0`.
    pub refined: Option<TerrainMesh>,
    pub diagnostics: MeshDiagnostics,
}

/// Public entry point for consumers.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Triangulate, analyze and optionally refine `points`.
    pub fn analyze(&self, points: &PointSet) -> Result<TerrainAnalysis, EngineError> {
        let mut metrics = EngineMetrics::default();
        metrics.begin();

        log::debug!("Analyzing {} terrain samples", points.len());

        let triangulated =
            metrics.time(TimingBucket::Triangulation, || triangulate_points(&points.to_points()))?;
        let mesh = triangulated.mesh;

        let topology = metrics.time(TimingBucket::Topology, || MeshTopology::build(&mesh))?;

        let quality = metrics.time(TimingBucket::Quality, || {
            analyze_quality(&mesh, &self.config.quality)
        });
        let curvature = metrics.time(TimingBucket::Curvature, || {
            analyze_curvature(&mesh, &topology, &self.config.curvature)
        });

        let refined = if self.config.refine_passes > 0 {
            let result = metrics.time(TimingBucket::Refinement, || {
                refine_mesh_passes(&mesh, self.config.refine_passes)
            })?;
            Some(result)
        } else {
            None
        };

        let mut diagnostics = metrics.time(TimingBucket::Diagnostics, || {
            MeshDiagnostics::from_topology(&mesh, &topology, quality.report.degenerate_count)
        });
        if triangulated.diagnostics.folded_triangle_count > 0 {
            diagnostics.add_warning(format!(
                "{} folded sliver triangle(s) removed during triangulation",
                triangulated.diagnostics.folded_triangle_count
            ));
        }

        if let Some(result) = &refined {
            let refined_topology = metrics.time(TimingBucket::Topology, || {
                MeshTopology::build(&result.mesh)
            })?;
            let mut refined_diagnostics =
                MeshDiagnostics::from_topology(&result.mesh, &refined_topology, 0);
            if result.diagnostics.coincident_steiner_count > 0 {
                refined_diagnostics.add_warning(format!(
                    "{} Steiner point(s) coincided with existing points and were not triangulated",
                    result.diagnostics.coincident_steiner_count
                ));
            }
            if result.diagnostics.folded_triangle_count > 0 {
                refined_diagnostics.add_warning(format!(
                    "{} folded sliver triangle(s) removed during re-triangulation",
                    result.diagnostics.folded_triangle_count
                ));
            }
            diagnostics.merge_warnings("refined mesh", &refined_diagnostics);
        }
        diagnostics.timing = metrics.end();

        log::debug!("Analysis done: {}", diagnostics.summary());

        Ok(TerrainAnalysis {
            mesh,
            topology,
            quality,
            curvature,
            refined: refined.map(|result| result.mesh),
            diagnostics,
        })
    }
}
