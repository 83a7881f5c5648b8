//! Discrete Gaussian curvature by angle deficit.
//!
//! For an interior vertex `v` the corner angles of all incident triangles at `v` are summed
//! and the curvature is `|2π − Σθ|`: zero for a flat fan, growing with how much the fan
//! folds out of its tangent plane. Angles are measured on full 3D positions, so elevation
//! is what makes the terrain "curved".
//!
//! Boundary vertices do not have a closed fan. Their deficit says more about the outline
//! of the sampled region than about the surface, so they are reported as
//! [`VertexCurvature::Boundary`] rather than as a number. Vertices used by no triangle are
//! likewise [`VertexCurvature::Unreferenced`]. Statistics only ever see interior values.

use std::f64::consts::TAU;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::stats::{DistributionSummary, percentile};
use super::{MeshTopology, Point3, TerrainMesh, VertexClass};

pub const DEFAULT_RANK_COUNT: usize = 5;

/// Curvature at one vertex. Only `Interior` carries a value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum VertexCurvature {
    Interior(f64),
    Boundary,
    Unreferenced,
}

impl VertexCurvature {
    #[must_use]
    pub fn value(self) -> Option<f64> {
        match self {
            Self::Interior(k) => Some(k),
            Self::Boundary | Self::Unreferenced => None,
        }
    }

    #[must_use]
    pub fn is_defined(self) -> bool {
        matches!(self, Self::Interior(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurvatureOptions {
    /// Length of the flattest / most curved lists.
    pub rank_count: usize,
}

impl Default for CurvatureOptions {
    fn default() -> Self {
        Self {
            rank_count: DEFAULT_RANK_COUNT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RankedVertex {
    pub vertex: usize,
    pub curvature: f64,
    pub incident_triangles: usize,
    pub position: Point3,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurvatureReport {
    pub interior_count: usize,
    pub boundary_count: usize,
    pub unreferenced_count: usize,
    /// Statistics over interior vertices only.
    pub summary: DistributionSummary,
    /// Lowest curvature first.
    pub flattest: Vec<RankedVertex>,
    /// Highest curvature first.
    pub most_curved: Vec<RankedVertex>,
}

impl fmt::Display for CurvatureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Curvature Analysis Report")?;
        writeln!(f, "  Boundary vertices: {}", self.boundary_count)?;
        writeln!(f, "  Interior vertices: {}", self.interior_count)?;
        if self.unreferenced_count > 0 {
            writeln!(f, "  Unreferenced vertices: {}", self.unreferenced_count)?;
        }
        if self.interior_count == 0 {
            return writeln!(f, "  No interior vertices found");
        }

        writeln!(f, "  Min curvature:    {:.6} rad", self.summary.min)?;
        writeln!(f, "  Max curvature:    {:.6} rad", self.summary.max)?;
        writeln!(f, "  Mean curvature:   {:.6} rad", self.summary.mean)?;
        writeln!(f, "  Median curvature: {:.6} rad", self.summary.median)?;

        for (title, list) in [
            ("Flattest interior vertices", &self.flattest),
            ("Most curved interior vertices", &self.most_curved),
        ] {
            writeln!(f, "  {title}:")?;
            for r in list {
                writeln!(
                    f,
                    "    Vertex {:4}: {:.6} rad | Triangles: {:2} | Coords: ({:.2}, {:.2})",
                    r.vertex, r.curvature, r.incident_triangles, r.position.x, r.position.y
                )?;
            }
        }
        Ok(())
    }
}

/// One row of the per-vertex curvature table, in a fixed field order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurvatureRecord {
    pub vertex_id: usize,
    /// `None` for boundary and unreferenced vertices.
    pub curvature: Option<f64>,
    pub incident_triangles: usize,
    pub is_boundary: bool,
    pub x: f64,
    pub y: f64,
}

/// Value transforms for heat-map style consumers.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum CurvatureScale {
    #[default]
    Linear,
    /// `ln(1 + k)`.
    Log,
    /// Clamp into the `[low, high]` percentile window (percent, 0..=100) of interior values.
    Percentile { low: f64, high: f64 },
    /// Clamp into `[0, max]`.
    Clip { max: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurvatureAnalysis {
    /// One entry per mesh point, in point order.
    pub vertices: Vec<VertexCurvature>,
    pub report: CurvatureReport,
}

impl CurvatureAnalysis {
    /// Per-vertex values aligned with the point array; `None` where undefined.
    #[must_use]
    pub fn values(&self) -> Vec<Option<f64>> {
        self.vertices.iter().map(|c| c.value()).collect()
    }

    /// Defined values only, in vertex order.
    #[must_use]
    pub fn interior_values(&self) -> Vec<f64> {
        self.vertices.iter().filter_map(|c| c.value()).collect()
    }

    /// Per-vertex table for export collaborators, one record per mesh point.
    #[must_use]
    pub fn curvature_table(&self, mesh: &TerrainMesh, topology: &MeshTopology) -> Vec<CurvatureRecord> {
        self.vertices
            .iter()
            .zip(&mesh.points)
            .enumerate()
            .map(|(vertex_id, (curvature, p))| CurvatureRecord {
                vertex_id,
                curvature: curvature.value(),
                incident_triangles: topology.incident_triangles(vertex_id).len(),
                is_boundary: topology.is_boundary_vertex(vertex_id),
                x: p.x,
                y: p.y,
            })
            .collect()
    }

    /// Values transformed by `scale`; undefined vertices stay `None`.
    #[must_use]
    pub fn scaled_values(&self, scale: CurvatureScale) -> Vec<Option<f64>> {
        let transform: Box<dyn Fn(f64) -> f64> = match scale {
            CurvatureScale::Linear => Box::new(|k: f64| k),
            CurvatureScale::Log => Box::new(f64::ln_1p),
            CurvatureScale::Percentile { low, high } => {
                let interior = self.interior_values();
                let lo = percentile(&interior, low.min(high)).unwrap_or(0.0);
                let hi = percentile(&interior, low.max(high)).unwrap_or(0.0);
                Box::new(move |k: f64| k.clamp(lo, hi.max(lo)))
            }
            CurvatureScale::Clip { max } => {
                let max = max.max(0.0);
                Box::new(move |k: f64| k.clamp(0.0, max))
            }
        };
        self.vertices
            .iter()
            .map(|c| c.value().map(&transform))
            .collect()
    }
}

/// Sum of the corner angles at `vertex` over its incident triangles.
///
/// Corners with a zero-length edge (coincident samples) contribute nothing.
#[must_use]
pub fn angle_sum(mesh: &TerrainMesh, topology: &MeshTopology, vertex: usize) -> f64 {
    let Some(&center) = mesh.points.get(vertex) else {
        return 0.0;
    };

    topology
        .incident_triangles(vertex)
        .iter()
        .filter_map(|&t| mesh.triangles.get(t)?.neighbors_of(vertex))
        .filter_map(|(a, b)| {
            let e1 = *mesh.points.get(a)? - center;
            let e2 = *mesh.points.get(b)? - center;
            e1.angle_to(e2)
        })
        .sum()
}

/// Angle-deficit curvature for every vertex of `mesh`.
#[must_use]
pub fn analyze_curvature(
    mesh: &TerrainMesh,
    topology: &MeshTopology,
    options: &CurvatureOptions,
) -> CurvatureAnalysis {
    let vertices = vertex_curvatures(mesh, topology);
    let report = build_report(mesh, topology, &vertices, options.rank_count);

    log::debug!(
        "Curvature: {} interior / {} boundary vertices, mean {:.6} rad",
        report.interior_count,
        report.boundary_count,
        report.summary.mean
    );

    CurvatureAnalysis { vertices, report }
}

fn vertex_curvature(mesh: &TerrainMesh, topology: &MeshTopology, vertex: usize) -> VertexCurvature {
    match topology.classify_vertex(vertex) {
        VertexClass::Boundary => VertexCurvature::Boundary,
        VertexClass::Unreferenced => VertexCurvature::Unreferenced,
        VertexClass::Interior => {
            VertexCurvature::Interior((TAU - angle_sum(mesh, topology, vertex)).abs())
        }
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "parallel")] {
        use rayon::prelude::*;

        fn vertex_curvatures(mesh: &TerrainMesh, topology: &MeshTopology) -> Vec<VertexCurvature> {
            (0..mesh.vertex_count())
                .into_par_iter()
                .map(|v| vertex_curvature(mesh, topology, v))
                .collect()
        }
    } else {
        fn vertex_curvatures(mesh: &TerrainMesh, topology: &MeshTopology) -> Vec<VertexCurvature> {
            (0..mesh.vertex_count())
                .map(|v| vertex_curvature(mesh, topology, v))
                .collect()
        }
    }
}

fn build_report(
    mesh: &TerrainMesh,
    topology: &MeshTopology,
    vertices: &[VertexCurvature],
    rank_count: usize,
) -> CurvatureReport {
    let mut ranked: Vec<RankedVertex> = vertices
        .iter()
        .enumerate()
        .filter_map(|(vertex, c)| {
            Some(RankedVertex {
                vertex,
                curvature: c.value()?,
                incident_triangles: topology.incident_triangles(vertex).len(),
                position: mesh.points.get(vertex).copied().unwrap_or_default(),
            })
        })
        .collect();

    let interior: Vec<f64> = ranked.iter().map(|r| r.curvature).collect();

    ranked.sort_by(|a, b| a.curvature.total_cmp(&b.curvature).then(a.vertex.cmp(&b.vertex)));
    let flattest: Vec<RankedVertex> = ranked.iter().take(rank_count).copied().collect();

    ranked.sort_by(|a, b| b.curvature.total_cmp(&a.curvature).then(a.vertex.cmp(&b.vertex)));
    let most_curved: Vec<RankedVertex> = ranked.iter().take(rank_count).copied().collect();

    CurvatureReport {
        interior_count: interior.len(),
        boundary_count: vertices
            .iter()
            .filter(|c| matches!(c, VertexCurvature::Boundary))
            .count(),
        unreferenced_count: vertices
            .iter()
            .filter(|c| matches!(c, VertexCurvature::Unreferenced))
            .count(),
        summary: DistributionSummary::from_values(&interior),
        flattest,
        most_curved,
    }
}
