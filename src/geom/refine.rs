//! Steiner refinement: insert a point at the midpoint of every edge and re-triangulate.

use std::collections::HashMap;

use serde::Serialize;

use super::triangulation::{TriangulationError, triangulate_points};
use super::{MeshTopology, Point3, TerrainMesh, Tolerance, TopologyError, Triangle};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RefineError {
    #[error("re-triangulation failed: {0}")]
    Triangulation(#[from] TriangulationError),
    #[error("topology of intermediate mesh is invalid: {0}")]
    Topology(#[from] TopologyError),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RefinementDiagnostics {
    pub original_vertex_count: usize,
    pub original_triangle_count: usize,
    pub steiner_point_count: usize,
    /// Steiner points that landed on an existing point in the plane. They stay in the
    /// point array but are not triangulated.
    pub coincident_steiner_count: usize,
    /// Sliver triangles the re-triangulation dropped.
    pub folded_triangle_count: usize,
    pub refined_vertex_count: usize,
    pub refined_triangle_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RefinementResult {
    pub mesh: TerrainMesh,
    pub diagnostics: RefinementDiagnostics,
}

/// Midpoints of every unique edge of `topology`, in ascending edge order.
///
/// The planar position is the exact midpoint; elevation is the mean of the endpoints.
#[must_use]
pub fn steiner_points(mesh: &TerrainMesh, topology: &MeshTopology) -> Vec<Point3> {
    topology
        .edges()
        .filter_map(|(edge, _)| {
            let (a, b) = edge.endpoints();
            Some(mesh.points.get(a)?.midpoint(*mesh.points.get(b)?))
        })
        .collect()
}

/// One refinement pass.
///
/// The returned mesh holds the original points (same indices) followed by one Steiner
/// point per unique edge, triangulated from scratch. A Steiner point that coincides in the
/// plane with an original point or an earlier Steiner point is kept in the array but left
/// out of the triangulation. `mesh` is not modified.
pub fn refine_mesh(
    mesh: &TerrainMesh,
    topology: &MeshTopology,
) -> Result<RefinementResult, RefineError> {
    let steiner = steiner_points(mesh, topology);

    let mut points = Vec::with_capacity(mesh.vertex_count() + steiner.len());
    points.extend_from_slice(&mesh.points);
    points.extend_from_slice(&steiner);

    let mut index = PlanarIndex::new(Tolerance::DEFAULT.scaled_to(planar_extent(&mesh.points)));
    for &p in &mesh.points {
        index.insert(p);
    }

    // Indices into `points` of everything handed to the triangulator.
    let mut placed: Vec<usize> = (0..mesh.vertex_count()).collect();
    for (offset, &p) in steiner.iter().enumerate() {
        if index.contains(p) {
            continue;
        }
        index.insert(p);
        placed.push(mesh.vertex_count() + offset);
    }
    let coincident_steiner_count = points.len() - placed.len();
    if coincident_steiner_count > 0 {
        log::warn!("{coincident_steiner_count} Steiner point(s) coincide with existing points");
    }

    let subset: Vec<Point3> = placed.iter().map(|&i| points[i]).collect();
    let triangulated = triangulate_points(&subset)?;
    let triangles = triangulated
        .mesh
        .triangles
        .iter()
        .map(|tri| Triangle(tri.vertices().map(|i| placed[i])))
        .collect();
    let refined = TerrainMesh::new(points, triangles);

    let diagnostics = RefinementDiagnostics {
        original_vertex_count: mesh.vertex_count(),
        original_triangle_count: mesh.triangle_count(),
        steiner_point_count: steiner.len(),
        coincident_steiner_count,
        folded_triangle_count: triangulated.diagnostics.folded_triangle_count,
        refined_vertex_count: refined.vertex_count(),
        refined_triangle_count: refined.triangle_count(),
    };

    log::debug!(
        "Refined mesh: {} Steiner points, {} -> {} vertices, {} -> {} triangles",
        diagnostics.steiner_point_count,
        diagnostics.original_vertex_count,
        diagnostics.refined_vertex_count,
        diagnostics.original_triangle_count,
        diagnostics.refined_triangle_count
    );

    Ok(RefinementResult {
        mesh: refined,
        diagnostics,
    })
}

/// Apply `passes` refinement passes, rebuilding topology in between.
///
/// `passes == 0` returns a copy of `mesh` with zeroed Steiner counts.
pub fn refine_mesh_passes(mesh: &TerrainMesh, passes: usize) -> Result<RefinementResult, RefineError> {
    let mut current = RefinementResult {
        mesh: mesh.clone(),
        diagnostics: RefinementDiagnostics {
            original_vertex_count: mesh.vertex_count(),
            original_triangle_count: mesh.triangle_count(),
            steiner_point_count: 0,
            coincident_steiner_count: 0,
            folded_triangle_count: 0,
            refined_vertex_count: mesh.vertex_count(),
            refined_triangle_count: mesh.triangle_count(),
        },
    };

    for pass in 0..passes {
        let topology = MeshTopology::build(&current.mesh)?;
        let next = refine_mesh(&current.mesh, &topology)?;
        log::debug!("Refinement pass {} of {passes} done", pass + 1);

        current = RefinementResult {
            diagnostics: RefinementDiagnostics {
                original_vertex_count: current.diagnostics.original_vertex_count,
                original_triangle_count: current.diagnostics.original_triangle_count,
                steiner_point_count: current.diagnostics.steiner_point_count
                    + next.diagnostics.steiner_point_count,
                coincident_steiner_count: current.diagnostics.coincident_steiner_count
                    + next.diagnostics.coincident_steiner_count,
                folded_triangle_count: current.diagnostics.folded_triangle_count
                    + next.diagnostics.folded_triangle_count,
                refined_vertex_count: next.diagnostics.refined_vertex_count,
                refined_triangle_count: next.diagnostics.refined_triangle_count,
            },
            mesh: next.mesh,
        };
    }

    Ok(current)
}

fn planar_extent(points: &[Point3]) -> f64 {
    let (min, max) = points.iter().fold(
        ([f64::INFINITY; 2], [f64::NEG_INFINITY; 2]),
        |(min, max), p| {
            (
                [min[0].min(p.x), min[1].min(p.y)],
                [max[0].max(p.x), max[1].max(p.y)],
            )
        },
    );
    (max[0] - min[0]).max(max[1] - min[1])
}

/// Points bucketed on a grid whose cell is the comparison tolerance, so a coincident point
/// can only sit in the same or a neighbouring cell.
struct PlanarIndex {
    tolerance: Tolerance,
    cells: HashMap<(i64, i64), Vec<Point3>>,
}

impl PlanarIndex {
    fn new(tolerance: Tolerance) -> Self {
        Self {
            tolerance,
            cells: HashMap::new(),
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn cell(&self, p: Point3) -> (i64, i64) {
        (
            (p.x / self.tolerance.eps).floor() as i64,
            (p.y / self.tolerance.eps).floor() as i64,
        )
    }

    fn contains(&self, p: Point3) -> bool {
        let (cx, cy) = self.cell(p);
        (-1..=1).any(|dx: i64| {
            (-1..=1).any(|dy: i64| {
                self.cells
                    .get(&(cx.saturating_add(dx), cy.saturating_add(dy)))
                    .is_some_and(|bucket| {
                        bucket.iter().any(|&q| self.tolerance.approx_eq_planar(p, q))
                    })
            })
        })
    }

    fn insert(&mut self, p: Point3) {
        let cell = self.cell(p);
        self.cells.entry(cell).or_default().push(p);
    }
}
