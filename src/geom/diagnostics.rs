//! Mesh diagnostics for the terrain engine.
//!
//! A [`MeshDiagnostics`] record summarizes the topology of a triangulated terrain and
//! collects human-readable warnings raised along the pipeline. It is cheap to build from a
//! mesh and its [`MeshTopology`] and is returned as part of every
//! [`TerrainAnalysis`](crate::TerrainAnalysis).
//!
//! # Example
//!
//! ```ignore
//! use terrain_engine::geom::{MeshDiagnostics, MeshTopology, triangulate_points};
//!
//! let mesh = triangulate_points(&points)?.mesh;
//! let topology = MeshTopology::build(&mesh)?;
//! let diagnostics = MeshDiagnostics::from_topology(&mesh, &topology, 0);
//!
//! if !diagnostics.is_clean() {
//!     for warning in &diagnostics.warnings {
//!         eprintln!("Warning: {}", warning);
//!     }
//! }
//! ```

use std::fmt;

use serde::Serialize;

use super::metrics::TimingReport;
use super::{MeshTopology, TerrainMesh};

/// Counts and warnings describing one terrain mesh.
///
/// # Topology
///
/// - `boundary_edge_count`: edges with exactly one adjacent triangle (the outer rim)
/// - `non_manifold_edge_count`: edges with more than two adjacent triangles
///
/// A terrain patch is an open surface, so boundary edges are expected and do not count
/// as issues.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct MeshDiagnostics {
    /// Points in the mesh, including unreferenced ones.
    pub vertex_count: usize,

    pub triangle_count: usize,

    /// Unique undirected edges.
    pub edge_count: usize,

    pub boundary_edge_count: usize,

    pub interior_edge_count: usize,

    pub boundary_vertex_count: usize,

    pub interior_vertex_count: usize,

    /// Points that no triangle uses, typically planar duplicates of another sample.
    pub unreferenced_vertex_count: usize,

    /// Zero-area triangles. These are kept in the mesh and measured with sentinels.
    pub degenerate_triangle_count: usize,

    /// Zero for any mesh accepted by [`MeshTopology::build`].
    pub non_manifold_edge_count: usize,

    /// Optional timing breakdown by pipeline stage.
    ///
    /// Only populated when the `mesh_engine_metrics` feature is enabled.
    pub timing: Option<TimingReport>,

    /// Human-readable warnings about the mesh.
    pub warnings: Vec<String>,
}

impl MeshDiagnostics {
    /// Collect counts from `mesh` and its topology.
    ///
    /// `degenerate_triangle_count` comes from the quality pass, which is where triangle
    /// areas are measured.
    #[must_use]
    pub fn from_topology(
        mesh: &TerrainMesh,
        topology: &MeshTopology,
        degenerate_triangle_count: usize,
    ) -> Self {
        let mut diag = Self {
            vertex_count: mesh.vertex_count(),
            triangle_count: mesh.triangle_count(),
            edge_count: topology.unique_edge_count(),
            boundary_edge_count: topology.boundary_edge_count(),
            interior_edge_count: topology.interior_edge_count(),
            boundary_vertex_count: topology.boundary_vertices().len(),
            interior_vertex_count: topology.interior_vertices().len(),
            unreferenced_vertex_count: topology.unreferenced_vertices().len(),
            degenerate_triangle_count,
            non_manifold_edge_count: topology.edges().filter(|&(_, c)| c > 2).count(),
            timing: None,
            warnings: Vec::new(),
        };

        if diag.unreferenced_vertex_count > 0 {
            diag.add_warning(format!(
                "{} point(s) are not used by any triangle",
                diag.unreferenced_vertex_count
            ));
        }
        if diag.degenerate_triangle_count > 0 {
            diag.add_warning(format!(
                "{} zero-area triangle(s)",
                diag.degenerate_triangle_count
            ));
        }
        if diag.interior_vertex_count == 0 && diag.triangle_count > 0 {
            diag.add_warning("mesh has no interior vertices; curvature is undefined everywhere");
        }
        if !topology.is_consistent_with(mesh.triangle_count()) {
            diag.add_warning("edge incidence counts do not match the triangle count");
        }

        diag
    }

    /// Vertices used by at least one triangle.
    #[must_use]
    pub fn referenced_vertex_count(&self) -> usize {
        self.vertex_count - self.unreferenced_vertex_count
    }

    /// `V - E + F` over referenced vertices. A triangulated disk gives 1.
    #[must_use]
    pub fn euler_characteristic(&self) -> i64 {
        let v = i64::try_from(self.referenced_vertex_count()).unwrap_or(i64::MAX);
        let e = i64::try_from(self.edge_count).unwrap_or(i64::MAX);
        let f = i64::try_from(self.triangle_count).unwrap_or(i64::MAX);
        v - e + f
    }

    #[must_use]
    pub fn is_manifold(&self) -> bool {
        self.non_manifold_edge_count == 0
    }

    /// Returns `true` if nothing suspicious was found.
    ///
    /// A "clean" mesh has:
    /// - No non-manifold edges
    /// - No degenerate triangles
    /// - No unreferenced points
    /// - No warnings
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.non_manifold_edge_count == 0
            && self.degenerate_triangle_count == 0
            && self.unreferenced_vertex_count == 0
            && self.warnings.is_empty()
    }

    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Appends the warnings of `other`, each prefixed with `context`. Counts are left alone
    /// since they describe a different mesh.
    pub fn merge_warnings(&mut self, context: &str, other: &MeshDiagnostics) {
        self.warnings
            .extend(other.warnings.iter().map(|w| format!("{context}: {w}")));
    }

    /// Returns a short summary string suitable for logging.
    ///
    /// Format: `"V:{vertices} E:{edges} T:{triangles} [issues...]"`
    #[must_use]
    pub fn summary(&self) -> String {
        let mut parts = vec![format!(
            "V:{} E:{} T:{}",
            self.vertex_count, self.edge_count, self.triangle_count
        )];

        parts.push(format!("boundary:{}", self.boundary_edge_count));
        if self.unreferenced_vertex_count > 0 {
            parts.push(format!("unreferenced:{}", self.unreferenced_vertex_count));
        }
        if self.degenerate_triangle_count > 0 {
            parts.push(format!("degenerate:{}", self.degenerate_triangle_count));
        }
        if self.non_manifold_edge_count > 0 {
            parts.push(format!("non-manifold:{}", self.non_manifold_edge_count));
        }

        parts.join(" ")
    }
}

impl fmt::Display for MeshDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Mesh Diagnostics:")?;
        writeln!(f, "  Vertices: {}", self.vertex_count)?;
        writeln!(f, "  Triangles: {}", self.triangle_count)?;
        writeln!(
            f,
            "  Edges: {} ({} boundary, {} interior)",
            self.edge_count, self.boundary_edge_count, self.interior_edge_count
        )?;
        writeln!(
            f,
            "  Vertex classes: {} boundary, {} interior, {} unreferenced",
            self.boundary_vertex_count, self.interior_vertex_count, self.unreferenced_vertex_count
        )?;
        writeln!(f, "  Euler characteristic: {}", self.euler_characteristic())?;

        if self.degenerate_triangle_count > 0 || self.non_manifold_edge_count > 0 {
            writeln!(f, "  Issues:")?;
            if self.degenerate_triangle_count > 0 {
                writeln!(f, "    - Degenerate triangles: {}", self.degenerate_triangle_count)?;
            }
            if self.non_manifold_edge_count > 0 {
                writeln!(f, "    - Non-manifold edges: {}", self.non_manifold_edge_count)?;
            }
        }

        if !self.warnings.is_empty() {
            writeln!(f, "  Warnings:")?;
            for warning in &self.warnings {
                writeln!(f, "    - {warning}")?;
            }
        }

        if let Some(ref timing) = self.timing {
            writeln!(f, "  Timing: {} ms total", timing.total_ms())?;
        }

        let status = if self.is_clean() {
            "CLEAN"
        } else if self.is_manifold() {
            "VALID (with warnings)"
        } else {
            "ISSUES DETECTED"
        };
        writeln!(f, "  Status: {status}")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{Point3, Triangle};

    fn unit_square() -> TerrainMesh {
        TerrainMesh::new(
            vec![
                Point3::flat(0.0, 0.0),
                Point3::flat(1.0, 0.0),
                Point3::flat(1.0, 1.0),
                Point3::flat(0.0, 1.0),
            ],
            vec![Triangle::new(0, 1, 2), Triangle::new(0, 2, 3)],
        )
    }

    #[test]
    fn test_default_is_clean() {
        let diag = MeshDiagnostics::default();
        assert!(diag.is_clean());
        assert!(diag.is_manifold());
        assert!(!diag.has_warnings());
    }

    #[test]
    fn test_from_topology_counts() {
        let mesh = unit_square();
        let topology = MeshTopology::build(&mesh).unwrap();
        let diag = MeshDiagnostics::from_topology(&mesh, &topology, 0);

        assert_eq!(diag.vertex_count, 4);
        assert_eq!(diag.triangle_count, 2);
        assert_eq!(diag.edge_count, 5);
        assert_eq!(diag.boundary_edge_count, 4);
        assert_eq!(diag.interior_edge_count, 1);
        assert_eq!(diag.boundary_vertex_count, 4);
        assert_eq!(diag.interior_vertex_count, 0);
        assert_eq!(diag.euler_characteristic(), 1);
        // No interior vertex, so a curvature warning is expected.
        assert!(diag.has_warnings());
        assert!(diag.is_manifold());
    }

    #[test]
    fn test_unreferenced_points_warn() {
        let mut mesh = unit_square();
        mesh.points.push(Point3::flat(0.0, 0.0));
        let topology = MeshTopology::build(&mesh).unwrap();
        let diag = MeshDiagnostics::from_topology(&mesh, &topology, 0);

        assert_eq!(diag.unreferenced_vertex_count, 1);
        assert_eq!(diag.referenced_vertex_count(), 4);
        assert_eq!(diag.euler_characteristic(), 1);
        assert!(!diag.is_clean());
        assert!(diag.warnings.iter().any(|w| w.contains("not used")));
    }

    #[test]
    fn test_summary() {
        let diag = MeshDiagnostics {
            vertex_count: 100,
            edge_count: 280,
            triangle_count: 180,
            boundary_edge_count: 18,
            degenerate_triangle_count: 2,
            ..Default::default()
        };

        let summary = diag.summary();
        assert!(summary.contains("V:100"));
        assert!(summary.contains("E:280"));
        assert!(summary.contains("T:180"));
        assert!(summary.contains("boundary:18"));
        assert!(summary.contains("degenerate:2"));
        assert!(!summary.contains("non-manifold"));
    }

    #[test]
    fn test_display() {
        let diag = MeshDiagnostics {
            vertex_count: 100,
            triangle_count: 50,
            non_manifold_edge_count: 1,
            warnings: vec!["test warning".to_string()],
            ..Default::default()
        };

        let output = format!("{diag}");
        assert!(output.contains("Vertices: 100"));
        assert!(output.contains("Triangles: 50"));
        assert!(output.contains("Non-manifold edges: 1"));
        assert!(output.contains("test warning"));
        assert!(output.contains("ISSUES DETECTED"));
    }

    #[test]
    fn test_add_and_merge_warnings() {
        let mut diag = MeshDiagnostics::default();
        diag.add_warning("first");

        let mut other = MeshDiagnostics {
            vertex_count: 7,
            ..Default::default()
        };
        other.add_warning("second");

        diag.merge_warnings("refined mesh", &other);
        assert_eq!(
            diag.warnings,
            vec!["first".to_string(), "refined mesh: second".to_string()]
        );
        assert_eq!(diag.vertex_count, 0);
    }
}
