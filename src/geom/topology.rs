//! Vertex/edge adjacency derived from an unordered triangle list.
//!
//! A single pass over the triangles fills two structures:
//!
//! - an arena of incident-triangle lists indexed by vertex id, and
//! - an ordered map from canonical [`EdgeKey`] to the number of triangles using that edge.
//!
//! An edge used once lies on the outer rim (boundary), an edge used twice is interior.
//! Anything else means the triangle list is not a manifold surface and is reported as
//! [`TopologyError::NonManifoldEdge`] instead of being patched up.

use std::collections::BTreeMap;

use serde::Serialize;

use super::{EdgeKey, TerrainMesh};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TopologyError {
    #[error("triangle {triangle} references vertex {vertex}, but the mesh has {vertex_count} vertices")]
    VertexOutOfRange {
        triangle: usize,
        vertex: usize,
        vertex_count: usize,
    },
    #[error("triangle {triangle} repeats a vertex: {vertices:?}")]
    RepeatedVertex { triangle: usize, vertices: [usize; 3] },
    #[error("edge {edge} is shared by {count} triangles (non-manifold)")]
    NonManifoldEdge { edge: EdgeKey, count: u32 },
}

/// Where a vertex sits in the triangulated domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum VertexClass {
    /// Surrounded by a closed fan of triangles.
    Interior,
    /// Touches at least one boundary edge.
    Boundary,
    /// Not used by any triangle.
    Unreferenced,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshTopology {
    vertex_triangles: Vec<Vec<usize>>,
    edge_counts: BTreeMap<EdgeKey, u32>,
    boundary_vertex: Vec<bool>,
    boundary_edge_count: usize,
}

impl MeshTopology {
    /// Derive adjacency for `mesh`.
    ///
    /// Fails on the first triangle with an out-of-range or repeated vertex index, and on
    /// the lowest edge shared by more than two triangles.
    pub fn build(mesh: &TerrainMesh) -> Result<Self, TopologyError> {
        let vertex_count = mesh.vertex_count();
        let mut vertex_triangles: Vec<Vec<usize>> = vec![Vec::new(); vertex_count];
        let mut edge_counts: BTreeMap<EdgeKey, u32> = BTreeMap::new();

        for (triangle, tri) in mesh.triangles.iter().enumerate() {
            if let Some(&vertex) = tri.vertices().iter().find(|&&v| v >= vertex_count) {
                return Err(TopologyError::VertexOutOfRange {
                    triangle,
                    vertex,
                    vertex_count,
                });
            }
            if tri.has_repeated_vertex() {
                return Err(TopologyError::RepeatedVertex {
                    triangle,
                    vertices: tri.vertices(),
                });
            }

            for edge in tri.edges() {
                *edge_counts.entry(edge).or_insert(0) += 1;
            }
            for v in tri.vertices() {
                vertex_triangles[v].push(triangle);
            }
        }

        let non_manifold: Vec<(EdgeKey, u32)> = edge_counts
            .iter()
            .filter(|&(_, &count)| count > 2)
            .map(|(&edge, &count)| (edge, count))
            .collect();
        if let Some(&(edge, count)) = non_manifold.first() {
            log::warn!("{} non-manifold edge(s) found, first is {edge}", non_manifold.len());
            return Err(TopologyError::NonManifoldEdge { edge, count });
        }

        let mut boundary_vertex = vec![false; vertex_count];
        let mut boundary_edge_count = 0usize;
        for (edge, &count) in &edge_counts {
            if count == 1 {
                boundary_edge_count += 1;
                boundary_vertex[edge.lo()] = true;
                boundary_vertex[edge.hi()] = true;
            }
        }

        log::debug!(
            "Topology: {} edges ({} boundary), {} boundary vertices",
            edge_counts.len(),
            boundary_edge_count,
            boundary_vertex.iter().filter(|&&b| b).count()
        );

        Ok(Self {
            vertex_triangles,
            edge_counts,
            boundary_vertex,
            boundary_edge_count,
        })
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertex_triangles.len()
    }

    /// Triangles using vertex `v`, in triangle-array order. Empty for unknown vertices.
    #[must_use]
    pub fn incident_triangles(&self, v: usize) -> &[usize] {
        self.vertex_triangles
            .get(v)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of triangles using `edge`; 0 if the edge does not exist.
    #[must_use]
    pub fn edge_count(&self, edge: EdgeKey) -> u32 {
        self.edge_counts.get(&edge).copied().unwrap_or(0)
    }

    /// Unique edges in ascending key order with their incidence counts.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeKey, u32)> + '_ {
        self.edge_counts.iter().map(|(&edge, &count)| (edge, count))
    }

    #[must_use]
    pub fn unique_edge_count(&self) -> usize {
        self.edge_counts.len()
    }

    pub fn boundary_edges(&self) -> impl Iterator<Item = EdgeKey> + '_ {
        self.edges().filter(|&(_, c)| c == 1).map(|(e, _)| e)
    }

    pub fn interior_edges(&self) -> impl Iterator<Item = EdgeKey> + '_ {
        self.edges().filter(|&(_, c)| c == 2).map(|(e, _)| e)
    }

    #[must_use]
    pub fn boundary_edge_count(&self) -> usize {
        self.boundary_edge_count
    }

    #[must_use]
    pub fn interior_edge_count(&self) -> usize {
        self.edge_counts.len() - self.boundary_edge_count
    }

    #[must_use]
    pub fn is_boundary_vertex(&self, v: usize) -> bool {
        self.boundary_vertex.get(v).copied().unwrap_or(false)
    }

    #[must_use]
    pub fn classify_vertex(&self, v: usize) -> VertexClass {
        if self.is_boundary_vertex(v) {
            VertexClass::Boundary
        } else if self.incident_triangles(v).is_empty() {
            VertexClass::Unreferenced
        } else {
            VertexClass::Interior
        }
    }

    /// Sorted boundary vertex ids.
    #[must_use]
    pub fn boundary_vertices(&self) -> Vec<usize> {
        self.vertices_in(VertexClass::Boundary)
    }

    /// Sorted interior vertex ids.
    #[must_use]
    pub fn interior_vertices(&self) -> Vec<usize> {
        self.vertices_in(VertexClass::Interior)
    }

    /// Sorted ids of vertices used by no triangle.
    #[must_use]
    pub fn unreferenced_vertices(&self) -> Vec<usize> {
        self.vertices_in(VertexClass::Unreferenced)
    }

    fn vertices_in(&self, class: VertexClass) -> Vec<usize> {
        (0..self.vertex_count())
            .filter(|&v| self.classify_vertex(v) == class)
            .collect()
    }

    /// Sum of all edge incidence counts.
    #[must_use]
    pub fn total_incidence(&self) -> usize {
        self.edge_counts.values().map(|&c| c as usize).sum()
    }

    /// Checks the pipeline invariant for a mesh with `triangle_count` triangles:
    /// every incidence count is 1 or 2 and the counts add up to three per triangle.
    #[must_use]
    pub fn is_consistent_with(&self, triangle_count: usize) -> bool {
        self.edge_counts.values().all(|&c| c == 1 || c == 2)
            && self.total_incidence() == 3 * triangle_count
    }
}
