//! Delaunay triangulation of scattered terrain samples.
//!
//! Triangulation always happens in the planar projection: elevation rides along in the
//! returned mesh but never influences connectivity. The actual construction is delegated
//! to `delaunator`; this module validates the input, converts the flat halfedge output into
//! [`Triangle`]s and reports what was produced.
//!
//! Nearly collinear input (typically midpoints inserted on existing edges) can make
//! `delaunator` emit a folded sliver: the same vertex triple twice with opposite winding.
//! Such folds are removed before the mesh is returned, so every edge of the output is used
//! by one or two triangles.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::{EdgeKey, Point3, TerrainMesh, Triangle};

/// Failure to triangulate a point set. These correspond to degenerate input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TriangulationError {
    #[error("triangulation requires at least 3 points, got {count}")]
    TooFewPoints { count: usize },
    #[error("point {index} has non-finite planar coordinates")]
    NonFiniteCoordinate { index: usize },
    #[error("all {count} points are collinear; no triangle can be formed")]
    Collinear { count: usize },
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize)]
pub struct TriangulationDiagnostics {
    pub input_vertex_count: usize,
    pub output_triangle_count: usize,
    /// Number of input points on the convex hull.
    pub hull_vertex_count: usize,
    /// Input points that ended up in no triangle (exact planar duplicates).
    pub skipped_vertex_count: usize,
    /// Folded or over-shared sliver triangles removed from the raw output.
    pub folded_triangle_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TriangulationResult {
    pub mesh: TerrainMesh,
    pub diagnostics: TriangulationDiagnostics,
}

/// Triangulate `points` in the plane and return a mesh that owns a copy of them.
///
/// The output triangles cover the convex hull of the input. Points that coincide in the
/// plane with an earlier point stay in the point array but are not referenced by any
/// triangle.
pub fn triangulate_points(points: &[Point3]) -> Result<TriangulationResult, TriangulationError> {
    let count = points.len();
    if count < 3 {
        return Err(TriangulationError::TooFewPoints { count });
    }

    if let Some(index) = points.iter().position(|p| !p.is_planar_finite()) {
        return Err(TriangulationError::NonFiniteCoordinate { index });
    }

    let delaunator_points: Vec<delaunator::Point> = points
        .iter()
        .map(|p| delaunator::Point { x: p.x, y: p.y })
        .collect();

    let triangulation = delaunator::triangulate(&delaunator_points);
    if triangulation.triangles.is_empty() {
        return Err(TriangulationError::Collinear { count });
    }

    let raw: Vec<Triangle> = triangulation
        .triangles
        .chunks_exact(3)
        .map(|tri| Triangle::new(tri[0], tri[1], tri[2]))
        .collect();
    let raw_count = raw.len();

    let triangles = remove_folded_triangles(points, raw);
    let folded_triangle_count = raw_count - triangles.len();
    if folded_triangle_count > 0 {
        log::warn!("Removed {folded_triangle_count} folded sliver triangle(s) from the triangulation");
    }

    let mut referenced = vec![false; count];
    for tri in &triangles {
        for idx in tri.vertices() {
            referenced[idx] = true;
        }
    }
    let skipped_vertex_count = referenced.iter().filter(|&&used| !used).count();
    if skipped_vertex_count > 0 {
        log::warn!("{skipped_vertex_count} duplicate point(s) left out of the triangulation");
    }

    let diagnostics = TriangulationDiagnostics {
        input_vertex_count: count,
        output_triangle_count: triangles.len(),
        hull_vertex_count: triangulation.hull.len(),
        skipped_vertex_count,
        folded_triangle_count,
    };

    log::debug!(
        "Created {} triangles from {} points",
        diagnostics.output_triangle_count,
        count
    );

    Ok(TriangulationResult {
        mesh: TerrainMesh::new(points.to_vec(), triangles),
        diagnostics,
    })
}

/// Drop triangles that repeat another triangle's vertex set, then thin out any edge still
/// used by more than two triangles, smallest planar area first.
fn remove_folded_triangles(points: &[Point3], triangles: Vec<Triangle>) -> Vec<Triangle> {
    let mut copies: HashMap<[usize; 3], usize> = HashMap::with_capacity(triangles.len());
    for tri in &triangles {
        *copies.entry(vertex_set(*tri)).or_default() += 1;
    }
    let mut kept: Vec<Triangle> = triangles
        .into_iter()
        .filter(|tri| copies.get(&vertex_set(*tri)) == Some(&1))
        .collect();

    loop {
        let mut users: BTreeMap<EdgeKey, Vec<usize>> = BTreeMap::new();
        for (t, tri) in kept.iter().enumerate() {
            for edge in tri.edges() {
                users.entry(edge).or_default().push(t);
            }
        }

        let mut dropped = BTreeSet::new();
        for tris in users.values().filter(|tris| tris.len() > 2) {
            let mut by_area = tris.clone();
            by_area.sort_by(|&a, &b| {
                planar_area(points, kept[a])
                    .total_cmp(&planar_area(points, kept[b]))
                    .then(a.cmp(&b))
            });
            dropped.extend(by_area.iter().take(tris.len() - 2).copied());
        }
        if dropped.is_empty() {
            return kept;
        }

        kept = kept
            .into_iter()
            .enumerate()
            .filter(|(t, _)| !dropped.contains(t))
            .map(|(_, tri)| tri)
            .collect();
    }
}

fn vertex_set(tri: Triangle) -> [usize; 3] {
    let mut v = tri.vertices();
    v.sort_unstable();
    v
}

fn planar_area(points: &[Point3], tri: Triangle) -> f64 {
    let [a, b, c] = tri.vertices().map(|i| points[i].planar());
    0.5 * (b - a).cross(c - a).length()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Point3> {
        vec![
            Point3::flat(0.0, 0.0),
            Point3::flat(1.0, 0.0),
            Point3::flat(1.0, 1.0),
            Point3::flat(0.0, 1.0),
            Point3::flat(0.5, 1e-12),
        ]
    }

    #[test]
    fn folded_pair_is_removed_entirely() {
        let triangles = vec![
            Triangle::new(0, 1, 2),
            Triangle::new(0, 2, 3),
            Triangle::new(0, 4, 1),
            Triangle::new(0, 1, 4),
        ];
        let kept = remove_folded_triangles(&square(), triangles);
        assert_eq!(kept, vec![Triangle::new(0, 1, 2), Triangle::new(0, 2, 3)]);
    }

    #[test]
    fn over_shared_edge_loses_its_thinnest_triangle() {
        // Edge (0, 1) is used three times; the sliver through point 4 goes.
        let triangles = vec![
            Triangle::new(0, 1, 2),
            Triangle::new(0, 1, 3),
            Triangle::new(1, 0, 4),
        ];
        let kept = remove_folded_triangles(&square(), triangles);
        assert_eq!(kept, vec![Triangle::new(0, 1, 2), Triangle::new(0, 1, 3)]);
    }

    #[test]
    fn clean_output_is_untouched() {
        let triangles = vec![Triangle::new(0, 1, 2), Triangle::new(0, 2, 3)];
        let kept = remove_folded_triangles(&square(), triangles.clone());
        assert_eq!(kept, triangles);
    }
}
