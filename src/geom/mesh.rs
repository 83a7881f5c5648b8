use serde::Serialize;

use super::{Point3, Triangle};

/// A triangulated terrain surface: a point array plus triangles indexing into it.
///
/// Everything derived from a mesh (topology, quality, curvature) is computed from a
/// borrowed `&TerrainMesh` and stored separately. Refinement builds a new mesh and leaves
/// this one untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TerrainMesh {
    pub points: Vec<Point3>,
    pub triangles: Vec<Triangle>,
}

impl TerrainMesh {
    #[must_use]
    pub fn new(points: Vec<Point3>, triangles: Vec<Triangle>) -> Self {
        Self { points, triangles }
    }

    /// Build a point array from parallel coordinate sequences.
    ///
    /// Missing elevation defaults to `0.0`. The shortest of `x`/`y` (and `z`, when given)
    /// decides the number of points; length checking belongs to the caller
    /// (see [`crate::PointSet::new`]).
    #[must_use]
    pub fn points_from_coordinates(x: &[f64], y: &[f64], z: Option<&[f64]>) -> Vec<Point3> {
        match z {
            Some(z) => x
                .iter()
                .zip(y)
                .zip(z)
                .map(|((&x, &y), &z)| Point3::new(x, y, z))
                .collect(),
            None => x.iter().zip(y).map(|(&x, &y)| Point3::flat(x, y)).collect(),
        }
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Positions of a triangle's corners, or `None` if any index is out of range.
    #[must_use]
    pub fn triangle_points(&self, tri: Triangle) -> Option<[Point3; 3]> {
        let [a, b, c] = tri.vertices();
        Some([
            *self.points.get(a)?,
            *self.points.get(b)?,
            *self.points.get(c)?,
        ])
    }

    /// Returns true if every triangle index is within the point array.
    #[must_use]
    pub fn has_valid_indices(&self) -> bool {
        let n = self.points.len();
        self.triangles
            .iter()
            .all(|t| t.vertices().iter().all(|&i| i < n))
    }

    /// Returns true if any planar coordinate contains NaN or Inf values.
    #[must_use]
    pub fn has_invalid_vertices(&self) -> bool {
        self.points.iter().any(|p| !p.is_planar_finite() || !p.z.is_finite())
    }

    /// Triangle indices as a flat list: `[a0, b0, c0, a1, b1, c1, ...]`.
    ///
    /// This is the hand-off format for rendering and export collaborators.
    #[must_use]
    pub fn triangle_indices_flat(&self) -> Vec<usize> {
        self.triangles.iter().flat_map(|t| t.vertices()).collect()
    }

    /// Point coordinates as a flat list: `[x0, y0, z0, x1, y1, z1, ...]`.
    #[must_use]
    pub fn positions_flat(&self) -> Vec<f64> {
        self.points.iter().flat_map(|p| p.to_array()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_from_coordinates_defaults_elevation() {
        let points = TerrainMesh::points_from_coordinates(&[1.0, 2.0], &[3.0, 4.0], None);
        assert_eq!(points, vec![Point3::flat(1.0, 3.0), Point3::flat(2.0, 4.0)]);

        let points =
            TerrainMesh::points_from_coordinates(&[1.0], &[3.0], Some(&[9.0]));
        assert_eq!(points, vec![Point3::new(1.0, 3.0, 9.0)]);
    }

    #[test]
    fn flat_buffers_follow_array_order() {
        let mesh = TerrainMesh::new(
            vec![Point3::flat(0.0, 0.0), Point3::flat(1.0, 0.0), Point3::new(0.0, 1.0, 2.0)],
            vec![Triangle::new(0, 1, 2)],
        );
        assert_eq!(mesh.triangle_indices_flat(), vec![0, 1, 2]);
        assert_eq!(mesh.positions_flat().len(), 9);
        assert_eq!(mesh.positions_flat()[8], 2.0);
        assert!(mesh.has_valid_indices());
        assert!(!mesh.has_invalid_vertices());
    }

    #[test]
    fn triangle_points_rejects_out_of_range() {
        let mesh = TerrainMesh::new(vec![Point3::ORIGIN], vec![Triangle::new(0, 1, 2)]);
        assert!(mesh.triangle_points(mesh.triangles[0]).is_none());
        assert!(!mesh.has_valid_indices());
    }
}
