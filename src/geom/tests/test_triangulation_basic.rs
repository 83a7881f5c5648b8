use crate::geom::{MeshTopology, Point3, TriangulationError, triangulate_points};

fn unit_square() -> Vec<Point3> {
    vec![
        Point3::flat(0.0, 0.0),
        Point3::flat(1.0, 0.0),
        Point3::flat(1.0, 1.0),
        Point3::flat(0.0, 1.0),
    ]
}

#[test]
fn triangulate_unit_square_counts() {
    let result = triangulate_points(&unit_square()).unwrap();

    assert_eq!(result.mesh.triangle_count(), 2);
    assert_eq!(result.mesh.vertex_count(), 4);
    assert!(result.mesh.has_valid_indices());
    assert_eq!(result.diagnostics.input_vertex_count, 4);
    assert_eq!(result.diagnostics.output_triangle_count, 2);
    assert_eq!(result.diagnostics.hull_vertex_count, 4);
    assert_eq!(result.diagnostics.skipped_vertex_count, 0);
    assert_eq!(result.diagnostics.folded_triangle_count, 0);
}

#[test]
fn elevation_is_carried_but_ignored() {
    let flat = triangulate_points(&unit_square()).unwrap().mesh;

    let raised: Vec<Point3> = unit_square()
        .into_iter()
        .enumerate()
        .map(|(i, p)| Point3::new(p.x, p.y, 100.0 * i as f64))
        .collect();
    let mesh = triangulate_points(&raised).unwrap().mesh;

    assert_eq!(mesh.triangles, flat.triangles);
    assert_eq!(mesh.points[3].z, 300.0);
}

#[test]
fn too_few_points_is_an_error() {
    let err = triangulate_points(&unit_square()[..2]).unwrap_err();
    assert_eq!(err, TriangulationError::TooFewPoints { count: 2 });

    let err = triangulate_points(&[]).unwrap_err();
    assert_eq!(err, TriangulationError::TooFewPoints { count: 0 });
}

#[test]
fn collinear_points_are_an_error() {
    let points = [
        Point3::flat(0.0, 0.0),
        Point3::flat(1.0, 1.0),
        Point3::flat(2.0, 2.0),
        Point3::flat(3.0, 3.0),
    ];
    let err = triangulate_points(&points).unwrap_err();
    assert_eq!(err, TriangulationError::Collinear { count: 4 });
}

#[test]
fn coincident_points_are_an_error() {
    let points = [Point3::flat(1.0, 1.0); 5];
    let err = triangulate_points(&points).unwrap_err();
    assert!(matches!(err, TriangulationError::Collinear { count: 5 }));
}

#[test]
fn non_finite_coordinates_are_rejected() {
    let mut points = unit_square();
    points[2].y = f64::NAN;
    let err = triangulate_points(&points).unwrap_err();
    assert_eq!(err, TriangulationError::NonFiniteCoordinate { index: 2 });

    // Elevation is not checked; it does not influence the triangulation.
    let mut points = unit_square();
    points[0].z = f64::INFINITY;
    assert!(triangulate_points(&points).is_ok());
}

#[test]
fn duplicate_points_are_left_unreferenced() {
    let mut points = unit_square();
    points.push(Point3::flat(0.5, 0.5));
    points.push(Point3::flat(0.5, 0.5));

    let result = triangulate_points(&points).unwrap();
    assert_eq!(result.mesh.vertex_count(), 6);
    assert_eq!(result.diagnostics.skipped_vertex_count, 1);

    let topology = MeshTopology::build(&result.mesh).unwrap();
    assert_eq!(topology.unreferenced_vertices().len(), 1);
    assert_eq!(topology.interior_vertices().len(), 1);
}

#[test]
fn flat_index_output_matches_triangles() {
    let mesh = triangulate_points(&unit_square()).unwrap().mesh;
    let flat = mesh.triangle_indices_flat();

    assert_eq!(flat.len(), 3 * mesh.triangle_count());
    for (chunk, tri) in flat.chunks_exact(3).zip(&mesh.triangles) {
        assert_eq!(chunk, tri.vertices());
    }
}
