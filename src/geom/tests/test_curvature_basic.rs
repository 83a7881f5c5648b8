use std::f64::consts::{FRAC_PI_3, TAU};

use crate::geom::{
    CurvatureOptions, CurvatureScale, MeshTopology, Point3, TerrainMesh, Triangle, VertexCurvature,
    analyze_curvature, angle_sum, triangulate_points,
};

const EPS: f64 = 1e-9;

fn hexagon_fan(center_z: f64) -> TerrainMesh {
    let mut points = vec![Point3::new(0.0, 0.0, center_z)];
    for k in 0..6 {
        let angle = f64::from(k) * FRAC_PI_3;
        points.push(Point3::flat(angle.cos(), angle.sin()));
    }
    let triangles = (1..=6).map(|k| Triangle::new(0, k, k % 6 + 1)).collect();
    TerrainMesh::new(points, triangles)
}

/// Four right-angled triangles around `center`; with `height > 0` the center is a peak.
fn push_diamond(mesh: &mut TerrainMesh, center: (f64, f64), height: f64) -> usize {
    let c = mesh.points.len();
    let (x, y) = center;
    mesh.points.push(Point3::new(x, y, height));
    mesh.points.push(Point3::flat(x + 1.0, y));
    mesh.points.push(Point3::flat(x, y + 1.0));
    mesh.points.push(Point3::flat(x - 1.0, y));
    mesh.points.push(Point3::flat(x, y - 1.0));
    for k in 1..=4 {
        mesh.triangles.push(Triangle::new(c, c + k, c + k % 4 + 1));
    }
    c
}

fn analyze(mesh: &TerrainMesh, rank_count: usize) -> crate::geom::CurvatureAnalysis {
    let topology = MeshTopology::build(mesh).unwrap();
    analyze_curvature(mesh, &topology, &CurvatureOptions { rank_count })
}

#[test]
fn flat_hexagon_fan_has_zero_curvature() {
    let mesh = hexagon_fan(0.0);
    let topology = MeshTopology::build(&mesh).unwrap();

    assert!((angle_sum(&mesh, &topology, 0) - TAU).abs() < EPS);

    let analysis = analyze_curvature(&mesh, &topology, &CurvatureOptions::default());
    let k = analysis.vertices[0].value().unwrap();
    assert!(k.abs() < EPS);
    assert_eq!(analysis.report.interior_count, 1);
    assert_eq!(analysis.report.boundary_count, 6);
}

#[test]
fn raised_center_is_curved() {
    let analysis = analyze(&hexagon_fan(0.5), 5);
    let k = analysis.vertices[0].value().unwrap();
    assert!(k > 0.1);
    assert!(k < TAU);
}

#[test]
fn boundary_vertices_are_undefined_not_zero() {
    let analysis = analyze(&hexagon_fan(0.0), 5);
    for v in 1..=6 {
        assert_eq!(analysis.vertices[v], VertexCurvature::Boundary);
        assert_eq!(analysis.vertices[v].value(), None);
    }
    assert_eq!(analysis.interior_values().len(), 1);
    assert_eq!(analysis.report.summary.count, 1);
}

#[test]
fn convex_set_without_interior_points_has_empty_curvature() {
    let points = [
        Point3::flat(0.0, 0.0),
        Point3::flat(1.0, 0.0),
        Point3::flat(1.0, 1.0),
        Point3::flat(0.0, 1.0),
    ];
    let mesh = triangulate_points(&points).unwrap().mesh;
    let analysis = analyze(&mesh, 5);

    assert!(analysis.vertices.iter().all(|c| *c == VertexCurvature::Boundary));
    assert_eq!(analysis.report.interior_count, 0);
    assert!(analysis.report.flattest.is_empty());
    assert!(analysis.report.most_curved.is_empty());
    assert!(analysis.report.to_string().contains("No interior vertices"));
}

#[test]
fn pyramid_peak_has_known_deficit() {
    let mut mesh = TerrainMesh::default();
    let peak = push_diamond(&mut mesh, (0.0, 0.0), 1.0);
    let analysis = analyze(&mesh, 5);

    // Every corner at the peak is 60 degrees, so the deficit is 2pi - 4pi/3.
    let k = analysis.vertices[peak].value().unwrap();
    assert!((k - TAU / 3.0).abs() < EPS);
}

#[test]
fn ranking_breaks_ties_by_vertex_index() {
    let mut mesh = TerrainMesh::default();
    let a = push_diamond(&mut mesh, (0.0, 0.0), 0.0);
    let b = push_diamond(&mut mesh, (10.0, 0.0), 0.0);
    let peak = push_diamond(&mut mesh, (20.0, 0.0), 1.0);
    let report = analyze(&mesh, 2).report;

    assert_eq!(report.interior_count, 3);
    assert_eq!(report.boundary_count, 12);

    let flattest: Vec<usize> = report.flattest.iter().map(|r| r.vertex).collect();
    assert_eq!(flattest, vec![a, b]);

    let most_curved: Vec<usize> = report.most_curved.iter().map(|r| r.vertex).collect();
    assert_eq!(most_curved, vec![peak, a]);

    assert_eq!(report.most_curved[0].incident_triangles, 4);
    assert_eq!(report.most_curved[0].position.x, 20.0);
    assert!((report.summary.max - report.most_curved[0].curvature).abs() < EPS);
}

#[test]
fn unreferenced_vertices_are_undefined() {
    let mut mesh = hexagon_fan(0.0);
    mesh.points.push(Point3::flat(0.0, 0.0));
    let analysis = analyze(&mesh, 5);

    assert_eq!(analysis.vertices[7], VertexCurvature::Unreferenced);
    assert_eq!(analysis.report.unreferenced_count, 1);
    assert_eq!(analysis.values().len(), 8);
}

#[test]
fn curvature_table_has_one_row_per_point() {
    let mesh = hexagon_fan(0.0);
    let topology = MeshTopology::build(&mesh).unwrap();
    let analysis = analyze_curvature(&mesh, &topology, &CurvatureOptions::default());
    let table = analysis.curvature_table(&mesh, &topology);

    assert_eq!(table.len(), 7);
    assert_eq!(table[0].vertex_id, 0);
    assert!(table[0].curvature.is_some());
    assert_eq!(table[0].incident_triangles, 6);
    assert!(!table[0].is_boundary);

    assert_eq!(table[1].curvature, None);
    assert_eq!(table[1].incident_triangles, 2);
    assert!(table[1].is_boundary);
    assert!((table[1].x - 1.0).abs() < EPS);
}

#[test]
fn scaled_values_keep_undefined_entries() {
    let mut mesh = TerrainMesh::default();
    push_diamond(&mut mesh, (0.0, 0.0), 0.0);
    push_diamond(&mut mesh, (10.0, 0.0), 0.0);
    let peak = push_diamond(&mut mesh, (20.0, 0.0), 1.0);
    let analysis = analyze(&mesh, 5);
    let deficit = TAU / 3.0;

    let linear = analysis.scaled_values(CurvatureScale::Linear);
    assert_eq!(linear, analysis.values());
    assert_eq!(linear[1], None);

    let log = analysis.scaled_values(CurvatureScale::Log);
    assert!((log[peak].unwrap() - deficit.ln_1p()).abs() < EPS);

    let clip = analysis.scaled_values(CurvatureScale::Clip { max: 1.0 });
    assert_eq!(clip[peak], Some(1.0));

    // Interior values are [0, 0, deficit]; the median is 0.
    let window = analysis.scaled_values(CurvatureScale::Percentile {
        low: 0.0,
        high: 50.0,
    });
    assert!(window[peak].unwrap().abs() < EPS);
    assert_eq!(window[peak + 1], None);
}
