mod test_curvature_basic;
mod test_triangulation_basic;
