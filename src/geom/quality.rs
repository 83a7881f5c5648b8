//! Triangle shape quality via the fatness ratio `r / R`.
//!
//! For every triangle the analyzer measures side lengths, area, inradius `r` and
//! circumradius `R`. The ratio `r / R` is 1/2 for an equilateral triangle, so it is
//! reported doubled (`2r / R`) to land in `[0, 1]` with 1 meaning equilateral.
//!
//! Degenerate triangles (zero area) are not errors: they get `R = ∞`, fatness `0` and are
//! counted in [`QualityReport::degenerate_count`].

use std::fmt;

use serde::{Deserialize, Serialize};

use super::stats::{DistributionSummary, mean};
use super::{Point3, TerrainMesh, Triangle};

/// Fat triangles have fatness at or above this value.
///
/// Both defaults apply to the normalized fatness `2r / R`, not to the raw `r / R`
/// ([`TriangleQuality::radius_ratio`]); on the raw scale 0.5 corresponds to 0.25.
pub const DEFAULT_FAT_THRESHOLD: f64 = 0.5;
/// Skinny triangles have fatness strictly below this value.
pub const DEFAULT_SKINNY_THRESHOLD: f64 = 0.3;

/// Which coordinates the triangle measurements use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MeasureSpace {
    /// Planar projection; elevation is ignored. The triangle as drawn on a map.
    #[default]
    Planar,
    /// Full 3D positions; the triangle as it lies on the terrain surface.
    Surface,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityThresholds {
    pub fat: f64,
    pub skinny: f64,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            fat: DEFAULT_FAT_THRESHOLD,
            skinny: DEFAULT_SKINNY_THRESHOLD,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityOptions {
    pub thresholds: QualityThresholds,
    pub space: MeasureSpace,
}

/// Descriptive grade derived from the share of fat triangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum QualityGrade {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl QualityGrade {
    /// `>= 80%` excellent, `>= 60%` good, `>= 40%` fair, otherwise poor.
    #[must_use]
    pub fn from_fat_percentage(pct: f64) -> Self {
        if pct >= 80.0 {
            Self::Excellent
        } else if pct >= 60.0 {
            Self::Good
        } else if pct >= 40.0 {
            Self::Fair
        } else {
            Self::Poor
        }
    }
}

impl fmt::Display for QualityGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Excellent => "EXCELLENT",
            Self::Good => "GOOD",
            Self::Fair => "FAIR",
            Self::Poor => "POOR",
        })
    }
}

/// Measurements of a single triangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TriangleQuality {
    /// `[a, b, c]`: each side is opposite the corner with the same slot.
    pub side_lengths: [f64; 3],
    pub area: f64,
    pub inradius: f64,
    /// `f64::INFINITY` for zero-area triangles.
    pub circumradius: f64,
    /// Raw `r / R`, at most 1/2.
    pub radius_ratio: f64,
    /// `2r / R`, in `[0, 1]`.
    pub fatness: f64,
}

impl TriangleQuality {
    /// Record used for triangles that cannot be measured at all.
    pub const DEGENERATE: Self = Self {
        side_lengths: [0.0; 3],
        area: 0.0,
        inradius: 0.0,
        circumradius: f64::INFINITY,
        radius_ratio: 0.0,
        fatness: 0.0,
    };

    #[must_use]
    pub fn from_points(p1: Point3, p2: Point3, p3: Point3) -> Self {
        let a = p2.distance_to(p3);
        let b = p1.distance_to(p3);
        let c = p1.distance_to(p2);

        let area = 0.5 * (p2 - p1).cross(p3 - p1).length();

        let semiperimeter = 0.5 * (a + b + c);
        let inradius = if semiperimeter > 0.0 {
            area / semiperimeter
        } else {
            0.0
        };

        let circumradius = if area > 0.0 {
            (a * b * c) / (4.0 * area)
        } else {
            f64::INFINITY
        };

        let radius_ratio = if circumradius.is_finite() && circumradius > 0.0 {
            inradius / circumradius
        } else {
            0.0
        };

        Self {
            side_lengths: [a, b, c],
            area,
            inradius,
            circumradius,
            radius_ratio,
            fatness: (2.0 * radius_ratio).clamp(0.0, 1.0),
        }
    }

    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        !self.circumradius.is_finite()
    }
}

/// Aggregate view over all triangle measurements.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityReport {
    pub triangle_count: usize,
    pub fatness: DistributionSummary,
    pub fat_count: usize,
    pub fat_percentage: f64,
    pub skinny_count: usize,
    pub skinny_percentage: f64,
    pub mean_area: f64,
    pub mean_inradius: f64,
    /// Infinite as soon as one triangle is degenerate.
    pub mean_circumradius: f64,
    pub degenerate_count: usize,
    pub thresholds: QualityThresholds,
    pub grade: QualityGrade,
}

impl QualityReport {
    #[must_use]
    pub fn from_measurements(triangles: &[TriangleQuality], thresholds: QualityThresholds) -> Self {
        let fatness: Vec<f64> = triangles.iter().map(|t| t.fatness).collect();
        let triangle_count = triangles.len();

        let fat_count = fatness.iter().filter(|&&f| f >= thresholds.fat).count();
        let skinny_count = fatness.iter().filter(|&&f| f < thresholds.skinny).count();
        let percentage = |count: usize| {
            if triangle_count == 0 {
                0.0
            } else {
                100.0 * count as f64 / triangle_count as f64
            }
        };
        let fat_percentage = percentage(fat_count);

        let areas: Vec<f64> = triangles.iter().map(|t| t.area).collect();
        let inradii: Vec<f64> = triangles.iter().map(|t| t.inradius).collect();
        let circumradii: Vec<f64> = triangles.iter().map(|t| t.circumradius).collect();

        Self {
            triangle_count,
            fatness: DistributionSummary::from_values(&fatness),
            fat_count,
            fat_percentage,
            skinny_count,
            skinny_percentage: percentage(skinny_count),
            mean_area: mean(&areas),
            mean_inradius: mean(&inradii),
            mean_circumradius: mean(&circumradii),
            degenerate_count: triangles.iter().filter(|t| t.is_degenerate()).count(),
            thresholds,
            grade: QualityGrade::from_fat_percentage(fat_percentage),
        }
    }
}

impl fmt::Display for QualityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Triangulation Quality Report")?;
        writeln!(f, "  Total triangles: {}", self.triangle_count)?;
        writeln!(f, "  Min fatness: {:.3}", self.fatness.min)?;
        writeln!(f, "  Max fatness: {:.3}", self.fatness.max)?;
        writeln!(f, "  Mean fatness: {:.3}", self.fatness.mean)?;
        writeln!(
            f,
            "  Fat triangles (fatness >= {}): {} ({:.1}%)",
            self.thresholds.fat, self.fat_count, self.fat_percentage
        )?;
        writeln!(
            f,
            "  Skinny triangles (fatness < {}): {} ({:.1}%)",
            self.thresholds.skinny, self.skinny_count, self.skinny_percentage
        )?;
        if self.degenerate_count > 0 {
            writeln!(f, "  Degenerate triangles: {}", self.degenerate_count)?;
        }
        writeln!(f, "  Overall quality: {}", self.grade)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityAnalysis {
    /// One entry per mesh triangle, in triangle order.
    pub triangles: Vec<TriangleQuality>,
    pub report: QualityReport,
}

impl QualityAnalysis {
    /// Fatness per triangle, aligned with the mesh triangle array.
    #[must_use]
    pub fn fatness_ratios(&self) -> Vec<f64> {
        self.triangles.iter().map(|t| t.fatness).collect()
    }
}

/// Measure every triangle of `mesh` and summarize.
///
/// Triangles referencing missing vertices measure as [`TriangleQuality::DEGENERATE`];
/// run [`MeshTopology::build`](super::MeshTopology::build) first to reject such meshes.
#[must_use]
pub fn analyze_quality(mesh: &TerrainMesh, options: &QualityOptions) -> QualityAnalysis {
    let triangles = measure_triangles(mesh, options.space);
    let report = QualityReport::from_measurements(&triangles, options.thresholds);

    log::debug!(
        "Quality: {} triangles, mean fatness {:.3}, grade {}",
        report.triangle_count,
        report.fatness.mean,
        report.grade
    );
    if report.degenerate_count > 0 {
        log::warn!("{} degenerate triangle(s) in mesh", report.degenerate_count);
    }

    QualityAnalysis { triangles, report }
}

fn measure_triangle(mesh: &TerrainMesh, tri: Triangle, space: MeasureSpace) -> TriangleQuality {
    let Some([p1, p2, p3]) = mesh.triangle_points(tri) else {
        return TriangleQuality::DEGENERATE;
    };
    match space {
        MeasureSpace::Planar => TriangleQuality::from_points(p1.planar(), p2.planar(), p3.planar()),
        MeasureSpace::Surface => TriangleQuality::from_points(p1, p2, p3),
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "parallel")] {
        use rayon::prelude::*;

        fn measure_triangles(mesh: &TerrainMesh, space: MeasureSpace) -> Vec<TriangleQuality> {
            mesh.triangles
                .par_iter()
                .map(|&tri| measure_triangle(mesh, tri, space))
                .collect()
        }
    } else {
        fn measure_triangles(mesh: &TerrainMesh, space: MeasureSpace) -> Vec<TriangleQuality> {
            mesh.triangles
                .iter()
                .map(|&tri| measure_triangle(mesh, tri, space))
                .collect()
        }
    }
}
