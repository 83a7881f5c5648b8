use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use serde::Serialize;

// ─────────────────────────────────────────────────────────────────────────────
// Vec3
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    /// Zero vector.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    #[must_use]
    pub const fn dot(self, rhs: Self) -> f64 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    #[must_use]
    pub const fn cross(self, rhs: Self) -> Self {
        Self {
            x: self.y * rhs.z - self.z * rhs.y,
            y: self.z * rhs.x - self.x * rhs.z,
            z: self.x * rhs.y - self.y * rhs.x,
        }
    }

    /// Unsigned angle between two vectors in radians.
    ///
    /// The cosine is clamped to `[-1, 1]` before `acos`, so rounding overshoot never
    /// produces NaN. Returns `None` when either vector is shorter than
    /// [`Tolerance::ZERO_LENGTH`].
    #[must_use]
    pub fn angle_to(self, rhs: Self) -> Option<f64> {
        let len_a = self.length();
        let len_b = rhs.length();
        let eps = Tolerance::ZERO_LENGTH.eps;
        if !(len_a > eps && len_b > eps) || !len_a.is_finite() || !len_b.is_finite() {
            return None;
        }
        let cos = (self.dot(rhs) / (len_a * len_b)).clamp(-1.0, 1.0);
        Some(cos.acos())
    }
}

impl Default for Vec3 {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Add for Vec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self::Output {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Vec3 {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y, -self.z)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Point3
// ─────────────────────────────────────────────────────────────────────────────

/// A sample position: planar `x`/`y` plus elevation `z`.
///
/// Elevation is carried along but never used for triangulation; see [`Point3::planar`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    /// The origin point (0, 0, 0).
    pub const ORIGIN: Self = Self::new(0.0, 0.0, 0.0);

    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// A point without elevation (`z = 0`).
    #[must_use]
    pub const fn flat(x: f64, y: f64) -> Self {
        Self::new(x, y, 0.0)
    }

    #[must_use]
    pub const fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Projection onto the triangulation plane (elevation dropped).
    #[must_use]
    pub const fn planar(self) -> Self {
        Self::new(self.x, self.y, 0.0)
    }

    #[must_use]
    pub const fn sub_point(self, rhs: Self) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }

    /// Arithmetic midpoint; elevation is averaged along with the planar position.
    #[must_use]
    pub fn midpoint(self, other: Self) -> Self {
        Self::new(
            0.5 * (self.x + other.x),
            0.5 * (self.y + other.y),
            0.5 * (self.z + other.z),
        )
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance_to(self, other: Self) -> f64 {
        self.sub_point(other).length()
    }

    /// True when the planar coordinates are finite. Elevation is not checked.
    #[must_use]
    pub fn is_planar_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Default for Point3 {
    fn default() -> Self {
        Self::ORIGIN
    }
}

impl From<[f64; 3]> for Point3 {
    fn from(arr: [f64; 3]) -> Self {
        Self::new(arr[0], arr[1], arr[2])
    }
}

impl From<[f64; 2]> for Point3 {
    fn from(arr: [f64; 2]) -> Self {
        Self::flat(arr[0], arr[1])
    }
}

impl From<Point3> for [f64; 3] {
    fn from(p: Point3) -> Self {
        p.to_array()
    }
}

impl Sub for Point3 {
    type Output = Vec3;
    fn sub(self, rhs: Self) -> Self::Output {
        self.sub_point(rhs)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Triangle / EdgeKey
// ─────────────────────────────────────────────────────────────────────────────

/// Three vertex indices into a mesh point array.
///
/// Winding order carries no meaning anywhere in the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Triangle(pub [usize; 3]);

impl Triangle {
    #[must_use]
    pub const fn new(a: usize, b: usize, c: usize) -> Self {
        Self([a, b, c])
    }

    #[must_use]
    pub const fn vertices(self) -> [usize; 3] {
        self.0
    }

    /// The three canonical edges `(v0,v1)`, `(v1,v2)`, `(v2,v0)`.
    #[must_use]
    pub fn edges(self) -> [EdgeKey; 3] {
        let [a, b, c] = self.0;
        [EdgeKey::new(a, b), EdgeKey::new(b, c), EdgeKey::new(c, a)]
    }

    /// Slot (0..3) holding `vertex`, if any.
    #[must_use]
    pub fn local_index(self, vertex: usize) -> Option<usize> {
        self.0.iter().position(|&v| v == vertex)
    }

    /// The two vertices following `vertex` in the triple, cyclically.
    #[must_use]
    pub fn neighbors_of(self, vertex: usize) -> Option<(usize, usize)> {
        let slot = self.local_index(vertex)?;
        Some((self.0[(slot + 1) % 3], self.0[(slot + 2) % 3]))
    }

    /// True when two or more slots share a vertex index.
    #[must_use]
    pub fn has_repeated_vertex(self) -> bool {
        let [a, b, c] = self.0;
        a == b || b == c || a == c
    }
}

impl From<[usize; 3]> for Triangle {
    fn from(v: [usize; 3]) -> Self {
        Self(v)
    }
}

/// Unordered vertex pair stored as `(min, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EdgeKey {
    lo: usize,
    hi: usize,
}

impl EdgeKey {
    #[must_use]
    pub fn new(a: usize, b: usize) -> Self {
        if a <= b {
            Self { lo: a, hi: b }
        } else {
            Self { lo: b, hi: a }
        }
    }

    #[must_use]
    pub const fn lo(self) -> usize {
        self.lo
    }

    #[must_use]
    pub const fn hi(self) -> usize {
        self.hi
    }

    #[must_use]
    pub const fn endpoints(self) -> (usize, usize) {
        (self.lo, self.hi)
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lo, self.hi)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tolerance
// ─────────────────────────────────────────────────────────────────────────────

/// Tolerance configuration for geometric comparisons.
///
/// - `Tolerance::DEFAULT` - General geometry comparisons (1e-9)
/// - `Tolerance::ZERO_LENGTH` - Detecting degenerate/zero-length vectors (1e-12)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    pub eps: f64,
}

impl Tolerance {
    /// Default geometric tolerance (1e-9).
    pub const DEFAULT: Self = Self { eps: 1e-9 };

    /// Tolerance for detecting zero-length/degenerate vectors and edges (1e-12).
    pub const ZERO_LENGTH: Self = Self { eps: 1e-12 };

    #[must_use]
    pub const fn new(eps: f64) -> Self {
        Self { eps }
    }

    /// Tolerance grown with the coordinate `extent` of the data it compares.
    #[must_use]
    pub fn scaled_to(self, extent: f64) -> Self {
        if extent.is_finite() && extent > 1.0 {
            Self::new(self.eps * extent)
        } else {
            self
        }
    }

    #[must_use]
    pub fn approx_eq_f64(self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.eps
    }

    /// `true` when `a` and `b` coincide in the triangulation plane.
    #[must_use]
    pub fn approx_eq_planar(self, a: Point3, b: Point3) -> bool {
        self.approx_eq_f64(a.x, b.x) && self.approx_eq_f64(a.y, b.y)
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn edge_key_is_canonical() {
        assert_eq!(EdgeKey::new(7, 3), EdgeKey::new(3, 7));
        assert_eq!(EdgeKey::new(7, 3).endpoints(), (3, 7));
    }

    #[test]
    fn triangle_edges_cover_all_pairs() {
        let edges = Triangle::new(4, 1, 9).edges();
        assert!(edges.contains(&EdgeKey::new(1, 4)));
        assert!(edges.contains(&EdgeKey::new(1, 9)));
        assert!(edges.contains(&EdgeKey::new(4, 9)));
    }

    #[test]
    fn triangle_neighbors_follow_slot_order() {
        let tri = Triangle::new(10, 20, 30);
        assert_eq!(tri.neighbors_of(20), Some((30, 10)));
        assert_eq!(tri.neighbors_of(99), None);
        assert!(Triangle::new(1, 2, 1).has_repeated_vertex());
    }

    #[test]
    fn angle_to_handles_parallel_and_zero_vectors() {
        let x = Vec3::new(1.0, 0.0, 0.0);
        let y = Vec3::new(0.0, 2.0, 0.0);
        assert!((x.angle_to(y).unwrap() - FRAC_PI_2).abs() < 1e-12);
        // Nearly parallel vectors can overshoot cos = 1 without the clamp.
        let a = Vec3::new(1.0, 1e-17, 0.0);
        assert_eq!(x.angle_to(a * 3.0).unwrap(), 0.0);
        assert!(x.angle_to(Vec3::ZERO).is_none());
    }

    #[test]
    fn midpoint_averages_elevation() {
        let m = Point3::new(0.0, 0.0, 2.0).midpoint(Point3::new(2.0, 4.0, 6.0));
        assert_eq!(m, Point3::new(1.0, 2.0, 4.0));
    }

    #[test]
    fn tolerance_comparisons() {
        let tol = Tolerance::default();
        assert_eq!(tol, Tolerance::DEFAULT);
        assert!(tol.approx_eq_f64(1.0, 1.0 + 1e-10));
        assert!(!tol.approx_eq_f64(1.0, 1.0 + 1e-6));
        assert_eq!(tol.scaled_to(0.5), tol);
        assert!((tol.scaled_to(1000.0).eps - 1e-6).abs() < 1e-18);
        assert!(tol.approx_eq_planar(Point3::new(1.0, 2.0, 0.0), Point3::new(1.0, 2.0, 9.0)));
        assert!(!tol.approx_eq_planar(Point3::flat(1.0, 2.0), Point3::flat(1.0, 2.001)));
        // Below the zero-length threshold an edge has no direction.
        let tiny = Vec3::new(1e-13, 0.0, 0.0);
        assert!(Vec3::new(1.0, 0.0, 0.0).angle_to(tiny).is_none());
    }
}
