//! Geometry primitives over landmark coordinates
//!
//! Landmarks live in normalised image space: `x` and `y` roughly in `[0, 1]`,
//! `z` a relative depth where smaller values are closer to the camera.

use serde::{Deserialize, Serialize};

/// A single 3D landmark coordinate
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Returns true if every component is a finite number
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Euclidean distance between two points in 3D
pub fn distance(a: Point3, b: Point3) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let dz = b.z - a.z;
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// Euclidean distance over the image plane, ignoring depth
pub fn planar_distance(a: Point3, b: Point3) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    (dx * dx + dy * dy).sqrt()
}

/// Point halfway between `a` and `b`
pub fn midpoint(a: Point3, b: Point3) -> Point3 {
    Point3::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0, (a.z + b.z) / 2.0)
}

/// Component-wise mean of a set of points
///
/// Returns `None` for an empty slice.
pub fn average(points: &[Point3]) -> Option<Point3> {
    if points.is_empty() {
        return None;
    }

    let n = points.len() as f64;
    let sum = points.iter().fold(Point3::default(), |acc, p| Point3 {
        x: acc.x + p.x,
        y: acc.y + p.y,
        z: acc.z + p.z,
    });

    Some(Point3::new(sum.x / n, sum.y / n, sum.z / n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_3d() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(1.0, 2.0, 2.0);
        assert!((distance(a, b) - 3.0).abs() < 1e-12);
        assert_eq!(distance(a, a), 0.0);
    }

    #[test]
    fn test_planar_distance_ignores_depth() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(3.0, 4.0, 100.0);
        assert!((planar_distance(a, b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_average() {
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 2.0, -1.0),
            Point3::new(2.0, 4.0, -2.0),
        ];
        let mean = average(&points).unwrap();
        assert!((mean.x - 1.0).abs() < 1e-12);
        assert!((mean.y - 2.0).abs() < 1e-12);
        assert!((mean.z + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_midpoint_matches_average() {
        let a = Point3::new(0.1, 0.7, -0.2);
        let b = Point3::new(0.5, 0.3, 0.4);
        let mid = midpoint(a, b);
        let mean = average(&[a, b]).unwrap();
        assert!((mid.x - mean.x).abs() < 1e-12);
        assert!((mid.y - mean.y).abs() < 1e-12);
        assert!((mid.z - mean.z).abs() < 1e-12);
    }

    #[test]
    fn test_average_empty_is_none() {
        assert!(average(&[]).is_none());
    }

    #[test]
    fn test_is_finite() {
        assert!(Point3::new(0.1, 0.2, 0.3).is_finite());
        assert!(!Point3::new(f64::NAN, 0.2, 0.3).is_finite());
        assert!(!Point3::new(0.1, f64::INFINITY, 0.3).is_finite());
    }
}
