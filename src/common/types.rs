//! Common types used throughout waypoint_rrt

use itertools::Itertools;
use rand::Rng;
use rand_distr::{Distribution, Uniform};
use serde::{Deserialize, Serialize};

/// 2D point representation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn origin() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    pub fn distance(&self, other: &Point2D) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Squared distance, used where only ordering matters
    pub fn distance_squared(&self, other: &Point2D) -> f64 {
        (self.x - other.x).powi(2) + (self.y - other.y).powi(2)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Path represented as a sequence of 2D points
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path2D {
    pub points: Vec<Point2D>,
}

impl Path2D {
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    pub fn from_points(points: Vec<Point2D>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<Point2D> {
        self.points.first().copied()
    }

    pub fn last(&self) -> Option<Point2D> {
        self.points.last().copied()
    }

    pub fn x_coords(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.x).collect()
    }

    pub fn y_coords(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.y).collect()
    }

    /// Consecutive point pairs
    pub fn segments(&self) -> impl Iterator<Item = (Point2D, Point2D)> + '_ {
        self.points.iter().copied().tuple_windows()
    }

    pub fn total_length(&self) -> f64 {
        self.segments().map(|(a, b)| a.distance(&b)).sum()
    }

    /// Longest distance between two consecutive points
    pub fn max_step(&self) -> f64 {
        self.segments()
            .map(|(a, b)| a.distance(&b))
            .fold(0.0, f64::max)
    }
}

/// Axis-aligned sampling area
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AreaBounds {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl AreaBounds {
    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Self {
        AreaBounds { xmin, xmax, ymin, ymax }
    }

    /// Area spanning `[0, width] x [0, height]`
    pub fn from_size(width: f64, height: f64) -> Self {
        Self::new(0.0, width, 0.0, height)
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    /// True when both extents are finite and strictly positive
    pub fn is_valid(&self) -> bool {
        [self.xmin, self.xmax, self.ymin, self.ymax].iter().all(|v| v.is_finite())
            && self.width() > 0.0
            && self.height() > 0.0
    }

    pub fn contains(&self, p: &Point2D) -> bool {
        p.x >= self.xmin && p.x <= self.xmax && p.y >= self.ymin && p.y <= self.ymax
    }

    /// Draw a point uniformly from the area
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Point2D {
        let x = Uniform::new_inclusive(self.xmin, self.xmax).sample(rng);
        let y = Uniform::new_inclusive(self.ymin, self.ymax).sample(rng);
        Point2D::new(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_point2d_distance() {
        let p1 = Point2D::new(0.0, 0.0);
        let p2 = Point2D::new(3.0, 4.0);
        assert!((p1.distance(&p2) - 5.0).abs() < 1e-10);
        assert!((p1.distance_squared(&p2) - 25.0).abs() < 1e-10);
    }

    #[test]
    fn test_path2d_total_length() {
        let path = Path2D::from_points(vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 0.0),
            Point2D::new(1.0, 1.0),
        ]);
        assert!((path.total_length() - 2.0).abs() < 1e-10);
        assert!((path.max_step() - 1.0).abs() < 1e-10);
        assert_eq!(path.segments().count(), 2);
    }

    #[test]
    fn test_single_point_path_has_no_length() {
        let path = Path2D::from_points(vec![Point2D::new(50.0, 50.0)]);
        assert_eq!(path.total_length(), 0.0);
        assert_eq!(path.first(), path.last());
    }

    #[test]
    fn test_bounds_sampling_stays_inside() {
        let bounds = AreaBounds::new(-1.5, 1.5, 10.0, 12.0);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            assert!(bounds.contains(&bounds.sample(&mut rng)));
        }
    }

    #[test]
    fn test_bounds_validity() {
        assert!(AreaBounds::from_size(600.0, 600.0).is_valid());
        assert!(!AreaBounds::new(1.0, 1.0, 0.0, 1.0).is_valid());
        assert!(!AreaBounds::new(0.0, f64::NAN, 0.0, 1.0).is_valid());
    }
}
