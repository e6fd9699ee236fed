//! Obstacle shapes and collision predicates
//!
//! Obstacles are circles and axis-aligned rectangles. Every test takes an
//! inflation margin that stands in for the robot radius, so the robot can
//! be planned as a point.

use serde::{Deserialize, Serialize};

use crate::common::{PlanningError, Point2D};

/// Circular obstacle (x, y, radius)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CircleObstacle {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

impl CircleObstacle {
    pub fn new(x: f64, y: f64, radius: f64) -> Self {
        Self { x, y, radius }
    }

    pub fn center(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }
}

/// Axis-aligned rectangle, `(x, y)` is the minimum corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RectangleObstacle {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl RectangleObstacle {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Rectangle of the given size centred on `center`
    pub fn centered(center: Point2D, width: f64, height: f64) -> Self {
        Self::new(center.x - width / 2.0, center.y - height / 2.0, width, height)
    }

    /// Corners in counter-clockwise order starting at the origin corner
    pub fn corners(&self) -> [Point2D; 4] {
        [
            Point2D::new(self.x, self.y),
            Point2D::new(self.x + self.width, self.y),
            Point2D::new(self.x + self.width, self.y + self.height),
            Point2D::new(self.x, self.y + self.height),
        ]
    }
}

/// Obstacle shape
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Obstacle {
    Circle(CircleObstacle),
    Rectangle(RectangleObstacle),
}

impl Obstacle {
    pub fn circle(x: f64, y: f64, radius: f64) -> Self {
        Obstacle::Circle(CircleObstacle::new(x, y, radius))
    }

    pub fn rectangle(x: f64, y: f64, width: f64, height: f64) -> Self {
        Obstacle::Rectangle(RectangleObstacle::new(x, y, width, height))
    }

    /// Whether `p` lies inside the obstacle grown by `margin` on every side
    pub fn contains(&self, p: &Point2D, margin: f64) -> bool {
        match self {
            Obstacle::Circle(c) => {
                let r = c.radius + margin;
                p.distance_squared(&c.center()) <= r * r
            }
            Obstacle::Rectangle(r) => {
                p.x >= r.x - margin
                    && p.x <= r.x + r.width + margin
                    && p.y >= r.y - margin
                    && p.y <= r.y + r.height + margin
            }
        }
    }

    /// Zero, negative or non-finite dimensions
    pub fn is_degenerate(&self) -> bool {
        match self {
            Obstacle::Circle(c) => {
                !(c.x.is_finite() && c.y.is_finite() && c.radius.is_finite()) || c.radius <= 0.0
            }
            Obstacle::Rectangle(r) => {
                !(r.x.is_finite() && r.y.is_finite() && r.width.is_finite() && r.height.is_finite())
                    || r.width <= 0.0
                    || r.height <= 0.0
            }
        }
    }
}

impl From<CircleObstacle> for Obstacle {
    fn from(c: CircleObstacle) -> Self {
        Obstacle::Circle(c)
    }
}

impl From<RectangleObstacle> for Obstacle {
    fn from(r: RectangleObstacle) -> Self {
        Obstacle::Rectangle(r)
    }
}

/// Collision queries against a fixed obstacle set
#[derive(Debug, Clone)]
pub struct CollisionChecker {
    obstacles: Vec<Obstacle>,
    margin: f64,
}

impl CollisionChecker {
    /// Build a checker, rejecting degenerate obstacles and invalid margins
    pub fn new(obstacles: Vec<Obstacle>, margin: f64) -> Result<Self, PlanningError> {
        if !margin.is_finite() || margin < 0.0 {
            return Err(PlanningError::InvalidConfiguration(format!(
                "inflation margin must be finite and non-negative, got {}",
                margin
            )));
        }
        if let Some(i) = obstacles.iter().position(Obstacle::is_degenerate) {
            return Err(PlanningError::InvalidConfiguration(format!(
                "obstacle {} is degenerate: {:?}",
                i, obstacles[i]
            )));
        }
        Ok(Self { obstacles, margin })
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Index of the first obstacle containing `p`
    pub fn first_collision(&self, p: &Point2D) -> Option<usize> {
        self.obstacles.iter().position(|o| o.contains(p, self.margin))
    }

    pub fn is_point_free(&self, p: &Point2D) -> bool {
        self.first_collision(p).is_none()
    }

    /// Every point of `points` is outside all obstacles
    pub fn is_path_free(&self, points: &[Point2D]) -> bool {
        points.iter().all(|p| self.is_point_free(p))
    }

    /// Test the segment `a -> b` every `step`, always including `b`
    pub fn is_segment_free(&self, a: &Point2D, b: &Point2D, step: f64) -> bool {
        let d = a.distance(b);
        let n = if step > 0.0 { (d / step).floor() as usize } else { 0 };
        let free = (0..=n).all(|i| {
            let t = if d > 0.0 { (i as f64 * step / d).min(1.0) } else { 0.0 };
            self.is_point_free(&Point2D::new(a.x + t * (b.x - a.x), a.y + t * (b.y - a.y)))
        });
        free && self.is_point_free(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_contains_with_margin() {
        let c = Obstacle::circle(300.0, 300.0, 50.0);
        assert!(c.contains(&Point2D::new(300.0, 350.0), 0.0));
        assert!(!c.contains(&Point2D::new(300.0, 351.0), 0.0));
        assert!(c.contains(&Point2D::new(300.0, 351.0), 2.0));
    }

    #[test]
    fn test_rectangle_contains_with_margin() {
        let r = Obstacle::rectangle(10.0, 20.0, 5.0, 2.0);
        assert!(r.contains(&Point2D::new(10.0, 20.0), 0.0));
        assert!(r.contains(&Point2D::new(15.0, 22.0), 0.0));
        assert!(!r.contains(&Point2D::new(15.5, 22.0), 0.0));
        assert!(r.contains(&Point2D::new(15.5, 22.0), 0.5));
        assert!(r.contains(&Point2D::new(9.5, 19.5), 0.5));
    }

    #[test]
    fn test_centered_rectangle() {
        let r = RectangleObstacle::centered(Point2D::new(1.0, 1.0), 0.2, 0.4);
        assert!((r.x - 0.9).abs() < 1e-12);
        assert!((r.y - 0.8).abs() < 1e-12);
        assert_eq!(r.corners()[2], Point2D::new(r.x + 0.2, r.y + 0.4));
    }

    #[test]
    fn test_degenerate_obstacles_are_rejected() {
        assert!(Obstacle::circle(0.0, 0.0, 0.0).is_degenerate());
        assert!(Obstacle::rectangle(0.0, 0.0, 1.0, -1.0).is_degenerate());
        assert!(Obstacle::circle(f64::NAN, 0.0, 1.0).is_degenerate());
        assert!(!Obstacle::rectangle(0.0, 0.0, 1.0, 1.0).is_degenerate());

        let result = CollisionChecker::new(
            vec![Obstacle::circle(0.0, 0.0, 1.0), Obstacle::rectangle(0.0, 0.0, 0.0, 1.0)],
            0.0,
        );
        assert!(matches!(result, Err(PlanningError::InvalidConfiguration(_))));
        assert!(CollisionChecker::new(vec![], -1.0).is_err());
    }

    #[test]
    fn test_segment_through_obstacle_collides() {
        let checker = CollisionChecker::new(vec![Obstacle::circle(5.0, 0.0, 1.0)], 0.0).unwrap();
        assert!(!checker.is_segment_free(&Point2D::new(0.0, 0.0), &Point2D::new(10.0, 0.0), 0.5));
        assert!(checker.is_segment_free(&Point2D::new(0.0, 2.0), &Point2D::new(10.0, 2.0), 0.5));
        assert_eq!(checker.first_collision(&Point2D::new(5.0, 0.5)), Some(0));
    }

    #[test]
    fn test_segment_tail_is_checked() {
        // Endpoint sits inside the obstacle but short of the next full step
        let checker = CollisionChecker::new(vec![Obstacle::circle(9.8, 0.0, 0.1)], 0.0).unwrap();
        assert!(!checker.is_segment_free(&Point2D::new(0.0, 0.0), &Point2D::new(9.8, 0.0), 3.0));
    }

    #[test]
    fn test_path_free() {
        let square = Obstacle::rectangle(0.0, 0.0, 1.0, 1.0);
        let checker = CollisionChecker::new(vec![square], 0.1).unwrap();
        assert!(checker.is_path_free(&[Point2D::new(2.0, 2.0), Point2D::new(-0.2, 0.5)]));
        assert!(!checker.is_path_free(&[Point2D::new(2.0, 2.0), Point2D::new(-0.05, 0.5)]));
        assert!(checker.is_path_free(&[]));
    }
}
