//! Canvas <-> world coordinate conversion
//!
//! The canvas has its origin in the top-left corner with the arena centre in
//! the middle of the canvas. World x grows to the canvas left, world y grows
//! down the canvas.

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use crate::common::{AreaBounds, NavigationError, NavigationResult, Point2D};

/// Arena variants with their side length in metres
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ArenaKind {
    #[default]
    Simulation,
    Physical,
}

impl ArenaKind {
    /// Side length [m]
    pub fn width(&self) -> f64 {
        match self {
            ArenaKind::Simulation => 3.0,
            ArenaKind::Physical => 2.0,
        }
    }

    /// `0` is the simulated arena, `1` the physical one
    pub fn from_index(index: u8) -> NavigationResult<Self> {
        match index {
            0 => Ok(ArenaKind::Simulation),
            1 => Ok(ArenaKind::Physical),
            other => Err(NavigationError::InvalidParameter(format!(
                "unknown arena {}, expected 0 (simulation) or 1 (physical)",
                other
            ))),
        }
    }
}

/// Affine map between canvas pixels and world metres
#[derive(Debug, Clone, PartialEq)]
pub struct ArenaFrame {
    canvas_width: f64,
    canvas_height: f64,
    arena_width: f64,
    world_to_canvas: Matrix3<f64>,
    canvas_to_world: Matrix3<f64>,
}

impl ArenaFrame {
    pub fn new(canvas_width: f64, canvas_height: f64, arena_width: f64) -> NavigationResult<Self> {
        let dims = [canvas_width, canvas_height, arena_width];
        if dims.iter().any(|v| !(v.is_finite() && *v > 0.0)) {
            return Err(NavigationError::InvalidParameter(format!(
                "frame dimensions must be positive: canvas {}x{}, arena {}",
                canvas_width, canvas_height, arena_width
            )));
        }

        let sx = canvas_width / arena_width;
        let sy = canvas_height / arena_width;
        #[rustfmt::skip]
        let world_to_canvas = Matrix3::new(
            -sx, 0.0, canvas_width / 2.0,
            0.0, sy, canvas_height / 2.0,
            0.0, 0.0, 1.0,
        );
        let canvas_to_world = world_to_canvas.try_inverse().ok_or_else(|| {
            NavigationError::InvalidParameter("frame transform is not invertible".to_string())
        })?;

        Ok(Self {
            canvas_width,
            canvas_height,
            arena_width,
            world_to_canvas,
            canvas_to_world,
        })
    }

    pub fn for_arena(
        kind: ArenaKind,
        canvas_width: f64,
        canvas_height: f64,
    ) -> NavigationResult<Self> {
        Self::new(canvas_width, canvas_height, kind.width())
    }

    /// Pixels per metre along x
    pub fn scale_factor(&self) -> f64 {
        self.canvas_width / self.arena_width
    }

    pub fn arena_width(&self) -> f64 {
        self.arena_width
    }

    pub fn to_world(&self, canvas: Point2D) -> Point2D {
        apply(&self.canvas_to_world, canvas)
    }

    pub fn to_canvas(&self, world: Point2D) -> Point2D {
        apply(&self.world_to_canvas, world)
    }

    /// Planning area in world coordinates
    pub fn world_bounds(&self) -> AreaBounds {
        let half = self.arena_width / 2.0;
        AreaBounds::new(-half, half, -half, half)
    }

    pub fn canvas_bounds(&self) -> AreaBounds {
        AreaBounds::from_size(self.canvas_width, self.canvas_height)
    }
}

fn apply(m: &Matrix3<f64>, p: Point2D) -> Point2D {
    let v = m * Vector3::new(p.x, p.y, 1.0);
    Point2D::new(v.x, v.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centre_maps_to_origin() {
        let frame = ArenaFrame::for_arena(ArenaKind::Simulation, 600.0, 600.0).unwrap();
        let origin = frame.to_world(Point2D::new(300.0, 300.0));
        assert!(origin.x.abs() < 1e-12 && origin.y.abs() < 1e-12);
        assert_eq!(frame.scale_factor(), 200.0);
    }

    #[test]
    fn test_axes_orientation() {
        let frame = ArenaFrame::for_arena(ArenaKind::Physical, 600.0, 600.0).unwrap();
        // 1 m along world x is 300 px to the canvas left
        let c = frame.to_canvas(Point2D::new(1.0, 0.5));
        assert!((c.x - 0.0).abs() < 1e-9);
        assert!((c.y - 450.0).abs() < 1e-9);
    }

    #[test]
    fn test_round_trip() {
        let frame = ArenaFrame::new(800.0, 600.0, 3.0).unwrap();
        let p = Point2D::new(-0.7, 1.2);
        let back = frame.to_world(frame.to_canvas(p));
        assert!(back.distance(&p) < 1e-9);
    }

    #[test]
    fn test_bounds_and_validation() {
        let frame = ArenaFrame::for_arena(ArenaKind::Simulation, 600.0, 600.0).unwrap();
        assert_eq!(frame.world_bounds(), AreaBounds::new(-1.5, 1.5, -1.5, 1.5));
        assert_eq!(frame.canvas_bounds(), AreaBounds::from_size(600.0, 600.0));
        assert!(ArenaFrame::new(0.0, 600.0, 3.0).is_err());
        assert!(ArenaKind::from_index(2).is_err());
        assert_eq!(ArenaKind::from_index(1).unwrap().width(), 2.0);
    }
}
