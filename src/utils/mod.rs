//! Utility modules for waypoint_rrt

pub mod visualization;

pub use visualization::{Visualizer, PathStyle, PointStyle, colors};
