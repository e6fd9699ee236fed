//! waypoint_rrt - RRT path planning between user-placed waypoints
//!
//! This crate plans collision-free paths for a mobile robot through a
//! sequence of waypoints in a bounded 2D arena with circular and
//! rectangular obstacles, re-planning only the segments an edit affects.

// Core modules
pub mod common;
pub mod config;
pub mod utils;

// Algorithm modules
pub mod path_planning;

// Arena glue
pub mod arena;

// Re-export common types for convenience
pub use common::{Point2D, Path2D, AreaBounds};
pub use common::{PathPlanner, SamplingBasedPlanner};
pub use common::{PlanningError, NavigationError, NavigationResult};
pub use config::NavigationConfig;
pub use path_planning::{Obstacle, RRTConfig, RRTPlanner, WaypointSession};
