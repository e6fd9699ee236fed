//! Arena glue feeding the planner: coordinate frames, landmark maps and
//! waypoint files.

pub mod frame;
pub mod landmark_map;
pub mod waypoint_file;

pub use frame::{ArenaFrame, ArenaKind};
pub use landmark_map::{Landmark, LandmarkKind, LandmarkMap, LandmarkObstacleConfig};
pub use waypoint_file::{read_waypoints, write_waypoints};
