// Path Planning module: obstacle model, RRT planner and waypoint session

pub mod obstacles;
pub mod rrt;
pub mod session;

pub use obstacles::*;
pub use rrt::*;
pub use session::*;
