//! Common traits defining interfaces for the planners

use rand::Rng;

use crate::common::error::PlanningError;
use crate::common::types::*;

/// Trait for path planning algorithms
pub trait PathPlanner {
    /// Plan a path from start to goal
    fn plan(&self, start: Point2D, goal: Point2D) -> Result<Path2D, PlanningError>;
}

/// Trait for sampling-based path planning algorithms (RRT, PRM, etc.)
pub trait SamplingBasedPlanner: PathPlanner {
    /// Plan a path drawing every random sample from `rng`
    fn plan_with_rng<R: Rng + ?Sized>(
        &self,
        start: Point2D,
        goal: Point2D,
        rng: &mut R,
    ) -> Result<Path2D, PlanningError>;
}
