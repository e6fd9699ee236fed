//! RRT (Rapidly-exploring Random Tree) path planning algorithm
//!
//! Sampling-based path planning algorithm that builds a tree by
//! randomly sampling the configuration space.

use std::time::{Duration, Instant};

use itertools::Itertools;
use log::{debug, trace};
use ordered_float::OrderedFloat;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::common::{AreaBounds, Path2D, PathPlanner, PlanningError, Point2D, SamplingBasedPlanner};
use crate::path_planning::obstacles::{CollisionChecker, Obstacle};

/// Internal node for RRT tree
///
/// `path_x`/`path_y` hold the local sub-path from the parent to this node:
/// the first entry is the parent's position, the last is this node's.
#[derive(Debug, Clone, PartialEq)]
pub struct RRTNode {
    pub x: f64,
    pub y: f64,
    pub path_x: Vec<f64>,
    pub path_y: Vec<f64>,
    pub parent: Option<usize>,
}

impl RRTNode {
    pub fn new(x: f64, y: f64) -> Self {
        RRTNode {
            x,
            y,
            path_x: Vec::new(),
            path_y: Vec::new(),
            parent: None,
        }
    }

    pub fn to_point(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }

    /// Local sub-path as points
    pub fn sub_path(&self) -> impl DoubleEndedIterator<Item = Point2D> + '_ {
        self.path_x.iter().zip(self.path_y.iter()).map(|(&x, &y)| Point2D::new(x, y))
    }
}

/// Node store of a single planning call
#[derive(Debug, Clone, PartialEq)]
pub struct RRTTree {
    nodes: Vec<RRTNode>,
}

impl RRTTree {
    /// Tree holding only the root at `start`
    pub fn with_root(start: Point2D) -> Self {
        let mut root = RRTNode::new(start.x, start.y);
        root.path_x.push(start.x);
        root.path_y.push(start.y);
        Self { nodes: vec![root] }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[RRTNode] {
        &self.nodes
    }

    pub fn get(&self, index: usize) -> Option<&RRTNode> {
        self.nodes.get(index)
    }

    /// Append a node and return its index. The parent must already be stored.
    pub fn push(&mut self, node: RRTNode) -> usize {
        debug_assert!(node.parent.map_or(true, |p| p < self.nodes.len()));
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Index of the node closest to `p`; ties go to the earliest node
    pub fn nearest_index(&self, p: &Point2D) -> usize {
        self.nodes
            .iter()
            .map(|node| OrderedFloat(node.to_point().distance_squared(p)))
            .position_min()
            .unwrap_or(0)
    }

    /// Walk parents from `index` to the root and return the start-to-node path
    pub fn extract_path(&self, index: usize) -> Path2D {
        let mut points = Vec::new();
        let mut node_index = Some(index);

        while let Some(i) = node_index {
            let node = &self.nodes[i];
            points.extend(node.sub_path().rev());
            node_index = node.parent;
        }

        points.reverse();
        Path2D::from_points(points)
    }
}

/// Configuration for RRT planner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RRTConfig {
    /// Expansion distance per step
    pub expand_dis: f64,
    /// Path resolution for collision checking
    pub path_resolution: f64,
    /// Goal sampling rate (0-100)
    pub goal_sample_rate: u32,
    /// Maximum number of random samples
    pub max_samples: usize,
    /// Robot radius for collision checking
    pub robot_radius: f64,
    /// Seed used by `PathPlanner::plan`, entropy when unset
    pub seed: Option<u64>,
    /// Optional wall-clock limit per planning call
    pub time_limit_ms: Option<u64>,
}

impl Default for RRTConfig {
    fn default() -> Self {
        Self {
            expand_dis: 3.0,
            path_resolution: 0.5,
            goal_sample_rate: 0,
            max_samples: 500,
            robot_radius: 0.0,
            seed: None,
            time_limit_ms: None,
        }
    }
}

impl RRTConfig {
    fn validate(&self) -> Result<(), PlanningError> {
        let invalid = |msg: String| Err(PlanningError::InvalidConfiguration(msg));

        if !(self.expand_dis.is_finite() && self.expand_dis > 0.0) {
            return invalid(format!("expand_dis must be positive, got {}", self.expand_dis));
        }
        if !(self.path_resolution.is_finite() && self.path_resolution > 0.0) {
            return invalid(format!(
                "path_resolution must be positive, got {}",
                self.path_resolution
            ));
        }
        if self.path_resolution > self.expand_dis {
            return invalid(format!(
                "path_resolution {} exceeds expand_dis {}",
                self.path_resolution, self.expand_dis
            ));
        }
        if self.max_samples == 0 {
            return invalid("max_samples must be at least 1".to_string());
        }
        if self.goal_sample_rate > 100 {
            return invalid(format!(
                "goal_sample_rate must be 0-100, got {}",
                self.goal_sample_rate
            ));
        }
        Ok(())
    }
}

/// Result of growing a tree between two points
#[derive(Debug, Clone)]
pub struct RRTSearch {
    pub tree: RRTTree,
    /// Index of the node sitting on the goal, if it was reached
    pub goal_index: Option<usize>,
    /// Random samples drawn
    pub samples: usize,
    pub timed_out: bool,
}

impl RRTSearch {
    pub fn path(&self) -> Option<Path2D> {
        self.goal_index.map(|i| self.tree.extract_path(i))
    }

    pub fn into_path(self) -> Result<Path2D, PlanningError> {
        match self.path() {
            Some(path) => Ok(path),
            None if self.timed_out => Err(PlanningError::Timeout { samples: self.samples }),
            None => Err(PlanningError::NoPathFound { samples: self.samples }),
        }
    }
}

/// RRT path planner
#[derive(Debug, Clone)]
pub struct RRTPlanner {
    config: RRTConfig,
    checker: CollisionChecker,
    bounds: AreaBounds,
}

impl RRTPlanner {
    /// Create a new RRT planner, rejecting malformed input up front
    pub fn new(
        obstacles: Vec<Obstacle>,
        bounds: AreaBounds,
        config: RRTConfig,
    ) -> Result<Self, PlanningError> {
        config.validate()?;
        if !bounds.is_valid() {
            return Err(PlanningError::InvalidConfiguration(format!(
                "bounds must have positive extent: {:?}",
                bounds
            )));
        }
        let checker = CollisionChecker::new(obstacles, config.robot_radius)?;

        Ok(RRTPlanner { config, checker, bounds })
    }

    pub fn config(&self) -> &RRTConfig {
        &self.config
    }

    pub fn bounds(&self) -> &AreaBounds {
        &self.bounds
    }

    pub fn checker(&self) -> &CollisionChecker {
        &self.checker
    }

    /// Get obstacles
    pub fn obstacles(&self) -> &[Obstacle] {
        self.checker.obstacles()
    }

    /// Grow a tree from `start` until it reaches `goal` or the budget runs out
    ///
    /// Errors are reserved for inputs that can never succeed; running out of
    /// samples is reported through `RRTSearch::goal_index` being `None`.
    pub fn grow_tree<R: Rng + ?Sized>(
        &self,
        start: Point2D,
        goal: Point2D,
        rng: &mut R,
    ) -> Result<RRTSearch, PlanningError> {
        self.check_endpoints(start, goal)?;

        let mut tree = RRTTree::with_root(start);
        if start == goal {
            return Ok(RRTSearch { tree, goal_index: Some(0), samples: 0, timed_out: false });
        }

        let goal_node = RRTNode::new(goal.x, goal.y);
        let deadline = self
            .config
            .time_limit_ms
            .map(|ms| Instant::now() + Duration::from_millis(ms));

        for samples in 0..self.config.max_samples {
            if deadline.map_or(false, |d| Instant::now() >= d) {
                debug!("[RRT] time limit hit after {} samples, {} nodes", samples, tree.len());
                return Ok(RRTSearch { tree, goal_index: None, samples, timed_out: true });
            }

            let rnd_node = self.get_random_node(&goal_node, rng);
            let nearest_ind = tree.nearest_index(&rnd_node.to_point());
            let nearest_node = &tree.nodes[nearest_ind];

            let (d, _) = self.calc_distance_and_angle(nearest_node, &rnd_node);
            if d == 0.0 {
                continue;
            }

            let mut new_node = self.steer(nearest_node, &rnd_node, self.config.expand_dis);
            if !self.bounds.contains(&new_node.to_point()) || !self.check_collision(&new_node) {
                trace!(
                    "[RRT] sample {} rejected at ({:.2},{:.2})",
                    samples,
                    new_node.x,
                    new_node.y
                );
                continue;
            }

            new_node.parent = Some(nearest_ind);
            let new_ind = tree.push(new_node);
            let last = &tree.nodes[new_ind];

            if self.calc_dist_to_goal(last, &goal_node) <= self.config.expand_dis {
                let mut final_node = self.steer(last, &goal_node, self.config.expand_dis);
                if self.check_collision(&final_node) {
                    final_node.parent = Some(new_ind);
                    let goal_index = tree.push(final_node);
                    debug!(
                        "[RRT] goal reached after {} samples, {} nodes",
                        samples + 1,
                        tree.len()
                    );
                    return Ok(RRTSearch {
                        tree,
                        goal_index: Some(goal_index),
                        samples: samples + 1,
                        timed_out: false,
                    });
                }
            }
        }

        debug!(
            "[RRT] no path after {} samples, {} nodes",
            self.config.max_samples,
            tree.len()
        );
        Ok(RRTSearch {
            tree,
            goal_index: None,
            samples: self.config.max_samples,
            timed_out: false,
        })
    }

    fn check_endpoints(&self, start: Point2D, goal: Point2D) -> Result<(), PlanningError> {
        for (name, p) in [("start", start), ("goal", goal)] {
            if !p.is_finite() || !self.bounds.contains(&p) {
                return Err(PlanningError::InvalidConfiguration(format!(
                    "{} ({}, {}) is outside the planning bounds",
                    name, p.x, p.y
                )));
            }
        }
        if !self.checker.is_point_free(&start) {
            return Err(PlanningError::StartInCollision { x: start.x, y: start.y });
        }
        if !self.checker.is_point_free(&goal) {
            return Err(PlanningError::GoalInCollision { x: goal.x, y: goal.y });
        }
        Ok(())
    }

    fn steer(&self, from_node: &RRTNode, to_node: &RRTNode, extend_length: f64) -> RRTNode {
        let mut new_node = RRTNode::new(from_node.x, from_node.y);
        let (d, theta) = self.calc_distance_and_angle(from_node, to_node);

        new_node.path_x = vec![new_node.x];
        new_node.path_y = vec![new_node.y];

        let reachable = extend_length >= d;
        let extend_length = extend_length.min(d);
        let n_expand = (extend_length / self.config.path_resolution).floor() as usize;
        let (sin, cos) = theta.sin_cos();

        for _ in 0..n_expand {
            new_node.x += self.config.path_resolution * cos;
            new_node.y += self.config.path_resolution * sin;
            new_node.path_x.push(new_node.x);
            new_node.path_y.push(new_node.y);
        }

        // Land exactly on the target only when it lies within the extension
        if reachable {
            new_node.path_x.push(to_node.x);
            new_node.path_y.push(to_node.y);
            new_node.x = to_node.x;
            new_node.y = to_node.y;
        }

        new_node
    }

    fn calc_dist_to_goal(&self, node: &RRTNode, goal: &RRTNode) -> f64 {
        (node.x - goal.x).hypot(node.y - goal.y)
    }

    fn get_random_node<R: Rng + ?Sized>(&self, goal: &RRTNode, rng: &mut R) -> RRTNode {
        let rate = self.config.goal_sample_rate;
        if rate > 0 && rng.gen_range(0..100) < rate {
            return RRTNode::new(goal.x, goal.y);
        }
        let p = self.bounds.sample(rng);
        RRTNode::new(p.x, p.y)
    }

    fn check_collision(&self, node: &RRTNode) -> bool {
        node.sub_path().all(|p| self.checker.is_point_free(&p))
    }

    fn calc_distance_and_angle(&self, from_node: &RRTNode, to_node: &RRTNode) -> (f64, f64) {
        let dx = to_node.x - from_node.x;
        let dy = to_node.y - from_node.y;
        (dx.hypot(dy), dy.atan2(dx))
    }
}

impl PathPlanner for RRTPlanner {
    fn plan(&self, start: Point2D, goal: Point2D) -> Result<Path2D, PlanningError> {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.plan_with_rng(start, goal, &mut rng)
    }
}

impl SamplingBasedPlanner for RRTPlanner {
    fn plan_with_rng<R: Rng + ?Sized>(
        &self,
        start: Point2D,
        goal: Point2D,
        rng: &mut R,
    ) -> Result<Path2D, PlanningError> {
        self.grow_tree(start, goal, rng)?.into_path()
    }
}
