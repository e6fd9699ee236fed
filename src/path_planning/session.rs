//! Incremental waypoint path session
//!
//! Keeps a polyline of user waypoints starting at the robot position and one
//! planned segment per polyline edge. Appending a waypoint plans one new
//! segment; removing one drops the suffix from that index and re-plans it.

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::common::{
    NavigationError, NavigationResult, Path2D, PlanningError, Point2D, SamplingBasedPlanner,
};

/// Planning outcome of one segment
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentStatus {
    Planned,
    Failed(PlanningError),
}

/// Planned path between two consecutive waypoints
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub start: Point2D,
    pub goal: Point2D,
    /// Empty when planning failed
    pub path: Path2D,
    pub status: SegmentStatus,
    /// Session-wide counter value at the time this segment was planned
    pub revision: u64,
}

impl Segment {
    pub fn is_planned(&self) -> bool {
        self.status == SegmentStatus::Planned
    }

    pub fn error(&self) -> Option<&PlanningError> {
        match &self.status {
            SegmentStatus::Planned => None,
            SegmentStatus::Failed(err) => Some(err),
        }
    }
}

/// What a removal re-planned
#[derive(Debug, Clone, PartialEq)]
pub struct RecomputeReport {
    pub removed: Point2D,
    /// Indices of the segments planned again, in order
    pub regenerated: Vec<usize>,
    /// Subset of `regenerated` that failed
    pub failed: Vec<usize>,
}

/// Result of a click-style edit
#[derive(Debug, Clone, PartialEq)]
pub enum WaypointEdit {
    Added { index: usize },
    Removed(RecomputeReport),
}

/// Waypoints and their per-edge paths
pub struct WaypointSession<P> {
    planner: P,
    robot_start: Point2D,
    waypoints: Vec<Point2D>,
    segments: Vec<Segment>,
    seed: Option<u64>,
    rng: StdRng,
    next_revision: u64,
}

impl<P: SamplingBasedPlanner> WaypointSession<P> {
    pub fn new(robot_start: Point2D, planner: P) -> Self {
        Self {
            planner,
            robot_start,
            waypoints: Vec::new(),
            segments: Vec::new(),
            seed: None,
            rng: StdRng::from_entropy(),
            next_revision: 0,
        }
    }

    /// Plan every segment from a seed derived from `seed` and its index,
    /// so the same edge at the same position is always planned the same way
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn planner(&self) -> &P {
        &self.planner
    }

    pub fn robot_start(&self) -> Point2D {
        self.robot_start
    }

    pub fn waypoints(&self) -> &[Point2D] {
        &self.waypoints
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path2D> {
        self.segments.iter().map(|s| &s.path)
    }

    /// Indices of segments whose planning failed
    pub fn failed_segments(&self) -> Vec<usize> {
        self.segments
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.is_planned())
            .map(|(i, _)| i)
            .collect()
    }

    /// Whole route from the robot start to the last waypoint, joints merged.
    /// `None` while any segment is failed.
    pub fn full_path(&self) -> Option<Path2D> {
        let mut route = Path2D::from_points(vec![self.robot_start]);
        for segment in &self.segments {
            if !segment.is_planned() {
                return None;
            }
            let skip = usize::from(route.last() == segment.path.first());
            route.points.extend(segment.path.points.iter().skip(skip));
        }
        Some(route)
    }

    /// Plan from the current last waypoint (or the robot start) to `waypoint`
    pub fn add_waypoint(&mut self, waypoint: Point2D) -> &Segment {
        let index = self.waypoints.len();
        let start = self.waypoints.last().copied().unwrap_or(self.robot_start);

        let segment = self.plan_segment(index, start, waypoint);
        self.waypoints.push(waypoint);
        self.segments.push(segment);
        debug_assert_eq!(self.waypoints.len(), self.segments.len());

        &self.segments[index]
    }

    /// Remove waypoint `index` and re-plan every segment after it
    pub fn remove_waypoint(&mut self, index: usize) -> NavigationResult<RecomputeReport> {
        if index >= self.waypoints.len() {
            return Err(NavigationError::InvalidParameter(format!(
                "waypoint index {} out of range, session has {}",
                index,
                self.waypoints.len()
            )));
        }

        let tail = self.waypoints.split_off(index);
        self.segments.truncate(index);
        debug!("[Session] removed waypoint {}, re-planning {} segments", index, tail.len() - 1);

        let mut report = RecomputeReport {
            removed: tail[0],
            regenerated: Vec::with_capacity(tail.len() - 1),
            failed: Vec::new(),
        };
        for &waypoint in &tail[1..] {
            let segment_index = self.waypoints.len();
            if !self.add_waypoint(waypoint).is_planned() {
                report.failed.push(segment_index);
            }
            report.regenerated.push(segment_index);
        }

        Ok(report)
    }

    /// Index of the first waypoint within `radius` of `p`
    pub fn find_waypoint_near(&self, p: Point2D, radius: f64) -> Option<usize> {
        self.waypoints.iter().position(|w| w.distance(&p) <= radius)
    }

    /// Remove the waypoint under `p` if there is one, otherwise add `p`
    pub fn toggle_waypoint(&mut self, p: Point2D, radius: f64) -> NavigationResult<WaypointEdit> {
        match self.find_waypoint_near(p, radius) {
            Some(index) => Ok(WaypointEdit::Removed(self.remove_waypoint(index)?)),
            None => {
                let index = self.waypoints.len();
                self.add_waypoint(p);
                Ok(WaypointEdit::Added { index })
            }
        }
    }

    fn plan_segment(&mut self, index: usize, start: Point2D, goal: Point2D) -> Segment {
        let result = match self.seed {
            Some(seed) => {
                let mut rng = StdRng::seed_from_u64(segment_seed(seed, index));
                self.planner.plan_with_rng(start, goal, &mut rng)
            }
            None => self.planner.plan_with_rng(start, goal, &mut self.rng),
        };

        let revision = self.next_revision;
        self.next_revision += 1;

        match result {
            Ok(path) => {
                info!(
                    "[Session] segment {} planned: {} points, length {:.3}",
                    index,
                    path.len(),
                    path.total_length()
                );
                Segment { start, goal, path, status: SegmentStatus::Planned, revision }
            }
            Err(err) => {
                warn!("[Session] segment {} failed: {}", index, err);
                Segment {
                    start,
                    goal,
                    path: Path2D::new(),
                    status: SegmentStatus::Failed(err),
                    revision,
                }
            }
        }
    }
}

fn segment_seed(seed: u64, index: usize) -> u64 {
    seed ^ (index as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use rand::Rng;

    use crate::common::{AreaBounds, PathPlanner};
    use crate::path_planning::obstacles::Obstacle;
    use crate::path_planning::rrt::{RRTConfig, RRTPlanner};

    /// Straight-line planner that records its calls and refuses some goals
    #[derive(Default)]
    struct StubPlanner {
        calls: RefCell<Vec<(Point2D, Point2D)>>,
        blocked: Vec<Point2D>,
    }

    impl PathPlanner for StubPlanner {
        fn plan(&self, start: Point2D, goal: Point2D) -> Result<Path2D, PlanningError> {
            self.calls.borrow_mut().push((start, goal));
            if self.blocked.contains(&goal) {
                return Err(PlanningError::NoPathFound { samples: 10 });
            }
            Ok(Path2D::from_points(vec![start, goal]))
        }
    }

    impl SamplingBasedPlanner for StubPlanner {
        fn plan_with_rng<R: Rng + ?Sized>(
            &self,
            start: Point2D,
            goal: Point2D,
            _rng: &mut R,
        ) -> Result<Path2D, PlanningError> {
            self.plan(start, goal)
        }
    }

    fn p(x: f64, y: f64) -> Point2D {
        Point2D::new(x, y)
    }

    fn rrt_session() -> WaypointSession<RRTPlanner> {
        let config = RRTConfig {
            expand_dis: 20.0,
            path_resolution: 5.0,
            max_samples: 3000,
            goal_sample_rate: 10,
            ..Default::default()
        };
        let planner = RRTPlanner::new(
            vec![Obstacle::circle(100.0, 100.0, 20.0)],
            AreaBounds::from_size(200.0, 200.0),
            config,
        )
        .unwrap();
        WaypointSession::new(p(20.0, 20.0), planner).with_seed(11)
    }

    #[test]
    fn test_add_waypoint_chains_segments() {
        let mut session = WaypointSession::new(p(0.0, 0.0), StubPlanner::default());
        session.add_waypoint(p(1.0, 0.0));
        session.add_waypoint(p(1.0, 1.0));

        assert_eq!(session.waypoints().len(), session.segments().len());
        assert_eq!(
            *session.planner().calls.borrow(),
            vec![(p(0.0, 0.0), p(1.0, 0.0)), (p(1.0, 0.0), p(1.0, 1.0))]
        );
        assert_eq!(
            session.full_path().unwrap().points,
            vec![p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0)]
        );
    }

    #[test]
    fn test_remove_middle_waypoint_replans_suffix_only() {
        let mut session = WaypointSession::new(p(0.0, 0.0), StubPlanner::default());
        session.add_waypoint(p(1.0, 0.0));
        session.add_waypoint(p(2.0, 0.0));
        session.add_waypoint(p(3.0, 0.0));
        let first = session.segments()[0].clone();

        let report = session.remove_waypoint(1).unwrap();

        assert_eq!(report.removed, p(2.0, 0.0));
        assert_eq!(report.regenerated, vec![1]);
        assert!(report.failed.is_empty());
        assert_eq!(session.waypoints(), &[p(1.0, 0.0), p(3.0, 0.0)]);
        assert_eq!(session.segments()[0], first);
        assert_eq!(session.segments()[1].start, p(1.0, 0.0));
        assert_eq!(session.segments()[1].revision, 3);
        assert_eq!(session.planner().calls.borrow().len(), 4);
    }

    #[test]
    fn test_remove_first_waypoint_replans_from_robot_start() {
        let mut session = WaypointSession::new(p(0.0, 0.0), StubPlanner::default());
        session.add_waypoint(p(1.0, 0.0));
        session.add_waypoint(p(2.0, 0.0));

        let report = session.remove_waypoint(0).unwrap();
        assert_eq!(report.regenerated, vec![0]);
        assert_eq!(session.segments()[0].start, p(0.0, 0.0));
        assert_eq!(session.segments()[0].goal, p(2.0, 0.0));
    }

    #[test]
    fn test_remove_out_of_range() {
        let mut session = WaypointSession::new(p(0.0, 0.0), StubPlanner::default());
        session.add_waypoint(p(1.0, 0.0));
        assert!(matches!(
            session.remove_waypoint(1),
            Err(NavigationError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_failed_segment_does_not_abort() {
        let planner = StubPlanner { blocked: vec![p(2.0, 0.0)], ..Default::default() };
        let mut session = WaypointSession::new(p(0.0, 0.0), planner);
        session.add_waypoint(p(1.0, 0.0));
        let failed = session.add_waypoint(p(2.0, 0.0)).clone();
        session.add_waypoint(p(3.0, 0.0));

        assert_eq!(failed.error(), Some(&PlanningError::NoPathFound { samples: 10 }));
        assert!(failed.path.is_empty());
        assert_eq!(session.failed_segments(), vec![1]);
        assert_eq!(session.segments()[2].start, p(2.0, 0.0));
        assert!(session.segments()[2].is_planned());
        assert!(session.full_path().is_none());

        let report = session.remove_waypoint(0).unwrap();
        assert_eq!(report.regenerated, vec![0, 1]);
        assert_eq!(report.failed, vec![0]);
        assert_eq!(session.failed_segments(), vec![0]);
    }

    #[test]
    fn test_toggle_waypoint() {
        let mut session = WaypointSession::new(p(0.0, 0.0), StubPlanner::default());
        let first = session.toggle_waypoint(p(5.0, 5.0), 1.0).unwrap();
        assert_eq!(first, WaypointEdit::Added { index: 0 });
        let second = session.toggle_waypoint(p(8.0, 5.0), 1.0).unwrap();
        assert_eq!(second, WaypointEdit::Added { index: 1 });
        assert_eq!(session.find_waypoint_near(p(5.5, 5.5), 1.0), Some(0));

        match session.toggle_waypoint(p(5.5, 5.5), 1.0).unwrap() {
            WaypointEdit::Removed(report) => assert_eq!(report.removed, p(5.0, 5.0)),
            other => panic!("expected removal, got {:?}", other),
        }
        assert_eq!(session.waypoints(), &[p(8.0, 5.0)]);
    }

    #[test]
    fn test_readding_removed_waypoint_reproduces_segments() {
        let mut session = rrt_session();
        session.add_waypoint(p(180.0, 30.0));
        session.add_waypoint(p(170.0, 170.0));
        session.add_waypoint(p(30.0, 180.0));
        let before: Vec<Path2D> = session.paths().cloned().collect();
        assert!(session.failed_segments().is_empty());

        session.remove_waypoint(2).unwrap();
        session.add_waypoint(p(30.0, 180.0));

        let after: Vec<Path2D> = session.paths().cloned().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_rrt_session_paths_join_up() {
        let mut session = rrt_session();
        session.add_waypoint(p(180.0, 180.0));
        session.add_waypoint(p(20.0, 180.0));
        session.remove_waypoint(0).unwrap();

        let segment = &session.segments()[0];
        assert!(segment.is_planned());
        assert_eq!(segment.path.first(), Some(p(20.0, 20.0)));
        assert_eq!(segment.path.last(), Some(p(20.0, 180.0)));
        assert!(session.planner().checker().is_path_free(&segment.path.points));
    }
}
