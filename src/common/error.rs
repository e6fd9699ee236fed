//! Error types for waypoint_rrt

use thiserror::Error;

/// Outcome of a single planning call that did not produce a path.
///
/// Stored per segment by the waypoint session, hence `Clone`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanningError {
    /// Sample budget exhausted before the goal was reached
    #[error("no path found after {samples} samples")]
    NoPathFound { samples: usize },
    /// Wall-clock limit hit before the goal was reached
    #[error("planning timed out after {samples} samples")]
    Timeout { samples: usize },
    /// Malformed obstacles, bounds or tuning, or endpoints outside the bounds
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// Start lies inside an inflated obstacle
    #[error("start ({x:.3}, {y:.3}) is inside an obstacle")]
    StartInCollision { x: f64, y: f64 },
    /// Goal lies inside an inflated obstacle
    #[error("goal ({x:.3}, {y:.3}) is inside an obstacle")]
    GoalInCollision { x: f64, y: f64 },
}

impl PlanningError {
    /// Whether retrying with a larger budget or different seed could help
    pub fn is_recoverable(&self) -> bool {
        matches!(self, PlanningError::NoPathFound { .. } | PlanningError::Timeout { .. })
    }
}

/// Main error type for the crate
#[derive(Debug, Error)]
pub enum NavigationError {
    /// Planning failed
    #[error("planning error: {0}")]
    Planning(#[from] PlanningError),
    /// Invalid parameter
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// Malformed line in a text file
    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON map or configuration error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for crate operations
pub type NavigationResult<T> = Result<T, NavigationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PlanningError::NoPathFound { samples: 50 };
        assert_eq!(format!("{}", err), "no path found after 50 samples");

        let err: NavigationError = err.into();
        assert_eq!(format!("{}", err), "planning error: no path found after 50 samples");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: NavigationError = io_err.into();
        assert!(matches!(err, NavigationError::Io(_)));
    }

    #[test]
    fn test_recoverable_errors() {
        assert!(PlanningError::NoPathFound { samples: 1 }.is_recoverable());
        assert!(PlanningError::Timeout { samples: 1 }.is_recoverable());
        assert!(!PlanningError::StartInCollision { x: 0.0, y: 0.0 }.is_recoverable());
        assert!(!PlanningError::InvalidConfiguration("bad".to_string()).is_recoverable());
    }
}
