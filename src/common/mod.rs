//! Common types, traits, and error definitions for waypoint_rrt
//!
//! This module provides the foundational building blocks shared by the
//! planner, the waypoint session and the arena glue.

pub mod types;
pub mod traits;
pub mod error;

pub use types::*;
pub use traits::*;
pub use error::*;
