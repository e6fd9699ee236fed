//! Top-level configuration, loadable from JSON
//!
//! Missing sections take the defaults below. A partial `rrt` block is
//! laid over `NavigationConfig::arena_rrt_config`, so only the fields it
//! names change.

use std::fs;
use std::path::Path;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::arena::{ArenaFrame, ArenaKind, LandmarkObstacleConfig};
use crate::common::NavigationResult;
use crate::path_planning::RRTConfig;

/// Canvas and arena dimensions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub kind: ArenaKind,
    /// Canvas size [px]
    pub canvas_width: f64,
    pub canvas_height: f64,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            kind: ArenaKind::Simulation,
            canvas_width: 600.0,
            canvas_height: 600.0,
        }
    }
}

impl ArenaConfig {
    pub fn frame(&self) -> NavigationResult<ArenaFrame> {
        ArenaFrame::for_arena(self.kind, self.canvas_width, self.canvas_height)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    pub arena: ArenaConfig,
    /// Planner tuning in world metres
    #[serde(deserialize_with = "arena_rrt_overrides")]
    pub rrt: RRTConfig,
    pub landmarks: LandmarkObstacleConfig,
    /// Session seed, entropy when unset
    pub seed: Option<u64>,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            arena: ArenaConfig::default(),
            rrt: Self::arena_rrt_config(),
            landmarks: LandmarkObstacleConfig::default(),
            seed: None,
        }
    }
}

impl NavigationConfig {
    /// Planner tuning for a 2-3 m arena and a robot of ~16 cm wheel baseline
    pub fn arena_rrt_config() -> RRTConfig {
        RRTConfig {
            expand_dis: 0.2,
            path_resolution: 0.02,
            max_samples: 2000,
            goal_sample_rate: 5,
            robot_radius: 0.08,
            ..Default::default()
        }
    }

    pub fn from_json_str(json: &str) -> NavigationResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> NavigationResult<Self> {
        Self::from_json_str(&fs::read_to_string(path)?)
    }
}

/// Reads an `rrt` object and fills its missing fields from the arena tuning
fn arena_rrt_overrides<'de, D>(deserializer: D) -> Result<RRTConfig, D::Error>
where
    D: Deserializer<'de>,
{
    let overrides = Map::<String, Value>::deserialize(deserializer)?;
    let mut merged = match serde_json::to_value(NavigationConfig::arena_rrt_config()) {
        Ok(Value::Object(fields)) => fields,
        Ok(other) => {
            return Err(D::Error::custom(format!(
                "rrt defaults are not an object: {}",
                other
            )))
        }
        Err(e) => return Err(D::Error::custom(e)),
    };
    merged.extend(overrides);
    RRTConfig::deserialize(Value::Object(merged)).map_err(D::Error::custom)
}
