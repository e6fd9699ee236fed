//! Landmark map files and the obstacle set built from them
//!
//! A map is a JSON object of named positions in world metres:
//!
//! ```json
//! { "aruco1_0": {"x": 1.2, "y": -0.4}, "apple_0": {"x": 0.3, "y": 0.8} }
//! ```
//!
//! `aruco<id>_<n>` entries are ArUco markers, everything else is fruit
//! whose kind is the alphabetic part of the name.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::common::{NavigationResult, Point2D};
use crate::path_planning::obstacles::{CircleObstacle, Obstacle, RectangleObstacle};

#[derive(Debug, Deserialize)]
struct RawPosition {
    x: f64,
    y: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LandmarkKind {
    Marker { id: u32 },
    Fruit { kind: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Landmark {
    pub name: String,
    pub kind: LandmarkKind,
    pub position: Point2D,
}

impl Landmark {
    fn classify(name: &str) -> LandmarkKind {
        let marker_id = name
            .strip_prefix("aruco")
            .and_then(|rest| rest.split('_').next())
            .and_then(|id| id.parse().ok());

        match marker_id {
            Some(id) => LandmarkKind::Marker { id },
            None => LandmarkKind::Fruit {
                kind: name.chars().filter(|c| c.is_ascii_alphabetic()).collect(),
            },
        }
    }
}

/// Sizes used to turn landmarks into obstacles [m]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandmarkObstacleConfig {
    /// Side of the square ArUco marker block
    pub marker_size: f64,
    /// Radius of a fruit
    pub fruit_radius: f64,
}

impl Default for LandmarkObstacleConfig {
    fn default() -> Self {
        Self {
            marker_size: 0.07,
            fruit_radius: 0.05,
        }
    }
}

/// Landmarks in file order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LandmarkMap {
    landmarks: Vec<Landmark>,
}

impl LandmarkMap {
    pub fn from_json_str(json: &str) -> NavigationResult<Self> {
        let raw: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json)?;

        let landmarks = raw
            .into_iter()
            .map(|(name, value)| {
                let pos: RawPosition = serde_json::from_value(value)?;
                Ok(Landmark {
                    kind: Landmark::classify(&name),
                    name,
                    position: Point2D::new(pos.x, pos.y),
                })
            })
            .collect::<NavigationResult<Vec<_>>>()?;

        Ok(Self { landmarks })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> NavigationResult<Self> {
        Self::from_json_str(&fs::read_to_string(path)?)
    }

    pub fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    pub fn markers(&self) -> impl Iterator<Item = &Landmark> {
        self.landmarks.iter().filter(|l| matches!(l.kind, LandmarkKind::Marker { .. }))
    }

    pub fn fruits(&self) -> impl Iterator<Item = &Landmark> {
        self.landmarks.iter().filter(|l| matches!(l.kind, LandmarkKind::Fruit { .. }))
    }

    /// Markers as centred squares, fruit as circles
    pub fn obstacles(&self, config: &LandmarkObstacleConfig) -> Vec<Obstacle> {
        self.landmarks
            .iter()
            .map(|l| match l.kind {
                LandmarkKind::Marker { .. } => Obstacle::from(RectangleObstacle::centered(
                    l.position,
                    config.marker_size,
                    config.marker_size,
                )),
                LandmarkKind::Fruit { .. } => Obstacle::from(CircleObstacle::new(
                    l.position.x,
                    l.position.y,
                    config.fruit_radius,
                )),
            })
            .collect()
    }
}
