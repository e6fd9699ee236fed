//! Visualization utilities for waypoint_rrt
//!
//! Provides a unified interface for plotting using gnuplot. Layers are
//! collected first and drawn onto a single set of axes when the plot is
//! shown or saved.

use std::f64::consts::PI;

use gnuplot::{AutoOption, AxesCommon, Caption, Color, Figure, LineWidth, PointSize, PointSymbol};

use crate::common::{AreaBounds, Path2D, Point2D};
use crate::path_planning::{Obstacle, RRTTree, Segment};

/// Color palette for consistent styling
pub mod colors {
    pub const BLACK: &str = "#000000";
    pub const RED: &str = "#FF0000";
    pub const GREEN: &str = "#00FF00";
    pub const BLUE: &str = "#0000FF";
    pub const ORANGE: &str = "#EBA134";
    pub const GRAY: &str = "#808080";

    // Semantic colors
    pub const OBSTACLE: &str = BLACK;
    pub const START: &str = GREEN;
    pub const GOAL: &str = BLUE;
    pub const PATH: &str = RED;
    pub const TREE: &str = GRAY;
    pub const WAYPOINT: &str = ORANGE;
}

/// Vertices used to outline a circle
const CIRCLE_VERTICES: usize = 48;

/// Style for path rendering
#[derive(Debug, Clone)]
pub struct PathStyle {
    pub color: String,
    pub line_width: f64,
    pub caption: String,
}

impl PathStyle {
    pub fn new(color: &str, caption: &str) -> Self {
        Self {
            color: color.to_string(),
            line_width: 2.0,
            caption: caption.to_string(),
        }
    }

    pub fn with_line_width(mut self, width: f64) -> Self {
        self.line_width = width;
        self
    }
}

impl Default for PathStyle {
    fn default() -> Self {
        Self::new(colors::PATH, "Path")
    }
}

/// Style for point rendering
#[derive(Debug, Clone)]
pub struct PointStyle {
    pub color: String,
    pub size: f64,
    pub symbol: char,
    pub caption: String,
}

impl PointStyle {
    pub fn new(color: &str, caption: &str) -> Self {
        Self {
            color: color.to_string(),
            size: 1.0,
            symbol: 'O',
            caption: caption.to_string(),
        }
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    pub fn with_symbol(mut self, symbol: char) -> Self {
        self.symbol = symbol;
        self
    }
}

#[derive(Debug, Clone)]
enum Layer {
    Lines { x: Vec<f64>, y: Vec<f64>, style: PathStyle },
    Points { x: Vec<f64>, y: Vec<f64>, style: PointStyle },
}

/// Main visualizer struct
pub struct Visualizer {
    layers: Vec<Layer>,
    title: String,
    x_label: String,
    y_label: String,
    x_range: Option<(f64, f64)>,
    y_range: Option<(f64, f64)>,
    aspect_ratio: f64,
}

impl Visualizer {
    /// Create a new visualizer
    pub fn new() -> Self {
        Self {
            layers: Vec::new(),
            title: String::new(),
            x_label: "X [m]".to_string(),
            y_label: "Y [m]".to_string(),
            x_range: None,
            y_range: None,
            aspect_ratio: 1.0,
        }
    }

    /// Set the plot title
    pub fn set_title(&mut self, title: &str) -> &mut Self {
        self.title = title.to_string();
        self
    }

    /// Fix both axis ranges to `bounds`
    pub fn set_bounds(&mut self, bounds: &AreaBounds) -> &mut Self {
        self.x_range = Some((bounds.xmin, bounds.xmax));
        self.y_range = Some((bounds.ymin, bounds.ymax));
        self
    }

    /// Plot a path
    pub fn plot_path(&mut self, path: &Path2D, style: &PathStyle) -> &mut Self {
        self.layers.push(Layer::Lines {
            x: path.x_coords(),
            y: path.y_coords(),
            style: style.clone(),
        });
        self
    }

    /// Plot multiple points
    pub fn plot_points(&mut self, points: &[Point2D], style: &PointStyle) -> &mut Self {
        self.layers.push(Layer::Points {
            x: points.iter().map(|p| p.x).collect(),
            y: points.iter().map(|p| p.y).collect(),
            style: style.clone(),
        });
        self
    }

    /// Outline every obstacle
    pub fn plot_obstacles(&mut self, obstacles: &[Obstacle]) -> &mut Self {
        for (i, obstacle) in obstacles.iter().enumerate() {
            let caption = if i == 0 { "Obstacles" } else { "" };
            let outline = Path2D::from_points(obstacle_outline(obstacle));
            let style = PathStyle::new(colors::OBSTACLE, caption).with_line_width(1.0);
            self.plot_path(&outline, &style);
        }
        self
    }

    /// Plot every tree edge as its local sub-path
    pub fn plot_tree(&mut self, tree: &RRTTree) -> &mut Self {
        // A NaN point breaks the polyline between edges
        let mut x = Vec::new();
        let mut y = Vec::new();
        for node in tree.nodes().iter().filter(|n| n.parent.is_some()) {
            x.extend(node.path_x.iter().copied().chain(std::iter::once(f64::NAN)));
            y.extend(node.path_y.iter().copied().chain(std::iter::once(f64::NAN)));
        }
        self.layers.push(Layer::Lines {
            x,
            y,
            style: PathStyle::new(colors::TREE, "Tree").with_line_width(0.5),
        });
        self
    }

    /// Plot the planned segments and their waypoints
    pub fn plot_segments(&mut self, segments: &[Segment]) -> &mut Self {
        for (i, segment) in segments.iter().enumerate() {
            let caption = if i == 0 { "Path" } else { "" };
            self.plot_path(&segment.path, &PathStyle::new(colors::PATH, caption));
        }
        let waypoints: Vec<Point2D> = segments.iter().map(|s| s.goal).collect();
        let style = PointStyle::new(colors::WAYPOINT, "Waypoints").with_symbol('S');
        self.plot_points(&waypoints, &style)
    }

    /// Plot start position
    pub fn plot_start(&mut self, point: Point2D) -> &mut Self {
        self.plot_points(&[point], &PointStyle::new(colors::START, "Start").with_size(1.5))
    }

    /// Plot the final goal
    pub fn plot_goal(&mut self, point: Point2D) -> &mut Self {
        self.plot_points(&[point], &PointStyle::new(colors::GOAL, "Goal").with_size(1.5))
    }

    /// Show the plot in a gnuplot window
    pub fn show(&self) -> Result<(), String> {
        self.render().show().map_err(|e| e.to_string()).map(|_| ())
    }

    /// Save plot to PNG file
    pub fn save_png(&self, path: &str, width: u32, height: u32) -> Result<(), String> {
        self.render().save_to_png(path, width, height).map_err(|e| e.to_string())
    }

    fn render(&self) -> Figure {
        let mut figure = Figure::new();
        let axes = figure.axes2d();

        for layer in &self.layers {
            match layer {
                Layer::Lines { x, y, style } => {
                    axes.lines(x, y, &[
                        Caption(&style.caption),
                        Color(&style.color),
                        LineWidth(style.line_width),
                    ]);
                }
                Layer::Points { x, y, style } => {
                    axes.points(x, y, &[
                        Caption(&style.caption),
                        Color(&style.color),
                        PointSymbol(style.symbol),
                        PointSize(style.size),
                    ]);
                }
            }
        }

        if !self.title.is_empty() {
            axes.set_title(&self.title, &[]);
        }
        axes.set_x_label(&self.x_label, &[]);
        axes.set_y_label(&self.y_label, &[]);

        if let Some((min, max)) = self.x_range {
            axes.set_x_range(AutoOption::Fix(min), AutoOption::Fix(max));
        }
        if let Some((min, max)) = self.y_range {
            axes.set_y_range(AutoOption::Fix(min), AutoOption::Fix(max));
        }
        axes.set_aspect_ratio(AutoOption::Fix(self.aspect_ratio));

        figure
    }
}

impl Default for Visualizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Closed outline of an obstacle
fn obstacle_outline(obstacle: &Obstacle) -> Vec<Point2D> {
    match obstacle {
        Obstacle::Circle(c) => (0..=CIRCLE_VERTICES)
            .map(|i| {
                let a = 2.0 * PI * i as f64 / CIRCLE_VERTICES as f64;
                Point2D::new(c.x + c.radius * a.cos(), c.y + c.radius * a.sin())
            })
            .collect(),
        Obstacle::Rectangle(r) => {
            let corners = r.corners();
            corners.iter().chain(corners.first()).copied().collect()
        }
    }
}
