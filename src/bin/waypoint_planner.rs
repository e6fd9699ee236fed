//! Waypoint planner
//!
//! Loads a landmark map, plans RRT segments from the robot start at the
//! arena centre through every waypoint, and writes the waypoint file.
//!
//! Usage:
//!   cargo run --bin waypoint_planner -- --map M4_true_map.txt -w 0.5,0.5 -w -0.8,0.2
//!   cargo run --bin waypoint_planner -- --map M4_true_map.txt \
//!       --waypoints-in waypoints.txt --plot route.png

use clap::Parser;
use log::{error, info, warn};

use waypoint_rrt::arena::{read_waypoints, write_waypoints, ArenaKind, LandmarkMap};
use waypoint_rrt::path_planning::{RRTPlanner, SegmentStatus, WaypointSession};
use waypoint_rrt::utils::Visualizer;
use waypoint_rrt::{NavigationConfig, NavigationResult, Point2D};

/// Plan RRT paths through waypoints in the arena
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Landmark map (JSON)
    #[arg(short, long, default_value = "M4_true_map.txt")]
    map: String,

    /// Arena: 0 simulation (3 m), 1 physical (2 m)
    #[arg(short, long)]
    arena: Option<u8>,

    /// Configuration file (JSON)
    #[arg(short, long)]
    config: Option<String>,

    /// Waypoint in world metres as `x,y`, repeatable
    #[arg(short = 'w', long = "waypoint", value_parser = parse_point, allow_hyphen_values = true)]
    waypoints: Vec<Point2D>,

    /// Read waypoints from a file before the `--waypoint` ones
    #[arg(long)]
    waypoints_in: Option<String>,

    /// Where to write the final waypoint list
    #[arg(long, default_value = "waypoints.txt")]
    waypoints_out: String,

    /// Seed for reproducible plans
    #[arg(short, long)]
    seed: Option<u64>,

    /// Save a plot of the route to this PNG file
    #[arg(long)]
    plot: Option<String>,

    /// Also open the plot in a gnuplot window
    #[arg(long)]
    show: bool,
}

fn parse_point(s: &str) -> Result<Point2D, String> {
    let (x, y) = s.split_once(',').ok_or_else(|| format!("expected x,y, got '{}'", s))?;
    let x = x.trim().parse::<f64>().map_err(|e| format!("bad x in '{}': {}", s, e))?;
    let y = y.trim().parse::<f64>().map_err(|e| format!("bad y in '{}': {}", s, e))?;
    Ok(Point2D::new(x, y))
}

fn run(args: Args) -> NavigationResult<()> {
    let mut config = match &args.config {
        Some(path) => NavigationConfig::load(path)?,
        None => NavigationConfig::default(),
    };
    if let Some(index) = args.arena {
        config.arena.kind = ArenaKind::from_index(index)?;
    }
    let frame = config.arena.frame()?;

    let map = LandmarkMap::load(&args.map)?;
    info!(
        "Loaded {}: {} markers, {} fruit",
        args.map,
        map.markers().count(),
        map.fruits().count()
    );

    let obstacles = map.obstacles(&config.landmarks);
    let planner = RRTPlanner::new(obstacles, frame.world_bounds(), config.rrt.clone())?;
    let mut session = WaypointSession::new(Point2D::origin(), planner);
    if let Some(seed) = args.seed.or(config.seed) {
        session = session.with_seed(seed);
    }

    let mut waypoints = match &args.waypoints_in {
        Some(path) => read_waypoints(path)?,
        None => Vec::new(),
    };
    waypoints.extend(args.waypoints.iter().copied());

    for waypoint in waypoints {
        let canvas = frame.to_canvas(waypoint);
        let segment = session.add_waypoint(waypoint);
        match &segment.status {
            SegmentStatus::Planned => info!(
                "Waypoint ({:.3}, {:.3}) [canvas ({:.0}, {:.0})]: {} points, {:.3} m",
                waypoint.x,
                waypoint.y,
                canvas.x,
                canvas.y,
                segment.path.len(),
                segment.path.total_length()
            ),
            SegmentStatus::Failed(err) => {
                warn!("Waypoint ({:.3}, {:.3}): {}", waypoint.x, waypoint.y, err)
            }
        }
    }

    let failed = session.failed_segments();
    match session.full_path() {
        Some(route) => info!(
            "Route planned: {:.3} m over {} segments",
            route.total_length(),
            session.segments().len()
        ),
        None => warn!("Segments {:?} have no path", failed),
    }

    write_waypoints(&args.waypoints_out, session.waypoints())?;
    info!("Wrote {} waypoints to {}", session.waypoints().len(), args.waypoints_out);

    if args.plot.is_some() || args.show {
        let mut vis = Visualizer::new();
        vis.set_title("RRT waypoint route");
        vis.set_bounds(&frame.world_bounds());
        vis.plot_obstacles(session.planner().obstacles());
        vis.plot_segments(session.segments());
        vis.plot_start(session.robot_start());
        if let Some(goal) = session.waypoints().last() {
            vis.plot_goal(*goal);
        }
        if let Some(path) = &args.plot {
            if let Err(e) = vis.save_png(path, 800, 800) {
                warn!("Could not save plot to {}: {}", path, e);
            }
        }
        if args.show {
            if let Err(e) = vis.show() {
                warn!("Could not show plot: {}", e);
            }
        }
    }

    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run(Args::parse()) {
        error!("{}", e);
        std::process::exit(1);
    }
}
