//! Plain-text waypoint files, one `x y` pair per line in world metres

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::common::{NavigationError, NavigationResult, Point2D};

pub fn write_waypoints<P: AsRef<Path>>(path: P, waypoints: &[Point2D]) -> NavigationResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for w in waypoints {
        writeln!(writer, "{} {}", w.x, w.y)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn read_waypoints<P: AsRef<Path>>(path: P) -> NavigationResult<Vec<Point2D>> {
    parse_waypoints(BufReader::new(File::open(path)?))
}

fn parse_waypoints<R: BufRead>(reader: R) -> NavigationResult<Vec<Point2D>> {
    let mut waypoints = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        let parse_error = |message: String| NavigationError::Parse { line: i + 1, message };

        if fields.len() != 2 {
            return Err(parse_error(format!("expected 2 values, found {}", fields.len())));
        }
        let x: f64 = fields[0].parse().map_err(|e| parse_error(format!("x: {}", e)))?;
        let y: f64 = fields[1].parse().map_err(|e| parse_error(format!("y: {}", e)))?;
        waypoints.push(Point2D::new(x, y));
    }

    Ok(waypoints)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_write_then_read() {
        let path = std::env::temp_dir().join(format!("waypoint_rrt_{}.txt", std::process::id()));
        let waypoints = vec![Point2D::new(0.5, -1.25), Point2D::new(-0.1, 0.3)];

        write_waypoints(&path, &waypoints).unwrap();
        let loaded = read_waypoints(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, waypoints);
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let parsed = parse_waypoints(Cursor::new("1 2\n\n  \n3.5 -4\n")).unwrap();
        assert_eq!(parsed, vec![Point2D::new(1.0, 2.0), Point2D::new(3.5, -4.0)]);
    }

    #[test]
    fn test_malformed_line_reports_line_number() {
        match parse_waypoints(Cursor::new("1 2\n3 four\n")) {
            Err(NavigationError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {:?}", other),
        }
        assert!(parse_waypoints(Cursor::new("1 2 3\n")).is_err());
    }
}
