//! Point hit-testing against decoded feature geometry.

use crate::core::geo::Point;

fn dist_to_segment_squared(p: &Point, v: &Point, w: &Point) -> f64 {
    let l2 = v.distance_squared_to(w);
    if l2 == 0.0 {
        return p.distance_squared_to(v);
    }
    let t = (((p.x - v.x) * (w.x - v.x) + (p.y - v.y) * (w.y - v.y)) / l2).clamp(0.0, 1.0);
    p.distance_squared_to(&Point::new(v.x + t * (w.x - v.x), v.y + t * (w.y - v.y)))
}

/// Even-odd ray cast
pub fn is_in_ring(point: &Point, ring: &[Point]) -> bool {
    let mut inside = false;
    let mut j = ring.len().wrapping_sub(1);
    for i in 0..ring.len() {
        let (xi, yi) = (ring[i].x, ring[i].y);
        let (xj, yj) = (ring[j].x, ring[j].y);
        let intersect =
            (yi > point.y) != (yj > point.y) && point.x < (xj - xi) * (point.y - yi) / (yj - yi) + xi;
        if intersect {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Ring orientation in y-down tile space. Counter-clockwise rings are holes.
pub fn is_ccw(ring: &[Point]) -> bool {
    let mut area = 0.0;
    for i in 0..ring.len() {
        let j = (i + 1) % ring.len();
        area += ring[i].x * ring[j].y;
        area -= ring[j].x * ring[i].y;
    }
    area < 0.0
}

/// Rings are scanned in order: each clockwise ring opens a new polygon, the
/// counter-clockwise rings after it are its holes.
pub fn point_in_polygon(point: &Point, geom: &[Vec<Point>]) -> bool {
    let mut in_current_exterior = false;
    for ring in geom {
        if is_ccw(ring) {
            if is_in_ring(point, ring) {
                in_current_exterior = false;
            }
        } else {
            if in_current_exterior {
                return true;
            }
            if is_in_ring(point, ring) {
                in_current_exterior = true;
            }
        }
    }
    in_current_exterior
}

/// Distance to the nearest part's first point
pub fn point_min_dist_to_points(point: &Point, geom: &[Vec<Point>]) -> f64 {
    geom.iter()
        .filter_map(|part| part.first())
        .map(|p| point.distance_to(p))
        .fold(f64::INFINITY, f64::min)
}

pub fn point_min_dist_to_lines(point: &Point, geom: &[Vec<Point>]) -> f64 {
    let mut min = f64::INFINITY;
    for line in geom {
        for segment in line.windows(2) {
            let dist = dist_to_segment_squared(point, &segment[0], &segment[1]).sqrt();
            if dist < min {
                min = dist;
            }
        }
    }
    min
}
