//! Segment crossing and polygon containment tests.

use nalgebra::{Point2, Vector2};

/// A 2D pixel coordinate.
pub type Point = Point2<f32>;

/// Strict counter-clockwise test for the triangle `a, b, c`.
///
/// A zero-area (collinear) triangle is not counter-clockwise.
#[inline]
fn ccw(a: &Point, b: &Point, c: &Point) -> bool {
    let ab: Vector2<f32> = b - a;
    let ac: Vector2<f32> = c - a;
    ab.perp(&ac) > 0.0
}

/// Returns true when segment `p1`-`p2` crosses segment `p3`-`p4`.
///
/// Uses the four orientation comparisons of the classic CCW test. Collinear
/// configurations evaluate as "not counter-clockwise", so overlapping
/// collinear segments never cross, and a segment that only ends on the other
/// one is not a crossing.
pub fn segments_intersect(p1: &Point, p2: &Point, p3: &Point, p4: &Point) -> bool {
    ccw(p1, p3, p4) != ccw(p2, p3, p4) && ccw(p1, p2, p3) != ccw(p1, p2, p4)
}

/// Whether `p` lies on the closed segment `a`-`b`.
fn on_segment(p: &Point, a: &Point, b: &Point) -> bool {
    let ab: Vector2<f32> = b - a;
    let ap: Vector2<f32> = p - a;
    if ab.perp(&ap) != 0.0 {
        return false;
    }
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

/// Returns true when `point` is inside `polygon` or on its boundary.
///
/// The polygon is closed implicitly (last vertex connects back to the first).
/// Fewer than three vertices enclose nothing and always give false.
pub fn point_in_polygon(point: &Point, polygon: &[Point]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (&polygon[j], &polygon[i]);
        if on_segment(point, a, b) {
            return true;
        }
        // Even-odd rule against a horizontal ray towards +x.
        if (b.y > point.y) != (a.y > point.y) {
            let x_cross = b.x + (point.y - b.y) * (a.x - b.x) / (a.y - b.y);
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}
