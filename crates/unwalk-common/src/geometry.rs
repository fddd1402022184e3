//! Polygon geometry for area graphs
//!
//! Most operations work on the XZ plane (Y-up coordinate system). Polygons are
//! slices of vertices in boundary order and are implicitly closed.

use glam::Vec3;

/// Calculate twice the signed area of a triangle on the XZ plane.
///
/// The sign indicates the winding order:
/// - Positive: clockwise (when looking down Y axis)
/// - Negative: counter-clockwise (when looking down Y axis)
/// - Zero: degenerate (collinear points)
#[inline]
pub fn tri_area_2d(a: Vec3, b: Vec3, c: Vec3) -> f32 {
    let abx = b.x - a.x;
    let abz = b.z - a.z;
    let acx = c.x - a.x;
    let acz = c.z - a.z;
    acx * abz - abx * acz
}

/// Check if point c is left of the line from a to b (on XZ plane).
#[inline]
pub fn left(a: Vec3, b: Vec3, c: Vec3) -> bool {
    tri_area_2d(a, b, c) < 0.0
}

/// Check if point c is left of or on the line from a to b (on XZ plane).
#[inline]
pub fn left_on(a: Vec3, b: Vec3, c: Vec3) -> bool {
    tri_area_2d(a, b, c) <= 0.0
}

/// Check if point c is right of the line from a to b (on XZ plane).
#[inline]
pub fn right(a: Vec3, b: Vec3, c: Vec3) -> bool {
    tri_area_2d(a, b, c) > 0.0
}

/// Check if point b is between points a and c on a line (on XZ plane).
///
/// Assumes the points are collinear.
#[inline]
fn between(a: Vec3, b: Vec3, c: Vec3) -> bool {
    if a.x != c.x {
        (a.x <= b.x && b.x <= c.x) || (c.x <= b.x && b.x <= a.x)
    } else {
        (a.z <= b.z && b.z <= c.z) || (c.z <= b.z && b.z <= a.z)
    }
}

/// Calculate squared distance between two points on the XZ plane.
#[inline]
pub fn dist_sqr_2d(a: Vec3, b: Vec3) -> f32 {
    let dx = b.x - a.x;
    let dz = b.z - a.z;
    dx * dx + dz * dz
}

/// Calculate distance between two points on the XZ plane.
#[inline]
pub fn dist_2d(a: Vec3, b: Vec3) -> f32 {
    dist_sqr_2d(a, b).sqrt()
}

/// Calculate the squared distance from a point to a line segment on the XZ plane.
pub fn dist_point_segment_sqr_2d(p: Vec3, a: Vec3, b: Vec3) -> f32 {
    let dx = b.x - a.x;
    let dz = b.z - a.z;
    let px = p.x - a.x;
    let pz = p.z - a.z;

    let d = dx * dx + dz * dz;
    if d < f32::EPSILON {
        return px * px + pz * pz;
    }

    let t = ((px * dx + pz * dz) / d).clamp(0.0, 1.0);
    let qx = a.x + t * dx - p.x;
    let qz = a.z + t * dz - p.z;
    qx * qx + qz * qz
}

/// Find the closest point on a 3D line segment to a given point.
pub fn closest_point_on_segment(p: Vec3, a: Vec3, b: Vec3) -> Vec3 {
    let ab = b - a;
    let d = ab.length_squared();
    if d < f32::EPSILON {
        return a;
    }
    let t = ((p - a).dot(ab) / d).clamp(0.0, 1.0);
    a + ab * t
}

/// Check if two line segments intersect on the XZ plane.
///
/// Returns true if the segments intersect, including touching at endpoints.
pub fn intersect_segments_2d(a1: Vec3, a2: Vec3, b1: Vec3, b2: Vec3) -> bool {
    let d1 = tri_area_2d(b1, b2, a1);
    let d2 = tri_area_2d(b1, b2, a2);
    let d3 = tri_area_2d(a1, a2, b1);
    let d4 = tri_area_2d(a1, a2, b2);

    if d1 * d2 < 0.0 && d3 * d4 < 0.0 {
        return true;
    }

    // Touching endpoints
    if d1.abs() < f32::EPSILON && between(b1, a1, b2) {
        return true;
    }
    if d2.abs() < f32::EPSILON && between(b1, a2, b2) {
        return true;
    }
    if d3.abs() < f32::EPSILON && between(a1, b1, a2) {
        return true;
    }
    if d4.abs() < f32::EPSILON && between(a1, b2, a2) {
        return true;
    }

    false
}

/// Iterates the closed boundary segments of a polygon.
pub fn polygon_edges(verts: &[Vec3]) -> impl Iterator<Item = (Vec3, Vec3)> + '_ {
    let n = verts.len();
    (0..n).map(move |i| (verts[i], verts[(i + 1) % n]))
}

/// Check if a point is inside a polygon (on XZ plane).
///
/// Uses the winding number algorithm.
pub fn point_in_polygon_2d(p: Vec3, verts: &[Vec3]) -> bool {
    if verts.len() < 3 {
        return false;
    }

    let mut winding = 0;
    for (v1, v2) in polygon_edges(verts) {
        if v1.z <= p.z {
            if v2.z > p.z && left(v1, v2, p) {
                winding += 1;
            }
        } else if v2.z <= p.z && right(v1, v2, p) {
            winding -= 1;
        }
    }

    winding != 0
}

/// Check if a point lies inside or on the border of a triangle (on XZ plane).
pub fn point_in_triangle_2d(p: Vec3, a: Vec3, b: Vec3, c: Vec3) -> bool {
    let d1 = tri_area_2d(a, b, p);
    let d2 = tri_area_2d(b, c, p);
    let d3 = tri_area_2d(c, a, p);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}

/// Distance from a point to a polygon on the XZ plane, zero when inside.
pub fn dist_point_polygon_2d(p: Vec3, verts: &[Vec3]) -> f32 {
    if verts.is_empty() {
        return f32::MAX;
    }
    if point_in_polygon_2d(p, verts) {
        return 0.0;
    }
    polygon_edges(verts)
        .map(|(a, b)| dist_point_segment_sqr_2d(p, a, b))
        .fold(f32::MAX, f32::min)
        .sqrt()
}

/// Signed area of a polygon on the XZ plane.
///
/// Uses the same sign convention as [`tri_area_2d`]: negative for
/// counter-clockwise boundaries.
pub fn polygon_area_2d(verts: &[Vec3]) -> f32 {
    if verts.len() < 3 {
        return 0.0;
    }
    let origin = verts[0];
    let twice: f32 = verts
        .windows(2)
        .skip(1)
        .map(|w| tri_area_2d(origin, w[0], w[1]))
        .sum();
    twice * 0.5
}

/// Mean of the polygon vertices.
pub fn polygon_centroid(verts: &[Vec3]) -> Vec3 {
    if verts.is_empty() {
        return Vec3::ZERO;
    }
    verts.iter().copied().sum::<Vec3>() / verts.len() as f32
}

/// Axis-aligned bounds of a set of points.
pub fn polygon_bounds(verts: &[Vec3]) -> Option<(Vec3, Vec3)> {
    let first = *verts.first()?;
    Some(
        verts
            .iter()
            .fold((first, first), |(bmin, bmax), v| (bmin.min(*v), bmax.max(*v))),
    )
}

/// Check that every turn of the boundary has the same orientation (on XZ plane).
///
/// Collinear vertices are ignored.
pub fn is_convex_2d(verts: &[Vec3]) -> bool {
    let n = verts.len();
    if n < 3 {
        return false;
    }

    let mut sign = 0.0f32;
    for i in 0..n {
        let area = tri_area_2d(verts[i], verts[(i + 1) % n], verts[(i + 2) % n]);
        if area.abs() <= f32::EPSILON {
            continue;
        }
        if sign == 0.0 {
            sign = area.signum();
        } else if area.signum() != sign {
            return false;
        }
    }

    sign != 0.0
}

/// Check that no two non-adjacent boundary edges intersect (on XZ plane).
pub fn is_simple_polygon_2d(verts: &[Vec3]) -> bool {
    let n = verts.len();
    if n < 4 {
        return true;
    }

    for i in 0..n {
        let (a1, a2) = (verts[i], verts[(i + 1) % n]);
        for j in (i + 2)..n {
            // The last edge shares a vertex with the first one
            if i == 0 && j == n - 1 {
                continue;
            }
            let (b1, b2) = (verts[j], verts[(j + 1) % n]);
            if intersect_segments_2d(a1, a2, b1, b2) {
                return false;
            }
        }
    }

    true
}

/// Returns the overlapping part of two segments lying on the same line.
///
/// Both endpoints of `b` must lie within `tolerance` of the line through `a`,
/// and the overlap must be longer than `tolerance`. The returned segment lies
/// on `a`, ordered from `a0` towards `a1`.
pub fn shared_segment(a0: Vec3, a1: Vec3, b0: Vec3, b1: Vec3, tolerance: f32) -> Option<(Vec3, Vec3)> {
    let dir = a1 - a0;
    let len = dir.length();
    if len <= tolerance {
        return None;
    }
    let u = dir / len;

    let project = |p: Vec3| {
        let rel = p - a0;
        let t = rel.dot(u);
        (t, (rel - u * t).length())
    };
    let (t0, d0) = project(b0);
    let (t1, d1) = project(b1);
    if d0 > tolerance || d1 > tolerance {
        return None;
    }

    let lo = t0.min(t1).max(0.0);
    let hi = t0.max(t1).min(len);
    if hi - lo <= tolerance {
        return None;
    }

    Some((a0 + u * lo, a0 + u * hi))
}

/// Finds the longest boundary segment shared by two polygons.
pub fn shared_boundary(a: &[Vec3], b: &[Vec3], tolerance: f32) -> Option<(Vec3, Vec3)> {
    let mut best: Option<(Vec3, Vec3)> = None;
    let mut best_len = 0.0;

    for (a0, a1) in polygon_edges(a) {
        for (b0, b1) in polygon_edges(b) {
            if let Some((s0, s1)) = shared_segment(a0, a1, b0, b1, tolerance) {
                let len = s0.distance(s1);
                if len > best_len {
                    best_len = len;
                    best = Some((s0, s1));
                }
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f32, z: f32) -> Vec3 {
        Vec3::new(x, 0.0, z)
    }

    fn square(x: f32, z: f32, size: f32) -> Vec<Vec3> {
        vec![v(x, z), v(x + size, z), v(x + size, z + size), v(x, z + size)]
    }

    #[test]
    fn test_tri_area_2d() {
        // Counter-clockwise triangle (negative in Y-up system)
        let a = v(0.0, 0.0);
        let b = v(1.0, 0.0);
        let c = v(0.0, 1.0);
        assert!(tri_area_2d(a, b, c) < 0.0);
        assert!(tri_area_2d(a, c, b) > 0.0);
        assert_eq!(tri_area_2d(a, b, v(2.0, 0.0)), 0.0);
    }

    #[test]
    fn test_point_in_polygon() {
        let poly = square(0.0, 0.0, 2.0);
        assert!(point_in_polygon_2d(v(1.0, 1.0), &poly));
        assert!(!point_in_polygon_2d(v(3.0, 1.0), &poly));

        let mut reversed = poly.clone();
        reversed.reverse();
        assert!(point_in_polygon_2d(v(1.0, 1.0), &reversed));

        assert!(!point_in_polygon_2d(v(0.0, 0.0), &poly[..2]));
    }

    #[test]
    fn test_polygon_area_and_centroid() {
        let poly = square(0.0, 0.0, 2.0);
        assert_eq!(polygon_area_2d(&poly), -4.0);
        assert_eq!(polygon_centroid(&poly), v(1.0, 1.0));

        let (bmin, bmax) = polygon_bounds(&poly).unwrap();
        assert_eq!(bmin, v(0.0, 0.0));
        assert_eq!(bmax, v(2.0, 2.0));
        assert!(polygon_bounds(&[]).is_none());
    }

    #[test]
    fn test_convexity() {
        assert!(is_convex_2d(&square(0.0, 0.0, 1.0)));

        // L shape
        let l_shape = vec![
            v(0.0, 0.0),
            v(2.0, 0.0),
            v(2.0, 1.0),
            v(1.0, 1.0),
            v(1.0, 2.0),
            v(0.0, 2.0),
        ];
        assert!(!is_convex_2d(&l_shape));
        assert!(is_simple_polygon_2d(&l_shape));
    }

    #[test]
    fn test_self_intersection() {
        let bow_tie = vec![v(0.0, 0.0), v(1.0, 1.0), v(1.0, 0.0), v(0.0, 1.0)];
        assert!(!is_simple_polygon_2d(&bow_tie));
        assert!(is_simple_polygon_2d(&square(0.0, 0.0, 1.0)));
    }

    #[test]
    fn test_shared_boundary() {
        let a = square(0.0, 0.0, 2.0);
        let b = square(2.0, 0.0, 2.0);
        let (s0, s1) = shared_boundary(&a, &b, 0.01).unwrap();
        assert!(s0.distance(v(2.0, 0.0)) < 1e-5);
        assert!(s1.distance(v(2.0, 2.0)) < 1e-5);

        // Touching at a single corner only
        let c = square(2.0, 2.0, 2.0);
        assert!(shared_boundary(&a, &c, 0.01).is_none());

        // Same footprint but on another floor
        let upper: Vec<Vec3> = b.iter().map(|p| *p + Vec3::Y * 3.0).collect();
        assert!(shared_boundary(&a, &upper, 0.01).is_none());
    }

    #[test]
    fn test_partial_overlap() {
        let s = shared_segment(v(0.0, 0.0), v(4.0, 0.0), v(3.0, 0.0), v(6.0, 0.0), 0.01).unwrap();
        assert!(s.0.distance(v(3.0, 0.0)) < 1e-5);
        assert!(s.1.distance(v(4.0, 0.0)) < 1e-5);
    }

    #[test]
    fn test_distance_to_polygon() {
        let poly = square(0.0, 0.0, 2.0);
        assert_eq!(dist_point_polygon_2d(v(1.0, 1.0), &poly), 0.0);
        assert!((dist_point_polygon_2d(v(5.0, 1.0), &poly) - 3.0).abs() < 1e-5);
        assert_eq!(
            closest_point_on_segment(Vec3::new(1.0, 5.0, 0.0), v(0.0, 0.0), v(2.0, 0.0)),
            v(1.0, 0.0)
        );
    }
}
