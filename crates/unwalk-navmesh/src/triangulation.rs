//! Ear clipping for concave area polygons
//!
//! Input polygons must be simple and wound so that their signed XZ area is
//! negative (every convex corner turns [`left`]). The ear with the shortest
//! closing diagonal is clipped first; ties go to the lowest vertex position,
//! so the output only depends on the input order.

use glam::Vec3;
use unwalk_common::{dist_sqr_2d, left, left_on, tri_area_2d, Error, Result};

#[inline]
fn prev(i: usize, n: usize) -> usize {
    if i >= 1 {
        i - 1
    } else {
        n - 1
    }
}

#[inline]
fn next(i: usize, n: usize) -> usize {
    if i + 1 < n {
        i + 1
    } else {
        0
    }
}

#[inline]
fn collinear(a: Vec3, b: Vec3, c: Vec3) -> bool {
    tri_area_2d(a, b, c) == 0.0
}

#[inline]
fn vequal_2d(a: Vec3, b: Vec3) -> bool {
    a.x == b.x && a.z == b.z
}

/// True when `c` lies on segment `ab`, assuming collinearity
fn between(a: Vec3, b: Vec3, c: Vec3) -> bool {
    if !collinear(a, b, c) {
        return false;
    }
    if a.x != b.x {
        (a.x <= c.x && c.x <= b.x) || (a.x >= c.x && c.x >= b.x)
    } else {
        (a.z <= c.z && c.z <= b.z) || (a.z >= c.z && c.z >= b.z)
    }
}

/// Segments cross at a point interior to both
fn intersect_prop(a: Vec3, b: Vec3, c: Vec3, d: Vec3) -> bool {
    if collinear(a, b, c) || collinear(a, b, d) || collinear(c, d, a) || collinear(c, d, b) {
        return false;
    }
    (left(a, b, c) ^ left(a, b, d)) && (left(c, d, a) ^ left(c, d, b))
}

/// Segments cross or touch
fn intersect(a: Vec3, b: Vec3, c: Vec3, d: Vec3) -> bool {
    intersect_prop(a, b, c, d)
        || between(a, b, c)
        || between(a, b, d)
        || between(c, d, a)
        || between(c, d, b)
}

struct EarClipper<'a> {
    verts: &'a [Vec3],
    indices: Vec<usize>,
}

impl EarClipper<'_> {
    fn vert(&self, i: usize) -> Vec3 {
        self.verts[self.indices[i]]
    }

    fn in_cone(&self, i: usize, j: usize, loose: bool) -> bool {
        let n = self.indices.len();
        let pi = self.vert(i);
        let pj = self.vert(j);
        let pi1 = self.vert(next(i, n));
        let pin1 = self.vert(prev(i, n));

        if left_on(pin1, pi, pi1) {
            // Convex corner
            if loose {
                left_on(pi, pj, pin1) && left_on(pj, pi, pi1)
            } else {
                left(pi, pj, pin1) && left(pj, pi, pi1)
            }
        } else {
            // Reflex corner
            !(left_on(pi, pj, pi1) && left_on(pj, pi, pin1))
        }
    }

    /// Whether `(i, j)` crosses no edge of the remaining polygon
    fn diagonalie(&self, i: usize, j: usize, loose: bool) -> bool {
        let n = self.indices.len();
        let d0 = self.vert(i);
        let d1 = self.vert(j);

        for k in 0..n {
            let k1 = next(k, n);
            if k == i || k1 == i || k == j || k1 == j {
                continue;
            }
            let p0 = self.vert(k);
            let p1 = self.vert(k1);
            if vequal_2d(d0, p0) || vequal_2d(d1, p0) || vequal_2d(d0, p1) || vequal_2d(d1, p1) {
                continue;
            }
            let crosses = if loose {
                intersect_prop(d0, d1, p0, p1)
            } else {
                intersect(d0, d1, p0, p1)
            };
            if crosses {
                return false;
            }
        }
        true
    }

    fn diagonal(&self, i: usize, j: usize, loose: bool) -> bool {
        self.in_cone(i, j, loose) && self.diagonalie(i, j, loose)
    }

    /// Position of the ear with the shortest diagonal
    fn best_ear(&self, loose: bool) -> Option<usize> {
        let n = self.indices.len();
        let mut best: Option<(f32, usize)> = None;
        for i in 0..n {
            let i2 = next(next(i, n), n);
            if !self.diagonal(i, i2, loose) {
                continue;
            }
            let len = dist_sqr_2d(self.vert(i), self.vert(i2));
            if best.map_or(true, |(min_len, _)| len < min_len) {
                best = Some((len, i));
            }
        }
        best.map(|(_, i)| i)
    }
}

/// Splits a simple polygon into triangles.
///
/// Returns vertex index triples into `verts`, each wound like the input.
pub fn triangulate(verts: &[Vec3]) -> Result<Vec<[usize; 3]>> {
    let n = verts.len();
    if n < 3 {
        return Err(Error::DegenerateGeometry(format!(
            "cannot triangulate a polygon with {n} vertices"
        )));
    }

    let mut clipper = EarClipper {
        verts,
        indices: (0..n).collect(),
    };
    let mut tris = Vec::with_capacity(n - 2);

    while clipper.indices.len() > 3 {
        let Some(i) = clipper
            .best_ear(false)
            .or_else(|| clipper.best_ear(true))
        else {
            return Err(Error::DegenerateGeometry(format!(
                "no ear left after {} triangles",
                tris.len()
            )));
        };

        let count = clipper.indices.len();
        let i1 = next(i, count);
        let i2 = next(i1, count);
        tris.push([clipper.indices[i], clipper.indices[i1], clipper.indices[i2]]);
        clipper.indices.remove(i1);
    }

    tris.push([clipper.indices[0], clipper.indices[1], clipper.indices[2]]);
    Ok(tris)
}
