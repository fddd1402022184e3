//! Area polygons
//!
//! An area is an ordered list of points forming a closed boundary. Every
//! structural edit bumps the area revision, which is what cached adjacency
//! is keyed on.

use glam::Vec3;
use unwalk_common::{
    is_convex_2d, is_simple_polygon_2d, point_in_polygon_2d, polygon_area_2d, polygon_bounds,
    polygon_centroid,
};

use crate::Point;

/// Minimum number of points for an area to take part in adjacency, search and bake
pub const MIN_SEARCHABLE_POINTS: usize = 3;

/// Session-stable identity of an area, unaffected by index compaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AreaId(u64);

impl AreaId {
    /// Wraps a raw identity
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw identity value
    pub fn id(self) -> u64 {
        self.0
    }
}

/// An authored polygon representing one navigable region
#[derive(Debug, Clone)]
pub struct Area {
    id: AreaId,
    points: Vec<Point>,
    revision: u64,
}

impl Area {
    /// Creates an empty area
    pub fn new(id: AreaId) -> Self {
        Self {
            id,
            points: Vec::new(),
            revision: 0,
        }
    }

    /// Creates an area from boundary points in order
    pub fn from_points(id: AreaId, points: impl IntoIterator<Item = Point>) -> Self {
        let mut area = Self::new(id);
        for point in points {
            area.insert_point(point, usize::MAX);
        }
        area
    }

    /// Identity that survives index compaction
    pub fn id(&self) -> AreaId {
        self.id
    }

    /// Counter bumped by every structural edit
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Number of boundary points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the area has no points
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Boundary points in order
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Point at `index`, if in range
    pub fn point(&self, index: usize) -> Option<&Point> {
        self.points.get(index)
    }

    /// Point positions in boundary order
    pub fn positions(&self) -> Vec<Vec3> {
        self.points.iter().map(Point::position).collect()
    }

    /// Whether the area forms a polygon
    pub fn is_searchable(&self) -> bool {
        self.points.len() >= MIN_SEARCHABLE_POINTS
    }

    /// Inserts a new point at `at`, clamped to `[0, len]`.
    ///
    /// Returns the index the point ended up at.
    pub fn insert(&mut self, position: Vec3, at: usize) -> usize {
        self.insert_point(Point::new(position), at)
    }

    /// Inserts an existing point at `at`, clamped to `[0, len]`.
    pub fn insert_point(&mut self, mut point: Point, at: usize) -> usize {
        let at = at.min(self.points.len());
        point.attach(self.id);
        self.points.insert(at, point);
        self.touch();
        at
    }

    /// Appends a point to the end of the boundary
    pub fn push(&mut self, position: Vec3) -> usize {
        self.insert(position, self.points.len())
    }

    /// Removes the point at `index`; out of range is a no-op.
    pub fn remove_at(&mut self, index: usize) -> Option<Point> {
        if index >= self.points.len() {
            return None;
        }
        let mut point = self.points.remove(index);
        point.detach();
        self.touch();
        Some(point)
    }

    /// Moves the point at `from` so that it ends up at index `to`.
    pub fn move_point(&mut self, from: usize, to: usize) -> bool {
        if from >= self.points.len() || to >= self.points.len() {
            return false;
        }
        if from != to {
            let point = self.points.remove(from);
            self.points.insert(to, point);
            self.touch();
        }
        true
    }

    /// Relocates the point at `index`.
    pub fn set_position(&mut self, index: usize, position: Vec3) -> bool {
        match self.points.get_mut(index) {
            Some(point) => {
                point.set_position(position);
                self.touch();
                true
            }
            None => false,
        }
    }

    /// Flips the boundary winding
    pub fn reverse(&mut self) {
        self.points.reverse();
        self.touch();
    }

    /// Closed boundary segments in point order
    pub fn edges(&self) -> impl Iterator<Item = (Vec3, Vec3)> + '_ {
        let n = if self.points.len() < 2 {
            0
        } else {
            self.points.len()
        };
        (0..n).map(move |i| {
            (
                self.points[i].position(),
                self.points[(i + 1) % n].position(),
            )
        })
    }

    /// Average of the boundary points
    pub fn centroid(&self) -> Vec3 {
        polygon_centroid(&self.positions())
    }

    /// Axis aligned bounds, `None` when empty
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        polygon_bounds(&self.positions())
    }

    /// Signed XZ area, negative for counter-clockwise boundaries
    pub fn signed_area(&self) -> f32 {
        polygon_area_2d(&self.positions())
    }

    /// Whether the position lies inside the boundary on the XZ plane
    pub fn contains_2d(&self, position: Vec3) -> bool {
        point_in_polygon_2d(position, &self.positions())
    }

    /// Whether every turn of the boundary has the same orientation
    pub fn is_convex(&self) -> bool {
        is_convex_2d(&self.positions())
    }

    /// Whether no two non-adjacent edges cross
    pub fn is_simple(&self) -> bool {
        is_simple_polygon_2d(&self.positions())
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}
