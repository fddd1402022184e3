//! Area groups
//!
//! A group owns an index-addressed list of areas sharing one authoring
//! context, for example one floor of a building. Removing an area shifts the
//! later ones down so indices always stay `0..len`.

use glam::Vec3;
use unwalk_common::{Error, IndexKind, Result};

use crate::{Area, AreaId, Point};

/// Padding used when a frame is requested with a non-positive margin
const FALLBACK_FRAME_PADDING: f32 = 1.0;

/// Session-stable identity of a group, unaffected by index compaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupId(u64);

impl GroupId {
    /// Wraps a raw identity
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw identity value
    pub fn id(self) -> u64 {
        self.0
    }
}

/// An owning collection of areas
#[derive(Debug, Clone)]
pub struct AreaGroup {
    id: GroupId,
    name: String,
    areas: Vec<Area>,
    next_area_id: u64,
}

impl AreaGroup {
    /// Creates a standalone group
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(GroupId::new(0), name)
    }

    /// Creates a group with an identity assigned by its owner
    pub fn with_id(id: GroupId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            areas: Vec::new(),
            next_area_id: 0,
        }
    }

    /// Identity that survives index compaction
    pub fn id(&self) -> GroupId {
        self.id
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames the group
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Number of areas
    pub fn len(&self) -> usize {
        self.areas.len()
    }

    /// Whether the group has no areas
    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    /// Areas in index order
    pub fn areas(&self) -> &[Area] {
        &self.areas
    }

    /// Area at `index`, if in range
    pub fn area(&self, index: usize) -> Option<&Area> {
        self.areas.get(index)
    }

    /// Mutable area at `index`, if in range
    pub fn area_mut(&mut self, index: usize) -> Option<&mut Area> {
        self.areas.get_mut(index)
    }

    /// Current index of the area with the given identity
    pub fn area_index(&self, id: AreaId) -> Option<usize> {
        self.areas.iter().position(|area| area.id() == id)
    }

    /// Appends an empty area and returns its index
    pub fn create_area(&mut self) -> usize {
        self.push_area(Vec::new())
    }

    /// Appends an area with the given boundary points and returns its index
    pub fn push_area(&mut self, points: Vec<Point>) -> usize {
        let id = AreaId::new(self.next_area_id);
        self.next_area_id += 1;
        self.areas.push(Area::from_points(id, points));
        self.areas.len() - 1
    }

    /// Appends a rectangle enclosing every existing point of the group.
    ///
    /// The rectangle is axis aligned on the XZ plane, extends `padding` beyond
    /// the content on every side and sits at the lowest content height. An
    /// empty group gets a square of half size `padding` around the origin.
    pub fn create_frame_area(&mut self, padding: f32) -> usize {
        let padding = if padding.is_finite() && padding > 0.0 {
            padding
        } else {
            log::warn!(
                "frame padding {} is not positive, using {}",
                padding,
                FALLBACK_FRAME_PADDING
            );
            FALLBACK_FRAME_PADDING
        };

        let (bmin, bmax) = self.bounds().unwrap_or((Vec3::ZERO, Vec3::ZERO));
        let y = bmin.y;
        let (x0, z0) = (bmin.x - padding, bmin.z - padding);
        let (x1, z1) = (bmax.x + padding, bmax.z + padding);

        let corners = [
            Vec3::new(x0, y, z0),
            Vec3::new(x1, y, z0),
            Vec3::new(x1, y, z1),
            Vec3::new(x0, y, z1),
        ];
        log::debug!(
            "group '{}': frame area from {:?} to {:?}",
            self.name,
            corners[0],
            corners[2]
        );
        self.push_area(corners.into_iter().map(Point::new).collect())
    }

    /// Destroys the area at `index` and compacts the later indices.
    pub fn remove_area(&mut self, index: usize) -> Result<Area> {
        if index >= self.areas.len() {
            return Err(Error::invalid_index(
                IndexKind::Area,
                index,
                self.areas.len(),
            ));
        }
        Ok(self.areas.remove(index))
    }

    /// Bounds of every point in the group
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        self.areas
            .iter()
            .filter_map(Area::bounds)
            .reduce(|(amin, amax), (bmin, bmax)| (amin.min(bmin), amax.max(bmax)))
    }
}
