//! Authored points, the vertices of area polygons

use glam::Vec3;

use crate::AreaId;

/// A single authored location
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    /// World position
    position: Vec3,
    /// Name of the scene object mirroring this point, if any
    name: Option<String>,
    /// Area whose boundary this point belongs to
    owner: Option<AreaId>,
}

impl Point {
    /// Creates a detached point
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            name: None,
            owner: None,
        }
    }

    /// Creates a detached point carrying a scene object name
    pub fn named(position: Vec3, name: impl Into<String>) -> Self {
        Self {
            position,
            name: Some(name.into()),
            owner: None,
        }
    }

    /// World position (Y up)
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Scene object name, if any
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Area this point is part of, `None` once removed
    pub fn owner(&self) -> Option<AreaId> {
        self.owner
    }

    pub(crate) fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub(crate) fn attach(&mut self, owner: AreaId) {
        self.owner = Some(owner);
    }

    pub(crate) fn detach(&mut self) {
        self.owner = None;
    }
}
