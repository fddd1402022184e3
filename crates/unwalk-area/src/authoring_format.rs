//! The `.unwalk` authoring format
//!
//! A pretty-printed JSON document listing groups, their areas and the area
//! points in order, plus the explicit links between areas. Positions are
//! written with full `f32` precision, so a save/load round trip reproduces
//! them exactly.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use unwalk_common::{Error, Result};

use crate::{AreaGroup, AreaIndex, GroupId, Point};

/// Value of the `format` field
pub const AUTHORING_FORMAT: &str = "unwalk";

/// Current authoring format version
pub const AUTHORING_VERSION: u32 = 1;

/// File extension of authoring files
pub const AUTHORING_EXTENSION: &str = "unwalk";

/// Root of an authoring file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthoringDocument {
    pub format: String,
    pub version: u32,
    #[serde(default)]
    pub groups: Vec<GroupRecord>,
    #[serde(default)]
    pub links: Vec<LinkRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub areas: Vec<AreaRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaRecord {
    #[serde(default)]
    pub points: Vec<PointRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    pub position: [f32; 3],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Explicit link between two areas, each addressed as `[group, area]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub a: [usize; 2],
    pub b: [usize; 2],
}

impl AuthoringDocument {
    /// Captures groups and links into a document
    pub fn from_groups(groups: &[AreaGroup], links: &[(AreaIndex, AreaIndex)]) -> Self {
        let groups = groups
            .iter()
            .map(|group| GroupRecord {
                name: group.name().to_string(),
                areas: group
                    .areas()
                    .iter()
                    .map(|area| AreaRecord {
                        points: area
                            .points()
                            .iter()
                            .map(|point| PointRecord {
                                position: point.position().to_array(),
                                name: point.name().map(str::to_string),
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect();

        let links = links
            .iter()
            .map(|(a, b)| LinkRecord {
                a: [a.group, a.area],
                b: [b.group, b.area],
            })
            .collect();

        Self {
            format: AUTHORING_FORMAT.to_string(),
            version: AUTHORING_VERSION,
            groups,
            links,
        }
    }

    /// Checks the header, the coordinates and the link addresses
    pub fn validate(&self) -> Result<()> {
        if self.format != AUTHORING_FORMAT {
            return Err(Error::MalformedFile(format!(
                "unexpected format '{}'",
                self.format
            )));
        }
        if self.version != AUTHORING_VERSION {
            return Err(Error::MalformedFile(format!(
                "unsupported version {}",
                self.version
            )));
        }

        for (g, group) in self.groups.iter().enumerate() {
            for (a, area) in group.areas.iter().enumerate() {
                if let Some(i) = area
                    .points
                    .iter()
                    .position(|p| p.position.iter().any(|c| !c.is_finite()))
                {
                    return Err(Error::MalformedFile(format!(
                        "point {i} of area {g}:{a} is not finite"
                    )));
                }
            }
        }

        for link in &self.links {
            for [g, a] in [link.a, link.b] {
                let exists = self
                    .groups
                    .get(g)
                    .is_some_and(|group| a < group.areas.len());
                if !exists {
                    return Err(Error::MalformedFile(format!(
                        "link references missing area {g}:{a}"
                    )));
                }
            }
        }

        Ok(())
    }

    /// Serializes to pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::MalformedFile(e.to_string()))
    }

    /// Parses and validates a document
    pub fn from_json(json: &str) -> Result<Self> {
        let document: Self =
            serde_json::from_str(json).map_err(|e| Error::MalformedFile(e.to_string()))?;
        document.validate()?;
        Ok(document)
    }

    /// Writes the document to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.validate()?;
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Reads and validates a document from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Builds groups, numbering their identities from `first_id`
    pub fn build_groups(&self, first_id: u64) -> Vec<AreaGroup> {
        self.groups
            .iter()
            .enumerate()
            .map(|(i, record)| {
                let mut group = AreaGroup::with_id(GroupId::new(first_id + i as u64), &record.name);
                for area in &record.areas {
                    group.push_area(
                        area.points
                            .iter()
                            .map(|p| {
                                let position = Vec3::from_array(p.position);
                                match &p.name {
                                    Some(name) => Point::named(position, name),
                                    None => Point::new(position),
                                }
                            })
                            .collect(),
                    );
                }
                group
            })
            .collect()
    }

    /// Link addresses
    pub fn link_indices(&self) -> Vec<(AreaIndex, AreaIndex)> {
        self.links
            .iter()
            .map(|link| {
                (
                    AreaIndex::new(link.a[0], link.a[1]),
                    AreaIndex::new(link.b[0], link.b[1]),
                )
            })
            .collect()
    }

    /// Total number of points in the document
    pub fn point_count(&self) -> usize {
        self.groups
            .iter()
            .flat_map(|group| &group.areas)
            .map(|area| area.points.len())
            .sum()
    }
}
