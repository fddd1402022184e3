//! The area graph manager
//!
//! One manager is one authoring session: it owns the groups, the explicit
//! links between areas, the derived adjacency and the last baked mesh. There
//! is no global instance; create as many as needed.

use std::path::Path;

use glam::Vec3;
use unwalk_area::{
    attach_all, AdjacencyCache, AdjacencyGraph, Area, AreaGroup, AreaIndex, AreaKey, AreaLink,
    AuthoringDocument, GroupId, Point, SceneSink,
};
use unwalk_common::{seek, Error, IndexKind, Result, SeekPath, UnwalkConfig};
use unwalk_navmesh::{BakeReport, NavMesh, NavMeshBaker};

/// A path over authored areas
#[derive(Debug, Clone, PartialEq)]
pub struct AreaPath {
    /// Areas crossed, from the start area to the end area
    pub areas: Vec<AreaIndex>,
    /// Start position, one point per area boundary crossed, end position
    pub waypoints: Vec<Vec3>,
}

impl AreaPath {
    /// Total length of the waypoint polyline
    pub fn length(&self) -> f32 {
        self.waypoints.windows(2).map(|w| w[0].distance(w[1])).sum()
    }
}

/// Owner of every authored group and of the derived data built from them
#[derive(Debug, Default)]
pub struct AreaGraphManager {
    config: UnwalkConfig,
    groups: Vec<AreaGroup>,
    /// Sorted and free of duplicates
    links: Vec<AreaLink>,
    adjacency: AdjacencyCache,
    nav_mesh: Option<NavMesh>,
    last_bake: Option<BakeReport>,
    next_group_id: u64,
}

impl AreaGraphManager {
    /// Creates an empty manager with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty manager with a validated configuration
    pub fn with_config(config: UnwalkConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::default()
        })
    }

    pub fn config(&self) -> &UnwalkConfig {
        &self.config
    }

    /// Replaces the configuration; derived adjacency follows on the next query
    pub fn set_config(&mut self, config: UnwalkConfig) -> Result<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    // Groups

    /// Appends a group with a generated name and returns its index
    pub fn add_group(&mut self) -> usize {
        let name = format!("Group {}", self.groups.len());
        self.add_named_group(name)
    }

    pub fn add_named_group(&mut self, name: impl Into<String>) -> usize {
        let id = GroupId::new(self.next_group_id);
        self.next_group_id += 1;
        self.groups.push(AreaGroup::with_id(id, name));
        self.groups.len() - 1
    }

    /// Destroys a group with all its areas; later groups shift down.
    pub fn remove_group(&mut self, index: usize) -> Result<AreaGroup> {
        self.check_group(index)?;
        let group = self.groups.remove(index);
        let id = group.id();
        self.prune_links(|link| link.touches_group(id), &format!("group {index}"));
        Ok(group)
    }

    pub fn group(&self, index: usize) -> Option<&AreaGroup> {
        self.groups.get(index)
    }

    pub fn group_mut(&mut self, index: usize) -> Option<&mut AreaGroup> {
        self.groups.get_mut(index)
    }

    pub fn groups(&self) -> &[AreaGroup] {
        &self.groups
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    // Areas

    pub fn area(&self, index: AreaIndex) -> Option<&Area> {
        self.groups.get(index.group)?.area(index.area)
    }

    pub fn area_mut(&mut self, index: AreaIndex) -> Option<&mut Area> {
        self.groups.get_mut(index.group)?.area_mut(index.area)
    }

    /// Appends an empty area to a group
    pub fn create_area(&mut self, group: usize) -> Result<AreaIndex> {
        self.check_group(group)?;
        let area = self.groups[group].create_area();
        Ok(AreaIndex::new(group, area))
    }

    /// Appends a frame area around the group content, padded by the configured margin
    pub fn create_frame_area(&mut self, group: usize) -> Result<AreaIndex> {
        self.check_group(group)?;
        let area = self.groups[group].create_frame_area(self.config.frame_padding);
        Ok(AreaIndex::new(group, area))
    }

    /// Destroys an area and every link to it; later areas of the group shift down.
    pub fn remove_area(&mut self, index: AreaIndex) -> Result<Area> {
        self.check_group(index.group)?;
        let group = &mut self.groups[index.group];
        let group_id = group.id();
        let area = group.remove_area(index.area)?;
        let key = AreaKey::new(group_id, area.id());
        self.prune_links(|link| link.touches(key), &format!("area {index}"));
        Ok(area)
    }

    /// Inserts a point into an area at `at`, clamped to the point count.
    ///
    /// Returns the index the point ended up at.
    pub fn insert(&mut self, index: AreaIndex, position: Vec3, at: usize) -> Result<usize> {
        Ok(self.checked_area_mut(index)?.insert(position, at))
    }

    /// Removes a point from an area; an out of range point index is a no-op.
    pub fn remove_at(&mut self, index: AreaIndex, at: usize) -> Result<Option<Point>> {
        Ok(self.checked_area_mut(index)?.remove_at(at))
    }

    // Links

    /// Declares two areas connected regardless of their boundaries.
    ///
    /// Returns false when the link already exists or both addresses name the
    /// same area.
    pub fn link_areas(&mut self, a: AreaIndex, b: AreaIndex) -> Result<bool> {
        let (ka, kb) = (self.checked_key(a)?, self.checked_key(b)?);
        if ka == kb {
            log::warn!("refusing to link area {a} to itself");
            return Ok(false);
        }
        let link = AreaLink::new(ka, kb);
        match self.links.binary_search(&link) {
            Ok(_) => Ok(false),
            Err(pos) => {
                self.links.insert(pos, link);
                Ok(true)
            }
        }
    }

    /// Removes a declared link; returns whether one existed
    pub fn unlink_areas(&mut self, a: AreaIndex, b: AreaIndex) -> Result<bool> {
        let link = AreaLink::new(self.checked_key(a)?, self.checked_key(b)?);
        match self.links.binary_search(&link) {
            Ok(pos) => {
                self.links.remove(pos);
                Ok(true)
            }
            Err(_) => Ok(false),
        }
    }

    /// Declared links by current address
    pub fn links(&self) -> Vec<(AreaIndex, AreaIndex)> {
        self.links
            .iter()
            .filter_map(|link| Some((self.index_of(link.a)?, self.index_of(link.b)?)))
            .collect()
    }

    /// Stable identity of the area at an address
    pub fn key_of(&self, index: AreaIndex) -> Option<AreaKey> {
        let group = self.groups.get(index.group)?;
        let area = group.area(index.area)?;
        Some(AreaKey::new(group.id(), area.id()))
    }

    /// Current address of an area identity
    pub fn index_of(&self, key: AreaKey) -> Option<AreaIndex> {
        let g = self.groups.iter().position(|group| group.id() == key.group)?;
        let a = self.groups[g].area_index(key.area)?;
        Some(AreaIndex::new(g, a))
    }

    // Adjacency

    /// The adjacency graph of the current groups
    pub fn adjacency(&mut self) -> &AdjacencyGraph {
        self.adjacency
            .refresh(&self.groups, &self.links, self.config.edge_tolerance)
    }

    /// Sorted neighbor addresses of an area
    pub fn neighbors(&mut self, index: AreaIndex) -> Vec<AreaIndex> {
        self.adjacency().neighbors(index)
    }

    // Persistence

    /// Writes every group and link to an authoring file
    pub fn save_area_groups<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let document = AuthoringDocument::from_groups(&self.groups, &self.links());
        document.save(&path)?;
        log::info!(
            "saved {} groups ({} points, {} links) to {}",
            document.groups.len(),
            document.point_count(),
            document.links.len(),
            path.as_ref().display()
        );
        Ok(())
    }

    /// Replaces every group and link with the contents of an authoring file.
    ///
    /// The file is parsed and validated completely before anything changes,
    /// so a failed load leaves the manager untouched. Afterwards the scene
    /// is cleared and receives one object per loaded point. Returns the
    /// number of points loaded.
    pub fn load_area_groups<P, S>(&mut self, path: P, scene: &mut S) -> Result<usize>
    where
        P: AsRef<Path>,
        S: SceneSink + ?Sized,
    {
        let document = AuthoringDocument::load(&path)?;

        let groups = document.build_groups(self.next_group_id);
        let key = |index: AreaIndex| {
            let group = &groups[index.group];
            group
                .area(index.area)
                .map(|area| AreaKey::new(group.id(), area.id()))
        };
        let mut links: Vec<AreaLink> = document
            .link_indices()
            .into_iter()
            .filter_map(|(a, b)| Some(AreaLink::new(key(a)?, key(b)?)))
            .filter(|link| link.a != link.b)
            .collect();
        links.sort();
        links.dedup();

        self.next_group_id += groups.len() as u64;
        self.groups = groups;
        self.links = links;
        self.adjacency.invalidate();

        let points = attach_all(scene, &self.groups);
        log::info!(
            "loaded {} groups ({} points, {} links) from {}",
            self.groups.len(),
            points,
            self.links.len(),
            path.as_ref().display()
        );
        Ok(points)
    }

    // Navmesh

    /// Bakes the current groups and keeps the result as the active mesh.
    ///
    /// On failure the previously baked or loaded mesh stays active.
    pub fn create_nav_mesh(&mut self) -> Result<BakeReport> {
        let baker = NavMeshBaker::new(self.config.clone());
        let graph = self
            .adjacency
            .refresh(&self.groups, &self.links, self.config.edge_tolerance);
        let (mesh, report) = baker.bake(graph)?;
        self.nav_mesh = Some(mesh);
        self.last_bake = Some(report.clone());
        Ok(report)
    }

    /// The active mesh, baked or loaded
    pub fn nav_mesh(&self) -> Option<&NavMesh> {
        self.nav_mesh.as_ref()
    }

    /// Report of the last successful bake
    pub fn last_bake(&self) -> Option<&BakeReport> {
        self.last_bake.as_ref()
    }

    /// Writes the active mesh to a `.navmesh` file
    pub fn save_nav_mesh<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.nav_mesh.as_ref().ok_or(Error::NotBaked)?.save(path)
    }

    /// Makes a `.navmesh` file the active mesh; a failed load keeps the current one.
    pub fn load_nav_mesh<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let mesh = NavMesh::load(path)?;
        self.nav_mesh = Some(mesh);
        self.last_bake = None;
        Ok(())
    }

    // Seek

    /// Finds a path over the authored areas
    pub fn seek(&mut self, start: Vec3, end: Vec3) -> Result<AreaPath> {
        let config = self.config.clone();
        let graph = self
            .adjacency
            .refresh(&self.groups, &self.links, config.edge_tolerance);
        let path = seek(graph, start, end, &config)?;
        Ok(AreaPath {
            areas: path
                .nodes
                .iter()
                .map(|&node| graph.nodes()[node].index)
                .collect(),
            waypoints: path.waypoints,
        })
    }

    /// Finds a path over the cells of the active mesh
    pub fn seek_nav_mesh(&self, start: Vec3, end: Vec3) -> Result<SeekPath> {
        let mesh = self.nav_mesh.as_ref().ok_or(Error::NotBaked)?;
        Ok(mesh.seek(start, end, &self.config)?)
    }

    // Helpers

    fn check_group(&self, index: usize) -> Result<()> {
        if index >= self.groups.len() {
            return Err(Error::invalid_index(
                IndexKind::Group,
                index,
                self.groups.len(),
            ));
        }
        Ok(())
    }

    fn checked_area_mut(&mut self, index: AreaIndex) -> Result<&mut Area> {
        self.check_group(index.group)?;
        let group = &mut self.groups[index.group];
        let count = group.len();
        group
            .area_mut(index.area)
            .ok_or_else(|| Error::invalid_index(IndexKind::Area, index.area, count))
    }

    fn checked_key(&self, index: AreaIndex) -> Result<AreaKey> {
        self.check_group(index.group)?;
        let count = self.groups[index.group].len();
        self.key_of(index)
            .ok_or_else(|| Error::invalid_index(IndexKind::Area, index.area, count))
    }

    fn prune_links(&mut self, stale: impl Fn(&AreaLink) -> bool, removed: &str) {
        let before = self.links.len();
        self.links.retain(|link| !stale(link));
        let dropped = before - self.links.len();
        if dropped > 0 {
            log::warn!("dropped {dropped} links to removed {removed}");
        }
    }
}
