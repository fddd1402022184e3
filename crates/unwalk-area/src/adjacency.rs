//! Derived adjacency between authored areas
//!
//! Two searchable areas are neighbors when their boundaries share a segment or
//! when a link declares them connected. The relation is never stored as
//! primary data: [`AdjacencyCache`] derives it from the polygons and keeps the
//! per-area results until the area's revision changes.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use glam::Vec3;
use unwalk_common::{shared_boundary, Portal, SeekGraph};

use crate::{Area, AreaGroup, AreaId, GroupId};

/// Positional address of an area: group index and area index within the group
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AreaIndex {
    pub group: usize,
    pub area: usize,
}

impl AreaIndex {
    pub fn new(group: usize, area: usize) -> Self {
        Self { group, area }
    }
}

impl fmt::Display for AreaIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.area)
    }
}

/// Stable identity of an area across groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AreaKey {
    pub group: GroupId,
    pub area: AreaId,
}

impl AreaKey {
    pub fn new(group: GroupId, area: AreaId) -> Self {
        Self { group, area }
    }
}

/// Declared connection between two areas, stored with the smaller key first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AreaLink {
    pub a: AreaKey,
    pub b: AreaKey,
}

impl AreaLink {
    pub fn new(a: AreaKey, b: AreaKey) -> Self {
        if a <= b {
            Self { a, b }
        } else {
            Self { a: b, b: a }
        }
    }

    pub fn touches(&self, key: AreaKey) -> bool {
        self.a == key || self.b == key
    }

    /// Whether the link references a group
    pub fn touches_group(&self, group: GroupId) -> bool {
        self.a.group == group || self.b.group == group
    }
}

/// Node of the derived graph, a snapshot of one area
#[derive(Debug, Clone)]
pub struct GraphNode {
    pub index: AreaIndex,
    pub key: AreaKey,
    pub polygon: Vec<Vec3>,
    pub centroid: Vec3,
    pub footprint: f32,
}

/// Area adjacency graph over every area of every group
///
/// Nodes are ordered by group index, then area index. Areas with fewer than
/// three points are present but not searchable and have no portals.
#[derive(Debug, Clone, Default)]
pub struct AdjacencyGraph {
    nodes: Vec<GraphNode>,
    portals: Vec<Vec<Portal>>,
    group_offsets: Vec<usize>,
}

impl AdjacencyGraph {
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn node(&self, node: usize) -> Option<&GraphNode> {
        self.nodes.get(node)
    }

    /// Node index of an area address
    pub fn node_of(&self, index: AreaIndex) -> Option<usize> {
        let start = *self.group_offsets.get(index.group)?;
        let end = self
            .group_offsets
            .get(index.group + 1)
            .copied()
            .unwrap_or(self.nodes.len());
        let node = start + index.area;
        (node < end).then_some(node)
    }

    /// Neighbor addresses of an area, sorted
    pub fn neighbors(&self, index: AreaIndex) -> Vec<AreaIndex> {
        self.node_of(index)
            .map(|node| {
                self.portals[node]
                    .iter()
                    .map(|portal| self.nodes[portal.neighbor].index)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Portals leaving an area
    pub fn portals_of(&self, index: AreaIndex) -> &[Portal] {
        match self.node_of(index) {
            Some(node) => &self.portals[node],
            None => &[],
        }
    }

    /// Number of undirected edges
    pub fn edge_count(&self) -> usize {
        self.portals.iter().map(Vec::len).sum::<usize>() / 2
    }
}

impl SeekGraph for AdjacencyGraph {
    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn polygon(&self, node: usize) -> &[Vec3] {
        &self.nodes[node].polygon
    }

    fn portals(&self, node: usize) -> &[Portal] {
        &self.portals[node]
    }

    fn centroid(&self, node: usize) -> Vec3 {
        self.nodes[node].centroid
    }

    fn footprint(&self, node: usize) -> f32 {
        self.nodes[node].footprint
    }
}

/// Shared-boundary neighbors of one area at one revision
#[derive(Debug, Clone)]
struct CachedArea {
    revision: u64,
    shared: BTreeMap<AreaKey, (Vec3, Vec3)>,
}

/// Lazily refreshed adjacency
#[derive(Debug, Default)]
pub struct AdjacencyCache {
    entries: BTreeMap<AreaKey, CachedArea>,
    /// Node order the graph was assembled with
    layout: Vec<(AreaKey, usize)>,
    links: Vec<AreaLink>,
    tolerance: f32,
    graph: AdjacencyGraph,
    built: bool,
    last_recomputed: usize,
}

impl AdjacencyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every cached relation
    pub fn invalidate(&mut self) {
        *self = Self::default();
    }

    /// Number of areas whose shared boundaries were recomputed by the last refresh
    pub fn last_recomputed(&self) -> usize {
        self.last_recomputed
    }

    /// Brings the graph up to date with the groups and returns it.
    ///
    /// Only areas whose revision changed (or that are new) are compared
    /// against the others; relations of removed or edited areas are dropped
    /// from their former neighbors first.
    pub fn refresh(
        &mut self,
        groups: &[AreaGroup],
        links: &[AreaLink],
        tolerance: f32,
    ) -> &AdjacencyGraph {
        self.update(groups, links, tolerance);
        &self.graph
    }

    fn update(&mut self, groups: &[AreaGroup], links: &[AreaLink], tolerance: f32) {
        if tolerance != self.tolerance {
            self.entries.clear();
            self.tolerance = tolerance;
            self.built = false;
        }

        let current: Vec<(AreaKey, AreaIndex, &Area)> = groups
            .iter()
            .enumerate()
            .flat_map(|(g, group)| {
                group.areas().iter().enumerate().map(move |(a, area)| {
                    (
                        AreaKey::new(group.id(), area.id()),
                        AreaIndex::new(g, a),
                        area,
                    )
                })
            })
            .collect();
        let current_keys: BTreeSet<AreaKey> = current.iter().map(|(key, _, _)| *key).collect();

        let dirty: BTreeSet<AreaKey> = current
            .iter()
            .filter(|(key, _, area)| {
                self.entries
                    .get(key)
                    .map_or(true, |cached| cached.revision != area.revision())
            })
            .map(|(key, _, _)| *key)
            .collect();
        let removed: Vec<AreaKey> = self
            .entries
            .keys()
            .filter(|key| !current_keys.contains(key))
            .copied()
            .collect();

        let layout: Vec<(AreaKey, usize)> = current
            .iter()
            .map(|(key, index, _)| (*key, index.group))
            .collect();

        self.last_recomputed = dirty.len();
        if self.built
            && dirty.is_empty()
            && removed.is_empty()
            && layout == self.layout
            && links == self.links.as_slice()
        {
            return;
        }

        // Sever relations to areas that are gone or about to be recomputed
        for key in &removed {
            self.entries.remove(key);
        }
        for cached in self.entries.values_mut() {
            cached
                .shared
                .retain(|other, _| !dirty.contains(other) && current_keys.contains(other));
        }
        for (key, _, area) in &current {
            if dirty.contains(key) {
                self.entries.insert(
                    *key,
                    CachedArea {
                        revision: area.revision(),
                        shared: BTreeMap::new(),
                    },
                );
            }
        }

        let polygons: BTreeMap<AreaKey, Vec<Vec3>> = current
            .iter()
            .filter(|(_, _, area)| area.is_searchable())
            .map(|(key, _, area)| (*key, area.positions()))
            .collect();

        for key in &dirty {
            let Some(polygon) = polygons.get(key) else {
                log::debug!("adjacency: area {:?} has too few points, skipped", key);
                continue;
            };
            for (other, other_polygon) in &polygons {
                if other == key || (dirty.contains(other) && other < key) {
                    continue;
                }
                // Compute each pair in key order so both sides see the same segment
                let segment = if key < other {
                    shared_boundary(polygon, other_polygon, tolerance)
                } else {
                    shared_boundary(other_polygon, polygon, tolerance)
                };
                if let Some(segment) = segment {
                    if let Some(cached) = self.entries.get_mut(key) {
                        cached.shared.insert(*other, segment);
                    }
                    if let Some(cached) = self.entries.get_mut(other) {
                        cached.shared.insert(*key, segment);
                    }
                }
            }
        }

        self.graph = self.assemble(&current, &polygons, links);
        self.layout = layout;
        self.links = links.to_vec();
        self.built = true;

        log::debug!(
            "adjacency: {} areas, {} recomputed, {} removed, {} edges",
            current.len(),
            dirty.len(),
            removed.len(),
            self.graph.edge_count()
        );
    }

    fn assemble(
        &self,
        current: &[(AreaKey, AreaIndex, &Area)],
        polygons: &BTreeMap<AreaKey, Vec<Vec3>>,
        links: &[AreaLink],
    ) -> AdjacencyGraph {
        let node_of: BTreeMap<AreaKey, usize> = current
            .iter()
            .enumerate()
            .map(|(node, (key, _, _))| (*key, node))
            .collect();

        let mut group_offsets = Vec::new();
        let mut nodes = Vec::with_capacity(current.len());
        for (node, (key, index, area)) in current.iter().enumerate() {
            while group_offsets.len() <= index.group {
                group_offsets.push(node);
            }
            nodes.push(GraphNode {
                index: *index,
                key: *key,
                polygon: area.positions(),
                centroid: area.centroid(),
                footprint: area.signed_area().abs(),
            });
        }

        let mut portals: Vec<Vec<Portal>> = vec![Vec::new(); nodes.len()];
        for (node, (key, _, _)) in current.iter().enumerate() {
            let Some(cached) = self.entries.get(key) else {
                continue;
            };
            for (other, (left, right)) in &cached.shared {
                if let Some(&neighbor) = node_of.get(other) {
                    portals[node].push(Portal {
                        neighbor,
                        left: *left,
                        right: *right,
                        explicit: false,
                    });
                }
            }
        }

        for link in links {
            let (Some(&a), Some(&b)) = (node_of.get(&link.a), node_of.get(&link.b)) else {
                log::warn!("adjacency: link {:?} references a removed area", link);
                continue;
            };
            if a == b || !polygons.contains_key(&link.a) || !polygons.contains_key(&link.b) {
                continue;
            }
            if portals[a].iter().any(|portal| portal.neighbor == b) {
                continue;
            }
            let point = (nodes[a].centroid + nodes[b].centroid) * 0.5;
            for (from, to) in [(a, b), (b, a)] {
                portals[from].push(Portal {
                    neighbor: to,
                    left: point,
                    right: point,
                    explicit: true,
                });
            }
        }

        for list in &mut portals {
            list.sort_by_key(|portal| portal.neighbor);
        }

        AdjacencyGraph {
            nodes,
            portals,
            group_offsets,
        }
    }
}
