//! Seek: point-to-point path search over a polygon adjacency graph
//!
//! Both the authored area graph and the baked navmesh expose themselves as a
//! [`SeekGraph`]; the search itself is an A* over polygon nodes where the
//! position of a node is the point it was entered through.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use glam::Vec3;

use crate::{
    dist_point_polygon_2d, point_in_polygon_2d, polygon_area_2d, polygon_bounds, polygon_centroid,
    PathNotFound, UnwalkConfig,
};

/// Connection from one node to a neighbor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Portal {
    /// Index of the neighbor node
    pub neighbor: usize,
    /// First endpoint of the shared segment
    pub left: Vec3,
    /// Second endpoint of the shared segment
    pub right: Vec3,
    /// True when the connection was declared rather than derived from a shared boundary
    pub explicit: bool,
}

impl Portal {
    /// The point a path crosses this portal at
    pub fn midpoint(&self) -> Vec3 {
        (self.left + self.right) * 0.5
    }
}

/// A graph of polygon nodes that can be searched with [`seek`]
pub trait SeekGraph {
    /// Number of nodes, searchable or not
    fn node_count(&self) -> usize;

    /// Boundary of a node
    fn polygon(&self, node: usize) -> &[Vec3];

    /// Outgoing connections of a node, in a stable order
    fn portals(&self, node: usize) -> &[Portal];

    /// Representative position of a node
    fn centroid(&self, node: usize) -> Vec3 {
        polygon_centroid(self.polygon(node))
    }

    /// Size of the authored region the node belongs to; smaller wins when regions overlap
    fn footprint(&self, node: usize) -> f32 {
        polygon_area_2d(self.polygon(node)).abs()
    }

    /// Whether the node takes part in searches at all
    fn is_searchable(&self, node: usize) -> bool {
        self.polygon(node).len() >= 3
    }
}

/// Result of a successful Seek
#[derive(Debug, Clone, PartialEq)]
pub struct SeekPath {
    /// Visited nodes from the start node to the end node
    pub nodes: Vec<usize>,
    /// Waypoints from the start position to the end position
    pub waypoints: Vec<Vec3>,
}

impl SeekPath {
    /// Total length of the waypoint polyline
    pub fn length(&self) -> f32 {
        self.waypoints.windows(2).map(|w| w[0].distance(w[1])).sum()
    }
}

/// Finds the node a position belongs to.
///
/// Only nodes whose height span, widened by the height tolerance, covers the
/// position are candidates. Nodes containing the position on the XZ plane
/// win, smallest footprint first. Otherwise the node with the nearest centroid
/// among those whose boundary lies within the seek proximity is used. Ties go
/// to the lowest node index.
pub fn locate<G: SeekGraph + ?Sized>(graph: &G, pos: Vec3, config: &UnwalkConfig) -> Option<usize> {
    let mut containing: Option<(f32, usize)> = None;
    let mut nearest: Option<(f32, usize)> = None;

    for node in 0..graph.node_count() {
        if !graph.is_searchable(node) {
            continue;
        }

        let polygon = graph.polygon(node);
        let Some((bmin, bmax)) = polygon_bounds(polygon) else {
            continue;
        };
        if pos.y < bmin.y - config.height_tolerance || pos.y > bmax.y + config.height_tolerance {
            continue;
        }

        if point_in_polygon_2d(pos, polygon) {
            let footprint = graph.footprint(node);
            if containing.map_or(true, |(best, _)| footprint < best) {
                containing = Some((footprint, node));
            }
        } else if containing.is_none()
            && dist_point_polygon_2d(pos, polygon) <= config.seek_proximity
        {
            let d = graph.centroid(node).distance_squared(pos);
            if nearest.map_or(true, |(best, _)| d < best) {
                nearest = Some((d, node));
            }
        }
    }

    containing.or(nearest).map(|(_, node)| node)
}

/// State of a node in the search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeState {
    /// Node hasn't been reached yet
    New,
    /// Node is in the open list
    Open,
    /// Node is in the closed list
    Closed,
}

/// Search bookkeeping for one graph node
#[derive(Debug, Clone)]
struct Node {
    parent: Option<usize>,
    /// Point the node was entered through
    pos: Vec3,
    /// Cost from the start position to `pos`
    g: f32,
    state: NodeState,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            parent: None,
            pos: Vec3::ZERO,
            g: 0.0,
            state: NodeState::New,
        }
    }
}

/// Node wrapper for the binary heap (priority queue)
#[derive(Debug, Clone, Copy)]
struct HeapNode {
    index: usize,
    f: f32,
}

impl PartialEq for HeapNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapNode {}

impl PartialOrd for HeapNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for a min-heap: lowest f first, then lowest node index
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.index.cmp(&self.index))
    }
}

/// Finds a path between two positions.
///
/// Returns `[start, end]` directly when both resolve to the same node.
pub fn seek<G: SeekGraph + ?Sized>(
    graph: &G,
    start: Vec3,
    end: Vec3,
    config: &UnwalkConfig,
) -> Result<SeekPath, PathNotFound> {
    let start_node = locate(graph, start, config).ok_or(PathNotFound::StartUnresolved)?;
    let end_node = locate(graph, end, config).ok_or(PathNotFound::EndUnresolved)?;

    if start_node == end_node {
        return Ok(SeekPath {
            nodes: vec![start_node],
            waypoints: vec![start, end],
        });
    }

    let node_count = graph.node_count();
    let mut nodes = vec![Node::default(); node_count];
    let mut open_list = BinaryHeap::new();

    nodes[start_node] = Node {
        parent: None,
        pos: start,
        g: 0.0,
        state: NodeState::Open,
    };
    open_list.push(HeapNode {
        index: start_node,
        f: start.distance(end),
    });

    let mut expanded = 0usize;
    while let Some(HeapNode { index: current, .. }) = open_list.pop() {
        // Stale entry left behind by a cheaper re-push
        if nodes[current].state == NodeState::Closed {
            continue;
        }
        nodes[current].state = NodeState::Closed;
        expanded += 1;

        if current == end_node {
            break;
        }

        let (pos, g) = (nodes[current].pos, nodes[current].g);
        for portal in graph.portals(current) {
            let next = portal.neighbor;
            if next >= node_count || !graph.is_searchable(next) {
                continue;
            }
            if nodes[next].state == NodeState::Closed {
                continue;
            }

            let entry = portal.midpoint();
            let mut cost = g + pos.distance(entry);
            let heuristic = if next == end_node {
                cost += entry.distance(end);
                0.0
            } else {
                entry.distance(end)
            };

            if nodes[next].state == NodeState::Open && cost >= nodes[next].g {
                continue;
            }

            nodes[next] = Node {
                parent: Some(current),
                pos: entry,
                g: cost,
                state: NodeState::Open,
            };
            open_list.push(HeapNode {
                index: next,
                f: cost + heuristic,
            });
        }
    }

    if nodes[end_node].state != NodeState::Closed {
        log::debug!(
            "seek: node {} unreachable from node {} after expanding {} nodes",
            end_node,
            start_node,
            expanded
        );
        return Err(PathNotFound::Disconnected);
    }

    let mut path = vec![end_node];
    let mut current = end_node;
    while let Some(parent) = nodes[current].parent {
        path.push(parent);
        current = parent;
    }
    path.reverse();

    let mut waypoints = Vec::with_capacity(path.len() + 1);
    waypoints.push(start);
    waypoints.extend(path[1..].iter().map(|&node| nodes[node].pos));
    waypoints.push(end);

    log::debug!(
        "seek: {} nodes on path, {} expanded",
        path.len(),
        expanded
    );

    Ok(SeekPath {
        nodes: path,
        waypoints,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared_boundary;

    /// Plain polygon soup with derived portals
    struct TestGraph {
        polygons: Vec<Vec<Vec3>>,
        portals: Vec<Vec<Portal>>,
    }

    impl TestGraph {
        fn new(polygons: Vec<Vec<Vec3>>) -> Self {
            let mut portals = vec![Vec::new(); polygons.len()];
            for i in 0..polygons.len() {
                for j in 0..polygons.len() {
                    if i == j || polygons[i].len() < 3 || polygons[j].len() < 3 {
                        continue;
                    }
                    if let Some((left, right)) = shared_boundary(&polygons[i], &polygons[j], 0.01) {
                        portals[i].push(Portal {
                            neighbor: j,
                            left,
                            right,
                            explicit: false,
                        });
                    }
                }
            }
            Self { polygons, portals }
        }
    }

    impl SeekGraph for TestGraph {
        fn node_count(&self) -> usize {
            self.polygons.len()
        }

        fn polygon(&self, node: usize) -> &[Vec3] {
            &self.polygons[node]
        }

        fn portals(&self, node: usize) -> &[Portal] {
            &self.portals[node]
        }
    }

    fn rect(x: f32, z: f32, w: f32, h: f32) -> Vec<Vec3> {
        vec![
            Vec3::new(x, 0.0, z),
            Vec3::new(x + w, 0.0, z),
            Vec3::new(x + w, 0.0, z + h),
            Vec3::new(x, 0.0, z + h),
        ]
    }

    #[test]
    fn test_same_node_returns_endpoints() {
        let graph = TestGraph::new(vec![rect(0.0, 0.0, 4.0, 4.0)]);
        let config = UnwalkConfig::default();
        let start = Vec3::new(1.0, 0.0, 1.0);
        let end = Vec3::new(3.0, 0.0, 3.0);

        let path = seek(&graph, start, end, &config).unwrap();
        assert_eq!(path.waypoints, vec![start, end]);
        assert_eq!(path.nodes, vec![0]);
    }

    #[test]
    fn test_path_through_strip() {
        let graph = TestGraph::new(vec![
            rect(0.0, 0.0, 2.0, 2.0),
            rect(2.0, 0.0, 2.0, 2.0),
            rect(4.0, 0.0, 2.0, 2.0),
        ]);
        let config = UnwalkConfig::default();
        let start = Vec3::new(1.0, 0.0, 1.0);
        let end = Vec3::new(5.0, 0.0, 1.0);

        let path = seek(&graph, start, end, &config).unwrap();
        assert_eq!(path.nodes, vec![0, 1, 2]);
        assert_eq!(path.waypoints.len(), 4);
        assert!(path.waypoints[1].distance(Vec3::new(2.0, 0.0, 1.0)) < 1e-5);
        assert!(path.waypoints[2].distance(Vec3::new(4.0, 0.0, 1.0)) < 1e-5);
        assert!((path.length() - 4.0).abs() < 1e-4);
    }

    #[test]
    fn test_disconnected() {
        let graph = TestGraph::new(vec![rect(0.0, 0.0, 2.0, 2.0), rect(10.0, 0.0, 2.0, 2.0)]);
        let result = seek(
            &graph,
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(11.0, 0.0, 1.0),
            &UnwalkConfig::default(),
        );
        assert_eq!(result, Err(PathNotFound::Disconnected));
    }

    #[test]
    fn test_unresolved_positions() {
        let graph = TestGraph::new(vec![rect(0.0, 0.0, 2.0, 2.0)]);
        let config = UnwalkConfig::default();
        let inside = Vec3::new(1.0, 0.0, 1.0);
        let far = Vec3::new(50.0, 0.0, 50.0);

        assert_eq!(
            seek(&graph, far, inside, &config),
            Err(PathNotFound::StartUnresolved)
        );
        assert_eq!(
            seek(&graph, inside, far, &config),
            Err(PathNotFound::EndUnresolved)
        );
        // Above the area but outside the height window
        assert_eq!(
            locate(&graph, Vec3::new(1.0, 10.0, 1.0), &config),
            None
        );
    }

    #[test]
    fn test_sloped_node_resolves_along_its_surface() {
        let ramp = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(20.0, 10.0, 0.0),
            Vec3::new(20.0, 10.0, 2.0),
            Vec3::new(0.0, 0.0, 2.0),
        ];
        let graph = TestGraph::new(vec![ramp]);
        let config = UnwalkConfig::default();
        let start = Vec3::new(1.0, 0.5, 1.0);
        let end = Vec3::new(19.0, 9.5, 1.0);

        let path = seek(&graph, start, end, &config).unwrap();
        assert_eq!(path.waypoints, vec![start, end]);
        assert_eq!(locate(&graph, Vec3::new(10.0, 20.0, 1.0), &config), None);
    }

    #[test]
    fn test_locate_prefers_smallest_footprint_then_proximity() {
        let graph = TestGraph::new(vec![rect(-5.0, -5.0, 20.0, 20.0), rect(0.0, 0.0, 2.0, 2.0)]);
        let config = UnwalkConfig::default();
        assert_eq!(locate(&graph, Vec3::new(1.0, 0.0, 1.0), &config), Some(1));
        assert_eq!(locate(&graph, Vec3::new(10.0, 0.0, 10.0), &config), Some(0));

        let single = TestGraph::new(vec![rect(0.0, 0.0, 2.0, 2.0)]);
        assert_eq!(locate(&single, Vec3::new(3.0, 0.0, 1.0), &config), Some(0));
    }

    #[test]
    fn test_degenerate_nodes_are_skipped() {
        let graph = TestGraph::new(vec![
            vec![Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0)],
            rect(0.0, 0.0, 2.0, 2.0),
        ]);
        assert_eq!(
            locate(&graph, Vec3::new(1.0, 0.0, 1.0), &UnwalkConfig::default()),
            Some(1)
        );
    }

    #[test]
    fn test_equal_routes_prefer_lower_index() {
        // Start on the left, end on the right, two symmetric corridors
        let graph = TestGraph::new(vec![
            rect(0.0, 0.0, 2.0, 4.0),
            rect(2.0, 2.0, 2.0, 2.0),
            rect(2.0, 0.0, 2.0, 2.0),
            rect(4.0, 0.0, 2.0, 4.0),
        ]);
        let path = seek(
            &graph,
            Vec3::new(1.0, 0.0, 2.0),
            Vec3::new(5.0, 0.0, 2.0),
            &UnwalkConfig::default(),
        )
        .unwrap();
        assert_eq!(path.nodes, vec![0, 1, 3]);
    }
}
