//! Baking authored areas into a runtime navigation mesh
//!
//! The baker works on the derived [`AdjacencyGraph`], which already carries a
//! snapshot of every area polygon and the authored adjacency between them.
//! Convex areas become a single cell, concave ones are split into triangles,
//! and the authored adjacency is mirrored onto the cells.

use std::fmt;

use glam::Vec3;
use unwalk_area::{AdjacencyGraph, AreaIndex, MIN_SEARCHABLE_POINTS};
use unwalk_common::{
    dist_point_polygon_2d, is_convex_2d, is_simple_polygon_2d, polygon_area_2d, shared_boundary,
    tri_area_2d, Error, Portal, Result, SeekGraph, UnwalkConfig,
};

use super::nav_mesh::{NavMesh, Region};
use super::triangulation::triangulate;

/// Why an area was left out of a bake
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SkipReason {
    /// Fewer distinct points than a polygon needs
    TooFewPoints(usize),
    /// The points enclose no area on the XZ plane
    ZeroArea,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::TooFewPoints(n) => write!(f, "only {n} distinct points"),
            SkipReason::ZeroArea => write!(f, "zero area"),
        }
    }
}

/// An area the baker skipped
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkippedArea {
    pub index: AreaIndex,
    pub reason: SkipReason,
}

/// Summary of a bake
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BakeReport {
    /// Areas baked into regions
    pub regions: usize,
    pub cells: usize,
    /// Directed portals between cells
    pub portals: usize,
    /// Areas left out, in group and area order
    pub skipped: Vec<SkippedArea>,
}

/// A region being baked: the source node and its cells
struct RegionCells {
    node: usize,
    cells: Vec<usize>,
}

/// Builder for runtime navigation meshes
#[derive(Debug, Clone, Default)]
pub struct NavMeshBaker {
    config: UnwalkConfig,
}

impl NavMeshBaker {
    pub fn new(config: UnwalkConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &UnwalkConfig {
        &self.config
    }

    /// Bakes every searchable area of the graph.
    ///
    /// Fails without producing anything when an area boundary crosses itself.
    /// Areas that are too small to form a polygon, or that enclose no area,
    /// are skipped and listed in the report. The output only depends on the graph contents.
    pub fn bake(&self, graph: &AdjacencyGraph) -> Result<(NavMesh, BakeReport)> {
        self.config.validate()?;
        let tolerance = self.config.edge_tolerance;
        let mut report = BakeReport::default();

        // Validate everything before building anything
        let mut sources = Vec::new();
        for (node, graph_node) in graph.nodes().iter().enumerate() {
            let polygon = dedup_points(&graph_node.polygon);
            if polygon.len() < MIN_SEARCHABLE_POINTS {
                log::warn!(
                    "area {} skipped: only {} distinct points",
                    graph_node.index,
                    polygon.len()
                );
                report.skipped.push(SkippedArea {
                    index: graph_node.index,
                    reason: SkipReason::TooFewPoints(polygon.len()),
                });
                continue;
            }
            // Collinear outlines fold back on themselves without crossing anything
            let collinear = is_collinear_2d(&polygon);
            if !collinear && !is_simple_polygon_2d(&polygon) {
                return Err(Error::SelfIntersecting {
                    group: graph_node.index.group,
                    area: graph_node.index.area,
                });
            }
            if collinear || polygon_area_2d(&polygon).abs() <= f32::EPSILON {
                log::warn!("area {} skipped: zero area", graph_node.index);
                report.skipped.push(SkippedArea {
                    index: graph_node.index,
                    reason: SkipReason::ZeroArea,
                });
                continue;
            }
            sources.push((node, polygon));
        }

        let mut regions = Vec::with_capacity(sources.len());
        let mut region_cells = Vec::with_capacity(sources.len());
        let mut region_of_node = vec![None; graph.node_count()];
        let mut cells: Vec<(u32, Vec<Vec3>)> = Vec::new();

        for (node, mut polygon) in sources {
            let graph_node = &graph.nodes()[node];
            let region = regions.len();

            // Cells are wound like the triangulator expects
            if polygon_area_2d(&polygon) > 0.0 {
                polygon.reverse();
            }

            let first_cell = cells.len();
            if is_convex_2d(&polygon) {
                cells.push((region as u32, polygon));
            } else {
                for [a, b, c] in triangulate(&polygon)? {
                    cells.push((region as u32, vec![polygon[a], polygon[b], polygon[c]]));
                }
            }

            regions.push(Region {
                group: graph_node.index.group as u32,
                area: graph_node.index.area as u32,
                footprint: graph_node.footprint,
            });
            region_cells.push(RegionCells {
                node,
                cells: (first_cell..cells.len()).collect(),
            });
            region_of_node[node] = Some(region);
        }

        let mut portals: Vec<Vec<Portal>> = vec![Vec::new(); cells.len()];

        // Cells of one area meet along their split diagonals
        for region in &region_cells {
            connect_cells(&cells, &region.cells, &region.cells, tolerance, &mut portals);
        }

        // Authored adjacency is mirrored onto the cells of both areas
        for region in &region_cells {
            for graph_portal in graph.portals(region.node) {
                if graph_portal.neighbor < region.node {
                    continue;
                }
                let Some(other) = region_of_node[graph_portal.neighbor] else {
                    continue;
                };
                let other = &region_cells[other];

                if graph_portal.explicit {
                    let point = graph_portal.left;
                    let a = nearest_cell(&cells, &region.cells, point);
                    let b = nearest_cell(&cells, &other.cells, point);
                    if let (Some(a), Some(b)) = (a, b) {
                        add_portal_pair(&mut portals, a, b, (point, point), true);
                    }
                } else {
                    connect_cells(&cells, &region.cells, &other.cells, tolerance, &mut portals);
                }
            }
        }

        for list in &mut portals {
            list.sort_by_key(|portal| portal.neighbor);
            list.dedup_by_key(|portal| portal.neighbor);
        }

        let mesh = NavMesh::from_cells(regions, cells, portals);
        report.regions = mesh.regions().len();
        report.cells = mesh.cell_count();
        report.portals = mesh.portal_count();

        log::info!(
            "baked {} regions into {} cells with {} portals, {} areas skipped",
            report.regions,
            report.cells,
            report.portals,
            report.skipped.len()
        );

        Ok((mesh, report))
    }
}

/// Whether every point lies on one line on the XZ plane
fn is_collinear_2d(points: &[Vec3]) -> bool {
    let Some(&origin) = points.first() else {
        return true;
    };
    let dist_sqr_2d = |p: Vec3| (p.x - origin.x).powi(2) + (p.z - origin.z).powi(2);
    let Some(&far) = points
        .iter()
        .max_by(|a, b| dist_sqr_2d(**a).total_cmp(&dist_sqr_2d(**b)))
    else {
        return true;
    };
    let len_sqr = dist_sqr_2d(far);
    if len_sqr <= f32::EPSILON {
        return true;
    }
    points
        .iter()
        .all(|&p| tri_area_2d(origin, far, p).abs() <= f32::EPSILON * len_sqr)
}

/// Drops consecutive duplicate points, including a closing duplicate
fn dedup_points(points: &[Vec3]) -> Vec<Vec3> {
    let mut result: Vec<Vec3> = Vec::with_capacity(points.len());
    for &p in points {
        if result.last() != Some(&p) {
            result.push(p);
        }
    }
    while result.len() > 1 && result.first() == result.last() {
        result.pop();
    }
    result
}

/// Adds a portal for every pair of cells from `a` and `b` sharing an edge.
///
/// When `a` and `b` are the same list each pair is visited once.
fn connect_cells(
    cells: &[(u32, Vec<Vec3>)],
    a: &[usize],
    b: &[usize],
    tolerance: f32,
    portals: &mut [Vec<Portal>],
) {
    let same = a == b;
    for (i, &ca) in a.iter().enumerate() {
        let others = if same { &b[i + 1..] } else { b };
        for &cb in others {
            if let Some(segment) = shared_boundary(&cells[ca].1, &cells[cb].1, tolerance) {
                add_portal_pair(portals, ca, cb, segment, false);
            }
        }
    }
}

fn add_portal_pair(
    portals: &mut [Vec<Portal>],
    a: usize,
    b: usize,
    (left, right): (Vec3, Vec3),
    explicit: bool,
) {
    portals[a].push(Portal {
        neighbor: b,
        left,
        right,
        explicit,
    });
    portals[b].push(Portal {
        neighbor: a,
        left,
        right,
        explicit,
    });
}

/// Cell of the list closest to a point on the XZ plane, lowest index on ties
fn nearest_cell(cells: &[(u32, Vec<Vec3>)], list: &[usize], point: Vec3) -> Option<usize> {
    let mut best: Option<(f32, usize)> = None;
    for &cell in list {
        let d = dist_point_polygon_2d(point, &cells[cell].1);
        if best.map_or(true, |(min, _)| d < min) {
            best = Some((d, cell));
        }
    }
    best.map(|(_, cell)| cell)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_points() {
        let a = Vec3::ZERO;
        let b = Vec3::X;
        let c = Vec3::Z;
        assert_eq!(dedup_points(&[a, a, b, c, c, a]), vec![a, b, c]);
        assert_eq!(dedup_points(&[a, a, a]), vec![a]);
        assert!(dedup_points(&[]).is_empty());
    }

    #[test]
    fn test_is_collinear_2d() {
        let line: Vec<Vec3> = (0..4).map(|i| Vec3::new(5.0 + i as f32, 0.0, 5.0)).collect();
        assert!(is_collinear_2d(&line));
        // Height does not matter, only the XZ projection
        assert!(is_collinear_2d(&[Vec3::ZERO, Vec3::new(1.0, 3.0, 1.0), Vec3::new(2.0, -1.0, 2.0)]));

        let bowtie = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 2.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 2.0),
        ];
        assert!(!is_collinear_2d(&bowtie));
    }

    #[test]
    fn test_nearest_cell_prefers_lowest_index_on_ties() {
        let cells = vec![
            (0, vec![Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0)]),
            (0, vec![Vec3::new(2.0, 0.0, 0.0), Vec3::new(3.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 1.0)]),
        ];
        assert_eq!(nearest_cell(&cells, &[0, 1], Vec3::new(1.5, 0.0, 0.0)), Some(0));
        assert_eq!(nearest_cell(&cells, &[0, 1], Vec3::new(2.5, 0.0, 0.2)), Some(1));
        assert_eq!(nearest_cell(&cells, &[], Vec3::ZERO), None);
    }

    #[test]
    fn test_skip_reason_display() {
        assert_eq!(SkipReason::TooFewPoints(2).to_string(), "only 2 distinct points");
        assert_eq!(SkipReason::ZeroArea.to_string(), "zero area");
    }
}
