//! Baked runtime navigation mesh
//!
//! A flat, self-contained mesh of convex cells. Every cell remembers the
//! authored area (its region) it was cut from, and lists portals to the cells
//! it connects to. The mesh needs no authoring data to answer queries.

use std::path::Path;

use glam::Vec3;
use unwalk_area::AreaIndex;
use unwalk_common::{
    locate, polygon_bounds, seek, PathNotFound, Portal, Result, SeekGraph, SeekPath,
    UnwalkConfig,
};

/// The authored area a set of cells was baked from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    /// Group index at bake time
    pub group: u32,
    /// Area index within the group at bake time
    pub area: u32,
    /// XZ area of the authored polygon
    pub footprint: f32,
}

impl Region {
    pub fn area_index(&self) -> AreaIndex {
        AreaIndex::new(self.group as usize, self.area as usize)
    }
}

/// A convex polygon of the mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cell {
    pub region: u32,
    /// First vertex in the mesh vertex array
    pub first_vert: u32,
    pub vert_count: u32,
    /// First portal in the mesh portal array
    pub first_portal: u32,
    pub portal_count: u32,
}

impl Cell {
    fn verts(&self) -> std::ops::Range<usize> {
        let first = self.first_vert as usize;
        first..first + self.vert_count as usize
    }

    fn portals(&self) -> std::ops::Range<usize> {
        let first = self.first_portal as usize;
        first..first + self.portal_count as usize
    }
}

/// Runtime navigation mesh
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NavMesh {
    pub(crate) regions: Vec<Region>,
    pub(crate) verts: Vec<Vec3>,
    pub(crate) cells: Vec<Cell>,
    pub(crate) portals: Vec<Portal>,
    pub(crate) bmin: Vec3,
    pub(crate) bmax: Vec3,
}

impl NavMesh {
    /// Assembles a mesh from per-cell polygons and portal lists.
    ///
    /// `cells` pairs each cell's region index with its boundary, `portals`
    /// holds the outgoing portals of every cell in cell order.
    pub(crate) fn from_cells(
        regions: Vec<Region>,
        cells: Vec<(u32, Vec<Vec3>)>,
        portals: Vec<Vec<Portal>>,
    ) -> Self {
        let mut mesh = NavMesh {
            regions,
            ..Default::default()
        };

        for ((region, polygon), cell_portals) in cells.into_iter().zip(portals) {
            mesh.cells.push(Cell {
                region,
                first_vert: mesh.verts.len() as u32,
                vert_count: polygon.len() as u32,
                first_portal: mesh.portals.len() as u32,
                portal_count: cell_portals.len() as u32,
            });
            mesh.verts.extend(polygon);
            mesh.portals.extend(cell_portals);
        }

        mesh.update_bounds();
        mesh
    }

    pub(crate) fn update_bounds(&mut self) {
        let (bmin, bmax) = polygon_bounds(&self.verts).unwrap_or((Vec3::ZERO, Vec3::ZERO));
        self.bmin = bmin;
        self.bmax = bmax;
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.verts.len()
    }

    /// Number of directed portals
    pub fn portal_count(&self) -> usize {
        self.portals.len()
    }

    /// Bounds of every vertex
    pub fn bounds(&self) -> (Vec3, Vec3) {
        (self.bmin, self.bmax)
    }

    /// Boundary of a cell
    pub fn cell_polygon(&self, cell: usize) -> Option<&[Vec3]> {
        self.cells.get(cell).map(|c| &self.verts[c.verts()])
    }

    /// Outgoing portals of a cell, sorted by neighbor
    pub fn cell_portals(&self, cell: usize) -> Option<&[Portal]> {
        self.cells.get(cell).map(|c| &self.portals[c.portals()])
    }

    /// Region a cell was baked from
    pub fn region_of(&self, cell: usize) -> Option<&Region> {
        self.cells
            .get(cell)
            .and_then(|c| self.regions.get(c.region as usize))
    }

    /// Cells baked from one region
    pub fn cells_of_region(&self, region: usize) -> impl Iterator<Item = usize> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(move |(_, c)| c.region as usize == region)
            .map(|(i, _)| i)
    }

    /// Finds the cell a position belongs to
    pub fn locate(&self, pos: Vec3, config: &UnwalkConfig) -> Option<usize> {
        locate(self, pos, config)
    }

    /// Finds a path between two positions over the mesh cells
    pub fn seek(
        &self,
        start: Vec3,
        end: Vec3,
        config: &UnwalkConfig,
    ) -> std::result::Result<SeekPath, PathNotFound> {
        seek(self, start, end, config)
    }

    /// Saves the mesh to a `.navmesh` file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let data = self.to_bytes()?;
        std::fs::write(&path, &data)?;
        log::info!(
            "saved navmesh with {} cells ({} bytes) to {}",
            self.cells.len(),
            data.len(),
            path.as_ref().display()
        );
        Ok(())
    }

    /// Loads a mesh from a `.navmesh` file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(&path)?;
        let mesh = Self::from_bytes(&data)?;
        log::info!(
            "loaded navmesh with {} cells from {}",
            mesh.cells.len(),
            path.as_ref().display()
        );
        Ok(mesh)
    }
}

impl SeekGraph for NavMesh {
    fn node_count(&self) -> usize {
        self.cells.len()
    }

    fn polygon(&self, node: usize) -> &[Vec3] {
        &self.verts[self.cells[node].verts()]
    }

    fn portals(&self, node: usize) -> &[Portal] {
        &self.portals[self.cells[node].portals()]
    }

    fn footprint(&self, node: usize) -> f32 {
        self.regions
            .get(self.cells[node].region as usize)
            .map_or(0.0, |region| region.footprint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f32, z: f32) -> Vec<Vec3> {
        vec![
            Vec3::new(x, 0.0, z),
            Vec3::new(x + 1.0, 0.0, z),
            Vec3::new(x + 1.0, 0.0, z + 1.0),
            Vec3::new(x, 0.0, z + 1.0),
        ]
    }

    fn two_cells() -> NavMesh {
        let shared = (Vec3::new(1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 1.0));
        NavMesh::from_cells(
            vec![
                Region {
                    group: 0,
                    area: 0,
                    footprint: 1.0,
                },
                Region {
                    group: 0,
                    area: 1,
                    footprint: 1.0,
                },
            ],
            vec![(0, square(0.0, 0.0)), (1, square(1.0, 0.0))],
            vec![
                vec![Portal {
                    neighbor: 1,
                    left: shared.0,
                    right: shared.1,
                    explicit: false,
                }],
                vec![Portal {
                    neighbor: 0,
                    left: shared.0,
                    right: shared.1,
                    explicit: false,
                }],
            ],
        )
    }

    #[test]
    fn test_layout_is_flattened() {
        let mesh = two_cells();
        assert_eq!(mesh.cell_count(), 2);
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.portal_count(), 2);
        assert_eq!(mesh.cells()[1].first_vert, 4);
        assert_eq!(mesh.cell_polygon(1).unwrap()[0], Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(mesh.cell_portals(0).unwrap()[0].neighbor, 1);
        assert_eq!(mesh.region_of(1).unwrap().area_index(), AreaIndex::new(0, 1));
        assert_eq!(mesh.bounds(), (Vec3::ZERO, Vec3::new(2.0, 0.0, 1.0)));
        assert!(mesh.cell_polygon(2).is_none());
        assert_eq!(mesh.cells_of_region(1).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_seek_crosses_portal_midpoint() {
        let mesh = two_cells();
        let config = UnwalkConfig::default();
        let path = mesh
            .seek(Vec3::new(0.5, 0.0, 0.5), Vec3::new(1.5, 0.0, 0.5), &config)
            .unwrap();
        assert_eq!(path.nodes, vec![0, 1]);
        assert_eq!(path.waypoints[1], Vec3::new(1.0, 0.0, 0.5));
        assert_eq!(mesh.locate(Vec3::new(1.5, 0.0, 0.2), &config), Some(1));
    }

    #[test]
    fn test_empty_mesh() {
        let mesh = NavMesh::default();
        assert!(mesh.is_empty());
        assert_eq!(
            mesh.seek(Vec3::ZERO, Vec3::ONE, &UnwalkConfig::default()),
            Err(PathNotFound::StartUnresolved)
        );
    }
}
