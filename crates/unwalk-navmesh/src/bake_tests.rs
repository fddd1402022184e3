//! Bake scenarios from authored groups to searchable meshes

#[cfg(test)]
mod tests {
    use glam::Vec3;
    use unwalk_area::{
        AdjacencyCache, AdjacencyGraph, AreaGroup, AreaId, AreaIndex, AreaKey, AreaLink, GroupId,
        Point,
    };
    use unwalk_common::{Error, Result, SeekGraph, UnwalkConfig};

    use crate::{NavMesh, NavMeshBaker, SkipReason, SkippedArea};

    fn points(coords: &[(f32, f32)]) -> Vec<Point> {
        coords
            .iter()
            .map(|&(x, z)| Point::new(Vec3::new(x, 0.0, z)))
            .collect()
    }

    fn rect(x: f32, z: f32, w: f32, h: f32) -> Vec<Point> {
        points(&[(x, z), (x + w, z), (x + w, z + h), (x, z + h)])
    }

    fn group(areas: Vec<Vec<Point>>) -> AreaGroup {
        group_with_id(0, areas)
    }

    fn group_with_id(id: u64, areas: Vec<Vec<Point>>) -> AreaGroup {
        let mut group = AreaGroup::with_id(GroupId::new(id), format!("floor {id}"));
        for area in areas {
            group.push_area(area);
        }
        group
    }

    fn graph_of(groups: &[AreaGroup], links: &[AreaLink]) -> AdjacencyGraph {
        AdjacencyCache::new()
            .refresh(groups, links, UnwalkConfig::default().edge_tolerance)
            .clone()
    }

    fn bake(groups: &[AreaGroup], links: &[AreaLink]) -> Result<NavMesh> {
        let (mesh, _) = NavMeshBaker::default().bake(&graph_of(groups, links))?;
        Ok(mesh)
    }

    fn l_shape() -> Vec<Point> {
        points(&[
            (0.0, 0.0),
            (2.0, 0.0),
            (2.0, 1.0),
            (1.0, 1.0),
            (1.0, 2.0),
            (0.0, 2.0),
        ])
    }

    #[test]
    fn test_adjacent_rectangles_share_a_portal() -> Result<()> {
        let groups = vec![group(vec![rect(0.0, 0.0, 2.0, 2.0), rect(2.0, 0.0, 2.0, 2.0)])];
        let mesh = bake(&groups, &[])?;

        assert_eq!(mesh.cell_count(), 2);
        assert_eq!(mesh.regions().len(), 2);
        assert_eq!(mesh.cell_portals(0).unwrap().len(), 1);
        assert_eq!(mesh.cell_portals(0).unwrap()[0].neighbor, 1);
        assert_eq!(mesh.cell_portals(1).unwrap()[0].neighbor, 0);

        let config = UnwalkConfig::default();
        let path = mesh
            .seek(Vec3::new(1.0, 0.0, 1.0), Vec3::new(3.0, 0.0, 1.0), &config)
            .unwrap();
        assert_eq!(
            path.waypoints,
            vec![
                Vec3::new(1.0, 0.0, 1.0),
                Vec3::new(2.0, 0.0, 1.0),
                Vec3::new(3.0, 0.0, 1.0)
            ]
        );
        Ok(())
    }

    #[test]
    fn test_concave_area_is_split_and_stays_connected() -> Result<()> {
        let groups = vec![group(vec![l_shape()])];
        let mesh = bake(&groups, &[])?;

        assert_eq!(mesh.regions().len(), 1);
        assert_eq!(mesh.cell_count(), 4);
        for cell in 0..mesh.cell_count() {
            assert_eq!(mesh.cell_polygon(cell).unwrap().len(), 3);
            assert_eq!(mesh.region_of(cell).unwrap().area_index(), AreaIndex::new(0, 0));
            assert!(!mesh.cell_portals(cell).unwrap().is_empty());
        }
        // Triangles of one polygon form a tree
        assert_eq!(mesh.portal_count(), 2 * (mesh.cell_count() - 1));

        let config = UnwalkConfig::default();
        let start = Vec3::new(1.8, 0.0, 0.5);
        let end = Vec3::new(0.5, 0.0, 1.8);
        let path = mesh.seek(start, end, &config).unwrap();
        assert_eq!(path.waypoints.first(), Some(&start));
        assert_eq!(path.waypoints.last(), Some(&end));
        Ok(())
    }

    #[test]
    fn test_degenerate_areas_are_skipped() -> Result<()> {
        let groups = vec![group(vec![
            rect(0.0, 0.0, 1.0, 1.0),
            points(&[(0.0, 3.0), (1.0, 3.0)]),
            points(&[(0.0, 5.0), (1.0, 5.0), (2.0, 5.0)]),
            points(&[(4.0, 4.0), (4.0, 4.0), (5.0, 4.0)]),
        ])];
        let (mesh, report) = NavMeshBaker::default().bake(&graph_of(&groups, &[]))?;

        assert_eq!(mesh.cell_count(), 1);
        assert_eq!(report.regions, 1);
        assert_eq!(
            report.skipped,
            vec![
                SkippedArea {
                    index: AreaIndex::new(0, 1),
                    reason: SkipReason::TooFewPoints(2),
                },
                SkippedArea {
                    index: AreaIndex::new(0, 2),
                    reason: SkipReason::ZeroArea,
                },
                SkippedArea {
                    index: AreaIndex::new(0, 3),
                    reason: SkipReason::TooFewPoints(2),
                },
            ]
        );
        Ok(())
    }

    #[test]
    fn test_collinear_area_is_skipped_not_rejected() -> Result<()> {
        let line = points(&[(5.0, 5.0), (6.0, 5.0), (7.0, 5.0), (8.0, 5.0)]);
        let groups = vec![group(vec![rect(0.0, 0.0, 2.0, 2.0), line])];
        let (mesh, report) = NavMeshBaker::default().bake(&graph_of(&groups, &[]))?;

        assert_eq!(mesh.cell_count(), 1);
        assert_eq!(report.regions, 1);
        assert_eq!(
            report.skipped,
            vec![SkippedArea {
                index: AreaIndex::new(0, 1),
                reason: SkipReason::ZeroArea,
            }]
        );
        Ok(())
    }

    #[test]
    fn test_self_intersecting_area_rejects_the_bake() {
        let bowtie = points(&[(0.0, 0.0), (2.0, 2.0), (2.0, 0.0), (0.0, 2.0)]);
        let groups = vec![
            group_with_id(0, vec![rect(5.0, 5.0, 1.0, 1.0)]),
            group_with_id(1, vec![rect(8.0, 8.0, 1.0, 1.0), bowtie]),
        ];
        assert!(matches!(
            bake(&groups, &[]),
            Err(Error::SelfIntersecting { group: 1, area: 1 })
        ));
    }

    #[test]
    fn test_bake_is_deterministic() -> Result<()> {
        let groups = vec![group(vec![
            l_shape(),
            rect(2.0, 0.0, 2.0, 1.0),
            rect(6.0, 6.0, 1.0, 1.0),
        ])];
        let links = vec![AreaLink::new(
            AreaKey::new(GroupId::new(0), AreaId::new(2)),
            AreaKey::new(GroupId::new(0), AreaId::new(0)),
        )];

        let first = bake(&groups, &links)?.to_bytes()?;
        let second = bake(&groups, &links)?.to_bytes()?;
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn test_explicit_link_connects_distant_areas() -> Result<()> {
        let groups = vec![group(vec![rect(0.0, 0.0, 1.0, 1.0), rect(5.0, 0.0, 1.0, 1.0)])];
        let config = UnwalkConfig::default();
        let start = Vec3::new(0.5, 0.0, 0.5);
        let end = Vec3::new(5.5, 0.0, 0.5);

        let unlinked = bake(&groups, &[])?;
        assert!(unlinked.seek(start, end, &config).is_err());

        let link = AreaLink::new(
            AreaKey::new(GroupId::new(0), AreaId::new(0)),
            AreaKey::new(GroupId::new(0), AreaId::new(1)),
        );
        let mesh = bake(&groups, &[link])?;
        let portal = mesh.cell_portals(0).unwrap()[0];
        assert!(portal.explicit);
        assert_eq!(portal.left, Vec3::new(3.0, 0.0, 0.5));

        let path = mesh.seek(start, end, &config).unwrap();
        assert_eq!(path.nodes, vec![0, 1]);
        assert_eq!(path.waypoints[1], Vec3::new(3.0, 0.0, 0.5));
        Ok(())
    }

    #[test]
    fn test_inner_area_wins_over_frame() -> Result<()> {
        let mut floor = group(vec![rect(0.0, 0.0, 2.0, 2.0)]);
        floor.create_frame_area(1.0);
        let mesh = bake(&[floor], &[])?;

        assert_eq!(mesh.regions().len(), 2);
        let cell = mesh
            .locate(Vec3::new(1.0, 0.0, 1.0), &UnwalkConfig::default())
            .unwrap();
        assert_eq!(mesh.region_of(cell).unwrap().area, 0);

        let outside = mesh
            .locate(Vec3::new(-0.5, 0.0, -0.5), &UnwalkConfig::default())
            .unwrap();
        assert_eq!(mesh.region_of(outside).unwrap().area, 1);
        assert!(mesh.footprint(cell) < mesh.footprint(outside));
        Ok(())
    }
}
