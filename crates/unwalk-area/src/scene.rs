//! Scene objects mirroring authored points
//!
//! Editors keep one scene object per point. Loading an authoring file
//! replaces every point, so the loader reports each of them through a
//! [`SceneSink`] owned by the caller.

use glam::Vec3;

use crate::{AreaGroup, AreaIndex};

/// Where a point lives in the group collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointLocation {
    pub area: AreaIndex,
    pub point: usize,
}

/// Receiver for scene object updates
pub trait SceneSink {
    /// Drops every scene object previously attached
    fn clear(&mut self) {}

    /// Attaches the scene object of one point
    fn attach_point(&mut self, location: PointLocation, position: Vec3, name: Option<&str>);
}

/// Sink for callers without a scene
#[derive(Debug, Clone, Copy, Default)]
pub struct NoScene;

impl SceneSink for NoScene {
    fn attach_point(&mut self, _location: PointLocation, _position: Vec3, _name: Option<&str>) {}
}

/// Clears the sink, then reports every point of every group in order.
///
/// Returns the number of points attached.
pub fn attach_all<S: SceneSink + ?Sized>(scene: &mut S, groups: &[AreaGroup]) -> usize {
    scene.clear();
    let mut attached = 0;
    for (g, group) in groups.iter().enumerate() {
        for (a, area) in group.areas().iter().enumerate() {
            for (p, point) in area.points().iter().enumerate() {
                let location = PointLocation {
                    area: AreaIndex::new(g, a),
                    point: p,
                };
                scene.attach_point(location, point.position(), point.name());
                attached += 1;
            }
        }
    }
    attached
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        cleared: usize,
        points: Vec<(PointLocation, Vec3, Option<String>)>,
    }

    impl SceneSink for Recorder {
        fn clear(&mut self) {
            self.cleared += 1;
            self.points.clear();
        }

        fn attach_point(&mut self, location: PointLocation, position: Vec3, name: Option<&str>) {
            self.points.push((location, position, name.map(str::to_string)));
        }
    }

    #[test]
    fn test_attach_all_reports_points_in_order() {
        let mut first = AreaGroup::new("a");
        first.create_area();
        let area = first.create_area();
        first.area_mut(area).unwrap().push(Vec3::X);
        first.area_mut(area).unwrap().push(Vec3::Z);
        let mut second = AreaGroup::new("b");
        second.create_area();
        second.area_mut(0).unwrap().push(Vec3::Y);

        let mut recorder = Recorder::default();
        recorder.points.push((
            PointLocation {
                area: AreaIndex::new(9, 9),
                point: 9,
            },
            Vec3::ZERO,
            None,
        ));

        let attached = attach_all(&mut recorder, &[first, second]);
        assert_eq!(attached, 3);
        assert_eq!(recorder.cleared, 1);
        let locations: Vec<_> = recorder.points.iter().map(|(l, _, _)| *l).collect();
        assert_eq!(
            locations,
            vec![
                PointLocation { area: AreaIndex::new(0, 1), point: 0 },
                PointLocation { area: AreaIndex::new(0, 1), point: 1 },
                PointLocation { area: AreaIndex::new(1, 0), point: 0 },
            ]
        );
        assert_eq!(recorder.points[2].1, Vec3::Y);
    }
}
