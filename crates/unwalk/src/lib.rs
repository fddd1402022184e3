//! Polygon area graphs with path search and navmesh baking
//!
//! [`AreaGraphManager`] is the entry point: it owns groups of authored areas,
//! derives their adjacency, answers Seek queries, bakes runtime meshes and
//! persists both the `.unwalk` authoring format and the `.navmesh` runtime
//! format.

mod manager;

pub use manager::{AreaGraphManager, AreaPath};

pub use unwalk_area::{
    AdjacencyGraph, Area, AreaGroup, AreaId, AreaIndex, AreaKey, Cursor, GroupId, NoScene, Point,
    PointLocation, SceneSink, Selection, AUTHORING_EXTENSION,
};
pub use unwalk_common::{Error, IndexKind, PathNotFound, Result, SeekPath, UnwalkConfig};
pub use unwalk_navmesh::{BakeReport, NavMesh, SkipReason, SkippedArea, NAVMESH_EXTENSION};
