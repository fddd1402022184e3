//! Authored navigation areas
//!
//! Areas are polygons drawn point by point, grouped into [`AreaGroup`]s. Their
//! connectivity is never stored: [`AdjacencyCache`] derives it from shared
//! boundaries and explicit links whenever the polygons change.

mod adjacency;
mod area;
mod area_group;
mod authoring_format;
mod cursor;
mod point;
mod scene;

pub use adjacency::{AdjacencyCache, AdjacencyGraph, AreaIndex, AreaKey, AreaLink, GraphNode};
pub use area::{Area, AreaId, MIN_SEARCHABLE_POINTS};
pub use area_group::{AreaGroup, GroupId};
pub use authoring_format::{
    AreaRecord, AuthoringDocument, GroupRecord, LinkRecord, PointRecord, AUTHORING_EXTENSION,
    AUTHORING_FORMAT, AUTHORING_VERSION,
};
pub use cursor::{Cursor, Selection};
pub use point::Point;
pub use scene::{attach_all, NoScene, PointLocation, SceneSink};
