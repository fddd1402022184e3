//! Common utilities and data structures shared by the area graph, the baked navmesh and the CLI

mod config;
mod geometry;
mod seek;

pub use config::UnwalkConfig;
pub use geometry::*;
pub use seek::{locate, seek, Portal, SeekGraph, SeekPath};

/// Represents a 3D position (Y up)
pub type Vec3 = glam::Vec3;

/// Kind of collection an index addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    /// Index into the manager's group list
    Group,
    /// Index into a group's area list
    Area,
    /// Index into an area's point list
    Point,
}

impl std::fmt::Display for IndexKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexKind::Group => write!(f, "group"),
            IndexKind::Area => write!(f, "area"),
            IndexKind::Point => write!(f, "point"),
        }
    }
}

/// Reason a Seek query could not produce a path
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathNotFound {
    #[error("start position is not inside or near any area")]
    StartUnresolved,

    #[error("end position is not inside or near any area")]
    EndUnresolved,

    #[error("start and end areas are not connected")]
    Disconnected,
}

/// Error types for the library
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid {kind} index {index} (count {count})")]
    InvalidIndex {
        kind: IndexKind,
        index: usize,
        count: usize,
    },

    #[error("malformed file: {0}")]
    MalformedFile(String),

    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error("area {area} of group {group} has a self-intersecting boundary")]
    SelfIntersecting { group: usize, area: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("no navigation mesh has been baked or loaded")]
    NotBaked,

    #[error(transparent)]
    PathNotFound(#[from] PathNotFound),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for an out-of-range index error
    pub fn invalid_index(kind: IndexKind, index: usize, count: usize) -> Self {
        Error::InvalidIndex { kind, index, count }
    }
}

/// Result type for unwalk operations
pub type Result<T> = std::result::Result<T, Error>;
