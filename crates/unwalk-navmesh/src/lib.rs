//! Baked navigation meshes
//!
//! [`NavMeshBaker`] turns the authored area graph into a [`NavMesh`] of convex
//! cells that can be saved to the `.navmesh` format and searched at runtime
//! without any authoring data.

mod bake_tests;
mod binary_format;
mod nav_mesh;
mod nav_mesh_builder;
mod triangulation;

pub use binary_format::{NAVMESH_EXTENSION, NAVMESH_MAGIC, NAVMESH_VERSION};
pub use nav_mesh::{Cell, NavMesh, Region};
pub use nav_mesh_builder::{BakeReport, NavMeshBaker, SkipReason, SkippedArea};
pub use triangulation::triangulate;
