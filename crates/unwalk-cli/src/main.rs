//! CLI utility for baking and querying unwalk area graphs

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glam::Vec3;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use unwalk::{AreaGraphManager, NoScene, UnwalkConfig, NAVMESH_EXTENSION};

/// A CLI utility for authored area graphs and their baked navigation meshes
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Bake an authoring file into a navigation mesh
    Bake {
        /// Input authoring file (.unwalk)
        #[clap(long, value_parser)]
        input: PathBuf,

        /// Output navigation mesh file (.navmesh)
        #[clap(long, value_parser)]
        output: PathBuf,

        /// Tolerance configuration (JSON)
        #[clap(long, value_parser)]
        config: Option<PathBuf>,
    },

    /// Find a path over authored areas or a baked navigation mesh
    Seek {
        /// Input file (.unwalk or .navmesh)
        #[clap(long, value_parser)]
        input: PathBuf,

        /// Start position (x,y,z)
        #[clap(long, value_parser = parse_vector)]
        start: Vec3,

        /// End position (x,y,z)
        #[clap(long, value_parser = parse_vector)]
        end: Vec3,

        /// Output path file
        #[clap(long, value_parser)]
        output: Option<PathBuf>,

        /// Tolerance configuration (JSON)
        #[clap(long, value_parser)]
        config: Option<PathBuf>,
    },

    /// Print a summary of an authoring file or a navigation mesh
    Info {
        /// Input file (.unwalk or .navmesh)
        #[clap(long, value_parser)]
        input: PathBuf,
    },
}

/// Parses an `x,y,z` position
fn parse_vector(s: &str) -> Result<Vec3, String> {
    let components = s
        .split(',')
        .map(|part| part.trim().parse::<f32>().map_err(|e| format!("'{part}': {e}")))
        .collect::<Result<Vec<f32>, String>>()?;

    match components[..] {
        [x, y, z] => Ok(Vec3::new(x, y, z)),
        _ => Err(format!(
            "expected 3 comma-separated components, got {}",
            components.len()
        )),
    }
}

fn is_nav_mesh(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(NAVMESH_EXTENSION))
}

/// Creates a manager, applying a configuration file when one is given
fn create_manager(config: Option<&Path>) -> Result<AreaGraphManager> {
    let config = match config {
        Some(path) => UnwalkConfig::load_from_json(path)
            .with_context(|| format!("Failed to load configuration: {}", path.display()))?,
        None => UnwalkConfig::default(),
    };
    Ok(AreaGraphManager::with_config(config)?)
}

fn load_groups(manager: &mut AreaGraphManager, input: &Path) -> Result<usize> {
    manager
        .load_area_groups(input, &mut NoScene)
        .with_context(|| format!("Failed to load authoring file: {}", input.display()))
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    match args.command {
        Commands::Bake {
            input,
            output,
            config,
        } => bake(&input, &output, config.as_deref()),
        Commands::Seek {
            input,
            start,
            end,
            output,
            config,
        } => seek(&input, start, end, output.as_deref(), config.as_deref()),
        Commands::Info { input } => info(&input),
    }
}

/// Bake an authoring file into a navigation mesh
fn bake(input: &Path, output: &Path, config: Option<&Path>) -> Result<()> {
    let mut manager = create_manager(config)?;

    println!("Loading areas from {}...", input.display());
    let points = load_groups(&mut manager, input)?;
    println!(
        "Loaded {} groups with {} points",
        manager.group_count(),
        points
    );

    println!("Baking navigation mesh...");
    let report = manager
        .create_nav_mesh()
        .context("Failed to bake navigation mesh")?;
    println!(
        "Navigation mesh baked: {} regions, {} cells, {} portals",
        report.regions, report.cells, report.portals
    );
    for skipped in &report.skipped {
        println!("Skipped area {}: {}", skipped.index, skipped.reason);
    }

    println!("Saving navigation mesh to {}...", output.display());
    manager
        .save_nav_mesh(output)
        .with_context(|| format!("Failed to save navigation mesh: {}", output.display()))?;

    Ok(())
}

/// Find a path and print or save its waypoints
fn seek(
    input: &Path,
    start: Vec3,
    end: Vec3,
    output: Option<&Path>,
    config: Option<&Path>,
) -> Result<()> {
    let mut manager = create_manager(config)?;

    println!("Finding path from {:?} to {:?}...", start, end);
    let waypoints = if is_nav_mesh(input) {
        println!("Loading navigation mesh from {}...", input.display());
        manager
            .load_nav_mesh(input)
            .with_context(|| format!("Failed to load navigation mesh: {}", input.display()))?;
        let path = manager
            .seek_nav_mesh(start, end)
            .context("Failed to find path")?;
        println!("Found path over {} cells", path.nodes.len());
        path.waypoints
    } else {
        println!("Loading areas from {}...", input.display());
        load_groups(&mut manager, input)?;
        let path = manager.seek(start, end).context("Failed to find path")?;
        let areas: Vec<String> = path.areas.iter().map(ToString::to_string).collect();
        println!("Found path over areas {}", areas.join(" -> "));
        path.waypoints
    };

    if let Some(output_path) = output {
        println!("Saving path to {}...", output_path.display());

        let mut file = File::create(output_path)
            .with_context(|| format!("Failed to create output file: {}", output_path.display()))?;

        writeln!(file, "# Path from {:?} to {:?}", start, end)?;
        writeln!(file, "# {} waypoints", waypoints.len())?;

        for waypoint in &waypoints {
            writeln!(file, "{},{},{}", waypoint.x, waypoint.y, waypoint.z)?;
        }
    } else {
        println!("Path:");
        for (i, waypoint) in waypoints.iter().enumerate() {
            println!("{}: {},{},{}", i, waypoint.x, waypoint.y, waypoint.z);
        }
    }

    Ok(())
}

/// Print a summary of either file format
fn info(input: &Path) -> Result<()> {
    let mut manager = AreaGraphManager::new();

    if is_nav_mesh(input) {
        manager
            .load_nav_mesh(input)
            .with_context(|| format!("Failed to load navigation mesh: {}", input.display()))?;
        let Some(mesh) = manager.nav_mesh() else {
            return Ok(());
        };
        let (bmin, bmax) = mesh.bounds();
        println!("Navigation mesh {}", input.display());
        println!("  regions:  {}", mesh.regions().len());
        println!("  cells:    {}", mesh.cell_count());
        println!("  vertices: {}", mesh.vertex_count());
        println!("  portals:  {}", mesh.portal_count());
        println!("  bounds:   min={:?}, max={:?}", bmin, bmax);
        return Ok(());
    }

    let points = load_groups(&mut manager, input)?;
    println!("Authoring file {}", input.display());
    println!("  groups: {}", manager.group_count());
    for group in manager.groups() {
        println!("    '{}': {} areas", group.name(), group.len());
    }
    println!("  points: {}", points);
    println!("  links:  {}", manager.links().len());
    println!("  adjacent pairs: {}", manager.adjacency().edge_count());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vector() {
        assert_eq!(parse_vector("1, 2.5,-3"), Ok(Vec3::new(1.0, 2.5, -3.0)));
        assert!(parse_vector("1,2").is_err());
        assert!(parse_vector("1,2,3,4").is_err());
        assert!(parse_vector("1,y,3").is_err());
    }

    #[test]
    fn test_nav_mesh_inputs_are_detected_by_extension() {
        assert!(is_nav_mesh(Path::new("level.navmesh")));
        assert!(is_nav_mesh(Path::new("LEVEL.NAVMESH")));
        assert!(!is_nav_mesh(Path::new("level.unwalk")));
        assert!(!is_nav_mesh(Path::new("level")));
    }
}
