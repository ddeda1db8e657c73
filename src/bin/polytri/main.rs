//! Polytri CLI - polygon mesh triangulation tool.
//!
//! Usage: polytri <COMMAND> [OPTIONS] <INPUT> [OUTPUT]
//!
//! Run `polytri --help` for available commands. Set `RUST_LOG=debug` for
//! per-face details.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};

use polytri::algo::triangulate::{self, Objective, TriangulateOptions};
use polytri::io;
use polytri::mesh::HalfEdgeMesh;

#[derive(Parser)]
#[command(name = "polytri")]
#[command(author, version, about = "Optimal polygon triangulation CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display mesh information
    Info {
        /// Input mesh file
        input: PathBuf,
    },

    /// Triangulate every polygon of a mesh
    Triangulate {
        /// Input mesh file
        input: PathBuf,

        /// Output mesh file
        output: PathBuf,

        /// Quantity optimized per face
        #[arg(short, long, value_enum, default_value = "min-area")]
        objective: ObjectiveArg,

        /// Skip faces with non-manifold corners instead of failing
        #[arg(long)]
        skip_invalid: bool,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum ObjectiveArg {
    /// Minimize the sum of squared triangle areas
    MinArea,
    /// Maximize the smallest triangle angle
    MaxAngle,
}

impl From<ObjectiveArg> for Objective {
    fn from(arg: ObjectiveArg) -> Self {
        match arg {
            ObjectiveArg::MinArea => Objective::MinArea,
            ObjectiveArg::MaxAngle => Objective::MaxAngle,
        }
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Info { input } => {
            cmd_info(&input)?;
        }

        Commands::Triangulate {
            input,
            output,
            objective,
            skip_invalid,
        } => {
            cmd_triangulate(&input, &output, objective.into(), skip_invalid)?;
        }
    }

    Ok(())
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mesh: HalfEdgeMesh = io::load(input)?;

    println!("File: {}", input.display());
    println!("Vertices: {}", mesh.num_vertices());
    println!("Edges: {}", mesh.num_edges());
    println!("Faces: {}", mesh.num_faces());
    println!("Half-edges: {}", mesh.num_halfedges());
    println!("Surface area: {:.6}", mesh.surface_area());

    if let Some((min, max)) = mesh.bounding_box() {
        println!(
            "Bounding box: ({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3})",
            min.x, min.y, min.z, max.x, max.y, max.z
        );
    }

    // Face valence histogram
    let mut valences: BTreeMap<usize, usize> = BTreeMap::new();
    for f in mesh.face_ids() {
        *valences.entry(mesh.face_valence(f)).or_insert(0) += 1;
    }
    println!("Face valences:");
    for (n, count) in &valences {
        println!("  {}-gon: {}", n, count);
    }

    if mesh.is_triangle_mesh() {
        println!("Mesh type: Triangle mesh");
    } else {
        let work: usize = valences
            .iter()
            .filter(|(n, _)| **n > 3)
            .map(|(n, count)| (n - 3) * count)
            .sum();
        println!("Mesh type: Polygon mesh ({} diagonals to insert)", work);
    }

    let non_manifold = mesh.vertex_ids().filter(|&v| !mesh.is_manifold(v)).count();
    if non_manifold > 0 {
        println!("Non-manifold vertices: {}", non_manifold);
    }

    let boundary = mesh.vertex_ids().filter(|&v| mesh.is_boundary_vertex(v)).count();
    if boundary == 0 {
        println!("Topology: Closed (no boundary)");
    } else {
        println!("Topology: Open ({} boundary vertices)", boundary);
    }

    Ok(())
}

fn cmd_triangulate(
    input: &Path,
    output: &Path,
    objective: Objective,
    skip_invalid: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut mesh: HalfEdgeMesh = io::load(input)?;

    println!("Loaded: {} vertices, {} faces", mesh.num_vertices(), mesh.num_faces());

    let options = TriangulateOptions::new(objective).with_skip_invalid_faces(skip_invalid);

    println!("Triangulating ({:?})...", objective);
    let start = Instant::now();
    let report = triangulate::triangulate_with_options(&mut mesh, &options)?;
    let elapsed = start.elapsed();

    println!(
        "Result: {} faces ({} split, {} edges inserted) in {:.2?}",
        mesh.num_faces(),
        report.faces_split,
        report.chords_inserted,
        elapsed
    );

    if !report.skipped_chords.is_empty() {
        println!("Skipped chords: {}", report.skipped_chords.len());
    }
    if !report.invalid_faces.is_empty() {
        println!("Invalid faces left as-is: {}", report.invalid_faces.len());
    }

    io::save(&mesh, output)?;
    println!("Saved: {}", output.display());

    Ok(())
}
