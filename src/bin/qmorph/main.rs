//! qmorph CLI - convert triangle meshes into quad-dominant meshes.
//!
//! Usage: qmorph <COMMAND> [OPTIONS] <INPUT> [OUTPUT]
//!
//! Run `qmorph --help` for available commands. Set `RUST_LOG=debug` to follow
//! the engine step by step.

use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand};

use qmorph::algo::qmorph::{QMorph, QMorphOptions};
use qmorph::algo::stages::{CheckConsistency, PostProcess, WrapResidualTriangles};
use qmorph::algo::Progress;
use qmorph::io;
use qmorph::mesh::{ElementShape, Mesh};

#[derive(Parser)]
#[command(name = "qmorph")]
#[command(author, version, about = "Triangle to quad mesh conversion", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display mesh information
    Info {
        /// Input record file
        input: PathBuf,
    },

    /// Convert a triangle mesh into a quad-dominant mesh
    Convert {
        /// Input record file (triangles only)
        input: PathBuf,

        /// Output record file
        output: PathBuf,

        /// Leave node positions untouched
        #[arg(long)]
        no_smooth: bool,

        /// Stop after this many steps
        #[arg(long)]
        max_steps: Option<usize>,

        /// Side acceptance angle in degrees
        #[arg(long, default_value = "135")]
        side_angle: f64,

        /// Wrap leftover triangles as degenerate quads
        #[arg(long)]
        wrap_triangles: bool,
    },
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

        Commands::Convert {
            input,
            output,
            no_smooth,
            max_steps,
            side_angle,
            wrap_triangles,
        } => {
            let mut options = QMorphOptions::default()
                .with_smoothing(!no_smooth)
                .with_side_angle_threshold(side_angle.to_radians());
            if let Some(steps) = max_steps {
                options = options.with_max_steps(steps);
            }
            cmd_convert(&input, &output, options, wrap_triangles)?;
        }
    }

    Ok(())
}

/// Create a progress reporter that displays a progress bar on the terminal.
fn create_progress() -> Progress {
    // the front may grow for a while, so only ever move forward
    let max_percent = Arc::new(AtomicUsize::new(0));

    Progress::new(move |current, total, message| {
        if total == 0 {
            return;
        }

        let raw_percent = if current >= total {
            100
        } else {
            ((current * 100) + (total / 2)) / total
        };

        let previous = max_percent.fetch_max(raw_percent, Ordering::Relaxed);
        if raw_percent <= previous && raw_percent != 100 {
            return;
        }

        let bar_width = 30;
        let filled = (raw_percent * bar_width) / 100;
        let bar = "=".repeat(filled);
        let space = " ".repeat(bar_width - filled);

        eprint!("\r[{}{}] {:3}% {}", bar, space, raw_percent, message);
        let _ = std::io::stderr().flush();

        if current >= total && previous != 100 {
            eprintln!();
        }
    })
}

fn print_summary(mesh: &Mesh) {
    println!("Nodes: {}", mesh.num_nodes());
    println!("Edges: {}", mesh.num_edges());
    println!(
        "Elements: {} ({} triangles, {} quads)",
        mesh.num_elements(),
        mesh.num_triangles(),
        mesh.num_quads()
    );
}

fn cmd_info(input: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let mesh = io::load(input)?;

    println!("File: {}", input.display());
    print_summary(&mesh);

    let mut total_area = 0.0;
    let mut min_quality = f64::INFINITY;
    let mut max_quality = 0.0_f64;
    for el in mesh.element_ids() {
        let element = mesh.element(el);
        total_area += element.signed_area(&mesh);
        let q = element.distortion(&mesh);
        min_quality = min_quality.min(q);
        max_quality = max_quality.max(q);
    }
    println!("Area: {:.6}", total_area);
    println!("Element quality range: [{:.4}, {:.4}]", min_quality, max_quality);

    let chevron = QMorphOptions::default().chevron_angle;
    let chevrons = mesh
        .element_ids()
        .filter_map(|el| mesh.element(el).as_quad())
        .filter(|q| q.is_chevron(chevron))
        .count();
    if chevrons > 0 {
        println!("Chevron quads: {}", chevrons);
    }

    let boundary = mesh
        .edge_ids()
        .filter(|&e| mesh.edge(e).element_count() == 1)
        .count();
    println!("Boundary edges: {}", boundary);
    if boundary % 2 == 1 {
        println!("Note: odd boundary edge count, an all-quad result is impossible");
    }

    Ok(())
}

fn cmd_convert(
    input: &PathBuf,
    output: &PathBuf,
    options: QMorphOptions,
    wrap_triangles: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mesh = io::load(input)?;
    println!(
        "Loaded: {} nodes, {} triangles",
        mesh.num_nodes(),
        mesh.num_triangles()
    );

    let mut engine = QMorph::new(mesh, options)?;
    let progress = create_progress();

    let start = Instant::now();
    let stats = engine.run_with_progress(&progress)?;

    let mut wrap = WrapResidualTriangles;
    let mut check = CheckConsistency;
    let mut stages: Vec<&mut dyn PostProcess> = Vec::new();
    if wrap_triangles {
        stages.push(&mut wrap);
    }
    stages.push(&mut check);
    engine.post_process(&mut stages)?;
    let elapsed = start.elapsed();

    println!(
        "Steps: {} ({} quads, {} rejected, {} swaps kept)",
        stats.steps, stats.quads, stats.rejected, stats.swaps
    );
    if stats.chevrons > 0 {
        println!("Chevron quads: {}", stats.chevrons);
    }
    let mesh = engine.into_mesh();
    print_summary(&mesh);

    io::save(&mesh, output)?;
    println!("Saved: {} ({:.2?})", output.display(), elapsed);

    Ok(())
}
