use super::CliError;
use super::helpers::{SolverFlags, print_json};
use anyhow::Context;
use lazymole_core::domain::{CellSize, Dimensions, GridGeometry, Refinement, RunResult};
use lazymole_core::modules::bundle::{DEFAULT_CONFIG_NAME, DEFAULT_FOLDER_NAME, RunBundle};
use lazymole_core::modules::field::read_field_artifact;
use lazymole_core::modules::result::{extract_and_summarize, extract_run_result};
use lazymole_core::modules::rundir::RunDirectory;
use lazymole_core::modules::solver::DEFAULT_EXECUTABLE;
use lazymole_core::pipeline::scenario::{channel_masks, uniform_field};
use lazymole_core::{ConnectivityPipeline, PipelineOptions};
use ndarray::Array3;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tracing::info;

#[derive(clap::Args)]
pub(super) struct ChannelArgs {
    /// Directory the run folder is created in
    #[arg(long, default_value = ".")]
    base_path: PathBuf,

    /// Cell size along x
    #[arg(long, default_value_t = 1.0)]
    dx: f64,

    /// Cell size along y
    #[arg(long, default_value_t = 1.0)]
    dy: f64,

    /// Cell size along z
    #[arg(long, default_value_t = 0.5)]
    dz: f64,

    /// Cell count along x
    #[arg(long, default_value_t = 40)]
    nx: usize,

    /// Cell count along y
    #[arg(long, default_value_t = 20)]
    ny: usize,

    /// Cell count along z
    #[arg(long, default_value_t = 10)]
    nz: usize,

    /// Refinement factor along x
    #[arg(long, default_value_t = 1)]
    refx: u32,

    /// Refinement factor along y
    #[arg(long, default_value_t = 1)]
    refy: u32,

    /// Refinement factor along z
    #[arg(long, default_value_t = 1)]
    refz: u32,

    /// Field file with one value per line in x-fastest order
    #[arg(long)]
    field: Option<PathBuf>,

    /// Header lines to skip when reading --field
    #[arg(long, default_value_t = 0, requires = "field")]
    field_skip: usize,

    /// Value of every cell when no --field is given
    #[arg(
        long,
        default_value_t = 0.0,
        allow_negative_numbers = true,
        conflicts_with = "field"
    )]
    uniform_value: f64,

    /// Field values are not log-transformed
    #[arg(long)]
    linear: bool,

    /// Header lines the solver skips in the field file
    #[arg(long, default_value_t = 0)]
    skip: usize,

    /// Name of the solver configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_NAME)]
    config_name: String,

    /// Name of the run folder under --base-path
    #[arg(long, default_value = DEFAULT_FOLDER_NAME)]
    folder_name: String,

    /// Solver executable
    #[arg(long, default_value = DEFAULT_EXECUTABLE)]
    exe: PathBuf,

    /// Stop once the run bundle is written
    #[arg(long)]
    prepare_only: bool,

    /// Print the outcome as JSON
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    solver: SolverFlags,
}

#[derive(clap::Args)]
pub(super) struct CheckArgs {
    /// Run directory holding the bundle
    #[arg(long)]
    run_dir: PathBuf,

    /// Name of the solver configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_NAME)]
    config_name: String,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
pub(super) struct ExtractArgs {
    /// Saved solver console output
    #[arg(value_name = "LOG")]
    log: PathBuf,

    /// Write the two-line run summary here
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChannelOutcome {
    run_dir: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<RunResult>,
}

pub(super) fn run_channel_command(args: ChannelArgs) -> Result<i32, CliError> {
    let cell_size = CellSize::new(args.dx, args.dy, args.dz);
    let dimensions = Dimensions::new(args.nx, args.ny, args.nz);
    let refinement = Refinement::new(args.refx, args.refy, args.refz);
    GridGeometry::new(cell_size, dimensions, refinement)?;

    let field: Array3<f64> = match &args.field {
        Some(path) => read_field_artifact(path, dimensions, args.field_skip)?,
        None => uniform_field(dimensions, args.uniform_value),
    };
    let masks = channel_masks(dimensions);

    let options = PipelineOptions {
        refinement,
        skip: args.skip,
        log: !args.linear,
        config_name: args.config_name,
        folder_name: args.folder_name,
        executable: args.exe,
        solver: args.solver.into_settings()?,
    };
    let pipeline = ConnectivityPipeline::construct(
        &args.base_path,
        &field,
        &masks.source,
        &masks.target,
        cell_size,
        dimensions,
        options,
    )?;

    let result = if args.prepare_only {
        None
    } else {
        Some(pipeline.run()?)
    };

    let outcome = ChannelOutcome {
        run_dir: pipeline.run_dir().to_path_buf(),
        result,
    };
    if args.json {
        print_json(&outcome)?;
    } else {
        println!("Run bundle: {}", outcome.run_dir.display());
        if let Some(result) = &outcome.result {
            print_result(result);
        }
    }
    Ok(0)
}

pub(super) fn run_check_command(args: CheckArgs) -> Result<i32, CliError> {
    let run_dir = RunDirectory::existing(&args.run_dir)?;
    let report = RunBundle::check(run_dir, &args.config_name)?;

    if args.json {
        print_json(&report)?;
    } else {
        println!("Run bundle: {}", report.run_dir.display());
        println!(
            "Grid: {} x {} x {} ({} field values, log = {})",
            report.nx, report.ny, report.nz, report.field_values, report.log_field
        );
        println!("Source cells: {}", report.source_cells);
        println!("Target cells: {}", report.target_cells);
        if report.solver_outputs.is_empty() {
            println!("Solver outputs: none yet");
        } else {
            let outputs = report
                .solver_outputs
                .iter()
                .map(|path| path.display().to_string())
                .collect::<Vec<_>>();
            println!("Solver outputs: {}", outputs.join(", "));
        }
    }
    Ok(0)
}

pub(super) fn run_extract_command(args: ExtractArgs) -> Result<i32, CliError> {
    let output = fs::read(&args.log)
        .with_context(|| format!("failed to read solver log '{}'", args.log.display()))?;

    let result = match &args.summary {
        Some(summary) => extract_and_summarize(&output, summary)?,
        None => extract_run_result(&output)?,
    };
    info!(log = %args.log.display(), "solver log parsed");

    if args.json {
        print_json(&result)?;
    } else {
        print_result(&result);
    }
    Ok(0)
}

fn print_result(result: &RunResult) {
    println!("Minimum hydraulic resistance: {}", result.min_resistance);
    println!("Target ID: {}", result.target_id);
}
