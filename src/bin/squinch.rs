use std::io::Write as _;
use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "squinch", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Solve one sample and print the solution as JSON.
    Solve(SolveArgs),
    /// Solve a frame range and write solutions as JSON.
    Range(RangeArgs),
    /// Compare sequential preview output against parallel final output.
    Parity(ParityArgs),
    /// Print the render resolution matching the target footprint.
    Resolution(ResolutionArgs),
}

#[derive(Parser, Debug)]
struct SolveArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Frame index (0-based).
    #[arg(long)]
    frame: u64,

    /// Sub-frame offset in `[0, 1)`.
    #[arg(long, default_value_t = 0.0)]
    subframe: f64,
}

#[derive(Parser, Debug)]
struct RangeArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// First frame (inclusive).
    #[arg(long, default_value_t = 0)]
    start: u64,

    /// End frame (exclusive). Defaults to the scene duration.
    #[arg(long)]
    end: Option<u64>,

    /// Samples per frame.
    #[arg(long, default_value_t = 1)]
    subframes: u32,

    /// Solve samples in parallel, one evaluation context per worker.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,

    /// Output JSON path. Defaults to stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ParityArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Samples per frame.
    #[arg(long, default_value_t = 1)]
    subframes: u32,

    /// Override rayon worker threads.
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Parser, Debug)]
struct ResolutionArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Override the scene's base horizontal resolution.
    #[arg(long)]
    base_x: Option<u32>,
}

#[derive(serde::Serialize)]
struct SampleRow {
    frame: u64,
    subframe: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    solution: Option<squinch::FramingSolution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    horizontal_fov_deg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl SampleRow {
    fn new(
        time: squinch::SampleTime,
        result: &squinch::SquinchResult<squinch::FramingSolution>,
        sensor_width: f64,
    ) -> Self {
        let (solution, error) = match result {
            Ok(s) => (Some(*s), None),
            Err(e) => (None, Some(e.to_string())),
        };
        Self {
            frame: time.frame.0,
            subframe: time.subframe,
            horizontal_fov_deg: solution
                .map(|s| s.intrinsics.horizontal_fov(sensor_width).to_degrees()),
            solution,
            error,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Solve(args) => cmd_solve(args),
        Command::Range(args) => cmd_range(args),
        Command::Parity(args) => cmd_parity(args),
        Command::Resolution(args) => cmd_resolution(args),
    }
}

fn load(path: &std::path::Path) -> anyhow::Result<squinch::Scene> {
    let scene = squinch::Scene::from_path(path)
        .with_context(|| format!("load scene '{}'", path.display()))?;
    scene
        .validate()
        .with_context(|| format!("validate scene '{}'", path.display()))?;
    Ok(scene)
}

fn cmd_solve(args: SolveArgs) -> anyhow::Result<()> {
    let scene = load(&args.in_path)?;
    let mut sess = squinch::FramingSession::new(&scene, squinch::SessionOpts::default())?;
    let time = squinch::SampleTime::new(args.frame, args.subframe)?;
    let result = sess.solve_sample(time);
    if let Err(e) = &result
        && !e.is_per_sample()
    {
        anyhow::bail!("solve frame {}: {e}", args.frame);
    }
    let row = SampleRow::new(time, &result, scene.def().config.reference_sensor_width);
    println!("{}", serde_json::to_string_pretty(&row)?);
    Ok(())
}

fn cmd_range(args: RangeArgs) -> anyhow::Result<()> {
    let scene = load(&args.in_path)?;
    let opts = squinch::SessionOpts {
        parallel: args.parallel,
        threads: args.threads,
        subframes: args.subframes,
    };
    let mut sess = squinch::FramingSession::new(&scene, opts)?;
    let end = args.end.unwrap_or(scene.duration_frames());
    let range = squinch::FrameRange::new(squinch::FrameIndex(args.start), squinch::FrameIndex(end))?;
    let solved = sess.solve_range(range)?;

    let sensor = scene.def().config.reference_sensor_width;
    let rows: Vec<SampleRow> = solved
        .outcomes
        .iter()
        .map(|o| SampleRow::new(o.time, &o.result, sensor))
        .collect();
    let json = serde_json::to_string_pretty(&rows)?;

    match &args.out {
        Some(out) => {
            if let Some(parent) = out.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create output dir '{}'", parent.display()))?;
            }
            std::fs::write(out, json).with_context(|| format!("write '{}'", out.display()))?;
            eprintln!(
                "wrote {} ({} solved, {} failed)",
                out.display(),
                solved.stats.samples_solved,
                solved.stats.samples_failed
            );
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}")?;
        }
    }
    Ok(())
}

fn cmd_parity(args: ParityArgs) -> anyhow::Result<()> {
    let scene = load(&args.in_path)?;
    let opts = squinch::SessionOpts {
        parallel: true,
        threads: args.threads,
        subframes: args.subframes,
    };
    let sess = squinch::FramingSession::new(&scene, opts)?;
    let report = sess.parity(sess.full_range())?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    if !report.is_identical() {
        anyhow::bail!(
            "preview and final outputs differ on {} of {} samples",
            report.mismatches.len(),
            report.samples
        );
    }
    Ok(())
}

fn cmd_resolution(args: ResolutionArgs) -> anyhow::Result<()> {
    let scene = load(&args.in_path)?;
    let resolution = match args.base_x {
        Some(base_x) => {
            let host = squinch::SceneHost::new(&scene)?;
            squinch::RenderResolution::for_footprint(host.target().footprint(), base_x)?
        }
        None => squinch::FramingSession::new(&scene, squinch::SessionOpts::default())?
            .render_resolution()?,
    };
    println!("{}", serde_json::to_string_pretty(&resolution)?);
    Ok(())
}
