//! Command-line interface for transiscope ROI event analysis.

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use transiscope::{
    AcquisitionMeta, AnalysisConfig, Analyzer, ImageStack, RoiRegistry, RoiStatus, ThresholdLevel,
    Vertex, DEFAULT_PIXEL_SIZE_UM,
};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "transiscope")]
#[command(about = "Detect transient intensity events in ROIs of time-lapse microscopy stacks")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run event detection over every ROI and write a JSON report.
    Analyze(CliAnalyzeArgs),

    /// Print mask and physical areas of the polygons in an ROI file.
    RoiInfo(CliRoiInfoArgs),

    /// Print the default analysis configuration as JSON.
    DefaultConfig,
}

#[derive(Debug, Clone, Args)]
struct CliAnalyzeArgs {
    /// Directory of frame images, read in file-name order.
    #[arg(long)]
    frames: PathBuf,

    /// ROI polygons (JSON: {"rois": [[[row, col], ...], ...]}).
    #[arg(long)]
    rois: PathBuf,

    /// Path to write the analysis report (JSON).
    #[arg(long)]
    out: PathBuf,

    /// Acquisition frame rate (frames per second).
    #[arg(long)]
    fps: f64,

    /// Pixel size in micrometers.
    #[arg(long, default_value_t = DEFAULT_PIXEL_SIZE_UM)]
    pixel_size: f64,

    /// Analysis config JSON. Flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Minimum separation between accepted events of one ROI (seconds).
    #[arg(long)]
    min_separation: Option<f64>,

    /// Fixed threshold level for run detection.
    #[arg(long, conflicts_with = "otsu")]
    threshold: Option<f64>,

    /// Derive the threshold level with Otsu's method.
    #[arg(long)]
    otsu: bool,

    /// Disable threshold-run detection.
    #[arg(long)]
    no_threshold: bool,

    /// Disable difference-of-Gaussians peak detection.
    #[arg(long)]
    no_dog: bool,

    /// DoG narrow width (samples).
    #[arg(long)]
    dog_sigma1: Option<f64>,

    /// DoG wide width (samples).
    #[arg(long)]
    dog_sigma2: Option<f64>,

    /// DoG minimum prominence; 0 selects the dynamic bound.
    #[arg(long)]
    dog_min_prominence: Option<f64>,

    /// Enable change-point segmentation.
    #[arg(long)]
    change_point: bool,

    /// Change-point penalty per breakpoint.
    #[arg(long)]
    penalty: Option<f64>,

    /// Process ROIs sequentially.
    #[arg(long)]
    sequential: bool,
}

#[derive(Debug, Clone, Args)]
struct CliRoiInfoArgs {
    /// ROI polygons (JSON).
    #[arg(long)]
    rois: PathBuf,

    /// Image width in pixels.
    #[arg(long)]
    width: usize,

    /// Image height in pixels.
    #[arg(long)]
    height: usize,

    /// Pixel size in micrometers.
    #[arg(long, default_value_t = DEFAULT_PIXEL_SIZE_UM)]
    pixel_size: f64,
}

#[derive(Debug, serde::Deserialize)]
struct RoiFile {
    rois: Vec<Vec<Vertex>>,
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze(args) => run_analyze(&args),
        Commands::RoiInfo(args) => run_roi_info(&args),
        Commands::DefaultConfig => run_default_config(),
    }
}

// ── default-config ─────────────────────────────────────────────────────

fn run_default_config() -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(&AnalysisConfig::default())?);
    Ok(())
}

// ── roi-info ───────────────────────────────────────────────────────────

fn run_roi_info(args: &CliRoiInfoArgs) -> CliResult<()> {
    let polygons = load_roi_file(&args.rois)?;
    let mut registry = RoiRegistry::with_pixel_size([args.height, args.width], args.pixel_size)?;
    fill_registry(&mut registry, &polygons);

    println!(
        "{} ROIs on a {}x{} image, {} um/px",
        registry.len(),
        args.width,
        args.height,
        args.pixel_size
    );
    println!("  {:>4}  {:>8}  {:>9}  {:>11}", "id", "vertices", "area px", "area um^2");
    for roi in registry.enumerate_all() {
        println!(
            "  {:>4}  {:>8}  {:>9}  {:>11.3}",
            roi.id(),
            roi.vertices().len(),
            roi.area_pixels(),
            roi.area_sq_um().unwrap_or(0.0)
        );
    }
    Ok(())
}

// ── analyze ────────────────────────────────────────────────────────────

fn build_config(args: &CliAnalyzeArgs) -> CliResult<AnalysisConfig> {
    let mut config = match &args.config {
        Some(path) => AnalysisConfig::from_json_file(path).map_err(|e| -> CliError {
            format!("Failed to load config {}: {}", path.display(), e).into()
        })?,
        None => AnalysisConfig::default(),
    };

    if let Some(sep) = args.min_separation {
        config.min_event_separation_s = sep;
    }
    if let Some(value) = args.threshold {
        config.threshold.level = ThresholdLevel::Fixed { value };
    }
    if args.otsu {
        config.threshold.level = ThresholdLevel::Otsu;
    }
    if args.no_threshold {
        config.threshold.enable = false;
    }
    if args.no_dog {
        config.dog.enable = false;
    }
    if let Some(s) = args.dog_sigma1 {
        config.dog.sigma1 = s;
    }
    if let Some(s) = args.dog_sigma2 {
        config.dog.sigma2 = s;
    }
    if let Some(p) = args.dog_min_prominence {
        config.dog.min_prominence = (p > 0.0).then_some(p);
    }
    if args.change_point {
        config.change_point.enable = true;
    }
    if let Some(p) = args.penalty {
        config.change_point.penalty = p;
    }
    if args.sequential {
        config.parallel = false;
    }
    Ok(config)
}

fn run_analyze(args: &CliAnalyzeArgs) -> CliResult<()> {
    let config = build_config(args)?;
    let stack = load_frames(&args.frames)?;
    let [n, h, w] = stack.shape();
    tracing::info!("Loaded {} frames of {}x{}", n, w, h);

    let meta = AcquisitionMeta::with_pixel_size(args.fps, args.pixel_size);
    let analyzer = Analyzer::with_config(config);
    let mut registry = analyzer.registry_for(&stack, &meta)?;
    let polygons = load_roi_file(&args.rois)?;
    fill_registry(&mut registry, &polygons);

    let report = analyzer.analyze(&registry, &stack, &meta);

    let json = serde_json::to_string_pretty(&report)?;
    std::fs::write(&args.out, json).map_err(|e| -> CliError {
        format!("Failed to write {}: {}", args.out.display(), e).into()
    })?;
    tracing::info!("Results written to {}", args.out.display());

    println!(
        "{} ROIs, {} frames, {:.3} s observed",
        report.rois.len(),
        report.n_frames,
        report.observation_duration_s
    );
    println!(
        "  {:>4}  {:>6}  {:>14}  {:>14}  status",
        "id", "events", "rate /s/um^2", "std err"
    );
    let statuses: std::collections::HashMap<_, _> =
        report.rois.iter().map(|r| (r.roi_id, &r.status)).collect();
    for row in report.summary() {
        let status = match statuses.get(&row.roi_id) {
            Some(RoiStatus::Skipped { reason }) => format!("skipped: {reason}"),
            _ => "ok".to_owned(),
        };
        println!(
            "  {:>4}  {:>6}  {:>14.6e}  {:>14.6e}  {}",
            row.roi_id, row.event_count, row.rate, row.standard_error, status
        );
    }
    Ok(())
}

// ── input helpers ──────────────────────────────────────────────────────

fn load_roi_file(path: &Path) -> CliResult<Vec<Vec<Vertex>>> {
    let data = std::fs::read_to_string(path)
        .map_err(|e| -> CliError { format!("Failed to read {}: {}", path.display(), e).into() })?;
    let file: RoiFile = serde_json::from_str(&data)?;
    Ok(file.rois)
}

/// Add polygons in file order, skipping duplicates and invalid ones.
fn fill_registry(registry: &mut RoiRegistry, polygons: &[Vec<Vertex>]) {
    for (index, vertices) in polygons.iter().enumerate() {
        if let Some(existing) = registry.find_by_vertices(vertices) {
            tracing::warn!("Polygon {} duplicates ROI {}, skipped", index, existing);
            continue;
        }
        if let Err(e) = registry.add(vertices) {
            tracing::warn!("Polygon {} rejected: {}", index, e);
        }
    }
}

fn load_frames(dir: &Path) -> CliResult<ImageStack> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|e| -> CliError { format!("Failed to read {}: {}", dir.display(), e).into() })?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && image::ImageFormat::from_path(p).is_ok())
        .collect();
    paths.sort();
    if paths.is_empty() {
        return Err(format!("No image files in {}", dir.display()).into());
    }

    let mut frames = Vec::with_capacity(paths.len());
    for path in &paths {
        let img = image::open(path).map_err(|e| -> CliError {
            format!("Failed to open image {}: {}", path.display(), e).into()
        })?;
        frames.push(img);
    }
    Ok(ImageStack::from_dynamic_frames(&frames)?)
}
