//! Command-line interface for uvstrip_dosimetry
//!
//! Analyze strip photos, inspect detection candidates and list strip types.

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process;
use uvstrip_dosimetry::{
    image_loader, AnalysisError, CalibrationRegistry, PipelineConfig, StripAnalysisResult,
    StripAnalyzer,
};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "uvstrip")]
#[command(about = "Estimate UV dose from photographs of dosimeter strips")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one or more strip photos
    Analyze(AnalyzeArgs),
    /// Show scored strip candidates for a photo
    Inspect {
        #[arg(long)]
        image: PathBuf,
        #[command(flatten)]
        pipeline: PipelineArgs,
    },
    /// List supported strip types
    Profiles {
        #[command(flatten)]
        pipeline: PipelineArgs,
    },
    /// Print the default pipeline configuration as JSON
    DefaultConfig,
}

#[derive(Args)]
struct PipelineArgs {
    /// Pipeline configuration JSON
    #[arg(long)]
    config: Option<PathBuf>,

    /// Extra calibration profiles (JSON array)
    #[arg(long)]
    profiles: Option<PathBuf>,
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Image file(s) or directories of images to analyze
    #[arg(long, required = true, num_args = 1..)]
    image: Vec<PathBuf>,

    /// Strip type; defaults to the standard profile
    #[arg(long)]
    profile: Option<String>,

    /// Print full results as JSON
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    pipeline: PipelineArgs,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Analyze(args) => run_analyze(&args),
        Commands::Inspect { image, pipeline } => run_inspect(&image, &pipeline),
        Commands::Profiles { pipeline } => run_profiles(&pipeline),
        Commands::DefaultConfig => run_default_config(),
    };

    if let Err(error) = outcome {
        eprintln!("Error: {}", error);
        if let Some(analysis) = error.downcast_ref::<AnalysisError>() {
            eprintln!("Suggestion: {}", analysis.user_message());
        }
        process::exit(1);
    }
}

fn build_analyzer(args: &PipelineArgs) -> CliResult<StripAnalyzer> {
    let config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };
    let profiles = match &args.profiles {
        Some(path) => CalibrationRegistry::from_json_file(path)?,
        None => CalibrationRegistry::builtin(),
    };
    Ok(StripAnalyzer::new(config, profiles)?)
}

// ── analyze ───────────────────────────────────────────────────────────

fn run_analyze(args: &AnalyzeArgs) -> CliResult<()> {
    let analyzer = build_analyzer(&args.pipeline)?;
    let profile = args.profile.as_deref();
    let images = expand_inputs(&args.image)?;

    if let [path] = images.as_slice() {
        let result = analyzer.analyze_path(path, profile)?;
        print_result(path, &result, args.json)?;
        return Ok(());
    }

    let mut failures = 0usize;
    for (path, outcome) in analyzer.analyze_batch(&images, profile) {
        match outcome {
            Ok(result) => print_result(&path, &result, args.json)?,
            Err(error) => {
                failures += 1;
                eprintln!("{}: analysis failed: {}", path.display(), error);
            }
        }
    }

    if failures > 0 {
        return Err(format!("{} of {} images failed", failures, images.len()).into());
    }
    Ok(())
}

/// Replace each directory argument by the image files it contains
fn expand_inputs(inputs: &[PathBuf]) -> CliResult<Vec<PathBuf>> {
    let mut images = Vec::new();
    for input in inputs {
        if input.is_dir() {
            images.extend(image_loader::image_files_in(input)?);
        } else {
            images.push(input.clone());
        }
    }
    if images.is_empty() {
        return Err("no supported image files found".into());
    }
    Ok(images)
}

fn print_result(path: &Path, result: &StripAnalysisResult, json: bool) -> CliResult<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    println!("{}", path.display());
    println!("  strip type:      {}", result.profile);
    println!("  average colour:  {}", result.avg_hex);
    println!(
        "  colour change:   {:.1} ({:.1}%)",
        result.color_distance, result.color_change_percent
    );
    println!("  estimated dose:  {:.1} J/cm²", result.estimated_dose_rounded());
    println!("  exposure level:  {}", result.exposure_level);
    println!("  confidence:      {:.0}%", result.confidence);
    if result.used_fallback() {
        println!("  region:          central fallback (no strip detected)");
    } else {
        let r = result.region;
        println!("  region:          {}x{} at ({}, {})", r.width, r.height, r.x, r.y);
    }
    println!("  {}", result.recommendation());
    Ok(())
}

// ── inspect ───────────────────────────────────────────────────────────

fn run_inspect(image: &Path, pipeline: &PipelineArgs) -> CliResult<()> {
    let analyzer = build_analyzer(pipeline)?;
    let decoded = image_loader::load_image(image)?;
    let report = analyzer.inspect(&decoded)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

// ── profiles ──────────────────────────────────────────────────────────

fn run_profiles(pipeline: &PipelineArgs) -> CliResult<()> {
    let analyzer = build_analyzer(pipeline)?;
    let registry = analyzer.profiles();

    for name in registry.supported_types() {
        let profile = registry.get(name)?;
        let marker = if name == registry.default_name() { " (default)" } else { "" };
        let [r, g, b] = profile.baseline_rgb();
        println!(
            "{}{}: baseline rgb({}, {}, {}), {} dose segments",
            name,
            marker,
            r,
            g,
            b,
            profile.segments().len()
        );
    }
    Ok(())
}

// ── default-config ────────────────────────────────────────────────────

fn run_default_config() -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(&PipelineConfig::default())?);
    Ok(())
}
