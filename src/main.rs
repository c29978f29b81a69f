use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use sc2_quotes::config;
use sc2_quotes::stats::{ExtractionStats, TransformStats};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};
use tracing::{error, info, Level};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "sc2-quotes")]
#[command(about = "Scrape StarCraft II unit quotations into a clean JSON dataset")]
struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Defaults to `run` with the built-in paths
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the quotation page and write one raw file per faction
    Extract(ExtractArgs),
    /// Normalize raw files into clean files and the combined dataset
    Transform(TransformArgs),
    /// Extract, then transform
    Run(RunArgs),
}

#[derive(Args)]
struct SourceArgs {
    /// Quotation page to scrape
    #[arg(long, default_value = config::SOURCE_URL)]
    url: String,

    /// Per-request timeout in seconds (no timeout by default)
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[derive(Args)]
struct ExtractArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Directory for raw per-faction files
    #[arg(long, default_value = config::EXTRACT_DIR)]
    extract_dir: PathBuf,
}

#[derive(Args)]
struct TransformArgs {
    /// Directory holding raw per-faction files
    #[arg(long, default_value = config::EXTRACT_DIR)]
    extract_dir: PathBuf,

    /// Directory for clean per-faction files
    #[arg(long, default_value = config::TRANSFORM_DIR)]
    transform_dir: PathBuf,

    /// Combined dataset file
    #[arg(long, default_value = config::DATASET_FILE)]
    dataset: PathBuf,
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    source: SourceArgs,

    #[command(flatten)]
    paths: TransformArgs,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            source: SourceArgs {
                url: config::SOURCE_URL.to_string(),
                timeout_secs: None,
            },
            paths: TransformArgs {
                extract_dir: PathBuf::from(config::EXTRACT_DIR),
                transform_dir: PathBuf::from(config::TRANSFORM_DIR),
                dataset: PathBuf::from(config::DATASET_FILE),
            },
        }
    }
}

fn extract(source: &SourceArgs, extract_dir: &Path) -> Result<ExtractionStats> {
    let timeout = source.timeout_secs.map(Duration::from_secs);

    let rt = tokio::runtime::Builder::new_current_thread()
        .thread_name("sc2-quotes-extract")
        .enable_io()
        .enable_time()
        .build()?;

    info!(url = %source.url, "Starting extraction pass");
    let start = Instant::now();
    let stats = rt.block_on(sc2_quotes::extract::run_extraction(
        &source.url,
        extract_dir,
        &config::FACTIONS,
        timeout,
    ))?;
    info!(
        duration_secs = start.elapsed().as_secs_f64(),
        "Extraction complete"
    );
    Ok(stats)
}

fn transform(args: &TransformArgs) -> Result<TransformStats> {
    info!("Starting transform pass");
    let start = Instant::now();
    let stats = sc2_quotes::transform::run_transform(
        &args.extract_dir,
        &args.transform_dir,
        &args.dataset,
    )?;
    info!(
        duration_secs = start.elapsed().as_secs_f64(),
        "Transform complete"
    );
    Ok(stats)
}

fn print_extraction_summary(stats: &ExtractionStats) {
    println!("Raw quotes:         {}", stats.quotes());
    println!("Tables processed:   {}", stats.tables());
    println!("Tables skipped:     {}", stats.skipped_tables());
    println!("Factions failed:    {}", stats.failed_factions());
}

fn print_transform_summary(stats: &TransformStats, dataset: &Path) {
    println!("Files transformed:  {}", stats.files());
    println!("Quotes read:        {}", stats.read());
    println!("Quotes dropped:     {}", stats.dropped());
    println!("Quotes written:     {}", stats.written());
    println!("Duplicate ids:      {}", stats.duplicates());
    println!("Dataset:            {}", dataset.display());
}

fn run(command: Commands) -> Result<()> {
    let start = Instant::now();

    match command {
        Commands::Extract(args) => {
            let stats = extract(&args.source, &args.extract_dir)?;
            println!();
            println!("=== Summary ===");
            print_extraction_summary(&stats);
        }
        Commands::Transform(args) => {
            let stats = transform(&args)?;
            println!();
            println!("=== Summary ===");
            print_transform_summary(&stats, &args.dataset);
        }
        Commands::Run(args) => {
            let extracted = extract(&args.source, &args.paths.extract_dir)?;
            let transformed = transform(&args.paths)?;
            println!();
            println!("=== Summary ===");
            print_extraction_summary(&extracted);
            print_transform_summary(&transformed, &args.paths.dataset);
        }
    }

    println!("Total time:         {:.2}s", start.elapsed().as_secs_f64());
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match (cli.quiet, cli.verbose) {
        (true, _) => Level::WARN,
        (false, 0) => Level::INFO,
        (false, 1) => Level::DEBUG,
        (false, _) => Level::TRACE,
    };

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    let command = cli
        .command
        .unwrap_or_else(|| Commands::Run(RunArgs::default()));

    match run(command) {
        Ok(()) => {
            info!("Completed successfully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Error: {:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
