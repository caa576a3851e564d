use clap::{Parser, Subcommand};
use sizewise::batch::{self, BatchOptions, DirectorySink};
use sizewise::imaging::RustCodec;
use sizewise::{config, output, scan, sizing};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Overrides for the sizing policy.
#[derive(clap::Args, Clone)]
struct PlanArgs {
    /// Safety margin in percent added to usage-derived sizes (overrides config)
    #[arg(long)]
    buffer: Option<f64>,
}

#[derive(Parser)]
#[command(name = "sizewise")]
#[command(about = "Downsize image assets to the largest size they are shown at")]
#[command(long_about = "\
Downsize image assets to the largest size they are shown at

Usage stats record, for every asset, the largest size it was ever rendered
at. Each image is resized to that size (plus an optional safety buffer),
never above its own resolution, and written as 8-bit RGBA PNG.

Inputs:

  assets/
  ├── sizewise.toml        # Config (optional)
  ├── ui/button.png        # Key in stats: \"ui/button.png\"
  └── bg/sky.jpg           # Key in stats: \"bg/sky.jpg\"

  usage.json
  {\"assets\": {\"ui/button.png\": {\"max_render_width\": 96, \"max_render_height\": 32}}}

Output:

  dist/
  ├── manifest.json        # One record per asset
  └── optimized/           # root_folder from config
      ├── ui/button.png
      └── bg/sky.png

Assets without a stats entry are left out. Images that fail to resample are
shipped unchanged under their output name.

Run 'sizewise gen-config' to generate a documented sizewise.toml.")]
#[command(version)]
struct Cli {
    /// Source image directory
    #[arg(long, default_value = "assets", global = true)]
    source: PathBuf,

    /// Usage stats JSON file
    #[arg(long, default_value = "usage.json", global = true)]
    stats: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute and print the resize plan without touching pixels
    Plan(PlanArgs),
    /// Plan, resample, and write every output
    Build {
        #[command(flatten)]
        plan: PlanArgs,
        /// Fixed dither seed for reproducible output (overrides config)
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print a stock sizewise.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Plan(plan_args) => {
            let config = load_config(&cli.source, &plan_args, None)?;
            let tasks = plan(&cli.source, &cli.stats, &config)?;
            output::print_plan(&tasks);
        }
        Command::Build {
            plan: plan_args,
            seed,
        } => {
            let config = load_config(&cli.source, &plan_args, seed)?;

            println!("==> Planning {}", cli.source.display());
            let tasks = plan(&cli.source, &cli.stats, &config)?;
            output::print_plan(&tasks);

            println!("==> Resampling");
            init_thread_pool(&config.processing);
            let sink = DirectorySink::new(&cli.output, &config.root_folder);
            let options = BatchOptions {
                dither: config.dither,
                ..BatchOptions::default()
            };
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_batch_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = batch::run_batch(&tasks, &RustCodec::new(), &sink, &options, Some(tx));
            if printer.join().is_err() {
                tracing::warn!("progress printer panicked");
            }
            let report = result?;
            report.save(&cli.output)?;
            output::print_batch_summary(&report);

            println!("==> Build complete: {}", sink.root().display());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Log to stderr. `RUST_LOG` overrides the default `warn` level.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Load `sizewise.toml` from the source directory and apply CLI overrides.
fn load_config(
    source: &std::path::Path,
    plan_args: &PlanArgs,
    seed: Option<u64>,
) -> Result<config::Config, config::ConfigError> {
    let mut config = config::load_config(source)?;
    if let Some(buffer) = plan_args.buffer {
        config.buffer_percentage = buffer;
    }
    if seed.is_some() {
        config.dither.seed = seed;
    }
    config.validate()?;
    Ok(config)
}

/// Scan inputs and run the sizing policy.
fn plan(
    source: &std::path::Path,
    stats: &std::path::Path,
    config: &config::Config,
) -> Result<Vec<sizewise::types::OptimizationTask>, scan::ScanError> {
    let usage = scan::load_stats(stats)?;
    let loaded = scan::scan_sources(source)?;
    Ok(sizing::compute_tasks(
        &usage,
        &loaded,
        config.buffer_percentage,
    ))
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available CPU cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
