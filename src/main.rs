//! pogo-scan
//!
//! Command-line front end: scans creature detail screenshots, runs batches into
//! a CSV file, renders calibration previews and fetches Tesseract trained data.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::thread;

use pogo_scan::batch::{create_work_queue, enqueue_batch, init_csv, run_scan_worker};
use pogo_scan::config::{load_config, ScannerConfig};
use pogo_scan::ocr::{ensure_tessdata, TesseractEngine};
use pogo_scan::paths;
use pogo_scan::preview::{dump_regions, render_preview};
use pogo_scan::scan::{LevelArc, ScanPipeline, ScreenLayout};

#[derive(Parser)]
#[command(name = "pogo-scan")]
#[command(about = "Read creature stats from Pokémon GO detail screenshots")]
#[command(version)]
struct Cli {
    /// Path to config.json (defaults to the one next to the executable).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan one screenshot and print the result as JSON.
    Scan {
        /// Path to the screenshot.
        #[arg(long)]
        image: PathBuf,

        /// Current trainer level.
        #[arg(long)]
        trainer_level: u32,

        /// Write the JSON result here instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Scan many screenshots on a worker thread, appending rows to a CSV file.
    Batch {
        /// Current trainer level.
        #[arg(long)]
        trainer_level: u32,

        /// CSV file to append results to.
        #[arg(long)]
        csv: PathBuf,

        /// Screenshots to scan, in order.
        #[arg(required = true)]
        images: Vec<PathBuf>,
    },

    /// Draw scan regions and level arc points onto a screenshot.
    Preview {
        /// Path to the screenshot.
        #[arg(long)]
        image: PathBuf,

        /// Trainer level used for the arc points.
        #[arg(long)]
        trainer_level: u32,

        /// Path to write the annotated PNG.
        #[arg(long)]
        out: PathBuf,

        /// Also write every filtered region crop into this directory.
        #[arg(long)]
        regions_dir: Option<PathBuf>,
    },

    /// Download Tesseract trained data if it is missing.
    Setup {
        /// Tesseract language tag.
        #[arg(long, default_value = "eng")]
        language: String,
    },
}

fn init_logging() {
    use tracing_subscriber::fmt::time::ChronoLocal;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{fmt, EnvFilter};

    let timer = || ChronoLocal::new("%H:%M:%S%.3f".to_string());

    let file_layer = paths::ensure_directories()
        .ok()
        .and_then(|_| {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(paths::get_logs_dir().join("pogo_scan.log"))
                .ok()
        })
        .map(|file| {
            fmt::layer()
                .with_ansi(false)
                .with_timer(timer())
                .with_writer(Mutex::new(file))
        });

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_timer(timer()).with_writer(std::io::stderr))
        .with(file_layer)
        .init();
}

fn main() -> Result<()> {
    init_logging();

    std::panic::set_hook(Box::new(|panic_info| {
        tracing::error!("[PANIC] {}", panic_info);
    }));

    let cli = Cli::parse();
    let config = load_config(
        &cli.config
            .clone()
            .unwrap_or_else(paths::get_default_config_path),
    );

    match cli.command {
        Commands::Scan {
            image,
            trainer_level,
            out,
        } => run_scan(&config, &image, trainer_level, out.as_deref()),
        Commands::Batch {
            trainer_level,
            csv,
            images,
        } => run_batch(&config, trainer_level, &csv, images),
        Commands::Preview {
            image,
            trainer_level,
            out,
            regions_dir,
        } => run_preview(&config, &image, trainer_level, &out, regions_dir.as_deref()),
        Commands::Setup { language } => {
            let dir = ensure_tessdata(&language)?;
            println!("Trained data ready in {}", dir.display());
            Ok(())
        }
    }
}

fn open_screenshot(path: &Path) -> Result<image::RgbaImage> {
    tracing::info!("Loading screenshot: {}", path.display());
    let img = image::open(path)
        .with_context(|| format!("Failed to open screenshot {}", path.display()))?;
    Ok(img.to_rgba8())
}

fn open_pipeline(config: &ScannerConfig, size: (u32, u32)) -> Result<ScanPipeline<TesseractEngine>> {
    let engine = TesseractEngine::init(
        config.tesseract_path.as_deref(),
        config.tessdata_dir.as_deref(),
        &config.ocr_language,
    )?;
    Ok(ScanPipeline::new(engine, config.scan_settings(size)))
}

fn run_scan(config: &ScannerConfig, image: &Path, trainer_level: u32, out: Option<&Path>) -> Result<()> {
    let screenshot = open_screenshot(image)?;
    let mut pipeline = open_pipeline(config, screenshot.dimensions())?;

    let scanned = pipeline.scan(&screenshot, trainer_level);
    pipeline.release()?;
    let result = scanned?;
    if !result.is_complete() {
        tracing::warn!("Some fields of {} could not be read", image.display());
    }

    let json = serde_json::to_string_pretty(&result)?;
    match out {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Result written to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn run_batch(config: &ScannerConfig, trainer_level: u32, csv: &Path, images: Vec<PathBuf>) -> Result<()> {
    // The first screenshot fixes the reference size unless the config pins one
    let size = match (config.screen_width, config.screen_height) {
        (Some(w), Some(h)) => (w, h),
        _ => image::image_dimensions(&images[0])
            .with_context(|| format!("Failed to read {}", images[0].display()))?,
    };

    let pipeline = open_pipeline(config, size)?;
    init_csv(csv)?;

    let (sender, receiver) = create_work_queue();
    let csv_path = csv.to_path_buf();
    let worker = thread::spawn(move || run_scan_worker(receiver, pipeline, csv_path));

    let queued = enqueue_batch(&sender, images, trainer_level);
    drop(sender);

    let summary = worker
        .join()
        .map_err(|_| anyhow::anyhow!("Scan worker thread panicked"))?;
    queued.map_err(|_| anyhow::anyhow!("Scan worker stopped before the batch was queued"))?;
    println!(
        "Scanned {} screenshot(s) ({} with unreadable fields), {} failed. Results in {}",
        summary.scanned,
        summary.incomplete,
        summary.failed,
        csv.display()
    );
    Ok(())
}

fn run_preview(
    config: &ScannerConfig,
    image: &Path,
    trainer_level: u32,
    out: &Path,
    regions_dir: Option<&Path>,
) -> Result<()> {
    let screenshot = open_screenshot(image)?;
    let settings = config.scan_settings(screenshot.dimensions());
    let layout = ScreenLayout::new(settings.width, settings.height);
    let arc = LevelArc::new(settings.width, settings.height, trainer_level);

    let preview = render_preview(&screenshot, &layout, &arc);
    preview
        .save(out)
        .with_context(|| format!("Failed to save preview {}", out.display()))?;
    println!("Preview written to {}", out.display());

    if let Some(dir) = regions_dir {
        let written = dump_regions(&screenshot, &layout, dir)?;
        println!("{} region crops written to {}", written.len(), dir.display());
    }
    Ok(())
}
