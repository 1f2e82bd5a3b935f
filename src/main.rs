use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gbdedup::models::{AppConfig, ConfigSource, DEFAULT_CONFIG_FILE};
use gbdedup::rendering::png_out;
use gbdedup::services::{Archive, DuplicateIndex, ImageOutcome, Pipeline};
use quad_shade::{rle, RleRecord};

#[derive(Parser)]
#[command(name = "gbdedup")]
#[command(about = "Four-shade screenshot archiver with perceptual near-duplicate detection")]
#[command(version)]
struct Cli {
    /// Configuration file (YAML)
    #[arg(long, global = true, env = "GBDEDUP_CONFIG")]
    config: Option<PathBuf>,

    /// Log every fingerprint comparison
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Quantize, encode and index every image in a directory
    Archive {
        /// Directory of source images (not searched recursively)
        input: PathBuf,

        /// Archive directory (records + hashes.json)
        #[arg(long)]
        archive_dir: Option<PathBuf>,

        /// Skip images whose fingerprint distance is below this
        #[arg(short, long)]
        threshold: Option<u32>,

        /// Worker threads for decoding and hashing
        #[arg(short, long)]
        jobs: Option<usize>,
    },
    /// Report whether an image is a near-duplicate of an archived one
    Check {
        /// Image to look up
        image: PathBuf,

        /// Archive directory holding hashes.json
        #[arg(long)]
        archive_dir: Option<PathBuf>,

        /// Maximum fingerprint distance (exclusive) counted as duplicate
        #[arg(short, long)]
        threshold: Option<u32>,
    },
    /// Write palette-quantized PNG copies of every image in a directory
    Quantize {
        input: PathBuf,
        output: PathBuf,
    },
    /// Render an archived .rle record as a PNG
    Decode {
        record: PathBuf,
        output: PathBuf,
    },
    /// Compare two images by fingerprint and quantized pixels
    Compare {
        a: PathBuf,
        b: PathBuf,

        /// Write the per-channel difference of the source images here
        #[arg(long)]
        diff: Option<PathBuf>,
    },
    /// Check that every indexed record exists, decodes and re-hashes identically
    Verify {
        #[arg(long)]
        archive_dir: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    let Some(command) = cli.command else {
        run_status_command(&config_path);
        return Ok(());
    };

    init_tracing(cli.verbose);

    let (config, _) = AppConfig::load(&config_path)?;

    match command {
        Commands::Archive {
            input,
            archive_dir,
            threshold,
            jobs,
        } => {
            let archive_dir = archive_dir.unwrap_or_else(|| config.archive_dir.clone());
            let threshold = threshold.unwrap_or(config.archive_threshold);
            let jobs = jobs.unwrap_or(config.jobs);
            run_archive_command(&config, &input, &archive_dir, threshold, jobs)
        }
        Commands::Check {
            image,
            archive_dir,
            threshold,
        } => {
            let archive_dir = archive_dir.unwrap_or_else(|| config.archive_dir.clone());
            let threshold = threshold.unwrap_or(config.threshold);
            run_check_command(&config, &image, &archive_dir, threshold)
        }
        Commands::Quantize { input, output } => run_quantize_command(&config, &input, &output),
        Commands::Decode { record, output } => run_decode_command(&config, &record, &output),
        Commands::Compare { a, b, diff } => run_compare_command(&config, &a, &b, diff.as_deref()),
        Commands::Verify { archive_dir } => {
            let archive_dir = archive_dir.unwrap_or_else(|| config.archive_dir.clone());
            run_verify_command(&config, &archive_dir)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "gbdedup=debug" } else { "gbdedup=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();
}

fn run_archive_command(
    config: &AppConfig,
    input: &Path,
    archive_dir: &Path,
    threshold: u32,
    jobs: usize,
) -> anyhow::Result<()> {
    let pipeline = Pipeline::from_config(config)?.with_jobs(jobs);
    let mut archive = Archive::open(archive_dir)?;
    let report = pipeline.archive_directory(input, &mut archive, threshold)?;

    for image in &report.images {
        let name = image.source.display();
        match &image.outcome {
            ImageOutcome::Archived { identifier } => println!("  + {name} -> {identifier}"),
            ImageOutcome::Duplicate { of, distance } => {
                println!("  = {name} duplicates {of} (distance {distance})")
            }
            ImageOutcome::Failed { reason } => println!("  ! {name}: {reason}"),
        }
    }
    println!(
        "\nArchived {}, skipped {} duplicates, {} failed ({} ms, finished {})",
        report.archived(),
        report.duplicates(),
        report.failed(),
        report.elapsed().num_milliseconds(),
        report.finished_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("Index: {}", archive.index_path().display());
    Ok(())
}

fn run_check_command(
    config: &AppConfig,
    image: &Path,
    archive_dir: &Path,
    threshold: u32,
) -> anyhow::Result<()> {
    let pipeline = Pipeline::from_config(config)?;
    let result = pipeline.check_in_dir(image, archive_dir, threshold)?;

    println!("Fingerprint: {}", result.fingerprint);
    match &result.matched {
        Some(m) => println!(
            "The image is a duplicate of {} (distance {}).",
            m.identifier, m.distance
        ),
        None => println!("The image is new."),
    }
    Ok(())
}

fn run_quantize_command(config: &AppConfig, input: &Path, output: &Path) -> anyhow::Result<()> {
    let pipeline = Pipeline::from_config(config)?;
    let report = pipeline.quantize_directory(input, output)?;
    println!(
        "Wrote {} images to {} ({} failed)",
        report.written.len(),
        output.display(),
        report.failed
    );
    Ok(())
}

fn run_decode_command(config: &AppConfig, record: &Path, output: &Path) -> anyhow::Result<()> {
    let file = File::open(record)?;
    let parsed = RleRecord::read_from(BufReader::new(file))?;
    let image = rle::decode(&parsed)?;
    let png_bytes = png_out::encode_quantized_png(&image, &config.palette()?)?;

    std::fs::write(output, &png_bytes)?;
    println!(
        "Decoded {} ({}x{}, {} runs) -> {} ({} bytes)",
        record.display(),
        image.width(),
        image.height(),
        parsed.runs().len(),
        output.display(),
        png_bytes.len()
    );
    Ok(())
}

fn run_compare_command(
    config: &AppConfig,
    a: &Path,
    b: &Path,
    diff: Option<&Path>,
) -> anyhow::Result<()> {
    let pipeline = Pipeline::from_config(config)?;
    let comparison = pipeline.compare(a, b)?;

    println!("{}  {}", comparison.fingerprints.0, a.display());
    println!("{}  {}", comparison.fingerprints.1, b.display());
    println!("Hash distance: {}", comparison.distance);
    match comparison.differing_pixels {
        Some(n) => println!(
            "Differing pixels: {n} of {} ({:.2}%)",
            comparison.total_pixels,
            n as f64 * 100.0 / comparison.total_pixels.max(1) as f64
        ),
        None => println!("Differing pixels: n/a (dimensions differ)"),
    }

    if let Some(diff_path) = diff {
        match pipeline.difference_png(a, b)? {
            Some(png_bytes) => {
                std::fs::write(diff_path, &png_bytes)?;
                println!("Difference image: {}", diff_path.display());
            }
            None => eprintln!("Images differ in size, no difference image written"),
        }
    }
    Ok(())
}

fn run_verify_command(config: &AppConfig, archive_dir: &Path) -> anyhow::Result<()> {
    let pipeline = Pipeline::from_config(config)?;
    let archive = Archive::open(archive_dir)?;
    let report = archive.verify(pipeline.hasher())?;

    println!("Checked {} entries in {}", report.checked, archive_dir.display());
    for id in &report.missing {
        println!("  missing:    {id}");
    }
    for (id, reason) in &report.corrupt {
        println!("  corrupt:    {id} ({reason})");
    }
    for id in &report.mismatched {
        println!("  mismatched: {id}");
    }
    for id in &report.orphans {
        println!("  orphan:     {id}");
    }

    if !report.is_clean() {
        std::process::exit(1);
    }
    println!("Archive OK");
    Ok(())
}

/// Display status and configuration information
fn run_status_command(config_path: &Path) {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    println!("gbdedup v{VERSION}");
    println!("Four-shade screenshot archiver\n");

    println!("Configuration:");
    let config = match AppConfig::load(config_path) {
        Ok((config, source)) => {
            if let ConfigSource::File(_) = source {
                println!("  Source:    {source}");
            } else {
                println!("  Source:    {source} (create {DEFAULT_CONFIG_FILE} to override)");
            }
            config
        }
        Err(e) => {
            println!("  Source:    {} (invalid: {e})", config_path.display());
            AppConfig::default()
        }
    };

    match config.palette_hex() {
        Ok(colors) => println!("  Palette:   {}", colors.join(" ")),
        Err(e) => println!("  Palette:   invalid ({e})"),
    }
    println!("  Threshold: {} (check), {} (archive)", config.threshold, config.archive_threshold);
    println!("  Jobs:      {}", config.jobs);

    println!("\nArchive:");
    println!("  Directory: {}", config.archive_dir.display());
    let index_path = config.index_path();
    if index_path.exists() {
        match DuplicateIndex::load(&index_path) {
            Ok(index) => {
                let entries = index.len();
                println!(
                    "  Index:     {} ({entries} {})",
                    index_path.display(),
                    if entries == 1 { "entry" } else { "entries" }
                );
            }
            Err(e) => println!("  Index:     {e}"),
        }
    } else {
        println!("  Index:     (none yet)");
    }

    println!("\nCommands:");
    println!("  gbdedup archive   Archive a directory of images");
    println!("  gbdedup check     Check one image against the archive");
    println!("  gbdedup quantize  Write palette-quantized copies of images");
    println!("  gbdedup decode    Render an .rle record as PNG");
    println!("  gbdedup compare   Compare two images");
    println!("  gbdedup verify    Verify archive integrity");
    println!("\nRun 'gbdedup --help' for more details.");
}
