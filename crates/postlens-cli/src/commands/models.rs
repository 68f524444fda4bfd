//! Models command - download and manage OCR model files.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;
use futures_util::StreamExt;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use postlens_core::OcrConfig;

use super::{load_config, resolve_model_dir};

/// Arguments for the models command.
#[derive(Args)]
pub struct ModelsArgs {
    #[command(subcommand)]
    command: ModelsCommand,

    /// Model directory (default: from config, else the user data directory)
    #[arg(short, long, global = true)]
    model_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum ModelsCommand {
    /// Check which model files are present
    Status,

    /// Download model files
    Download(DownloadArgs),

    /// Remove downloaded model files
    Clean,
}

#[derive(Args)]
struct DownloadArgs {
    /// Force re-download even if files exist
    #[arg(long)]
    force: bool,
}

/// A downloadable model file.
struct ModelFile {
    /// File name on disk, as configured.
    filename: String,
    size_bytes: u64,
    description: &'static str,
    url: &'static str,
}

impl ModelFile {
    /// Whether a file on disk looks fully downloaded.
    fn looks_complete(&self, len: u64) -> bool {
        len > self.size_bytes / 2
    }
}

fn model_files(ocr: &OcrConfig) -> [ModelFile; 3] {
    [
        ModelFile {
            filename: ocr.detection_model.clone(),
            size_bytes: 4_500_000,
            description: "Text detection",
            url: "https://github.com/jakubmatias/incr/raw/main/models/mobile/det.onnx",
        },
        ModelFile {
            filename: ocr.recognition_model.clone(),
            size_bytes: 7_500_000,
            description: "Latin text recognition",
            url: "https://github.com/jakubmatias/incr/raw/main/models/mobile/latin_rec.onnx",
        },
        ModelFile {
            filename: ocr.dictionary.clone(),
            size_bytes: 2_000,
            description: "Latin character dictionary",
            url: "https://github.com/jakubmatias/incr/raw/main/models/mobile/latin_dict.txt",
        },
    ]
}

/// Per-user model directory.
pub fn default_model_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("postlens")
        .join("models")
}

pub async fn run(args: ModelsArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let model_dir = resolve_model_dir(args.model_dir.as_deref(), &config);
    let files = model_files(&config.ocr);

    match args.command {
        ModelsCommand::Status => check_status(&model_dir, &files),
        ModelsCommand::Download(download_args) => {
            download_models(&model_dir, &files, download_args).await
        }
        ModelsCommand::Clean => clean_models(&model_dir, &files),
    }
}

async fn download_models(
    model_dir: &Path,
    files: &[ModelFile],
    args: DownloadArgs,
) -> anyhow::Result<()> {
    fs::create_dir_all(model_dir)?;

    println!(
        "{} Downloading OCR models to {}",
        style("ℹ").blue(),
        model_dir.display()
    );
    println!();

    let client = reqwest::Client::builder()
        .user_agent(concat!("postlens-cli/", env!("CARGO_PKG_VERSION")))
        .timeout(std::time::Duration::from_secs(300))
        .build()?;

    let multi_progress = MultiProgress::new();
    let mut success_count = 0;
    let mut skip_count = 0;
    let mut error_count = 0;

    for model in files {
        let path = model_dir.join(&model.filename);

        if path.exists() && !args.force {
            let len = fs::metadata(&path)?.len();
            if model.looks_complete(len) {
                println!(
                    "  {} {} (already exists, {})",
                    style("✓").green(),
                    model.filename,
                    format_size(len)
                );
                skip_count += 1;
                continue;
            }
        }

        let pb = multi_progress.add(ProgressBar::new(model.size_bytes));
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  {spinner:.green} {msg:<30} [{bar:25.cyan/blue}] {bytes}/{total_bytes}")?
                .progress_chars("=>-"),
        );
        pb.set_message(model.filename.clone());

        match download_file(&client, model.url, &path, &pb).await {
            Ok(()) => {
                pb.finish_with_message(format!("{} {}", style("✓").green(), model.filename));
                success_count += 1;
            }
            Err(e) => {
                warn!("Download of {} failed: {}", model.url, e);
                pb.finish_with_message(format!("{} {} - {}", style("✗").red(), model.filename, e));
                error_count += 1;
            }
        }
    }

    println!();

    if error_count == 0 {
        println!("{} Models ready", style("✓").green().bold());
        if skip_count > 0 {
            println!(
                "   {} downloaded, {} already present",
                success_count, skip_count
            );
        }
    } else {
        println!(
            "{} Download completed with errors",
            style("⚠").yellow().bold()
        );
        println!(
            "   {} downloaded, {} skipped, {} failed",
            success_count, skip_count, error_count
        );
        println!();
        println!("Retry with: postlens models download --force");
    }

    println!();
    check_status(model_dir, files)?;

    if error_count > 0 {
        anyhow::bail!("{} model file(s) failed to download", error_count);
    }
    Ok(())
}

async fn download_file(
    client: &reqwest::Client,
    url: &str,
    path: &Path,
    pb: &ProgressBar,
) -> anyhow::Result<()> {
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        anyhow::bail!("HTTP {}", response.status());
    }

    if let Some(content_length) = response.content_length() {
        pb.set_length(content_length);
    }

    // Write to a temp file and rename once complete
    let temp_path = path.with_extension("tmp");
    let mut file = File::create(&temp_path)?;

    let mut stream = response.bytes_stream();
    let mut downloaded: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk)?;
        downloaded += chunk.len() as u64;
        pb.set_position(downloaded);
    }

    file.flush()?;
    drop(file);

    fs::rename(&temp_path, path)?;
    debug!("Saved {} ({} bytes)", path.display(), downloaded);

    Ok(())
}

fn check_status(model_dir: &Path, files: &[ModelFile]) -> anyhow::Result<()> {
    println!("{}", style("Model Status").bold());
    println!("{}", model_dir.display());

    let mut all_present = true;
    let mut total_size: u64 = 0;

    for model in files {
        let path = model_dir.join(&model.filename);
        let (status, size_str) = if path.exists() {
            let size = fs::metadata(&path)?.len();
            total_size += size;

            if model.looks_complete(size) {
                (style("✓").green(), format_size(size))
            } else {
                all_present = false;
                (
                    style("⚠").yellow(),
                    format!("{} (incomplete?)", format_size(size)),
                )
            }
        } else {
            all_present = false;
            (style("✗").red(), "missing".to_string())
        };

        println!(
            "    {} {:<25} {:>10}  {}",
            status,
            model.filename,
            size_str,
            style(model.description).dim()
        );
    }

    if all_present {
        println!(
            "    {} Ready ({} total)",
            style("✓").green(),
            format_size(total_size)
        );
    } else {
        println!(
            "    {} Run 'postlens models download' to download",
            style("⚠").yellow()
        );
    }

    Ok(())
}

fn clean_models(model_dir: &Path, files: &[ModelFile]) -> anyhow::Result<()> {
    let mut total_removed = 0;
    let mut total_freed: u64 = 0;

    for model in files {
        let path = model_dir.join(&model.filename);
        if path.exists() {
            let size = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
            fs::remove_file(&path)?;
            total_removed += 1;
            total_freed += size;
            println!("  {} Removed {}", style("✓").green(), model.filename);
        }
    }

    // Leftovers from interrupted downloads
    if let Ok(entries) = fs::read_dir(model_dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|e| e == "tmp") {
                let _ = fs::remove_file(&path);
            }
        }
    }

    if total_removed > 0 {
        println!();
        println!(
            "{} Removed {} files, freed {}",
            style("✓").green(),
            total_removed,
            format_size(total_freed)
        );
    } else {
        println!("{} No model files to remove.", style("ℹ").blue());
    }

    Ok(())
}

fn format_size(bytes: u64) -> String {
    if bytes >= 1_000_000_000 {
        format!("{:.1}GB", bytes as f64 / 1_000_000_000.0)
    } else if bytes >= 1_000_000 {
        format!("{:.1}MB", bytes as f64 / 1_000_000.0)
    } else if bytes >= 1_000 {
        format!("{:.1}KB", bytes as f64 / 1_000.0)
    } else {
        format!("{}B", bytes)
    }
}
