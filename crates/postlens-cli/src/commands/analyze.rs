//! Analyze command - extract text from a PDF or image and suggest improvements.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;
use tokio::task::JoinError;
use tracing::{debug, info};

use postlens_core::{
    media_type_for_path, BackendError, ExtractedDocument, ExtractionError, ExtractionProgress,
    LopdfBackend, NativeOrchestrator, Phase, PureOcrFactory, SessionState, SubmittedFile,
    Submission, SuggestionEngine, SuggestionStyle, TextSink, WriterSink,
};

use super::{load_config, resolve_model_dir, OutputFormat};

/// Arguments for the analyze command.
#[derive(Args)]
pub struct AnalyzeArgs {
    /// Input file (PDF or image)
    #[arg(required = true)]
    input: PathBuf,

    /// Declared media type (default: guessed from the file extension)
    #[arg(long)]
    media_type: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Also write the extracted text to this file ("-" for stdout)
    #[arg(long)]
    copy_to: Option<PathBuf>,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Prefix suggestions with icons
    #[arg(long)]
    decorate: bool,
}

pub async fn run(args: AnalyzeArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    config.ocr.model_dir = resolve_model_dir(args.model_dir.as_deref(), &config);
    if args.decorate {
        config.suggestions.style = SuggestionStyle::Decorated;
    }

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let name = args
        .input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| args.input.display().to_string());
    let media_type = args
        .media_type
        .clone()
        .unwrap_or_else(|| media_type_for_path(&args.input).to_string());

    info!("Analyzing {} as {}", args.input.display(), media_type);

    let mut session = SessionState::new();
    let (ticket, backend) = match session.submit(&name, &media_type)? {
        Submission::Started { ticket, backend } => (ticket, backend),
        Submission::Rejected(err) => {
            debug!("{}", err);
            return finish(&session, &args);
        }
    };

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}% {msg}")?
            .progress_chars("##-"),
    );
    pb.set_message(format!("Extracting ({})", backend));

    let engine = SuggestionEngine::new().with_style(config.suggestions.style);
    let file = SubmittedFile::from_path(name, media_type, args.input.clone());

    // Extraction is CPU-bound; progress comes back over a channel
    let (tx, mut rx) = mpsc::unbounded_channel::<ExtractionProgress>();
    let worker = tokio::task::spawn_blocking(move || {
        let pdf = LopdfBackend::new()
            .with_empty_password_decryption(config.pdf.decrypt_empty_password);
        let mut orchestrator =
            NativeOrchestrator::from_config(PureOcrFactory::new(config.ocr.clone()), pdf, &config);
        let mut sink = move |progress: ExtractionProgress| {
            let _ = tx.send(progress);
        };
        orchestrator.extract_with(backend, &file, &mut sink)
    });

    while let Some(progress) = rx.recv().await {
        if session.report_progress(ticket, progress) {
            pb.set_position(u64::from(session.progress.percent()));
        }
    }

    match extraction_outcome(worker.await) {
        Ok(document) => {
            pb.set_message("Analyzing");
            session.complete(ticket, document, &engine);
        }
        Err(err) => {
            session.fail(ticket, &err);
        }
    }
    pb.finish_and_clear();

    debug!("Total processing time: {:?}", start.elapsed());
    finish(&session, &args)
}

/// Flatten the worker result; a panicked or cancelled worker is an
/// extraction failure like any other.
fn extraction_outcome(
    joined: Result<Result<ExtractedDocument, ExtractionError>, JoinError>,
) -> Result<ExtractedDocument, ExtractionError> {
    joined.unwrap_or_else(|e| Err(ExtractionError::from(BackendError::Worker(e.to_string()))))
}

/// Print the session outcome; a failed session becomes the command's error.
fn finish(session: &SessionState, args: &AnalyzeArgs) -> anyhow::Result<()> {
    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(session)?),
        OutputFormat::Text => print_text(session),
    }

    if session.phase == Phase::Failed {
        let message = session.error.as_deref().unwrap_or("Analysis failed");
        anyhow::bail!("{}", message);
    }

    if let (Some(target), Some(text)) = (&args.copy_to, session.text()) {
        copy_text(target, text)?;
        if target.as_os_str() != "-" {
            eprintln!(
                "{} Text copied to {}",
                style("✓").green(),
                target.display()
            );
        }
    }

    Ok(())
}

fn print_text(session: &SessionState) {
    let Some(document) = &session.document else {
        return;
    };

    let source = match document.page_count {
        Some(pages) => format!("{} ({} pages)", document.backend, pages),
        None => document.backend.to_string(),
    };
    println!(
        "{} {}",
        style("Extracted text").bold(),
        style(format!("via {}", source)).dim()
    );
    if document.is_blank() {
        println!("  {}", style("(empty)").dim());
    } else {
        println!("{}", document.text.trim());
    }
    println!();

    println!("{}", style("Suggestions").bold());
    for suggestion in &session.suggestions {
        println!("  - {}", suggestion);
    }
}

fn copy_text(target: &Path, text: &str) -> io::Result<()> {
    if target.as_os_str() == "-" {
        WriterSink::new(io::stdout().lock()).put_text(text)
    } else {
        WriterSink::new(File::create(target)?).put_text(text)
    }
}
