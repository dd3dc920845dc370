use anyhow::{Context, Result};
use colored::Colorize;
use futures::{stream, Stream, StreamExt};
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

use crate::{
    api::PixhostClient,
    app::{init_config, Config},
    clipboard::clipboard_for,
    gallery::{
        collect_image_paths, GalleryDescriptor, GalleryLogEntry, GallerySession, GalleryWorkflow,
        UploadObserver, UploadOutcome, UploadProgress, UploadReport,
    },
    utils::{log_error, log_info, log_progress, log_warn},
};

use super::{Cli, Commands, GalleryHashes, OutputFormat};

const ABOUT: &str = "\
How to use pixup:

1. Create a gallery:
   pixup create <name> [--public]
   Note the gallery hash and upload hash it prints.

2. Upload images to the gallery:
   pixup upload --gallery-hash <hash> --upload-hash <upload hash> <images or folders>...
   Images are uploaded one at a time, in the order given.
   Each image link is appended to the image links log.

3. Finalize the gallery:
   pixup finalize --gallery-hash <hash> --upload-hash <upload hash> --url <url> --name <name>
   The gallery URL and name are appended to the galleries log
   and the URL is copied to the clipboard.

Or do all three at once:
   pixup run <name> <images or folders>... [--public]

Upload images before finalizing the gallery.";

/// Exit status after a second Ctrl-C (128 + SIGINT)
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Handle CLI subcommands.
///
/// Returns `false` when the command ran but some of its work failed,
/// e.g. individual images in an upload batch.
pub async fn handle_command(cli: &Cli, config: &Config) -> Result<bool> {
    let format = cli.output_format;

    match &cli.command {
        Commands::Init => {
            match init_config()? {
                Some(path) => println!("Created default configuration at: {}", path.display()),
                None => println!("Configuration already exists, nothing to do"),
            }
            Ok(true)
        }
        Commands::Create { name, public } => {
            let workflow = build_workflow(config, cli.no_clipboard, None)?;
            let descriptor = workflow
                .create_gallery(name, *public)
                .await
                .context("Error creating gallery")?;
            print_descriptor(&descriptor, format)?;
            Ok(true)
        }
        Commands::Upload {
            gallery,
            paths,
            pace_ms,
        } => {
            let workflow = build_workflow(config, cli.no_clipboard, *pace_ms)?;
            let mut session = GallerySession::new(&workflow);
            session.resume(descriptor_from(gallery, None, None))?;

            let report = upload_batch(&session, paths, format).await?;
            Ok(report.failure_count() == 0 && !report.cancelled)
        }
        Commands::Finalize { gallery, url, name } => {
            let workflow = build_workflow(config, cli.no_clipboard, None)?;
            let mut session = GallerySession::new(&workflow);
            session.resume(descriptor_from(gallery, Some(url.clone()), name.clone()))?;

            let entry = session
                .finalize()
                .await
                .context("Error finalizing gallery")?;
            print_finalized(entry, clipboard_enabled(config, cli.no_clipboard), format)?;
            Ok(true)
        }
        Commands::Run {
            name,
            paths,
            public,
            pace_ms,
            no_finalize,
        } => {
            let workflow = build_workflow(config, cli.no_clipboard, *pace_ms)?;
            let mut session = GallerySession::new(&workflow);

            let descriptor = session
                .create(name, *public)
                .await
                .context("Error creating gallery")?;
            print_descriptor(descriptor, format)?;

            let report = upload_batch(&session, paths, format).await?;
            if report.cancelled {
                log_warn("⏹️", "Upload cancelled; gallery left open");
                return Ok(false);
            }

            if *no_finalize {
                return Ok(report.failure_count() == 0);
            }

            let entry = session
                .finalize()
                .await
                .context("Error finalizing gallery")?;
            print_finalized(entry, clipboard_enabled(config, cli.no_clipboard), format)?;
            Ok(report.failure_count() == 0)
        }
        Commands::History { images } => {
            let workflow = build_workflow(config, true, None)?;
            if *images {
                let links = workflow.image_links().links()?;
                print_links(&links, format)?;
            } else {
                let entries = workflow.galleries_log().entries()?;
                print_history(&entries, format)?;
            }
            Ok(true)
        }
        Commands::About => {
            println!("{}", ABOUT);
            Ok(true)
        }
        Commands::Version => {
            show_version();
            Ok(true)
        }
    }
}

/// Show version information
pub fn show_version() {
    println!("pixup v{}", env!("CARGO_PKG_VERSION"));
    println!("   Create, fill and finalize pixhost galleries");
}

fn clipboard_enabled(config: &Config, no_clipboard: bool) -> bool {
    config.clipboard.enabled && !no_clipboard
}

fn build_workflow(
    config: &Config,
    no_clipboard: bool,
    pace_ms: Option<u64>,
) -> Result<GalleryWorkflow> {
    let mut config = config.clone();
    if let Some(pace_ms) = pace_ms {
        config.upload.pace_ms = pace_ms;
    }

    let client = PixhostClient::new(&config.api)?;
    log_info("🌐", format!("Using API at {}", client.base_url()));

    Ok(GalleryWorkflow::from_config(
        &config,
        Box::new(client),
        clipboard_for(&config.clipboard, no_clipboard),
    ))
}

fn descriptor_from(
    gallery: &GalleryHashes,
    url: Option<String>,
    name: Option<String>,
) -> GalleryDescriptor {
    GalleryDescriptor::from_hashes(&gallery.gallery_hash, &gallery.upload_hash, url, name)
}

/// Run one batch with Ctrl-C wired to the cancellation token
async fn upload_batch(
    session: &GallerySession<'_>,
    inputs: &[PathBuf],
    format: OutputFormat,
) -> Result<UploadReport> {
    let paths = collect_image_paths(inputs)?;

    let cancel = CancellationToken::new();
    let watcher = tokio::spawn(watch_interrupts(ctrl_c_presses(), cancel.clone(), || {
        std::process::exit(INTERRUPTED_EXIT_CODE);
    }));

    let printer = TerminalProgress { format };
    let result = session.upload(paths, &cancel, Some(&printer)).await;
    watcher.abort();
    // tokio keeps SIGINT hooked for the rest of the process; from here on
    // (finalize, clipboard hand-off) one Ctrl-C quits
    tokio::spawn(async {
        if tokio::signal::ctrl_c().await.is_ok() {
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
    });

    let report = result.context("Error uploading images")?;
    if format == OutputFormat::Json {
        print_json(&report_json(&report))?;
    }
    Ok(report)
}

fn ctrl_c_presses() -> impl Stream<Item = ()> {
    stream::unfold((), |_| async {
        tokio::signal::ctrl_c().await.ok().map(|_| ((), ()))
    })
}

/// The first interrupt stops the batch after the current upload; a second
/// one calls `force_quit`, for when that upload hangs.
async fn watch_interrupts<S, F>(interrupts: S, cancel: CancellationToken, force_quit: F)
where
    S: Stream<Item = ()>,
    F: FnOnce(),
{
    tokio::pin!(interrupts);

    if interrupts.next().await.is_none() {
        return;
    }
    log_warn(
        "⏹️",
        "Interrupted; stopping after the current upload (Ctrl-C again to quit now)",
    );
    cancel.cancel();

    if interrupts.next().await.is_some() {
        log_error("⏹️", "Interrupted again; quitting");
        force_quit();
    }
}

/// Progress lines on stderr, results on stdout
struct TerminalProgress {
    format: OutputFormat,
}

impl UploadObserver for TerminalProgress {
    fn on_attempt(&self, outcome: &UploadOutcome, progress: UploadProgress) {
        let line = match outcome {
            UploadOutcome::Uploaded(result) => format!(
                "{} {}",
                "uploaded".green(),
                result.source_path.display()
            ),
            UploadOutcome::Failed { source_path, error } => format!(
                "{} {}: {}",
                "failed".red(),
                source_path.display(),
                error
            ),
        };
        log_progress(
            progress.completed,
            progress.total,
            format!("{:>3.0}% {}", progress.percent(), line),
        );

        if self.format == OutputFormat::Text {
            if let UploadOutcome::Uploaded(result) = outcome {
                println!("{}", result.display_url);
            }
        }
    }

    fn on_finished(&self, report: &UploadReport) {
        let summary = format!(
            "{} uploaded, {} failed, {} skipped in {}s",
            report.success_count(),
            report.failure_count(),
            report.skipped(),
            (report.finished_at - report.started_at).num_seconds()
        );
        if report.failure_count() == 0 && !report.cancelled {
            eprintln!("{} {}", "All images attempted:".green().bold(), summary);
        } else {
            eprintln!("{} {}", "Upload finished with problems:".yellow().bold(), summary);
        }
    }
}

fn report_json(report: &UploadReport) -> serde_json::Value {
    let uploaded: Vec<_> = report
        .successes()
        .map(|result| json!({ "path": result.source_path, "url": result.display_url }))
        .collect();
    let failed: Vec<_> = report
        .failures()
        .map(|(path, error)| json!({ "path": path, "error": error.to_string() }))
        .collect();

    json!({
        "total": report.total,
        "uploaded": uploaded,
        "failed": failed,
        "cancelled": report.cancelled,
        "started_at": report.started_at,
        "finished_at": report.finished_at,
    })
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_descriptor(descriptor: &GalleryDescriptor, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(descriptor),
        OutputFormat::Text => {
            println!("{}", "Gallery created:".green().bold());
            println!("  Name:        {}", descriptor.name());
            println!("  Hash:        {}", descriptor.hash());
            println!("  Upload hash: {}", descriptor.upload_hash());
            println!("  URL:         {}", descriptor.url());
            println!("  Public:      {}", if descriptor.is_public() { "yes" } else { "no" });
            Ok(())
        }
    }
}

fn print_finalized(entry: &GalleryLogEntry, copied: bool, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(entry),
        OutputFormat::Text => {
            println!("{} {}", "Gallery finalized:".green().bold(), entry.url);
            if copied {
                println!("  URL copied to clipboard");
            }
            Ok(())
        }
    }
}

fn print_history(entries: &[GalleryLogEntry], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(entries),
        OutputFormat::Text => {
            if entries.is_empty() {
                println!("No finalized galleries yet");
            }
            for entry in entries {
                println!("  • {} {}", entry.url.green(), entry.name);
            }
            Ok(())
        }
    }
}

fn print_links(links: &[String], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(links),
        OutputFormat::Text => {
            if links.is_empty() {
                println!("No uploaded images yet");
            }
            for link in links {
                println!("  • {}", link);
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::PixupError;
    use chrono::Local;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    fn quit_flag() -> (Arc<AtomicBool>, impl FnOnce()) {
        let quit = Arc::new(AtomicBool::new(false));
        let flag = quit.clone();
        (quit, move || flag.store(true, Ordering::SeqCst))
    }

    #[tokio::test]
    async fn test_first_interrupt_only_cancels() {
        let cancel = CancellationToken::new();
        let (quit, force_quit) = quit_flag();

        watch_interrupts(stream::iter([()]), cancel.clone(), force_quit).await;
        assert!(cancel.is_cancelled());
        assert!(!quit.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_second_interrupt_forces_quit() {
        let cancel = CancellationToken::new();
        let (quit, force_quit) = quit_flag();

        watch_interrupts(stream::iter([(), ()]), cancel.clone(), force_quit).await;
        assert!(cancel.is_cancelled());
        assert!(quit.load(Ordering::SeqCst));
        assert_eq!(INTERRUPTED_EXIT_CODE, 130);
    }

    #[tokio::test]
    async fn test_no_interrupt_leaves_batch_running() {
        let cancel = CancellationToken::new();
        let (quit, force_quit) = quit_flag();

        watch_interrupts(stream::empty(), cancel.clone(), force_quit).await;
        assert!(!cancel.is_cancelled());
        assert!(!quit.load(Ordering::SeqCst));
    }

    #[test]
    fn test_report_json_lists_both_sides() {
        let now = Local::now();
        let report = UploadReport {
            outcomes: vec![
                UploadOutcome::Uploaded(crate::gallery::UploadResult {
                    source_path: PathBuf::from("a.png"),
                    display_url: "https://pixhost.to/show/1/a.png".to_string(),
                }),
                UploadOutcome::Failed {
                    source_path: PathBuf::from("b.png"),
                    error: PixupError::RemoteError {
                        operation: "upload image",
                        status: 500,
                    },
                },
            ],
            total: 3,
            cancelled: true,
            started_at: now,
            finished_at: now,
        };

        let value = report_json(&report);
        assert_eq!(value["total"], 3);
        assert_eq!(value["uploaded"][0]["url"], "https://pixhost.to/show/1/a.png");
        assert_eq!(value["failed"][0]["path"], "b.png");
        assert_eq!(
            value["failed"][0]["error"],
            "upload image failed with HTTP status 500"
        );
        assert_eq!(value["cancelled"], true);
    }

    #[test]
    fn test_descriptor_from_hashes() {
        let hashes = GalleryHashes {
            gallery_hash: "h1".to_string(),
            upload_hash: "h2".to_string(),
        };
        let descriptor = descriptor_from(&hashes, Some("u".to_string()), None);
        assert_eq!(descriptor.hash(), "h1");
        assert_eq!(descriptor.upload_hash(), "h2");
        assert_eq!(descriptor.url(), "u");
        assert_eq!(descriptor.name(), "");
    }
}
