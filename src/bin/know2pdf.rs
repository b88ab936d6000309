//! CLI binary for know2pdf.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `AssemblyConfig`, prompts for the source URL when it was not given, and
//! prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use know2pdf::{
    assemble, AssemblyConfig, AssemblyProgressCallback, ProgressCallback, RunStatus,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a live bar over the sequential download loop,
/// with one printed line per dropped page.
struct CliProgressBar {
    bar: ProgressBar,
    errors: AtomicUsize,
}

impl CliProgressBar {
    /// Create a callback whose bar length is set by `on_pages_listed`
    /// once the payload has been read.
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(spinner_style);
        bar.set_prefix("Resolving");
        bar.set_message("Fetching document page…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            errors: AtomicUsize::new(0),
        })
    }
}

impl AssemblyProgressCallback for CliProgressBar {
    fn on_pages_listed(&self, total_pages: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} pages",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");

        self.bar.set_length(total_pages as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Downloading");
        self.bar.set_message("");
    }

    fn on_page_downloaded(&self, page_num: usize, _total_pages: usize) {
        self.bar.set_message(format!("page {page_num}"));
        self.bar.inc(1);
    }

    fn on_page_failed(&self, page_num: usize, total_pages: usize, error: String) {
        self.errors.fetch_add(1, Ordering::SeqCst);

        // Truncate very long error messages to keep output tidy.
        let msg = if error.chars().count() > 80 {
            let head: String = error.chars().take(79).collect();
            format!("{head}\u{2026}")
        } else {
            error
        };

        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            red("✗"),
            page_num,
            total_pages,
            red(&msg),
        ));
        self.bar.inc(1);
    }

    fn on_downloads_complete(&self, _total_pages: usize, _decoded_count: usize) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Assemble a shared document into ./output.pdf
  know2pdf https://knowunity.de/knows/abc123

  # Choose the output file
  know2pdf https://knowunity.de/knows/abc123 -o algebra-notes.pdf

  # No URL argument: you are prompted on stdin
  know2pdf

  # Machine-readable run report on stdout
  know2pdf --json https://knowunity.de/knows/abc123 > report.json

EXIT STATUS:
  0  PDF written
  1  nothing to assemble (no embedded state, or every image failed) or error

ENVIRONMENT VARIABLES:
  KNOW2PDF_OUTPUT   Default output path (same as -o)
  RUST_LOG          Override the tracing filter (e.g. know2pdf=debug)
"#;

/// Download a shared study document and reassemble it into a single PDF.
#[derive(Parser, Debug)]
#[command(
    name = "know2pdf",
    version,
    about = "Download a shared study document and reassemble its page images into a PDF",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Share URL of the document. Prompted on stdin when omitted.
    url: Option<String>,

    /// Write the PDF to this path (overwritten if it exists).
    #[arg(short, long, env = "KNOW2PDF_OUTPUT", default_value = "output.pdf")]
    output: PathBuf,

    /// Pixel density used to size PDF pages from the source images (18–1200).
    #[arg(long, env = "KNOW2PDF_DPI", default_value_t = 96.0)]
    dpi: f32,

    /// Per-request timeout in seconds.
    #[arg(long, env = "KNOW2PDF_TIMEOUT", default_value_t = 120)]
    timeout: u64,

    /// Id of the script element carrying the embedded page state.
    #[arg(long, env = "KNOW2PDF_MARKER_ID", default_value = know2pdf::DEFAULT_MARKER_ID)]
    marker_id: String,

    /// Print the run report as JSON on stdout.
    #[arg(long, env = "KNOW2PDF_JSON")]
    json: bool,

    /// Disable the progress bar.
    #[arg(long, env = "KNOW2PDF_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "KNOW2PDF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "KNOW2PDF_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Resolve the source URL once, before the pipeline starts ──────────
    let url = match cli.url {
        Some(ref url) => url.clone(),
        None => prompt_for_url()?,
    };

    // ── Build config ─────────────────────────────────────────────────────
    let progress: Option<ProgressCallback> = if show_progress {
        Some(CliProgressBar::new() as Arc<dyn AssemblyProgressCallback>)
    } else {
        None
    };

    let mut builder = AssemblyConfig::builder()
        .output_path(&cli.output)
        .page_dpi(cli.dpi)
        .download_timeout_secs(cli.timeout)
        .marker_id(&cli.marker_id);
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }
    let config = builder.build().context("Invalid configuration")?;

    // ── Run the pipeline ─────────────────────────────────────────────────
    let output = assemble(&url, &config).await.context("Assembly failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&output).context("Failed to serialise run report")?
        );
    }

    match output.status {
        RunStatus::Completed => {
            if !cli.quiet {
                eprintln!(
                    "{}  {}/{} pages  {}ms  →  {}",
                    if output.stats.failed_pages == 0 {
                        green("✔")
                    } else {
                        green("⚠")
                    },
                    output.stats.decoded_pages,
                    output.stats.listed_pages,
                    output.stats.total_duration_ms,
                    bold(&cli.output.display().to_string()),
                );
                if output.stats.failed_pages > 0 {
                    eprintln!(
                        "   {}",
                        dim(&format!(
                            "{} pages dropped (download or decode failure)",
                            output.stats.failed_pages
                        ))
                    );
                }
            }
            Ok(())
        }
        RunStatus::NoPayload => {
            eprintln!(
                "{}  No embedded document state found at {} — is this a document share link?",
                red("✘"),
                output.source_url
            );
            std::process::exit(1);
        }
        RunStatus::NoImages => {
            eprintln!(
                "{}  None of the {} page images could be downloaded — PDF not created",
                red("✘"),
                output.stats.listed_pages
            );
            std::process::exit(1);
        }
    }
}

/// Ask for the source URL on stdin. Runs once, before the pipeline starts.
fn prompt_for_url() -> Result<String> {
    eprint!("Enter document URL: ");
    io::stderr().flush().ok();

    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .context("Failed to read URL from stdin")?;

    let url = line.trim().to_string();
    if url.is_empty() {
        anyhow::bail!("No URL given");
    }
    Ok(url)
}
