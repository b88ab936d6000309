//! Assembly driver: the whole pipeline, composed strictly sequentially.
//!
//! Each stage fully materializes its output before the next begins —
//! no streaming, no parallel fan-out. The stage outputs travel through this
//! function's locals instead of a shared mutable accumulator, so the data
//! flow reads top to bottom exactly as it executes:
//!
//! ```text
//! Start → Resolving → Extracting → Downloading → Packing → Done
//!              │                                    │
//!              └─▶ NoPayload (marker missing)       └─▶ NoImages (zero decoded)
//! ```
//!
//! The two early exits are reported statuses, not errors: a page without the
//! marker element or a document whose every image failed is a "nothing to do"
//! condition the caller is expected to handle.

use crate::config::AssemblyConfig;
use crate::error::Know2PdfError;
use crate::output::{AssemblyOutput, AssemblyStats, PageFailure, RunStatus};
use crate::pipeline::{download, extract, pack, resolve};
use std::path::Path;
use std::time::Instant;
use tempfile::TempDir;
use tracing::{info, warn};

/// Fetch a shared document page, download its page images, and pack them
/// into a single PDF at `config.output_path`.
///
/// This is the primary entry point for the library.
///
/// # Returns
/// `Ok(AssemblyOutput)` for every terminal state the pipeline can reach,
/// including the two early exits ([`RunStatus::NoPayload`],
/// [`RunStatus::NoImages`]) where no file is written. Per-image download
/// failures never fail the run; they are listed in `output.failures`.
///
/// # Errors
/// Returns `Err(Know2PdfError)` only for fatal conditions: a bad URL, a
/// failed page fetch, schema drift in the embedded payload, or a packing or
/// write failure.
pub async fn assemble(
    source_url: impl AsRef<str>,
    config: &AssemblyConfig,
) -> Result<AssemblyOutput, Know2PdfError> {
    let total_start = Instant::now();
    let source_url = source_url.as_ref();
    info!("Starting assembly: {}", source_url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(config.download_timeout_secs))
        .user_agent(&config.user_agent)
        .build()
        .map_err(|e| Know2PdfError::Internal(format!("HTTP client: {e}")))?;

    // ── Resolve ──────────────────────────────────────────────────────────
    let resolved = resolve::resolve_page(&client, source_url, config.download_timeout_secs).await?;

    let Some(payload) = resolve::embedded_payload(&resolved.html, &config.marker_id) else {
        warn!(
            "No '{}' marker element in {} — nothing to assemble",
            config.marker_id, resolved.url
        );
        return Ok(AssemblyOutput {
            status: RunStatus::NoPayload,
            source_url: resolved.url.to_string(),
            output_path: None,
            page_urls: Vec::new(),
            failures: Vec::new(),
            stats: AssemblyStats {
                total_duration_ms: total_start.elapsed().as_millis() as u64,
                ..Default::default()
            },
        });
    };

    // ── Extract ──────────────────────────────────────────────────────────
    let page_urls = extract::extract_page_urls(&payload)?;
    info!("Document lists {} pages", page_urls.len());
    if let Some(ref cb) = config.progress_callback {
        cb.on_pages_listed(page_urls.len());
    }

    // ── Download ─────────────────────────────────────────────────────────
    let download_start = Instant::now();
    let outcomes = download::download_pages(&client, &page_urls, config).await;
    let download_duration_ms = download_start.elapsed().as_millis() as u64;

    let mut decoded = Vec::new();
    let mut failures = Vec::new();
    for outcome in outcomes {
        match outcome {
            download::PageOutcome::Decoded(page) => decoded.push(page),
            download::PageOutcome::Failed { index, url, error } => {
                failures.push(PageFailure { index, url, error })
            }
        }
    }
    if let Some(ref cb) = config.progress_callback {
        cb.on_downloads_complete(page_urls.len(), decoded.len());
    }

    let mut stats = AssemblyStats {
        listed_pages: page_urls.len(),
        decoded_pages: decoded.len(),
        failed_pages: failures.len(),
        download_duration_ms,
        ..Default::default()
    };

    if decoded.is_empty() {
        warn!("No images downloaded — PDF not created");
        stats.total_duration_ms = total_start.elapsed().as_millis() as u64;
        return Ok(AssemblyOutput {
            status: RunStatus::NoImages,
            source_url: resolved.url.to_string(),
            output_path: None,
            page_urls,
            failures,
            stats,
        });
    }

    // ── Pack ─────────────────────────────────────────────────────────────
    // Staging and PDF serialisation are CPU-bound; keep them off the async
    // executor the same way the network stages stay off the blocking pool.
    let pack_start = Instant::now();
    let title = resolved.url.to_string();
    let dpi = config.page_dpi;
    let bytes = tokio::task::spawn_blocking(move || -> Result<Vec<u8>, Know2PdfError> {
        let scratch = TempDir::new()
            .map_err(|e| Know2PdfError::Internal(format!("scratch directory: {e}")))?;
        let staged = pack::stage_pages(&decoded, scratch.path())?;
        pack::pack_pdf(&staged, &title, dpi)
        // `scratch` drops here: staged files are removed on every exit path.
    })
    .await
    .map_err(|e| Know2PdfError::Internal(format!("packing task: {e}")))??;
    stats.pack_duration_ms = pack_start.elapsed().as_millis() as u64;

    pack::write_output(&bytes, &config.output_path).await?;
    stats.total_duration_ms = total_start.elapsed().as_millis() as u64;

    info!(
        "PDF created at {} ({}/{} pages, {}ms)",
        config.output_path.display(),
        stats.decoded_pages,
        stats.listed_pages,
        stats.total_duration_ms
    );

    Ok(AssemblyOutput {
        status: RunStatus::Completed,
        source_url: resolved.url.to_string(),
        output_path: Some(config.output_path.clone()),
        page_urls,
        failures,
        stats,
    })
}

/// Like [`assemble`], with the output path given per call instead of taken
/// from the config.
///
/// Convenient when one shared config serves many documents, each written to
/// its own file. The config's `output_path` is ignored for this run.
pub async fn assemble_to_file(
    source_url: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &AssemblyConfig,
) -> Result<AssemblyOutput, Know2PdfError> {
    let mut config = config.clone();
    config.output_path = output_path.as_ref().to_path_buf();
    assemble(source_url, &config).await
}

/// Synchronous wrapper around [`assemble`].
///
/// Creates a temporary tokio runtime internally.
pub fn assemble_sync(
    source_url: impl AsRef<str>,
    config: &AssemblyConfig,
) -> Result<AssemblyOutput, Know2PdfError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Know2PdfError::Internal(format!("Failed to create tokio runtime: {e}")))?
        .block_on(assemble(source_url, config))
}
