//! # know2pdf
//!
//! Download a shared study document and reassemble its page images into a
//! single PDF.
//!
//! ## Why this crate?
//!
//! Document-sharing sites serve each page of an uploaded document as a
//! separate raster image behind a server-rendered web page, with no download
//! button. The page order, however, is sitting right there in the page's
//! embedded state JSON. This crate fetches the page, reads that state, pulls
//! every page image in order, and packs them back into the one PDF the
//! uploader started from.
//!
//! ## Pipeline Overview
//!
//! ```text
//! URL
//!  │
//!  ├─ 1. Resolve   follow redirects, fetch HTML, locate the state marker
//!  ├─ 2. Extract   walk the payload schema to the ordered image URL list
//!  ├─ 3. Download  sequential best-effort fetch + decode, one outcome per URL
//!  └─ 4. Pack      stage as indexed PNGs, one image per PDF page, write file
//! ```
//!
//! Everything runs on a single sequential path — no concurrency, no retries,
//! no state between runs. A page image that fails to download is dropped with
//! a warning; every other failure aborts the run.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use know2pdf::{assemble, AssemblyConfig, RunStatus};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AssemblyConfig::builder()
//!         .output_path("notes.pdf")
//!         .build()?;
//!     let output = assemble("https://knowunity.de/knows/...", &config).await?;
//!     match output.status {
//!         RunStatus::Completed => println!("wrote {:?}", output.output_path),
//!         RunStatus::NoPayload => println!("page carried no document state"),
//!         RunStatus::NoImages => println!("every page image failed to download"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `know2pdf` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! know2pdf = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod assemble;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use assemble::{assemble, assemble_sync, assemble_to_file};
pub use config::{AssemblyConfig, AssemblyConfigBuilder, DEFAULT_MARKER_ID};
pub use error::{Know2PdfError, PageError};
pub use output::{AssemblyOutput, AssemblyStats, PageFailure, RunStatus};
pub use progress::{AssemblyProgressCallback, NoopProgressCallback, ProgressCallback};
