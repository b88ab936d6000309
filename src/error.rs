//! Error types for the know2pdf library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Know2PdfError`] — **Fatal**: the run cannot proceed at all (bad URL,
//!   the source page could not be fetched, the embedded state no longer
//!   matches the expected schema, the PDF could not be packed or written).
//!   Returned as `Err(Know2PdfError)` from the top-level `assemble*`
//!   functions.
//!
//! * [`PageError`] — **Non-fatal**: a single page image failed to download or
//!   decode. Stored inside [`crate::output::PageFailure`]; the pipeline skips
//!   that page and keeps going, so one bad image never loses the whole
//!   document.
//!
//! Note that a missing marker element and an all-pages-failed run are *not*
//! errors at all — they are reported as [`crate::output::RunStatus`] variants,
//! because "nothing to assemble" is an expected terminal condition, not a
//! crash.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the know2pdf library.
///
/// Per-image failures use [`PageError`] and are stored in
/// [`crate::output::PageFailure`] rather than propagated here.
#[derive(Debug, Error)]
pub enum Know2PdfError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The source string is not a parseable HTTP/HTTPS URL.
    #[error("Invalid URL '{input}': {reason}")]
    InvalidUrl { input: String, reason: String },

    // ── Network errors ────────────────────────────────────────────────────
    /// A request against the source page failed at the transport level.
    #[error("Request to '{url}' failed: {reason}\nCheck your internet connection.")]
    RequestFailed { url: String, reason: String },

    /// A request exceeded the configured timeout.
    #[error("Request to '{url}' timed out after {secs}s\nIncrease --timeout.")]
    RequestTimeout { url: String, secs: u64 },

    /// The source page answered with a non-success status.
    #[error("'{url}' answered HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    // ── Payload errors ────────────────────────────────────────────────────
    /// The embedded state was found but no longer matches the expected
    /// `props → pageProps → know → knowDocumentPages` path.
    ///
    /// The schema is owned by the source site; when it drifts, only
    /// [`crate::pipeline::extract`] needs to change.
    #[error("Embedded page state does not match the expected schema: {detail}\n\
The source site may have changed its page format.")]
    SchemaDrift { detail: String },

    // ── Packing errors ────────────────────────────────────────────────────
    /// Could not write a staged PNG into the scratch directory.
    #[error("Failed to stage page {index} for packing: {detail}")]
    StagingFailed { index: usize, detail: String },

    /// The PDF assembler rejected the staged image set.
    #[error("Failed to pack images into a PDF: {detail}")]
    PackingFailed { detail: String },

    /// Could not create or write the output PDF file.
    #[error("Failed to write output file '{}': {source}", path.display())]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single page image.
///
/// Stored inside [`crate::output::PageFailure`] when a page is dropped.
/// The run continues; only the final page count shrinks.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum PageError {
    /// The image request failed at the transport level.
    #[error("request failed: {reason}")]
    Request { reason: String },

    /// The image URL answered with a non-success status.
    #[error("HTTP {status}")]
    Status { status: u16 },

    /// The response body could not be decoded as an image.
    #[error("image decode failed: {detail}")]
    Decode { detail: String },
}
