//! Output types returned by the `assemble*` entry points.
//!
//! A run that reaches a terminal state without a fatal error always yields an
//! [`AssemblyOutput`], even when nothing was written — callers distinguish the
//! three terminal states via [`RunStatus`] instead of parsing log lines.

use crate::error::PageError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Terminal state of an assembly run.
///
/// The pipeline is a single linear pass:
/// `Resolving → Extracting → Downloading → Packing → Done`, with two early
/// exits that are expected conditions rather than errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// The PDF was packed and written to the output path.
    Completed,
    /// The fetched page carried no marker element; nothing to do.
    NoPayload,
    /// Every listed image failed to download or decode; no file written.
    NoImages,
}

/// One dropped page: which URL failed, at which position, and why.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageFailure {
    /// Zero-based position in the source page list.
    pub index: usize,
    /// The image URL that failed.
    pub url: String,
    /// Why the page was dropped.
    pub error: PageError,
}

/// Counters and timings for one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssemblyStats {
    /// Image URLs discovered in the embedded payload.
    pub listed_pages: usize,
    /// Pages that downloaded and decoded successfully (== output PDF pages).
    pub decoded_pages: usize,
    /// Pages dropped by the best-effort download loop.
    pub failed_pages: usize,
    /// Wall-clock duration of the whole run, in milliseconds.
    pub total_duration_ms: u64,
    /// Time spent in the sequential download loop, in milliseconds.
    pub download_duration_ms: u64,
    /// Time spent staging and packing the PDF, in milliseconds.
    pub pack_duration_ms: u64,
}

/// Complete result of an assembly run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssemblyOutput {
    /// Terminal state the run reached.
    pub status: RunStatus,
    /// Canonical (post-redirect) URL the document was resolved to.
    pub source_url: String,
    /// Where the PDF was written; `None` unless `status == Completed`.
    pub output_path: Option<PathBuf>,
    /// The ordered image URL list, exactly as it appeared in the payload.
    pub page_urls: Vec<String>,
    /// Pages that were dropped, in list order.
    pub failures: Vec<PageFailure>,
    /// Counters and timings.
    pub stats: AssemblyStats,
}

impl AssemblyOutput {
    /// `true` when a PDF was written.
    pub fn wrote_file(&self) -> bool {
        self.status == RunStatus::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_round_trips_through_json() {
        let out = AssemblyOutput {
            status: RunStatus::Completed,
            source_url: "https://example.com/doc".into(),
            output_path: Some(PathBuf::from("output.pdf")),
            page_urls: vec!["https://cdn.example.com/p0.webp".into()],
            failures: vec![PageFailure {
                index: 1,
                url: "https://cdn.example.com/p1.webp".into(),
                error: PageError::Status { status: 404 },
            }],
            stats: AssemblyStats {
                listed_pages: 2,
                decoded_pages: 1,
                failed_pages: 1,
                ..Default::default()
            },
        };

        let json = serde_json::to_string_pretty(&out).expect("serialise");
        let back: AssemblyOutput = serde_json::from_str(&json).expect("deserialise");
        assert_eq!(back.status, RunStatus::Completed);
        assert_eq!(back.stats.decoded_pages, 1);
        assert_eq!(back.failures.len(), 1);
    }

    #[test]
    fn wrote_file_only_when_completed() {
        let mut out = AssemblyOutput {
            status: RunStatus::NoImages,
            source_url: String::new(),
            output_path: None,
            page_urls: vec![],
            failures: vec![],
            stats: AssemblyStats::default(),
        };
        assert!(!out.wrote_file());
        out.status = RunStatus::Completed;
        assert!(out.wrote_file());
    }
}
