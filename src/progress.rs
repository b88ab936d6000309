//! Progress-callback trait for per-page download events.
//!
//! Inject an [`Arc<dyn AssemblyProgressCallback>`] via
//! [`crate::config::AssemblyConfigBuilder::progress_callback`] to receive
//! events as the pipeline works through the page list.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers can
//! forward events to a terminal progress bar, a log, or a UI without the
//! library knowing anything about how the host application communicates.

use std::sync::Arc;

/// Called by the assembly pipeline as it downloads each page image.
///
/// Downloads are strictly sequential, so events for page *n* always arrive
/// before events for page *n + 1*. All methods have default no-op
/// implementations so callers only override what they care about.
pub trait AssemblyProgressCallback: Send + Sync {
    /// Called once after extraction, before any image is downloaded.
    ///
    /// # Arguments
    /// * `total_pages` — number of image URLs discovered in the payload
    fn on_pages_listed(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called when a page image was downloaded and decoded.
    ///
    /// # Arguments
    /// * `page_num`    — 1-indexed page number
    /// * `total_pages` — total pages in the source document
    fn on_page_downloaded(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called when a page image failed to download or decode and was dropped.
    ///
    /// # Arguments
    /// * `page_num`    — 1-indexed page number
    /// * `total_pages` — total pages
    /// * `error`       — human-readable failure description
    fn on_page_failed(&self, page_num: usize, total_pages: usize, error: String) {
        let _ = (page_num, total_pages, error);
    }

    /// Called once after every page has been attempted.
    ///
    /// # Arguments
    /// * `total_pages`   — total pages in the source document
    /// * `decoded_count` — pages that downloaded and decoded successfully
    fn on_downloads_complete(&self, total_pages: usize, decoded_count: usize) {
        let _ = (total_pages, decoded_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl AssemblyProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::AssemblyConfig`].
pub type ProgressCallback = Arc<dyn AssemblyProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TrackingCallback {
        downloads: AtomicUsize,
        failures: AtomicUsize,
        listed: AtomicUsize,
        decoded: AtomicUsize,
    }

    impl AssemblyProgressCallback for TrackingCallback {
        fn on_pages_listed(&self, total_pages: usize) {
            self.listed.store(total_pages, Ordering::SeqCst);
        }

        fn on_page_downloaded(&self, _page_num: usize, _total_pages: usize) {
            self.downloads.fetch_add(1, Ordering::SeqCst);
        }

        fn on_page_failed(&self, _page_num: usize, _total_pages: usize, _error: String) {
            self.failures.fetch_add(1, Ordering::SeqCst);
        }

        fn on_downloads_complete(&self, _total_pages: usize, decoded_count: usize) {
            self.decoded.store(decoded_count, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_pages_listed(5);
        cb.on_page_downloaded(1, 5);
        cb.on_page_failed(2, 5, "HTTP 404".to_string());
        cb.on_downloads_complete(5, 4);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback {
            downloads: AtomicUsize::new(0),
            failures: AtomicUsize::new(0),
            listed: AtomicUsize::new(0),
            decoded: AtomicUsize::new(0),
        };

        tracker.on_pages_listed(3);
        tracker.on_page_downloaded(1, 3);
        tracker.on_page_failed(2, 3, "image decode failed".to_string());
        tracker.on_page_downloaded(3, 3);
        tracker.on_downloads_complete(3, 2);

        assert_eq!(tracker.listed.load(Ordering::SeqCst), 3);
        assert_eq!(tracker.downloads.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.failures.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.decoded.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: Arc<dyn AssemblyProgressCallback> = Arc::new(NoopProgressCallback);
        cb.on_pages_listed(10);
        cb.on_page_downloaded(1, 10);
    }
}
