//! Configuration for a document-assembly run.
//!
//! All behaviour is controlled through [`AssemblyConfig`], built via its
//! [`AssemblyConfigBuilder`]. Keeping every knob in one struct makes it easy
//! to share a config across calls and to understand why two runs differed.
//!
//! # Design choice: builder over constructor
//! Callers set only what they care about and rely on documented defaults for
//! the rest; new fields never break existing call sites.

use crate::error::Know2PdfError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;

/// The marker element id the source site's rendering framework uses for its
/// serialized page state.
pub const DEFAULT_MARKER_ID: &str = "__NEXT_DATA__";

/// Configuration for assembling a shared document into a PDF.
///
/// Built via [`AssemblyConfig::builder()`] or using
/// [`AssemblyConfig::default()`].
///
/// # Example
/// ```rust
/// use know2pdf::AssemblyConfig;
///
/// let config = AssemblyConfig::builder()
///     .output_path("notes.pdf")
///     .page_dpi(150.0)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct AssemblyConfig {
    /// Where the final PDF is written. Default: `output.pdf` in the working
    /// directory. Overwritten unconditionally if it already exists.
    pub output_path: PathBuf,

    /// Timeout applied to every outbound request, in seconds. Default: 120.
    ///
    /// Covers both the page-resolution round-trips and each image download.
    /// There is no retry anywhere in the pipeline, so a timed-out image
    /// download simply drops that page.
    pub download_timeout_secs: u64,

    /// DPI used to derive PDF page size from image pixel dimensions.
    /// Default: 96.0.
    ///
    /// The source images are screen renders, so 96 DPI (CSS pixel density)
    /// reproduces them at their intended physical size. Raising this shrinks
    /// the printed page without touching the pixels.
    pub page_dpi: f32,

    /// Id of the script element carrying the embedded page state.
    /// Default: [`DEFAULT_MARKER_ID`].
    ///
    /// The marker is part of the source site's externally-owned contract;
    /// configurable so a rename on their side is a one-line fix for callers.
    pub marker_id: String,

    /// `User-Agent` header sent with every request.
    /// Default: `know2pdf/<crate version>`.
    pub user_agent: String,

    /// Optional per-page progress callback. Default: none.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from("output.pdf"),
            download_timeout_secs: 120,
            page_dpi: 96.0,
            marker_id: DEFAULT_MARKER_ID.to_string(),
            user_agent: format!("know2pdf/{}", env!("CARGO_PKG_VERSION")),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for AssemblyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssemblyConfig")
            .field("output_path", &self.output_path)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field("page_dpi", &self.page_dpi)
            .field("marker_id", &self.marker_id)
            .field("user_agent", &self.user_agent)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn callback>"),
            )
            .finish()
    }
}

impl AssemblyConfig {
    /// Create a new builder for `AssemblyConfig`.
    pub fn builder() -> AssemblyConfigBuilder {
        AssemblyConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`AssemblyConfig`].
#[derive(Debug)]
pub struct AssemblyConfigBuilder {
    config: AssemblyConfig,
}

impl AssemblyConfigBuilder {
    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output_path = path.into();
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs.max(1);
        self
    }

    pub fn page_dpi(mut self, dpi: f32) -> Self {
        self.config.page_dpi = dpi;
        self
    }

    pub fn marker_id(mut self, id: impl Into<String>) -> Self {
        self.config.marker_id = id.into();
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.user_agent = ua.into();
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AssemblyConfig, Know2PdfError> {
        let c = &self.config;
        if !(18.0..=1200.0).contains(&c.page_dpi) {
            return Err(Know2PdfError::InvalidConfig(format!(
                "page DPI must be 18–1200, got {}",
                c.page_dpi
            )));
        }
        if c.marker_id.is_empty() {
            return Err(Know2PdfError::InvalidConfig(
                "marker id must not be empty".into(),
            ));
        }
        // The marker id is interpolated into an element selector; restrict it
        // to the charset of a plain HTML id so it can never break selector
        // syntax.
        if !c
            .marker_id
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
        {
            return Err(Know2PdfError::InvalidConfig(format!(
                "marker id '{}' may only contain ASCII letters, digits, '_' and '-'",
                c.marker_id
            )));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let c = AssemblyConfig::default();
        assert_eq!(c.output_path, PathBuf::from("output.pdf"));
        assert_eq!(c.download_timeout_secs, 120);
        assert_eq!(c.marker_id, "__NEXT_DATA__");
        assert!(c.user_agent.starts_with("know2pdf/"));
    }

    #[test]
    fn builder_rejects_absurd_dpi() {
        let err = AssemblyConfig::builder().page_dpi(5.0).build().unwrap_err();
        assert!(err.to_string().contains("DPI"));
    }

    #[test]
    fn builder_rejects_empty_marker() {
        let err = AssemblyConfig::builder().marker_id("").build().unwrap_err();
        assert!(err.to_string().contains("marker"));
    }

    #[test]
    fn builder_rejects_selector_breaking_marker() {
        let err = AssemblyConfig::builder()
            .marker_id("bad'id]")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("marker id"), "got: {err}");
    }

    #[test]
    fn builder_sets_fields() {
        let c = AssemblyConfig::builder()
            .output_path("/tmp/doc.pdf")
            .download_timeout_secs(30)
            .page_dpi(150.0)
            .marker_id("__APP_STATE__")
            .build()
            .expect("valid config");
        assert_eq!(c.output_path, PathBuf::from("/tmp/doc.pdf"));
        assert_eq!(c.download_timeout_secs, 30);
        assert_eq!(c.page_dpi, 150.0);
        assert_eq!(c.marker_id, "__APP_STATE__");
    }
}
