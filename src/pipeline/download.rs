//! Best-effort sequential image download.
//!
//! ## Why an explicit per-URL outcome?
//!
//! The drop-on-failure policy ("a single bad page does not abort the run") is
//! easy to hide inside a loop and impossible to test there. Representing each
//! URL's result as a [`PageOutcome`] makes the policy an explicit, testable
//! transformation: the pack stage filters to the `Decoded` subset, the driver
//! records the `Failed` subset in the run report. The final document may
//! contain fewer pages than the source when some downloads fail — that is by
//! design, and the report says exactly which pages were dropped and why.

use crate::config::AssemblyConfig;
use crate::error::PageError;
use image::DynamicImage;
use tracing::{debug, warn};

/// One page image, downloaded and decoded, still at its position in the
/// source list.
pub struct DecodedPage {
    /// Zero-based position in the source page list.
    pub index: usize,
    /// The URL the image came from.
    pub url: String,
    /// The decoded raster.
    pub image: DynamicImage,
}

/// Result of one URL's fetch + decode attempt.
pub enum PageOutcome {
    /// The image downloaded and decoded; it will become one PDF page.
    Decoded(DecodedPage),
    /// The page was dropped; the reason goes into the run report.
    Failed {
        index: usize,
        url: String,
        error: PageError,
    },
}

impl PageOutcome {
    /// Zero-based position in the source page list.
    pub fn index(&self) -> usize {
        match self {
            PageOutcome::Decoded(page) => page.index,
            PageOutcome::Failed { index, .. } => *index,
        }
    }
}

/// Download every URL in list order, one at a time.
///
/// Never fails as a whole: each URL yields exactly one [`PageOutcome`], in
/// input order, and a failure is absorbed into `PageOutcome::Failed` with a
/// warning. No retries.
pub async fn download_pages(
    client: &reqwest::Client,
    urls: &[String],
    config: &AssemblyConfig,
) -> Vec<PageOutcome> {
    let total = urls.len();
    let mut outcomes = Vec::with_capacity(total);

    for (index, url) in urls.iter().enumerate() {
        let outcome = match fetch_and_decode(client, url).await {
            Ok(image) => {
                debug!(
                    "Page {}/{} decoded ({}x{})",
                    index + 1,
                    total,
                    image.width(),
                    image.height()
                );
                if let Some(ref cb) = config.progress_callback {
                    cb.on_page_downloaded(index + 1, total);
                }
                PageOutcome::Decoded(DecodedPage {
                    index,
                    url: url.clone(),
                    image,
                })
            }
            Err(error) => {
                warn!("Failed to fetch page {}/{} from {}: {}", index + 1, total, url, error);
                if let Some(ref cb) = config.progress_callback {
                    cb.on_page_failed(index + 1, total, error.to_string());
                }
                PageOutcome::Failed {
                    index,
                    url: url.clone(),
                    error,
                }
            }
        };
        outcomes.push(outcome);
    }

    outcomes
}

/// GET one image URL and decode the body.
async fn fetch_and_decode(
    client: &reqwest::Client,
    url: &str,
) -> Result<DynamicImage, PageError> {
    let response = client.get(url).send().await.map_err(|e| PageError::Request {
        reason: e.to_string(),
    })?;

    if !response.status().is_success() {
        return Err(PageError::Status {
            status: response.status().as_u16(),
        });
    }

    let bytes = response.bytes().await.map_err(|e| PageError::Request {
        reason: e.to_string(),
    })?;

    // Format is sniffed from the bytes; the source serves WebP but the
    // contract is only "did decoding succeed".
    image::load_from_memory(&bytes).map_err(|e| PageError::Decode {
        detail: e.to_string(),
    })
}
