//! Page resolution: canonicalise the source URL and locate the embedded state.
//!
//! ## Why two round-trips?
//!
//! Share links are usually shortened or region-prefixed and bounce through one
//! or more redirects. The first GET follows them and yields the canonical URL;
//! the second GET fetches the body from that resolved location. The
//! duplication is deliberate — the canonical URL is part of the run's output,
//! and fetching the body against it keeps the two observations consistent.

use crate::error::Know2PdfError;
use scraper::{Html, Selector};
use tracing::{debug, info, warn};

/// The final (post-redirect) URL and the raw HTML fetched from it.
#[derive(Debug)]
pub struct ResolvedPage {
    /// Canonical URL after redirect resolution.
    pub url: reqwest::Url,
    /// Raw page body.
    pub html: String,
}

/// Resolve a source URL to its canonical page and fetch the HTML body.
///
/// # Errors
/// Fails fast on an unparseable URL, a transport-level failure, a timeout, or
/// a non-success status on either round-trip. No retries.
pub async fn resolve_page(
    client: &reqwest::Client,
    url: &str,
    timeout_secs: u64,
) -> Result<ResolvedPage, Know2PdfError> {
    let parsed = reqwest::Url::parse(url).map_err(|e| Know2PdfError::InvalidUrl {
        input: url.to_string(),
        reason: e.to_string(),
    })?;

    info!("Resolving document page: {}", parsed);

    // First round-trip: follow redirects to find the canonical URL.
    let initial = client
        .get(parsed)
        .send()
        .await
        .map_err(|e| request_error(url, timeout_secs, e))?;
    if !initial.status().is_success() {
        return Err(Know2PdfError::HttpStatus {
            url: initial.url().to_string(),
            status: initial.status().as_u16(),
        });
    }
    let canonical = initial.url().clone();
    debug!("Canonical URL: {}", canonical);

    // Second round-trip: fetch the body from the resolved location.
    let response = client
        .get(canonical.clone())
        .send()
        .await
        .map_err(|e| request_error(canonical.as_str(), timeout_secs, e))?;
    if !response.status().is_success() {
        return Err(Know2PdfError::HttpStatus {
            url: canonical.to_string(),
            status: response.status().as_u16(),
        });
    }

    let html = response
        .text()
        .await
        .map_err(|e| request_error(canonical.as_str(), timeout_secs, e))?;

    debug!("Fetched {} bytes of HTML", html.len());

    Ok(ResolvedPage {
        url: canonical,
        html,
    })
}

/// Locate the marker script element and return its inner text verbatim.
///
/// The text is the still-JSON-encoded page state; decoding happens in
/// [`crate::pipeline::extract`]. Returns `None` when the marker element is
/// absent — the caller treats that as "nothing to do", not as an error.
///
/// The marker id is caller-configurable; an id that cannot form a valid
/// selector matches nothing. [`crate::config::AssemblyConfigBuilder::build`]
/// rejects such ids before the pipeline runs.
pub fn embedded_payload(html: &str, marker_id: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = match Selector::parse(&format!("script[id='{marker_id}']")) {
        Ok(selector) => selector,
        Err(e) => {
            warn!("Marker id '{marker_id}' does not form a valid selector: {e:?}");
            return None;
        }
    };

    document
        .select(&selector)
        .next()
        .map(|element| element.inner_html())
}

fn request_error(url: &str, timeout_secs: u64, e: reqwest::Error) -> Know2PdfError {
    if e.is_timeout() {
        Know2PdfError::RequestTimeout {
            url: url.to_string(),
            secs: timeout_secs,
        }
    } else {
        Know2PdfError::RequestFailed {
            url: url.to_string(),
            reason: e.to_string(),
        }
    }
}
