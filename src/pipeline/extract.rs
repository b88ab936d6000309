//! Payload extraction: embedded JSON state → ordered page-image URL list.
//!
//! This module is the single narrow adapter around the source site's
//! externally-owned schema. The only path this system relies on is
//!
//! ```text
//! props → pageProps → know → knowDocumentPages[] → imageUrl
//! ```
//!
//! Everything else in the payload is ignored (serde's default behaviour for
//! unknown fields). When the site renames a field, this file is the only one
//! that changes.

use crate::error::Know2PdfError;
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize)]
struct EmbeddedState {
    props: Props,
}

#[derive(Debug, Deserialize)]
struct Props {
    #[serde(rename = "pageProps")]
    page_props: PageProps,
}

#[derive(Debug, Deserialize)]
struct PageProps {
    know: KnowDocument,
}

#[derive(Debug, Deserialize)]
struct KnowDocument {
    #[serde(rename = "knowDocumentPages")]
    pages: Vec<PageDescriptor>,
}

/// One entry in the payload's ordered page collection.
#[derive(Debug, Clone, Deserialize)]
pub struct PageDescriptor {
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}

/// Decode the payload text and walk the schema path to the ordered image URL
/// list. Descriptor order is preserved exactly; no dedup, no reordering.
///
/// Each discovered URL is reported via `info!` as a progress signal.
///
/// # Errors
/// [`Know2PdfError::SchemaDrift`] when the payload is not JSON or the
/// expected path is missing — there is nothing meaningful to assemble
/// without it, so this is fatal for the run.
pub fn extract_page_urls(payload: &str) -> Result<Vec<String>, Know2PdfError> {
    let state: EmbeddedState =
        serde_json::from_str(payload).map_err(|e| Know2PdfError::SchemaDrift {
            detail: e.to_string(),
        })?;

    let urls: Vec<String> = state
        .props
        .page_props
        .know
        .pages
        .into_iter()
        .map(|page| page.image_url)
        .collect();

    for (i, url) in urls.iter().enumerate() {
        info!("Page {}: {}", i + 1, url);
    }

    Ok(urls)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(urls: &[&str]) -> String {
        let pages: Vec<String> = urls
            .iter()
            .map(|u| format!(r#"{{"imageUrl":"{u}","id":"x","width":800}}"#))
            .collect();
        format!(
            r#"{{"props":{{"pageProps":{{"know":{{"title":"algebra notes","knowDocumentPages":[{}]}},"extra":1}}}},"page":"/knows/[id]"}}"#,
            pages.join(",")
        )
    }

    #[test]
    fn urls_extracted_in_descriptor_order() {
        let urls = extract_page_urls(&payload(&[
            "https://cdn.example.com/p0.webp",
            "https://cdn.example.com/p1.webp",
            "https://cdn.example.com/p2.webp",
        ]))
        .expect("valid payload");

        assert_eq!(
            urls,
            vec![
                "https://cdn.example.com/p0.webp",
                "https://cdn.example.com/p1.webp",
                "https://cdn.example.com/p2.webp",
            ]
        );
    }

    #[test]
    fn unknown_sibling_fields_are_ignored() {
        // Real payloads carry far more than the page list.
        let urls = extract_page_urls(&payload(&["https://cdn.example.com/only.webp"]))
            .expect("valid payload");
        assert_eq!(urls.len(), 1);
    }

    #[test]
    fn empty_page_collection_is_valid() {
        let urls = extract_page_urls(&payload(&[])).expect("valid payload");
        assert!(urls.is_empty());
    }

    #[test]
    fn missing_path_is_schema_drift() {
        let err = extract_page_urls(r#"{"props":{"pageProps":{}}}"#).unwrap_err();
        assert!(matches!(err, Know2PdfError::SchemaDrift { .. }));
    }

    #[test]
    fn renamed_field_is_schema_drift() {
        let drifted = r#"{"props":{"pageProps":{"know":{"documentPages":[]}}}}"#;
        let err = extract_page_urls(drifted).unwrap_err();
        assert!(matches!(err, Know2PdfError::SchemaDrift { .. }));
    }

    #[test]
    fn non_json_payload_is_schema_drift() {
        let err = extract_page_urls("<html>not json</html>").unwrap_err();
        assert!(matches!(err, Know2PdfError::SchemaDrift { .. }));
    }
}
