//! Staging and PDF packing: decoded images → one PDF, one image per page.
//!
//! ## Why stage to PNG files first?
//!
//! The source images arrive in whatever format the site serves (WebP, mostly)
//! and in whatever colour layout they were encoded with. Re-encoding every
//! decoded raster as RGB8 PNG into a scratch directory gives the packer a
//! single normalized input contract, and the index-encoded file names
//! (`page_000.png`, `page_001.png`, …) make packing order deterministic and
//! equal to download order. The scratch directory is a [`tempfile::TempDir`]
//! owned by the driver, so staged files are removed on every exit path —
//! success, partial failure, or panic.

use crate::error::Know2PdfError;
use printpdf::image_crate::codecs::png::PngDecoder;
use printpdf::{Image, ImageTransform, Mm, PdfDocument};
use std::fs;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Re-encode each decoded image as RGB8 PNG under `dir`, named by its
/// zero-based position in the sequence.
///
/// Returns the staged paths in packing order.
pub fn stage_pages(
    pages: &[crate::pipeline::download::DecodedPage],
    dir: &Path,
) -> Result<Vec<PathBuf>, Know2PdfError> {
    let mut staged = Vec::with_capacity(pages.len());

    for (position, page) in pages.iter().enumerate() {
        let path = dir.join(format!("page_{position:03}.png"));
        // RGB8 sidesteps alpha handling in the PDF encoder; page renders
        // have no meaningful transparency anyway.
        page.image
            .to_rgb8()
            .save_with_format(&path, image::ImageFormat::Png)
            .map_err(|e| Know2PdfError::StagingFailed {
                index: position,
                detail: e.to_string(),
            })?;
        debug!("Staged {}", path.display());
        staged.push(path);
    }

    Ok(staged)
}

/// Pack the staged raster files into a single PDF byte stream, one input
/// image per output page, in staged order.
///
/// Page dimensions are derived from each image's pixel size at `dpi`, so the
/// image fills its page exactly.
///
/// # Errors
/// Fails on an empty input (the driver must skip packing when nothing
/// decoded), on a staged file that cannot be re-read, and on PDF
/// serialisation errors. All are fatal for the run.
pub fn pack_pdf(staged: &[PathBuf], title: &str, dpi: f32) -> Result<Vec<u8>, Know2PdfError> {
    let first = staged.first().ok_or_else(|| {
        Know2PdfError::Internal("pack_pdf called with zero staged images".into())
    })?;

    let image = load_staged(first)?;
    let (width, height) = page_size_mm(&image, dpi);
    let (doc, page, layer) = PdfDocument::new(title, width, height, "page");
    place_image(image, doc.get_page(page).get_layer(layer), dpi);

    for path in &staged[1..] {
        let image = load_staged(path)?;
        let (width, height) = page_size_mm(&image, dpi);
        let (page, layer) = doc.add_page(width, height, "page");
        place_image(image, doc.get_page(page).get_layer(layer), dpi);
    }

    let bytes = doc
        .save_to_bytes()
        .map_err(|e| Know2PdfError::PackingFailed {
            detail: e.to_string(),
        })?;

    info!("Packed {} pages into {} bytes of PDF", staged.len(), bytes.len());
    Ok(bytes)
}

/// Write the PDF byte stream to `path`, overwriting any existing file.
///
/// Atomic write (temp file + rename) so a crash mid-write never leaves a
/// truncated PDF at the output path.
pub async fn write_output(bytes: &[u8], path: &Path) -> Result<(), Know2PdfError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| Know2PdfError::OutputWriteFailed {
                path: path.to_path_buf(),
                source: e,
            })?;
    }

    let tmp_path = path.with_extension("pdf.tmp");
    tokio::fs::write(&tmp_path, bytes)
        .await
        .map_err(|e| Know2PdfError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| Know2PdfError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    Ok(())
}

/// Load one staged PNG through the PDF encoder's bundled image decoder.
fn load_staged(path: &Path) -> Result<Image, Know2PdfError> {
    let file = fs::File::open(path).map_err(|e| Know2PdfError::PackingFailed {
        detail: format!("cannot reopen staged file '{}': {}", path.display(), e),
    })?;

    let decoder =
        PngDecoder::new(BufReader::new(file)).map_err(|e| Know2PdfError::PackingFailed {
            detail: format!("staged file '{}' is not a PNG: {}", path.display(), e),
        })?;

    Image::try_from(decoder).map_err(|e| Know2PdfError::PackingFailed {
        detail: e.to_string(),
    })
}

/// Page size in millimetres for an image at the given pixel density.
fn page_size_mm(image: &Image, dpi: f32) -> (Mm, Mm) {
    (
        Mm::from(image.image.width.into_pt(dpi)),
        Mm::from(image.image.height.into_pt(dpi)),
    )
}

/// Place an image at the page origin at the density the page was sized for.
fn place_image(image: Image, layer: printpdf::PdfLayerReference, dpi: f32) {
    image.add_to_layer(
        layer,
        ImageTransform {
            dpi: Some(dpi),
            ..Default::default()
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::download::DecodedPage;
    use image::DynamicImage;

    fn page(index: usize, width: u32, height: u32) -> DecodedPage {
        DecodedPage {
            index,
            url: format!("https://cdn.example.com/p{index}.webp"),
            image: DynamicImage::new_rgb8(width, height),
        }
    }

    /// MediaBox [x0 y0 x1 y1] in points for every page, in page order.
    fn page_sizes(bytes: &[u8]) -> Vec<(f32, f32)> {
        let doc = lopdf::Document::load_mem(bytes).expect("valid PDF");
        doc.get_pages()
            .values()
            .map(|&oid| {
                let dict = doc.get_object(oid).and_then(|o| o.as_dict()).expect("page dict");
                let media_box = dict
                    .get(b"MediaBox")
                    .and_then(|o| o.as_array())
                    .expect("MediaBox");
                let n = |i: usize| match media_box[i] {
                    lopdf::Object::Integer(v) => v as f32,
                    lopdf::Object::Real(v) => v,
                    ref other => panic!("unexpected MediaBox entry: {other:?}"),
                };
                (n(2) - n(0), n(3) - n(1))
            })
            .collect()
    }

    #[test]
    fn staged_names_encode_sequence_position() {
        let dir = tempfile::tempdir().expect("tempdir");
        // Decoded subset of a 5-page document where source page 2 failed:
        // staging positions restart at zero, source indices do not matter.
        let pages = vec![page(0, 8, 8), page(1, 8, 8), page(3, 8, 8), page(4, 8, 8)];

        let staged = stage_pages(&pages, dir.path()).expect("staging succeeds");

        let names: Vec<String> = staged
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec!["page_000.png", "page_001.png", "page_002.png", "page_003.png"]
        );
        for path in &staged {
            assert!(path.exists());
        }
    }

    #[test]
    fn packed_pdf_has_one_page_per_image_in_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        // Distinct dimensions per page so order is observable in the output.
        let pages = vec![page(0, 100, 200), page(1, 300, 150), page(2, 50, 50)];
        let staged = stage_pages(&pages, dir.path()).expect("staging succeeds");

        let bytes = pack_pdf(&staged, "order test", 96.0).expect("packing succeeds");
        assert!(bytes.starts_with(b"%PDF"));

        let sizes = page_sizes(&bytes);
        assert_eq!(sizes.len(), 3);
        // At 96 DPI: px * 72 / 96 = pt
        let expected = [(75.0, 150.0), (225.0, 112.5), (37.5, 37.5)];
        for ((w, h), (ew, eh)) in sizes.iter().zip(expected) {
            assert!((w - ew).abs() < 0.5, "width {w} != {ew}");
            assert!((h - eh).abs() < 0.5, "height {h} != {eh}");
        }
    }

    #[test]
    fn packing_zero_images_is_rejected() {
        let err = pack_pdf(&[], "empty", 96.0).unwrap_err();
        assert!(matches!(err, Know2PdfError::Internal(_)));
    }

    #[tokio::test]
    async fn write_output_overwrites_existing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.pdf");

        std::fs::write(&path, b"stale").expect("seed file");
        write_output(b"%PDF-fresh", &path).await.expect("write succeeds");

        let content = std::fs::read(&path).expect("read back");
        assert_eq!(content, b"%PDF-fresh");
        // The temp file must not linger.
        assert!(!path.with_extension("pdf.tmp").exists());
    }
}
