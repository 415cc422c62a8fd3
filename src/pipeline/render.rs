//! Rasterise: render every PDF page to `page_<n>.jpg` via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! pdfium is a synchronous C++ library with thread-local state, and
//! rendering plus JPEG encoding is CPU-heavy. The whole document is handled
//! on a blocking-pool thread so the Tokio workers never stall.
//!
//! ## Pixel budget
//!
//! Target size is `points × dpi / 72` per side. Before a bitmap is allocated
//! the product of both sides is checked against `max_page_pixels`; a
//! pathological page size combined with a high DPI is rejected instead of
//! exhausting memory.
//!
//! ## One document at a time
//!
//! Each binding initialises pdfium and tears it down again on drop, which is
//! process-global. Concurrent invocations therefore take turns through
//! `PDFIUM_GUARD`; downloads and uploads still overlap.

use crate::error::Pdf2ZipError;
use crate::pipeline::engine;
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info};

/// Held for the whole lifetime of a pdfium binding.
static PDFIUM_GUARD: Mutex<()> = Mutex::new(());

/// PDF user space: 1 inch = 72 points.
const PDF_POINTS_PER_INCH: f32 = 72.0;

/// Rendering parameters for one document.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub dpi: u32,
    pub jpeg_quality: u8,
    pub max_page_pixels: u64,
    pub pdfium_lib_path: Option<PathBuf>,
}

/// Deterministic file name of a page image (1-indexed).
pub fn page_file_name(page_num: usize) -> String {
    format!("page_{page_num}.jpg")
}

/// Render every page of `pdf_path` into `output_dir`.
///
/// # Returns
/// The image paths in page order; empty for a zero-page document.
pub async fn render_pages(
    pdf_path: &Path,
    output_dir: &Path,
    options: &RenderOptions,
) -> Result<Vec<PathBuf>, Pdf2ZipError> {
    let path = pdf_path.to_path_buf();
    let out = output_dir.to_path_buf();
    let options = options.clone();

    tokio::task::spawn_blocking(move || render_pages_blocking(&path, &out, &options))
        .await
        .map_err(|e| Pdf2ZipError::Internal(format!("Render task panicked: {}", e)))?
}

/// Blocking implementation of page rendering.
fn render_pages_blocking(
    pdf_path: &Path,
    output_dir: &Path,
    options: &RenderOptions,
) -> Result<Vec<PathBuf>, Pdf2ZipError> {
    // A panic while rendering leaves no shared state behind, so poisoning is ignored.
    let _guard = PDFIUM_GUARD.lock().unwrap_or_else(PoisonError::into_inner);
    let pdfium = engine::bind(options.pdfium_lib_path.as_deref())?;

    let document = pdfium.load_pdf_from_file(pdf_path, None).map_err(|e| {
        let err_str = format!("{:?}", e);
        if err_str.contains("Password") || err_str.contains("password") {
            Pdf2ZipError::PasswordRequired {
                path: pdf_path.to_path_buf(),
            }
        } else {
            Pdf2ZipError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail: err_str,
            }
        }
    })?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    info!("PDF loaded: {} pages, rendering at {} DPI", total_pages, options.dpi);

    let mut outputs = Vec::with_capacity(total_pages);

    for (idx, page) in pages.iter().enumerate() {
        let page_num = idx + 1;

        let (width, height) = target_size(page.width().value, page.height().value, options.dpi);
        let pixels = u64::from(width) * u64::from(height);
        if pixels > options.max_page_pixels {
            return Err(Pdf2ZipError::PageTooLarge {
                page: page_num,
                pixels,
                limit: options.max_page_pixels,
            });
        }

        let render_config = PdfRenderConfig::new()
            .set_target_width(width as i32)
            .set_target_height(height as i32);

        let bitmap = page.render_with_config(&render_config).map_err(|e| {
            Pdf2ZipError::RasterisationFailed {
                page: page_num,
                detail: format!("{:?}", e),
            }
        })?;

        let image = bitmap.as_image();
        let image_path = output_dir.join(page_file_name(page_num));
        write_jpeg(&image, &image_path, options.jpeg_quality)?;

        debug!(
            "Rendered page {} → {}x{} px → {}",
            page_num,
            image.width(),
            image.height(),
            image_path.display()
        );
        outputs.push(image_path);
    }

    Ok(outputs)
}

/// Pixel size of a page of `width_pts × height_pts` points at `dpi`.
/// Never smaller than 1×1.
pub fn target_size(width_pts: f32, height_pts: f32, dpi: u32) -> (u32, u32) {
    let scale = dpi as f32 / PDF_POINTS_PER_INCH;
    let px = |pts: f32| (pts * scale).round().max(1.0) as u32;
    (px(width_pts), px(height_pts))
}

/// Encode `image` as baseline JPEG at `path`. Alpha is dropped.
pub fn write_jpeg(image: &DynamicImage, path: &Path, quality: u8) -> Result<(), Pdf2ZipError> {
    let write_err = |detail: String| Pdf2ZipError::ImageWriteFailed {
        path: path.to_path_buf(),
        detail,
    };

    let rgb = image.to_rgb8();
    let file = File::create(path).map_err(|e| write_err(e.to_string()))?;
    let mut writer = BufWriter::new(file);

    JpegEncoder::new_with_quality(&mut writer, quality)
        .encode_image(&rgb)
        .map_err(|e| write_err(e.to_string()))?;
    writer.flush().map_err(|e| write_err(e.to_string()))?;
    Ok(())
}
