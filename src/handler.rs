//! Invocation entry points.
//!
//! [`handle_event`] is what the runtime calls: it never fails, turning every
//! error into the uniform failure response. [`process`] runs the stages for an
//! already-validated request and is the one to call from library code.
//!
//! ```text
//! ParseInput → Fetch → Rasterize → Archive → Upload → SignURL → Cleanup → Done
//!      └──────────┴─────────┴──────────┴─────────┴────────┴──▶ Error-Report
//! ```
//!
//! Scratch files are owned by a [`Scratch`] guard, so the Cleanup step also
//! happens on the Error-Report path.

use crate::config::ConversionConfig;
use crate::error::Pdf2ZipError;
use crate::pipeline::publish::{self, ObjectStore};
use crate::pipeline::render::RenderOptions;
use crate::pipeline::scratch::Scratch;
use crate::pipeline::{archive, fetch, render};
use crate::request::ConversionRequest;
use crate::response::InvocationResponse;
use serde::Serialize;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{error, info};

/// Result of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessOutput {
    pub presigned_url: String,
    pub object_name: String,
    pub page_count: usize,
    pub stats: ProcessStats,
}

/// Sizes and per-stage timings of a successful run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProcessStats {
    pub pdf_bytes: u64,
    pub archive_bytes: u64,
    pub fetch_duration_ms: u64,
    pub render_duration_ms: u64,
    pub archive_duration_ms: u64,
    pub publish_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// Handle one raw invocation event.
///
/// Always returns a well-formed response; failures are logged and reported
/// with `code: "Error"`.
pub async fn handle_event(
    event: Value,
    config: &ConversionConfig,
    store: &dyn ObjectStore,
) -> InvocationResponse {
    let request = match ConversionRequest::from_event(event, config.default_dpi) {
        Ok(request) => request,
        Err(e) => {
            error!("Rejected invocation: {}", e);
            return InvocationResponse::error(e.to_string());
        }
    };

    match process(&request, config, store).await {
        Ok(output) => InvocationResponse::success(output.presigned_url),
        Err(e) => {
            error!(kind = ?e.kind(), "Error processing PDF {}: {}", request.pdf_url, e);
            InvocationResponse::error(e.to_string())
        }
    }
}

/// Run fetch → render → archive → publish for a validated request.
pub async fn process(
    request: &ConversionRequest,
    config: &ConversionConfig,
    store: &dyn ObjectStore,
) -> Result<ProcessOutput, Pdf2ZipError> {
    let total_start = Instant::now();
    info!("Starting conversion: {} at {} DPI", request.pdf_url, request.dpi);

    let scratch = Scratch::create(&config.scratch_root)?;

    // ── Step 1: Fetch ────────────────────────────────────────────────────
    let fetch_start = Instant::now();
    let pdf_path = scratch.pdf_path();
    let pdf_bytes =
        fetch::download_pdf(&request.pdf_url, &pdf_path, config.download_timeout_secs).await?;
    let fetch_duration_ms = elapsed_ms(fetch_start);

    // ── Step 2: Rasterise ────────────────────────────────────────────────
    let render_start = Instant::now();
    let options = RenderOptions {
        dpi: request.dpi,
        jpeg_quality: config.jpeg_quality,
        max_page_pixels: config.max_page_pixels,
        pdfium_lib_path: config.pdfium_lib_path.clone(),
    };
    let images = render::render_pages(&pdf_path, &scratch.images_dir(), &options).await?;
    let render_duration_ms = elapsed_ms(render_start);
    info!(
        "Converted {} pages to images in {}ms",
        images.len(),
        render_duration_ms
    );

    // ── Step 3: Archive ──────────────────────────────────────────────────
    let archive_start = Instant::now();
    let archive_path = scratch.archive_path();
    let archive_bytes = archive::create_archive(&archive_path, &images).await?;
    let archive_duration_ms = elapsed_ms(archive_start);

    // ── Step 4: Upload + sign ────────────────────────────────────────────
    let publish_start = Instant::now();
    let object_name = publish::object_name();
    store.put_file(&archive_path, &object_name).await?;
    let presigned_url = store
        .presign_get(&object_name, Duration::from_secs(config.url_expiry_secs))
        .await?;
    let publish_duration_ms = elapsed_ms(publish_start);

    // ── Step 5: Cleanup ──────────────────────────────────────────────────
    scratch.cleanup();

    let stats = ProcessStats {
        pdf_bytes,
        archive_bytes,
        fetch_duration_ms,
        render_duration_ms,
        archive_duration_ms,
        publish_duration_ms,
        total_duration_ms: elapsed_ms(total_start),
    };
    info!(
        "Conversion complete: {} pages → {} ({} bytes), {}ms total",
        images.len(),
        object_name,
        archive_bytes,
        stats.total_duration_ms
    );

    Ok(ProcessOutput {
        presigned_url,
        object_name,
        page_count: images.len(),
        stats,
    })
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}
