//! Error types for the pdf2zip library.
//!
//! Every failure is fatal to the current invocation: nothing is retried and
//! nothing is partially returned. [`Pdf2ZipError`] therefore carries enough
//! context in its `Display` text to be handed straight to the caller as the
//! `message` of a failure response, while [`ErrorKind`] groups the variants
//! by the pipeline stage that produced them.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the pdf2zip library.
#[derive(Debug, Error)]
pub enum Pdf2ZipError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The invocation payload carried no `pdf_url`.
    #[error("PDF URL is required")]
    MissingPdfUrl,

    /// `pdf_url` was present but is not an absolute HTTP/HTTPS URL.
    #[error("Invalid PDF URL '{url}': {reason}")]
    InvalidPdfUrl { url: String, reason: String },

    /// `dpi` was not a number in the accepted range.
    #[error("Invalid dpi '{value}': expected an integer between {min} and {max}")]
    InvalidDpi { value: String, min: u32, max: u32 },

    /// The payload is not the JSON shape the function expects.
    #[error("Malformed invocation payload: {0}")]
    MalformedEvent(String),

    // ── Fetch errors ──────────────────────────────────────────────────────
    /// Transport failure or non-2xx status while downloading.
    #[error("Failed to download '{url}': {reason}")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'")]
    DownloadTimeout { url: String, secs: u64 },

    // ── Conversion errors ─────────────────────────────────────────────────
    /// The downloaded body does not start with the `%PDF` magic.
    #[error("Downloaded file is not a valid PDF: '{path}' (first bytes: {magic:?})")]
    NotAPdf { path: PathBuf, magic: Vec<u8> },

    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// The PDF is encrypted; this function never has a password to offer.
    #[error("PDF '{path}' is encrypted and requires a password")]
    PasswordRequired { path: PathBuf },

    /// pdfium-render returned an error for a specific page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    /// Rendering the page at the requested DPI would exceed the pixel cap.
    #[error("Page {page} would render to {pixels} pixels, above the limit of {limit}")]
    PageTooLarge { page: usize, pixels: u64, limit: u64 },

    /// A rendered page could not be encoded or written as JPEG.
    #[error("Failed to write page image '{path}': {detail}")]
    ImageWriteFailed { path: PathBuf, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Ship libpdfium next to the executable or set PDFIUM_LIB_PATH to its location."
    )]
    PdfiumBindingFailed(String),

    // ── Archive errors ────────────────────────────────────────────────────
    /// The zip archive could not be assembled.
    #[error("Failed to create archive '{path}': {detail}")]
    ArchiveFailed { path: PathBuf, detail: String },

    // ── Publish errors ────────────────────────────────────────────────────
    /// Required object-store settings are absent.
    #[error("Object store is not configured; missing: {}", missing.join(", "))]
    StoreNotConfigured { missing: Vec<&'static str> },

    /// Uploading the archive failed.
    #[error("Failed to upload '{object}': {detail}")]
    UploadFailed { object: String, detail: String },

    /// Minting the presigned URL failed.
    #[error("Failed to generate presigned URL for '{object}': {detail}")]
    SigningFailed { object: String, detail: String },

    // ── Internal errors ───────────────────────────────────────────────────
    /// The per-invocation scratch directory could not be prepared.
    #[error("Scratch directory error under '{path}': {source}")]
    ScratchFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Pipeline stage an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    Fetch,
    Conversion,
    Archive,
    Publish,
    Internal,
}

impl Pdf2ZipError {
    pub fn kind(&self) -> ErrorKind {
        use Pdf2ZipError::*;
        match self {
            MissingPdfUrl | InvalidPdfUrl { .. } | InvalidDpi { .. } | MalformedEvent(_) => {
                ErrorKind::InvalidInput
            }
            DownloadFailed { .. } | DownloadTimeout { .. } => ErrorKind::Fetch,
            NotAPdf { .. }
            | CorruptPdf { .. }
            | PasswordRequired { .. }
            | RasterisationFailed { .. }
            | PageTooLarge { .. }
            | ImageWriteFailed { .. }
            | PdfiumBindingFailed(_) => ErrorKind::Conversion,
            ArchiveFailed { .. } => ErrorKind::Archive,
            StoreNotConfigured { .. } | UploadFailed { .. } | SigningFailed { .. } => {
                ErrorKind::Publish
            }
            ScratchFailed { .. } | InvalidConfig(_) | Internal(_) => ErrorKind::Internal,
        }
    }
}
