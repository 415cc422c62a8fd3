//! Pipeline stages for PDF-to-zip conversion.
//!
//! Each submodule implements exactly one step, so each is testable on its
//! own and the orchestrator in [`crate::handler`] reads as a straight line.
//!
//! ## Data Flow
//!
//! ```text
//! fetch ──▶ render ──▶ archive ──▶ publish
//! (reqwest)  (pdfium)   (zip)       (S3 API)
//! ```
//!
//! 1. [`scratch`] — per-invocation directory, removed on every exit path
//! 2. [`fetch`]   — stream the PDF to `input.pdf`, verify the `%PDF` magic
//! 3. [`render`]  — one `page_<n>.jpg` per page; runs in `spawn_blocking`
//!    because pdfium is not async-safe ([`engine`] locates the library)
//! 4. [`archive`] — flat deflate zip of the page images
//! 5. [`publish`] — upload under a random name, presign a GET URL

pub mod archive;
pub mod engine;
pub mod fetch;
pub mod publish;
pub mod render;
pub mod scratch;
