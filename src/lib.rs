//! # pdf2zip
//!
//! A single-shot serverless function: given the URL of a PDF, rasterise every
//! page to JPEG, zip the images, upload the zip to an object store and return
//! a time-limited download link.
//!
//! ## Pipeline Overview
//!
//! ```text
//! invocation event
//!  │
//!  ├─ 1. Parse    typed request: pdf_url (required), dpi (default 200)
//!  ├─ 2. Fetch    stream the PDF into a per-invocation scratch dir
//!  ├─ 3. Render   page_<n>.jpg via pdfium (CPU-bound, spawn_blocking)
//!  ├─ 4. Archive  flat deflate zip of the page images
//!  ├─ 5. Publish  upload as pdf_images_<uuid>.zip, presign a GET URL
//!  └─ 6. Cleanup  scratch dir removed on every exit path
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2zip::{handle_event, ConversionConfig, S3Store, StoreConfig};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::default();
//!     let store = S3Store::new(&StoreConfig {
//!         endpoint: Some("oss-cn-hangzhou.aliyuncs.com".into()),
//!         bucket: Some("my-bucket".into()),
//!         access_key_id: Some("…".into()),
//!         access_key_secret: Some("…".into()),
//!         ..StoreConfig::new()
//!     });
//!
//!     let event = json!({"queryParameters": {"pdf_url": "https://example.com/doc.pdf"}});
//!     let response = handle_event(event, &config, &store).await;
//!     println!("{}", serde_json::to_string(&response)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature   | Default | Description |
//! |-----------|---------|-------------|
//! | `runtime` | on      | [`invoke`] HTTP surface and the `bootstrap` binary (axum + clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod handler;
#[cfg(feature = "runtime")]
pub mod invoke;
pub mod pipeline;
pub mod request;
pub mod response;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, StoreConfig};
pub use error::{ErrorKind, Pdf2ZipError};
pub use handler::{handle_event, process, ProcessOutput, ProcessStats};
pub use pipeline::publish::{object_name, ObjectStore, S3Store};
pub use request::ConversionRequest;
pub use response::InvocationResponse;
