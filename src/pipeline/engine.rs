//! PDFium binding.
//!
//! `pdfium-render` loads libpdfium at runtime. In a serverless package the
//! library is shipped next to the `bootstrap` executable, so the lookup order
//! is:
//!
//! 1. an explicit path (`PDFIUM_LIB_PATH`): the library file itself or the
//!    directory containing it;
//! 2. the directory of the running executable;
//! 3. `./lib`;
//! 4. the system library search path.

use crate::error::Pdf2ZipError;
use pdfium_render::prelude::Pdfium;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Bind to pdfium using the lookup order above.
pub fn bind(explicit: Option<&Path>) -> Result<Pdfium, Pdf2ZipError> {
    let mut tried = Vec::new();

    for candidate in candidates(explicit) {
        match Pdfium::bind_to_library(&candidate) {
            Ok(bindings) => {
                debug!("Bound pdfium from {}", candidate.display());
                return Ok(Pdfium::new(bindings));
            }
            Err(e) => tried.push(format!("{} ({})", candidate.display(), e)),
        }
    }

    match Pdfium::bind_to_system_library() {
        Ok(bindings) => {
            debug!("Bound pdfium from the system library path");
            Ok(Pdfium::new(bindings))
        }
        Err(e) => {
            tried.push(format!("system library ({e})"));
            Err(Pdf2ZipError::PdfiumBindingFailed(format!(
                "tried {}",
                tried.join("; ")
            )))
        }
    }
}

/// Library file paths to try, most specific first.
fn candidates(explicit: Option<&Path>) -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Some(p) = explicit {
        if p.is_dir() {
            paths.push(Pdfium::pdfium_platform_library_name_at_path(p).into());
        } else {
            paths.push(p.to_path_buf());
        }
    }

    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        paths.push(Pdfium::pdfium_platform_library_name_at_path(&exe_dir).into());
    }

    paths.push(Pdfium::pdfium_platform_library_name_at_path("./lib").into());
    paths.dedup();
    paths
}
