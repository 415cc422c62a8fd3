//! Per-invocation scratch space.
//!
//! Every invocation owns one uniquely named directory under the configured
//! scratch root:
//!
//! ```text
//! <root>/pdf2zip-XXXXXX/
//!   ├─ input.pdf
//!   ├─ images/page_1.jpg … page_N.jpg
//!   └─ output.zip
//! ```
//!
//! The directory is a [`TempDir`], so it is removed when [`Scratch`] is
//! dropped: on success, on an early `?` return and on unwind alike. Warm
//! containers that reuse `/tmp` across invocations never accumulate leftovers.

use crate::error::Pdf2ZipError;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};

pub const INPUT_PDF: &str = "input.pdf";
pub const IMAGES_DIR: &str = "images";
pub const OUTPUT_ZIP: &str = "output.zip";

/// Scoped scratch directory for one invocation.
#[derive(Debug)]
pub struct Scratch {
    dir: TempDir,
}

impl Scratch {
    /// Create `<root>/pdf2zip-*` with an empty `images/` subdirectory.
    pub fn create(root: &Path) -> Result<Self, Pdf2ZipError> {
        let scratch_err = |source| Pdf2ZipError::ScratchFailed {
            path: root.to_path_buf(),
            source,
        };

        std::fs::create_dir_all(root).map_err(scratch_err)?;
        let dir = tempfile::Builder::new()
            .prefix("pdf2zip-")
            .tempdir_in(root)
            .map_err(scratch_err)?;
        std::fs::create_dir(dir.path().join(IMAGES_DIR)).map_err(scratch_err)?;

        debug!("Scratch directory: {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn pdf_path(&self) -> PathBuf {
        self.dir.path().join(INPUT_PDF)
    }

    pub fn images_dir(&self) -> PathBuf {
        self.dir.path().join(IMAGES_DIR)
    }

    pub fn archive_path(&self) -> PathBuf {
        self.dir.path().join(OUTPUT_ZIP)
    }

    /// Remove the directory now, logging instead of failing.
    ///
    /// Dropping a `Scratch` cleans up as well; this just makes the success
    /// path's cleanup visible in the logs.
    pub fn cleanup(self) {
        let path = self.dir.path().to_path_buf();
        match self.dir.close() {
            Ok(()) => debug!("Removed scratch directory {}", path.display()),
            Err(e) => warn!("Failed to remove scratch directory {}: {}", path.display(), e),
        }
    }
}
