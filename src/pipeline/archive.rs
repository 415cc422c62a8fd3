//! Archive: pack the page images into one flat, deflate-compressed zip.
//!
//! Entries are named by the basename of each source and written in the order
//! given, so `page_1.jpg … page_N.jpg` appear in page order with no directory
//! prefix. JPEG data barely shrinks under deflate; deflate is still used so
//! that every unzip tool on every platform can open the result.

use crate::error::Pdf2ZipError;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Create `dest` from `sources`, returning the archive size in bytes.
pub async fn create_archive(dest: &Path, sources: &[PathBuf]) -> Result<u64, Pdf2ZipError> {
    let dest_owned = dest.to_path_buf();
    let sources = sources.to_vec();

    let size = tokio::task::spawn_blocking(move || create_archive_blocking(&dest_owned, &sources))
        .await
        .map_err(|e| Pdf2ZipError::Internal(format!("Archive task panicked: {}", e)))??;

    info!("Created zip file at {} ({} bytes)", dest.display(), size);
    Ok(size)
}

/// Blocking implementation of archive creation.
pub fn create_archive_blocking(dest: &Path, sources: &[PathBuf]) -> Result<u64, Pdf2ZipError> {
    let fail = |detail: String| Pdf2ZipError::ArchiveFailed {
        path: dest.to_path_buf(),
        detail,
    };

    let file = File::create(dest).map_err(|e| fail(e.to_string()))?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644);

    let mut seen = HashSet::with_capacity(sources.len());
    for source in sources {
        let name = source
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| fail(format!("'{}' has no usable file name", source.display())))?;
        if !seen.insert(name.to_string()) {
            return Err(fail(format!("duplicate entry name '{name}'")));
        }

        let mut input = File::open(source)
            .map_err(|e| fail(format!("cannot read '{}': {}", source.display(), e)))?;
        zip.start_file(name, options)
            .map_err(|e| fail(e.to_string()))?;
        std::io::copy(&mut input, &mut zip)
            .map_err(|e| fail(format!("cannot copy '{}': {}", source.display(), e)))?;
    }

    let mut writer = zip.finish().map_err(|e| fail(e.to_string()))?;
    writer.flush().map_err(|e| fail(e.to_string()))?;
    drop(writer);

    let size = std::fs::metadata(dest).map_err(|e| fail(e.to_string()))?.len();
    Ok(size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn entry_names(path: &Path) -> Vec<String> {
        let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
        (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect()
    }

    #[test]
    fn entries_are_flat_basenames_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let images = dir.path().join("images");
        std::fs::create_dir(&images).unwrap();

        let sources: Vec<PathBuf> = ["page_1.jpg", "page_2.jpg", "page_3.jpg"]
            .iter()
            .map(|name| {
                let p = images.join(name);
                std::fs::write(&p, name.as_bytes()).unwrap();
                p
            })
            .collect();

        let dest = dir.path().join("output.zip");
        let size = create_archive_blocking(&dest, &sources).unwrap();

        assert!(size > 0);
        assert_eq!(
            entry_names(&dest),
            vec!["page_1.jpg", "page_2.jpg", "page_3.jpg"]
        );

        let mut archive = zip::ZipArchive::new(File::open(&dest).unwrap()).unwrap();
        let mut entry = archive.by_name("page_2.jpg").unwrap();
        assert_eq!(entry.compression(), CompressionMethod::Deflated);
        let mut body = String::new();
        entry.read_to_string(&mut body).unwrap();
        assert_eq!(body, "page_2.jpg");
    }

    #[test]
    fn empty_source_list_gives_empty_archive() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("output.zip");
        create_archive_blocking(&dest, &[]).unwrap();
        assert!(entry_names(&dest).is_empty());
    }

    #[test]
    fn missing_source_is_an_archive_error() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("output.zip");
        let err = create_archive_blocking(&dest, &[dir.path().join("page_1.jpg")]).unwrap_err();
        assert!(matches!(err, Pdf2ZipError::ArchiveFailed { .. }), "got {err}");
    }

    #[test]
    fn duplicate_basenames_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        for sub in ["a", "b"] {
            std::fs::create_dir(dir.path().join(sub)).unwrap();
            std::fs::write(dir.path().join(sub).join("page_1.jpg"), b"x").unwrap();
        }
        let err = create_archive_blocking(
            &dir.path().join("output.zip"),
            &[
                dir.path().join("a").join("page_1.jpg"),
                dir.path().join("b").join("page_1.jpg"),
            ],
        )
        .unwrap_err();
        assert!(err.to_string().contains("duplicate"), "got {err}");
    }

    #[test]
    fn unwritable_destination_fails() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("no-such-dir").join("output.zip");
        assert!(matches!(
            create_archive_blocking(&dest, &[]),
            Err(Pdf2ZipError::ArchiveFailed { .. })
        ));
    }

    #[tokio::test]
    async fn async_wrapper_reports_size() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("page_1.jpg");
        std::fs::write(&src, vec![7u8; 4096]).unwrap();
        let dest = dir.path().join("output.zip");

        let size = create_archive(&dest, &[src]).await.unwrap();
        assert_eq!(size, std::fs::metadata(&dest).unwrap().len());
    }
}
