//! Fetch: stream a remote PDF into the scratch directory.
//!
//! pdfium needs a file-system path, so the body is written to
//! `input.pdf` chunk by chunk as it arrives. Only one network chunk is held in
//! memory at a time regardless of document size. After the download the
//! `%PDF` magic is checked so a HTML error page served with `200 OK` surfaces
//! as [`Pdf2ZipError::NotAPdf`] rather than as a pdfium parse failure.

use crate::error::Pdf2ZipError;
use futures::StreamExt;
use reqwest::Url;
use std::path::Path;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, info};

const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// Download `url` to `dest`, returning the number of bytes written.
pub async fn download_pdf(url: &Url, dest: &Path, timeout_secs: u64) -> Result<u64, Pdf2ZipError> {
    info!("Downloading PDF from: {}", url);

    let failed = |reason: String| Pdf2ZipError::DownloadFailed {
        url: url.to_string(),
        reason,
    };
    let transport = |e: reqwest::Error| {
        if e.is_timeout() {
            Pdf2ZipError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            failed(e.to_string())
        }
    };

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| failed(e.to_string()))?;

    let response = client.get(url.clone()).send().await.map_err(transport)?;

    if !response.status().is_success() {
        return Err(failed(format!("HTTP {}", response.status())));
    }

    let write_err = |e: std::io::Error| failed(format!("cannot write '{}': {}", dest.display(), e));

    let mut file = tokio::fs::File::create(dest).await.map_err(write_err)?;
    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(transport)?;
        file.write_all(&chunk).await.map_err(write_err)?;
        written += chunk.len() as u64;
    }
    file.flush().await.map_err(write_err)?;
    drop(file);

    debug!("Wrote {} bytes to {}", written, dest.display());
    verify_pdf_magic(dest).await?;

    info!("Downloaded {} bytes to: {}", written, dest.display());
    Ok(written)
}

/// Check that the file at `path` starts with `%PDF`.
pub async fn verify_pdf_magic(path: &Path) -> Result<(), Pdf2ZipError> {
    let mut file = tokio::fs::File::open(path)
        .await
        .map_err(|e| Pdf2ZipError::Internal(format!("Failed to reopen '{}': {}", path.display(), e)))?;

    let mut magic = Vec::with_capacity(PDF_MAGIC.len());
    (&mut file)
        .take(PDF_MAGIC.len() as u64)
        .read_to_end(&mut magic)
        .await
        .map_err(|e| Pdf2ZipError::Internal(format!("Failed to read '{}': {}", path.display(), e)))?;

    if magic.as_slice() != PDF_MAGIC {
        return Err(Pdf2ZipError::NotAPdf {
            path: path.to_path_buf(),
            magic,
        });
    }
    Ok(())
}
