//! Configuration types for the PDF-to-zip pipeline.
//!
//! Two structs, both built once at process start and passed by reference:
//!
//! * [`ConversionConfig`] — rendering, timeout and scratch-space knobs, built
//!   through [`ConversionConfigBuilder`].
//! * [`StoreConfig`] — object-store endpoint, bucket and credentials.
//!
//! Neither reads the environment itself; the runtime binary maps environment
//! variables onto them, which keeps tests free to inject fake values.

use crate::error::Pdf2ZipError;
use std::fmt;
use std::path::PathBuf;

/// Lowest DPI a request may ask for.
pub const MIN_DPI: u32 = 36;
/// Highest DPI a request may ask for.
pub const MAX_DPI: u32 = 1200;
/// DPI used when the request does not carry one.
pub const DEFAULT_DPI: u32 = 200;

/// Longest lifetime a SigV4 presigned URL may have (7 days).
const MAX_URL_EXPIRY_SECS: u64 = 7 * 24 * 60 * 60;

/// Configuration for one conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf2zip::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .default_dpi(150)
///     .jpeg_quality(85)
///     .build()
///     .unwrap();
/// assert_eq!(config.default_dpi, 150);
/// ```
#[derive(Clone, Debug)]
pub struct ConversionConfig {
    /// DPI applied when the request does not specify one. Default: 200.
    pub default_dpi: u32,

    /// JPEG quality, 1–100. Default: 75.
    pub jpeg_quality: u8,

    /// Upper bound on `width × height` of a single rendered page.
    /// Default: 1 000 000 000.
    ///
    /// A 1200-DPI render of a poster-sized page is many gigabytes of RGBA;
    /// the page is refused before pdfium allocates the bitmap.
    pub max_page_pixels: u64,

    /// Timeout for the PDF download in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Lifetime of the presigned download URL in seconds. Default: 3600.
    pub url_expiry_secs: u64,

    /// Directory under which each invocation creates its own scratch
    /// subdirectory. Default: the system temp dir.
    pub scratch_root: PathBuf,

    /// Explicit pdfium library file or directory. If None, the engine
    /// searches next to the executable, `./lib`, then the system paths.
    pub pdfium_lib_path: Option<PathBuf>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            default_dpi: DEFAULT_DPI,
            jpeg_quality: 75,
            max_page_pixels: 1_000_000_000,
            download_timeout_secs: 120,
            url_expiry_secs: 3600,
            scratch_root: std::env::temp_dir(),
            pdfium_lib_path: None,
        }
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn default_dpi(mut self, dpi: u32) -> Self {
        self.config.default_dpi = dpi.clamp(MIN_DPI, MAX_DPI);
        self
    }

    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.config.jpeg_quality = quality.clamp(1, 100);
        self
    }

    pub fn max_page_pixels(mut self, px: u64) -> Self {
        self.config.max_page_pixels = px;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn url_expiry_secs(mut self, secs: u64) -> Self {
        self.config.url_expiry_secs = secs;
        self
    }

    pub fn scratch_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.scratch_root = dir.into();
        self
    }

    pub fn pdfium_lib_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_path = Some(path.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Pdf2ZipError> {
        let c = &self.config;
        if c.download_timeout_secs == 0 {
            return Err(Pdf2ZipError::InvalidConfig(
                "Download timeout must be ≥ 1 second".into(),
            ));
        }
        if c.url_expiry_secs == 0 || c.url_expiry_secs > MAX_URL_EXPIRY_SECS {
            return Err(Pdf2ZipError::InvalidConfig(format!(
                "URL expiry must be 1–{MAX_URL_EXPIRY_SECS} seconds, got {}",
                c.url_expiry_secs
            )));
        }
        if c.max_page_pixels == 0 {
            return Err(Pdf2ZipError::InvalidConfig(
                "Page pixel limit must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Object store ─────────────────────────────────────────────────────────

/// Connection settings for the S3-compatible object store.
///
/// Every credential field is optional here: a missing value only becomes an
/// error ([`Pdf2ZipError::StoreNotConfigured`]) at the first store
/// operation, see [`StoreConfig::missing`].
#[derive(Clone, Default)]
pub struct StoreConfig {
    /// Service endpoint, with or without scheme
    /// (e.g. `oss-cn-hangzhou.aliyuncs.com`).
    pub endpoint: Option<String>,
    pub bucket: Option<String>,
    pub access_key_id: Option<String>,
    pub access_key_secret: Option<String>,
    /// STS token accompanying temporary credentials.
    pub security_token: Option<String>,
    /// Signing region. Derived from the endpoint host when None.
    pub region: Option<String>,
    /// Address buckets as `endpoint/bucket` instead of `bucket.endpoint`.
    pub force_path_style: bool,
    /// Per-operation timeout for store calls in seconds. Default: 60.
    pub timeout_secs: u64,
}

impl StoreConfig {
    pub fn new() -> Self {
        Self {
            timeout_secs: 60,
            ..Self::default()
        }
    }

    /// Names of the settings that are absent or blank, in env-var terms.
    pub fn missing(&self) -> Vec<&'static str> {
        let blank = |v: &Option<String>| v.as_deref().map_or(true, |s| s.trim().is_empty());
        let mut missing = Vec::new();
        if blank(&self.endpoint) {
            missing.push("OSS_ENDPOINT");
        }
        if blank(&self.bucket) {
            missing.push("OSS_BUCKET");
        }
        if blank(&self.access_key_id) {
            missing.push("ALIBABA_CLOUD_ACCESS_KEY_ID");
        }
        if blank(&self.access_key_secret) {
            missing.push("ALIBABA_CLOUD_ACCESS_KEY_SECRET");
        }
        missing
    }

    /// The endpoint as a full URL; `https://` is assumed when no scheme is given.
    pub fn endpoint_url(&self) -> Option<String> {
        let raw = self.endpoint.as_deref()?.trim().trim_end_matches('/');
        if raw.is_empty() {
            return None;
        }
        if raw.starts_with("http://") || raw.starts_with("https://") {
            Some(raw.to_string())
        } else {
            Some(format!("https://{raw}"))
        }
    }

    /// Region used for request signing.
    ///
    /// An explicit `region` wins. Otherwise the first label of an
    /// `oss-*` endpoint host is used (`oss-cn-hangzhou.aliyuncs.com` →
    /// `oss-cn-hangzhou`), falling back to `us-east-1`.
    pub fn signing_region(&self) -> String {
        if let Some(region) = self.region.as_deref().filter(|r| !r.trim().is_empty()) {
            return region.trim().to_string();
        }
        self.endpoint_url()
            .and_then(|url| {
                let host = url.split("://").nth(1)?.split(['/', ':']).next()?.to_string();
                let label = host.split('.').next()?.to_string();
                label.starts_with("oss-").then_some(label)
            })
            .map(|label| label.trim_end_matches("-internal").to_string())
            .unwrap_or_else(|| "us-east-1".to_string())
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");
        f.debug_struct("StoreConfig")
            .field("endpoint", &self.endpoint)
            .field("bucket", &self.bucket)
            .field("access_key_id", &self.access_key_id)
            .field("access_key_secret", &redact(&self.access_key_secret))
            .field("security_token", &redact(&self.security_token))
            .field("region", &self.region)
            .field("force_path_style", &self.force_path_style)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_store() -> StoreConfig {
        StoreConfig {
            endpoint: Some("oss-cn-hangzhou.aliyuncs.com".into()),
            bucket: Some("pdf-images".into()),
            access_key_id: Some("STS.id".into()),
            access_key_secret: Some("very-secret".into()),
            security_token: Some("token-value".into()),
            ..StoreConfig::new()
        }
    }

    #[test]
    fn defaults_match_documented_values() {
        let c = ConversionConfig::default();
        assert_eq!(c.default_dpi, 200);
        assert_eq!(c.jpeg_quality, 75);
        assert_eq!(c.url_expiry_secs, 3600);
        assert_eq!(c.download_timeout_secs, 120);
    }

    #[test]
    fn builder_clamps_and_validates() {
        let c = ConversionConfig::builder()
            .default_dpi(5000)
            .jpeg_quality(0)
            .build()
            .unwrap();
        assert_eq!(c.default_dpi, MAX_DPI);
        assert_eq!(c.jpeg_quality, 1);

        let err = ConversionConfig::builder()
            .url_expiry_secs(8 * 24 * 3600)
            .build()
            .unwrap_err();
        assert!(matches!(err, Pdf2ZipError::InvalidConfig(_)));

        assert!(ConversionConfig::builder()
            .download_timeout_secs(0)
            .build()
            .is_err());
    }

    #[test]
    fn missing_lists_blank_settings() {
        assert!(full_store().missing().is_empty());

        let mut store = full_store();
        store.bucket = Some("  ".into());
        store.access_key_secret = None;
        assert_eq!(
            store.missing(),
            vec!["OSS_BUCKET", "ALIBABA_CLOUD_ACCESS_KEY_SECRET"]
        );
        assert_eq!(StoreConfig::new().missing().len(), 4);
    }

    #[test]
    fn endpoint_gets_https_scheme() {
        let store = full_store();
        assert_eq!(
            store.endpoint_url().as_deref(),
            Some("https://oss-cn-hangzhou.aliyuncs.com")
        );

        let local = StoreConfig {
            endpoint: Some("http://127.0.0.1:9000/".into()),
            ..StoreConfig::new()
        };
        assert_eq!(local.endpoint_url().as_deref(), Some("http://127.0.0.1:9000"));
    }

    #[test]
    fn signing_region_derivation() {
        assert_eq!(full_store().signing_region(), "oss-cn-hangzhou");

        let internal = StoreConfig {
            endpoint: Some("https://oss-cn-beijing-internal.aliyuncs.com".into()),
            ..StoreConfig::new()
        };
        assert_eq!(internal.signing_region(), "oss-cn-beijing");

        let explicit = StoreConfig {
            region: Some("eu-central-1".into()),
            ..full_store()
        };
        assert_eq!(explicit.signing_region(), "eu-central-1");

        let minio = StoreConfig {
            endpoint: Some("http://127.0.0.1:9000".into()),
            ..StoreConfig::new()
        };
        assert_eq!(minio.signing_region(), "us-east-1");
    }

    #[test]
    fn debug_redacts_secrets() {
        let dbg = format!("{:?}", full_store());
        assert!(!dbg.contains("very-secret"), "got: {dbg}");
        assert!(!dbg.contains("token-value"), "got: {dbg}");
        assert!(dbg.contains("pdf-images"));
    }
}
