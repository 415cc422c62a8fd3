//! Function Compute custom-runtime entry point.
//!
//! Reads configuration from the environment once at cold start, then serves
//! the platform's `POST /invoke` calls on `FC_SERVER_PORT` (see
//! [`pdf2zip::invoke`]). Invocations never fail at the HTTP level: errors
//! travel back to the invoker as `{"code": "Error", …}`.

use anyhow::{Context, Result};
use clap::Parser;
use pdf2zip::invoke::{self, InvokeState};
use pdf2zip::{ConversionConfig, S3Store, StoreConfig};
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Rasterise a remote PDF to JPEG pages, zip them and publish a presigned link.
///
/// Every option is normally supplied through its environment variable.
#[derive(Parser, Debug)]
#[command(name = "bootstrap", version, about)]
struct Cli {
    /// Port the platform forwards invocations to.
    #[arg(long, env = "FC_SERVER_PORT", default_value_t = invoke::DEFAULT_PORT)]
    port: u16,

    /// Object store endpoint, e.g. oss-cn-hangzhou.aliyuncs.com.
    #[arg(long, env = "OSS_ENDPOINT")]
    endpoint: Option<String>,

    /// Bucket receiving the archives.
    #[arg(long, env = "OSS_BUCKET")]
    bucket: Option<String>,

    /// Access key id (temporary STS credentials are fine).
    #[arg(long, env = "ALIBABA_CLOUD_ACCESS_KEY_ID", hide_env_values = true)]
    access_key_id: Option<String>,

    /// Access key secret.
    #[arg(long, env = "ALIBABA_CLOUD_ACCESS_KEY_SECRET", hide_env_values = true)]
    access_key_secret: Option<String>,

    /// STS security token.
    #[arg(long, env = "ALIBABA_CLOUD_SECURITY_TOKEN", hide_env_values = true)]
    security_token: Option<String>,

    /// Signing region; derived from the endpoint when unset.
    #[arg(long, env = "OSS_REGION")]
    region: Option<String>,

    /// Use path-style bucket addressing (MinIO and similar).
    #[arg(long, env = "OSS_PATH_STYLE")]
    path_style: bool,

    /// DPI used when a request carries none (36–1200).
    #[arg(long, env = "PDF2ZIP_DEFAULT_DPI", default_value_t = 200,
          value_parser = clap::value_parser!(u32).range(36..=1200))]
    default_dpi: u32,

    /// JPEG quality (1–100).
    #[arg(long, env = "PDF2ZIP_JPEG_QUALITY", default_value_t = 75,
          value_parser = clap::value_parser!(u8).range(1..=100))]
    jpeg_quality: u8,

    /// Refuse pages whose rendered width × height exceeds this.
    #[arg(long, env = "PDF2ZIP_MAX_PAGE_PIXELS", default_value_t = 1_000_000_000)]
    max_page_pixels: u64,

    /// PDF download timeout in seconds.
    #[arg(long, env = "PDF2ZIP_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Object store operation timeout in seconds.
    #[arg(long, env = "PDF2ZIP_STORE_TIMEOUT", default_value_t = 60)]
    store_timeout: u64,

    /// Lifetime of the presigned URL in seconds.
    #[arg(long, env = "PDF2ZIP_URL_EXPIRY", default_value_t = 3600)]
    url_expiry: u64,

    /// Root for per-invocation scratch directories (default: system temp dir).
    #[arg(long, env = "PDF2ZIP_SCRATCH_DIR")]
    scratch_dir: Option<PathBuf>,

    /// libpdfium file or the directory containing it.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib_path: Option<PathBuf>,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2ZIP_VERBOSE")]
    verbose: bool,
}

fn build_config(cli: &Cli) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .default_dpi(cli.default_dpi)
        .jpeg_quality(cli.jpeg_quality)
        .max_page_pixels(cli.max_page_pixels)
        .download_timeout_secs(cli.download_timeout)
        .url_expiry_secs(cli.url_expiry);

    if let Some(ref dir) = cli.scratch_dir {
        builder = builder.scratch_root(dir);
    }
    if let Some(ref path) = cli.pdfium_lib_path {
        builder = builder.pdfium_lib_path(path);
    }

    builder.build().context("Invalid conversion settings")
}

fn build_store_config(cli: &Cli) -> StoreConfig {
    StoreConfig {
        endpoint: cli.endpoint.clone(),
        bucket: cli.bucket.clone(),
        access_key_id: cli.access_key_id.clone(),
        access_key_secret: cli.access_key_secret.clone(),
        security_token: cli.security_token.clone(),
        region: cli.region.clone(),
        force_path_style: cli.path_style,
        timeout_secs: cli.store_timeout,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Log collectors do not render ANSI escapes.
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_ansi(false)
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let config = build_config(&cli)?;
    let store_config = build_store_config(&cli);

    let missing = store_config.missing();
    if !missing.is_empty() {
        warn!(
            "Object store settings missing ({}); uploads will fail until they are provided",
            missing.join(", ")
        );
    }
    info!(?config, ?store_config, "Cold start");

    let store = S3Store::new(&store_config);
    let app = invoke::router(InvokeState::new(config, Arc::new(store)));

    // ── Serve invocations ────────────────────────────────────────────────
    let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Listening for invocations on {}", addr);

    axum::serve(listener, app).await.context("Invoke server terminated")
}
