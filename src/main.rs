use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use axum::http::Method;
use clap::Parser;
use file_gateway::{AppState, Config};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

type BoxError = Box<dyn std::error::Error>;

#[derive(Parser, Debug)]
#[command(name = "file-gateway")]
#[command(about = "Minimal HTTP file manager over a single base directory")]
#[command(version)]
struct Cli {
    /// Port to listen on
    #[arg(short, long, env = "FILE_GATEWAY_PORT", default_value = "8000")]
    port: u16,

    /// Address to bind to
    #[arg(short, long, env = "FILE_GATEWAY_BIND", default_value = "0.0.0.0")]
    bind: String,

    /// Base directory every request path resolves against
    #[arg(short, long, env = "FILE_GATEWAY_ROOT", default_value = "files")]
    root: PathBuf,

    /// Log at debug level
    #[arg(short, long, env = "FILE_GATEWAY_VERBOSE")]
    verbose: bool,

    /// TOML file with upload limit and chunk size
    #[arg(short, long, env = "FILE_GATEWAY_CONFIG")]
    config: Option<PathBuf>,
}

/// `RUST_LOG` wins over the verbosity flag.
fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("file_gateway={level},tower_http={level}")));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

/// Canonicalize the base directory and make sure it is a directory.
fn base_directory(root: &Path) -> Result<PathBuf, BoxError> {
    let root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());

    match std::fs::metadata(&root) {
        Ok(meta) if meta.is_dir() => Ok(root),
        Ok(_) => Err(format!("Root path is not a directory: {}", root.display()).into()),
        Err(e) => Err(format!("Root directory {} is unusable: {}", root.display(), e).into()),
    }
}

/// Cross-origin access for the verbs the gateway serves.
fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers(Any)
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    let root_dir = base_directory(&cli.root)?;

    info!(
        root = %root_dir.display(),
        max_upload_size = config.max_upload_size,
        chunk_size = config.chunk_size,
        "Serving base directory"
    );

    let trace = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let app = file_gateway::router(AppState::with_config(root_dir, config))
        .layer(ServiceBuilder::new().layer(trace).layer(cors()));

    let addr: SocketAddr = format!("{}:{}", cli.bind, cli.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("File gateway listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
