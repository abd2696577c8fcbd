//! Storefront Server
//!
//! Axum host for the catalog core: owns the store, the loader and the
//! shareable location, and exposes them as a JSON API.

mod api;

use anyhow::Context;
use axum::{routing::get, Json, Router};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::{net::SocketAddr, sync::Arc};
use storefront_core::loader::loader_for_source;
use storefront_core::{
    CatalogConfig, CatalogLoader, CatalogStore, Location, QuerySyncAdapter, SharedLocation,
};
use tokio::{
    net::TcpListener,
    sync::{Mutex, RwLock},
};
use tracing_subscriber::EnvFilter;

/// Application state
pub struct AppState {
    store: RwLock<CatalogStore>,
    loader: Box<dyn CatalogLoader>,
    /// Query string the current criteria are shareable as
    location: SharedLocation,
    sync: Mutex<QuerySyncAdapter<SharedLocation>>,
}

type SharedState = Arc<AppState>;

impl AppState {
    /// Build the store and hydrate its criteria from `query`
    pub fn new(config: &CatalogConfig, loader: Box<dyn CatalogLoader>, query: &str) -> Self {
        let mut store = CatalogStore::new(config);
        let location = SharedLocation::new(query.trim_start_matches('?'));
        let mut sync = QuerySyncAdapter::new(location.clone());
        sync.hydrate(&mut store);

        Self {
            store: RwLock::new(store),
            loader,
            location,
            sync: Mutex::new(sync),
        }
    }
}

#[derive(Parser, Clone)]
#[command(author, version, about = "Storefront - filterable catalog server")]
struct Args {
    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(clap::Args, Clone, Default)]
struct CatalogArgs {
    /// Catalog source: http(s) URL or path to a JSON file
    #[arg(short, long)]
    source: Option<String>,
    /// Initial query string, e.g. "keyword=dress&pricing=Paid,Free"
    #[arg(short, long, default_value = "")]
    query: String,
    /// Items per page
    #[arg(long)]
    page_size: Option<usize>,
    /// Compute has_more from the filtered length after each fetch
    #[arg(long)]
    strict_has_more: bool,
}

#[derive(Subcommand, Clone)]
enum CliCommand {
    /// Start the API server (default)
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
        #[command(flatten)]
        catalog: CatalogArgs,
    },
    /// Fetch once and print the visible window (CLI mode, no server)
    Show {
        /// Number of pages to show
        #[arg(long, default_value = "1")]
        pages: usize,
        #[command(flatten)]
        catalog: CatalogArgs,
    },
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Environment config with CLI overrides applied
fn load_config(args: &CatalogArgs) -> anyhow::Result<CatalogConfig> {
    let mut config = CatalogConfig::from_env().context("Invalid STOREFRONT_* environment")?;
    if let Some(source) = &args.source {
        config.source_url = source.clone();
    }
    if let Some(page_size) = args.page_size {
        anyhow::ensure!(page_size > 0, "--page-size must be positive");
        config.page_size = page_size;
    }
    if args.strict_has_more {
        config.strict_has_more = true;
    }
    Ok(config)
}

fn build_state(args: &CatalogArgs) -> anyhow::Result<SharedState> {
    let config = load_config(args)?;
    let loader = loader_for_source(&config).context("Failed to create catalog loader")?;
    tracing::info!(source = %loader.describe(), page_size = config.page_size, "Catalog configured");
    Ok(Arc::new(AppState::new(&config, loader, &args.query)))
}

pub async fn run_server(port: u16, args: CatalogArgs) -> anyhow::Result<()> {
    let state = build_state(&args)?;

    // Initial fetch runs in the background; requests see Loading meanwhile
    let fetch_state = state.clone();
    tokio::spawn(async move {
        api::catalog::run_fetch(&fetch_state).await;
    });

    let app = Router::new()
        .route("/api/health", get(health))
        .nest("/api/catalog", api::catalog::catalog_routes())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(%addr, "Storefront listening");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn show(pages: usize, args: CatalogArgs) -> anyhow::Result<()> {
    let state = build_state(&args)?;
    api::catalog::run_fetch(&state).await;

    {
        let mut store = state.store.write().await;
        for _ in 1..pages {
            store.load_more();
        }
    }
    state.sync.lock().await.pump();

    let snapshot = state.store.read().await.snapshot();
    if let Some(error) = &snapshot.error {
        anyhow::bail!("Catalog fetch failed: {}", error);
    }

    for item in &snapshot.visible_items {
        println!(
            "{:<12} {:<40} {:<20} {}",
            item.id,
            item.title,
            item.owner_label(),
            item.price_label()
        );
    }
    println!(
        "\n{} of {} matching ({} total){}",
        snapshot.visible_items.len(),
        snapshot.filtered_count,
        snapshot.total_items,
        if snapshot.has_more { ", more available" } else { "" }
    );
    let query = state.location.search();
    if !query.is_empty() {
        println!("query: ?{}", query);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();
    init_tracing();

    let args = Args::parse();
    match args.command {
        Some(CliCommand::Show { pages, catalog }) => show(pages.max(1), catalog).await,
        Some(CliCommand::Serve { port, catalog }) => run_server(port, catalog).await,
        None => run_server(8080, CatalogArgs::default()).await,
    }
}
