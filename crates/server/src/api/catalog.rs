//! # Catalog API
//!
//! JSON endpoints over the shared CatalogStore. Every command handler
//! mutates the store, mirrors criteria into the location and answers
//! with a fresh view.

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
    Json, Router,
};
use futures::stream::{self, Stream};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;

use storefront_core::sync::query::parse_pricing_list;
use storefront_core::{CatalogSnapshot, CatalogStore, Location};

use crate::{AppState, SharedState};

/// Snapshot plus the query string it is shareable as
#[derive(Debug, Serialize)]
pub struct CatalogView {
    #[serde(flatten)]
    pub snapshot: CatalogSnapshot,
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct KeywordRequest {
    pub keyword: String,
}

#[derive(Debug, Deserialize)]
pub struct PricingRequest {
    /// Tier tokens; unknown ones are ignored
    #[serde(default)]
    pub pricing: Vec<String>,
}

pub fn catalog_routes() -> Router<SharedState> {
    Router::new()
        .route("/", get(get_catalog))
        .route("/fetch", post(fetch_catalog))
        .route("/keyword", post(set_keyword))
        .route("/pricing", post(set_pricing))
        .route("/reset", post(reset_filters))
        .route("/more", post(load_more))
        .route("/events", get(events))
}

/// Current view
async fn get_catalog(State(state): State<SharedState>) -> Json<CatalogView> {
    Json(view(&state).await)
}

/// Fetch the catalog and answer once it has been applied
async fn fetch_catalog(State(state): State<SharedState>) -> Json<CatalogView> {
    run_fetch(&state).await;
    Json(view(&state).await)
}

async fn set_keyword(
    State(state): State<SharedState>,
    Json(req): Json<KeywordRequest>,
) -> Json<CatalogView> {
    Json(mutate(&state, |store| store.set_keyword(req.keyword)).await)
}

async fn set_pricing(
    State(state): State<SharedState>,
    Json(req): Json<PricingRequest>,
) -> Json<CatalogView> {
    let pricing = parse_pricing_list(&req.pricing.join(","));
    Json(mutate(&state, |store| store.set_pricing_filters(pricing)).await)
}

async fn reset_filters(State(state): State<SharedState>) -> Json<CatalogView> {
    Json(mutate(&state, |store| store.reset_filters()).await)
}

async fn load_more(State(state): State<SharedState>) -> Json<CatalogView> {
    Json(
        mutate(&state, |store| {
            store.load_more();
        })
        .await,
    )
}

/// Stream store events as SSE, with a heartbeat every 15 seconds
async fn events(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.store.read().await.subscribe();

    let stream = stream::unfold(rx, |mut rx| async move {
        loop {
            match tokio::time::timeout(Duration::from_secs(15), rx.recv()).await {
                Ok(Ok(event)) => {
                    if let Some(frame) = sse_frame(&event) {
                        return Some((Ok(frame), rx));
                    }
                }
                Ok(Err(RecvError::Lagged(skipped))) => {
                    tracing::warn!(skipped, "SSE subscriber lagged");
                }
                Ok(Err(RecvError::Closed)) => return None,
                Err(_) => return Some((Ok(Event::default().comment("heartbeat")), rx)),
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// JSON data frame for `payload`; `None` (logged) if it does not serialize
fn sse_frame<T: Serialize>(payload: &T) -> Option<Event> {
    match serde_json::to_string(payload) {
        Ok(json) => Some(Event::default().data(json)),
        Err(e) => {
            tracing::warn!(error = %e, "Skipping event that failed to serialize");
            None
        }
    }
}

/// Run one fetch through the configured loader.
///
/// The store lock is released while the loader is awaited so reads stay
/// responsive and show the previous items.
pub async fn run_fetch(state: &AppState) -> bool {
    let Some(ticket) = state.store.write().await.request_fetch() else {
        return false;
    };
    let result = state.loader.fetch_catalog().await;
    state.store.write().await.complete_fetch(ticket, result)
}

async fn mutate<F>(state: &AppState, command: F) -> CatalogView
where
    F: FnOnce(&mut CatalogStore),
{
    command(&mut *state.store.write().await);
    state.sync.lock().await.pump();
    view(state).await
}

async fn view(state: &AppState) -> CatalogView {
    let snapshot = state.store.read().await.snapshot();
    CatalogView {
        snapshot,
        query: state.location.search(),
    }
}
