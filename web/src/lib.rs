//! HTTP front for the post explorer: JSON query API plus the static page.

use axum::Router;
use database::{CommunityTagStore, KeyValueStore};
use inkhaven_core::{CoreError, TagRecord};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::info;

pub mod api;
pub mod catalog;
pub mod error;

pub use catalog::{merge_posts, PostView};
pub use error::{ApiError, ApiResult};

/// Shared by every handler. Stores are read afresh on each request.
#[derive(Clone)]
pub struct AppState {
    pub tags: Arc<dyn KeyValueStore<TagRecord>>,
    pub community: Arc<CommunityTagStore>,
    pub bios: Arc<dyn KeyValueStore<String>>,
    pub static_dir: PathBuf,
}

impl AppState {
    pub fn new(
        tags: Arc<dyn KeyValueStore<TagRecord>>,
        community: Arc<CommunityTagStore>,
        bios: Arc<dyn KeyValueStore<String>>,
        static_dir: PathBuf,
    ) -> Self {
        Self {
            tags,
            community,
            bios,
            static_dir,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let index = ServeFile::new(state.static_dir.join("index.html"));
    let assets = ServeDir::new(&state.static_dir);

    let api = Router::new()
        .route("/api/posts", get(api::list_posts))
        .route("/api/tags", get(api::list_tags))
        .route("/api/community-tags", get(api::list_community_tags))
        // Wildcard so post ids that are URLs keep their slashes.
        .route("/api/community-tags/*post_id", post(api::add_community_tag))
        .route("/api/authors", get(api::list_authors))
        .route("/api/author-bios", get(api::list_author_bios))
        .merge(api::health_routes());

    Router::new()
        .merge(api)
        .with_state(state)
        .route_service("/", index)
        .fallback_service(assets)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(state: AppState, addr: SocketAddr) -> Result<(), CoreError> {
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Starting Inkhaven Post Explorer on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
