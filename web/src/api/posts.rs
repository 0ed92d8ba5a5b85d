//! Read-only views over the tag cache and the bio store.

use axum::{extract::State, Json};
use database::TagCache;
use inkhaven_core::AuthorBios;

use crate::catalog::{merge_posts, PostView};
use crate::error::ApiResult;
use crate::AppState;

/// GET /api/posts
///
/// Newest first, each post carrying its community tags.
pub async fn list_posts(State(state): State<AppState>) -> ApiResult<Json<Vec<PostView>>> {
    let cache = TagCache::open(state.tags.clone()).await?;
    let community = state.community.load().await?;
    Ok(Json(merge_posts(&cache, &community)))
}

/// GET /api/tags
pub async fn list_tags(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    let cache = TagCache::open(state.tags.clone()).await?;
    Ok(Json(cache.all_tags()))
}

/// GET /api/authors
pub async fn list_authors(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    let cache = TagCache::open(state.tags.clone()).await?;
    Ok(Json(cache.all_authors()))
}

/// GET /api/author-bios
pub async fn list_author_bios(State(state): State<AppState>) -> ApiResult<Json<AuthorBios>> {
    Ok(Json(state.bios.load().await?))
}
