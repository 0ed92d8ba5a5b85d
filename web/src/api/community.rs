use axum::{
    extract::{Path, State},
    Json,
};
use database::AddTagOutcome;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AddTagRequest {
    #[serde(default)]
    pub tag: String,
}

/// GET /api/community-tags
pub async fn list_community_tags(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(state.community.all_tags().await?))
}

/// POST /api/community-tags/*post_id
///
/// A duplicate tag is still a 200, with `success: false`.
pub async fn add_community_tag(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    Json(request): Json<AddTagRequest>,
) -> ApiResult<Json<Value>> {
    let body = match state.community.add_tag(&post_id, &request.tag).await? {
        AddTagOutcome::Added(tag) => json!({ "success": true, "tag": tag }),
        AddTagOutcome::AlreadyPresent(_) => {
            json!({ "success": false, "message": "Tag already exists" })
        }
    };
    Ok(Json(body))
}
