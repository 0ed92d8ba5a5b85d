use database::TagCache;
use inkhaven_core::{CommunityTags, TaggedPost};
use serde::Serialize;

/// A cached post as the front-end sees it: the machine record plus whatever
/// community tags readers have added.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostView {
    #[serde(flatten)]
    pub post: TaggedPost,
    pub community_tags: Vec<String>,
}

/// Every cached post, newest first by `date_modified` string order.
pub fn merge_posts(cache: &TagCache, community: &CommunityTags) -> Vec<PostView> {
    let mut views: Vec<PostView> = cache
        .posts()
        .into_iter()
        .map(|post| {
            let community_tags = community.get(&post.id).cloned().unwrap_or_default();
            PostView {
                post,
                community_tags,
            }
        })
        .collect();

    views.sort_by(|a, b| {
        b.post
            .record
            .date_modified
            .cmp(&a.post.record.date_modified)
    });
    views
}
