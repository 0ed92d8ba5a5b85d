use crate::vocabulary::{is_vocabulary_tag, DEFAULT_TAG, TAG_VOCABULARY};
use inkhaven_core::FeedItem;

pub fn build_tag_prompt(post: &FeedItem) -> String {
    format!(
        "You are a tagging system. Based on the blog post title and URL below, return ONLY a \
         comma-separated list of 1-4 relevant tags. Do not explain or justify your choices.\n\
         \n\
         Available tags: {vocabulary}\n\
         \n\
         Title: {title}\n\
         URL: {url}\n\
         Author: {author}\n\
         \n\
         Response format (example): technical-ml, mathematics",
        vocabulary = TAG_VOCABULARY.join(", "),
        title = post.title,
        url = post.url,
        author = post.author.name,
    )
}

/// Extract vocabulary tags from the first line of a classifier reply.
///
/// Unknown tokens are dropped, duplicates keep their first position, and an
/// empty result becomes the default tag.
pub fn parse_tags(response: &str) -> Vec<String> {
    let first_line = response.trim().lines().next().unwrap_or_default();

    let mut tags: Vec<String> = Vec::new();
    for token in first_line.split(',') {
        let tag = token.trim().to_lowercase();
        if is_vocabulary_tag(&tag) && !tags.contains(&tag) {
            tags.push(tag);
        }
    }

    if tags.is_empty() {
        tags.push(DEFAULT_TAG.to_string());
    }
    tags
}
