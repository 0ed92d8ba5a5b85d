use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const JSON_FEED_VERSION: &str = "https://jsonfeed.org/version/1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub url: String,
}

/// One post of a JSON Feed document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedItem {
    pub id: String,
    #[serde(default)]
    pub content_html: String,
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub date_modified: String,
    #[serde(default = "default_author")]
    pub author: Author,
}

fn default_title() -> String {
    "Untitled".to_string()
}

fn default_author() -> Author {
    Author {
        name: String::new(),
        url: String::new(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonFeed {
    pub version: String,
    pub title: String,
    pub home_page_url: String,
    pub feed_url: String,
    pub description: String,
    #[serde(default)]
    pub items: Vec<FeedItem>,
}

/// Cached classification of a single post, keyed by post id in the tag cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRecord {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub date_modified: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl TagRecord {
    pub fn from_item(item: &FeedItem, tags: Vec<String>) -> Self {
        Self {
            title: item.title.clone(),
            url: item.url.clone(),
            author: item.author.name.clone(),
            date_modified: item.date_modified.clone(),
            tags,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedPost {
    pub id: String,
    #[serde(flatten)]
    pub record: TagRecord,
}

/// Post id -> community tags, in the order they were added.
pub type CommunityTags = BTreeMap<String, Vec<String>>;

/// Author name -> generated bio.
pub type AuthorBios = BTreeMap<String, String>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_item_defaults_for_missing_fields() {
        let item: FeedItem = serde_json::from_str(r#"{"id": "post-1"}"#).unwrap();
        assert_eq!(item.title, "Untitled");
        assert_eq!(item.url, "");
        assert_eq!(item.author.name, "");
    }

    #[test]
    fn test_tagged_post_flattens_record() {
        let post = TaggedPost {
            id: "post-1".to_string(),
            record: TagRecord {
                title: "On Writing".to_string(),
                url: "https://example.org/on-writing".to_string(),
                author: "example.org".to_string(),
                date_modified: "2025-11-03T00:00:00.000Z".to_string(),
                tags: vec!["literature".to_string()],
            },
        };

        let value = serde_json::to_value(&post).unwrap();
        assert_eq!(value["id"], "post-1");
        assert_eq!(value["title"], "On Writing");
        assert_eq!(value["tags"][0], "literature");
        assert!(value.get("record").is_none());
    }
}
