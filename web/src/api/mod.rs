//! HTTP handlers

pub mod community;
pub mod health;
pub mod posts;

pub use community::{add_community_tag, list_community_tags, AddTagRequest};
pub use health::health_routes;
pub use posts::{list_author_bios, list_authors, list_posts, list_tags};
