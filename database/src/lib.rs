//! Durable key-value stores for the tag cache, community tags and author bios.
//!
//! Each store is a flat map keyed by post id (or author name) that is loaded
//! and rewritten as a whole. Callers only depend on [`KeyValueStore`], so the
//! JSON-file and SQLite backends are interchangeable.

pub mod community;
pub mod json_store;
pub mod sqlite_store;
pub mod store;
pub mod tag_cache;


pub use community::{normalize_tag, AddTagOutcome, CommunityTagStore};
pub use json_store::JsonFileStore;
pub use sqlite_store::{connect_sqlite, SqliteStore};
pub use store::KeyValueStore;
pub use tag_cache::TagCache;
