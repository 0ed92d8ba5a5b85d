pub mod authors;
pub mod rss;

#[cfg(test)]
mod tests;

pub use authors::{post_domain, AuthorResolver};
pub use rss::{convert_rss, normalize_pub_date};

use inkhaven_core::{CoreError, JsonFeed};
use reqwest::Client;
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Reads RSS from disk or over HTTP and reads/writes JSON Feed documents.
#[derive(Debug, Clone)]
pub struct FeedClient {
    http_client: Client,
}

impl FeedClient {
    pub fn new(user_agent: &str) -> Result<Self, CoreError> {
        let http_client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self { http_client })
    }

    /// `source` is either an `http(s)://` URL or a local path.
    pub async fn read_rss(&self, source: &str) -> Result<String, CoreError> {
        if source.starts_with("http://") || source.starts_with("https://") {
            info!("Fetching feed from {}", source);
            let response = self
                .http_client
                .get(source)
                .send()
                .await?
                .error_for_status()?;
            Ok(response.text().await?)
        } else {
            debug!("Reading feed from {}", source);
            Ok(tokio::fs::read_to_string(source).await?)
        }
    }

    pub async fn convert(
        &self,
        source: &str,
        output: &Path,
        resolver: &AuthorResolver,
    ) -> Result<JsonFeed, CoreError> {
        let xml = self.read_rss(source).await?;
        let feed = convert_rss(&xml, resolver)?;
        write_json_feed(output, &feed).await?;
        info!("Converted {} items", feed.items.len());
        info!("Saved to {}", output.display());
        Ok(feed)
    }
}

pub async fn load_json_feed(path: &Path) -> Result<JsonFeed, CoreError> {
    let contents = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&contents)?)
}

/// Pretty-printed with four-space indentation; non-ASCII is written as-is.
pub async fn write_json_feed(path: &Path, feed: &JsonFeed) -> Result<(), CoreError> {
    let mut bytes = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut bytes, formatter);
    feed.serialize(&mut serializer)?;
    bytes.push(b'\n');
    tokio::fs::write(path, bytes).await?;
    Ok(())
}

