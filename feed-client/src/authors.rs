//! Author resolution from post URLs.
//!
//! The lookup table lives in `data/authors.toml` and is compiled into the
//! binary. Deployments can layer an extra table of the same shape on top.

use inkhaven_core::{Author, CoreError, FeedError};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;
use url::Url;

const BUNDLED_AUTHORS: &str = include_str!("../data/authors.toml");

#[derive(Debug, Default, Deserialize)]
struct AuthorTable {
    #[serde(default)]
    domains: HashMap<String, Author>,
    #[serde(default)]
    aggregators: Vec<Aggregator>,
    #[serde(default)]
    platforms: Vec<Platform>,
}

/// A site hosting many writers under one identity.
#[derive(Debug, Clone, Deserialize)]
struct Aggregator {
    pattern: String,
    name: String,
    url: String,
}

/// A blog host where the first subdomain label names the writer.
#[derive(Debug, Clone, Deserialize)]
struct Platform {
    pattern: String,
}

#[derive(Debug, Clone)]
pub struct AuthorResolver {
    domains: HashMap<String, Author>,
    aggregators: Vec<Aggregator>,
    platforms: Vec<Platform>,
}

impl AuthorResolver {
    pub fn bundled() -> Result<Self, FeedError> {
        Self::from_toml_str(BUNDLED_AUTHORS)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, FeedError> {
        let table = parse_table(contents)?;
        Ok(Self {
            domains: table.domains,
            aggregators: table.aggregators,
            platforms: table.platforms,
        })
    }

    /// Merge another table over this one. Domain entries replace existing
    /// ones; aggregators and platforms from the override are checked first.
    pub fn with_overrides(mut self, contents: &str) -> Result<Self, FeedError> {
        let table = parse_table(contents)?;
        debug!(
            "Applying author overrides: {} domains, {} aggregators, {} platforms",
            table.domains.len(),
            table.aggregators.len(),
            table.platforms.len()
        );

        self.domains.extend(table.domains);

        let mut aggregators = table.aggregators;
        aggregators.append(&mut self.aggregators);
        self.aggregators = aggregators;

        let mut platforms = table.platforms;
        platforms.append(&mut self.platforms);
        self.platforms = platforms;

        Ok(self)
    }

    pub fn with_overrides_file(self, path: &Path) -> Result<Self, CoreError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(self.with_overrides(&contents)?)
    }

    pub fn domain_count(&self) -> usize {
        self.domains.len()
    }

    /// Resolve the display author for a post URL. Never fails: anything not
    /// in the table falls back to the bare domain.
    pub fn resolve(&self, post_url: &str) -> Author {
        let domain = post_domain(post_url);

        if let Some(author) = self.domains.get(&domain) {
            return author.clone();
        }

        if let Some(aggregator) = self
            .aggregators
            .iter()
            .find(|aggregator| domain.contains(&aggregator.pattern))
        {
            return Author {
                name: aggregator.name.clone(),
                url: aggregator.url.clone(),
            };
        }

        if self
            .platforms
            .iter()
            .any(|platform| domain.contains(&platform.pattern))
        {
            let handle = domain.split('.').next().unwrap_or_default();
            return Author {
                name: title_case(&handle.replace(['-', '_'], " ")),
                url: format!("https://{}/", domain),
            };
        }

        Author {
            name: domain.strip_prefix("www.").unwrap_or(&domain).to_string(),
            url: format!("https://{}/", domain),
        }
    }
}

fn parse_table(contents: &str) -> Result<AuthorTable, FeedError> {
    toml::from_str(contents).map_err(|e| FeedError::InvalidAuthorTable {
        details: e.to_string(),
    })
}

/// Host (plus explicit port) of a URL; empty when the URL does not parse.
///
/// Hosts come back lowercased, and internationalized domains are decoded
/// from their punycode form so fallback names read as the author wrote them.
pub fn post_domain(post_url: &str) -> String {
    match Url::parse(post_url.trim()) {
        Ok(url) => {
            let host = match url.domain() {
                Some(domain) => url::quirks::domain_to_unicode(domain),
                None => url.host_str().unwrap_or_default().to_string(),
            };
            match url.port() {
                Some(port) => format!("{}:{}", host, port),
                None => host,
            }
        }
        Err(_) => String::new(),
    }
}

/// Uppercase the first letter of every alphabetic run, lowercase the rest.
fn title_case(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut previous_is_letter = false;

    for ch in text.chars() {
        if ch.is_alphabetic() {
            if previous_is_letter {
                result.extend(ch.to_lowercase());
            } else {
                result.extend(ch.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            result.push(ch);
            previous_is_letter = false;
        }
    }

    result
}
