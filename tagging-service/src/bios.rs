use crate::pacer::RequestPacer;
use database::{KeyValueStore, TagCache};
use inkhaven_core::{AuthorBios, CoreError};
use llm_interface::LlmProvider;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const MAX_TITLES: usize = 10;
const MAX_TOP_TAGS: usize = 5;
const FALLBACK_TAG_COUNT: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BioSummary {
    pub authors: usize,
    pub skipped: usize,
    pub generated: usize,
    pub fallbacks: usize,
}

/// Titles and tag counts of one author's cached posts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorProfile {
    pub titles: Vec<String>,
    pub top_tags: Vec<(String, usize)>,
}

/// Group the cache by non-empty author name.
pub fn author_profiles(cache: &TagCache) -> BTreeMap<String, AuthorProfile> {
    let mut grouped: BTreeMap<String, (Vec<String>, Vec<(String, usize)>)> = BTreeMap::new();

    for record in cache.entries().values() {
        if record.author.is_empty() {
            continue;
        }
        let (titles, counts) = grouped.entry(record.author.clone()).or_default();
        titles.push(record.title.clone());
        for tag in &record.tags {
            match counts.iter_mut().find(|(name, _)| name == tag) {
                Some((_, count)) => *count += 1,
                None => counts.push((tag.clone(), 1)),
            }
        }
    }

    grouped
        .into_iter()
        .map(|(author, (mut titles, mut counts))| {
            titles.truncate(MAX_TITLES);
            // Stable sort keeps first-seen order among equal counts.
            counts.sort_by(|a, b| b.1.cmp(&a.1));
            counts.truncate(MAX_TOP_TAGS);
            (
                author,
                AuthorProfile {
                    titles,
                    top_tags: counts,
                },
            )
        })
        .collect()
}

pub fn build_bio_prompt(author: &str, profile: &AuthorProfile) -> String {
    let titles = profile
        .titles
        .iter()
        .map(|title| format!("- {}", title))
        .collect::<Vec<_>>()
        .join("\n");
    let topics = profile
        .top_tags
        .iter()
        .map(|(tag, count)| format!("{} ({})", tag, count))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Based on these blog post titles and topics, write a brief (2-3 sentence) \
         description of what {author} writes about. Be specific and engaging.\n\
         \n\
         Recent post titles:\n\
         {titles}\n\
         \n\
         Most common topics: {topics}\n\
         \n\
         Write a concise, engaging bio that captures their main themes and style. \
         Start directly with what they write about (don't say \"This author writes \
         about...\"). Keep it under 60 words."
    )
}

pub fn fallback_bio(profile: &AuthorProfile) -> String {
    let tags = profile
        .top_tags
        .iter()
        .take(FALLBACK_TAG_COUNT)
        .map(|(tag, _)| tag.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    format!("Writer exploring various topics including {}.", tags)
}

/// Writes one short bio per author into the bio store.
pub struct BioGenerator<P: LlmProvider> {
    provider: P,
    store: Arc<dyn KeyValueStore<String>>,
    pacer: RequestPacer,
}

impl<P: LlmProvider> BioGenerator<P> {
    pub fn new(provider: P, store: Arc<dyn KeyValueStore<String>>, request_delay: Duration) -> Self {
        Self {
            provider,
            store,
            pacer: RequestPacer::new(request_delay),
        }
    }

    /// Authors that already have a bio are skipped. The store is rewritten
    /// after every author, and a failed or empty reply stores the fallback
    /// bio instead.
    pub async fn generate(&mut self, cache: &TagCache) -> Result<BioSummary, CoreError> {
        let profiles = author_profiles(cache);
        let mut bios: AuthorBios = self.store.load().await?;

        let mut summary = BioSummary {
            authors: profiles.len(),
            ..Default::default()
        };
        info!("Generating bios for {} authors...", summary.authors);

        for (i, (author, profile)) in profiles.iter().enumerate() {
            let position = i + 1;
            if bios.contains_key(author) {
                info!("[{}/{}] Skipping (cached): {}", position, summary.authors, author);
                summary.skipped += 1;
                continue;
            }

            info!("[{}/{}] Generating bio for: {}", position, summary.authors, author);
            self.pacer.wait().await;

            let result = self.provider.classify(&build_bio_prompt(author, profile)).await;
            self.pacer.finish();

            let bio = match result {
                Ok(reply) if !reply.trim().is_empty() => {
                    summary.generated += 1;
                    reply.trim().to_string()
                }
                Ok(_) => {
                    warn!("Empty bio reply for {}", author);
                    summary.fallbacks += 1;
                    fallback_bio(profile)
                }
                Err(e) => {
                    warn!("Error generating bio for {}: {}", author, e);
                    summary.fallbacks += 1;
                    fallback_bio(profile)
                }
            };

            bios.insert(author.clone(), bio);
            self.store.save(&bios).await?;
        }

        info!("Done! {} authors have bios.", bios.len());
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> AuthorProfile {
        AuthorProfile {
            titles: vec!["On Proofs".to_string(), "Against Lemmas".to_string()],
            top_tags: vec![
                ("mathematics".to_string(), 3),
                ("philosophy".to_string(), 2),
                ("history".to_string(), 1),
                ("art".to_string(), 1),
            ],
        }
    }

    #[test]
    fn test_bio_prompt_lists_titles_and_topics() {
        let prompt = build_bio_prompt("Jenn", &profile());
        assert!(prompt.contains("what Jenn writes about"));
        assert!(prompt.contains("Recent post titles:\n- On Proofs\n- Against Lemmas\n"));
        assert!(prompt.contains("Most common topics: mathematics (3), philosophy (2), history (1), art (1)"));
        assert!(prompt.ends_with("Keep it under 60 words."));
    }

    #[test]
    fn test_fallback_uses_three_top_tags() {
        assert_eq!(
            fallback_bio(&profile()),
            "Writer exploring various topics including mathematics, philosophy, history."
        );
    }
}
