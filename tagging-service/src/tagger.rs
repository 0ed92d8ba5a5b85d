use crate::pacer::RequestPacer;
use crate::prompt::{build_tag_prompt, parse_tags};
use crate::vocabulary::UNCATEGORIZED_TAG;
use database::TagCache;
use inkhaven_core::{CoreError, ErrorExt, FeedItem, JsonFeed, TagRecord};
use llm_interface::LlmProvider;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaggingSummary {
    pub total: usize,
    pub skipped: usize,
    pub tagged: usize,
    pub failed: usize,
}

enum TagOutcome {
    Cached(Vec<String>),
    Tagged(Vec<String>),
    Failed,
}

/// Classifies feed posts through an [`LlmProvider`], consulting and filling
/// the tag cache so each post id is classified at most once.
pub struct PostTagger<P: LlmProvider> {
    provider: P,
    cache: TagCache,
    pacer: RequestPacer,
}

impl<P: LlmProvider> PostTagger<P> {
    pub fn new(provider: P, cache: TagCache, request_delay: Duration) -> Self {
        Self {
            provider,
            cache,
            pacer: RequestPacer::new(request_delay),
        }
    }

    pub fn cache(&self) -> &TagCache {
        &self.cache
    }

    pub fn into_cache(self) -> TagCache {
        self.cache
    }

    /// Tags for `post`, classifying it only if it is not cached yet.
    ///
    /// A failed classifier call yields the `uncategorized` sentinel and
    /// leaves the cache untouched so the next run retries. Only a failure to
    /// persist the cache is returned as an error.
    pub async fn tag_post(&mut self, post: &FeedItem) -> Result<Vec<String>, CoreError> {
        Ok(match self.tag_with_outcome(post).await? {
            TagOutcome::Cached(tags) | TagOutcome::Tagged(tags) => tags,
            TagOutcome::Failed => vec![UNCATEGORIZED_TAG.to_string()],
        })
    }

    async fn tag_with_outcome(&mut self, post: &FeedItem) -> Result<TagOutcome, CoreError> {
        if let Some(record) = self.cache.get(&post.id) {
            return Ok(TagOutcome::Cached(record.tags.clone()));
        }

        let prompt = build_tag_prompt(post);
        self.pacer.wait().await;

        let result = self.provider.classify(&prompt).await;
        self.pacer.finish();

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                warn!("Error tagging post {}: {}", post.title, e);
                e.log_warn();
                return Ok(TagOutcome::Failed);
            }
        };

        let tags = parse_tags(&response);
        self.cache
            .insert(post.id.clone(), TagRecord::from_item(post, tags.clone()))
            .await?;
        Ok(TagOutcome::Tagged(tags))
    }

    /// Tag the feed's posts in order, optionally only the first `limit`.
    ///
    /// Cached posts are skipped, so an interrupted run can simply be started
    /// again.
    pub async fn tag_all_posts(
        &mut self,
        feed: &JsonFeed,
        limit: Option<usize>,
    ) -> Result<TaggingSummary, CoreError> {
        let posts = match limit {
            Some(limit) => &feed.items[..limit.min(feed.items.len())],
            None => &feed.items[..],
        };

        let mut summary = TaggingSummary {
            total: posts.len(),
            ..Default::default()
        };
        info!("Processing {} posts...", summary.total);

        for (i, post) in posts.iter().enumerate() {
            let position = i + 1;
            if self.cache.contains(&post.id) {
                info!("[{}/{}] Skipping (cached): {}", position, summary.total, post.title);
                summary.skipped += 1;
                continue;
            }

            info!("[{}/{}] Tagging: {}", position, summary.total, post.title);
            match self.tag_with_outcome(post).await? {
                TagOutcome::Tagged(_) => summary.tagged += 1,
                TagOutcome::Failed => summary.failed += 1,
                TagOutcome::Cached(_) => summary.skipped += 1,
            }
        }

        info!(
            "Done! Tagged {} posts total ({} new, {} failed).",
            self.cache.len(),
            summary.tagged,
            summary.failed
        );
        Ok(summary)
    }
}
