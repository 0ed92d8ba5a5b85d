/// The closed set of machine tags.
pub const TAG_VOCABULARY: [&str; 30] = [
    "ai-safety",
    "technical-ml",
    "mathematics",
    "statistics",
    "biology",
    "physics",
    "chemistry",
    "philosophy",
    "moral-philosophy",
    "technology",
    "programming",
    "politics",
    "economics",
    "society",
    "personal",
    "life-advice",
    "rationality",
    "epistemology",
    "history",
    "art",
    "literature",
    "music",
    "psychology",
    "neuroscience",
    "religion",
    "education",
    "science-fiction",
    "games",
    "humor",
    "travel",
];

/// Assigned when the classifier answers but names no known tag.
pub const DEFAULT_TAG: &str = "personal";

/// Returned (never cached) when the classifier call itself fails.
pub const UNCATEGORIZED_TAG: &str = "uncategorized";

pub fn is_vocabulary_tag(tag: &str) -> bool {
    TAG_VOCABULARY.contains(&tag)
}
