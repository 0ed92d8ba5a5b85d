//! Batch jobs that call the classifier: post tagging and author bios.

pub mod bios;
pub mod pacer;
pub mod prompt;
pub mod tagger;
pub mod vocabulary;

pub use bios::{BioGenerator, BioSummary};
pub use pacer::RequestPacer;
pub use prompt::{build_tag_prompt, parse_tags};
pub use tagger::{PostTagger, TaggingSummary};
pub use vocabulary::{is_vocabulary_tag, DEFAULT_TAG, TAG_VOCABULARY, UNCATEGORIZED_TAG};
