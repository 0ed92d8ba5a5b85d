use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use database::{connect_sqlite, CommunityTagStore, JsonFileStore, KeyValueStore, SqliteStore, TagCache};
use feed_client::{load_json_feed, AuthorResolver, FeedClient};
use inkhaven_core::{AppConfig, ConfigError, CoreError, ErrorReporter, StorageBackend, TagRecord};
use llm_interface::ClaudeProvider;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tagging_service::{BioGenerator, PostTagger};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use web::AppState;

const DEFAULT_LOG_FILTER: &str =
    "inkhaven=info,feed_client=info,llm_interface=info,database=info,tagging_service=info,web=info";

const USER_AGENT: &str = concat!("inkhaven/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Parser)]
#[command(name = "inkhaven", version, about = "Inkhaven Post Explorer")]
struct Cli {
    /// Configuration file (defaults to ./inkhaven.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Convert the RSS feed into a JSON Feed document
    Convert {
        /// RSS file path or http(s) URL
        #[arg(long)]
        input: Option<String>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Classify posts that are not in the tag cache yet
    Tag {
        /// Only look at the first N posts of the feed
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        feed: Option<PathBuf>,
    },
    /// Write a short bio for every author in the tag cache
    Bios,
    /// Serve the query API and the front-end
    Serve {
        #[arg(long)]
        port: Option<u16>,
    },
}

struct Stores {
    tags: Arc<dyn KeyValueStore<TagRecord>>,
    community: Arc<dyn KeyValueStore<Vec<String>>>,
    bios: Arc<dyn KeyValueStore<String>>,
}

async fn open_stores(config: &AppConfig) -> Result<Stores, CoreError> {
    Ok(match config.storage.backend {
        StorageBackend::Json => Stores {
            tags: Arc::new(JsonFileStore::new(&config.paths.tag_cache)),
            community: Arc::new(JsonFileStore::new(&config.paths.community_tags)),
            bios: Arc::new(JsonFileStore::new(&config.paths.author_bios)),
        },
        StorageBackend::Sqlite => {
            let pool = connect_sqlite(&config.storage.sqlite_url).await?;
            Stores {
                tags: Arc::new(SqliteStore::new(pool.clone(), "tag_cache")),
                community: Arc::new(SqliteStore::new(pool.clone(), "community_tags")),
                bios: Arc::new(SqliteStore::new(pool, "author_bios")),
            }
        }
    })
}

fn author_resolver(config: &AppConfig) -> Result<AuthorResolver, CoreError> {
    let resolver = AuthorResolver::bundled()?;
    match &config.paths.author_overrides {
        Some(path) => resolver.with_overrides_file(path),
        None => Ok(resolver),
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::load(cli.config.as_deref()).context("failed to load configuration")?;

    match cli.command {
        Command::Convert { input, output } => {
            let input = input.unwrap_or_else(|| config.paths.feed_xml.display().to_string());
            let output = output.unwrap_or_else(|| config.paths.feed_json.clone());

            let resolver = author_resolver(&config)?;
            info!("Loaded author table with {} domains", resolver.domain_count());

            FeedClient::new(USER_AGENT)?
                .convert(&input, &output, &resolver)
                .await
                .with_context(|| format!("failed to convert {}", input))?;
        }
        Command::Tag { limit, feed } => {
            let feed_path = feed.unwrap_or_else(|| config.paths.feed_json.clone());
            let feed = load_json_feed(&feed_path)
                .await
                .with_context(|| format!("failed to read {}", feed_path.display()))?;

            let provider = ClaudeProvider::from_config(&config)?;
            let stores = open_stores(&config).await?;
            let cache = TagCache::open(stores.tags).await?;

            let mut tagger = PostTagger::new(provider, cache, config.request_delay());
            let summary = tagger.tag_all_posts(&feed, limit).await?;
            info!(
                "{} posts: {} tagged, {} cached, {} failed",
                summary.total, summary.tagged, summary.skipped, summary.failed
            );
        }
        Command::Bios => {
            let provider = ClaudeProvider::from_config(&config)?;
            let stores = open_stores(&config).await?;
            let cache = TagCache::open(stores.tags).await?;

            let mut generator = BioGenerator::new(provider, stores.bios, config.request_delay());
            let summary = generator.generate(&cache).await?;
            info!(
                "{} authors: {} generated, {} cached, {} fallbacks",
                summary.authors, summary.generated, summary.skipped, summary.fallbacks
            );
        }
        Command::Serve { port } => {
            let port = port.unwrap_or(config.server.port);
            let addr: SocketAddr = format!("{}:{}", config.server.host, port)
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    field: "server.host".to_string(),
                    value: config.server.host.clone(),
                })?;

            let stores = open_stores(&config).await?;
            let state = AppState::new(
                stores.tags,
                Arc::new(CommunityTagStore::new(stores.community)),
                stores.bios,
                config.paths.static_dir.clone(),
            );
            web::serve(state, addr)
                .await
                .with_context(|| format!("server on {} stopped", addr))?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let Some(core) = e.downcast_ref::<CoreError>() {
                ErrorReporter::new().report_error(core);
            }
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
