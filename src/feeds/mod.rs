//! Feed collection.
//!
//! [`collect`] fetches every registered source independently and merges the
//! results into an [`ArticleSet`]. Fetches run concurrently up to
//! [`CollectorOptions::concurrency`], but results are merged in registry
//! order, so completion order never leaks into the output.
//!
//! A failing or slow source only ever affects its own slot: errors and
//! timeouts become [`SourceOutcome::Failed`] and are logged once.
//!
//! # Submodules
//!
//! - [`registry`]: the source catalog
//! - [`http`]: the `reqwest` + `feed-rs` fetch capability

pub mod http;
pub mod registry;

use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio::time::{Instant, timeout_at};
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::error::FetchError;
use crate::models::{Article, ArticleSet, FeedEntry, FeedSource, SourceOutcome};

/// The fetch capability: one endpoint in, its entries (newest first) out.
pub trait FeedFetcher {
    async fn fetch(&self, endpoint: &Url) -> Result<Vec<FeedEntry>, FetchError>;
}

/// Tuning knobs for [`collect`].
#[derive(Debug, Clone)]
pub struct CollectorOptions {
    /// Maximum number of entries taken from each source.
    pub per_source_limit: usize,
    /// Deadline for a single source.
    pub per_source_timeout: Duration,
    /// How many sources are fetched at once.
    pub concurrency: usize,
    /// Optional deadline for the whole collection stage.
    pub run_timeout: Option<Duration>,
}

impl Default for CollectorOptions {
    fn default() -> Self {
        Self {
            per_source_limit: 3,
            per_source_timeout: Duration::from_secs(10),
            concurrency: 4,
            run_timeout: None,
        }
    }
}

/// Fetch every source and build the run's [`ArticleSet`].
///
/// Sources are fetched at most `options.concurrency` at a time, but results
/// are assembled in registry order regardless of completion order.
///
/// # Arguments
///
/// * `fetcher` - The fetch capability (HTTP in production, stubs in tests)
/// * `sources` - The registry, in the order categories should appear
/// * `options` - Per-source limit, deadlines and concurrency
///
/// # Returns
///
/// An [`ArticleSet`] with a slot for every source. A source that errors or
/// times out is recorded as [`SourceOutcome::Failed`] and logged once at
/// `warn`; it never aborts the collection.
///
/// # Example
///
/// ```ignore
/// let fetcher = HttpFeedFetcher::new(Duration::from_secs(10))?;
/// let set = collect(&fetcher, &registry::default_sources()?, &CollectorOptions::default()).await;
/// println!("{} articles", set.article_count());
/// ```
#[instrument(level = "info", skip_all, fields(sources = sources.len()))]
pub async fn collect<F: FeedFetcher>(
    fetcher: &F,
    sources: &[FeedSource],
    options: &CollectorOptions,
) -> ArticleSet {
    let run_deadline = options.run_timeout.map(|t| Instant::now() + t);

    let outcomes: Vec<SourceOutcome> = stream::iter(sources)
        .map(|source| fetch_source(fetcher, source, options, run_deadline))
        .buffered(options.concurrency.max(1))
        .collect()
        .await;

    let set = ArticleSet::assemble(sources, outcomes);
    info!(
        categories = set.categories().len(),
        articles = set.article_count(),
        failed_sources = set.failed_sources().count(),
        "Collected articles"
    );
    set
}

/// Fetch one source and normalize its entries.
///
/// Never fails: every error is folded into [`SourceOutcome::Failed`].
pub async fn fetch_source<F: FeedFetcher>(
    fetcher: &F,
    source: &FeedSource,
    options: &CollectorOptions,
    run_deadline: Option<Instant>,
) -> SourceOutcome {
    let source_deadline = Instant::now() + options.per_source_timeout;
    let (deadline, limit) = match run_deadline {
        Some(run) if run < source_deadline => (run, None),
        _ => (source_deadline, Some(options.per_source_timeout)),
    };

    let result = match timeout_at(deadline, fetcher.fetch(&source.endpoint)).await {
        Ok(result) => result,
        Err(_) => Err(match limit {
            Some(per_source) => FetchError::Timeout(per_source),
            None => FetchError::Unavailable("run timeout reached".to_string()),
        }),
    };

    match result {
        Ok(entries) => {
            let articles = normalize(source, entries, options.per_source_limit);
            debug!(source = %source.label(), count = articles.len(), "Fetched source");
            SourceOutcome::Fetched { articles }
        }
        Err(e) => {
            warn!(
                source = %source.source_name,
                category = %source.category,
                endpoint = %source.endpoint,
                error = %e,
                "Feed fetch failed; source contributes no articles"
            );
            SourceOutcome::Failed {
                reason: e.to_string(),
            }
        }
    }
}

/// Take the first `limit` entries and turn the usable ones into articles.
///
/// Entries without a title or link are dropped silently.
fn normalize(source: &FeedSource, entries: Vec<FeedEntry>, limit: usize) -> Vec<Article> {
    entries
        .into_iter()
        .take(limit)
        .filter_map(|entry| {
            let title = non_blank(entry.title)?;
            let link = non_blank(entry.link)?;
            Some(Article {
                title,
                link,
                source_name: source.source_name.clone(),
                category: source.category.clone(),
            })
        })
        .collect()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
