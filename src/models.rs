//! Data models shared by the pipeline stages.
//!
//! - [`FeedSource`]: one registered feed, identified by `(category, source_name)`
//! - [`Article`]: a normalized headline taken from one feed entry
//! - [`ArticleSet`]: everything collected in one run, grouped by category then source
//! - [`PromptBlock`]: the per-source slice of the prompt
//! - [`SummaryResult`]: outcome of the summarization step
//! - [`Report`]: the rendered document handed to the notifier

use serde::{Deserialize, Serialize};
use url::Url;

/// A registered feed source.
///
/// Defined once at startup by the registry and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FeedSource {
    /// Category heading the source's articles are filed under.
    pub category: String,
    /// Publisher name shown in block markers and attributions.
    #[serde(rename = "name")]
    pub source_name: String,
    /// RSS/Atom/JSON Feed URL.
    pub endpoint: Url,
}

impl FeedSource {
    pub fn new(category: &str, source_name: &str, endpoint: Url) -> Self {
        Self {
            category: category.to_string(),
            source_name: source_name.to_string(),
            endpoint,
        }
    }

    /// The `Source - Category` label used in prompt headers and summary markers.
    pub fn label(&self) -> String {
        block_label(&self.source_name, &self.category)
    }
}

/// Format the `Source - Category` label shared by prompt and summary blocks.
pub fn block_label(source_name: &str, category: &str) -> String {
    format!("{source_name} - {category}")
}

/// One entry as returned by the fetch capability, before normalization.
///
/// Feeds in the wild omit fields freely, so both are optional here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: Option<String>,
    pub link: Option<String>,
}

impl FeedEntry {
    #[cfg(test)]
    pub fn new(title: &str, link: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            link: Some(link.to_string()),
        }
    }
}

/// A normalized headline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub link: String,
    pub source_name: String,
    pub category: String,
}

/// Result of fetching a single source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOutcome {
    /// The feed was fetched; `articles` may still be empty.
    Fetched { articles: Vec<Article> },
    /// The feed could not be fetched or parsed.
    Failed { reason: String },
}

impl SourceOutcome {
    pub fn articles(&self) -> &[Article] {
        match self {
            SourceOutcome::Fetched { articles } => articles,
            SourceOutcome::Failed { .. } => &[],
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, SourceOutcome::Failed { .. })
    }
}

/// One source's slot inside a category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceGroup {
    pub source_name: String,
    pub outcome: SourceOutcome,
}

impl SourceGroup {
    pub fn articles(&self) -> &[Article] {
        self.outcome.articles()
    }
}

/// All sources registered under one category, in registry order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryGroup {
    pub category: String,
    pub sources: Vec<SourceGroup>,
}

impl CategoryGroup {
    /// Articles of every source in this category, in collection order.
    pub fn articles(&self) -> impl Iterator<Item = &Article> {
        self.sources.iter().flat_map(|s| s.articles().iter())
    }

    pub fn article_count(&self) -> usize {
        self.sources.iter().map(|s| s.articles().len()).sum()
    }
}

/// The category-grouped collection of headlines gathered in one run.
///
/// Every category in the registry has an entry, even when all of its sources
/// failed. Category order is the order of first appearance in the registry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleSet {
    categories: Vec<CategoryGroup>,
}

impl ArticleSet {
    /// Build the set from the registry and one outcome per source.
    ///
    /// `outcomes` must be in the same order as `sources`; a missing outcome is
    /// recorded as a failure rather than dropping the slot.
    pub fn assemble(sources: &[FeedSource], outcomes: Vec<SourceOutcome>) -> Self {
        let mut categories: Vec<CategoryGroup> = Vec::new();
        let mut outcomes = outcomes.into_iter();

        for source in sources {
            let outcome = outcomes.next().unwrap_or_else(|| SourceOutcome::Failed {
                reason: "no result recorded".to_string(),
            });
            let group = SourceGroup {
                source_name: source.source_name.clone(),
                outcome,
            };

            match categories.iter_mut().find(|c| c.category == source.category) {
                Some(existing) => existing.sources.push(group),
                None => categories.push(CategoryGroup {
                    category: source.category.clone(),
                    sources: vec![group],
                }),
            }
        }

        Self { categories }
    }

    pub fn categories(&self) -> &[CategoryGroup] {
        &self.categories
    }

    #[cfg(test)]
    pub fn category(&self, name: &str) -> Option<&CategoryGroup> {
        self.categories.iter().find(|c| c.category == name)
    }

    pub fn article_count(&self) -> usize {
        self.categories.iter().map(CategoryGroup::article_count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.article_count() == 0
    }

    /// `(category, source)` pairs whose fetch failed.
    pub fn failed_sources(&self) -> impl Iterator<Item = (&str, &SourceGroup)> {
        self.categories.iter().flat_map(|c| {
            c.sources
                .iter()
                .filter(|s| s.outcome.is_failed())
                .map(move |s| (c.category.as_str(), s))
        })
    }
}

/// The prompt text contributed by one non-empty source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptBlock {
    pub source_name: String,
    pub category: String,
    pub text: String,
}

/// Outcome of the summarization step.
///
/// Kept as a tagged value so an error message can never be rendered as if it
/// were a summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryResult {
    Success { text: String },
    Failure { reason: String },
}

impl SummaryResult {
    pub fn failure(reason: impl Into<String>) -> Self {
        Self::Failure {
            reason: reason.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SummaryResult::Success { .. })
    }
}

/// Output serialization of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ReportFormat {
    /// Line-oriented plain text.
    #[default]
    Plain,
    /// HTML with inline styling.
    Html,
}

/// The rendered document for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub subject: String,
    pub body: String,
    pub format: ReportFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(category: &str, name: &str) -> FeedSource {
        let url = format!("https://{}.example.com/rss", name.to_lowercase());
        FeedSource::new(category, name, Url::parse(&url).unwrap())
    }

    fn article(category: &str, name: &str, title: &str) -> Article {
        Article {
            title: title.to_string(),
            link: format!("https://example.com/{title}"),
            source_name: name.to_string(),
            category: category.to_string(),
        }
    }

    #[test]
    fn test_feed_source_label() {
        assert_eq!(source("Politics", "X").label(), "X - Politics");
    }

    #[test]
    fn test_feed_source_deserializes_from_yaml() {
        let yaml = "category: Economy\nname: Hankyung\nendpoint: https://www.hankyung.com/feed\n";
        let parsed: FeedSource = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(parsed.source_name, "Hankyung");
        assert_eq!(parsed.endpoint.as_str(), "https://www.hankyung.com/feed");
    }

    #[test]
    fn test_assemble_groups_by_first_appearance() {
        let sources = vec![
            source("General", "A"),
            source("Economy", "B"),
            source("General", "C"),
        ];
        let outcomes = vec![
            SourceOutcome::Fetched {
                articles: vec![article("General", "A", "a1")],
            },
            SourceOutcome::Failed {
                reason: "timeout".into(),
            },
            SourceOutcome::Fetched {
                articles: vec![article("General", "C", "c1"), article("General", "C", "c2")],
            },
        ];

        let set = ArticleSet::assemble(&sources, outcomes);
        let names: Vec<&str> = set.categories().iter().map(|c| c.category.as_str()).collect();
        assert_eq!(names, vec!["General", "Economy"]);

        let general = set.category("General").unwrap();
        assert_eq!(general.sources.len(), 2);
        let titles: Vec<&str> = general.articles().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["a1", "c1", "c2"]);

        assert_eq!(set.category("Economy").unwrap().article_count(), 0);
        assert_eq!(set.article_count(), 3);
    }

    #[test]
    fn test_assemble_keeps_categories_when_everything_fails() {
        let sources = vec![source("Politics", "X"), source("Sports", "Y")];
        let outcomes = vec![
            SourceOutcome::Failed { reason: "dns".into() },
            SourceOutcome::Failed { reason: "tls".into() },
        ];

        let set = ArticleSet::assemble(&sources, outcomes);
        assert_eq!(set.categories().len(), 2);
        assert!(set.is_empty());
        assert_eq!(set.failed_sources().count(), 2);
    }

    #[test]
    fn test_assemble_missing_outcome_is_failure() {
        let sources = vec![source("Politics", "X")];
        let set = ArticleSet::assemble(&sources, vec![]);
        let (category, group) = set.failed_sources().next().unwrap();
        assert_eq!(category, "Politics");
        assert_eq!(group.source_name, "X");
    }

    #[test]
    fn test_summary_result_failure_helper() {
        let result = SummaryResult::failure("quota exceeded");
        assert!(!result.is_success());
        assert_eq!(
            result,
            SummaryResult::Failure {
                reason: "quota exceeded".to_string()
            }
        );
    }
}
