//! Report rendering.
//!
//! [`render`] merges the summary outcome with the full [`ArticleSet`] into a
//! [`Document`], the format-independent content of the report, and then
//! serializes it with one of the submodules:
//!
//! - [`plain`]: line-oriented text
//! - [`html`]: HTML with inline styling for mail clients
//!
//! Both serializations carry the same sections in the same order:
//!
//! 1. the summary section: titled blocks parsed from the completion, or a
//!    single warning when summarization failed
//! 2. the raw section: every category in registry order with its headlines,
//!    an explicit "no articles collected" line for empty categories, and a
//!    note for each source that could not be fetched
//!
//! Rendering never fails; missing fields turn into placeholders.

pub mod html;
pub mod plain;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, instrument};

use crate::models::{ArticleSet, Report, ReportFormat, SourceOutcome, SummaryResult};
use crate::utils::or_placeholder;

pub const SUMMARY_HEADING: &str = "AI Summary";
pub const RAW_HEADING: &str = "All Collected Headlines";
pub const NO_ARTICLES_LINE: &str = "No articles collected.";
pub const UNTITLED: &str = "(untitled)";
pub const EMPTY_BLOCK: &str = "(no summary text)";

pub const UNTITLED_BLOCK: &str = "(untitled block)";

/// `[[Source - Category]]`, tolerating spaces inside the brackets.
///
/// Markdown decoration attached to the marker itself (`## [[...]]`,
/// `**[[...]]**`) is part of the match so it never leaks into a body.
/// Leading hashes only count at the start of a line.
static MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)(?:^[ \t]*#+[ \t]*)?\**\[\[([^\[\]\n]+)\]\]\**")
        .expect("marker regex is valid")
});

/// One titled (or untitled) piece of the summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryBlock {
    /// Marker contents, e.g. `X - Politics`. `None` for text outside any marker.
    pub title: Option<String>,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummarySection {
    Blocks(Vec<SummaryBlock>),
    Warning(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawArticle {
    pub title: String,
    /// Only set for absolute http(s) links.
    pub link: Option<String>,
    pub source_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnavailableSource {
    pub source_name: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCategory {
    pub name: String,
    pub articles: Vec<RawArticle>,
    pub unavailable: Vec<UnavailableSource>,
}

/// Format-independent report content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub heading: String,
    pub summary: SummarySection,
    pub raw: Vec<RawCategory>,
}

/// Render the run's report.
///
/// # Arguments
///
/// * `result` - The summarization outcome
/// * `article_set` - Every collected headline, including failed sources
/// * `format` - Plain text or HTML
/// * `subject` - Used as the document heading and the report subject
///
/// # Returns
///
/// A [`Report`] whose body holds the summary section (parsed blocks, or one
/// warning quoting the failure reason) followed by the raw section listing
/// every category. Rendering never fails.
#[instrument(level = "info", skip_all, fields(?format))]
pub fn render(
    result: &SummaryResult,
    article_set: &ArticleSet,
    format: ReportFormat,
    subject: &str,
) -> Report {
    let document = build_document(result, article_set, subject);
    let body = match format {
        ReportFormat::Plain => plain::render(&document),
        ReportFormat::Html => html::render(&document),
    };
    debug!(bytes = body.len(), "Rendered report");

    Report {
        subject: subject.to_string(),
        body,
        format,
    }
}

/// Assemble the logical content shared by every format.
pub fn build_document(result: &SummaryResult, article_set: &ArticleSet, subject: &str) -> Document {
    let summary = match result {
        SummaryResult::Success { text } => SummarySection::Blocks(parse_summary_blocks(text)),
        SummaryResult::Failure { reason } => SummarySection::Warning(warning_message(reason)),
    };

    let raw = article_set
        .categories()
        .iter()
        .map(|category| RawCategory {
            name: or_placeholder(&category.category, "(uncategorized)").to_string(),
            articles: category
                .articles()
                .map(|article| RawArticle {
                    title: or_placeholder(&article.title, UNTITLED).to_string(),
                    link: linkable(&article.link),
                    source_name: or_placeholder(&article.source_name, "(unknown source)")
                        .to_string(),
                })
                .collect(),
            unavailable: category
                .sources
                .iter()
                .filter_map(|group| match &group.outcome {
                    SourceOutcome::Failed { reason } => Some(UnavailableSource {
                        source_name: group.source_name.clone(),
                        reason: reason.clone(),
                    }),
                    SourceOutcome::Fetched { .. } => None,
                })
                .collect(),
        })
        .collect();

    Document {
        heading: subject.to_string(),
        summary,
        raw,
    }
}

/// The warning shown in place of the summary. Always contains `reason` verbatim.
pub fn warning_message(reason: &str) -> String {
    format!(
        "The AI summary could not be generated ({reason}). The collected headlines are listed below."
    )
}

/// Split a completion on its `[[Source - Category]]` markers.
///
/// Block order follows the completion. Text before the first marker becomes
/// an untitled block; a completion without any marker is one untitled block.
/// Bodies are the text between markers with surrounding whitespace trimmed
/// and nothing else touched.
///
/// # Example
/// ```ignore
/// let blocks = parse_summary_blocks("[[X - Politics]]\n**Rates** cut");
/// assert_eq!(blocks[0].title.as_deref(), Some("X - Politics"));
/// assert_eq!(blocks[0].body, "**Rates** cut");
/// ```
pub fn parse_summary_blocks(text: &str) -> Vec<SummaryBlock> {
    let markers: Vec<_> = MARKER.captures_iter(text).collect();

    let Some(first) = markers.first().and_then(|c| c.get(0)) else {
        return vec![SummaryBlock {
            title: None,
            body: or_placeholder(text, EMPTY_BLOCK).to_string(),
        }];
    };

    let mut blocks = Vec::with_capacity(markers.len() + 1);
    let lead = text[..first.start()].trim();
    if !lead.is_empty() {
        blocks.push(SummaryBlock {
            title: None,
            body: lead.to_string(),
        });
    }

    for (i, caps) in markers.iter().enumerate() {
        let (Some(whole), Some(label)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let end = markers
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map_or(text.len(), |next| next.start());
        let body = &text[whole.end()..end];

        blocks.push(SummaryBlock {
            title: Some(or_placeholder(label.as_str(), UNTITLED_BLOCK).to_string()),
            body: or_placeholder(body, EMPTY_BLOCK).to_string(),
        });
    }
    blocks
}

fn linkable(link: &str) -> Option<String> {
    url::Url::parse(link.trim())
        .ok()
        .filter(|u| matches!(u.scheme(), "http" | "https"))
        .map(|u| u.to_string())
}
