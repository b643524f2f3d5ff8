//! Prompt construction.
//!
//! [`build`] turns an [`ArticleSet`] into the body of the summarization
//! prompt. It is a pure function: the same set always yields the same bytes.
//! Anything run-specific (the date) lives in [`preamble`], which the
//! summarizer prepends separately.
//!
//! # Block format
//!
//! ```text
//! [[X - Politics]]
//! First headline (https://x.example.com/1)
//! Second headline (https://x.example.com/2)
//!
//! [[Y - Economy]]
//! ...
//! ```

use chrono::NaiveDate;

use crate::models::{ArticleSet, PromptBlock, block_label};

/// Separator placed between blocks in the prompt text.
pub const BLOCK_SEPARATOR: &str = "\n\n";

/// The serialized prompt body plus the blocks it was made from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Prompt {
    pub text: String,
    pub blocks: Vec<PromptBlock>,
}

impl Prompt {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// The marker line that opens a block, e.g. `[[X - Politics]]`.
pub fn marker(source_name: &str, category: &str) -> String {
    format!("[[{}]]", block_label(source_name, category))
}

/// Serialize every non-empty source into a block, in registry order.
///
/// Each block is a `[[Source - Category]]` marker line followed by one
/// `title (link)` line per article. Blocks are joined by a blank line.
///
/// # Arguments
///
/// * `article_set` - The collected headlines
///
/// # Returns
///
/// The prompt text and the blocks it was built from. Sources with no
/// articles contribute nothing, so an empty set yields an empty prompt.
/// The output depends only on `article_set`.
pub fn build(article_set: &ArticleSet) -> Prompt {
    let mut blocks = Vec::new();

    for category in article_set.categories() {
        for group in &category.sources {
            let articles = group.articles();
            if articles.is_empty() {
                continue;
            }

            let mut text = marker(&group.source_name, &category.category);
            for article in articles {
                text.push('\n');
                text.push_str(&format!("{} ({})", article.title, article.link));
            }

            blocks.push(PromptBlock {
                source_name: group.source_name.clone(),
                category: category.category.clone(),
                text,
            });
        }
    }

    let text = blocks
        .iter()
        .map(|b| b.text.as_str())
        .collect::<Vec<_>>()
        .join(BLOCK_SEPARATOR);

    Prompt { text, blocks }
}

/// Dated instructions placed ahead of the blocks.
pub fn preamble(run_date: NaiveDate, language: &str) -> String {
    format!(
        "The following is the list of major news headlines for {date}, grouped into blocks by source and category.\n\
         For each block, write a concise summary of at most 5 lines in {language}.\n\
         Begin every summary with that block's marker line exactly as given (for example [[Source - Category]]) \
         and write nothing outside the marked summaries.",
        date = run_date.format("%Y-%m-%d"),
    )
}
