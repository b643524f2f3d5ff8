//! Plain-text serialization.
//!
//! ```text
//! Daily digest 2025-05-06
//! =======================
//!
//! ## AI Summary
//!
//! [X - Politics]
//! Summary text
//!
//! ## All Collected Headlines
//!
//! ### Politics
//! - Headline (X)
//!   https://x.example.com/1
//! ```

use std::fmt::Write;

use super::{Document, NO_ARTICLES_LINE, RAW_HEADING, SUMMARY_HEADING, SummarySection};

pub fn render(doc: &Document) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(out, "{}", doc.heading);
    let _ = writeln!(out, "{}", "=".repeat(doc.heading.chars().count().max(3)));
    let _ = writeln!(out);

    let _ = writeln!(out, "## {SUMMARY_HEADING}");
    let _ = writeln!(out);
    match &doc.summary {
        SummarySection::Blocks(blocks) => {
            for block in blocks {
                if let Some(title) = &block.title {
                    let _ = writeln!(out, "[{title}]");
                }
                let _ = writeln!(out, "{}", block.body);
                let _ = writeln!(out);
            }
        }
        SummarySection::Warning(message) => {
            let _ = writeln!(out, "⚠ {message}");
            let _ = writeln!(out);
        }
    }

    let _ = writeln!(out, "## {RAW_HEADING}");
    for category in &doc.raw {
        let _ = writeln!(out);
        let _ = writeln!(out, "### {}", category.name);
        if category.articles.is_empty() {
            let _ = writeln!(out, "{NO_ARTICLES_LINE}");
        }
        for article in &category.articles {
            let _ = writeln!(out, "- {} ({})", article.title, article.source_name);
            if let Some(link) = &article.link {
                let _ = writeln!(out, "  {link}");
            }
        }
        for source in &category.unavailable {
            let _ = writeln!(out, "! {} unavailable: {}", source.source_name, source.reason);
        }
    }

    out
}
