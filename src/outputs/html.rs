//! HTML serialization.
//!
//! Mail clients strip `<style>` blocks unevenly, so all styling is inline.

use std::fmt::Write;

use html_escape::{encode_double_quoted_attribute, encode_text};

use super::{Document, NO_ARTICLES_LINE, RAW_HEADING, SUMMARY_HEADING, SummarySection};

const BODY_STYLE: &str = "font-family:-apple-system,'Segoe UI',Roboto,'Noto Sans KR',sans-serif;color:#222;max-width:720px;margin:0 auto;padding:16px;line-height:1.5";
const H1_STYLE: &str = "font-size:22px;border-bottom:2px solid #333;padding-bottom:6px";
const H2_STYLE: &str = "font-size:18px;margin-top:28px;color:#1a4d8f";
const BLOCK_STYLE: &str = "background:#f5f7fa;border-left:4px solid #1a4d8f;padding:8px 12px;margin:12px 0";
const BLOCK_TITLE_STYLE: &str = "font-size:15px;margin:0 0 6px 0";
const WARNING_STYLE: &str = "background:#fff4e5;border-left:4px solid #e69500;padding:8px 12px;margin:12px 0";
const CATEGORY_STYLE: &str = "font-size:16px;margin:18px 0 6px 0";
const SOURCE_STYLE: &str = "color:#666;font-size:13px";
const MUTED_STYLE: &str = "color:#888;font-style:italic";

pub fn render(doc: &Document) -> String {
    let mut out = String::new();
    let heading = encode_text(&doc.heading);

    // Writing into a String cannot fail.
    let _ = writeln!(out, "<!DOCTYPE html>");
    let _ = writeln!(out, "<html><head><meta charset=\"utf-8\"><title>{heading}</title></head>");
    let _ = writeln!(out, "<body style=\"{BODY_STYLE}\">");
    let _ = writeln!(out, "<h1 style=\"{H1_STYLE}\">{heading}</h1>");

    let _ = writeln!(out, "<h2 style=\"{H2_STYLE}\">{SUMMARY_HEADING}</h2>");
    match &doc.summary {
        SummarySection::Blocks(blocks) => {
            for block in blocks {
                let _ = writeln!(out, "<div style=\"{BLOCK_STYLE}\">");
                if let Some(title) = &block.title {
                    let _ = writeln!(
                        out,
                        "<h3 style=\"{BLOCK_TITLE_STYLE}\">{}</h3>",
                        encode_text(title)
                    );
                }
                let _ = writeln!(out, "<p style=\"margin:0\">{}</p>", multiline(&block.body));
                let _ = writeln!(out, "</div>");
            }
        }
        SummarySection::Warning(message) => {
            let _ = writeln!(
                out,
                "<div style=\"{WARNING_STYLE}\"><strong>&#9888;</strong> {}</div>",
                encode_text(message)
            );
        }
    }

    let _ = writeln!(out, "<h2 style=\"{H2_STYLE}\">{RAW_HEADING}</h2>");
    for category in &doc.raw {
        let _ = writeln!(
            out,
            "<h3 style=\"{CATEGORY_STYLE}\">{}</h3>",
            encode_text(&category.name)
        );
        if category.articles.is_empty() {
            let _ = writeln!(out, "<p style=\"{MUTED_STYLE}\">{NO_ARTICLES_LINE}</p>");
        } else {
            let _ = writeln!(out, "<ul>");
            for article in &category.articles {
                let title = match &article.link {
                    Some(link) => format!(
                        "<a href=\"{}\">{}</a>",
                        encode_double_quoted_attribute(link),
                        encode_text(&article.title)
                    ),
                    None => encode_text(&article.title).into_owned(),
                };
                let _ = writeln!(
                    out,
                    "<li>{title} <span style=\"{SOURCE_STYLE}\">({})</span></li>",
                    encode_text(&article.source_name)
                );
            }
            let _ = writeln!(out, "</ul>");
        }
        for source in &category.unavailable {
            let _ = writeln!(
                out,
                "<p style=\"{MUTED_STYLE}\">{} unavailable: {}</p>",
                encode_text(&source.source_name),
                encode_text(&source.reason)
            );
        }
    }

    let _ = writeln!(out, "</body></html>");
    out
}

fn multiline(text: &str) -> String {
    text.lines()
        .map(|line| encode_text(line).into_owned())
        .collect::<Vec<_>>()
        .join("<br>\n")
}
