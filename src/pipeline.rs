//! One digest run: collect → build prompt → summarize → render → notify.
//!
//! Each stage runs once and feeds the next. Feed and summarization failures
//! are absorbed into the report; only a delivery failure makes the run fail.

use std::time::Instant;

use chrono::NaiveDate;
use tracing::{debug, info, instrument, warn};

use crate::api::TextGenerator;
use crate::config::Config;
use crate::error::DeliveryError;
use crate::feeds::{self, FeedFetcher};
use crate::models::Report;
use crate::notifier::{self, Deliverer};
use crate::outputs;
use crate::prompt;
use crate::summarizer::Summarizer;

/// Process exit status for a run that delivered its report, degraded or not.
pub const EXIT_OK: u8 = 0;
/// Process exit status when the report could not be delivered.
pub const EXIT_DELIVERY_FAILED: u8 = 1;
/// Process exit status for a fatal configuration error.
pub const EXIT_CONFIG_ERROR: u8 = 2;

/// What a successful run produced.
#[derive(Debug)]
pub struct RunOutcome {
    pub articles: usize,
    pub failed_sources: usize,
    pub prompt_blocks: usize,
    pub summarized: bool,
    pub report: Report,
}

/// Execute the whole pipeline once.
#[instrument(level = "info", skip_all, fields(%run_date))]
pub async fn run<F, G, D>(
    config: &Config,
    fetcher: &F,
    summarizer: &Summarizer<G>,
    deliverer: &D,
    run_date: NaiveDate,
) -> Result<RunOutcome, DeliveryError>
where
    F: FeedFetcher,
    G: TextGenerator,
    D: Deliverer,
{
    let t0 = Instant::now();

    let article_set = feeds::collect(fetcher, &config.sources, &config.collector).await;

    if article_set.is_empty() {
        warn!(
            sources = config.sources.len(),
            "No articles collected; the summary step will be skipped"
        );
    }

    let prompt = prompt::build(&article_set);
    info!(
        empty = prompt.is_empty(),
        blocks = prompt.blocks.len(),
        bytes = prompt.text.len(),
        "Built prompt"
    );
    for block in &prompt.blocks {
        debug!(source = %block.source_name, category = %block.category, "Prompt block");
    }

    let summary = summarizer.summarize(&prompt.text).await;

    let subject = notifier::subject_line(&config.subject_prefix, run_date);
    let report = outputs::render(&summary, &article_set, config.format, &subject);
    info!(subject = %report.subject, format = ?report.format, bytes = report.body.len(), "Rendered report");

    notifier::notify(
        deliverer,
        &report,
        &config.recipient,
        &config.subject_prefix,
        run_date,
    )
    .await?;

    let outcome = RunOutcome {
        articles: article_set.article_count(),
        failed_sources: article_set.failed_sources().count(),
        prompt_blocks: prompt.blocks.len(),
        summarized: summary.is_success(),
        report,
    };
    info!(
        elapsed_ms = t0.elapsed().as_millis(),
        articles = outcome.articles,
        failed_sources = outcome.failed_sources,
        summarized = outcome.summarized,
        "Run complete"
    );
    Ok(outcome)
}

/// Map a run result to the process exit status.
pub fn exit_status(result: &Result<RunOutcome, DeliveryError>) -> u8 {
    match result {
        Ok(_) => EXIT_OK,
        Err(_) => EXIT_DELIVERY_FAILED,
    }
}

/// The line printed once a run has handed its report off.
pub fn confirmation(config: &Config) -> String {
    match config.smtp {
        Some(_) => format!("Report sent to {}", config.recipient),
        None => "Report printed to stdout (dry run)".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LlmConfig, SmtpConfig};
    use crate::feeds::CollectorOptions;
    use crate::models::{FeedSource, ReportFormat};
    use crate::testing::{StubDeliverer, StubFeed, StubFetcher, StubGenerator, entries, source};
    use std::time::Duration;

    fn config(sources: Vec<FeedSource>, format: ReportFormat) -> Config {
        Config {
            sources,
            collector: CollectorOptions {
                per_source_timeout: Duration::from_millis(500),
                ..Default::default()
            },
            llm: LlmConfig {
                base_url: "http://localhost".into(),
                api_key: "sk-test".into(),
                model: "test".into(),
                max_retries: 0,
                timeout: Duration::from_secs(1),
            },
            smtp: None,
            recipient: "reader@example.com".into(),
            format,
            subject_prefix: "Digest ".into(),
            summary_language: "English".into(),
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 6).unwrap()
    }

    #[test]
    fn test_confirmation_in_dry_run() {
        let config = config(vec![source("Politics", "X")], ReportFormat::Plain);
        assert_eq!(confirmation(&config), "Report printed to stdout (dry run)");
    }

    #[test]
    fn test_confirmation_names_recipient_when_mailed() {
        let mut config = config(vec![source("Politics", "X")], ReportFormat::Plain);
        config.smtp = Some(SmtpConfig {
            host: "smtp.example.com".into(),
            port: 465,
            username: "bot@example.com".into(),
            password: "secret".into(),
            from: "bot@example.com".parse().unwrap(),
        });
        assert_eq!(confirmation(&config), "Report sent to reader@example.com");
    }

    #[tokio::test]
    async fn test_single_source_success() {
        let sources = vec![source("Politics", "X")];
        let fetcher = StubFetcher::new().with(&sources[0], StubFeed::Entries(entries("headline", 3)));
        let generator = StubGenerator::replying("[[X - Politics]]\nSummary text");
        let summarizer = Summarizer::new(&generator, "");
        let deliverer = StubDeliverer::accepting();
        let config = config(sources, ReportFormat::Plain);

        let outcome = run(&config, &fetcher, &summarizer, &deliverer, date())
            .await
            .unwrap();

        assert_eq!(outcome.articles, 3);
        assert_eq!(outcome.prompt_blocks, 1);
        assert!(outcome.summarized);

        let prompts = generator.prompts();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].matches("[[X - Politics]]").count(), 1);

        let body = &outcome.report.body;
        assert!(body.contains("[X - Politics]\nSummary text\n"));
        let raw = &body[body.find(outputs::RAW_HEADING).unwrap()..];
        assert!(raw.contains("### Politics"));
        for i in 1..=3 {
            assert!(raw.contains(&format!("- headline {i} (X)")));
        }

        let sent = deliverer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "Digest 2025-05-06");
        assert_eq!(sent[0].to, "reader@example.com");
        assert_eq!(sent[0].body, outcome.report.body);
    }

    #[tokio::test]
    async fn test_failing_source_keeps_category() {
        let sources = vec![source("Politics", "X"), source("Sports", "Y")];
        let fetcher = StubFetcher::new()
            .with(&sources[0], StubFeed::Entries(entries("headline", 2)))
            .with(&sources[1], StubFeed::Error("connection reset".into()));
        let generator = StubGenerator::replying("[[X - Politics]]\nok");
        let summarizer = Summarizer::new(&generator, "");
        let deliverer = StubDeliverer::accepting();
        let config = config(sources, ReportFormat::Plain);

        let outcome = run(&config, &fetcher, &summarizer, &deliverer, date())
            .await
            .unwrap();

        assert_eq!(outcome.failed_sources, 1);
        assert_eq!(outcome.prompt_blocks, 1);
        let body = &outcome.report.body;
        assert!(body.contains("### Sports\nNo articles collected.\n! Y unavailable: connection reset"));
    }

    #[tokio::test]
    async fn test_summarizer_failure_still_lists_articles() {
        let sources = vec![source("Politics", "X"), source("Economy", "Y")];
        let fetcher = StubFetcher::new()
            .with(&sources[0], StubFeed::Entries(entries("pol", 3)))
            .with(&sources[1], StubFeed::Entries(entries("eco", 2)));
        let generator = StubGenerator::failing("insufficient_quota");
        let summarizer = Summarizer::new(&generator, "");
        let deliverer = StubDeliverer::accepting();
        let config = config(sources, ReportFormat::Html);

        let outcome = run(&config, &fetcher, &summarizer, &deliverer, date())
            .await
            .unwrap();

        assert!(!outcome.summarized);
        let body = &outcome.report.body;
        assert!(body.contains("insufficient_quota"));
        for title in ["pol 1", "pol 2", "pol 3", "eco 1", "eco 2"] {
            assert!(body.contains(title), "missing {title}");
        }
        assert_eq!(exit_status(&Ok(outcome)), EXIT_OK);
    }

    #[tokio::test]
    async fn test_no_articles_skips_summarizer() {
        let sources = vec![source("Politics", "X")];
        let fetcher = StubFetcher::new().with(&sources[0], StubFeed::Error("dns failure".into()));
        let generator = StubGenerator::replying("unused");
        let summarizer = Summarizer::new(&generator, "preamble");
        let deliverer = StubDeliverer::accepting();
        let config = config(sources, ReportFormat::Plain);

        let outcome = run(&config, &fetcher, &summarizer, &deliverer, date())
            .await
            .unwrap();

        assert_eq!(generator.calls(), 0);
        assert!(outcome.report.body.contains("no articles collected"));
        assert_eq!(deliverer.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_delivery_failure_is_fatal() {
        let sources = vec![source("Politics", "X")];
        let fetcher = StubFetcher::new().with(&sources[0], StubFeed::Entries(entries("headline", 1)));
        let generator = StubGenerator::replying("[[X - Politics]]\nok");
        let summarizer = Summarizer::new(&generator, "");
        let deliverer = StubDeliverer::rejecting("550 mailbox unavailable");
        let config = config(sources, ReportFormat::Plain);

        let result = run(&config, &fetcher, &summarizer, &deliverer, date()).await;

        assert!(matches!(result, Err(DeliveryError::Transport(_))));
        assert_eq!(exit_status(&result), EXIT_DELIVERY_FAILED);
        assert_ne!(exit_status(&result), EXIT_OK);
    }

    #[tokio::test]
    async fn test_summary_order_follows_completion() {
        let sources = vec![source("Cat1", "A"), source("Cat2", "B")];
        let fetcher = StubFetcher::new()
            .with(&sources[0], StubFeed::Entries(entries("a", 1)))
            .with(&sources[1], StubFeed::Entries(entries("b", 1)));
        let generator = StubGenerator::replying("[[B - Cat2]]\nsecond first\n[[A - Cat1]]\nfirst second");
        let summarizer = Summarizer::new(&generator, "");
        let deliverer = StubDeliverer::accepting();
        let config = config(sources, ReportFormat::Plain);

        let outcome = run(&config, &fetcher, &summarizer, &deliverer, date())
            .await
            .unwrap();

        let body = &outcome.report.body;
        assert!(body.find("[B - Cat2]").unwrap() < body.find("[A - Cat1]").unwrap());
        assert!(body.find("### Cat1").unwrap() < body.find("### Cat2").unwrap());
    }

    #[tokio::test]
    async fn test_every_source_failing_still_delivers() {
        let sources = vec![source("Politics", "X"), source("Sports", "Y")];
        let fetcher = StubFetcher::new();
        let generator = StubGenerator::replying("unused");
        let summarizer = Summarizer::new(&generator, "");
        let deliverer = StubDeliverer::accepting();
        let config = config(sources.clone(), ReportFormat::Plain);

        let outcome = run(&config, &fetcher, &summarizer, &deliverer, date())
            .await
            .unwrap();

        assert_eq!(outcome.articles, 0);
        assert_eq!(outcome.failed_sources, sources.len());
        assert_eq!(fetcher.calls(), 2);
        for heading in ["### Politics", "### Sports"] {
            assert!(outcome.report.body.contains(heading));
        }
    }
}
