//! # News Digest
//!
//! Collects the latest headlines from a registry of categorized news feeds,
//! asks an OpenAI-compatible LLM for a per-source summary, and emails a
//! single report containing the summary followed by every collected headline.
//!
//! ## Usage
//!
//! ```sh
//! OPENAI_API_KEY=... EMAIL_USER=bot@example.com EMAIL_PASS=... EMAIL_TO=me@example.com news_digest
//! news_digest --sources ./sources.yaml --format html --dry-run
//! ```
//!
//! ## Architecture
//!
//! The run is a straight pipeline, each stage executed once:
//! 1. **Collect**: fetch every registered feed (bounded concurrency, per-source timeout)
//! 2. **Prompt**: serialize the headlines into `[[Source - Category]]` blocks
//! 3. **Summarize**: one LLM call with retry; failures become a warning, not an error
//! 4. **Render**: plain-text or HTML report, summary section then raw headlines
//! 5. **Notify**: one SMTP message (or stdout with `--dry-run`)
//!
//! ## Exit status
//!
//! - `0`: report delivered, even if some feeds or the summary failed
//! - `1`: the report could not be delivered
//! - `2`: configuration error, nothing was fetched

use std::process::ExitCode;
use std::time::Duration;

use chrono::Local;
use clap::Parser;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod config;
mod error;
mod feeds;
mod models;
mod notifier;
mod outputs;
mod pipeline;
mod prompt;
mod summarizer;
#[cfg(test)]
mod testing;
mod utils;

use api::{OpenAiClient, RetryGenerate};
use cli::Cli;
use config::Config;
use feeds::http::HttpFeedFetcher;
use notifier::{SmtpDeliverer, StdoutDeliverer};
use pipeline::{EXIT_CONFIG_ERROR, EXIT_DELIVERY_FAILED};
use summarizer::Summarizer;

#[tokio::main]
async fn main() -> ExitCode {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let start_time = std::time::Instant::now();
    info!(version = env!("CARGO_PKG_VERSION"), "news_digest starting up");

    let args = Cli::parse();
    debug!(sources = ?args.sources, format = ?args.format, dry_run = args.dry_run, "Parsed CLI arguments");

    // ---- Configuration: fatal before any network activity ----
    let config = match Config::from_cli(args) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Configuration error; aborting before fetching");
            eprintln!("configuration error: {e}");
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    let run_date = Local::now().date_naive();

    // ---- Capabilities ----
    let fetcher = match HttpFeedFetcher::new(config.collector.per_source_timeout) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            error!(error = %e, "Failed to build feed HTTP client");
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };
    let client = match OpenAiClient::new(
        &config.llm.base_url,
        &config.llm.api_key,
        &config.llm.model,
        config.llm.timeout,
    ) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Failed to build LLM HTTP client");
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };
    let generator = RetryGenerate::new(client, config.llm.max_retries, Duration::from_secs(1));
    let summarizer = Summarizer::new(
        generator,
        prompt::preamble(run_date, &config.summary_language),
    );

    // ---- Run ----
    let result = match &config.smtp {
        Some(smtp) => {
            let deliverer = match SmtpDeliverer::new(
                &smtp.host,
                smtp.port,
                &smtp.username,
                &smtp.password,
                smtp.from.clone(),
            ) {
                Ok(deliverer) => deliverer,
                Err(e) => {
                    error!(error = %e, "Failed to set up SMTP transport");
                    eprintln!("delivery failed: {e}");
                    return ExitCode::from(EXIT_DELIVERY_FAILED);
                }
            };
            pipeline::run(&config, &fetcher, &summarizer, &deliverer, run_date).await
        }
        None => pipeline::run(&config, &fetcher, &summarizer, &StdoutDeliverer, run_date).await,
    };

    let status = pipeline::exit_status(&result);
    let elapsed = start_time.elapsed();
    match result {
        Ok(outcome) => {
            info!(
                ?elapsed,
                articles = outcome.articles,
                failed_sources = outcome.failed_sources,
                summarized = outcome.summarized,
                "Execution complete"
            );
            // In dry-run the report itself is on stdout; keep the confirmation off it.
            if config.smtp.is_some() {
                println!("{}", pipeline::confirmation(&config));
            } else {
                eprintln!("{}", pipeline::confirmation(&config));
            }
        }
        Err(e) => {
            error!(?elapsed, error = %e, "Execution failed: report not delivered");
            eprintln!("delivery failed: {e}");
        }
    }
    ExitCode::from(status)
}
