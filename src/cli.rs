//! Command-line interface definitions.
//!
//! Every option can also be supplied through the environment variable named
//! next to it, which is how the scheduler invoking the digest usually
//! configures it. Presence of required values is checked later by
//! [`crate::config::Config::from_cli`], so that a missing credential is
//! reported as a configuration error rather than a usage error.

use std::path::PathBuf;

use clap::Parser;

use crate::models::ReportFormat;

/// Command-line arguments for the news digest.
///
/// # Examples
///
/// ```sh
/// # Everything from the environment
/// OPENAI_API_KEY=... EMAIL_USER=... EMAIL_PASS=... EMAIL_TO=... news_digest
///
/// # HTML report from a custom source list, printed instead of sent
/// news_digest --sources ./sources.yaml --format html --dry-run
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// API key for the OpenAI-compatible summarization endpoint
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Chat model used for the summary
    #[arg(long, env = "OPENAI_MODEL", default_value = "gpt-4o-mini")]
    pub openai_model: String,

    /// Base URL of the OpenAI-compatible API
    #[arg(long, env = "OPENAI_BASE_URL", default_value = "https://api.openai.com/v1")]
    pub openai_base_url: String,

    /// Sender address, also used as the SMTP login
    #[arg(long, env = "EMAIL_USER")]
    pub email_user: Option<String>,

    /// SMTP password
    #[arg(long, env = "EMAIL_PASS", hide_env_values = true)]
    pub email_pass: Option<String>,

    /// Recipient address
    #[arg(long, env = "EMAIL_TO")]
    pub email_to: Option<String>,

    /// SMTP server host
    #[arg(long, env = "SMTP_HOST", default_value = "smtp.gmail.com")]
    pub smtp_host: String,

    /// SMTP server port (465 = implicit TLS, otherwise STARTTLS)
    #[arg(long, env = "SMTP_PORT", default_value_t = 465)]
    pub smtp_port: u16,

    /// YAML file listing the feed sources (built-in list if omitted)
    #[arg(short, long, env = "NEWS_SOURCES")]
    pub sources: Option<PathBuf>,

    /// Maximum number of headlines taken from each source
    #[arg(short = 'n', long, env = "PER_SOURCE_LIMIT", default_value_t = 3)]
    pub per_source_limit: usize,

    /// Per-source fetch timeout in seconds
    #[arg(long, env = "FEED_TIMEOUT_SECS", default_value_t = 10)]
    pub feed_timeout_secs: u64,

    /// Number of feeds fetched concurrently
    #[arg(long, env = "FETCH_CONCURRENCY", default_value_t = 4)]
    pub fetch_concurrency: usize,

    /// Optional deadline in seconds for the whole collection stage
    #[arg(long, env = "RUN_TIMEOUT_SECS")]
    pub run_timeout_secs: Option<u64>,

    /// Report format
    #[arg(short, long, env = "REPORT_FORMAT", value_enum, default_value_t = ReportFormat::Plain)]
    pub format: ReportFormat,

    /// Subject prefix; the run date is appended
    #[arg(long, env = "SUBJECT_PREFIX", default_value = "🗞 오늘의 뉴스 요약 ")]
    pub subject_prefix: String,

    /// Language the summary should be written in
    #[arg(long, env = "SUMMARY_LANGUAGE", default_value = "Korean")]
    pub summary_language: String,

    /// Retries for the summarization call after the first attempt
    #[arg(long, env = "LLM_MAX_RETRIES", default_value_t = 2)]
    pub llm_max_retries: usize,

    /// Print the report instead of sending it
    #[arg(long)]
    pub dry_run: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["news_digest"]);

        assert_eq!(cli.per_source_limit, 3);
        assert_eq!(cli.smtp_port, 465);
        assert_eq!(cli.format, ReportFormat::Plain);
        assert_eq!(cli.openai_model, "gpt-4o-mini");
        assert!(!cli.dry_run);
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from([
            "news_digest",
            "-s",
            "/tmp/sources.yaml",
            "-n",
            "5",
            "-f",
            "html",
            "--dry-run",
        ]);

        assert_eq!(cli.sources, Some(PathBuf::from("/tmp/sources.yaml")));
        assert_eq!(cli.per_source_limit, 5);
        assert_eq!(cli.format, ReportFormat::Html);
        assert!(cli.dry_run);
    }
}
