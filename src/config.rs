//! Startup configuration.
//!
//! [`Config::from_cli`] turns the parsed [`Cli`] into validated values that
//! are handed to each stage explicitly. Every check happens here, before any
//! network activity; a failure is a [`ConfigError`] and aborts the run.

use std::fmt;
use std::time::Duration;

use lettre::message::Mailbox;
use tracing::info;

use crate::cli::Cli;
use crate::error::ConfigError;
use crate::feeds::CollectorOptions;
use crate::feeds::registry;
use crate::models::{FeedSource, ReportFormat};
use crate::notifier::parse_mailbox;

/// Settings for the summarization endpoint.
#[derive(Clone)]
pub struct LlmConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub max_retries: usize,
    pub timeout: Duration,
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"***")
            .field("model", &self.model)
            .field("max_retries", &self.max_retries)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Settings for SMTP delivery.
#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: Mailbox,
}

impl fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub sources: Vec<FeedSource>,
    pub collector: CollectorOptions,
    pub llm: LlmConfig,
    /// `None` in dry-run mode.
    pub smtp: Option<SmtpConfig>,
    pub recipient: String,
    pub format: ReportFormat,
    pub subject_prefix: String,
    pub summary_language: String,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        let api_key = required(cli.openai_api_key, "OPENAI_API_KEY")?;

        let (smtp, recipient) = if cli.dry_run {
            let recipient = cli
                .email_to
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| "(dry run)".to_string());
            (None, recipient)
        } else {
            let username = required(cli.email_user, "EMAIL_USER")?;
            let password = required(cli.email_pass, "EMAIL_PASS")?;
            let recipient = required(cli.email_to, "EMAIL_TO")?;

            let from = parse_mailbox(&username)
                .map_err(|e| ConfigError::invalid("EMAIL_USER", e.to_string()))?;
            parse_mailbox(&recipient).map_err(|e| ConfigError::invalid("EMAIL_TO", e.to_string()))?;
            if cli.smtp_host.trim().is_empty() {
                return Err(ConfigError::Missing("SMTP_HOST"));
            }

            let smtp = SmtpConfig {
                host: cli.smtp_host.trim().to_string(),
                port: cli.smtp_port,
                username,
                password,
                from,
            };
            (Some(smtp), recipient)
        };

        if cli.per_source_limit == 0 {
            return Err(ConfigError::invalid("PER_SOURCE_LIMIT", "must be at least 1"));
        }
        if cli.feed_timeout_secs == 0 {
            return Err(ConfigError::invalid("FEED_TIMEOUT_SECS", "must be at least 1"));
        }
        if cli.fetch_concurrency == 0 {
            return Err(ConfigError::invalid("FETCH_CONCURRENCY", "must be at least 1"));
        }
        if cli.run_timeout_secs == Some(0) {
            return Err(ConfigError::invalid("RUN_TIMEOUT_SECS", "must be at least 1"));
        }
        url::Url::parse(&cli.openai_base_url)
            .map_err(|e| ConfigError::invalid("OPENAI_BASE_URL", e.to_string()))?;

        let sources = match &cli.sources {
            Some(path) => registry::load_sources(path)?,
            None => registry::default_sources()?,
        };

        let config = Self {
            sources,
            collector: CollectorOptions {
                per_source_limit: cli.per_source_limit,
                per_source_timeout: Duration::from_secs(cli.feed_timeout_secs),
                concurrency: cli.fetch_concurrency,
                run_timeout: cli.run_timeout_secs.map(Duration::from_secs),
            },
            llm: LlmConfig {
                base_url: cli.openai_base_url,
                api_key,
                model: cli.openai_model,
                max_retries: cli.llm_max_retries,
                timeout: Duration::from_secs(120),
            },
            smtp,
            recipient,
            format: cli.format,
            subject_prefix: cli.subject_prefix,
            summary_language: cli.summary_language,
        };

        info!(
            sources = config.sources.len(),
            per_source_limit = config.collector.per_source_limit,
            format = ?config.format,
            dry_run = config.smtp.is_none(),
            "Configuration loaded"
        );
        Ok(config)
    }
}

/// A present, non-blank value, trimmed.
fn required(value: Option<String>, name: &'static str) -> Result<String, ConfigError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(name))
}
