//! Summarizer adapter.
//!
//! Wraps a [`TextGenerator`] so that every outcome, including an empty
//! prompt, a transport error, or a blank completion, comes back as a
//! [`SummaryResult`]. Nothing escapes as an error.
//!
//! The labeled-block structure of a successful completion is not checked
//! here; the renderer parses it on a best-effort basis.

use tracing::{info, instrument, warn};

use crate::api::TextGenerator;
use crate::models::SummaryResult;
use crate::utils::truncate_for_log;

pub const NO_ARTICLES: &str = "no articles collected";
pub const EMPTY_RESPONSE: &str = "empty response";

#[derive(Debug)]
pub struct Summarizer<G> {
    generator: G,
    preamble: String,
}

impl<G: TextGenerator> Summarizer<G> {
    /// `preamble` is prepended to every non-empty prompt.
    pub fn new(generator: G, preamble: impl Into<String>) -> Self {
        Self {
            generator,
            preamble: preamble.into(),
        }
    }

    /// Ask the generator for a summary of `prompt_text`.
    ///
    /// # Arguments
    ///
    /// * `prompt_text` - Output of [`crate::prompt::build`]
    ///
    /// # Returns
    ///
    /// - `Failure("no articles collected")` for an empty prompt, without
    ///   calling the generator
    /// - `Failure("empty response")` when the completion is blank
    /// - `Failure(<error>)` when the generator fails after its retries
    /// - `Success(<trimmed completion>)` otherwise
    #[instrument(level = "info", skip_all, fields(prompt_bytes = prompt_text.len()))]
    pub async fn summarize(&self, prompt_text: &str) -> SummaryResult {
        if prompt_text.is_empty() {
            warn!("No articles collected; skipping summarization");
            return SummaryResult::failure(NO_ARTICLES);
        }

        let request = if self.preamble.is_empty() {
            prompt_text.to_string()
        } else {
            format!("{}\n\n{}", self.preamble, prompt_text)
        };

        match self.generator.generate(&request).await {
            Ok(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    warn!("Summarizer returned an empty response");
                    return SummaryResult::failure(EMPTY_RESPONSE);
                }
                info!(
                    bytes = trimmed.len(),
                    preview = %truncate_for_log(trimmed, 120),
                    "Summary received"
                );
                SummaryResult::Success {
                    text: trimmed.to_string(),
                }
            }
            Err(e) => {
                warn!(error = %e, "Summarization failed");
                SummaryResult::failure(e.to_string())
            }
        }
    }
}
