//! HTTP implementation of the fetch capability.
//!
//! Downloads a feed with `reqwest` and hands the bytes to `feed-rs`, which
//! understands RSS 0.9x/1.0/2.0, Atom and JSON Feed. Only the fields the
//! pipeline needs (title and first link) are kept.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use super::FeedFetcher;
use crate::error::FetchError;
use crate::models::FeedEntry;

/// Fetches feeds over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpFeedFetcher {
    client: Client,
}

impl HttpFeedFetcher {
    /// Build a fetcher whose requests give up after `timeout`.
    ///
    /// The collector applies its own deadline as well; this one bounds the
    /// connection and body read at the transport level.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(concat!("news_digest/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl FeedFetcher for HttpFeedFetcher {
    #[instrument(level = "debug", skip_all, fields(endpoint = %endpoint))]
    async fn fetch(&self, endpoint: &Url) -> Result<Vec<FeedEntry>, FetchError> {
        let response = self.client.get(endpoint.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        debug!(bytes = body.len(), "Downloaded feed");
        parse_entries(&body)
    }
}

/// Parse a feed document into entries, preserving document order.
pub fn parse_entries(body: &[u8]) -> Result<Vec<FeedEntry>, FetchError> {
    let feed = feed_rs::parser::parse(body).map_err(|e| FetchError::Parse(e.to_string()))?;

    let entries = feed
        .entries
        .into_iter()
        .map(|entry| FeedEntry {
            title: entry.title.map(|t| t.content),
            link: entry.links.into_iter().next().map(|l| l.href),
        })
        .collect();
    Ok(entries)
}
