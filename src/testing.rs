//! Stub capabilities shared by the unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use url::Url;

use crate::api::TextGenerator;
use crate::error::{DeliveryError, FetchError, GenerateError};
use crate::feeds::FeedFetcher;
use crate::models::{FeedEntry, FeedSource};
use crate::notifier::{Deliverer, OutgoingMail};

pub fn source(category: &str, name: &str) -> FeedSource {
    let url = format!("https://{}.example.com/rss", name.to_lowercase());
    FeedSource::new(category, name, Url::parse(&url).unwrap())
}

/// `count` entries titled `"{prefix} 1"`, `"{prefix} 2"`, ...
pub fn entries(prefix: &str, count: usize) -> Vec<FeedEntry> {
    (1..=count)
        .map(|i| {
            FeedEntry::new(
                &format!("{prefix} {i}"),
                &format!("https://news.example.com/{prefix}/{i}"),
            )
        })
        .collect()
}

pub enum StubFeed {
    Entries(Vec<FeedEntry>),
    Error(String),
    Slow(Duration, Vec<FeedEntry>),
}

/// Answers by endpoint; unknown endpoints fail.
pub struct StubFetcher {
    feeds: HashMap<String, StubFeed>,
    calls: AtomicUsize,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self {
            feeds: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with(mut self, source: &FeedSource, feed: StubFeed) -> Self {
        self.feeds.insert(source.endpoint.to_string(), feed);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl FeedFetcher for StubFetcher {
    async fn fetch(&self, endpoint: &Url) -> Result<Vec<FeedEntry>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.feeds.get(endpoint.as_str()) {
            Some(StubFeed::Entries(entries)) => Ok(entries.clone()),
            Some(StubFeed::Error(message)) => Err(FetchError::Unavailable(message.clone())),
            Some(StubFeed::Slow(delay, entries)) => {
                tokio::time::sleep(*delay).await;
                Ok(entries.clone())
            }
            None => Err(FetchError::Unavailable(format!("no stub for {endpoint}"))),
        }
    }
}

/// Replays queued responses; repeats the last one once the queue is drained.
#[derive(Debug)]
pub struct StubGenerator {
    responses: Mutex<VecDeque<Result<String, String>>>,
    prompts: Mutex<Vec<String>>,
}

impl StubGenerator {
    pub fn replying(text: &str) -> Self {
        Self::sequence(vec![Ok(text.to_string())])
    }

    pub fn failing(message: &str) -> Self {
        Self::sequence(vec![Err(message.to_string())])
    }

    pub fn sequence(responses: Vec<Result<String, String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl TextGenerator for StubGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let mut responses = self.responses.lock().unwrap();
        let next = if responses.len() > 1 {
            responses.pop_front()
        } else {
            responses.front().cloned()
        };
        match next {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(GenerateError::Unavailable(message)),
            None => Err(GenerateError::Unavailable("no stub response".to_string())),
        }
    }
}

/// Records every message; optionally rejects them all.
pub struct StubDeliverer {
    reject_with: Option<String>,
    sent: Mutex<Vec<OutgoingMail>>,
}

impl StubDeliverer {
    pub fn accepting() -> Self {
        Self {
            reject_with: None,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn rejecting(message: &str) -> Self {
        Self {
            reject_with: Some(message.to_string()),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().unwrap().clone()
    }
}

impl Deliverer for StubDeliverer {
    async fn deliver(&self, mail: &OutgoingMail) -> Result<(), DeliveryError> {
        if let Some(message) = &self.reject_with {
            return Err(DeliveryError::Transport(message.clone()));
        }
        self.sent.lock().unwrap().push(mail.clone());
        Ok(())
    }
}
