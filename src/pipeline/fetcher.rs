//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the pipeline, including:
//! - Building the HTTP client
//! - Per-attempt browser headers with a rotated identity
//! - Linear backoff with jitter between attempts
//! - Handing successful responses to the extractor
//!
//! Failures never escape this module. A page that cannot be fetched or yields
//! no listings after every attempt comes back as an empty record list.

use crate::config::Config;
use crate::identity::IdentityPool;
use crate::listing::ListingRecord;
use crate::pacing::{secs_to_duration, Clock, RandomSource};
use crate::pipeline::extractor::ListingExtractor;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT_ENCODING, ACCEPT_LANGUAGE, DNT, REFERER,
    USER_AGENT,
};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

/// Encodings advertised with every request
const ACCEPT_ENCODING_VALUE: &str = "gzip, deflate, br";

/// Retry and timeout settings for one page
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub jitter_min_secs: f64,
    pub jitter_max_secs: f64,
    pub timeout: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        let scraper = &config.scraper;
        Self {
            max_attempts: scraper.max_attempts.max(1),
            base_delay: scraper.base_delay(),
            jitter_min_secs: scraper.jitter_min_secs,
            jitter_max_secs: scraper.jitter_max_secs,
            timeout: scraper.request_timeout(),
        }
    }

    /// Backoff before jitter: `base_delay * attempt`
    pub fn base_wait(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }

    /// Full wait after a failed `attempt`, jitter included
    pub fn wait_before_retry<R: RandomSource>(&self, attempt: u32, random: &R) -> Duration {
        let jitter = random.uniform(self.jitter_min_secs, self.jitter_max_secs);
        self.base_wait(attempt).saturating_add(secs_to_duration(jitter))
    }

    /// Upper bound on the total time spent on one page
    pub fn worst_case(&self) -> Duration {
        let jitter_ceiling = secs_to_duration(self.jitter_max_secs);
        (1..=self.max_attempts).fold(Duration::ZERO, |total, attempt| {
            let wait = if attempt < self.max_attempts {
                self.base_wait(attempt).saturating_add(jitter_ceiling)
            } else {
                Duration::ZERO
            };
            total.saturating_add(self.timeout).saturating_add(wait)
        })
    }
}

/// One attempt at fetching a page, kept for logging
#[derive(Debug, Clone, PartialEq)]
pub struct FetchAttempt {
    /// 1-based attempt index
    pub attempt: u32,
    /// User-agent presented on this attempt
    pub identity: String,
    /// Wait scheduled before the next attempt, if any
    pub wait: Option<Duration>,
}

/// Result of a single request
#[derive(Debug)]
enum AttemptOutcome {
    /// Page fetched and at least one listing extracted
    Listings(Vec<ListingRecord>),
    /// Page fetched but nothing extracted
    NoListings,
    /// Non-success HTTP status
    Status(StatusCode),
    /// Connection, timeout, DNS or body read failure
    Transport(reqwest::Error),
}

impl AttemptOutcome {
    fn describe(&self) -> String {
        match self {
            Self::Listings(records) => format!("{} listings", records.len()),
            Self::NoListings => "no listings extracted".to_string(),
            Self::Status(status) => format!("HTTP {}", status),
            Self::Transport(e) if e.is_timeout() => "request timeout".to_string(),
            Self::Transport(e) if e.is_connect() => "connection failed".to_string(),
            Self::Transport(e) => e.to_string(),
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// The user agent is not set here; it is rotated per request.
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .deflate(true)
        .build()
}

/// Fetches search pages and extracts their listings
pub struct PageFetcher<C, R> {
    client: Client,
    policy: RetryPolicy,
    identities: IdentityPool,
    referer: String,
    accept_language: String,
    extractor: ListingExtractor,
    clock: C,
    random: R,
}

impl<C: Clock, R: RandomSource> PageFetcher<C, R> {
    pub fn new(client: Client, config: &Config, clock: C, random: R) -> Self {
        let identities = IdentityPool::new(config.identity.user_agents.iter().cloned());
        tracing::debug!("Rotating among {} identities", identities.len());

        Self {
            client,
            policy: RetryPolicy::from_config(config),
            identities,
            referer: config.scraper.referer.clone(),
            accept_language: config.scraper.accept_language.clone(),
            extractor: ListingExtractor::new(),
            clock,
            random,
        }
    }

    /// Fetches one page with retries and returns its listings
    ///
    /// # Retry Logic
    ///
    /// | Condition                 | Action                         |
    /// |---------------------------|--------------------------------|
    /// | 2xx with listings         | Return them immediately        |
    /// | 2xx with no listings      | Retry                          |
    /// | Non-2xx status            | Retry                          |
    /// | Timeout / connect failure | Retry                          |
    /// | Attempts exhausted        | Return an empty list           |
    ///
    /// Attempt `n` that fails waits `base_delay * n + uniform(jitter)` before the
    /// next attempt. No wait follows the last attempt.
    pub async fn fetch_listings(&self, url: &Url) -> Vec<ListingRecord> {
        let max_attempts = self.policy.max_attempts;

        for attempt in 1..=max_attempts {
            let identity = self.identities.rotate(&self.random).to_string();
            tracing::debug!("Attempt {}/{} for {}", attempt, max_attempts, url);

            let outcome = match self.attempt(url, &identity).await {
                AttemptOutcome::Listings(records) => {
                    tracing::info!("Scraped {} items from {}", records.len(), url);
                    return records;
                }
                failed => failed,
            };

            let wait = (attempt < max_attempts)
                .then(|| self.policy.wait_before_retry(attempt, &self.random));
            let record = FetchAttempt {
                attempt,
                identity,
                wait,
            };

            tracing::warn!(
                attempt = record.attempt,
                max_attempts,
                identity = %record.identity,
                "Attempt failed for {}: {}",
                url,
                outcome.describe()
            );

            if let Some(wait) = record.wait {
                tracing::info!(
                    "Waiting for {:.2} seconds before retrying...",
                    wait.as_secs_f64()
                );
                self.clock.sleep(wait).await;
            }
        }

        tracing::error!(
            "Max retries reached for {}. Unable to scrape data.",
            url
        );
        Vec::new()
    }

    /// Issues one GET and extracts listings from a successful response
    async fn attempt(&self, url: &Url, identity: &str) -> AttemptOutcome {
        let request = self
            .client
            .get(url.clone())
            .headers(self.request_headers(identity))
            .timeout(self.policy.timeout);

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return AttemptOutcome::Transport(e),
        };

        let status = response.status();
        if !status.is_success() {
            return AttemptOutcome::Status(status);
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return AttemptOutcome::Transport(e),
        };

        let records = self.extractor.extract(&body);
        if records.is_empty() {
            AttemptOutcome::NoListings
        } else {
            AttemptOutcome::Listings(records)
        }
    }

    /// Builds the browser-like header set for one attempt
    fn request_headers(&self, identity: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        insert_header(&mut headers, USER_AGENT, identity);
        insert_header(&mut headers, ACCEPT_LANGUAGE, &self.accept_language);
        insert_header(&mut headers, ACCEPT_ENCODING, ACCEPT_ENCODING_VALUE);
        insert_header(&mut headers, REFERER, &self.referer);
        insert_header(&mut headers, DNT, "1");
        headers
    }
}

/// Inserts a header, skipping values that are not valid header text
fn insert_header(headers: &mut HeaderMap, name: HeaderName, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(value) => {
            headers.insert(name, value);
        }
        Err(_) => tracing::warn!("Skipping invalid {} header value", name),
    }
}
