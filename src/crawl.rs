use std::time::Duration;

use anyhow::Context as _;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use url::Url;

use crate::extract::ChapterParser;
use crate::formats::Chapter;

const USER_AGENT_VALUE: &str = concat!("worm-scraper/", env!("CARGO_PKG_VERSION"));

/// Where pages come from. The production source is HTTP; tests script it.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self, url: &Url) -> anyhow::Result<String>;
}

#[derive(Debug, Clone)]
pub struct HttpPageSource {
    client: reqwest::Client,
}

impl HttpPageSource {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .context("build http client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch(&self, url: &Url) -> anyhow::Result<String> {
        let response = self
            .client
            .get(url.clone())
            .header(USER_AGENT, USER_AGENT_VALUE)
            .header(ACCEPT, "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8")
            .send()
            .await
            .with_context(|| format!("GET {url}"))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("GET {url}: unexpected status {status}");
        }

        response
            .text()
            .await
            .with_context(|| format!("read body: {url}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt.
    pub max_retries: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay: Duration::from_millis(250),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("chapter url '{url}' failed {retries} times (last error: {last_error})")]
pub struct RetriesExhausted {
    pub url: String,
    /// Always greater than the policy's `max_retries`.
    pub retries: u32,
    pub last_error: String,
}

/// Gives scheme-less links an `https://` prefix.
pub fn normalize_chapter_url(url: &str) -> String {
    if url.starts_with("http") {
        url.to_owned()
    } else {
        format!("https://{url}")
    }
}

pub async fn fetch_contents(source: &dyn PageSource, contents_url: &Url) -> anyhow::Result<String> {
    source
        .fetch(contents_url)
        .await
        .with_context(|| format!("fetch table of contents: {contents_url}"))
}

/// Fetches and parses one chapter, retrying failed fetches in place.
///
/// The chapter is taken by value and handed back populated, so no other task
/// can observe it half-written.
pub async fn fetch_chapter(
    source: &dyn PageSource,
    parser: &ChapterParser,
    mut chapter: Chapter,
    policy: RetryPolicy,
) -> Result<Chapter, RetriesExhausted> {
    chapter.url = normalize_chapter_url(&chapter.url);

    let html = loop {
        match fetch_page(source, &chapter.url).await {
            Ok(html) => break html,
            Err(err) => {
                chapter.retries += 1;
                let last_error = format!("{err:#}");
                if chapter.retries > policy.max_retries {
                    return Err(RetriesExhausted {
                        url: chapter.url,
                        retries: chapter.retries,
                        last_error,
                    });
                }
                tracing::debug!(
                    url = %chapter.url,
                    retries = chapter.retries,
                    error = %last_error,
                    "chapter fetch failed; retrying"
                );
                if !policy.delay.is_zero() {
                    tokio::time::sleep(policy.delay).await;
                }
            }
        }
    };

    parser.parse(&html).populate(&mut chapter);
    Ok(chapter)
}

async fn fetch_page(source: &dyn PageSource, url: &str) -> anyhow::Result<String> {
    let url = Url::parse(url).with_context(|| format!("parse chapter url: {url}"))?;
    source.fetch(&url).await
}
