//! HTTP side of the challenge contract.
//!
//! Fetches a page, and when the site answers with the `acw_sc__v2`
//! interstitial, stores the computed cookie for the page's origin and asks
//! again. Extraction itself stays in [`crate::params`].

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use reqwest::cookie::Jar;
use reqwest::{Client, Url, header};
use tracing::{debug, warn};

use crate::challenge::{self, ACW_COOKIE_NAME};
use crate::comments::strip_comments_str;
use crate::config::ClientConfig;
use crate::params::{ExtractedParams, extract_params};

pub struct LanzouClient {
    http_client: Client,
    cookies: Arc<Jar>,
    config: ClientConfig,
}

impl LanzouClient {
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let cookies = Arc::new(Jar::default());
        let http_client = Client::builder()
            .cookie_provider(cookies.clone())
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .gzip(true)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http_client,
            cookies,
            config,
        })
    }

    /// Fetch `url`, solving the interstitial up to `max_challenge_retries` times.
    pub async fn fetch_page(&self, url: &str) -> Result<String> {
        let parsed = Url::parse(url).with_context(|| format!("Invalid URL: {}", url))?;
        let mut html = self.get(&parsed).await?;

        for attempt in 1..=self.config.max_challenge_retries {
            let Some(token) = challenge::detect(&html) else {
                return Ok(html);
            };
            let solution = token
                .solve()
                .with_context(|| format!("Failed to solve challenge for {}", url))?;
            debug!(attempt, url, "challenge page, retrying with {}", ACW_COOKIE_NAME);

            self.cookies.add_cookie_str(
                &format!("{}={}; Path=/", ACW_COOKIE_NAME, solution),
                &parsed,
            );
            html = self.get(&parsed).await?;
        }

        if challenge::detect(&html).is_some() {
            warn!(url, retries = self.config.max_challenge_retries, "challenge persisted");
            bail!(
                "Still served a challenge page after {} retries: {}",
                self.config.max_challenge_retries,
                url
            );
        }
        Ok(html)
    }

    /// Fetch `url` and extract its request parameters from the comment-free markup.
    pub async fn fetch_params(&self, url: &str) -> Result<ExtractedParams> {
        let html = self.fetch_page(url).await?;
        let params = extract_params(&strip_comments_str(&html))
            .with_context(|| format!("Failed to extract parameters from {}", url))?;
        Ok(params)
    }

    async fn get(&self, url: &Url) -> Result<String> {
        let mut request = self.http_client.get(url.clone());
        if let Some(ref referer) = self.config.referer {
            request = request.header(header::REFERER, referer);
        }

        let body = request
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", url))?
            .text()
            .await
            .with_context(|| format!("Failed to read body of {}", url))?;

        debug!(%url, bytes = body.len(), "page fetched");
        Ok(body)
    }
}
