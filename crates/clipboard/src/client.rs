//! Origin validation, fetch and pipeline drive.

use crate::config::ClipboardConfig;
use ppt_core::{Error, ProcessedPresentation, Result};
use ppt_pptx::{ParseOptions, PowerPointProcessor};
use reqwest::Client;
use url::Url;

pub struct ClipboardClient {
    config: ClipboardConfig,
    http: Client,
    processor: PowerPointProcessor,
}

impl ClipboardClient {
    pub fn new(config: ClipboardConfig) -> Result<Self> {
        Self::with_options(config, ParseOptions::default())
    }

    pub fn with_options(config: ClipboardConfig, options: ParseOptions) -> Result<Self> {
        let http = Client::builder()
            .user_agent(config.user_agent.as_str())
            .gzip(true)
            .build()
            .map_err(|e| Error::UpstreamFetch(format!("could not build HTTP client: {}", e)))?;
        Ok(Self {
            config,
            http,
            processor: PowerPointProcessor::new(options),
        })
    }

    pub fn config(&self) -> &ClipboardConfig {
        &self.config
    }

    /// Parse `raw` and check it against the scheme rule and host allow-list.
    pub fn validate_url(&self, raw: &str) -> Result<Url> {
        let url = Url::parse(raw.trim()).map_err(|e| Error::InputValidation(format!("malformed URL '{}': {}", raw, e)))?;

        match url.scheme() {
            "https" => {}
            "http" if !self.config.require_https => {}
            other => {
                return Err(Error::InputValidation(format!("scheme '{}' is not allowed", other)));
            }
        }

        let host = url
            .host_str()
            .ok_or_else(|| Error::InputValidation(format!("URL '{}' has no host", raw)))?;
        if !self.config.is_host_allowed(host) {
            return Err(Error::InputValidation(format!("host '{}' is not an allowed clipboard origin", host)));
        }
        Ok(url)
    }

    /// Download the fragment. One attempt; any transport failure or non-2xx
    /// status is an [`Error::UpstreamFetch`].
    pub async fn fetch(&self, url: &Url) -> Result<Vec<u8>> {
        log::debug!("Fetching clipboard data from {}", url.host_str().unwrap_or_default());
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Error::UpstreamFetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::UpstreamFetch(format!("clipboard service answered {}", status)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::UpstreamFetch(format!("reading response body: {}", e)))?;
        log::debug!("Fetched {} bytes of clipboard data", bytes.len());
        Ok(bytes.to_vec())
    }

    /// Validate, fetch and parse a clipboard URL.
    pub async fn process_url(&self, raw: &str) -> Result<ProcessedPresentation> {
        let url = self.validate_url(raw)?;
        let bytes = self.fetch(&url).await?;
        self.process_bytes(&bytes)
    }

    /// Parse an already fetched fragment.
    pub fn process_bytes(&self, bytes: &[u8]) -> Result<ProcessedPresentation> {
        self.processor.process(bytes)
    }
}
