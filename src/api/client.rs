use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;

/// An authorized HTTP client shared by the Drive, Slides and Storage calls.
#[derive(Clone)]
pub struct GoogleClient {
    pub token: String,
    pub http: Client,
}

impl GoogleClient {
    pub fn new(access_token: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            token: access_token.to_string(),
            http,
        })
    }
}
