use crate::config::USER_AGENT;
use anyhow::{bail, Context, Result};
use std::time::Duration;

/// Builds the HTTP client shared by every faction task.
///
/// No timeout is set unless one is given; a hung fetch then hangs its task.
pub fn build_client(timeout: Option<Duration>) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().context("Failed to create HTTP client")
}

/// GET `url` and return the response body.
pub async fn fetch_document(client: &reqwest::Client, url: &str) -> Result<String> {
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("HTTP request failed: {}", url))?;

    let status = response.status();
    if !status.is_success() {
        bail!("HTTP {} for {}", status, url);
    }

    response
        .text()
        .await
        .context("Failed to read response body")
}
