use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::Client;

use super::Artifact;
use crate::config::Config;

pub struct ModuleClient {
    client: Client,
}

impl ModuleClient {
    pub fn from_config(cfg: &Config) -> Result<Self> {
        let use_proxy = cfg.get("USE_PROXY").map_or(true, |v| !v.eq_ignore_ascii_case("false"));
        Self::new(Duration::from_secs(cfg.request_timeout_secs()), use_proxy)
    }

    /// `use_proxy = false` ignores `HTTP_PROXY`/`HTTPS_PROXY` from the environment.
    pub fn new(timeout: Duration, use_proxy: bool) -> Result<Self> {
        let mut builder = Client::builder().timeout(timeout);
        if !use_proxy {
            builder = builder.no_proxy();
        }
        Ok(Self { client: builder.build()? })
    }

    /// GET `url`, failing on any non-success status or an empty body.
    pub async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("requesting {}", url))?;

        let status = resp.status();
        if !status.is_success() {
            bail!("module download failed: {} ({})", status, url);
        }

        let bytes = resp.bytes().await.context("reading module body")?;
        if bytes.is_empty() {
            bail!("module download returned an empty body ({})", url);
        }
        Ok(bytes.to_vec())
    }

    /// Download and persist to a temporary file.
    pub async fn fetch(&self, url: &str) -> Result<Artifact> {
        let bytes = self.download(url).await?;
        Artifact::persist(&bytes)
    }
}
