//! WordPress.org plugin registry access for the sqlite-database-integration plugin.

use std::fs::File;
use std::io;
use std::path::Path;
use std::time::Duration;

use log::debug;
use serde::Deserialize;

use crate::config::SqliteConfig;
use crate::error::{ProvisionError, ProvisionResult};

pub trait PluginRegistry {
  /// Latest published plugin version.
  fn latest_version(&self) -> ProvisionResult<String>;

  /// Write the archive for `version` to `dest`.
  fn download(&self, version: &str, dest: &Path) -> ProvisionResult<()>;
}

#[derive(Debug, Deserialize)]
struct PluginInfo {
  #[serde(default)]
  version: Option<String>,
}

/// Extract the `version` field from a plugin info response body.
pub(crate) fn parse_version(body: &str) -> ProvisionResult<String> {
  let info: PluginInfo = serde_json::from_str(body)
    .map_err(|e| ProvisionError::Registry(format!("unparsable plugin info: {e}")))?;
  match info.version.as_deref().map(str::trim) {
    Some(v) if !v.is_empty() => Ok(v.to_string()),
    _ => Err(ProvisionError::Registry(
      "plugin info has no version".to_string(),
    )),
  }
}

/// Blocking HTTP client against the endpoints from `[sqlite]` config.
pub struct HttpRegistry {
  client: reqwest::blocking::Client,
  config: SqliteConfig,
}

impl HttpRegistry {
  pub fn new(cfg: &SqliteConfig) -> ProvisionResult<Self> {
    let client = reqwest::blocking::Client::builder()
      .user_agent(concat!("wp-valet/", env!("CARGO_PKG_VERSION")))
      .timeout(Duration::from_secs(300))
      .build()
      .map_err(|e| ProvisionError::Registry(format!("failed to build http client: {e}")))?;
    Ok(Self {
      client,
      config: cfg.clone(),
    })
  }

  fn get(&self, url: &str) -> ProvisionResult<reqwest::blocking::Response> {
    debug!("GET {url}");
    let response = self
      .client
      .get(url)
      .send()
      .map_err(|e| ProvisionError::Registry(format!("failed to GET {url}: {e}")))?;
    debug!("GET {url} -> {}", response.status());
    if !response.status().is_success() {
      return Err(ProvisionError::Registry(format!(
        "HTTP {}: {url}",
        response.status()
      )));
    }
    Ok(response)
  }
}

impl PluginRegistry for HttpRegistry {
  fn latest_version(&self) -> ProvisionResult<String> {
    let body = self
      .get(&self.config.info_url)?
      .text()
      .map_err(|e| ProvisionError::Registry(format!("failed to read plugin info: {e}")))?;
    parse_version(&body)
  }

  fn download(&self, version: &str, dest: &Path) -> ProvisionResult<()> {
    let url = self.config.download_url_for(version);
    let mut response = self.get(&url)?;
    let mut file = File::create(dest).map_err(|e| ProvisionError::fs(dest, e))?;
    let bytes = io::copy(&mut response, &mut file)
      .map_err(|e| ProvisionError::Registry(format!("failed to download {url}: {e}")))?;
    debug!("Downloaded {bytes} bytes to {}", dest.display());
    Ok(())
  }
}
