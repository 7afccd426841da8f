//! Installs the sqlite-database-integration plugin and its `db.php` drop-in so
//! WordPress runs without a MySQL server.

use std::fs::{self, File};
use std::path::Path;

use log::{debug, warn};

use crate::cache::ContentCache;
use crate::config::SqliteConfig;
use crate::error::{ProvisionError, ProvisionResult};
use crate::registry::PluginRegistry;
use crate::request::ProvisioningRequest;
use crate::log_info;
use crate::utils::log::t;

/// Directory name of the plugin inside its archive.
pub const PLUGIN_SLUG: &str = "sqlite-database-integration";
/// Drop-in template shipped by the plugin.
const DROP_IN_TEMPLATE: &str = "db.copy";

/// Cache key for one plugin release: `{namespace}/sqlite-integration.{version}.zip`.
#[must_use]
pub fn cache_key(namespace: &str, version: &str) -> String {
  format!("{namespace}/sqlite-integration.{version}.zip")
}

/// Handles the installer needs. Passed in explicitly so tests can swap them.
pub struct SqliteInstaller<'a> {
  pub registry: &'a dyn PluginRegistry,
  pub cache: &'a dyn ContentCache,
  pub config: &'a SqliteConfig,
}

impl SqliteInstaller<'_> {
  /// Pinned version from config, otherwise the registry's latest release.
  pub fn resolve_version(&self) -> ProvisionResult<String> {
    if let Some(v) = self.config.version.as_deref().map(str::trim)
      && !v.is_empty()
    {
      debug!("Using pinned {PLUGIN_SLUG} {v}");
      return Ok(v.to_string());
    }
    self.registry.latest_version()
  }

  pub fn install(&self, req: &ProvisioningRequest) -> ProvisionResult<()> {
    let version = self.resolve_version()?;
    log_info!("Install {} {}", t::slug(PLUGIN_SLUG), version);

    // Removed on drop, whichever way this function returns.
    let archive = tempfile::Builder::new()
      .prefix("sqlite-integration.")
      .suffix(".zip")
      .tempfile()
      .map_err(|e| ProvisionError::fs(std::env::temp_dir(), e))?;

    self.fetch_archive(&version, archive.path())?;

    let plugins = req.plugins_dir();
    fs::create_dir_all(&plugins).map_err(|e| ProvisionError::fs(&plugins, e))?;
    extract(archive.path(), &plugins)?;

    let drop_in = req.wp_content_dir().join("db.php");
    copy_drop_in(&plugins, &req.wp_content_dir(), &drop_in)?;

    if !drop_in.is_file() {
      return Err(ProvisionError::Installation(
        "sqlite-integration install failed".to_string(),
      ));
    }
    debug!("Drop-in in place at {}", drop_in.display());
    Ok(())
  }

  /// Cache first; on a miss download once and remember the archive.
  fn fetch_archive(&self, version: &str, dest: &Path) -> ProvisionResult<()> {
    let key = cache_key(&self.config.cache_namespace, version);
    if self.cache.has(&key) {
      debug!("Cache hit for {key}");
      return self.cache.export(&key, dest);
    }
    debug!("Cache miss for {key}, downloading");
    self.registry.download(version, dest)?;
    self.cache.import(&key, dest)
  }
}

fn extract(archive: &Path, into: &Path) -> ProvisionResult<()> {
  let file = File::open(archive).map_err(|e| ProvisionError::fs(archive, e))?;
  let mut zip = zip::ZipArchive::new(file).map_err(|e| {
    ProvisionError::Installation(format!("invalid plugin archive {}: {e}", archive.display()))
  })?;
  zip
    .extract(into)
    .map_err(|e| ProvisionError::Installation(format!("failed to extract plugin archive: {e}")))?;
  debug!("Extracted {} entries into {}", zip.len(), into.display());
  Ok(())
}

/// Copy the plugin's `db.copy` to `wp-content/db.php`, filling in the
/// placeholders the plugin itself replaces on activation.
fn copy_drop_in(plugins: &Path, wp_content: &Path, drop_in: &Path) -> ProvisionResult<()> {
  let plugin_dir = plugins.join(PLUGIN_SLUG);
  let template = plugin_dir.join(DROP_IN_TEMPLATE);
  if !template.is_file() {
    warn!("{} missing from plugin archive", template.display());
    return Ok(());
  }
  let raw = fs::read_to_string(&template).map_err(|e| ProvisionError::fs(&template, e))?;
  let body = raw
    .replace(
      "{SQLITE_IMPLEMENTATION_FOLDER_PATH}",
      &plugin_dir.display().to_string(),
    )
    .replace("{SQLITE_PLUGIN}", &format!("{PLUGIN_SLUG}/load.php"));
  fs::create_dir_all(wp_content).map_err(|e| ProvisionError::fs(wp_content, e))?;
  fs::write(drop_in, body).map_err(|e| ProvisionError::fs(drop_in, e))?;
  Ok(())
}
