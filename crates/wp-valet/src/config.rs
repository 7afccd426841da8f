use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use owo_colors::OwoColorize as _;
use serde::Deserialize;
use toml::Value as TomlValue;

use crate::utils::command::Command;

/// Known top-level config keys.
const KNOWN_TOP_LEVEL_KEYS: &[&str] = &["tools", "site", "sqlite", "cache"];

/// Known keys per section, checked by `warn_unknown_keys`.
const KNOWN_SECTION_KEYS: &[(&str, &[&str])] = &[
  ("tools", &["wp", "valet"]),
  (
    "site",
    &[
      "db",
      "dbuser",
      "dbpass",
      "dbprefix",
      "dbhost",
      "admin_user",
      "admin_password",
      "locale",
    ],
  ),
  (
    "sqlite",
    &["version", "cache_namespace", "info_url", "download_url"],
  ),
  ("cache", &["dir"]),
];

// Embed repository defaults
const DEFAULT_TOML: &str =
  include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/defaults/wp-valet.toml"));

/// File name of the global and the per-directory config.
const CONFIG_FILE_NAME: &str = "wp-valet.toml";
const PROJECT_CONFIG_FILE_NAME: &str = ".wp-valet.toml";

/// Environment overrides for the tool argv, split like a shell would.
pub const WP_ENV: &str = "WP_VALET_WP";
pub const VALET_ENV: &str = "WP_VALET_VALET";

/// Database backend for the new site.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DbDriver {
  #[default]
  Mysql,
  Sqlite,
}

impl std::fmt::Display for DbDriver {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      DbDriver::Mysql => f.write_str("mysql"),
      DbDriver::Sqlite => f.write_str("sqlite"),
    }
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolsConfig {
  #[serde(default)]
  pub wp: Vec<String>,
  #[serde(default)]
  pub valet: Vec<String>,
}

impl ToolsConfig {
  /// WP-CLI argv with precedence: `$WP_VALET_WP` -> config.tools.wp.
  pub fn wp(&self) -> Result<Command> {
    resolve_tool("wp", WP_ENV, &self.wp)
  }

  /// Valet argv with precedence: `$WP_VALET_VALET` -> config.tools.valet.
  pub fn valet(&self) -> Result<Command> {
    resolve_tool("valet", VALET_ENV, &self.valet)
  }
}

fn resolve_tool(name: &str, env_key: &str, configured: &[String]) -> Result<Command> {
  if let Some(tokens) = env_argv(env_key) {
    return Command::new(&tokens);
  }
  Command::new(configured).with_context(|| format!("tools.{name} not defined or empty"))
}

#[must_use]
pub(crate) fn env_argv(key: &str) -> Option<Vec<String>> {
  let raw = std::env::var(key).ok()?;
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return None;
  }
  let tokens = shell_words::split(trimmed).ok()?;
  if tokens.is_empty() {
    return None;
  }
  Some(tokens)
}

/// Defaults for `new` options the user did not pass on the command line.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SiteDefaults {
  #[serde(default)]
  pub db: Option<DbDriver>,
  #[serde(default)]
  pub dbuser: Option<String>,
  #[serde(default)]
  pub dbpass: Option<String>,
  #[serde(default)]
  pub dbprefix: Option<String>,
  #[serde(default)]
  pub dbhost: Option<String>,
  #[serde(default)]
  pub admin_user: Option<String>,
  #[serde(default)]
  pub admin_password: Option<String>,
  #[serde(default)]
  pub locale: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SqliteConfig {
  /// Pin the sqlite-database-integration release instead of asking the registry.
  #[serde(default)]
  pub version: Option<String>,
  #[serde(default)]
  pub cache_namespace: String,
  #[serde(default)]
  pub info_url: String,
  /// Download URL template; `{version}` is replaced with the plugin version.
  #[serde(default)]
  pub download_url: String,
}

impl SqliteConfig {
  #[must_use]
  pub fn download_url_for(&self, version: &str) -> String {
    self.download_url.replace("{version}", version)
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheConfig {
  #[serde(default)]
  pub dir: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ValetConfig {
  #[serde(default)]
  pub tools: ToolsConfig,
  #[serde(default)]
  pub site: SiteDefaults,
  #[serde(default)]
  pub sqlite: SqliteConfig,
  #[serde(default)]
  pub cache: CacheConfig,
}

impl ValetConfig {
  /// Root directory of the download cache.
  ///
  /// Precedence:
  /// 1) `cache.dir` from config
  /// 2) `$XDG_CACHE_HOME/wp-valet`
  /// 3) `~/.cache/wp-valet`
  #[must_use]
  pub fn cache_dir(&self) -> PathBuf {
    if let Some(dir) = &self.cache.dir
      && !dir.trim().is_empty()
    {
      return PathBuf::from(dir);
    }
    if let Ok(xdg_cache) = std::env::var("XDG_CACHE_HOME")
      && !xdg_cache.is_empty()
    {
      return PathBuf::from(xdg_cache).join("wp-valet");
    }
    let home = std::env::var("HOME").map_or_else(|_| PathBuf::from("."), PathBuf::from);
    home.join(".cache").join("wp-valet")
  }
}

/// Everything a command needs from its environment.
#[derive(Debug, Clone)]
pub struct AppContext {
  pub cwd: PathBuf,
  pub config: ValetConfig,
}

fn merge_values(base: &mut TomlValue, overlay: TomlValue) {
  match (base, overlay) {
    (TomlValue::Table(base_tbl), TomlValue::Table(overlay_tbl)) => {
      for (k, v) in overlay_tbl {
        match base_tbl.get_mut(&k) {
          Some(existing) => merge_values(existing, v),
          None => {
            base_tbl.insert(k, v);
          }
        }
      }
    }
    // Arrays and scalars: replace last-wins
    (base_slot, new_v) => *base_slot = new_v,
  }
}

/// Warn about unknown keys in a parsed TOML config file.
///
/// Unknown keys are logged as warnings to help users catch typos.
fn warn_unknown_keys(val: &TomlValue, file_path: &Path) {
  let TomlValue::Table(table) = val else {
    return;
  };

  for key in table.keys() {
    if !KNOWN_TOP_LEVEL_KEYS.contains(&key.as_str()) {
      eprintln!(
        "{}: unknown config key '{}' in {} (did you mean one of: {}?)",
        "warning".yellow(),
        key,
        file_path.display(),
        KNOWN_TOP_LEVEL_KEYS.join(", ")
      );
    }
  }

  for (section, known) in KNOWN_SECTION_KEYS {
    let Some(TomlValue::Table(inner)) = table.get(*section) else {
      continue;
    };
    for key in inner.keys() {
      if !known.contains(&key.as_str()) {
        eprintln!(
          "{}: unknown config key '{}.{}' in {} (known keys: {})",
          "warning".yellow(),
          section,
          key,
          file_path.display(),
          known.join(", ")
        );
      }
    }
  }
}

fn merge_file(merged: &mut TomlValue, path: &Path) -> Result<()> {
  let data =
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
  let val: TomlValue =
    toml::from_str(&data).with_context(|| format!("invalid TOML in {}", path.display()))?;
  warn_unknown_keys(&val, path);
  merge_values(merged, val);
  Ok(())
}

/// Resolve the global config file path.
///
/// # Errors
/// Returns an error if the XDG config home cannot be resolved.
pub fn global_config_path() -> Result<PathBuf> {
  let xdg = xdg::BaseDirectories::with_prefix("wp-valet");
  xdg
    .find_config_file(CONFIG_FILE_NAME)
    .ok_or_else(|| anyhow::anyhow!("no global {CONFIG_FILE_NAME} found"))
}

/// Load and merge configuration from defaults, global, and project files.
///
/// # Errors
/// Returns an error if any of the config files cannot be read or parsed
/// as valid TOML, or if the merged result does not match the schema.
pub fn load_config(cwd: &Path) -> Result<ValetConfig> {
  // Start with embedded defaults
  let mut merged: TomlValue =
    toml::from_str(DEFAULT_TOML).context("invalid embedded default config")?;

  if let Ok(global_path) = global_config_path() {
    merge_file(&mut merged, &global_path)?;
  }

  let project_cfg = cwd.join(PROJECT_CONFIG_FILE_NAME);
  if project_cfg.exists() {
    merge_file(&mut merged, &project_cfg)?;
  }

  // Deserialize into strongly typed config
  let merged_str = toml::to_string(&merged).context("failed to serialize merged config")?;
  let cfg: ValetConfig = toml::from_str(&merged_str).context("failed to parse merged config")?;
  Ok(cfg)
}
