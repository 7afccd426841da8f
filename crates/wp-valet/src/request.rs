use std::path::{Path, PathBuf};

use crate::config::{DbDriver, SiteDefaults};
use crate::error::{ProvisionError, ProvisionResult};
use crate::utils::slug::sanitize_site_name;
use crate::valet::Proxy;

/// User supplied overrides for a new site. `None` means "not given".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteOptions {
  pub version: Option<String>,
  pub locale: Option<String>,
  pub db: Option<DbDriver>,
  pub dbname: Option<String>,
  pub dbuser: Option<String>,
  pub dbpass: Option<String>,
  pub dbprefix: Option<String>,
  pub dbhost: Option<String>,
  pub admin_user: Option<String>,
  pub admin_password: Option<String>,
  pub admin_email: Option<String>,
  pub unsecure: bool,
  /// Parent directory for the site; the working directory when unset.
  pub parent_dir: Option<PathBuf>,
}

impl SiteOptions {
  /// Fill options the user left out from config defaults.
  #[must_use]
  pub fn with_defaults(mut self, defaults: &SiteDefaults) -> Self {
    fn fill(slot: &mut Option<String>, fallback: &Option<String>) {
      if slot.is_none() {
        slot.clone_from(fallback);
      }
    }
    fill(&mut self.locale, &defaults.locale);
    fill(&mut self.dbuser, &defaults.dbuser);
    fill(&mut self.dbpass, &defaults.dbpass);
    fill(&mut self.dbprefix, &defaults.dbprefix);
    fill(&mut self.dbhost, &defaults.dbhost);
    fill(&mut self.admin_user, &defaults.admin_user);
    fill(&mut self.admin_password, &defaults.admin_password);
    if self.db.is_none() {
      self.db = defaults.db;
    }
    self
  }
}

/// Everything derived for one `new` invocation. Built once, never recomputed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningRequest {
  pub site_name: String,
  pub domain: String,
  pub is_secure: bool,
  pub full_url: String,
  pub full_path: PathBuf,
  pub options: SiteOptions,
}

impl ProvisioningRequest {
  /// Derive the request from the raw site identifier, asking `proxy` for its TLD.
  pub fn resolve(
    raw_name: &str,
    options: SiteOptions,
    cwd: &Path,
    proxy: &dyn Proxy,
  ) -> ProvisionResult<Self> {
    let site_name =
      sanitize_site_name(raw_name).map_err(|e| ProvisionError::Configuration(Box::new(e)))?;
    let tld = proxy
      .tld()
      .map_err(|e| ProvisionError::Configuration(Box::new(e)))?;
    let domain = format!("{site_name}.{tld}");
    let is_secure = !options.unsecure;
    let scheme = if is_secure { "https" } else { "http" };
    let full_url = format!("{scheme}://{domain}");
    let parent = match &options.parent_dir {
      Some(dir) if dir.is_absolute() => dir.clone(),
      Some(dir) => cwd.join(dir),
      None => cwd.to_path_buf(),
    };
    let full_path = parent.join(&site_name);
    Ok(Self {
      site_name,
      domain,
      is_secure,
      full_url,
      full_path,
      options,
    })
  }

  #[must_use]
  pub fn db_driver(&self) -> DbDriver {
    self.options.db.unwrap_or_default()
  }

  /// `wp_{site_name}` unless the user named the database.
  #[must_use]
  pub fn dbname(&self) -> String {
    match &self.options.dbname {
      Some(name) => name.clone(),
      None => format!("wp_{}", self.site_name),
    }
  }

  /// `admin@{domain}` unless the user gave an address.
  #[must_use]
  pub fn admin_email(&self) -> String {
    match &self.options.admin_email {
      Some(email) => email.clone(),
      None => format!("admin@{}", self.domain),
    }
  }

  #[must_use]
  pub fn wp_content_dir(&self) -> PathBuf {
    self.full_path.join("wp-content")
  }

  #[must_use]
  pub fn plugins_dir(&self) -> PathBuf {
    self.wp_content_dir().join("plugins")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  struct FixedTld(&'static str);

  impl Proxy for FixedTld {
    fn run(&self, _args: &[&str]) -> ProvisionResult<String> {
      Ok(self.0.to_string())
    }
  }

  struct BrokenProxy;

  impl Proxy for BrokenProxy {
    fn run(&self, args: &[&str]) -> ProvisionResult<String> {
      Err(ProvisionError::ProxyTool {
        command: format!("valet {}", args.join(" ")),
        output: "valet: command not configured".to_string(),
      })
    }
  }

  fn resolve(name: &str, options: SiteOptions) -> ProvisioningRequest {
    ProvisioningRequest::resolve(name, options, Path::new("/sites"), &FixedTld("test")).unwrap()
  }

  #[test]
  fn secure_by_default() {
    let req = resolve("Example", SiteOptions::default());
    assert_eq!(req.site_name, "example");
    assert_eq!(req.domain, "example.test");
    assert!(req.is_secure);
    assert_eq!(req.full_url, "https://example.test");
    assert_eq!(req.full_path, PathBuf::from("/sites/example"));
  }

  #[test]
  fn unsecure_uses_http() {
    let req = resolve(
      "example",
      SiteOptions {
        unsecure: true,
        ..SiteOptions::default()
      },
    );
    assert!(!req.is_secure);
    assert_eq!(req.full_url, "http://example.test");
  }

  #[test]
  fn dbname_defaults_only_when_missing() {
    let req = resolve("my site", SiteOptions::default());
    assert_eq!(req.dbname(), "wp_my-site");
    let req = resolve(
      "my site",
      SiteOptions {
        dbname: Some("Custom_DB".to_string()),
        ..SiteOptions::default()
      },
    );
    assert_eq!(req.dbname(), "Custom_DB");
  }

  #[test]
  fn admin_email_defaults_only_when_missing() {
    let req = resolve("example", SiteOptions::default());
    assert_eq!(req.admin_email(), "admin@example.test");
    let req = resolve(
      "example",
      SiteOptions {
        admin_email: Some("me@host.dev".to_string()),
        ..SiteOptions::default()
      },
    );
    assert_eq!(req.admin_email(), "me@host.dev");
  }

  #[test]
  fn parent_dir_relative_and_absolute() {
    let req = resolve(
      "a",
      SiteOptions {
        parent_dir: Some(PathBuf::from("nested")),
        ..SiteOptions::default()
      },
    );
    assert_eq!(req.full_path, PathBuf::from("/sites/nested/a"));
    let req = resolve(
      "a",
      SiteOptions {
        parent_dir: Some(PathBuf::from("/elsewhere")),
        ..SiteOptions::default()
      },
    );
    assert_eq!(req.full_path, PathBuf::from("/elsewhere/a"));
  }

  #[test]
  fn tld_failure_is_a_configuration_error() {
    let err = ProvisioningRequest::resolve(
      "example",
      SiteOptions::default(),
      Path::new("/sites"),
      &BrokenProxy,
    )
    .unwrap_err();
    assert!(matches!(err, ProvisionError::Configuration(_)));
    let cause = std::error::Error::source(&err).expect("proxy error as source");
    assert!(cause.to_string().contains("command not configured"), "{cause}");
  }

  #[test]
  fn unusable_site_name_is_a_configuration_error() {
    let err = ProvisioningRequest::resolve(
      "!!!",
      SiteOptions::default(),
      Path::new("/sites"),
      &FixedTld("test"),
    )
    .unwrap_err();
    assert!(matches!(err, ProvisionError::Configuration(_)), "{err:?}");
    let cause = std::error::Error::source(&err).expect("sanitize error as source");
    assert!(cause.to_string().contains("invalid site name"), "{cause}");
  }

  #[test]
  fn defaults_fill_only_missing_options() {
    let defaults = SiteDefaults {
      db: Some(DbDriver::Sqlite),
      dbuser: Some("root".to_string()),
      admin_user: Some("admin".to_string()),
      ..SiteDefaults::default()
    };
    let opts = SiteOptions {
      dbuser: Some("me".to_string()),
      ..SiteOptions::default()
    }
    .with_defaults(&defaults);
    assert_eq!(opts.dbuser.as_deref(), Some("me"));
    assert_eq!(opts.admin_user.as_deref(), Some("admin"));
    assert_eq!(opts.db, Some(DbDriver::Sqlite));
    assert_eq!(opts.dbname, None);
  }
}
