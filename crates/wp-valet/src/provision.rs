//! The `new` sequence: directory, core download, config, database, install, HTTPS.
//!
//! Steps run strictly in order and the first failure ends the run. Nothing is
//! rolled back, so a failed run can leave a half-built site directory behind.

use std::fs;

use log::debug;

use crate::cache::ContentCache;
use crate::config::{DbDriver, SqliteConfig};
use crate::error::{ProvisionError, ProvisionResult};
use crate::registry::PluginRegistry;
use crate::request::ProvisioningRequest;
use crate::sqlite::SqliteInstaller;
use crate::utils::log::t;
use crate::valet::Proxy;
use crate::wp_cli::{WpCli, WpCommand};
use crate::{log_info, log_success};

/// External collaborators of a provisioning run.
pub struct Provisioner<'a> {
  pub wp: &'a dyn WpCli,
  pub proxy: &'a dyn Proxy,
  pub registry: &'a dyn PluginRegistry,
  pub cache: &'a dyn ContentCache,
  pub sqlite: &'a SqliteConfig,
}

impl Provisioner<'_> {
  pub fn run(&self, req: &ProvisioningRequest) -> ProvisionResult<()> {
    debug!(
      "Provisioning {} ({}) into {}",
      req.domain,
      req.db_driver(),
      req.full_path.display()
    );
    self.ensure_directory(req)?;
    self.download_core(req)?;
    self.write_config(req)?;
    self.provision_db(req)?;
    self.run_installer(req)?;
    if req.is_secure {
      self.register_proxy(req)?;
    }
    log_success!("{} ready! {}", req.site_name, req.full_url);
    Ok(())
  }

  pub fn ensure_directory(&self, req: &ProvisioningRequest) -> ProvisionResult<()> {
    let path = &req.full_path;
    if path.exists() && !path.is_dir() {
      return Err(ProvisionError::fs(
        path,
        std::io::Error::new(std::io::ErrorKind::AlreadyExists, "path is not a directory"),
      ));
    }
    if !path.exists() {
      log_info!("Create directory {}", t::path(path.display()));
      fs::create_dir_all(path).map_err(|e| ProvisionError::fs(path, e))?;
    }
    Ok(())
  }

  pub fn download_core(&self, req: &ProvisioningRequest) -> ProvisionResult<()> {
    log_info!("Download WordPress");
    let cmd = WpCommand::new(["core", "download"])
      .flag_opt("version", req.options.version.as_deref())
      .flag_opt("locale", req.options.locale.as_deref());
    self.wp.run(&req.full_path, &cmd)?;
    Ok(())
  }

  pub fn write_config(&self, req: &ProvisioningRequest) -> ProvisionResult<()> {
    log_info!("Write wp-config.php");
    let mut cmd = WpCommand::new(["core", "config"])
      .flag("dbname", req.dbname())
      .flag("dbuser", req.options.dbuser.clone().unwrap_or_default())
      .flag_opt("dbpass", req.options.dbpass.as_deref())
      .flag_opt("dbhost", req.options.dbhost.as_deref())
      .flag("dbprefix", req.options.dbprefix.clone().unwrap_or_default());
    if req.db_driver() == DbDriver::Sqlite {
      // There is no MySQL server to check credentials against.
      cmd = cmd.switch("skip-check");
    }
    self.wp.run(&req.full_path, &cmd)?;
    Ok(())
  }

  pub fn provision_db(&self, req: &ProvisioningRequest) -> ProvisionResult<()> {
    match req.db_driver() {
      DbDriver::Mysql => {
        log_info!("Create database {}", t::slug(req.dbname()));
        self.wp.run(&req.full_path, &WpCommand::new(["db", "create"]))?;
        Ok(())
      }
      DbDriver::Sqlite => SqliteInstaller {
        registry: self.registry,
        cache: self.cache,
        config: self.sqlite,
      }
      .install(req),
    }
  }

  pub fn run_installer(&self, req: &ProvisioningRequest) -> ProvisionResult<()> {
    log_info!("Install WordPress at {}", t::url(&req.full_url));
    let cmd = WpCommand::new(["core", "install"])
      .flag("url", &req.full_url)
      .flag("title", &req.site_name)
      .flag("admin_user", req.options.admin_user.clone().unwrap_or_default())
      .flag(
        "admin_password",
        req.options.admin_password.clone().unwrap_or_default(),
      )
      .flag("admin_email", req.admin_email())
      .switch("skip-email");
    self.wp.run(&req.full_path, &cmd)?;
    Ok(())
  }

  pub fn register_proxy(&self, req: &ProvisioningRequest) -> ProvisionResult<()> {
    log_info!("Secure {} with {}", t::slug(&req.domain), t::cmd("valet"));
    let out = self.proxy.secure(&req.site_name)?;
    debug!("valet secure: {out}");
    Ok(())
  }
}
