use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::cache::FileCache;
use crate::config::{AppContext, DbDriver};
use crate::log_info;
use crate::provision::Provisioner;
use crate::registry::HttpRegistry;
use crate::request::{ProvisioningRequest, SiteOptions};
use crate::utils::log::t;
use crate::utils::which;
use crate::valet::ValetProxy;
use crate::wp_cli::ProcessWpCli;

#[derive(Debug, Clone, Args)]
pub struct NewArgs {
  /// Site name; also the directory name and the subdomain under the Valet TLD
  pub domain: String,
  /// WordPress version to download (default: latest)
  #[arg(long = "version", value_name = "VERSION")]
  pub wp_version: Option<String>,
  /// WordPress locale, e.g. de_DE
  #[arg(long)]
  pub locale: Option<String>,
  /// Database backend
  #[arg(long, value_enum)]
  pub db: Option<DbDriver>,
  /// Database name (default: wp_<name>)
  #[arg(long)]
  pub dbname: Option<String>,
  #[arg(long)]
  pub dbuser: Option<String>,
  #[arg(long)]
  pub dbpass: Option<String>,
  #[arg(long)]
  pub dbprefix: Option<String>,
  #[arg(long)]
  pub dbhost: Option<String>,
  #[arg(long = "admin_user")]
  pub admin_user: Option<String>,
  #[arg(long = "admin_password")]
  pub admin_password: Option<String>,
  /// Admin email (default: admin@<name>.<tld>)
  #[arg(long = "admin_email")]
  pub admin_email: Option<String>,
  /// Serve over plain HTTP and skip `valet secure`
  #[arg(long)]
  pub unsecure: bool,
  /// Create the site inside this directory instead of the current one
  #[arg(long = "in", value_name = "DIR")]
  pub parent_dir: Option<PathBuf>,
}

impl NewArgs {
  fn site_options(&self) -> SiteOptions {
    SiteOptions {
      version: self.wp_version.clone(),
      locale: self.locale.clone(),
      db: self.db,
      dbname: self.dbname.clone(),
      dbuser: self.dbuser.clone(),
      dbpass: self.dbpass.clone(),
      dbprefix: self.dbprefix.clone(),
      dbhost: self.dbhost.clone(),
      admin_user: self.admin_user.clone(),
      admin_password: self.admin_password.clone(),
      admin_email: self.admin_email.clone(),
      unsecure: self.unsecure,
      parent_dir: self.parent_dir.clone(),
    }
  }
}

pub fn run(ctx: &AppContext, args: &NewArgs) -> Result<ProvisioningRequest> {
  let wp_tool = ctx.config.tools.wp()?;
  let valet_tool = ctx.config.tools.valet()?;
  which::require(&wp_tool, "see https://wp-cli.org/#installing")?;
  which::require(&valet_tool, "see https://laravel.com/docs/valet")?;

  let proxy = ValetProxy::new(valet_tool, &ctx.cwd);
  let options = args.site_options().with_defaults(&ctx.config.site);
  let req = ProvisioningRequest::resolve(&args.domain, options, &ctx.cwd, &proxy)?;
  log_info!(
    "Provision {} at {}",
    t::slug(&req.site_name),
    t::path(req.full_path.display())
  );

  let wp = ProcessWpCli::new(wp_tool);
  let registry = HttpRegistry::new(&ctx.config.sqlite)?;
  let cache = FileCache::new(ctx.config.cache_dir());
  Provisioner {
    wp: &wp,
    proxy: &proxy,
    registry: &registry,
    cache: &cache,
    sqlite: &ctx.config.sqlite,
  }
  .run(&req)?;

  Ok(req)
}
