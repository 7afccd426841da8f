use std::path::PathBuf;

use crate::error::{ProvisionError, ProvisionResult};
use crate::utils::child::run_captured;
use crate::utils::command::Command;

/// Local development proxy that owns the `.tld` domains and TLS certificates.
pub trait Proxy {
  /// Run one proxy command and return its trimmed stdout.
  fn run(&self, args: &[&str]) -> ProvisionResult<String>;

  /// The top-level domain sites are served under, e.g. `test`.
  fn tld(&self) -> ProvisionResult<String> {
    let out = self.run(&["domain"])?;
    Ok(out.trim().trim_start_matches('.').to_string())
  }

  /// Issue a certificate for `site` and serve it over HTTPS.
  fn secure(&self, site: &str) -> ProvisionResult<String> {
    self.run(&["secure", site])
  }
}

/// Laravel Valet driven through its CLI.
#[derive(Debug, Clone)]
pub struct ValetProxy {
  tool: Command,
  cwd: PathBuf,
}

impl ValetProxy {
  #[must_use]
  pub fn new(tool: Command, cwd: impl Into<PathBuf>) -> Self {
    Self {
      tool,
      cwd: cwd.into(),
    }
  }
}

impl Proxy for ValetProxy {
  fn run(&self, args: &[&str]) -> ProvisionResult<String> {
    let args: Vec<String> = args.iter().map(|s| (*s).to_string()).collect();
    let output = run_captured(&self.tool, &args, &self.cwd)?;
    if !output.success() {
      // Valet prints its errors on stdout; keep stderr when that is all there is.
      let text = if output.stdout.trim().is_empty() {
        output.stderr.trim()
      } else {
        output.stdout.trim()
      };
      return Err(ProvisionError::ProxyTool {
        command: self.tool.display_with(&args),
        output: text.to_string(),
      });
    }
    Ok(output.stdout.trim().to_string())
  }
}
