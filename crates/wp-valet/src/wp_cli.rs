//! Delegation to WP-CLI.
//!
//! Every WordPress operation (download, config, db, install) is a `wp`
//! subcommand run inside the project directory. The `WpCli` trait is the seam
//! tests replace.

use std::path::Path;

use log::debug;

use crate::error::{ProvisionError, ProvisionResult};
use crate::utils::child::{ChildOutput, run_captured};
use crate::utils::command::Command;

/// One WP-CLI invocation: subcommand words, then `--key=value` flags and bare switches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WpCommand {
  words: Vec<String>,
  flags: Vec<(String, String)>,
  switches: Vec<String>,
}

impl WpCommand {
  pub fn new<I, S>(words: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      words: words.into_iter().map(Into::into).collect(),
      ..Self::default()
    }
  }

  /// Add `--key=value`.
  #[must_use]
  pub fn flag(mut self, key: &str, value: impl Into<String>) -> Self {
    self.flags.push((key.to_string(), value.into()));
    self
  }

  /// Add `--key=value` only when `value` is present and not blank, so WP-CLI
  /// falls back to its own default otherwise.
  #[must_use]
  pub fn flag_opt(self, key: &str, value: Option<&str>) -> Self {
    match value.map(str::trim) {
      Some(v) if !v.is_empty() => self.flag(key, v),
      _ => self,
    }
  }

  /// Add a bare `--key` switch.
  #[must_use]
  pub fn switch(mut self, key: &str) -> Self {
    self.switches.push(key.to_string());
    self
  }

  /// Subcommand words joined by a space, e.g. `core download`.
  #[must_use]
  pub fn name(&self) -> String {
    self.words.join(" ")
  }

  #[must_use]
  pub fn has_flag(&self, key: &str) -> bool {
    self.flags.iter().any(|(k, _)| k == key)
  }

  #[must_use]
  pub fn flag_value(&self, key: &str) -> Option<&str> {
    self
      .flags
      .iter()
      .find(|(k, _)| k == key)
      .map(|(_, v)| v.as_str())
  }

  #[must_use]
  pub fn has_switch(&self, key: &str) -> bool {
    self.switches.iter().any(|s| s == key)
  }

  /// Argument array handed to the process. Values are never shell-quoted.
  #[must_use]
  pub fn to_args(&self) -> Vec<String> {
    let mut args = self.words.clone();
    args.extend(self.flags.iter().map(|(k, v)| format!("--{k}={v}")));
    args.extend(self.switches.iter().map(|s| format!("--{s}")));
    args
  }
}

pub trait WpCli {
  /// Run `cmd` with `cwd` as working directory, failing on a non-zero exit.
  fn run(&self, cwd: &Path, cmd: &WpCommand) -> ProvisionResult<ChildOutput>;
}

/// The real `wp` binary (or whatever argv is configured for it).
#[derive(Debug, Clone)]
pub struct ProcessWpCli {
  tool: Command,
}

impl ProcessWpCli {
  #[must_use]
  pub fn new(tool: Command) -> Self {
    Self { tool }
  }
}

impl WpCli for ProcessWpCli {
  fn run(&self, cwd: &Path, cmd: &WpCommand) -> ProvisionResult<ChildOutput> {
    let args = cmd.to_args();
    let output = run_captured(&self.tool, &args, cwd)?;
    if !output.success() {
      debug!("wp {} stdout: {}", cmd.name(), output.stdout.trim());
      let stderr = output.stderr.trim();
      return Err(ProvisionError::DelegatedCommand {
        command: format!("wp {}", cmd.name()),
        stderr: if stderr.is_empty() {
          format!("exited with code {}", exit_code_label(output.code))
        } else {
          stderr.to_string()
        },
      });
    }
    Ok(output)
  }
}

fn exit_code_label(code: Option<i32>) -> String {
  code.map_or_else(|| "signal".to_string(), |c| c.to_string())
}
