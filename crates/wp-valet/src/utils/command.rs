use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

/// Flags whose values are masked in log output.
const SECRET_FLAGS: &[&str] = &["--dbpass=", "--admin_password="];

/// An external program plus the leading arguments configured for it, e.g.
/// `["php", "/opt/wp-cli.phar"]`. Call-specific arguments are appended per invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
  pub program: String,
  pub args: Vec<String>,
}

impl Command {
  /// Construct from argv-like vector: first element is the program, rest are args.
  pub fn new(argv: &[String]) -> Result<Self> {
    let Some((program, args)) = argv.split_first() else {
      bail!("command is empty");
    };
    if program.trim().is_empty() {
      bail!("command program is empty");
    }
    Ok(Self {
      program: program.clone(),
      args: args.to_vec(),
    })
  }

  /// Full argument list for one invocation: configured args, then `extra`.
  #[must_use]
  pub fn argv_with(&self, extra: &[String]) -> Vec<String> {
    let mut argv = self.args.clone();
    argv.extend(extra.iter().cloned());
    argv
  }

  /// Human readable rendering used in logs and error messages.
  #[must_use]
  pub fn display_with(&self, extra: &[String]) -> String {
    let mut parts = vec![self.program.clone()];
    parts.extend(self.argv_with(extra));
    shell_words::join(parts)
  }

  /// Like [`Command::display_with`], with password flag values replaced by `***`.
  #[must_use]
  pub fn display_redacted(&self, extra: &[String]) -> String {
    let masked: Vec<String> = extra
      .iter()
      .map(|arg| match SECRET_FLAGS.iter().find(|flag| arg.starts_with(**flag)) {
        Some(flag) => format!("{flag}***"),
        None => arg.clone(),
      })
      .collect();
    self.display_with(&masked)
  }
}
