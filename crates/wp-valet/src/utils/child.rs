use std::path::Path;
use std::process::{Command, Stdio};

use log::debug;

use crate::error::{ProvisionError, ProvisionResult};
use crate::utils::command::Command as ToolCommand;

/// Captured result of a finished child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildOutput {
  pub code: Option<i32>,
  pub stdout: String,
  pub stderr: String,
}

impl ChildOutput {
  #[must_use]
  pub fn success(&self) -> bool {
    self.code == Some(0)
  }
}

/// Run `tool` with `extra` arguments appended, blocking until it exits.
///
/// Stdin is closed and both output streams are captured. Arguments are passed
/// as an array, never through a shell. The only error is failing to spawn;
/// a non-zero exit is reported through `ChildOutput::code`.
pub fn run_captured(
  tool: &ToolCommand,
  extra: &[String],
  cwd: &Path,
) -> ProvisionResult<ChildOutput> {
  let shown = tool.display_redacted(extra);
  debug!("Running `{}` in {}", shown, cwd.display());

  let output = Command::new(&tool.program)
    .current_dir(cwd)
    .args(tool.argv_with(extra))
    .stdin(Stdio::null())
    .stdout(Stdio::piped())
    .stderr(Stdio::piped())
    .output()
    .map_err(|source| {
      debug!("Could not start `{}`: {}", shown, source);
      ProvisionError::Spawn {
        program: tool.program.clone(),
        source,
      }
    })?;

  let result = ChildOutput {
    code: output.status.code(),
    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
  };
  debug!("`{}` exited with {}", shown, output.status);
  Ok(result)
}
