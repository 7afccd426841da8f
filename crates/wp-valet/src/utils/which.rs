use std::io;
use std::path::{Path, PathBuf};

use crate::error::{ProvisionError, ProvisionResult};
use crate::utils::command::Command;

/// Resolve `program` to an executable path by walking PATH entries.
#[must_use]
pub(crate) fn which(program: &str) -> Option<PathBuf> {
  let has_sep = program.contains(std::path::MAIN_SEPARATOR);
  if has_sep {
    let candidate = PathBuf::from(program);
    return if is_executable(&candidate) {
      Some(candidate)
    } else {
      None
    };
  }

  let paths = std::env::var_os("PATH")?;
  std::env::split_paths(&paths)
    .map(|dir| dir.join(program))
    .find(|candidate| is_executable(candidate))
}

/// Returns true when `path` points to a regular executable file.
#[must_use]
pub(crate) fn is_executable(path: &Path) -> bool {
  if !path.is_file() {
    return false;
  }
  #[cfg(unix)]
  {
    use std::os::unix::fs::PermissionsExt as _;
    std::fs::metadata(path)
      .map(|meta| meta.permissions().mode() & 0o111 != 0)
      .unwrap_or(false)
  }
  #[cfg(not(unix))]
  {
    true
  }
}

/// Fail early with a readable message when a configured tool is not installed.
pub(crate) fn require(tool: &Command, hint: &str) -> ProvisionResult<()> {
  if which(&tool.program).is_some() {
    return Ok(());
  }
  Err(ProvisionError::Spawn {
    program: tool.program.clone(),
    source: io::Error::new(
      io::ErrorKind::NotFound,
      format!("not found on PATH ({hint})"),
    ),
  })
}
