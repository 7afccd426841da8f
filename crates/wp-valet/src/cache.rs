use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{ProvisionError, ProvisionResult};

/// Key/value store for downloaded artifacts, keyed by a `/`-qualified name.
pub trait ContentCache {
  fn has(&self, key: &str) -> bool;

  /// Copy the entry for `key` to `dest`.
  fn export(&self, key: &str, dest: &Path) -> ProvisionResult<()>;

  /// Store a copy of `src` under `key`, replacing any previous entry.
  fn import(&self, key: &str, src: &Path) -> ProvisionResult<()>;
}

/// Cache backed by a directory; each key maps to a file below `root`.
#[derive(Debug, Clone)]
pub struct FileCache {
  root: PathBuf,
}

impl FileCache {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  /// Keys may contain `/` but never `..` or a leading `/`.
  fn path_for(&self, key: &str) -> PathBuf {
    key
      .split('/')
      .filter(|part| !part.is_empty() && *part != "." && *part != "..")
      .fold(self.root.clone(), |acc, part| acc.join(part))
  }
}

impl ContentCache for FileCache {
  fn has(&self, key: &str) -> bool {
    self.path_for(key).is_file()
  }

  fn export(&self, key: &str, dest: &Path) -> ProvisionResult<()> {
    let src = self.path_for(key);
    debug!("Cache export {} -> {}", src.display(), dest.display());
    fs::copy(&src, dest).map_err(|e| ProvisionError::fs(dest, e))?;
    Ok(())
  }

  fn import(&self, key: &str, src: &Path) -> ProvisionResult<()> {
    let dest = self.path_for(key);
    if let Some(parent) = dest.parent() {
      fs::create_dir_all(parent).map_err(|e| ProvisionError::fs(parent, e))?;
    }
    // Write next to the final path first so readers never see a partial file.
    let staging = dest.with_extension(format!("part-{}", std::process::id()));
    let staged = fs::copy(src, &staging).and_then(|_| fs::rename(&staging, &dest));
    if let Err(e) = staged {
      let _ = fs::remove_file(&staging);
      return Err(ProvisionError::fs(&dest, e));
    }
    debug!("Cache import {} -> {}", src.display(), dest.display());
    Ok(())
  }
}
