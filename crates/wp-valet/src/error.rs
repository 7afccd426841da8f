use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Everything that can stop a site from being provisioned. All variants are fatal.
#[derive(Debug, Error)]
pub enum ProvisionError {
  #[error("failed creating directory {}", path.display())]
  Filesystem {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
  #[error("failed to resolve site settings")]
  Configuration(#[source] Box<ProvisionError>),
  #[error("invalid site name `{0}`: nothing left after removing unsupported characters")]
  InvalidSiteName(String),
  #[error("failed to start `{program}`")]
  Spawn {
    program: String,
    #[source]
    source: io::Error,
  },
  #[error("`{command}` failed: {stderr}")]
  DelegatedCommand { command: String, stderr: String },
  #[error("plugin registry: {0}")]
  Registry(String),
  #[error("{0}")]
  Installation(String),
  #[error("`{command}` failed: {output}")]
  ProxyTool { command: String, output: String },
}

impl ProvisionError {
  pub(crate) fn fs(path: impl Into<PathBuf>, source: io::Error) -> Self {
    Self::Filesystem {
      path: path.into(),
      source,
    }
  }
}

pub type ProvisionResult<T> = Result<T, ProvisionError>;
