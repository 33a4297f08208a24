//! Error type for `cairn-store-fs`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("io error on {path}: {source}")]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("yaml error: {0}")]
  Yaml(#[from] serde_yaml::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  /// The front matter parsed but is not a key/value mapping.
  #[error("front matter of {0} is not a mapping")]
  NotAMapping(PathBuf),
}

impl Error {
  pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
    Self::Io {
      path: path.to_path_buf(),
      source,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
