//! Error type for `cairn-datacite`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  /// A page answered with a non-success status.
  #[error("GET {url} → {status}")]
  Status { url: String, status: u16 },

  #[error("io error on {path}: {source}")]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("xml error: {0}")]
  Xml(String),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("invalid url {0:?}")]
  InvalidUrl(String),

  /// Metadata can only be registered once an identifier is assigned.
  #[error("record has no identifier")]
  MissingIdentifier,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
