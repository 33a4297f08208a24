//! Error types for `cairn-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The source record lacks one or more required fields.
  #[error("required metadata missing: {}", missing.join(", "))]
  Validation { missing: Vec<&'static str> },

  #[error("record is marked as not published")]
  NotPublished,

  #[error("checksum mismatch in identifier suffix {suffix:?}")]
  Checksum { suffix: String },

  #[error("invalid symbol {symbol:?} in identifier suffix {suffix:?}")]
  InvalidSymbol { symbol: char, suffix: String },

  #[error("identifier suffix {0:?} exceeds the encodable range")]
  SuffixOverflow(String),

  #[error("identifier {0:?} has no prefix")]
  MissingPrefix(String),

  /// The registry answered with a non-success status. The title is the
  /// registry's first error, surfaced verbatim.
  #[error("{title}")]
  Transport { status: u16, title: String },

  #[error("no schema.org metadata found at {url}")]
  NotFound { url: String },

  #[error("{url} does not redirect to a landing page")]
  Unresolved { url: String },

  #[error("no free accession number left above {lower_limit}")]
  ExhaustedRange { lower_limit: u64 },

  /// A concrete store, fetcher or registry failed before producing a
  /// response (I/O, network, decoding).
  #[error("{0}")]
  Collaborator(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  pub fn collaborator<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Collaborator(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
