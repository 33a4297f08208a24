//! Error types for the schema.org normalizer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("required metadata missing: {}", missing.join(", "))]
  MissingFields { missing: Vec<&'static str> },

  #[error("record is marked as not published")]
  NotPublished,
}

impl From<Error> for cairn_core::Error {
  fn from(err: Error) -> Self {
    match err {
      Error::MissingFields { missing } => Self::Validation { missing },
      Error::NotPublished => Self::NotPublished,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
