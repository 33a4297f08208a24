//! Registry entry lifecycle.
//!
//! The registry owns the entry; Cairn only observes its state through the
//! source document's front matter (`doi` and `published`). An identifier is
//! never removed once assigned, so there is no way back to `Unregistered`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Identifier, store::FrontMatter};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "doi", rename_all = "snake_case")]
pub enum RegistryState {
  Unregistered,
  /// Metadata is in the public index.
  Registered(Identifier),
  /// The identifier remains assigned but its metadata has been withdrawn.
  Hidden(Identifier),
}

impl RegistryState {
  /// Derive the state recorded in a document's front matter.
  ///
  /// A `doi` that does not parse is treated as absent.
  pub fn from_front_matter(front_matter: &FrontMatter) -> Self {
    let doi = front_matter
      .get("doi")
      .and_then(|v| v.as_str())
      .and_then(|s| Identifier::parse(s).ok());
    let Some(doi) = doi else {
      return Self::Unregistered;
    };
    match front_matter.get("published").and_then(|v| v.as_bool()) {
      Some(false) => Self::Hidden(doi),
      _ => Self::Registered(doi),
    }
  }

  pub fn identifier(&self) -> Option<&Identifier> {
    match self {
      Self::Unregistered => None,
      Self::Registered(id) | Self::Hidden(id) => Some(id),
    }
  }
}

impl fmt::Display for RegistryState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Unregistered => write!(f, "unregistered"),
      Self::Registered(id) => write!(f, "registered as {id}"),
      Self::Hidden(id) => write!(f, "hidden ({id})"),
    }
  }
}
