//! The per-document result of a workflow operation.

use std::fmt;

use cairn_core::Identifier;

/// What happened to one document. `Display` yields the outcome line printed
/// for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
  Minted { doi: Identifier, name: String },
  MintedAndHidden { doi: Identifier, name: String },
  Hidden { doi: Identifier, name: String },
  /// Already registered and not modified since publication.
  Unchanged { doi: Identifier, name: String },
  NoIdentifier { name: String },
  /// Never published, so there is nothing public to hide.
  NotActive { doi: Identifier, name: String },
  /// A step failed after an identifier was assigned.
  Failed { doi: Identifier, message: String },
  /// The document failed before an identifier was known.
  Rejected { name: String, message: String },
  AccessionGenerated { number: String, name: String },
  AccessionUnchanged { number: String, name: String },
  Ignored { name: String, reason: String },
}

impl Outcome {
  /// `true` for [`Outcome::Failed`] and [`Outcome::Rejected`].
  pub fn is_error(&self) -> bool { matches!(self, Self::Failed { .. } | Self::Rejected { .. }) }
}

impl fmt::Display for Outcome {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Minted { doi, name } => write!(f, "DOI {doi} minted for {name}"),
      Self::MintedAndHidden { doi, name } => {
        write!(f, "DOI {doi} minted and hidden for {name}")
      }
      Self::Hidden { doi, name } => write!(f, "DOI {doi} hidden for {name}"),
      Self::Unchanged { doi, name } => write!(f, "DOI {doi} not changed for {name}"),
      Self::NoIdentifier { name } => write!(f, "No DOI for {name}"),
      Self::NotActive { doi, name } => write!(f, "DOI {doi} not active for {name}"),
      Self::Failed { doi, message } => write!(f, "Errors for DOI {doi}: {message}"),
      Self::Rejected { name, message } => write!(f, "Errors for {name}: {message}"),
      Self::AccessionGenerated { number, name } => {
        write!(f, "Accession number {number} generated for {name}")
      }
      Self::AccessionUnchanged { number, name } => {
        write!(f, "Accession number {number} not changed for {name}")
      }
      Self::Ignored { name, reason } => write!(f, "File {name} ignored: {reason}"),
    }
  }
}

/// One outcome line per document.
pub fn join_lines(outcomes: &[Outcome]) -> String {
  outcomes
    .iter()
    .map(ToString::to_string)
    .collect::<Vec<_>>()
    .join("\n")
}
