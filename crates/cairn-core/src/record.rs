//! The canonical registration record and its parts.
//!
//! A [`CanonicalRecord`] is built once per source record by the normalizer
//! and is not mutated afterwards, except that the workflow may attach a
//! freshly minted [`Identifier`].

use serde::{Deserialize, Serialize};

use crate::Identifier;

// ─── Creators ────────────────────────────────────────────────────────────────

/// An author of the work.
///
/// `display_name` is only set when neither `given_name` nor `family_name`
/// is present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creator {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub given_name:   Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub family_name:  Option<String>,
  #[serde(rename = "name", skip_serializing_if = "Option::is_none")]
  pub display_name: Option<String>,
  /// Bare ORCID iD, e.g. `0000-0002-1825-0097`.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub orcid:        Option<String>,
}

// ─── Related identifiers ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdentifierType {
  #[serde(rename = "DOI")]
  Doi,
  #[serde(rename = "URL")]
  Url,
}

impl IdentifierType {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Doi => "DOI",
      Self::Url => "URL",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelationType {
  IsPartOf,
  HasPart,
  References,
}

impl RelationType {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::IsPartOf => "IsPartOf",
      Self::HasPart => "HasPart",
      Self::References => "References",
    }
  }
}

/// A cross-reference to another work. Only recognised shapes (DOI or URL)
/// are ever produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedIdentifier {
  pub value:                   String,
  pub related_identifier_type: IdentifierType,
  pub relation_type:           RelationType,
}

// ─── Smaller parts ───────────────────────────────────────────────────────────

/// Publication date decomposed by fixed offsets; unparseable parts are 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationDate {
  pub year:  u32,
  pub month: u32,
  pub day:   u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceTypeGeneral {
  Dataset,
  Text,
}

impl ResourceTypeGeneral {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Dataset => "Dataset",
      Self::Text => "Text",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceType {
  /// The raw schema.org `@type`, e.g. `BlogPosting`.
  pub value:                 String,
  pub resource_type_general: ResourceTypeGeneral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DescriptionKind {
  Abstract,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Description {
  pub value:            String,
  pub description_type: DescriptionKind,
}

/// A media file attached to the registry entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaAsset {
  pub mime_type: Option<String>,
  pub url:       String,
}

// ─── CanonicalRecord ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalRecord {
  pub identifier:           Option<Identifier>,
  /// schema.org `alternateName`; its digits seed identifier minting.
  pub alternate_identifier: Option<String>,
  /// Public landing page the identifier resolves to.
  pub url:                  Option<String>,
  pub title:                String,
  pub creators:             Vec<Creator>,
  pub publisher:            String,
  pub publication_date:     PublicationDate,
  pub resource_type:        ResourceType,
  pub descriptions:         Vec<Description>,
  pub version:              String,
  pub license_name:         Option<String>,
  pub license_url:          Option<String>,
  pub related_identifiers:  Vec<RelatedIdentifier>,
  pub subjects:             Vec<String>,
  pub date_created:         Option<String>,
  pub date_issued:          Option<String>,
  pub date_updated:         Option<String>,
  pub journal_title:        Option<String>,
  pub media:                Vec<MediaAsset>,
  /// The source's own publication flag, when it carries one.
  pub published:            Option<bool>,
}

impl CanonicalRecord {
  /// Attach an identifier assigned by the workflow.
  pub fn with_identifier(self, identifier: Identifier) -> Self {
    Self {
      identifier: Some(identifier),
      ..self
    }
  }

  /// No substantive change since publication: modified and published dates
  /// are equal (including both absent).
  pub fn is_unchanged(&self) -> bool { self.date_updated == self.date_issued }

  /// Publicly listed unless the source marks it `published: false`.
  pub fn is_published(&self) -> bool { self.published != Some(false) }
}
