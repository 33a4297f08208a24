//! Target-schema descriptors.
//!
//! Both registration targets consume the same [`CanonicalRecord`]; they
//! differ only in which fields survive, what those fields are called, and
//! how unknown licenses are treated. Each target is a small table rather
//! than its own pipeline.

use cairn_core::record::CanonicalRecord;
use serde_json::{Map, Value, json};

// ─── Descriptor ──────────────────────────────────────────────────────────────

/// What to do with a license URI that is not in the known-license table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LicensePolicy {
  /// Keep the URI without a display name.
  PassThrough,
  /// Drop the license entirely.
  KnownOnly,
}

/// A canonical field that a target schema may select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
  Identifier,
  AlternateIdentifier,
  Url,
  Creators,
  Title,
  Publisher,
  PublicationDate,
  PublicationYear,
  PublicationMonth,
  PublicationDay,
  ResourceType,
  Descriptions,
  Version,
  Rights,
  LicenseName,
  LicenseUrl,
  Subjects,
  DateCreated,
  DateIssued,
  DateUpdated,
  RelatedIdentifiers,
  JournalTitle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetSchema {
  pub name:              &'static str,
  /// Selected fields and the name each one carries in this schema.
  pub fields:            &'static [(Field, &'static str)],
  pub license:           LicensePolicy,
  /// Refuse records whose `published` flag is `false`.
  pub require_published: bool,
}

/// Data-repository registration (DataCite).
pub const DATACITE: TargetSchema = TargetSchema {
  name:              "datacite",
  fields:            &[
    (Field::Identifier, "doi"),
    (Field::AlternateIdentifier, "alternate_identifier"),
    (Field::Url, "url"),
    (Field::Creators, "creators"),
    (Field::Title, "title"),
    (Field::Publisher, "publisher"),
    (Field::PublicationYear, "publication_year"),
    (Field::ResourceType, "resource_type"),
    (Field::Descriptions, "descriptions"),
    (Field::Version, "version"),
    (Field::Rights, "rights_list"),
    (Field::Subjects, "subjects"),
    (Field::DateIssued, "date_issued"),
    (Field::DateCreated, "date_created"),
    (Field::DateUpdated, "date_updated"),
    (Field::RelatedIdentifiers, "related_identifiers"),
  ],
  license:           LicensePolicy::KnownOnly,
  require_published: false,
};

/// Narrative-publication front matter (JATS).
pub const JATS: TargetSchema = TargetSchema {
  name:              "jats",
  fields:            &[
    (Field::Publisher, "publisher"),
    (Field::Identifier, "doi"),
    (Field::Subjects, "tags"),
    (Field::Title, "title"),
    (Field::Creators, "author"),
    (Field::PublicationDate, "date"),
    (Field::PublicationYear, "publication_year"),
    (Field::PublicationMonth, "publication_month"),
    (Field::PublicationDay, "publication_day"),
    (Field::LicenseName, "license_name"),
    (Field::LicenseUrl, "license_url"),
    (Field::AlternateIdentifier, "accession_number"),
    (Field::JournalTitle, "journal_title"),
  ],
  license:           LicensePolicy::PassThrough,
  require_published: true,
};

impl TargetSchema {
  pub fn by_name(name: &str) -> Option<&'static TargetSchema> {
    [&DATACITE, &JATS]
      .into_iter()
      .find(|s| s.name.eq_ignore_ascii_case(name))
  }
}

// ─── Projection ──────────────────────────────────────────────────────────────

/// The field-selected view of `record` under `schema`'s field names.
/// Absent optional fields are omitted.
pub fn project(record: &CanonicalRecord, schema: &TargetSchema) -> Map<String, Value> {
  schema
    .fields
    .iter()
    .filter_map(|(field, name)| {
      field_value(record, *field).map(|v| (name.to_string(), v))
    })
    .collect()
}

fn field_value(record: &CanonicalRecord, field: Field) -> Option<Value> {
  let date = &record.publication_date;
  match field {
    Field::Identifier => record.identifier.as_ref().map(|id| json!(id)),
    Field::AlternateIdentifier => record.alternate_identifier.as_ref().map(|s| json!(s)),
    Field::Url => record.url.as_ref().map(|s| json!(s)),
    Field::Creators => Some(json!(record.creators)),
    Field::Title => Some(json!(record.title)),
    Field::Publisher => Some(json!(record.publisher)),
    Field::PublicationDate => record.date_issued.as_ref().map(|s| json!(s)),
    Field::PublicationYear => Some(json!(date.year)),
    Field::PublicationMonth => Some(json!(date.month)),
    Field::PublicationDay => Some(json!(date.day)),
    Field::ResourceType => Some(json!(record.resource_type)),
    Field::Descriptions => {
      (!record.descriptions.is_empty()).then(|| json!(record.descriptions))
    }
    Field::Version => Some(json!(record.version)),
    Field::Rights => match (&record.license_name, &record.license_url) {
      (Some(name), Some(uri)) => Some(json!([{ "value": name, "rights_uri": uri }])),
      _ => None,
    },
    Field::LicenseName => record.license_name.as_ref().map(|s| json!(s)),
    Field::LicenseUrl => record.license_url.as_ref().map(|s| json!(s)),
    Field::Subjects => Some(json!(record.subjects)),
    Field::DateCreated => record.date_created.as_ref().map(|s| json!(s)),
    Field::DateIssued => record.date_issued.as_ref().map(|s| json!(s)),
    Field::DateUpdated => record.date_updated.as_ref().map(|s| json!(s)),
    Field::RelatedIdentifiers => Some(json!(record.related_identifiers)),
    Field::JournalTitle => record.journal_title.as_ref().map(|s| json!(s)),
  }
}
