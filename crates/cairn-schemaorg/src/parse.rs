//! schema.org JSON-LD → [`CanonicalRecord`].
//!
//! Pipeline:
//!   raw JSON-LD object
//!     └─ required-field gate      → MissingFields
//!          └─ publication gate    → NotPublished (targets that require it)
//!               └─ field mapping  → CanonicalRecord

use std::sync::LazyLock;

use cairn_core::{
  Identifier,
  record::{
    CanonicalRecord, Creator, Description, DescriptionKind, IdentifierType,
    MediaAsset, PublicationDate, RelatedIdentifier, RelationType, ResourceType,
    ResourceTypeGeneral,
  },
};
use regex::Regex;
use serde_json::{Map, Value};
use url::Url;

use crate::{
  error::{Error, Result},
  schema::{LicensePolicy, TargetSchema},
};

/// Keys every source record must carry, whatever the target.
pub const REQUIRED: [&str; 5] = ["name", "author", "publisher", "datePublished", "@type"];

/// Keyword used by the site to pin posts; never a subject.
const FEATURED_TAG: &str = "featured";

const LICENSES: [(&str, &str); 2] = [
  (
    "https://creativecommons.org/licenses/by/4.0/",
    "Creative Commons Attribution (CC-BY 4.0)",
  ),
  (
    "https://creativecommons.org/publicdomain/zero/1.0/",
    "Creative Commons Public Domain Dedication (CC0 1.0)",
  ),
];

static DOI_URL: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?i)^https?://(dx\.)?doi\.org/\w+").expect("valid regex")
});

static HTTP_URL: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?i)^https?://").expect("valid regex"));

static ORCID_URL: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?i)^https?://(?:www\.)?orcid\.org/(\d{4}-\d{4}-\d{4}-\d{3}[0-9X])/?$")
    .expect("valid regex")
});

// ─── Entry point ─────────────────────────────────────────────────────────────

pub(crate) fn normalize(raw: &Value, schema: &TargetSchema) -> Result<CanonicalRecord> {
  let empty = Map::new();
  let obj = raw.as_object().unwrap_or(&empty);

  let missing: Vec<&'static str> =
    REQUIRED.into_iter().filter(|k| !obj.contains_key(*k)).collect();
  if !missing.is_empty() {
    return Err(Error::MissingFields { missing });
  }

  let published = obj.get("published").and_then(flag);
  if schema.require_published && published == Some(false) {
    return Err(Error::NotPublished);
  }

  let date_issued = obj.get("datePublished").and_then(text);
  let (license_name, license_url) = license(obj.get("license"), schema.license);

  Ok(CanonicalRecord {
    identifier: obj
      .get("@id")
      .and_then(Value::as_str)
      .and_then(doi_from_url)
      .and_then(|doi| Identifier::parse(&doi).ok()),
    alternate_identifier: obj.get("alternateName").and_then(text),
    url: obj.get("url").and_then(text),
    title: obj.get("name").and_then(text).unwrap_or_default(),
    creators: as_list(obj.get("author")).filter_map(creator).collect(),
    publisher: obj.get("publisher").and_then(name_of).unwrap_or_default(),
    publication_date: decompose_date(date_issued.as_deref().unwrap_or("")),
    resource_type: resource_type(obj.get("@type")),
    descriptions: obj
      .get("description")
      .and_then(text)
      .filter(|d| !d.trim().is_empty())
      .map(|value| Description {
        value,
        description_type: DescriptionKind::Abstract,
      })
      .into_iter()
      .collect(),
    version: obj.get("version").and_then(text).unwrap_or_else(|| "1.0".to_string()),
    license_name,
    license_url,
    related_identifiers: related_identifiers(obj),
    subjects: subjects(obj.get("keywords")),
    date_created: obj.get("dateCreated").and_then(text),
    date_issued,
    date_updated: obj.get("dateModified").and_then(text),
    journal_title: obj.get("isPartOf").and_then(name_of),
    media: as_list(obj.get("encoding")).filter_map(media_asset).collect(),
    published,
  })
}

// ─── Value helpers ───────────────────────────────────────────────────────────

/// A scalar as text; numbers are stringified.
fn text(value: &Value) -> Option<String> {
  match value {
    Value::String(s) => Some(s.clone()),
    Value::Number(n) => Some(n.to_string()),
    _ => None,
  }
}

/// Text that is not blank.
fn present(value: Option<&Value>) -> Option<String> {
  value.and_then(text).filter(|s| !s.trim().is_empty())
}

fn flag(value: &Value) -> Option<bool> {
  match value {
    Value::Bool(b) => Some(*b),
    Value::String(s) if s == "true" => Some(true),
    Value::String(s) if s == "false" => Some(false),
    _ => None,
  }
}

/// Iterate a value that may be a single item or an array of items.
fn as_list(value: Option<&Value>) -> impl Iterator<Item = &Value> {
  let items: &[Value] = match value {
    Some(Value::Array(items)) => items,
    Some(Value::Null) | None => &[],
    Some(single) => std::slice::from_ref(single),
  };
  items.iter()
}

/// `{"name": …}` objects yield their name; plain strings yield themselves.
fn name_of(value: &Value) -> Option<String> {
  match value {
    Value::Object(o) => o.get("name").and_then(text),
    other => text(other),
  }
}

// ─── Identifiers ─────────────────────────────────────────────────────────────

/// The upper-cased DOI behind a resolver URL such as
/// `https://doi.org/10.5555/abc`.
pub fn doi_from_url(id: &str) -> Option<String> {
  if !DOI_URL.is_match(id) {
    return None;
  }
  let url = Url::parse(id).ok()?;
  let path = url.path().trim_start_matches('/');
  (!path.is_empty()).then(|| path.to_uppercase())
}

/// The bare ORCID iD of an `orcid.org` profile URL.
pub fn orcid_from_url(id: &str) -> Option<String> {
  ORCID_URL
    .captures(id)
    .and_then(|c| c.get(1))
    .map(|m| m.as_str().to_uppercase())
}

/// Classify a related work's `@id`; unrecognised shapes yield `None`.
pub fn classify(id: &str) -> Option<(IdentifierType, String)> {
  if let Some(doi) = doi_from_url(id) {
    return Some((IdentifierType::Doi, doi));
  }
  if HTTP_URL.is_match(id) {
    return Url::parse(id).ok().map(|u| (IdentifierType::Url, u.to_string()));
  }
  None
}

// ─── Field mappers ───────────────────────────────────────────────────────────

fn creator(author: &Value) -> Option<Creator> {
  let author = author.as_object()?;
  let given_name = present(author.get("givenName"));
  let family_name = present(author.get("familyName"));
  let display_name = if given_name.is_none() && family_name.is_none() {
    author.get("name").and_then(text)
  } else {
    None
  };
  Some(Creator {
    given_name,
    family_name,
    display_name,
    orcid: author.get("@id").and_then(Value::as_str).and_then(orcid_from_url),
  })
}

/// Fixed-offset decomposition of `YYYY-MM-DD…`; a component that does not
/// start with digits is 0.
pub fn decompose_date(date: &str) -> PublicationDate {
  let part = |start: usize, len: usize| -> u32 {
    date
      .chars()
      .skip(start)
      .take(len)
      .take_while(char::is_ascii_digit)
      .collect::<String>()
      .parse()
      .unwrap_or(0)
  };
  PublicationDate {
    year:  part(0, 4),
    month: part(5, 2),
    day:   part(8, 2),
  }
}

fn resource_type(kind: Option<&Value>) -> ResourceType {
  let value = kind.and_then(text).unwrap_or_default();
  let resource_type_general = if value == "Dataset" {
    ResourceTypeGeneral::Dataset
  } else {
    ResourceTypeGeneral::Text
  };
  ResourceType {
    value,
    resource_type_general,
  }
}

fn license(
  value: Option<&Value>,
  policy: LicensePolicy,
) -> (Option<String>, Option<String>) {
  let Some(uri) = present(value) else {
    return (None, None);
  };
  let name = LICENSES
    .iter()
    .find(|(known, _)| *known == uri)
    .map(|(_, name)| name.to_string());
  match (name, policy) {
    (Some(name), _) => (Some(name), Some(uri)),
    (None, LicensePolicy::PassThrough) => (None, Some(uri)),
    (None, LicensePolicy::KnownOnly) => (None, None),
  }
}

fn subjects(keywords: Option<&Value>) -> Vec<String> {
  let raw: Vec<String> = match keywords {
    Some(Value::String(s)) => s.split(", ").map(str::to_string).collect(),
    Some(Value::Array(items)) => items.iter().filter_map(text).collect(),
    _ => Vec::new(),
  };
  raw
    .into_iter()
    .filter(|k| !k.is_empty() && k != FEATURED_TAG)
    .collect()
}

fn related_identifiers(obj: &Map<String, Value>) -> Vec<RelatedIdentifier> {
  let citations = as_list(obj.get("citation")).map(|r| (r, RelationType::References));
  let parents = as_list(obj.get("isPartOf"))
    .chain(as_list(obj.get("IsPartOf")))
    .map(|r| (r, RelationType::IsPartOf));
  let children = as_list(obj.get("hasPart")).map(|r| (r, RelationType::HasPart));

  citations
    .chain(parents)
    .chain(children)
    .filter_map(|(r, relation_type)| {
      let id = r.get("@id").and_then(Value::as_str).unwrap_or("");
      let (kind, value) = classify(id)?;
      Some(RelatedIdentifier {
        value,
        related_identifier_type: kind,
        relation_type,
      })
    })
    .collect()
}

fn media_asset(encoding: &Value) -> Option<MediaAsset> {
  let url = encoding.get("@id").and_then(text)?;
  Some(MediaAsset {
    mime_type: encoding.get("fileFormat").and_then(text),
    url,
  })
}
