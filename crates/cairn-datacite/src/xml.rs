//! DataCite metadata kernel 4 XML generation.
//!
//! Uses `quick-xml`'s writer API. Only the elements a [`CanonicalRecord`]
//! can fill are written; empty containers are left out.

use std::io::Cursor;

use cairn_core::record::{CanonicalRecord, Creator};
use quick_xml::{
  Writer,
  events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};

use crate::{Error, Result};

// ─── Namespaces ──────────────────────────────────────────────────────────────

pub const NS_KERNEL: &str = "http://datacite.org/schema/kernel-4";
pub const NS_XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";
pub const SCHEMA_LOCATION: &str =
  "http://datacite.org/schema/kernel-4 http://schema.datacite.org/meta/kernel-4/metadata.xsd";

const ORCID_SCHEME_URI: &str = "https://orcid.org";
const ACCESSION_TYPE: &str = "Local accession number";

// ─── Builder ─────────────────────────────────────────────────────────────────

struct XmlBuilder {
  writer: Writer<Cursor<Vec<u8>>>,
}

impl XmlBuilder {
  fn new() -> Self {
    Self {
      writer: Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2),
    }
  }

  fn event(&mut self, event: Event<'_>) -> Result<()> {
    self
      .writer
      .write_event(event)
      .map_err(|e| Error::Xml(e.to_string()))
  }

  fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
    let mut el = BytesStart::new(name);
    for attr in attrs {
      el.push_attribute(*attr);
    }
    self.event(Event::Start(el))
  }

  fn end(&mut self, name: &str) -> Result<()> { self.event(Event::End(BytesEnd::new(name))) }

  /// `<name attrs…>text</name>`
  fn text(&mut self, name: &str, attrs: &[(&str, &str)], text: &str) -> Result<()> {
    self.start(name, attrs)?;
    self.event(Event::Text(BytesText::new(text)))?;
    self.end(name)
  }

  fn finish(self) -> Result<String> {
    String::from_utf8(self.writer.into_inner().into_inner())
      .map_err(|e| Error::Xml(e.to_string()))
  }
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// Render `record` as a DataCite kernel-4 `resource` document.
///
/// Fails with [`Error::MissingIdentifier`] when no identifier is assigned.
pub fn to_datacite_xml(record: &CanonicalRecord) -> Result<String> {
  let identifier = record.identifier.as_ref().ok_or(Error::MissingIdentifier)?;

  let mut b = XmlBuilder::new();
  b.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
  b.start("resource", &[
    ("xmlns", NS_KERNEL),
    ("xmlns:xsi", NS_XSI),
    ("xsi:schemaLocation", SCHEMA_LOCATION),
  ])?;

  b.text("identifier", &[("identifierType", "DOI")], &identifier.to_string())?;

  b.start("creators", &[])?;
  for creator in &record.creators {
    write_creator(&mut b, creator)?;
  }
  b.end("creators")?;

  b.start("titles", &[])?;
  b.text("title", &[], &record.title)?;
  b.end("titles")?;

  b.text("publisher", &[], &record.publisher)?;
  b.text(
    "publicationYear",
    &[],
    &record.publication_date.year.to_string(),
  )?;
  b.text(
    "resourceType",
    &[(
      "resourceTypeGeneral",
      record.resource_type.resource_type_general.as_str(),
    )],
    &record.resource_type.value,
  )?;

  if !record.subjects.is_empty() {
    b.start("subjects", &[])?;
    for subject in &record.subjects {
      b.text("subject", &[], subject)?;
    }
    b.end("subjects")?;
  }

  let dates = [
    ("Created", &record.date_created),
    ("Issued", &record.date_issued),
    ("Updated", &record.date_updated),
  ];
  if dates.iter().any(|(_, d)| d.is_some()) {
    b.start("dates", &[])?;
    for (kind, date) in dates {
      if let Some(date) = date {
        b.text("date", &[("dateType", kind)], date)?;
      }
    }
    b.end("dates")?;
  }

  if let Some(accession) = &record.alternate_identifier {
    b.start("alternateIdentifiers", &[])?;
    b.text(
      "alternateIdentifier",
      &[("alternateIdentifierType", ACCESSION_TYPE)],
      accession,
    )?;
    b.end("alternateIdentifiers")?;
  }

  if !record.related_identifiers.is_empty() {
    b.start("relatedIdentifiers", &[])?;
    for related in &record.related_identifiers {
      b.text(
        "relatedIdentifier",
        &[
          ("relatedIdentifierType", related.related_identifier_type.as_str()),
          ("relationType", related.relation_type.as_str()),
        ],
        &related.value,
      )?;
    }
    b.end("relatedIdentifiers")?;
  }

  b.text("version", &[], &record.version)?;

  if let Some(uri) = &record.license_url {
    b.start("rightsList", &[])?;
    b.text(
      "rights",
      &[("rightsURI", uri)],
      record.license_name.as_deref().unwrap_or_default(),
    )?;
    b.end("rightsList")?;
  }

  if !record.descriptions.is_empty() {
    b.start("descriptions", &[])?;
    for description in &record.descriptions {
      b.text(
        "description",
        &[("descriptionType", "Abstract")],
        &description.value,
      )?;
    }
    b.end("descriptions")?;
  }

  b.end("resource")?;
  b.finish()
}

fn write_creator(b: &mut XmlBuilder, creator: &Creator) -> Result<()> {
  b.start("creator", &[])?;
  b.text("creatorName", &[], &creator_name(creator))?;
  if let Some(given) = &creator.given_name {
    b.text("givenName", &[], given)?;
  }
  if let Some(family) = &creator.family_name {
    b.text("familyName", &[], family)?;
  }
  if let Some(orcid) = &creator.orcid {
    b.text(
      "nameIdentifier",
      &[
        ("nameIdentifierScheme", "ORCID"),
        ("schemeURI", ORCID_SCHEME_URI),
      ],
      orcid,
    )?;
  }
  b.end("creator")
}

/// `Family, Given`, falling back to whichever part (or display name) exists.
fn creator_name(creator: &Creator) -> String {
  match (&creator.family_name, &creator.given_name) {
    (Some(family), Some(given)) => format!("{family}, {given}"),
    (Some(only), None) | (None, Some(only)) => only.clone(),
    (None, None) => creator.display_name.clone().unwrap_or_default(),
  }
}
