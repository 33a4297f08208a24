//! schema.org metadata normalizer for Cairn.
//!
//! Turns the JSON-LD record embedded in a rendered page into a
//! [`CanonicalRecord`], and projects a record onto a target registration
//! schema. Pure synchronous; no HTTP or file-system dependencies.
//!
//! # Quick start
//!
//! ```no_run
//! use cairn_schemaorg::{DATACITE, normalize, project};
//!
//! let raw = serde_json::json!({
//!   "@type": "BlogPosting",
//!   "name": "Hello",
//!   "author": { "name": "Jane Doe" },
//!   "publisher": { "name": "Example Blog" },
//!   "datePublished": "2017-01-02",
//! });
//! let record = normalize(&raw, &DATACITE).unwrap();
//! println!("{}", serde_json::Value::Object(project(&record, &DATACITE)));
//! ```

pub mod error;
mod parse;
pub mod schema;

use cairn_core::record::CanonicalRecord;
pub use error::{Error, Result};
pub use parse::{REQUIRED, classify, decompose_date, doi_from_url, orcid_from_url};
pub use schema::{DATACITE, JATS, LicensePolicy, TargetSchema, project};

/// Normalize a raw schema.org record for `schema`.
///
/// Fails with [`Error::MissingFields`] unless the record carries a name, an
/// author, a publisher, a publication date and a type, whatever the target.
pub fn normalize(raw: &serde_json::Value, schema: &TargetSchema) -> Result<CanonicalRecord> {
  parse::normalize(raw, schema)
}
