//! Assigning accession numbers to the documents of a scope.

use std::{collections::BTreeSet, path::Path};

use cairn_core::{
  Error, Result,
  accession::{AccessionOptions, generate, parse_number},
  identifier::decode,
  store::{DocumentStore, FrontMatter},
};
use serde_json::{Value, json};

use crate::outcome::Outcome;

const FIELD: &str = "accession_number";

/// Extensions of documents that can carry an accession number.
pub const DOCUMENT_EXTENSIONS: [&str; 3] = ["md", "html", "erb"];

/// The accession numbers already assigned in `scope`: the first run of
/// digits of each document's stored number, zero and unparseable values
/// left out.
pub async fn list_registered_numbers<S: DocumentStore>(
  store: &S,
  scope: &Path,
) -> Result<BTreeSet<u64>> {
  let mut numbers = BTreeSet::new();
  for path in store.list_documents(scope).await.map_err(Error::collaborator)? {
    let front_matter = store
      .read_front_matter(&path)
      .await
      .map_err(Error::collaborator)?;
    let number = front_matter
      .as_ref()
      .and_then(|fm| fm.get(FIELD))
      .and_then(stored_text)
      .map_or(0, |s| parse_number(&s));
    if number > 0 {
      numbers.insert(number);
    }
  }
  Ok(numbers)
}

/// Give the document at `path` an accession number unless it already has
/// one.
///
/// With `opt_in`, only documents that carry an (empty) `accession_number`
/// field are considered. A document with a registry identifier takes the
/// identifier's decoded value; any other draws a number not yet used in
/// its directory.
pub async fn update_accession_number<S: DocumentStore>(
  store: &S,
  path: &Path,
  options: &AccessionOptions,
  opt_in: bool,
) -> Result<Outcome> {
  let name = file_name(path);
  let ignored = |reason: &str| -> Result<Outcome> {
    tracing::debug!(%name, reason, "accession number skipped");
    Ok(Outcome::Ignored {
      name:   name.clone(),
      reason: reason.to_string(),
    })
  };

  let recognised = path
    .extension()
    .and_then(|e| e.to_str())
    .is_some_and(|e| DOCUMENT_EXTENSIONS.contains(&e));
  if !recognised {
    return ignored("not a markdown or html file");
  }

  let Some(front_matter) = store
    .read_front_matter(path)
    .await
    .map_err(Error::collaborator)?
  else {
    return ignored("no yaml front matter");
  };
  if opt_in && !front_matter.contains_key(FIELD) {
    return ignored("no empty accession_number");
  }
  if let Some(number) = front_matter.get(FIELD).and_then(stored_text) {
    tracing::debug!(%name, %number, "accession number already set");
    return Ok(Outcome::AccessionUnchanged { number, name });
  }

  let scope = path.parent().unwrap_or_else(|| Path::new("."));
  let mut options = options.clone();
  let registered = match derived_number(&front_matter) {
    Some(number) => {
      options.number = Some(number);
      BTreeSet::new()
    }
    None => list_registered_numbers(store, scope).await?,
  };

  let accession = generate(&scope.to_string_lossy(), &options, &registered)?;
  let number = accession.to_string();

  let mut fields = FrontMatter::new();
  fields.insert(FIELD.into(), json!(number));
  store
    .write_front_matter(path, fields)
    .await
    .map_err(Error::collaborator)?;

  tracing::info!(%name, %number, "accession number generated");
  Ok(Outcome::AccessionGenerated { number, name })
}

/// Apply [`update_accession_number`] to every document of `scope`, in
/// order. A document that fails is reported and the batch continues.
pub async fn update_all_accession_numbers<S: DocumentStore>(
  store: &S,
  scope: &Path,
  options: &AccessionOptions,
  opt_in: bool,
) -> Result<Vec<Outcome>> {
  let paths = store.list_documents(scope).await.map_err(Error::collaborator)?;
  let mut outcomes = Vec::with_capacity(paths.len());
  for path in paths {
    outcomes.push(try_update_accession_number(store, &path, options, opt_in).await);
  }
  Ok(outcomes)
}

/// [`update_accession_number`], with a failure reported as
/// [`Outcome::Rejected`] under the document's file name.
pub async fn try_update_accession_number<S: DocumentStore>(
  store: &S,
  path: &Path,
  options: &AccessionOptions,
  opt_in: bool,
) -> Outcome {
  match update_accession_number(store, path, options, opt_in).await {
    Ok(outcome) => outcome,
    Err(e) => {
      tracing::warn!(path = %path.display(), error = %e, "accession number failed");
      Outcome::Rejected {
        name:    file_name(path),
        message: e.to_string(),
      }
    }
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// The decoded value of the document's `doi`, when it has a usable one.
fn derived_number(front_matter: &FrontMatter) -> Option<u64> {
  let doi = front_matter.get("doi").and_then(Value::as_str)?;
  match decode(doi) {
    Ok(number) if number > 0 => Some(number),
    Ok(_) => None,
    Err(e) => {
      tracing::warn!(doi, error = %e, "cannot derive accession number from doi");
      None
    }
  }
}

/// A stored accession number as text; absent, null and blank values are
/// `None`.
fn stored_text(value: &Value) -> Option<String> {
  let text = match value {
    Value::String(s) => s.trim().to_string(),
    Value::Number(n) => n.to_string(),
    _ => return None,
  };
  (!text.is_empty()).then_some(text)
}

fn file_name(path: &Path) -> String {
  path
    .file_name()
    .map(|n| n.to_string_lossy().into_owned())
    .unwrap_or_else(|| path.display().to_string())
}
