//! Splitting, merging and re-joining YAML front matter.
//!
//! A front matter block is a first line of `---`, a YAML mapping, and a
//! closing `---` (or `...`) line. An unterminated block is treated as body
//! text.

use cairn_core::store::FrontMatter;
use serde_yaml::{Mapping, Value as YamlValue};

use crate::Result;

// ─── Document ────────────────────────────────────────────────────────────────

pub(crate) struct Document {
  /// `None` when the file has no front matter block at all.
  pub front_matter: Option<YamlValue>,
  pub body:         String,
}

/// Split `content` into its front matter and body.
pub(crate) fn split(content: &str) -> Result<Document> {
  let mut lines = content.split_inclusive('\n');
  let no_front_matter = || Document {
    front_matter: None,
    body:         content.to_string(),
  };

  let first = match lines.next() {
    Some(first) if first.trim_end() == "---" => first,
    _ => return Ok(no_front_matter()),
  };

  let mut consumed = first.len();
  let mut yaml = String::new();
  for line in lines {
    consumed += line.len();
    if matches!(line.trim_end(), "---" | "...") {
      let parsed = if yaml.trim().is_empty() {
        YamlValue::Null
      } else {
        serde_yaml::from_str(&yaml)?
      };
      return Ok(Document {
        front_matter: Some(parsed),
        body:         content[consumed..].to_string(),
      });
    }
    yaml.push_str(line);
  }

  Ok(no_front_matter())
}

/// Render `mapping` as a front matter block followed by `body`.
pub(crate) fn join(mapping: &Mapping, body: &str) -> Result<String> {
  let yaml = if mapping.is_empty() {
    String::new()
  } else {
    serde_yaml::to_string(mapping)?
  };
  Ok(format!("---\n{yaml}---\n{body}"))
}

// ─── Conversions ─────────────────────────────────────────────────────────────

/// Overwrite or append each of `fields` in `mapping`. Existing keys keep
/// their position.
pub(crate) fn merge(mapping: &mut Mapping, fields: &FrontMatter) -> Result<()> {
  for (key, value) in fields {
    mapping.insert(YamlValue::String(key.clone()), serde_yaml::to_value(value)?);
  }
  Ok(())
}

pub(crate) fn to_json(mapping: &Mapping) -> Result<FrontMatter> {
  let value = serde_json::to_value(mapping)?;
  Ok(match value {
    serde_json::Value::Object(map) => map,
    _ => FrontMatter::new(),
  })
}
