//! [`FsStore`]: the file-system implementation of [`DocumentStore`].

use std::path::{Path, PathBuf};

use cairn_core::store::{DocumentStore, FrontMatter};
use serde_yaml::{Mapping, Value as YamlValue};

use crate::{
  Error, Result,
  frontmatter::{join, merge, split, to_json},
};

/// Extension of the documents listed in a scope.
const LISTED_EXTENSION: &str = "md";

// ─── Store ───────────────────────────────────────────────────────────────────

/// Reads and writes front matter of documents on the local file system.
#[derive(Debug, Clone, Default)]
pub struct FsStore;

impl FsStore {
  pub fn new() -> Self { Self }

  async fn read(&self, path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
      .await
      .map_err(|e| Error::io(path, e))
  }

  fn mapping_of(path: &Path, front_matter: Option<YamlValue>) -> Result<Option<Mapping>> {
    match front_matter {
      None | Some(YamlValue::Null) => Ok(None),
      Some(YamlValue::Mapping(m)) => Ok(Some(m)),
      Some(_) => Err(Error::NotAMapping(path.to_path_buf())),
    }
  }
}

// ─── DocumentStore impl ──────────────────────────────────────────────────────

impl DocumentStore for FsStore {
  type Error = Error;

  async fn read_front_matter(&self, path: &Path) -> Result<Option<FrontMatter>> {
    let content = self.read(path).await?;
    let doc = split(&content)?;
    match Self::mapping_of(path, doc.front_matter)? {
      Some(mapping) if !mapping.is_empty() => Ok(Some(to_json(&mapping)?)),
      _ => Ok(None),
    }
  }

  async fn write_front_matter(
    &self,
    path: &Path,
    fields: FrontMatter,
  ) -> Result<FrontMatter> {
    let content = self.read(path).await?;
    let doc = split(&content)?;
    let mut mapping = Self::mapping_of(path, doc.front_matter)?.unwrap_or_default();
    merge(&mut mapping, &fields)?;

    let rendered = join(&mapping, &doc.body)?;
    tokio::fs::write(path, rendered)
      .await
      .map_err(|e| Error::io(path, e))?;
    tracing::debug!(path = %path.display(), keys = fields.len(), "front matter updated");

    to_json(&mapping)
  }

  async fn list_documents(&self, scope: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(scope)
      .await
      .map_err(|e| Error::io(scope, e))?;

    let mut paths = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(|e| Error::io(scope, e))? {
      let path = entry.path();
      let is_file = entry
        .file_type()
        .await
        .map_err(|e| Error::io(&path, e))?
        .is_file();
      if is_file && path.extension().is_some_and(|ext| ext == LISTED_EXTENSION) {
        paths.push(path);
      }
    }
    paths.sort();
    Ok(paths)
  }
}
