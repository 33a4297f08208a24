//! The `DocumentStore` trait.
//!
//! Implemented by backends that hold the source documents (e.g.
//! `cairn-store-fs`). The workflow depends on this abstraction, not on any
//! concrete backend.

use std::{
  future::Future,
  path::{Path, PathBuf},
};

/// A document's front matter as a JSON object.
pub type FrontMatter = serde_json::Map<String, serde_json::Value>;

/// Abstraction over the source documents of a site.
pub trait DocumentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Read the front matter of `path`. Returns `None` when the document has
  /// none (or an empty one).
  fn read_front_matter<'a>(
    &'a self,
    path: &'a Path,
  ) -> impl Future<Output = Result<Option<FrontMatter>, Self::Error>> + Send + 'a;

  /// Merge `fields` into the front matter of `path` and return the updated
  /// mapping. The document body is left untouched.
  fn write_front_matter<'a>(
    &'a self,
    path: &'a Path,
    fields: FrontMatter,
  ) -> impl Future<Output = Result<FrontMatter, Self::Error>> + Send + 'a;

  /// All documents of `scope`, in a stable (lexicographic) order.
  fn list_documents<'a>(
    &'a self,
    scope: &'a Path,
  ) -> impl Future<Output = Result<Vec<PathBuf>, Self::Error>> + Send + 'a;
}
