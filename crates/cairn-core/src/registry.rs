//! The `Registry` and `RecordFetcher` traits, and the registry response
//! shape the workflow interprets.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::{
  Identifier,
  record::{CanonicalRecord, MediaAsset},
};

// ─── Responses ───────────────────────────────────────────────────────────────

/// One entry of a registry's `errors` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryError {
  pub title: String,
}

/// Status and error list returned by every registry call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryResponse {
  pub status: u16,
  #[serde(default)]
  pub errors: Vec<RegistryError>,
}

impl RegistryResponse {
  pub const CREATED: u16 = 201;

  pub fn created() -> Self {
    Self {
      status: Self::CREATED,
      errors: Vec::new(),
    }
  }

  pub fn failed(status: u16, title: impl Into<String>) -> Self {
    Self {
      status,
      errors: vec![RegistryError {
        title: title.into(),
      }],
    }
  }

  pub fn is_created(&self) -> bool { self.status == Self::CREATED }

  pub fn is_success(&self) -> bool { (200..300).contains(&self.status) }

  /// The first error's title, or a generic message naming the status.
  pub fn first_error_title(&self) -> String {
    self
      .errors
      .first()
      .map(|e| e.title.clone())
      .unwrap_or_else(|| format!("registry responded with status {}", self.status))
  }
}

// ─── Registry ────────────────────────────────────────────────────────────────

/// Transport to a DOI registry.
///
/// `Err` is reserved for failures that produced no response at all; a
/// registry that answers with an error status returns `Ok` with that status.
pub trait Registry: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Register (or replace) the metadata of `record`, which must carry an
  /// identifier.
  fn post_metadata<'a>(
    &'a self,
    record: &'a CanonicalRecord,
  ) -> impl Future<Output = Result<RegistryResponse, Self::Error>> + Send + 'a;

  /// Point `identifier` at its landing page.
  fn bind_url<'a>(
    &'a self,
    identifier: &'a Identifier,
    url: &'a str,
  ) -> impl Future<Output = Result<RegistryResponse, Self::Error>> + Send + 'a;

  fn post_media<'a>(
    &'a self,
    identifier: &'a Identifier,
    assets: &'a [MediaAsset],
  ) -> impl Future<Output = Result<RegistryResponse, Self::Error>> + Send + 'a;

  /// Withdraw the public metadata of `identifier`. The identifier itself
  /// stays registered.
  fn delete_metadata<'a>(
    &'a self,
    identifier: &'a Identifier,
  ) -> impl Future<Output = Result<RegistryResponse, Self::Error>> + Send + 'a;
}

// ─── RecordFetcher ───────────────────────────────────────────────────────────

/// Source of raw structured-data records (schema.org JSON-LD).
pub trait RecordFetcher: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Fetch the structured-data record embedded at `url`. `Ok(None)` means
  /// the page exists but carries no record.
  fn fetch_structured_data<'a>(
    &'a self,
    url: &'a str,
  ) -> impl Future<Output = Result<Option<serde_json::Value>, Self::Error>>
  + Send
  + 'a;

  /// Where the identifier resolver at `url` redirects to, without following
  /// the redirect. `Ok(None)` when it answers with no `Location`.
  fn resolve_redirect<'a>(
    &'a self,
    url: &'a str,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + 'a;
}
