//! Async client for the DataCite Metadata Store (MDS) API.

use std::time::Duration;

use cairn_core::{
  Identifier,
  record::{CanonicalRecord, MediaAsset},
  registry::{Registry, RegistryError, RegistryResponse},
};
use reqwest::{Client, RequestBuilder, header::CONTENT_TYPE};
use serde::Deserialize;

use crate::{Result, xml::to_datacite_xml};

pub const DEFAULT_BASE_URL: &str = "https://mds.datacite.org";

/// Media type sent for assets whose source did not name one.
const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// Connection settings for the MDS API.
#[derive(Debug, Clone)]
pub struct MdsConfig {
  pub base_url: String,
  pub username: String,
  pub password: String,
}

impl Default for MdsConfig {
  fn default() -> Self {
    Self {
      base_url: DEFAULT_BASE_URL.to_string(),
      username: String::new(),
      password: String::new(),
    }
  }
}

/// Registry transport over the MDS API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct MdsClient {
  client: Client,
  config: MdsConfig,
}

impl MdsClient {
  pub fn new(config: MdsConfig) -> Result<Self> {
    let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
  }

  fn auth(&self, req: RequestBuilder) -> RequestBuilder {
    if self.config.username.is_empty() {
      req
    } else {
      req.basic_auth(&self.config.username, Some(&self.config.password))
    }
  }

  async fn send(&self, req: RequestBuilder, what: &str) -> Result<RegistryResponse> {
    let resp = self.auth(req).send().await?;
    let status = resp.status().as_u16();
    let body = resp.text().await?;
    tracing::debug!(status, "{what}");
    Ok(response_from_body(status, &body))
  }
}

// ─── Registry impl ───────────────────────────────────────────────────────────

impl Registry for MdsClient {
  type Error = crate::Error;

  /// `POST /metadata`
  async fn post_metadata(&self, record: &CanonicalRecord) -> Result<RegistryResponse> {
    let xml = to_datacite_xml(record)?;
    let req = self
      .client
      .post(self.url("/metadata"))
      .header(CONTENT_TYPE, "application/xml;charset=UTF-8")
      .body(xml);
    self.send(req, "POST /metadata").await
  }

  /// `PUT /doi/{doi}`
  async fn bind_url(&self, identifier: &Identifier, url: &str) -> Result<RegistryResponse> {
    let req = self
      .client
      .put(self.url(&format!("/doi/{identifier}")))
      .header(CONTENT_TYPE, "text/plain;charset=UTF-8")
      .body(doi_body(identifier, url));
    self.send(req, "PUT /doi").await
  }

  /// `POST /media/{doi}`
  async fn post_media(
    &self,
    identifier: &Identifier,
    assets: &[MediaAsset],
  ) -> Result<RegistryResponse> {
    let req = self
      .client
      .post(self.url(&format!("/media/{identifier}")))
      .header(CONTENT_TYPE, "text/plain;charset=UTF-8")
      .body(media_body(assets));
    self.send(req, "POST /media").await
  }

  /// `DELETE /metadata/{doi}`
  async fn delete_metadata(&self, identifier: &Identifier) -> Result<RegistryResponse> {
    let req = self.client.delete(self.url(&format!("/metadata/{identifier}")));
    self.send(req, "DELETE /metadata").await
  }
}

// ─── Bodies ──────────────────────────────────────────────────────────────────

pub(crate) fn doi_body(identifier: &Identifier, url: &str) -> String {
  format!("doi={identifier}\nurl={url}")
}

pub(crate) fn media_body(assets: &[MediaAsset]) -> String {
  assets
    .iter()
    .map(|a| {
      let mime = a.mime_type.as_deref().unwrap_or(FALLBACK_MIME_TYPE);
      format!("{mime}={}", a.url)
    })
    .collect::<Vec<_>>()
    .join("\n")
}

#[derive(Deserialize)]
struct ErrorBody {
  errors: Vec<RegistryError>,
}

/// Interpret a response body. Error bodies are either JSON with an
/// `errors` list or plain text.
pub(crate) fn response_from_body(status: u16, body: &str) -> RegistryResponse {
  if (200..300).contains(&status) {
    return RegistryResponse {
      status,
      errors: Vec::new(),
    };
  }
  if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
    if !parsed.errors.is_empty() {
      return RegistryResponse {
        status,
        errors: parsed.errors,
      };
    }
  }
  match body.trim() {
    "" => RegistryResponse {
      status,
      errors: Vec::new(),
    },
    text => RegistryResponse::failed(status, text),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn success_has_no_errors() {
    let resp = response_from_body(201, "OK (10.5072/0000-0011)");
    assert!(resp.is_created());
    assert!(resp.errors.is_empty());
  }

  #[test]
  fn json_errors_are_kept_in_order() {
    let body = r#"{"errors":[{"title":"Invalid XML"},{"title":"Second"}]}"#;
    let resp = response_from_body(422, body);
    assert_eq!(resp.status, 422);
    assert_eq!(resp.first_error_title(), "Invalid XML");
    assert_eq!(resp.errors.len(), 2);
  }

  #[test]
  fn plain_text_becomes_one_error() {
    let resp = response_from_body(401, "Bad credentials\n");
    assert_eq!(resp.first_error_title(), "Bad credentials");
  }

  #[test]
  fn empty_error_body_names_the_status() {
    let resp = response_from_body(500, "");
    assert_eq!(resp.first_error_title(), "registry responded with status 500");
  }

  #[test]
  fn doi_body_has_both_lines() {
    let id = Identifier::parse("10.5072/0000-0011").unwrap();
    assert_eq!(
      doi_body(&id, "https://blog.example.org/hello"),
      "doi=10.5072/0000-0011\nurl=https://blog.example.org/hello"
    );
  }

  #[test]
  fn media_body_lists_one_asset_per_line() {
    let assets = [
      MediaAsset {
        mime_type: Some("application/pdf".into()),
        url:       "https://blog.example.org/hello.pdf".into(),
      },
      MediaAsset {
        mime_type: None,
        url:       "https://blog.example.org/data.bin".into(),
      },
    ];
    assert_eq!(
      media_body(&assets),
      "application/pdf=https://blog.example.org/hello.pdf\n\
       application/octet-stream=https://blog.example.org/data.bin"
    );
  }

  #[test]
  fn base_url_trailing_slash_is_ignored() {
    let client = MdsClient::new(MdsConfig {
      base_url: "https://mds.test.datacite.org/".into(),
      ..Default::default()
    })
    .unwrap();
    assert_eq!(client.url("/metadata"), "https://mds.test.datacite.org/metadata");
  }
}
