//! [`HtmlFetcher`]: reads the schema.org JSON-LD block of a rendered page.

use std::{
  path::{Path, PathBuf},
  sync::LazyLock,
  time::Duration,
};

use cairn_core::registry::RecordFetcher;
use regex::Regex;
use reqwest::{Client, header::LOCATION, redirect::Policy};
use serde_json::Value;
use url::Url;

use crate::{Error, Result};

static JSON_LD: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r#"(?is)<script[^>]*\btype\s*=\s*["']application/ld\+json["'][^>]*>(.*?)</script>"#)
    .expect("valid regex")
});

/// Where a page is read from.
#[derive(Debug, PartialEq, Eq)]
enum Location {
  Remote(Url),
  Local(PathBuf),
}

impl Location {
  fn of(location: &str) -> Result<Self> {
    match Url::parse(location) {
      Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(Self::Remote(url)),
      Ok(url) if url.scheme() == "file" => url
        .to_file_path()
        .map(Self::Local)
        .map_err(|()| Error::InvalidUrl(location.to_string())),
      _ => Ok(Self::Local(PathBuf::from(location))),
    }
  }
}

// ─── Fetcher ─────────────────────────────────────────────────────────────────

/// Fetches rendered pages over HTTP or from the local build output.
#[derive(Clone)]
pub struct HtmlFetcher {
  client:   Client,
  /// Does not follow redirects; used to read resolver `Location`s.
  resolver: Client,
}

impl HtmlFetcher {
  pub fn new() -> Result<Self> {
    let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
    let resolver = Client::builder()
      .timeout(Duration::from_secs(30))
      .redirect(Policy::none())
      .build()?;
    Ok(Self { client, resolver })
  }

  /// The raw HTML at `location`.
  pub async fn page(&self, location: &str) -> Result<String> {
    match Location::of(location)? {
      Location::Remote(url) => {
        let resp = self.client.get(url.clone()).send().await?;
        if !resp.status().is_success() {
          return Err(Error::Status {
            url:    url.to_string(),
            status: resp.status().as_u16(),
          });
        }
        Ok(resp.text().await?)
      }
      Location::Local(path) => read_local(&path).await,
    }
  }

  /// The `Location` a `HEAD` on `location` answers with. Local paths never
  /// redirect.
  pub async fn redirect_target(&self, location: &str) -> Result<Option<String>> {
    let Location::Remote(url) = Location::of(location)? else {
      return Ok(None);
    };
    let resp = self.resolver.head(url).send().await?;
    let target = resp
      .headers()
      .get(LOCATION)
      .and_then(|v| v.to_str().ok())
      .map(str::to_string)
      .filter(|t| !t.is_empty());
    tracing::debug!(location, status = resp.status().as_u16(), ?target, "redirect resolved");
    Ok(target)
  }
}

async fn read_local(path: &Path) -> Result<String> {
  tokio::fs::read_to_string(path)
    .await
    .map_err(|source| Error::Io {
      path: path.to_path_buf(),
      source,
    })
}

impl RecordFetcher for HtmlFetcher {
  type Error = Error;

  async fn fetch_structured_data(&self, url: &str) -> Result<Option<Value>> {
    let html = self.page(url).await?;
    let record = extract_json_ld(&html)?;
    tracing::debug!(url, found = record.is_some(), "structured data fetched");
    Ok(record)
  }

  async fn resolve_redirect(&self, url: &str) -> Result<Option<String>> {
    self.redirect_target(url).await
  }
}

// ─── Extraction ──────────────────────────────────────────────────────────────

/// Parse the first `<script type="application/ld+json">` block of `html`.
pub fn extract_json_ld(html: &str) -> Result<Option<Value>> {
  let Some(captures) = JSON_LD.captures(html) else {
    return Ok(None);
  };
  let body = captures.get(1).map_or("", |m| m.as_str()).trim();
  if body.is_empty() {
    return Ok(None);
  }
  Ok(Some(serde_json::from_str(body)?))
}
