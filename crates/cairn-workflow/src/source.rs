//! Mapping a work's URL to its source document and rendered page.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

/// Where documents live relative to the site root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowConfig {
  /// Registry prefix new identifiers are minted under, e.g. `10.5438`.
  pub prefix:     String,
  pub source_dir: PathBuf,
  /// Directory of posts, relative to `source_dir`.
  pub posts_dir:  PathBuf,
  /// Rendered site. When set, structured data is read from here instead of
  /// being fetched from the work's URL.
  pub build_dir:  Option<PathBuf>,
}

/// The files behind a work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRef {
  /// File name of the source document, used in outcome lines.
  pub name:        String,
  pub source_path: PathBuf,
  pub build_path:  Option<PathBuf>,
}

impl SourceRef {
  /// Where the work's structured data is read from: the rendered page when
  /// a build directory is configured, the URL otherwise.
  pub fn location(&self, url: &str) -> String {
    match &self.build_path {
      Some(path) => path.to_string_lossy().into_owned(),
      None => url.to_string(),
    }
  }
}

/// Resolve `url` to its source document.
///
/// Index pages (an empty basename, or one starting with `index`) are ERB
/// templates at the top of the source directory; everything else is a
/// Markdown post.
pub fn resolve(url: &str, config: &WorkflowConfig) -> SourceRef {
  let path = match Url::parse(url) {
    Ok(parsed) if parsed.has_host() => parsed.path().to_string(),
    _ => url.to_string(),
  };
  let trimmed = path.strip_suffix("index.html").unwrap_or(&path);
  let trimmed = trimmed.trim_end_matches('/');
  let last = trimmed.rsplit('/').next().unwrap_or_default();
  let basename = match last.strip_suffix(".html").unwrap_or(last) {
    "" => "index",
    b => b,
  };

  if basename.starts_with("index") {
    let name = format!("{basename}.html.erb");
    SourceRef {
      source_path: config.source_dir.join(&name),
      build_path:  config
        .build_dir
        .as_ref()
        .map(|dir| dir.join(format!("{basename}.html"))),
      name,
    }
  } else {
    let name = format!("{basename}.html.md");
    SourceRef {
      source_path: config.source_dir.join(&config.posts_dir).join(&name),
      build_path:  config
        .build_dir
        .as_ref()
        .map(|dir| dir.join(basename).join("index.html")),
      name,
    }
  }
}
