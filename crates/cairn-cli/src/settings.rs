//! `CairnConfig`: an optional TOML file layered under `CAIRN_*` environment
//! variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use cairn_core::accession::AccessionOptions;
use cairn_datacite::{DEFAULT_BASE_URL, MdsConfig};
use cairn_workflow::WorkflowConfig;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CairnConfig {
  /// Registry prefix, e.g. `10.5438`.
  pub prefix:       String,
  pub registry_url: String,
  pub username:     String,
  pub password:     String,
  pub source_dir:   PathBuf,
  pub posts_dir:    PathBuf,
  pub build_dir:    Option<PathBuf>,
  /// Defaults for accession numbers (`CAIRN_ACCESSION__NAMESPACE`, …).
  pub accession:    AccessionOptions,
}

impl Default for CairnConfig {
  fn default() -> Self {
    Self {
      prefix:       String::new(),
      registry_url: DEFAULT_BASE_URL.to_string(),
      username:     String::new(),
      password:     String::new(),
      source_dir:   PathBuf::from("source"),
      posts_dir:    PathBuf::from("posts"),
      build_dir:    None,
      accession:    AccessionOptions::default(),
    }
  }
}

impl CairnConfig {
  pub fn load(path: &Path) -> anyhow::Result<Self> { Self::load_with(path, environment()) }

  fn load_with(path: &Path, env: config::Environment) -> anyhow::Result<Self> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(env)
      .build()
      .context("failed to read config file")?
      .try_deserialize()
      .context("failed to deserialise CairnConfig")
  }

  /// The configured prefix; minting without one is refused.
  pub fn require_prefix(&self) -> anyhow::Result<&str> {
    anyhow::ensure!(
      !self.prefix.is_empty(),
      "no DOI prefix configured (set `prefix` or CAIRN_PREFIX)"
    );
    Ok(&self.prefix)
  }

  pub fn workflow(&self) -> WorkflowConfig {
    WorkflowConfig {
      prefix:     self.prefix.clone(),
      source_dir: self.source_dir.clone(),
      posts_dir:  self.posts_dir.clone(),
      build_dir:  self.build_dir.clone(),
    }
  }

  pub fn registry(&self) -> MdsConfig {
    MdsConfig {
      base_url: self.registry_url.clone(),
      username: self.username.clone(),
      password: self.password.clone(),
    }
  }
}

/// `CAIRN_PREFIX`, `CAIRN_REGISTRY_URL`, …; nested keys use `__`, as in
/// `CAIRN_ACCESSION__LENGTH`.
fn environment() -> config::Environment {
  config::Environment::with_prefix("CAIRN")
    .prefix_separator("_")
    .separator("__")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_file_yields_defaults() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = CairnConfig::load(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(config.registry_url, "https://mds.datacite.org");
    assert_eq!(config.source_dir, PathBuf::from("source"));
    assert_eq!(config.accession.namespace, "MS-");
  }

  #[test]
  fn file_values_override_defaults() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("cairn.toml");
    std::fs::write(
      &path,
      "prefix = \"10.5438\"\nbuild_dir = \"build\"\n\n[accession]\nlength = 6\nsplit = 3\n",
    )
    .unwrap();

    let config = CairnConfig::load(&path).unwrap();
    assert_eq!(config.require_prefix().unwrap(), "10.5438");
    assert_eq!(config.workflow().build_dir, Some(PathBuf::from("build")));
    assert_eq!(config.accession.length, Some(6));
    assert_eq!(config.accession.namespace, "MS-");
  }

  #[test]
  fn environment_overrides_file_values() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("cairn.toml");
    std::fs::write(&path, "prefix = \"10.5438\"\n").unwrap();
    let vars = config::Map::from([
      ("CAIRN_PREFIX".to_string(), "10.9999".to_string()),
      ("CAIRN_REGISTRY_URL".to_string(), "https://mds.test.datacite.org".to_string()),
      ("CAIRN_USERNAME".to_string(), "DATACITE.EXAMPLE".to_string()),
      ("CAIRN_ACCESSION__NAMESPACE".to_string(), "PR-".to_string()),
    ]);

    let config = CairnConfig::load_with(&path, environment().source(Some(vars))).unwrap();
    assert_eq!(config.require_prefix().unwrap(), "10.9999");
    assert_eq!(config.registry().base_url, "https://mds.test.datacite.org");
    assert_eq!(config.registry().username, "DATACITE.EXAMPLE");
    assert_eq!(config.accession.namespace, "PR-");
  }

  #[test]
  fn unrelated_variables_are_ignored() {
    let dir = tempfile::TempDir::new().unwrap();
    let vars = config::Map::from([("CAIRNPREFIX".to_string(), "10.1".to_string())]);

    let config =
      CairnConfig::load_with(&dir.path().join("absent.toml"), environment().source(Some(vars)))
        .unwrap();
    assert_eq!(config.prefix, "");
  }

  #[test]
  fn empty_prefix_is_refused() {
    assert!(CairnConfig::default().require_prefix().is_err());
  }
}
