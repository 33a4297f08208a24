//! The registration workflow: minting, hiding and the registry call chains
//! behind them.

use std::path::Path;

use cairn_core::{
  Error, Identifier, Result,
  identifier::{encode, seed_from_str},
  lifecycle::RegistryState,
  record::CanonicalRecord,
  registry::{RecordFetcher, Registry, RegistryResponse},
  store::{DocumentStore, FrontMatter},
};
use cairn_schemaorg::{DATACITE, TargetSchema, doi_from_url};
use serde_json::{Value, json};

use crate::{
  outcome::Outcome,
  source::{SourceRef, WorkflowConfig, resolve},
};

/// Drives a [`Registry`] for the works of one site.
///
/// Every registry call is awaited before the next one is issued; a step that
/// does not succeed ends the chain for that document.
pub struct Workflow<F, S, R> {
  fetcher:  F,
  store:    S,
  registry: R,
  config:   WorkflowConfig,
}

impl<F, S, R> Workflow<F, S, R>
where
  F: RecordFetcher,
  S: DocumentStore,
  R: Registry,
{
  pub fn new(fetcher: F, store: S, registry: R, config: WorkflowConfig) -> Self {
    Self {
      fetcher,
      store,
      registry,
      config,
    }
  }

  pub fn config(&self) -> &WorkflowConfig { &self.config }

  pub fn store(&self) -> &S { &self.store }

  pub fn registry(&self) -> &R { &self.registry }

  // ─── Loading ─────────────────────────────────────────────────────────────

  /// Fetch and normalize the record of the work at `url` for `schema`.
  pub async fn record_for(&self, url: &str, schema: &TargetSchema) -> Result<CanonicalRecord> {
    let (url, source) = self.locate(url).await?;
    self.load(&url, &source, schema).await
  }

  /// The landing page behind `url`: a DOI resolver URL is replaced by the
  /// target it redirects to, anything else is returned as is.
  pub async fn landing_url(&self, url: &str) -> Result<String> {
    if doi_from_url(url).is_none() {
      return Ok(url.to_string());
    }
    let target = self
      .fetcher
      .resolve_redirect(url)
      .await
      .map_err(Error::collaborator)?
      .ok_or_else(|| Error::Unresolved { url: url.to_string() })?;
    tracing::debug!(url, %target, "resolved identifier");
    Ok(target)
  }

  async fn locate(&self, url: &str) -> Result<(String, SourceRef)> {
    let url = self.landing_url(url).await?;
    let source = resolve(&url, &self.config);
    Ok((url, source))
  }

  async fn load(
    &self,
    url: &str,
    source: &SourceRef,
    schema: &TargetSchema,
  ) -> Result<CanonicalRecord> {
    let location = source.location(url);
    let raw = self
      .fetcher
      .fetch_structured_data(&location)
      .await
      .map_err(Error::collaborator)?
      .ok_or(Error::NotFound { url: location })?;
    Ok(cairn_schemaorg::normalize(&raw, schema)?)
  }

  /// The works listed on the index page at `url` (its `hasPart` ids),
  /// followed by `url` itself.
  pub async fn works_for_index(&self, url: &str) -> Result<Vec<String>> {
    let location = resolve(url, &self.config).location(url);
    let raw = self
      .fetcher
      .fetch_structured_data(&location)
      .await
      .map_err(Error::collaborator)?;

    let part_id = |part: &Value| part.get("@id").and_then(Value::as_str).map(str::to_string);
    let mut urls: Vec<String> = match raw.as_ref().and_then(|r| r.get("hasPart")) {
      Some(Value::Array(parts)) => parts.iter().filter_map(part_id).collect(),
      Some(part) => part_id(part).into_iter().collect(),
      None => Vec::new(),
    };
    urls.push(url.to_string());
    Ok(urls)
  }

  /// Registry state recorded in the front matter of the work's source.
  pub async fn state(&self, url: &str) -> Result<RegistryState> {
    let (_, source) = self.locate(url).await?;
    self.state_of(&source).await
  }

  async fn state_of(&self, source: &SourceRef) -> Result<RegistryState> {
    let front_matter = self
      .store
      .read_front_matter(&source.source_path)
      .await
      .map_err(Error::collaborator)?;
    Ok(
      front_matter
        .map(|fm| RegistryState::from_front_matter(&fm))
        .unwrap_or(RegistryState::Unregistered),
    )
  }

  // ─── Registry chains ─────────────────────────────────────────────────────

  /// The record's identifier, or a new one seeded by the digits of its
  /// alternate identifier.
  pub fn assign_identifier(&self, record: &CanonicalRecord) -> Identifier {
    record.identifier.clone().unwrap_or_else(|| {
      let seed = record.alternate_identifier.as_deref().and_then(seed_from_str);
      encode(&self.config.prefix, seed)
    })
  }

  /// Register `record`'s metadata, bind its URL and attach its media.
  pub async fn post_metadata(&self, record: &CanonicalRecord) -> Result<Identifier> {
    let (identifier, record, url) = self.prepare(record)?;
    self.post_and_bind(&identifier, &record, url).await?;

    if !record.media.is_empty() {
      let resp = self
        .registry
        .post_media(&identifier, &record.media)
        .await
        .map_err(Error::collaborator)?;
      expect_created(resp, "post media", &identifier)?;
    }
    Ok(identifier)
  }

  /// Register `record`'s metadata, bind its URL, then withdraw the metadata
  /// from the public index.
  pub async fn post_and_hide(&self, record: &CanonicalRecord) -> Result<Identifier> {
    let (identifier, record, url) = self.prepare(record)?;
    self.post_and_bind(&identifier, &record, url).await?;
    self.delete(&identifier).await?;
    Ok(identifier)
  }

  /// Withdraw the public metadata of `record`. The identifier stays
  /// registered.
  pub async fn hide_metadata(&self, record: &CanonicalRecord) -> Result<Identifier> {
    let identifier = record
      .identifier
      .clone()
      .ok_or(Error::Validation { missing: vec!["@id"] })?;
    self.delete(&identifier).await?;
    Ok(identifier)
  }

  fn prepare<'r>(
    &self,
    record: &'r CanonicalRecord,
  ) -> Result<(Identifier, CanonicalRecord, &'r str)> {
    let url = record
      .url
      .as_deref()
      .ok_or(Error::Validation { missing: vec!["url"] })?;
    let identifier = self.assign_identifier(record);
    let record = record.clone().with_identifier(identifier.clone());
    Ok((identifier, record, url))
  }

  async fn post_and_bind(
    &self,
    identifier: &Identifier,
    record: &CanonicalRecord,
    url: &str,
  ) -> Result<()> {
    let resp = self
      .registry
      .post_metadata(record)
      .await
      .map_err(Error::collaborator)?;
    expect_created(resp, "post metadata", identifier)?;

    let resp = self
      .registry
      .bind_url(identifier, url)
      .await
      .map_err(Error::collaborator)?;
    expect_created(resp, "bind url", identifier)
  }

  async fn delete(&self, identifier: &Identifier) -> Result<()> {
    let resp = self
      .registry
      .delete_metadata(identifier)
      .await
      .map_err(Error::collaborator)?;
    if resp.is_success() {
      tracing::debug!(%identifier, status = resp.status, "delete metadata");
      Ok(())
    } else {
      Err(rejected(resp, "delete metadata", identifier))
    }
  }

  // ─── Per document ────────────────────────────────────────────────────────

  /// Register the work at `url` and record its identifier in the source.
  ///
  /// A work that already has an identifier and has not been modified since
  /// publication is left alone unless `force` is set.
  pub async fn mint(&self, url: &str, force: bool) -> Outcome {
    let (url, source) = match self.locate(url).await {
      Ok(located) => located,
      Err(e) => return unresolved_outcome(url, e),
    };
    let record = match self.load(&url, &source, &DATACITE).await {
      Ok(record) => record,
      Err(e) => return rejected_outcome(&source, e),
    };
    if let Some(outcome) = skip_unchanged(&record, &source, force) {
      return outcome;
    }

    let doi = self.assign_identifier(&record);
    let record = record.with_identifier(doi.clone());
    if let Err(e) = self.post_metadata(&record).await {
      return Outcome::Failed { doi, message: e.to_string() };
    }

    let mut fields = FrontMatter::new();
    fields.insert("doi".into(), json!(doi));
    fields.insert("published".into(), json!(true));
    if let Some(modified) = &record.date_updated {
      fields.insert("date".into(), json!(modified));
    }
    if let Err(e) = self.write_back(&source.source_path, fields).await {
      return Outcome::Failed { doi, message: e.to_string() };
    }

    tracing::info!(%doi, name = %source.name, "minted");
    Outcome::Minted { doi, name: source.name }
  }

  /// Register the work at `url` and immediately withdraw its metadata.
  pub async fn mint_and_hide(&self, url: &str, force: bool) -> Outcome {
    let (url, source) = match self.locate(url).await {
      Ok(located) => located,
      Err(e) => return unresolved_outcome(url, e),
    };
    let record = match self.load(&url, &source, &DATACITE).await {
      Ok(record) => record,
      Err(e) => return rejected_outcome(&source, e),
    };
    if let Some(outcome) = skip_unchanged(&record, &source, force) {
      return outcome;
    }

    let doi = self.assign_identifier(&record);
    let record = record.with_identifier(doi.clone());
    if let Err(e) = self.post_and_hide(&record).await {
      return Outcome::Failed { doi, message: e.to_string() };
    }

    let mut fields = FrontMatter::new();
    fields.insert("doi".into(), json!(doi));
    fields.insert("published".into(), json!(false));
    if let Err(e) = self.write_back(&source.source_path, fields).await {
      return Outcome::Failed { doi, message: e.to_string() };
    }

    tracing::info!(%doi, name = %source.name, "minted and hidden");
    Outcome::MintedAndHidden { doi, name: source.name }
  }

  /// Withdraw the public metadata of the work at `url`.
  ///
  /// Works without an identifier are skipped, and so are works that are not
  /// currently published (marked `published: false` in their record or
  /// already hidden in their source) unless `force` is set.
  pub async fn hide(&self, url: &str, force: bool) -> Outcome {
    let (url, source) = match self.locate(url).await {
      Ok(located) => located,
      Err(e) => return unresolved_outcome(url, e),
    };
    let record = match self.load(&url, &source, &DATACITE).await {
      Ok(record) => record,
      Err(e) => return rejected_outcome(&source, e),
    };
    let Some(doi) = record.identifier.clone() else {
      tracing::debug!(name = %source.name, "no identifier to hide");
      return Outcome::NoIdentifier { name: source.name };
    };
    if !force {
      let hidden = match self.state_of(&source).await {
        Ok(state) => matches!(state, RegistryState::Hidden(_)),
        Err(e) => return Outcome::Failed { doi, message: e.to_string() },
      };
      if hidden || !record.is_published() {
        tracing::debug!(%doi, name = %source.name, "not published, nothing to hide");
        return Outcome::NotActive { doi, name: source.name };
      }
    }

    if let Err(e) = self.hide_metadata(&record).await {
      return Outcome::Failed { doi, message: e.to_string() };
    }

    let mut fields = FrontMatter::new();
    fields.insert("published".into(), json!(false));
    if let Err(e) = self.write_back(&source.source_path, fields).await {
      return Outcome::Failed { doi, message: e.to_string() };
    }

    tracing::info!(%doi, name = %source.name, "hidden");
    Outcome::Hidden { doi, name: source.name }
  }

  async fn write_back(&self, path: &Path, fields: FrontMatter) -> Result<()> {
    self
      .store
      .write_front_matter(path, fields)
      .await
      .map_err(Error::collaborator)?;
    Ok(())
  }

  // ─── Batches ─────────────────────────────────────────────────────────────

  /// [`mint`](Self::mint) every work of the index page at `url`, in order.
  pub async fn mint_all(&self, url: &str, force: bool) -> Result<Vec<Outcome>> {
    let mut outcomes = Vec::new();
    for work in self.works_for_index(url).await? {
      outcomes.push(self.mint(&work, force).await);
    }
    Ok(outcomes)
  }

  pub async fn mint_and_hide_all(&self, url: &str, force: bool) -> Result<Vec<Outcome>> {
    let mut outcomes = Vec::new();
    for work in self.works_for_index(url).await? {
      outcomes.push(self.mint_and_hide(&work, force).await);
    }
    Ok(outcomes)
  }

  pub async fn hide_all(&self, url: &str, force: bool) -> Result<Vec<Outcome>> {
    let mut outcomes = Vec::new();
    for work in self.works_for_index(url).await? {
      outcomes.push(self.hide(&work, force).await);
    }
    Ok(outcomes)
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn skip_unchanged(record: &CanonicalRecord, source: &SourceRef, force: bool) -> Option<Outcome> {
  let doi = record.identifier.clone()?;
  if force || !record.is_unchanged() {
    return None;
  }
  tracing::debug!(%doi, name = %source.name, "not modified since publication");
  Some(Outcome::Unchanged {
    doi,
    name: source.name.clone(),
  })
}

fn expect_created(resp: RegistryResponse, step: &str, identifier: &Identifier) -> Result<()> {
  if resp.is_created() {
    tracing::debug!(%identifier, status = resp.status, "{step}");
    Ok(())
  } else {
    Err(rejected(resp, step, identifier))
  }
}

fn rejected(resp: RegistryResponse, step: &str, identifier: &Identifier) -> Error {
  let title = resp.first_error_title();
  tracing::warn!(%identifier, status = resp.status, %title, "{step} rejected");
  Error::Transport {
    status: resp.status,
    title,
  }
}

fn unresolved_outcome(url: &str, err: Error) -> Outcome {
  tracing::warn!(url, error = %err, "cannot resolve");
  Outcome::Rejected {
    name:    url.to_string(),
    message: err.to_string(),
  }
}

fn rejected_outcome(source: &SourceRef, err: Error) -> Outcome {
  tracing::warn!(name = %source.name, error = %err, "cannot register");
  Outcome::Rejected {
    name:    source.name.clone(),
    message: err.to_string(),
  }
}
