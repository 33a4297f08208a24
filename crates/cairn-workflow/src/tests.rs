use std::{
  collections::{BTreeMap, HashMap},
  io,
  path::{Path, PathBuf},
  sync::Mutex,
};

use cairn_core::{
  Identifier,
  accession::AccessionOptions,
  lifecycle::RegistryState,
  record::{CanonicalRecord, MediaAsset},
  registry::{RecordFetcher, Registry, RegistryResponse},
  store::{DocumentStore, FrontMatter},
};
use serde_json::{Value, json};

use crate::{
  Outcome, Workflow, WorkflowConfig,
  accession::{
    list_registered_numbers, try_update_accession_number, update_accession_number,
    update_all_accession_numbers,
  },
  join_lines,
};

// ─── Fakes ───────────────────────────────────────────────────────────────────

#[derive(Default)]
struct FakeFetcher {
  pages:     HashMap<String, Value>,
  redirects: HashMap<String, String>,
}

impl FakeFetcher {
  fn with(mut self, url: &str, record: Value) -> Self {
    self.pages.insert(url.to_string(), record);
    self
  }

  fn redirecting(mut self, from: &str, to: &str) -> Self {
    self.redirects.insert(from.to_string(), to.to_string());
    self
  }
}

impl RecordFetcher for FakeFetcher {
  type Error = io::Error;

  async fn fetch_structured_data(&self, url: &str) -> Result<Option<Value>, io::Error> {
    Ok(self.pages.get(url).cloned())
  }

  async fn resolve_redirect(&self, url: &str) -> Result<Option<String>, io::Error> {
    Ok(self.redirects.get(url).cloned())
  }
}

/// Documents keyed by path; `None` is a document without front matter.
#[derive(Default)]
struct FakeStore {
  docs: Mutex<BTreeMap<PathBuf, Option<FrontMatter>>>,
}

impl FakeStore {
  fn with(self, path: &str, front_matter: Option<Value>) -> Self {
    let fm = front_matter.and_then(|v| v.as_object().cloned());
    self.docs.lock().unwrap().insert(PathBuf::from(path), fm);
    self
  }

  fn front_matter(&self, path: &str) -> FrontMatter {
    self
      .docs
      .lock()
      .unwrap()
      .get(Path::new(path))
      .cloned()
      .flatten()
      .unwrap_or_default()
  }
}

impl DocumentStore for FakeStore {
  type Error = io::Error;

  async fn read_front_matter(&self, path: &Path) -> Result<Option<FrontMatter>, io::Error> {
    match self.docs.lock().unwrap().get(path) {
      Some(fm) => Ok(fm.clone().filter(|m| !m.is_empty())),
      None => Err(io::Error::new(io::ErrorKind::NotFound, path.display().to_string())),
    }
  }

  async fn write_front_matter(
    &self,
    path: &Path,
    fields: FrontMatter,
  ) -> Result<FrontMatter, io::Error> {
    let mut docs = self.docs.lock().unwrap();
    let fm = docs.entry(path.to_path_buf()).or_default().get_or_insert_with(FrontMatter::new);
    fm.extend(fields);
    Ok(fm.clone())
  }

  async fn list_documents(&self, scope: &Path) -> Result<Vec<PathBuf>, io::Error> {
    Ok(
      self
        .docs
        .lock()
        .unwrap()
        .keys()
        .filter(|p| p.parent() == Some(scope) && p.extension().is_some_and(|e| e == "md"))
        .cloned()
        .collect(),
    )
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
  PostMetadata(String),
  BindUrl(String, String),
  PostMedia(String, usize),
  DeleteMetadata(String),
}

/// Records every call; answers 201 (200 for deletes) unless a step is set
/// to fail.
#[derive(Default)]
struct FakeRegistry {
  calls:    Mutex<Vec<Call>>,
  failures: HashMap<&'static str, RegistryResponse>,
}

impl FakeRegistry {
  fn failing(step: &'static str, status: u16, title: &str) -> Self {
    Self {
      failures: HashMap::from([(step, RegistryResponse::failed(status, title))]),
      ..Default::default()
    }
  }

  fn respond(&self, step: &str, call: Call, ok: RegistryResponse) -> RegistryResponse {
    self.calls.lock().unwrap().push(call);
    self.failures.get(step).cloned().unwrap_or(ok)
  }

  fn calls(&self) -> Vec<Call> { self.calls.lock().unwrap().clone() }
}

impl Registry for FakeRegistry {
  type Error = io::Error;

  async fn post_metadata(&self, record: &CanonicalRecord) -> Result<RegistryResponse, io::Error> {
    let doi = record.identifier.as_ref().map(ToString::to_string).unwrap_or_default();
    Ok(self.respond("post_metadata", Call::PostMetadata(doi), RegistryResponse::created()))
  }

  async fn bind_url(
    &self,
    identifier: &Identifier,
    url: &str,
  ) -> Result<RegistryResponse, io::Error> {
    let call = Call::BindUrl(identifier.to_string(), url.to_string());
    Ok(self.respond("bind_url", call, RegistryResponse::created()))
  }

  async fn post_media(
    &self,
    identifier: &Identifier,
    assets: &[MediaAsset],
  ) -> Result<RegistryResponse, io::Error> {
    let call = Call::PostMedia(identifier.to_string(), assets.len());
    Ok(self.respond("post_media", call, RegistryResponse::created()))
  }

  async fn delete_metadata(&self, identifier: &Identifier) -> Result<RegistryResponse, io::Error> {
    let call = Call::DeleteMetadata(identifier.to_string());
    let ok = RegistryResponse {
      status: 200,
      errors: Vec::new(),
    };
    Ok(self.respond("delete_metadata", call, ok))
  }
}

// ─── Fixtures ────────────────────────────────────────────────────────────────

const POST_URL: &str = "https://blog.example.org/hello-world";
const POST_SOURCE: &str = "/site/source/posts/hello-world.html.md";
/// The identifier seeded by `MS-123`.
const SEEDED_DOI: &str = "10.5072/0000-03VC";

fn config() -> WorkflowConfig {
  WorkflowConfig {
    prefix:     "10.5072".into(),
    source_dir: "/site/source".into(),
    posts_dir:  "posts".into(),
    build_dir:  None,
  }
}

fn post() -> Value {
  json!({
    "@type": "BlogPosting",
    "@id": POST_URL,
    "url": POST_URL,
    "name": "Hello World",
    "alternateName": "MS-123",
    "author": { "givenName": "Ada", "familyName": "Lovelace" },
    "publisher": { "name": "Example Blog" },
    "datePublished": "2017-01-02",
    "dateModified": "2017-01-03",
  })
}

fn registered_post() -> Value {
  let mut post = post();
  post["@id"] = json!(format!("https://doi.org/{SEEDED_DOI}"));
  post
}

fn store() -> FakeStore {
  FakeStore::default().with(POST_SOURCE, Some(json!({ "title": "Hello World" })))
}

fn workflow(
  fetcher: FakeFetcher,
  registry: FakeRegistry,
) -> Workflow<FakeFetcher, FakeStore, FakeRegistry> {
  Workflow::new(fetcher, store(), registry, config())
}

fn seeded_doi() -> Identifier { Identifier::parse(SEEDED_DOI).unwrap() }

// ─── Mint ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn mint_registers_binds_and_writes_back() {
  let wf = workflow(FakeFetcher::default().with(POST_URL, post()), FakeRegistry::default());

  let outcome = wf.mint(POST_URL, false).await;
  assert_eq!(outcome, Outcome::Minted {
    doi:  seeded_doi(),
    name: "hello-world.html.md".into(),
  });
  assert_eq!(outcome.to_string(), "DOI 10.5072/0000-03VC minted for hello-world.html.md");
  assert_eq!(wf.registry().calls(), [
    Call::PostMetadata(SEEDED_DOI.into()),
    Call::BindUrl(SEEDED_DOI.into(), POST_URL.into()),
  ]);

  let fm = wf.store().front_matter(POST_SOURCE);
  assert_eq!(fm["doi"], json!(SEEDED_DOI));
  assert_eq!(fm["published"], json!(true));
  assert_eq!(fm["date"], json!("2017-01-03"));
  assert_eq!(fm["title"], json!("Hello World"));
}

#[tokio::test]
async fn unchanged_registered_work_issues_no_registry_call() {
  let mut record = registered_post();
  record["dateModified"] = json!("2017-01-02");
  let wf = workflow(FakeFetcher::default().with(POST_URL, record), FakeRegistry::default());

  let outcome = wf.mint(POST_URL, false).await;
  assert_eq!(
    outcome.to_string(),
    "DOI 10.5072/0000-03VC not changed for hello-world.html.md"
  );
  assert!(wf.registry().calls().is_empty());
  assert!(!wf.store().front_matter(POST_SOURCE).contains_key("doi"));
}

#[tokio::test]
async fn force_registers_unchanged_work_again() {
  let mut record = registered_post();
  record["dateModified"] = json!("2017-01-02");
  let wf = workflow(FakeFetcher::default().with(POST_URL, record), FakeRegistry::default());

  let outcome = wf.mint(POST_URL, true).await;
  assert!(matches!(outcome, Outcome::Minted { .. }));
  assert_eq!(wf.registry().calls().len(), 2);
}

#[tokio::test]
async fn modified_work_is_registered_under_its_existing_identifier() {
  let wf = workflow(
    FakeFetcher::default().with(POST_URL, registered_post()),
    FakeRegistry::default(),
  );

  let outcome = wf.mint(POST_URL, false).await;
  assert_eq!(outcome, Outcome::Minted {
    doi:  seeded_doi(),
    name: "hello-world.html.md".into(),
  });
}

#[tokio::test]
async fn post_failure_stops_the_chain_and_surfaces_the_title() {
  let mut record = post();
  record["encoding"] = json!({ "fileFormat": "application/pdf", "@id": "https://blog.example.org/hello.pdf" });
  let wf = workflow(
    FakeFetcher::default().with(POST_URL, record),
    FakeRegistry::failing("post_metadata", 422, "Invalid XML"),
  );

  let outcome = wf.mint(POST_URL, false).await;
  assert_eq!(outcome.to_string(), "Errors for DOI 10.5072/0000-03VC: Invalid XML");
  assert_eq!(wf.registry().calls(), [Call::PostMetadata(SEEDED_DOI.into())]);
  assert!(!wf.store().front_matter(POST_SOURCE).contains_key("doi"));
}

#[tokio::test]
async fn bind_failure_skips_media() {
  let mut record = post();
  record["encoding"] = json!({ "fileFormat": "application/pdf", "@id": "https://blog.example.org/hello.pdf" });
  let wf = workflow(
    FakeFetcher::default().with(POST_URL, record),
    FakeRegistry::failing("bind_url", 412, "URL not in allowed domains"),
  );

  let outcome = wf.mint(POST_URL, false).await;
  assert!(outcome.is_error());
  assert_eq!(wf.registry().calls().len(), 2);
}

#[tokio::test]
async fn media_is_attached_after_binding() {
  let mut record = post();
  record["encoding"] = json!({ "fileFormat": "application/pdf", "@id": "https://blog.example.org/hello.pdf" });
  let wf = workflow(FakeFetcher::default().with(POST_URL, record), FakeRegistry::default());

  wf.mint(POST_URL, false).await;
  assert_eq!(
    wf.registry().calls().last(),
    Some(&Call::PostMedia(SEEDED_DOI.into(), 1))
  );
}

#[tokio::test]
async fn missing_structured_data_is_rejected() {
  let wf = workflow(FakeFetcher::default(), FakeRegistry::default());

  let outcome = wf.mint(POST_URL, false).await;
  assert_eq!(
    outcome.to_string(),
    format!("Errors for hello-world.html.md: no schema.org metadata found at {POST_URL}")
  );
  assert!(wf.registry().calls().is_empty());
}

#[tokio::test]
async fn missing_publisher_is_rejected() {
  let mut record = post();
  record.as_object_mut().unwrap().remove("publisher");
  let wf = workflow(FakeFetcher::default().with(POST_URL, record), FakeRegistry::default());

  let outcome = wf.mint(POST_URL, false).await;
  assert!(matches!(&outcome, Outcome::Rejected { message, .. } if message.contains("publisher")));
  assert!(wf.registry().calls().is_empty());
}

#[tokio::test]
async fn work_without_url_cannot_be_bound() {
  let mut record = post();
  record.as_object_mut().unwrap().remove("url");
  let wf = workflow(FakeFetcher::default().with(POST_URL, record), FakeRegistry::default());

  let outcome = wf.mint(POST_URL, false).await;
  assert!(matches!(outcome, Outcome::Failed { .. }));
  assert!(wf.registry().calls().is_empty());
}

// ─── Mint and hide / hide ────────────────────────────────────────────────────

#[tokio::test]
async fn mint_and_hide_posts_binds_then_deletes() {
  let wf = workflow(FakeFetcher::default().with(POST_URL, post()), FakeRegistry::default());

  let outcome = wf.mint_and_hide(POST_URL, false).await;
  assert_eq!(
    outcome.to_string(),
    "DOI 10.5072/0000-03VC minted and hidden for hello-world.html.md"
  );
  assert_eq!(wf.registry().calls(), [
    Call::PostMetadata(SEEDED_DOI.into()),
    Call::BindUrl(SEEDED_DOI.into(), POST_URL.into()),
    Call::DeleteMetadata(SEEDED_DOI.into()),
  ]);
  let fm = wf.store().front_matter(POST_SOURCE);
  assert_eq!(fm["doi"], json!(SEEDED_DOI));
  assert_eq!(fm["published"], json!(false));
}

#[tokio::test]
async fn hide_withdraws_metadata_and_keeps_the_identifier() {
  let fetcher = FakeFetcher::default().with(POST_URL, registered_post());
  let store = store().with(POST_SOURCE, Some(json!({ "doi": SEEDED_DOI, "published": true })));
  let wf = Workflow::new(fetcher, store, FakeRegistry::default(), config());

  let outcome = wf.hide(POST_URL, false).await;
  assert_eq!(outcome.to_string(), "DOI 10.5072/0000-03VC hidden for hello-world.html.md");
  assert_eq!(wf.registry().calls(), [Call::DeleteMetadata(SEEDED_DOI.into())]);

  let fm = wf.store().front_matter(POST_SOURCE);
  assert_eq!(fm["doi"], json!(SEEDED_DOI));
  assert_eq!(fm["published"], json!(false));
  assert_eq!(
    wf.state(POST_URL).await.unwrap(),
    RegistryState::Hidden(seeded_doi())
  );
}

#[tokio::test]
async fn hide_without_identifier_is_a_no_op() {
  let wf = workflow(FakeFetcher::default().with(POST_URL, post()), FakeRegistry::default());

  assert_eq!(
    wf.hide(POST_URL, false).await.to_string(),
    "No DOI for hello-world.html.md"
  );
  assert!(wf.registry().calls().is_empty());
}

#[tokio::test]
async fn hide_rejection_is_reported() {
  let wf = workflow(
    FakeFetcher::default().with(POST_URL, registered_post()),
    FakeRegistry::failing("delete_metadata", 404, "DOI not found"),
  );

  assert_eq!(
    wf.hide(POST_URL, false).await.to_string(),
    "Errors for DOI 10.5072/0000-03VC: DOI not found"
  );
}

#[tokio::test]
async fn hide_skips_work_marked_unpublished() {
  let mut record = registered_post();
  record["published"] = json!(false);
  let wf = workflow(FakeFetcher::default().with(POST_URL, record), FakeRegistry::default());

  let outcome = wf.hide(POST_URL, false).await;
  assert_eq!(outcome, Outcome::NotActive {
    doi:  seeded_doi(),
    name: "hello-world.html.md".into(),
  });
  assert_eq!(outcome.to_string(), "DOI 10.5072/0000-03VC not active for hello-world.html.md");
  assert!(wf.registry().calls().is_empty());
}

#[tokio::test]
async fn hide_skips_work_already_hidden_in_its_source() {
  let fetcher = FakeFetcher::default().with(POST_URL, registered_post());
  let store = store().with(POST_SOURCE, Some(json!({ "doi": SEEDED_DOI, "published": false })));
  let wf = Workflow::new(fetcher, store, FakeRegistry::default(), config());

  let outcome = wf.hide(POST_URL, false).await;
  assert!(matches!(outcome, Outcome::NotActive { .. }));
  assert!(wf.registry().calls().is_empty());
}

#[tokio::test]
async fn forced_hide_withdraws_an_inactive_work() {
  let mut record = registered_post();
  record["published"] = json!(false);
  let fetcher = FakeFetcher::default().with(POST_URL, record);
  let store = store().with(POST_SOURCE, Some(json!({ "doi": SEEDED_DOI, "published": false })));
  let wf = Workflow::new(fetcher, store, FakeRegistry::default(), config());

  let outcome = wf.hide(POST_URL, true).await;
  assert_eq!(outcome.to_string(), "DOI 10.5072/0000-03VC hidden for hello-world.html.md");
  assert_eq!(wf.registry().calls(), [Call::DeleteMetadata(SEEDED_DOI.into())]);
}

#[tokio::test]
async fn mint_and_hide_delete_rejection_leaves_the_source_untouched() {
  let wf = workflow(
    FakeFetcher::default().with(POST_URL, post()),
    FakeRegistry::failing("delete_metadata", 500, "Internal Server Error"),
  );

  let outcome = wf.mint_and_hide(POST_URL, false).await;
  assert_eq!(
    outcome.to_string(),
    "Errors for DOI 10.5072/0000-03VC: Internal Server Error"
  );
  assert_eq!(wf.registry().calls().len(), 3);
  let fm = wf.store().front_matter(POST_SOURCE);
  assert!(!fm.contains_key("doi"));
  assert!(!fm.contains_key("published"));
}

// ─── Resolver URLs ───────────────────────────────────────────────────────────

const RESOLVER_URL: &str = "https://doi.org/10.5072/0000-03VC";

#[tokio::test]
async fn resolver_url_is_followed_to_the_landing_page() {
  let fetcher = FakeFetcher::default()
    .redirecting(RESOLVER_URL, POST_URL)
    .with(POST_URL, registered_post());
  let wf = workflow(fetcher, FakeRegistry::default());

  assert_eq!(wf.landing_url(RESOLVER_URL).await.unwrap(), POST_URL);
  let outcome = wf.mint(RESOLVER_URL, false).await;
  assert_eq!(outcome.to_string(), "DOI 10.5072/0000-03VC minted for hello-world.html.md");
  assert_eq!(wf.store().front_matter(POST_SOURCE)["doi"], json!(SEEDED_DOI));
}

#[tokio::test]
async fn plain_urls_are_not_resolved() {
  let wf = workflow(FakeFetcher::default(), FakeRegistry::default());
  assert_eq!(wf.landing_url(POST_URL).await.unwrap(), POST_URL);
}

#[tokio::test]
async fn resolver_url_without_target_is_rejected() {
  let wf = workflow(FakeFetcher::default(), FakeRegistry::default());

  let outcome = wf.hide(RESOLVER_URL, false).await;
  assert_eq!(outcome, Outcome::Rejected {
    name:    RESOLVER_URL.into(),
    message: format!("{RESOLVER_URL} does not redirect to a landing page"),
  });
  assert!(wf.registry().calls().is_empty());
}

// ─── Lower-level chains ──────────────────────────────────────────────────────

#[tokio::test]
async fn post_metadata_returns_the_assigned_identifier() {
  let wf = workflow(FakeFetcher::default(), FakeRegistry::default());
  let record = cairn_schemaorg::normalize(&post(), &cairn_schemaorg::DATACITE).unwrap();

  let identifier = wf.post_metadata(&record).await.unwrap();
  assert_eq!(identifier, seeded_doi());
}

#[tokio::test]
async fn transport_errors_carry_the_status() {
  let wf = workflow(
    FakeFetcher::default(),
    FakeRegistry::failing("post_metadata", 401, "Bad credentials"),
  );
  let record = cairn_schemaorg::normalize(&post(), &cairn_schemaorg::DATACITE).unwrap();

  let err = wf.post_and_hide(&record).await.unwrap_err();
  assert!(matches!(
    err,
    cairn_core::Error::Transport { status: 401, ref title } if title == "Bad credentials"
  ));
}

#[tokio::test]
async fn post_and_hide_stops_before_delete_when_binding_fails() {
  let wf = workflow(
    FakeFetcher::default(),
    FakeRegistry::failing("bind_url", 412, "URL not in allowed domains"),
  );
  let record = cairn_schemaorg::normalize(&post(), &cairn_schemaorg::DATACITE).unwrap();

  let err = wf.post_and_hide(&record).await.unwrap_err();
  assert_eq!(err.to_string(), "URL not in allowed domains");
  assert_eq!(wf.registry().calls(), [
    Call::PostMetadata(SEEDED_DOI.into()),
    Call::BindUrl(SEEDED_DOI.into(), POST_URL.into()),
  ]);
}

// ─── Batches ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn batch_isolates_failures() {
  const INDEX: &str = "https://blog.example.org/";
  const BROKEN: &str = "https://blog.example.org/broken";
  let index = json!({
    "hasPart": [{ "@id": BROKEN }, { "@id": POST_URL }],
  });
  let fetcher = FakeFetcher::default().with(INDEX, index).with(POST_URL, post());
  let wf = workflow(fetcher, FakeRegistry::default());

  let outcomes = wf.mint_all(INDEX, false).await.unwrap();
  assert_eq!(outcomes.len(), 3);
  assert!(matches!(&outcomes[0], Outcome::Rejected { name, .. } if name == "broken.html.md"));
  assert!(matches!(&outcomes[1], Outcome::Minted { .. }));
  assert!(matches!(&outcomes[2], Outcome::Rejected { name, .. } if name == "index.html.erb"));
  assert_eq!(join_lines(&outcomes).lines().count(), 3);
}

#[tokio::test]
async fn index_without_record_expands_to_itself() {
  let wf = workflow(FakeFetcher::default(), FakeRegistry::default());
  let works = wf.works_for_index("https://blog.example.org/").await.unwrap();
  assert_eq!(works, ["https://blog.example.org/"]);
}

// ─── Accession numbers ───────────────────────────────────────────────────────

const SCOPE: &str = "/site/source/posts";

#[tokio::test]
async fn registered_numbers_use_the_first_digit_run() {
  let store = FakeStore::default()
    .with("/site/source/posts/a.html.md", Some(json!({ "accession_number": "MS-123-456" })))
    .with("/site/source/posts/b.html.md", Some(json!({ "accession_number": "MS-7" })))
    .with("/site/source/posts/c.html.md", Some(json!({ "accession_number": "none" })))
    .with("/site/source/posts/d.html.md", None);

  let numbers = list_registered_numbers(&store, Path::new(SCOPE)).await.unwrap();
  assert_eq!(numbers.into_iter().collect::<Vec<_>>(), [7, 123]);
}

#[tokio::test]
async fn update_skips_with_reasons() {
  let store = FakeStore::default()
    .with("/site/source/posts/bare.html.md", None)
    .with("/site/source/posts/set.html.md", Some(json!({ "accession_number": "MS-5" })))
    .with("/site/source/posts/plain.html.md", Some(json!({ "title": "Plain" })))
    .with("/site/source/posts/notes.txt", Some(json!({ "title": "Notes" })));
  let options = AccessionOptions::default();
  let update = |path: &'static str, opt_in| {
    let store = &store;
    let options = &options;
    async move {
      update_accession_number(store, Path::new(path), options, opt_in)
        .await
        .unwrap()
        .to_string()
    }
  };

  assert_eq!(
    update("/site/source/posts/notes.txt", false).await,
    "File notes.txt ignored: not a markdown or html file"
  );
  assert_eq!(
    update("/site/source/posts/bare.html.md", false).await,
    "File bare.html.md ignored: no yaml front matter"
  );
  assert_eq!(
    update("/site/source/posts/plain.html.md", true).await,
    "File plain.html.md ignored: no empty accession_number"
  );
  assert_eq!(
    update("/site/source/posts/set.html.md", false).await,
    "Accession number MS-5 not changed for set.html.md"
  );
}

#[tokio::test]
async fn accession_number_derives_from_the_identifier() {
  let path = "/site/source/posts/hello-world.html.md";
  let store = FakeStore::default().with(path, Some(json!({ "doi": SEEDED_DOI })));
  let options = AccessionOptions {
    length: Some(6),
    split: Some(3),
    ..Default::default()
  };

  let outcome = update_accession_number(&store, Path::new(path), &options, false)
    .await
    .unwrap();
  assert_eq!(
    outcome.to_string(),
    "Accession number MS-000-123 generated for hello-world.html.md"
  );
  assert_eq!(store.front_matter(path)["accession_number"], json!("MS-000-123"));
}

#[tokio::test]
async fn opt_in_fills_empty_fields() {
  let path = "/site/source/posts/hello-world.html.md";
  let store = FakeStore::default().with(path, Some(json!({ "accession_number": null })));

  let outcome = update_accession_number(&store, Path::new(path), &AccessionOptions::default(), true)
    .await
    .unwrap();
  assert!(matches!(outcome, Outcome::AccessionGenerated { .. }));
}

#[tokio::test]
async fn unreadable_document_is_reported_by_file_name() {
  let path = "/site/source/posts/missing.html.md";
  let store = FakeStore::default();

  let outcome =
    try_update_accession_number(&store, Path::new(path), &AccessionOptions::default(), false).await;
  assert!(matches!(&outcome, Outcome::Rejected { name, .. } if name == "missing.html.md"));
  assert!(outcome.to_string().starts_with("Errors for missing.html.md: "));
}

#[tokio::test]
async fn batch_update_never_reuses_a_number() {
  let mut store = FakeStore::default();
  for i in 0..25 {
    store = store.with(&format!("{SCOPE}/post-{i:02}.html.md"), Some(json!({ "title": i })));
  }
  let options = AccessionOptions {
    lower_limit: 100,
    ..Default::default()
  };

  let outcomes = update_all_accession_numbers(&store, Path::new(SCOPE), &options, false)
    .await
    .unwrap();
  assert_eq!(outcomes.len(), 25);
  assert!(outcomes.iter().all(|o| matches!(o, Outcome::AccessionGenerated { .. })));

  let numbers = list_registered_numbers(&store, Path::new(SCOPE)).await.unwrap();
  assert_eq!(numbers.len(), 25);
  assert!(numbers.iter().all(|n| (100..1_000_100).contains(n)));
}
