//! `cairn`: mint, hide and inspect DOIs for the works of a static site.
//!
//! # Usage
//!
//! ```text
//! cairn doi mint https://blog.example.org/hello-world/
//! cairn doi hide https://blog.example.org/ --all
//! cairn metadata https://blog.example.org/hello-world/ --schema jats
//! cairn accession update source/posts --all --opt-in
//! ```
//!
//! Settings come from `cairn.toml` (or `--config`) and `CAIRN_*`
//! environment variables. Outcome lines go to stdout, logs to stderr.

mod settings;

use std::{collections::BTreeSet, path::PathBuf};

use anyhow::Context as _;
use cairn_core::{
  accession::{self, AccessionOptions},
  identifier,
};
use cairn_datacite::{HtmlFetcher, MdsClient};
use cairn_schemaorg::{DATACITE, JATS, TargetSchema, project};
use cairn_store_fs::FsStore;
use cairn_workflow::{
  Outcome, Workflow,
  accession::{try_update_accession_number, update_all_accession_numbers},
  join_lines,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use settings::CairnConfig;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "cairn", version, about = "Persistent identifiers for static sites")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "cairn.toml", global = true)]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Encode, decode, mint and hide DOIs.
  #[command(subcommand)]
  Doi(DoiCommand),

  /// Print the normalized metadata of a work.
  Metadata {
    url:    String,
    #[arg(long, value_enum, default_value_t = SchemaArg::Datacite)]
    schema: SchemaArg,
  },

  /// Generate and assign accession numbers.
  #[command(subcommand)]
  Accession(AccessionCommand),
}

#[derive(Subcommand)]
enum DoiCommand {
  /// Print a new DOI under the configured prefix.
  Encode {
    /// Encode this number instead of a random one.
    #[arg(long)]
    number: Option<u64>,
  },
  /// Print the number behind a DOI.
  Decode { doi: String },
  /// Register a work and record its DOI in the source document.
  Mint(Target),
  /// Register a work and withdraw its metadata right away.
  MintHide(Target),
  /// Withdraw the public metadata of a registered work.
  Hide(Target),
}

#[derive(Args)]
struct Target {
  url:   String,
  /// Treat `url` as an index page and process every work it lists.
  #[arg(long)]
  all:   bool,
  /// Process works the registry is already up to date with.
  #[arg(long)]
  force: bool,
}

#[derive(Subcommand)]
enum AccessionCommand {
  /// Print a new accession number.
  Generate {
    #[arg(long)]
    number: Option<u64>,
    #[command(flatten)]
    format: FormatArgs,
  },
  /// Give a document (or, with `--all`, every document of a directory) an
  /// accession number.
  Update {
    path:   PathBuf,
    #[arg(long)]
    all:    bool,
    /// Only fill documents that carry an empty `accession_number` field.
    #[arg(long)]
    opt_in: bool,
    #[command(flatten)]
    format: FormatArgs,
  },
}

/// Overrides of the configured accession defaults.
#[derive(Args)]
struct FormatArgs {
  #[arg(long)]
  namespace:   Option<String>,
  #[arg(long)]
  lower_limit: Option<u64>,
  #[arg(long)]
  length:      Option<usize>,
  #[arg(long)]
  split:       Option<usize>,
}

impl FormatArgs {
  fn apply(self, defaults: &AccessionOptions) -> AccessionOptions {
    AccessionOptions {
      number:      defaults.number,
      namespace:   self.namespace.unwrap_or_else(|| defaults.namespace.clone()),
      lower_limit: self.lower_limit.unwrap_or(defaults.lower_limit),
      length:      self.length.or(defaults.length),
      split:       self.split.or(defaults.split),
    }
  }
}

#[derive(Clone, Copy, ValueEnum)]
enum SchemaArg {
  Datacite,
  Jats,
}

impl SchemaArg {
  fn schema(self) -> &'static TargetSchema {
    match self {
      Self::Datacite => &DATACITE,
      Self::Jats => &JATS,
    }
  }
}

// ─── Entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let config = CairnConfig::load(&cli.config)?;

  match cli.command {
    Command::Doi(cmd) => run_doi(cmd, &config).await,
    Command::Metadata { url, schema } => run_metadata(&url, schema.schema(), &config).await,
    Command::Accession(cmd) => run_accession(cmd, &config).await,
  }
}

type SiteWorkflow = Workflow<HtmlFetcher, FsStore, MdsClient>;

fn workflow(config: &CairnConfig) -> anyhow::Result<SiteWorkflow> {
  let fetcher = HtmlFetcher::new().context("failed to build HTTP client")?;
  let registry = MdsClient::new(config.registry()).context("failed to build HTTP client")?;
  Ok(Workflow::new(fetcher, FsStore::new(), registry, config.workflow()))
}

// ─── doi ─────────────────────────────────────────────────────────────────────

async fn run_doi(cmd: DoiCommand, config: &CairnConfig) -> anyhow::Result<()> {
  match cmd {
    DoiCommand::Encode { number } => {
      println!("{}", identifier::encode(config.require_prefix()?, number));
    }
    DoiCommand::Decode { doi } => {
      let number = identifier::decode(&doi).with_context(|| format!("cannot decode {doi}"))?;
      println!("{number}");
    }
    DoiCommand::Mint(target) => {
      config.require_prefix()?;
      let wf = workflow(config)?;
      let outcomes = if target.all {
        wf.mint_all(&target.url, target.force).await
      } else {
        Ok(vec![wf.mint(&target.url, target.force).await])
      };
      print_outcomes(outcomes, &target.url)?;
    }
    DoiCommand::MintHide(target) => {
      config.require_prefix()?;
      let wf = workflow(config)?;
      let outcomes = if target.all {
        wf.mint_and_hide_all(&target.url, target.force).await
      } else {
        Ok(vec![wf.mint_and_hide(&target.url, target.force).await])
      };
      print_outcomes(outcomes, &target.url)?;
    }
    DoiCommand::Hide(target) => {
      let wf = workflow(config)?;
      let outcomes = if target.all {
        wf.hide_all(&target.url, target.force).await
      } else {
        Ok(vec![wf.hide(&target.url, target.force).await])
      };
      print_outcomes(outcomes, &target.url)?;
    }
  }
  Ok(())
}

fn print_outcomes(outcomes: cairn_core::Result<Vec<Outcome>>, url: &str) -> anyhow::Result<()> {
  let outcomes = outcomes.with_context(|| format!("failed to list the works of {url}"))?;
  println!("{}", join_lines(&outcomes));
  Ok(())
}

// ─── metadata ────────────────────────────────────────────────────────────────

async fn run_metadata(url: &str, schema: &TargetSchema, config: &CairnConfig) -> anyhow::Result<()> {
  let record = workflow(config)?
    .record_for(url, schema)
    .await
    .with_context(|| format!("no {} metadata for {url}", schema.name))?;
  let projected = serde_json::Value::Object(project(&record, schema));
  println!("{}", serde_json::to_string_pretty(&projected)?);
  Ok(())
}

// ─── accession ───────────────────────────────────────────────────────────────

async fn run_accession(cmd: AccessionCommand, config: &CairnConfig) -> anyhow::Result<()> {
  match cmd {
    AccessionCommand::Generate { number, format } => {
      let mut options = format.apply(&config.accession);
      options.number = number.or(options.number);
      let generated = accession::generate(".", &options, &BTreeSet::new())?;
      println!("{generated}");
    }
    AccessionCommand::Update {
      path,
      all,
      opt_in,
      format,
    } => {
      let options = format.apply(&config.accession);
      let store = FsStore::new();
      let outcomes = if all {
        update_all_accession_numbers(&store, &path, &options, opt_in)
          .await
          .with_context(|| format!("failed to list documents in {}", path.display()))?
      } else {
        vec![try_update_accession_number(&store, &path, &options, opt_in).await]
      };
      println!("{}", join_lines(&outcomes));
    }
  }
  Ok(())
}
