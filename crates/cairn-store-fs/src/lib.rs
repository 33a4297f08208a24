//! File-system backend for Cairn's document store.
//!
//! Source documents are Markdown (or ERB) files that open with a YAML front
//! matter block. All file access goes through [`tokio::fs`].

mod frontmatter;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::FsStore;
