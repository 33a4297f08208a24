//! Core types and trait definitions for Cairn.
//!
//! Holds the identifier codec, the accession number generator, the canonical
//! registration record and the traits that the workflow drives (document
//! store, record fetcher, registry). This crate performs no I/O; concrete
//! collaborators live in `cairn-store-fs` and `cairn-datacite`.

pub mod accession;
pub mod error;
pub mod identifier;
pub mod lifecycle;
pub mod record;
pub mod registry;
pub mod store;

pub use error::{Error, Result};
pub use identifier::{Identifier, UPPER_LIMIT};
