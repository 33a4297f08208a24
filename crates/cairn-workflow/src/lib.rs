//! Registration workflow for Cairn.
//!
//! [`Workflow`] mints, hides and re-registers works against a
//! [`Registry`](cairn_core::registry::Registry), reading their structured
//! data through a [`RecordFetcher`](cairn_core::registry::RecordFetcher)
//! and writing the results back through a
//! [`DocumentStore`](cairn_core::store::DocumentStore). The [`accession`]
//! module assigns accession numbers to the documents of a scope.
//!
//! Operations on one document return an [`Outcome`]; failures of a single
//! document never abort a batch.

pub mod accession;
pub mod outcome;
mod registration;
pub mod source;

pub use outcome::{Outcome, join_lines};
pub use registration::Workflow;
pub use source::{SourceRef, WorkflowConfig, resolve};

#[cfg(test)]
mod tests;
