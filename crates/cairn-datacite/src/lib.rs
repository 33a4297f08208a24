//! DataCite collaborators for Cairn.
//!
//! [`MdsClient`] implements the [`Registry`](cairn_core::registry::Registry)
//! transport over the DataCite Metadata Store API, sending kernel-4 XML
//! built by [`to_datacite_xml`]. [`HtmlFetcher`] implements
//! [`RecordFetcher`](cairn_core::registry::RecordFetcher) over rendered
//! pages, remote or in the local build output.

mod client;
pub mod error;
mod fetch;
pub mod xml;

pub use client::{DEFAULT_BASE_URL, MdsClient, MdsConfig};
pub use error::{Error, Result};
pub use fetch::{HtmlFetcher, extract_json_ld};
pub use xml::to_datacite_xml;
