//! Accession numbers: human-facing secondary identifiers scoped to a
//! document collection.
//!
//! Uniqueness within a scope is always decided on the underlying integer;
//! zero padding and dash grouping are display only.

use std::{collections::BTreeSet, fmt};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{Error, Result, identifier::group_from_right};

/// Width of the window random numbers are drawn from, starting at
/// `lower_limit`.
pub const SAMPLE_RANGE: u64 = 1_000_000;

/// Random draws attempted before falling back to picking directly from the
/// unregistered numbers of the window.
const MAX_RANDOM_ATTEMPTS: usize = 64;

pub const DEFAULT_NAMESPACE: &str = "MS-";

// ─── Options ─────────────────────────────────────────────────────────────────

/// How an accession number is chosen and displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessionOptions {
  /// Use this number verbatim instead of sampling (e.g. the decoded value of
  /// the document's registry identifier).
  pub number:      Option<u64>,
  pub namespace:   String,
  pub lower_limit: u64,
  /// Zero-pad the decimal digits to this many characters.
  pub length:      Option<usize>,
  /// Group digits from the right into dash-joined chunks of this size.
  pub split:       Option<usize>,
}

impl Default for AccessionOptions {
  fn default() -> Self {
    Self {
      number:      None,
      namespace:   DEFAULT_NAMESPACE.to_string(),
      lower_limit: 0,
      length:      None,
      split:       None,
    }
  }
}

// ─── AccessionNumber ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessionNumber {
  pub namespace: String,
  /// The formatted digits, without the namespace.
  pub value:     String,
  pub number:    u64,
  /// The scope (e.g. a folder) the number is unique within.
  pub scope:     String,
}

impl fmt::Display for AccessionNumber {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}{}", self.namespace, self.value)
  }
}

// ─── Generation ──────────────────────────────────────────────────────────────

/// Produce an accession number for `scope` that is absent from `registered`.
///
/// Fails with [`Error::ExhaustedRange`] when every number of the sampling
/// window is already registered.
pub fn generate(
  scope: &str,
  options: &AccessionOptions,
  registered: &BTreeSet<u64>,
) -> Result<AccessionNumber> {
  generate_with_rng(scope, options, registered, &mut rand::thread_rng())
}

pub fn generate_with_rng<R: Rng + ?Sized>(
  scope: &str,
  options: &AccessionOptions,
  registered: &BTreeSet<u64>,
  rng: &mut R,
) -> Result<AccessionNumber> {
  let number = match options.number {
    Some(n) => n,
    None => sample_unregistered(options.lower_limit, registered, rng)?,
  };
  Ok(AccessionNumber {
    namespace: options.namespace.clone(),
    value: format_number(number, options.length, options.split),
    number,
    scope: scope.to_string(),
  })
}

fn sample_unregistered<R: Rng + ?Sized>(
  lower_limit: u64,
  registered: &BTreeSet<u64>,
  rng: &mut R,
) -> Result<u64> {
  let upper = lower_limit.saturating_add(SAMPLE_RANGE);
  let taken = registered.range(lower_limit..upper).count() as u64;
  let free = (upper - lower_limit).saturating_sub(taken);
  if free == 0 {
    return Err(Error::ExhaustedRange { lower_limit });
  }

  for _ in 0..MAX_RANDOM_ATTEMPTS {
    let candidate = rng.gen_range(lower_limit..upper);
    if !registered.contains(&candidate) {
      return Ok(candidate);
    }
  }

  // Dense window: pick the k-th unregistered number directly.
  let mut k = rng.gen_range(0..free);
  let mut next = lower_limit;
  for &taken in registered.range(lower_limit..upper) {
    let gap = taken - next;
    if k < gap {
      return Ok(next + k);
    }
    k -= gap;
    next = taken + 1;
  }
  Ok(next + k)
}

/// Zero-pad `number` to `length` digits, then group from the right into
/// dash-joined chunks of `split`.
pub fn format_number(
  number: u64,
  length: Option<usize>,
  split: Option<usize>,
) -> String {
  let digits = match length {
    Some(width) => format!("{number:0>width$}"),
    None => number.to_string(),
  };
  match split {
    Some(size) => group_from_right(&digits, size),
    None => digits,
  }
}

/// The first run of digits in a stored accession number, or 0 when there is
/// none.
pub fn parse_number(stored: &str) -> u64 {
  stored
    .chars()
    .skip_while(|c| !c.is_ascii_digit())
    .take_while(char::is_ascii_digit)
    .collect::<String>()
    .parse()
    .unwrap_or(0)
}
