//! Identifier codec: Crockford base-32 suffixes with a mod-37 check symbol.
//!
//! A minted suffix is eight characters including its trailing check symbol,
//! zero-padded on the left and grouped in blocks of four from the right:
//!
//! ```text
//! 10.5438/0000-00SS
//! └─────┘ └───────┘
//!  prefix   suffix (seven value digits + one check symbol)
//! ```
//!
//! The alphabet omits `I`, `L`, `O` and `U`. Decoding is case-insensitive
//! and accepts the aliases `I`/`L` → `1` and `O` → `0`; dashes are ignored.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// The largest value representable in seven base-32 digits (`ZZZZZZZ`).
pub const UPPER_LIMIT: u64 = 34_359_738_367;

const VALUE_SYMBOLS: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Value symbols followed by the five check-only symbols for 32..=36.
const CHECK_SYMBOLS: &[u8; 37] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ*~$=U";

const SUFFIX_LENGTH: usize = 8;
const GROUP_SIZE: usize = 4;

// ─── Identifier ──────────────────────────────────────────────────────────────

/// A persistent identifier of the form `prefix/suffix`.
///
/// Identifiers are never deleted once minted; hiding an entry only removes
/// the registry's public metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier {
  prefix: String,
  suffix: String,
}

impl Identifier {
  /// Split `doi` on its first `/`.
  pub fn parse(doi: &str) -> Result<Self> {
    match doi.split_once('/') {
      Some((prefix, suffix)) if !prefix.is_empty() && !suffix.is_empty() => {
        Ok(Self {
          prefix: prefix.to_string(),
          suffix: suffix.to_string(),
        })
      }
      _ => Err(Error::MissingPrefix(doi.to_string())),
    }
  }

  pub fn prefix(&self) -> &str { &self.prefix }

  pub fn suffix(&self) -> &str { &self.suffix }

  /// Decode the numeric value behind the suffix, verifying its checksum.
  pub fn value(&self) -> Result<u64> { decode_suffix(&self.suffix) }
}

impl fmt::Display for Identifier {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}", self.prefix, self.suffix)
  }
}

impl TryFrom<String> for Identifier {
  type Error = Error;

  fn try_from(s: String) -> Result<Self> { Self::parse(&s) }
}

impl From<Identifier> for String {
  fn from(id: Identifier) -> String { id.to_string() }
}

// ─── Encoding ────────────────────────────────────────────────────────────────

/// Mint an identifier under `prefix`.
///
/// A positive `seed` is encoded verbatim; `None` or `Some(0)` draws a
/// uniform random value in `[0, UPPER_LIMIT)`. Seeds above [`UPPER_LIMIT`]
/// are a caller error and produce a longer suffix.
pub fn encode(prefix: &str, seed: Option<u64>) -> Identifier {
  encode_with_rng(prefix, seed, &mut rand::thread_rng())
}

pub fn encode_with_rng<R: Rng + ?Sized>(
  prefix: &str,
  seed: Option<u64>,
  rng: &mut R,
) -> Identifier {
  let value = match seed {
    Some(n) if n > 0 => n,
    _ => rng.gen_range(0..UPPER_LIMIT),
  };
  Identifier {
    prefix: prefix.to_string(),
    suffix: encode_suffix(value),
  }
}

/// Encode `value` as a grouped, checksummed suffix.
pub fn encode_suffix(value: u64) -> String {
  let mut symbols = Vec::with_capacity(SUFFIX_LENGTH);
  let mut rest = value;
  loop {
    symbols.push(VALUE_SYMBOLS[(rest % 32) as usize]);
    rest /= 32;
    if rest == 0 {
      break;
    }
  }
  symbols.reverse();
  symbols.push(CHECK_SYMBOLS[(value % 37) as usize]);

  let padding = SUFFIX_LENGTH.saturating_sub(symbols.len());
  let mut padded = vec![b'0'; padding];
  padded.extend_from_slice(&symbols);

  // Every symbol is ASCII.
  let plain: String = padded.into_iter().map(char::from).collect();
  group_from_right(&plain, GROUP_SIZE)
}

/// Split `s` into dash-joined chunks of `size` counted from the right, so
/// that only the leftmost chunk may be short.
pub(crate) fn group_from_right(s: &str, size: usize) -> String {
  if size == 0 {
    return s.to_string();
  }
  let chars: Vec<char> = s.chars().collect();
  let head = chars.len() % size;
  let mut groups: Vec<String> = Vec::new();
  if head > 0 {
    groups.push(chars[..head].iter().collect());
  }
  groups.extend(chars[head..].chunks(size).map(|c| c.iter().collect()));
  groups.join("-")
}

/// The first run of ASCII digits in `s` as a positive seed, if any.
///
/// Used to derive an identifier from an alternate id such as `"MS-1234"`.
pub fn seed_from_str(s: &str) -> Option<u64> {
  let digits: String = s
    .chars()
    .skip_while(|c| !c.is_ascii_digit())
    .take_while(char::is_ascii_digit)
    .collect();
  digits.parse().ok().filter(|n| *n > 0)
}

// ─── Decoding ────────────────────────────────────────────────────────────────

/// Decode the numeric value of a full identifier (`prefix/suffix`).
pub fn decode(doi: &str) -> Result<u64> { Identifier::parse(doi)?.value() }

/// Decode a suffix, verifying its trailing check symbol.
pub fn decode_suffix(suffix: &str) -> Result<u64> {
  let symbols: Vec<char> = suffix.chars().filter(|c| *c != '-').collect();
  let Some((&check, digits)) = symbols.split_last() else {
    return Err(Error::Checksum {
      suffix: suffix.to_string(),
    });
  };
  if digits.is_empty() {
    return Err(Error::Checksum {
      suffix: suffix.to_string(),
    });
  }

  let mut value: u64 = 0;
  for &symbol in digits {
    let digit = symbol_value(symbol).filter(|d| *d < 32).ok_or_else(|| {
      Error::InvalidSymbol {
        symbol,
        suffix: suffix.to_string(),
      }
    })?;
    value = value
      .checked_mul(32)
      .and_then(|v| v.checked_add(digit))
      .ok_or_else(|| Error::SuffixOverflow(suffix.to_string()))?;
  }

  let expected = symbol_value(check).ok_or_else(|| Error::InvalidSymbol {
    symbol: check,
    suffix: suffix.to_string(),
  })?;
  if value % 37 != expected {
    return Err(Error::Checksum {
      suffix: suffix.to_string(),
    });
  }
  Ok(value)
}

/// Map a symbol (any case, including aliases) to its value in `0..37`.
fn symbol_value(symbol: char) -> Option<u64> {
  let upper = match symbol.to_ascii_uppercase() {
    'I' | 'L' => '1',
    'O' => '0',
    other => other,
  };
  CHECK_SYMBOLS
    .iter()
    .position(|&s| char::from(s) == upper)
    .map(|p| p as u64)
}

#[cfg(test)]
mod tests {
  use rand::{SeedableRng, rngs::StdRng};

  use super::*;

  #[test]
  fn encodes_known_values() {
    assert_eq!(encode_suffix(0), "0000-0000");
    assert_eq!(encode_suffix(1), "0000-0011");
    // 32 % 37 == 32 → first check-only symbol.
    assert_eq!(encode_suffix(32), "0000-010*");
    assert_eq!(encode_suffix(UPPER_LIMIT), "ZZZZ-ZZZJ");
  }

  #[test]
  fn positive_seed_is_used_verbatim() {
    let id = encode("10.5072", Some(12345));
    assert_eq!(id.prefix(), "10.5072");
    assert_eq!(id.value().unwrap(), 12345);
    assert_eq!(decode(&id.to_string()).unwrap(), 12345);
  }

  #[test]
  fn zero_seed_draws_a_random_value() {
    let mut rng = StdRng::seed_from_u64(7);
    let id = encode_with_rng("10.5072", Some(0), &mut rng);
    let value = id.value().unwrap();
    assert!(value < UPPER_LIMIT);
    assert_eq!(id.suffix().len(), 9);
  }

  #[test]
  fn decoding_is_case_insensitive_and_accepts_aliases() {
    let id = encode("10.5072", Some(1_000_000));
    let lower = id.suffix().to_lowercase();
    assert_eq!(decode_suffix(&lower).unwrap(), 1_000_000);

    // `0000-0011` written with the letter O and a lower-case l.
    assert_eq!(decode_suffix("OOOO-OOl1").unwrap(), 1);
  }

  #[test]
  fn checksum_mismatch_is_rejected() {
    let err = decode("10.5072/0000-0012").unwrap_err();
    assert!(matches!(err, Error::Checksum { .. }));
  }

  #[test]
  fn check_only_symbols_are_rejected_in_value_position() {
    let err = decode_suffix("000*-0000").unwrap_err();
    assert!(matches!(err, Error::InvalidSymbol { symbol: '*', .. }));
  }

  #[test]
  fn missing_prefix_is_rejected() {
    assert!(matches!(decode("00000011"), Err(Error::MissingPrefix(_))));
  }

  #[test]
  fn serde_uses_the_string_form() {
    let id = Identifier::parse("10.5072/0000-0011").unwrap();
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "\"10.5072/0000-0011\"");
    let back: Identifier = serde_json::from_str(&json).unwrap();
    assert_eq!(back, id);
  }

  #[test]
  fn seed_is_first_run_of_digits() {
    assert_eq!(seed_from_str("MS-123-456"), Some(123));
    assert_eq!(seed_from_str("no digits"), None);
    assert_eq!(seed_from_str("MS-000"), None);
  }

  #[test]
  fn groups_from_the_right() {
    assert_eq!(group_from_right("001234", 3), "001-234");
    assert_eq!(group_from_right("1234567", 3), "1-234-567");
    assert_eq!(group_from_right("12", 3), "12");
  }
}
