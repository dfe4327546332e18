// ── MAC address identity ──
//
// Every comparison in the MAC search goes through `MacAddress`, so user
// input and controller data agree on one canonical spelling.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const MAC_HEX_DIGITS: usize = 12;

/// MAC address, normalized to lowercase colon-separated format (aa:bb:cc:dd:ee:ff).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MacAddress(String);

/// Rejected user-supplied MAC address.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{input}' is not a valid MAC address (expected 12 hex digits, e.g. aa:bb:cc:dd:ee:ff)")]
pub struct MacParseError {
    pub input: String,
}

fn is_separator(c: char) -> bool {
    matches!(c, ':' | '-' | '.') || c.is_whitespace()
}

fn canonical(hex: &str) -> String {
    let mut out = String::with_capacity(17);
    for (i, c) in hex.chars().enumerate() {
        if i > 0 && i % 2 == 0 {
            out.push(':');
        }
        out.push(c);
    }
    out
}

impl MacAddress {
    /// Normalize a MAC from any common format without failing.
    ///
    /// Accepts colon-, dash-, dot-separated or bare hex. Input that is not
    /// twelve hex digits is kept as its lowercased, separator-free form so
    /// it can never equal a well-formed address.
    pub fn new(raw: impl AsRef<str>) -> Self {
        let stripped: String = raw
            .as_ref()
            .chars()
            .filter(|c| !is_separator(*c))
            .map(|c| c.to_ascii_lowercase())
            .collect();
        if stripped.len() == MAC_HEX_DIGITS && stripped.chars().all(|c| c.is_ascii_hexdigit()) {
            Self(canonical(&stripped))
        } else {
            Self(stripped)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Strict parsing for user input: exactly twelve hex digits, optionally
/// separated.
impl FromStr for MacAddress {
    type Err = MacParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits: Vec<char> = trimmed.chars().filter(|c| !is_separator(*c)).collect();
        if digits.len() == MAC_HEX_DIGITS && digits.iter().all(char::is_ascii_hexdigit) {
            Ok(Self::new(trimmed))
        } else {
            Err(MacParseError {
                input: s.to_owned(),
            })
        }
    }
}
