//! Digest tokens and the one-digest-per-line list format
//!
//! A digest file is plain text: one 64-character lowercase hex SHA-256 digest
//! per line, ascending, no header, no blank lines. Raw byte order equals the
//! lexicographic order of the lowercase hex form, so sorting either gives the
//! same list.

use std::fmt;
use std::str::FromStr;

use crate::constants::{DIGEST_HEX_LEN, DIGEST_SIZE};
use crate::error::Error;
use crate::intersect::intersect;
use crate::Result;

/// A single 32-byte digest
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Digest([u8; DIGEST_SIZE]);

impl Digest {
    pub const fn from_bytes(bytes: [u8; DIGEST_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; DIGEST_SIZE] {
        &self.0
    }

    /// Parse one token, reporting errors against `line`
    fn parse_line(token: &str, line: usize) -> Result<Self> {
        if token.is_empty() {
            return Err(Error::BlankLine { line });
        }
        if token.len() != DIGEST_HEX_LEN {
            return Err(Error::InvalidLength {
                line,
                found: token.len(),
            });
        }
        // hex::decode accepts uppercase, which would break the ordering contract
        if !token.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
            return Err(Error::InvalidHex { line });
        }

        let mut bytes = [0u8; DIGEST_SIZE];
        hex::decode_to_slice(token, &mut bytes).map_err(|_| Error::InvalidHex { line })?;
        Ok(Self(bytes))
    }
}

impl FromStr for Digest {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_line(s, 1)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self)
    }
}

/// An ordered list of digests, used as a set surrogate
///
/// Lists built through [`DigestList::parse`] are guaranteed ascending. Lists
/// built with [`DigestList::from_sorted`] trust the caller.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DigestList(Vec<Digest>);

impl DigestList {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Wrap digests that the caller already keeps in ascending order
    pub fn from_sorted(digests: Vec<Digest>) -> Self {
        Self(digests)
    }

    /// Parse and validate a digest file
    ///
    /// Accepts `\n` and `\r\n` terminators and an optional final terminator.
    /// An empty payload is an empty list. Equal neighbours are kept.
    pub fn parse(text: &str) -> Result<Self> {
        let mut digests: Vec<Digest> = Vec::with_capacity(text.len() / (DIGEST_HEX_LEN + 1));

        for (idx, token) in text.lines().enumerate() {
            let line = idx + 1;
            let digest = Digest::parse_line(token, line)?;
            if let Some(prev) = digests.last() {
                if digest < *prev {
                    return Err(Error::OutOfOrder { line });
                }
            }
            digests.push(digest);
        }

        Ok(Self(digests))
    }

    /// Parse a raw upload body
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(bytes).map_err(|_| Error::NotUtf8)?;
        Self::parse(text)
    }

    /// Render one digest per line, each line terminated
    pub fn to_text(&self) -> String {
        let mut out = String::with_capacity(self.0.len() * (DIGEST_HEX_LEN + 1));
        for digest in &self.0 {
            out.push_str(&digest.to_string());
            out.push('\n');
        }
        out
    }

    /// Digests present in both lists, in merge order
    pub fn intersect(&self, other: &DigestList) -> DigestList {
        DigestList(intersect(&self.0, &other.0))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Digest] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Digest> {
        self.0.iter()
    }

    pub fn into_inner(self) -> Vec<Digest> {
        self.0
    }
}

impl FromStr for DigestList {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl<'a> IntoIterator for &'a DigestList {
    type Item = &'a Digest;
    type IntoIter = std::slice::Iter<'a, Digest>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
