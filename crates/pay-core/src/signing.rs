//! # Canonical Signer
//!
//! The message-signing scheme shared by outgoing payment requests and
//! incoming gateway callbacks.
//!
//! ```text
//!   fields ──► drop empty/absent, drop sign & sign_type
//!          ──► sort by name (byte order)
//!          ──► name=value&name=value
//!          ──► append secret
//!          ──► md5 ──► lowercase hex (32 chars)
//! ```
//!
//! Values are never URL-encoded on this path. Both functions are pure and
//! never fail: `verify` answers `false` for anything it cannot match.

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Field carrying the signature itself
pub const SIGN_FIELD: &str = "sign";

/// Field carrying the signature algorithm tag
pub const SIGN_TYPE_FIELD: &str = "sign_type";

/// The only sign type the gateway speaks
pub const SIGN_TYPE_MD5: &str = "MD5";

/// Ordered list of `(name, value)` pairs to be signed.
///
/// Names are unique; setting an existing name replaces its value in place.
/// Absent values are kept so call sites can pass optional fields straight
/// through; the signer drops them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignableFieldSet {
    fields: Vec<(String, Option<String>)>,
}

impl SignableFieldSet {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Set a field, replacing any previous value under the same name
    pub fn set(&mut self, name: impl Into<String>, value: Option<String>) {
        let name = name.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Builder: add a present field
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, Some(value.into()));
        self
    }

    /// Builder: add a field that may be absent
    pub fn with_optional(mut self, name: impl Into<String>, value: Option<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Look up a present value
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, v)| v.as_deref())
    }

    /// Remove a field, returning its value if it was present
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let idx = self.fields.iter().position(|(n, _)| n == name)?;
        self.fields.remove(idx).1
    }

    /// Iterate over all entries in insertion order, absent values included
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_deref()))
    }

    /// Present entries as owned pairs, ready for form encoding
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.fields
            .iter()
            .filter_map(|(n, v)| v.as_ref().map(|v| (n.clone(), v.clone())))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for SignableFieldSet
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = SignableFieldSet::new();
        for (k, v) in iter {
            set.set(k, Some(v.into()));
        }
        set
    }
}

/// A 32-character lowercase hex MD5 digest
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signature(String);

impl Signature {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Signature {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Build the canonical `name=value&...` string (without the secret).
pub fn canonical_string(fields: &SignableFieldSet) -> String {
    let mut entries: Vec<(&str, &str)> = fields
        .iter()
        .filter(|(name, _)| *name != SIGN_FIELD && *name != SIGN_TYPE_FIELD)
        .filter_map(|(name, value)| match value {
            Some(v) if !v.is_empty() => Some((name, v)),
            _ => None,
        })
        .collect();

    // str ordering is byte-wise, never locale-aware
    entries.sort_unstable_by(|a, b| a.0.cmp(b.0));

    entries
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join("&")
}

/// Sign a field set with the shared secret.
pub fn sign(fields: &SignableFieldSet, secret: &str) -> Signature {
    let mut input = canonical_string(fields);
    input.push_str(secret);

    let digest = Md5::digest(input.as_bytes());
    Signature(hex::encode(digest))
}

/// Verify a signed payload (typically a gateway callback).
///
/// Returns `false` when `sign` is missing or does not match.
pub fn verify(payload: &SignableFieldSet, secret: &str) -> bool {
    let provided = match payload.get(SIGN_FIELD) {
        Some(sig) => sig,
        None => return false,
    };

    // sign and sign_type are excluded by the canonicalizer itself
    let expected = sign(payload, secret);
    constant_time_compare(provided, expected.as_str())
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0, |acc, (x, y)| acc | (x ^ y))
        == 0
}
